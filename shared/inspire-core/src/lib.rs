//! Inspire Core - Shared domain types and service infrastructure
//!
//! This crate provides:
//! - Service lifecycle trait and runtime every Inspire service runs under
//! - Common domain types (PhoneNumber, RequestUuid, SessionToken)
//! - Error handling utilities
//! - Base configuration

pub mod config;
pub mod domain;
pub mod error;
pub mod service;

pub use config::ServiceConfig;
pub use domain::*;
pub use error::{InspireError, Result};
pub use service::{InspireService, MicroserviceRuntime};
