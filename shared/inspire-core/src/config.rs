//! Base configuration shared by every service

use crate::error::{InspireError, Result};
use serde::Deserialize;
use std::env;

/// Identity every service runs under
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub service_name: String,
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            service_name: optional_env("SERVICE_NAME").unwrap_or_else(|| "unknown".to_string()),
        })
    }
}

/// Read a required, non-empty environment variable
pub fn required_env(name: &str) -> Result<String> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(InspireError::Config(format!("{} must be set", name))),
    }
}

/// Read an optional environment variable, treating empty values as unset
pub fn optional_env(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Parse an optional boolean flag ("true"/"1" and "false"/"0")
pub fn flag_env(name: &str, default: bool) -> Result<bool> {
    match optional_env(name) {
        None => Ok(default),
        Some(v) => match v.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            other => Err(InspireError::Config(format!("Invalid {}: {}", name, other))),
        },
    }
}
