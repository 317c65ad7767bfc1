//! IVR Gateway
//!
//! Places outbound calls through the voice provider and answers the
//! provider's webhooks with a two-level voice menu:
//! - Call trigger (`POST /api/call`)
//! - Language and action menus (`/ivr/*`)
//! - Optional per-call session tokens in webhook URLs

pub mod config;
pub mod error;
pub mod handlers;
pub mod ivr;
pub mod markup;
pub mod provider;
pub mod routes;
pub mod service;
pub mod session;
pub mod trigger;

use std::sync::Arc;

pub use config::GatewayConfig;
pub use error::{GatewayError, Result};
pub use service::IvrGatewayService;

use ivr::IvrFlowController;
use provider::VoiceProvider;
use session::{SessionConfig, SessionRegistry};
use trigger::CallTrigger;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub trigger: Arc<CallTrigger>,
    pub ivr: Arc<IvrFlowController>,
    pub session_config: SessionConfig,
    pub registry: SessionRegistry,
}

impl AppState {
    pub fn new(config: &GatewayConfig, provider: Arc<dyn VoiceProvider>) -> Self {
        let session_config = SessionConfig::new();
        let registry = SessionRegistry::new(config.session_ttl_secs);

        let trigger = CallTrigger::new(
            provider,
            session_config.clone(),
            registry.clone(),
            config.source_number.clone(),
            config.default_target_number.clone(),
            config.session_scoped_urls,
        );
        let ivr = IvrFlowController::new(
            config.source_number.clone(),
            config.associate_number.clone(),
        );

        Self {
            trigger: Arc::new(trigger),
            ivr: Arc::new(ivr),
            session_config,
            registry,
        }
    }
}

/// Build the HTTP application
pub fn app(config: &GatewayConfig, provider: Arc<dyn VoiceProvider>) -> axum::Router {
    routes::create_router(AppState::new(config, provider), &config.public_dir)
}
