//! Service lifecycle for the IVR gateway

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use inspire_core::{InspireService, Result};
use tracing::{debug, info};

use crate::provider::VoiceProvider;
use crate::{routes, AppState, GatewayConfig};

/// How often expired call sessions are swept
const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

pub struct IvrGatewayService {
    config: GatewayConfig,
    state: AppState,
}

impl IvrGatewayService {
    pub fn new(config: GatewayConfig, provider: Arc<dyn VoiceProvider>) -> Self {
        let state = AppState::new(&config, provider);
        Self { config, state }
    }
}

#[async_trait]
impl InspireService for IvrGatewayService {
    fn service_id(&self) -> &'static str {
        "ivr-gateway"
    }

    async fn shutdown(&self) -> Result<()> {
        info!(
            active_sessions = self.state.registry.len(),
            "Shutting down IVR gateway"
        );
        Ok(())
    }

    async fn start(&self) -> Result<()> {
        info!(
            bind = %self.config.http_bind,
            source = %self.config.source_number,
            scoped_urls = self.config.session_scoped_urls,
            "Starting IVR gateway"
        );

        if self.config.session_scoped_urls {
            let registry = self.state.registry.clone();
            tokio::spawn(async move {
                let mut ticker = tokio::time::interval(SESSION_SWEEP_INTERVAL);
                loop {
                    ticker.tick().await;
                    let removed = registry.cleanup_expired();
                    if removed > 0 {
                        debug!(removed, "Expired call sessions removed");
                    }
                }
            });
        }

        let app = routes::create_router(self.state.clone(), &self.config.public_dir);

        let listener = tokio::net::TcpListener::bind(self.config.http_bind).await?;
        info!("IVR Server is running on {}", self.config.http_bind);
        axum::serve(listener, app).await?;

        Ok(())
    }
}
