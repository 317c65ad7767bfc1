//! IVR Gateway Microservice
//!
//! Web-form call trigger plus the voice-menu webhooks the provider fetches
//! during the call.

use std::sync::Arc;

use inspire_core::MicroserviceRuntime;
use ivr_gateway::provider::PlivoClient;
use ivr_gateway::{GatewayConfig, IvrGatewayService};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    inspire_telemetry::init("ivr-gateway")?;

    info!("Starting IVR Gateway microservice");

    let config = GatewayConfig::from_env()?;
    let provider = Arc::new(PlivoClient::new(&config.provider)?);

    let service = Arc::new(IvrGatewayService::new(config, provider));
    MicroserviceRuntime::run(service).await?;

    Ok(())
}
