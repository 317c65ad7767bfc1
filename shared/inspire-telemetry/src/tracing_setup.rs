//! Subscriber installation

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{TelemetryConfig, TelemetryError};

/// Filter used when `RUST_LOG` is unset: the configured level, with the HTTP
/// client's connection chatter held at `warn`
fn default_filter(config: &TelemetryConfig) -> EnvFilter {
    EnvFilter::new(format!("{},hyper_util=warn,reqwest=warn", config.log_level))
}

/// Install the global subscriber; JSON lines or plain text per config
pub fn init_tracing(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(config));

    let json = config
        .json_logs
        .then(|| fmt::layer().json().with_current_span(false).with_target(true));
    let plain = (!config.json_logs).then(|| fmt::layer().with_target(false));

    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(plain)
        .try_init()
        .map_err(|e| TelemetryError::TracingInit(e.to_string()))?;

    tracing::info!(
        service = %config.service_name,
        json_logs = config.json_logs,
        "Logging ready"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_keeps_configured_level() {
        let config = TelemetryConfig {
            log_level: "debug".to_string(),
            ..TelemetryConfig::new("ivr-gateway")
        };
        let filter = default_filter(&config).to_string();
        assert!(filter.contains("debug"));
        assert!(filter.contains("reqwest=warn"));
    }
}
