//! Outbound call trigger
//!
//! Reduces the submitted callback URL to its origin, records it for the
//! webhooks and asks the voice provider to place the call.

use std::sync::Arc;

use inspire_core::PhoneNumber;
use tracing::{error, info, warn};

use crate::error::{GatewayError, Result};
use crate::ivr::{node_url, MenuNode};
use crate::provider::{AnswerMethod, CallHandle, OutboundCall, VoiceProvider};
use crate::session::{CallContext, Origin, SessionConfig, SessionRegistry};

pub struct CallTrigger {
    provider: Arc<dyn VoiceProvider>,
    session_config: SessionConfig,
    registry: SessionRegistry,
    source_number: PhoneNumber,
    default_target: Option<PhoneNumber>,
    scoped_urls: bool,
}

impl CallTrigger {
    pub fn new(
        provider: Arc<dyn VoiceProvider>,
        session_config: SessionConfig,
        registry: SessionRegistry,
        source_number: PhoneNumber,
        default_target: Option<PhoneNumber>,
        scoped_urls: bool,
    ) -> Self {
        Self {
            provider,
            session_config,
            registry,
            source_number,
            default_target,
            scoped_urls,
        }
    }

    /// Place a call whose webhooks resolve against `answer_origin`.
    ///
    /// `target_number` falls back to the configured default. The shared
    /// origin is overwritten before the provider is contacted.
    pub async fn initiate(
        &self,
        answer_origin: Option<&str>,
        target_number: Option<&str>,
    ) -> Result<CallHandle> {
        let raw = answer_origin
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| GatewayError::Validation("Answer URL (Ngrok) is required.".to_string()))?;

        let target = target_number
            .and_then(PhoneNumber::parse)
            .or_else(|| self.default_target.clone())
            .ok_or_else(|| GatewayError::Validation("Target number is required.".to_string()))?;

        let origin = Origin::sanitize(raw);
        if origin.is_fallback() {
            warn!(answer_url = %raw, "Invalid URL provided, using as-is");
        }
        let base_url = origin.into_string();

        self.session_config.set(&base_url);

        let ctx = if self.scoped_urls {
            let session =
                self.registry
                    .create(&base_url, self.source_number.clone(), target.clone());
            CallContext::scoped(base_url, session.token)
        } else {
            CallContext::new(base_url)
        };

        let call = OutboundCall {
            from: self.source_number.clone(),
            to: target,
            answer_url: node_url(&ctx, MenuNode::Welcome),
            answer_method: AnswerMethod::Get,
        };

        info!(
            from = %call.from,
            to = %call.to,
            answer_url = %call.answer_url,
            "Initiating call"
        );

        match self.provider.originate(&call).await {
            Ok(handle) => {
                info!(request_uuid = %handle.request_uuid, "Call initiated");
                if let Some(token) = &ctx.session {
                    self.registry.attach_request(token, handle.request_uuid.clone());
                }
                Ok(handle)
            }
            Err(e) => {
                error!(to = %call.to, error = %e, "Error initiating call");
                if let Some(token) = &ctx.session {
                    self.registry.remove(token);
                }
                Err(e.into())
            }
        }
    }
}
