//! Voice provider client
//!
//! Originates outbound calls through the Plivo REST API. The trait seam lets
//! the HTTP layer run against a fake provider in tests.

use async_trait::async_trait;
use inspire_core::{PhoneNumber, RequestUuid};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::ProviderConfig;

#[derive(Debug, Error)]
pub enum ProviderError {
    /// The request never got a response (DNS, TLS, connection reset, timeout)
    #[error("Voice provider unreachable: {0}")]
    Transport(String),

    /// The provider answered with a non-success status; message is verbatim
    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("Unexpected provider response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ProviderError::Decode(err.to_string())
        } else {
            ProviderError::Transport(err.to_string())
        }
    }
}

/// HTTP method the provider uses to fetch the answer URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AnswerMethod {
    Get,
    Post,
}

/// Outbound call request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundCall {
    pub from: PhoneNumber,
    pub to: PhoneNumber,
    pub answer_url: String,
    pub answer_method: AnswerMethod,
}

/// Accepted originate request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallHandle {
    pub request_uuid: RequestUuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Anything that can place an outbound call
#[async_trait]
pub trait VoiceProvider: Send + Sync {
    async fn originate(&self, call: &OutboundCall) -> Result<CallHandle, ProviderError>;
}

#[derive(Debug, Serialize)]
struct CreateCallRequest<'a> {
    from: &'a str,
    to: &'a str,
    answer_url: &'a str,
    answer_method: AnswerMethod,
}

#[derive(Debug, Deserialize)]
struct CreateCallResponse {
    request_uuid: String,
    #[serde(default)]
    api_id: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Plivo REST client
pub struct PlivoClient {
    client: Client,
    base_url: String,
    auth_id: String,
    auth_token: String,
}

impl PlivoClient {
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            auth_id: config.credentials.auth_id.clone(),
            auth_token: config.credentials.auth_token.clone(),
        })
    }

    fn calls_url(&self) -> String {
        format!("{}/v1/Account/{}/Call/", self.base_url, self.auth_id)
    }
}

#[async_trait]
impl VoiceProvider for PlivoClient {
    async fn originate(&self, call: &OutboundCall) -> Result<CallHandle, ProviderError> {
        let request = CreateCallRequest {
            from: call.from.as_str(),
            to: call.to.as_str(),
            answer_url: &call.answer_url,
            answer_method: call.answer_method,
        };

        debug!(url = %self.calls_url(), to = %call.to, "Sending originate request");

        let response = self
            .client
            .post(self.calls_url())
            .basic_auth(&self.auth_id, Some(&self.auth_token))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            let body: CreateCallResponse = response.json().await?;
            Ok(CallHandle {
                request_uuid: RequestUuid(body.request_uuid),
                api_id: body.api_id,
                message: body.message,
            })
        } else {
            let text = response.text().await.unwrap_or_default();
            Err(ProviderError::Rejected {
                status: status.as_u16(),
                message: error_message(status.as_u16(), &text),
            })
        }
    }
}

/// Pull the human-readable message out of a provider error body
fn error_message(status: u16, body: &str) -> String {
    let from_json = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| match v.get("error") {
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            Some(other) if !other.is_null() => Some(other.to_string()),
            _ => None,
        });

    match from_json {
        Some(message) => message,
        None if !body.trim().is_empty() => body.trim().to_string(),
        None => format!("provider returned HTTP {}", status),
    }
}
