//! HTTP handlers for the trigger endpoint and the IVR webhooks

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, FromRequest, RawQuery, Request, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Form, Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::form_urlencoded;

use crate::error::{GatewayError, Result};
use crate::ivr::{DigitInput, Language, MenuNode};
use crate::provider::CallHandle;
use crate::session::CallContext;
use crate::AppState;

/// Body of `POST /api/call`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerCallRequest {
    pub answer_url: Option<String>,
    pub target_number: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TriggerCallResponse {
    pub success: bool,
    pub message: String,
    pub data: CallHandle,
}

/// Webhook parameters; the provider posts many more fields, all ignored
#[derive(Debug, Default, PartialEq, Eq)]
pub struct WebhookParams {
    pub digits: Option<String>,
    pub lang: Option<String>,
    pub sid: Option<String>,
}

impl WebhookParams {
    pub fn from_query(query: Option<&str>) -> Self {
        query
            .map(|q| Self::from_pairs(q.as_bytes()))
            .unwrap_or_default()
    }

    /// Read `Digits`, `lang` and `sid` from urlencoded pairs; the first
    /// occurrence of each key wins.
    pub fn from_pairs(input: &[u8]) -> Self {
        let mut params = Self::default();
        for (key, value) in form_urlencoded::parse(input) {
            let slot = match key.as_ref() {
                "Digits" => &mut params.digits,
                "lang" => &mut params.lang,
                "sid" => &mut params.sid,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }
        params
    }
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

#[derive(Serialize)]
pub struct ReadyResponse {
    pub ready: bool,
    pub callback_origin_set: bool,
    pub active_sessions: usize,
}

// ============================================
// Health Handlers
// ============================================

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "ivr-gateway".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn ready(State(state): State<AppState>) -> Json<ReadyResponse> {
    Json(ReadyResponse {
        ready: true,
        callback_origin_set: !state.session_config.get().is_empty(),
        active_sessions: state.registry.len(),
    })
}

// ============================================
// Call Trigger
// ============================================

/// Accepts the web form's JSON body or a plain urlencoded form post
pub async fn trigger_call(
    State(state): State<AppState>,
    request: Request,
) -> Result<Json<TriggerCallResponse>> {
    let req = if is_form_post(request.headers()) {
        let Form(req) = Form::<TriggerCallRequest>::from_request(request, &())
            .await
            .map_err(|e| GatewayError::Validation(e.body_text()))?;
        req
    } else {
        let Json(req) = Json::<TriggerCallRequest>::from_request(request, &())
            .await
            .map_err(|e| GatewayError::Validation(e.body_text()))?;
        req
    };

    let handle = state
        .trigger
        .initiate(req.answer_url.as_deref(), req.target_number.as_deref())
        .await?;

    Ok(Json(TriggerCallResponse {
        success: true,
        message: "Call initiated successfully!".to_string(),
        data: handle,
    }))
}

// ============================================
// IVR Webhooks
// ============================================

pub async fn ivr_welcome(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> impl IntoResponse {
    let params = WebhookParams::from_query(query.as_deref());
    let ctx = resolve_context(&state, &params);
    info!(base_url = %ctx.base_url, "Incoming call received");

    answer(&state, MenuNode::Welcome, &DigitInput::Missing, &ctx)
}

pub async fn ivr_language_process(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
    body: std::result::Result<Bytes, BytesRejection>,
) -> impl IntoResponse {
    let (params, digits) = merge_params(query.as_deref(), body);
    let ctx = resolve_context(&state, &params);
    info!(digit = %digits, "Level 1: received digit");

    answer(&state, MenuNode::LanguageProcess, &digits, &ctx)
}

pub async fn ivr_action_process(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
    body: std::result::Result<Bytes, BytesRejection>,
) -> impl IntoResponse {
    let (params, digits) = merge_params(query.as_deref(), body);
    let lang = Language::from_param(params.lang.as_deref());
    let ctx = resolve_context(&state, &params);
    info!(digit = %digits, lang = %lang, "Level 2: received digit");

    answer(&state, MenuNode::ActionProcess(lang), &digits, &ctx)
}

/// Query parameters plus the digit from the form body (or query on GET)
fn merge_params(
    query: Option<&str>,
    body: std::result::Result<Bytes, BytesRejection>,
) -> (WebhookParams, DigitInput) {
    let params = WebhookParams::from_query(query);
    let form = match body {
        Ok(bytes) => WebhookParams::from_pairs(&bytes),
        Err(e) => {
            debug!(error = %e, "Unreadable webhook body");
            WebhookParams::default()
        }
    };
    let digits = DigitInput::parse(form.digits.as_deref().or(params.digits.as_deref()));
    (params, digits)
}

fn is_form_post(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"))
}

fn resolve_context(state: &AppState, params: &WebhookParams) -> CallContext {
    CallContext::resolve(&state.session_config, &state.registry, params.sid.as_deref())
}

fn answer(
    state: &AppState,
    node: MenuNode,
    digits: &DigitInput,
    ctx: &CallContext,
) -> impl IntoResponse {
    let xml = state.ivr.respond_xml(node, digits, ctx);
    (StatusCode::OK, [(header::CONTENT_TYPE, "text/xml")], xml)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_webhook_params_first_value_wins() {
        let params = WebhookParams::from_query(Some("lang=es&lang=en&sid=abc&sid=def"));
        assert_eq!(params.lang.as_deref(), Some("es"));
        assert_eq!(params.sid.as_deref(), Some("abc"));
        assert_eq!(params.digits, None);
    }

    #[test]
    fn test_webhook_params_ignore_provider_fields() {
        let params = WebhookParams::from_pairs(
            b"CallUUID=abc&From=15551234567&Digits=2&To=14155550100&Digits=9",
        );
        assert_eq!(params.digits.as_deref(), Some("2"));
        assert_eq!(params.lang, None);
    }

    #[test]
    fn test_webhook_params_decode_values() {
        let params = WebhookParams::from_query(Some("Digits=%201&lang=e%73"));
        assert_eq!(params.digits.as_deref(), Some(" 1"));
        assert_eq!(params.lang.as_deref(), Some("es"));

        assert_eq!(WebhookParams::from_query(None), WebhookParams::default());
    }
}
