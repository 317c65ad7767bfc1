//! Router tests for the trigger endpoint and the IVR webhooks

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use inspire_core::{PhoneNumber, RequestUuid};
use ivr_gateway::config::{ProviderConfig, ProviderCredentials};
use ivr_gateway::provider::{CallHandle, OutboundCall, ProviderError, VoiceProvider};
use ivr_gateway::{app, GatewayConfig};
use parking_lot::Mutex;
use tower::ServiceExt;

const SOURCE: &str = "14155550100";

#[derive(Default)]
struct FakeProvider {
    calls: Mutex<Vec<OutboundCall>>,
    reject_with: Option<String>,
}

#[async_trait]
impl VoiceProvider for FakeProvider {
    async fn originate(&self, call: &OutboundCall) -> Result<CallHandle, ProviderError> {
        self.calls.lock().push(call.clone());
        if let Some(message) = &self.reject_with {
            return Err(ProviderError::Rejected {
                status: 401,
                message: message.clone(),
            });
        }
        let n = self.calls.lock().len();
        Ok(CallHandle {
            request_uuid: RequestUuid(format!("req-{}", n)),
            api_id: Some("api-1".to_string()),
            message: Some("call fired".to_string()),
        })
    }
}

fn config(scoped: bool) -> GatewayConfig {
    GatewayConfig {
        http_bind: "127.0.0.1:0".parse().unwrap(),
        provider: ProviderConfig {
            credentials: ProviderCredentials {
                auth_id: "MAXXXXXXXXXXXXXXXXXX".to_string(),
                auth_token: "secret".to_string(),
            },
            api_base_url: "http://127.0.0.1:9".to_string(),
            request_timeout: None,
        },
        source_number: PhoneNumber::new(SOURCE),
        default_target_number: Some(PhoneNumber::new("15550000000")),
        associate_number: PhoneNumber::new("919035864327"),
        public_dir: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("public"),
        session_scoped_urls: scoped,
        session_ttl_secs: 3600,
    }
}

fn setup(provider: Arc<FakeProvider>, scoped: bool) -> Router {
    app(&config(scoped), provider)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Option<String>, String) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, content_type, String::from_utf8(bytes.to_vec()).unwrap())
}

fn trigger_request(body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .uri("/api/call")
        .method("POST")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn webhook(uri: &str, form: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method("POST")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_trigger_then_welcome_scenario() {
    let provider = Arc::new(FakeProvider::default());
    let app = setup(provider.clone(), false);

    let (status, _, body) = send(
        &app,
        trigger_request(serde_json::json!({
            "answerUrl": "https://abc.ngrok.io/ivr/welcome",
            "targetNumber": "15551234567"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["requestUuid"], "req-1");

    {
        let calls = provider.calls.lock();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].answer_url, "https://abc.ngrok.io/ivr/welcome");
        assert_eq!(calls[0].to.as_str(), "15551234567");
        assert_eq!(calls[0].from.as_str(), SOURCE);
    }

    let (status, content_type, xml) = send(&app, get("/ivr/welcome")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("text/xml"));
    assert!(xml.contains(
        r#"<GetInput action="https://abc.ngrok.io/ivr/level1_process" method="POST" numDigits="1">"#
    ));
}

#[tokio::test]
async fn test_missing_answer_url_is_rejected_without_calling_provider() {
    let provider = Arc::new(FakeProvider::default());
    let app = setup(provider.clone(), false);

    let (status, _, body) = send(
        &app,
        trigger_request(serde_json::json!({ "targetNumber": "15551234567" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "Answer URL (Ngrok) is required.");
    assert!(provider.calls.lock().is_empty());
}

#[tokio::test]
async fn test_malformed_trigger_body_is_rejected() {
    let provider = Arc::new(FakeProvider::default());
    let app = setup(provider.clone(), false);

    let request = Request::builder()
        .uri("/api/call")
        .method("POST")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, _, _) = send(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(provider.calls.lock().is_empty());
}

#[tokio::test]
async fn test_provider_failure_returns_500_with_message() {
    let provider = Arc::new(FakeProvider {
        calls: Mutex::new(Vec::new()),
        reject_with: Some("Authentication credentials invalid".to_string()),
    });
    let app = setup(provider.clone(), false);

    let (status, _, body) = send(
        &app,
        trigger_request(serde_json::json!({ "answerUrl": "https://abc.ngrok.io" })),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "Authentication credentials invalid");
    assert_eq!(provider.calls.lock().len(), 1);
}

#[tokio::test]
async fn test_language_and_action_webhooks() {
    let provider = Arc::new(FakeProvider::default());
    let app = setup(provider, false);

    send(
        &app,
        trigger_request(serde_json::json!({ "answerUrl": "https://abc.ngrok.io/" })),
    )
    .await;

    let (_, _, xml) = send(
        &app,
        webhook("/ivr/level1_process", "Digits=2&CallUUID=abc&From=15551234567"),
    )
    .await;
    assert!(xml.contains(r#"action="https://abc.ngrok.io/ivr/action_process?lang=es""#));
    assert!(xml.contains(r#"<Speak language="es-US">"#));

    let (_, _, xml) = send(&app, webhook("/ivr/action_process?lang=es", "Digits=1")).await;
    assert!(xml.contains("<Play>https://s3.amazonaws.com/plivocloud/music.mp3</Play>"));

    let (_, _, xml) = send(&app, webhook("/ivr/action_process?lang=en", "Digits=2")).await;
    assert!(xml.contains(r#"<Dial callerId="14155550100"><Number>919035864327</Number></Dial>"#));
}

#[tokio::test]
async fn test_get_webhook_reads_digits_from_query() {
    let app = setup(Arc::new(FakeProvider::default()), false);

    let (status, _, xml) = send(&app, get("/ivr/level1_process?Digits=1")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(xml.contains("/ivr/action_process?lang=en"));
}

#[tokio::test]
async fn test_webhook_without_body_still_answers_markup() {
    let app = setup(Arc::new(FakeProvider::default()), false);

    let request = Request::builder()
        .uri("/ivr/action_process?lang=fr")
        .method("POST")
        .body(Body::empty())
        .unwrap();
    let (status, content_type, xml) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("text/xml"));
    assert!(xml.contains("<Speak>Invalid input. Please try again.</Speak>"));
    assert!(xml.contains("<Redirect>/ivr/welcome</Redirect>"));
}

#[tokio::test]
async fn test_second_trigger_moves_shared_origin() {
    let app = setup(Arc::new(FakeProvider::default()), false);

    for origin in ["https://one.ngrok.io", "https://two.ngrok.io"] {
        send(&app, trigger_request(serde_json::json!({ "answerUrl": origin }))).await;
    }

    let (_, _, xml) = send(&app, webhook("/ivr/level1_process", "Digits=9")).await;
    assert!(xml.contains("<Redirect>https://two.ngrok.io/ivr/welcome</Redirect>"));
}

#[tokio::test]
async fn test_scoped_sessions_keep_their_origin() {
    let provider = Arc::new(FakeProvider::default());
    let app = setup(provider.clone(), true);

    for origin in ["https://one.ngrok.io", "https://two.ngrok.io"] {
        send(&app, trigger_request(serde_json::json!({ "answerUrl": origin }))).await;
    }

    let first_answer = provider.calls.lock()[0].answer_url.clone();
    let path = first_answer.strip_prefix("https://one.ngrok.io").unwrap();
    assert!(path.starts_with("/ivr/welcome?sid="));

    let (_, _, xml) = send(&app, get(path)).await;
    let sid = &path["/ivr/welcome?sid=".len()..];
    assert!(xml.contains(&format!(
        r#"action="https://one.ngrok.io/ivr/level1_process?sid={}""#,
        sid
    )));

    let (_, _, xml) = send(
        &app,
        webhook(&format!("/ivr/level1_process?sid={}", sid), "Digits=1"),
    )
    .await;
    assert!(xml.contains(&format!(
        "https://one.ngrok.io/ivr/action_process?lang=en&amp;sid={}",
        sid
    )));
}

#[tokio::test]
async fn test_health_and_form_page() {
    let app = setup(Arc::new(FakeProvider::default()), false);

    let (status, _, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["service"], "ivr-gateway");

    let (status, _, body) = send(&app, get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("callForm"));
}

#[tokio::test]
async fn test_repeated_query_keys_keep_language() {
    let app = setup(Arc::new(FakeProvider::default()), false);

    let (status, _, xml) = send(
        &app,
        webhook("/ivr/action_process?lang=es&lang=es", "Digits=1"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(xml.contains(r#"<Speak language="es-US">Reproduciendo su mensaje en español.</Speak>"#));
    assert!(xml.contains("<Play>https://s3.amazonaws.com/plivocloud/music.mp3</Play>"));
}

#[tokio::test]
async fn test_form_encoded_trigger_is_accepted() {
    let provider = Arc::new(FakeProvider::default());
    let app = setup(provider.clone(), false);

    let request = Request::builder()
        .uri("/api/call")
        .method("POST")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(
            "answerUrl=https%3A%2F%2Fabc.ngrok.io%2Fivr%2Fwelcome&targetNumber=15551234567",
        ))
        .unwrap();
    let (status, _, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["success"], true);

    let calls = provider.calls.lock();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].answer_url, "https://abc.ngrok.io/ivr/welcome");
    assert_eq!(calls[0].to.as_str(), "15551234567");
}

#[tokio::test]
async fn test_form_encoded_trigger_without_answer_url_is_rejected() {
    let provider = Arc::new(FakeProvider::default());
    let app = setup(provider.clone(), false);

    let request = Request::builder()
        .uri("/api/call")
        .method("POST")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("targetNumber=15551234567"))
        .unwrap();
    let (status, _, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["error"], "Answer URL (Ngrok) is required.");
    assert!(provider.calls.lock().is_empty());
}
