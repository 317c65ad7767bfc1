//! Call session state
//!
//! `SessionConfig` holds the callback origin of the most recent trigger
//! (last writer wins). `SessionRegistry` keeps one `CallSession` per trigger
//! when session-scoped URLs are enabled, so a live call keeps resolving
//! against its own origin.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use inspire_core::{PhoneNumber, RequestUuid, SessionToken};
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Result of reducing user input to a callback origin
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    /// Parsed and reduced to scheme://host[:port]
    Parsed(String),
    /// Could not be parsed; the raw input is used unchanged
    Raw(String),
}

impl Origin {
    /// Reduce a URL to its origin, dropping path, query and fragment.
    ///
    /// Unparseable input is passed through unchanged.
    pub fn sanitize(input: &str) -> Self {
        match Url::parse(input) {
            Ok(url) => Origin::Parsed(url.origin().ascii_serialization()),
            Err(_) => Origin::Raw(input.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Origin::Parsed(s) | Origin::Raw(s) => s,
        }
    }

    pub fn into_string(self) -> String {
        match self {
            Origin::Parsed(s) | Origin::Raw(s) => s,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Origin::Raw(_))
    }
}

/// Process-wide callback origin, replaced whole on every trigger
#[derive(Debug, Clone)]
pub struct SessionConfig {
    base_url: Arc<RwLock<Arc<str>>>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionConfig {
    pub fn new() -> Self {
        Self {
            base_url: Arc::new(RwLock::new(Arc::from(""))),
        }
    }

    pub fn set(&self, origin: &str) {
        *self.base_url.write() = Arc::from(origin);
    }

    /// Current origin; empty before the first trigger
    pub fn get(&self) -> Arc<str> {
        self.base_url.read().clone()
    }
}

/// One triggered call, as far as the webhooks need to know it
#[derive(Debug, Clone)]
pub struct CallSession {
    pub token: SessionToken,
    pub base_url: String,
    pub source_number: PhoneNumber,
    pub target_number: PhoneNumber,
    pub request_id: Option<RequestUuid>,
    pub created_at: DateTime<Utc>,
    pub ttl_secs: u64,
}

impl CallSession {
    pub fn new(
        base_url: &str,
        source_number: PhoneNumber,
        target_number: PhoneNumber,
        ttl: Duration,
    ) -> Self {
        Self {
            token: SessionToken::generate(),
            base_url: base_url.to_string(),
            source_number,
            target_number,
            request_id: None,
            created_at: Utc::now(),
            ttl_secs: ttl.as_secs(),
        }
    }

    pub fn is_expired(&self) -> bool {
        let elapsed = Utc::now().signed_duration_since(self.created_at);
        elapsed.num_seconds() > i64::try_from(self.ttl_secs).unwrap_or(i64::MAX)
    }
}

/// In-memory session registry keyed by URL token
#[derive(Clone)]
pub struct SessionRegistry {
    sessions: Arc<DashMap<SessionToken, CallSession>>,
    session_ttl: Duration,
}

impl SessionRegistry {
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            session_ttl: Duration::from_secs(ttl_secs),
        }
    }

    /// Register a new session for a call about to be placed
    pub fn create(
        &self,
        base_url: &str,
        source_number: PhoneNumber,
        target_number: PhoneNumber,
    ) -> CallSession {
        let session = CallSession::new(base_url, source_number, target_number, self.session_ttl);
        self.sessions.insert(session.token.clone(), session.clone());
        session
    }

    /// Attach the provider request id once the originate succeeded
    pub fn attach_request(&self, token: &SessionToken, request_id: RequestUuid) {
        if let Some(mut session) = self.sessions.get_mut(token) {
            session.request_id = Some(request_id);
        }
    }

    /// Drop a session whose call was never placed
    pub fn remove(&self, token: &SessionToken) {
        self.sessions.remove(token);
    }

    /// Live session for a token, if any
    pub fn get(&self, token: &SessionToken) -> Option<CallSession> {
        self.sessions
            .get(token)
            .filter(|s| !s.is_expired())
            .map(|s| s.value().clone())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Remove expired sessions (called periodically)
    pub fn cleanup_expired(&self) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, session| !session.is_expired());
        before.saturating_sub(self.sessions.len())
    }
}

/// Everything a webhook needs to build its URLs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallContext {
    pub base_url: String,
    pub session: Option<SessionToken>,
}

impl CallContext {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            session: None,
        }
    }

    pub fn scoped(base_url: impl Into<String>, token: SessionToken) -> Self {
        Self {
            base_url: base_url.into(),
            session: Some(token),
        }
    }

    /// Resolve the context for an inbound webhook.
    ///
    /// A known session token wins; otherwise the shared origin is used.
    pub fn resolve(
        config: &SessionConfig,
        registry: &SessionRegistry,
        token: Option<&str>,
    ) -> Self {
        if let Some(token) = token.filter(|t| !t.is_empty()) {
            let token = SessionToken(token.to_string());
            if let Some(session) = registry.get(&token) {
                return Self::scoped(session.base_url, token);
            }
            tracing::debug!(sid = %token, "Unknown session token, using shared origin");
        }
        Self::new(config.get().to_string())
    }
}
