//! Server-side browser sessions.
//!
//! The browser holds only an opaque id in the `armlink_sid` cookie. OAuth
//! settings, the pending PKCE challenge, and CRM credentials stay in an
//! in-memory cache that expires idle entries.

use std::time::Duration;

use armlink_domain::{CrmSession, LoginChallenge, OAuthSettings};
use axum::extract::FromRequestParts;
use axum::http::header::COOKIE;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use moka::sync::Cache;
use rand::Rng;

use crate::context::AppContext;
use crate::error::ApiError;

pub const SESSION_COOKIE: &str = "armlink_sid";

const MAX_SESSIONS: u64 = 10_000;

#[derive(Debug, Clone, Default)]
pub struct SessionData {
    /// OAuth client used by this browser's login.
    pub oauth: Option<OAuthSettings>,
    /// Challenge issued by `/auth/login`, consumed by `/auth/callback`.
    pub pending: Option<LoginChallenge>,
    pub crm: Option<CrmSession>,
}

#[derive(Clone)]
pub struct SessionStore {
    cache: Cache<String, SessionData>,
}

impl SessionStore {
    pub fn new(idle: Duration) -> Self {
        Self { cache: Cache::builder().max_capacity(MAX_SESSIONS).time_to_idle(idle).build() }
    }

    /// Stores `data` under a fresh random id and returns the id.
    pub fn create(&self, data: SessionData) -> String {
        let bytes: [u8; 32] = rand::thread_rng().gen();
        let id = URL_SAFE_NO_PAD.encode(bytes);
        self.cache.insert(id.clone(), data);
        id
    }

    pub fn get(&self, id: &str) -> Option<SessionData> {
        self.cache.get(id)
    }

    pub fn put(&self, id: &str, data: SessionData) {
        self.cache.insert(id.to_string(), data);
    }

    pub fn remove(&self, id: &str) {
        self.cache.invalidate(id);
    }
}

/// Session id from the request's `Cookie` headers.
pub fn session_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}

pub fn session_cookie(id: &str, secure: bool) -> String {
    let mut cookie = format!("{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

pub fn expired_cookie(secure: bool) -> String {
    let mut cookie = format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// A request whose session holds CRM credentials.
#[derive(Debug, Clone)]
pub struct Authenticated {
    pub session_id: String,
    pub crm: CrmSession,
}

impl FromRequestParts<AppContext> for Authenticated {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppContext) -> Result<Self, Self::Rejection> {
        let session_id = session_id(&parts.headers).ok_or(ApiError::NoSession)?;
        let crm = state.sessions.get(&session_id).and_then(|data| data.crm).ok_or(ApiError::NoSession)?;
        Ok(Self { session_id, crm })
    }
}
