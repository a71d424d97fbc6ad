//! Auth Pass-Through
//!
//! Credential sign-in, sign-out and password-reset requests against the hosted auth
//! service. Nothing is persisted here; listeners are told when the session changes.

use std::sync::{Arc, Mutex};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use super::rest::RestContext;
use crate::domain::{DomainError, DomainResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
}

/// Tokens returned by a successful sign-in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    pub user: AuthUser,
}

impl AuthSession {
    pub fn user_id(&self) -> Uuid {
        self.user.id
    }

    /// Expiry (unix seconds) read from the access token
    pub fn expires_at(&self) -> Option<i64> {
        decode_claims(&self.access_token).ok().and_then(|c| c.exp)
    }

    pub fn is_expired(&self, now_unix: i64) -> bool {
        self.expires_at().map_or(false, |exp| exp <= now_unix)
    }
}

/// Payload section of a JWT access token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,
    #[serde(default)]
    pub exp: Option<i64>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

/// Decode (without verifying) the claims of a JWT
pub fn decode_claims(token: &str) -> DomainResult<JwtClaims> {
    let payload = token
        .split('.')
        .nth(1)
        .ok_or_else(|| DomainError::InvalidInput("token is not a JWT".into()))?;
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| DomainError::Serialization(format!("token payload: {}", e)))?;
    serde_json::from_slice(&bytes).map_err(DomainError::from)
}

/// Session change notification
#[derive(Debug, Clone, PartialEq)]
pub enum AuthEvent {
    SignedIn(Uuid),
    SignedOut,
}

type Listener = Box<dyn Fn(&AuthEvent) + Send + Sync>;

#[derive(Clone)]
pub struct AuthClient {
    ctx: RestContext,
    listeners: Arc<Mutex<Vec<Listener>>>,
}

impl AuthClient {
    pub fn new(ctx: RestContext) -> Self {
        Self {
            ctx,
            listeners: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Register a session-change listener
    pub fn subscribe(&self, listener: impl Fn(&AuthEvent) + Send + Sync + 'static) {
        if let Ok(mut listeners) = self.listeners.lock() {
            listeners.push(Box::new(listener));
        }
    }

    fn emit(&self, event: AuthEvent) {
        if let Ok(listeners) = self.listeners.lock() {
            for listener in listeners.iter() {
                listener(&event);
            }
        }
    }

    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> DomainResult<AuthSession> {
        let url = format!("{}?grant_type=password", self.ctx.config().auth_url("token"));
        let request = self
            .ctx
            .request(Method::POST, &url)
            .json(&json!({ "email": email, "password": password }));
        let body = self.ctx.send_json(request).await.map_err(|e| match e {
            DomainError::Backend { status: 400, message } => DomainError::Unauthorized(message),
            other => other,
        })?;
        let session: AuthSession = serde_json::from_value(body)?;

        self.ctx.set_access_token(Some(session.access_token.clone()));
        log::info!("[AUTH] signed in {}", session.user.id);
        self.emit(AuthEvent::SignedIn(session.user.id));
        Ok(session)
    }

    /// Reuse a session kept from an earlier visit; expired sessions are refused
    pub fn restore(&self, session: &AuthSession, now_unix: i64) -> DomainResult<()> {
        if session.is_expired(now_unix) {
            return Err(DomainError::Unauthorized("session expired".into()));
        }
        self.ctx.set_access_token(Some(session.access_token.clone()));
        log::info!("[AUTH] restored session for {}", session.user.id);
        self.emit(AuthEvent::SignedIn(session.user.id));
        Ok(())
    }

    /// Revoke the current token; local state is cleared even if the request fails
    pub async fn sign_out(&self) -> DomainResult<()> {
        let request = self.ctx.request(Method::POST, &self.ctx.config().auth_url("logout"));
        let result = self.ctx.send(request).await.map(|_| ());
        self.ctx.set_access_token(None);
        self.emit(AuthEvent::SignedOut);
        if let Err(e) = &result {
            log::warn!("[AUTH] logout request failed: {}", e);
        }
        result
    }

    /// Ask the auth service to email a password-reset link
    pub async fn reset_password_for_email(&self, email: &str, redirect_to: Option<&str>) -> DomainResult<()> {
        let mut url = self.ctx.config().auth_url("recover");
        if let Some(redirect) = redirect_to {
            url = format!(
                "{}?redirect_to={}",
                url,
                percent_encoding::utf8_percent_encode(redirect, percent_encoding::NON_ALPHANUMERIC)
            );
        }
        let request = self.ctx.request(Method::POST, &url).json(&json!({ "email": email }));
        self.ctx.send(request).await?;
        log::info!("[AUTH] password reset requested");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendConfig;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn token_with(payload: &str) -> String {
        format!("eyJhbGciOiJIUzI1NiJ9.{}.sig", URL_SAFE_NO_PAD.encode(payload))
    }

    #[test]
    fn test_decode_claims() {
        let token = token_with(r#"{"sub":"6f1c1a1e-8a53-4c53-9d59-0c1d1b7a0a11","exp":1700000000,"role":"authenticated"}"#);
        let claims = decode_claims(&token).unwrap();
        assert_eq!(claims.sub, "6f1c1a1e-8a53-4c53-9d59-0c1d1b7a0a11");
        assert_eq!(claims.exp, Some(1_700_000_000));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_claims("not-a-token").is_err());
        assert!(decode_claims("a.!!!.c").is_err());
    }

    #[test]
    fn test_session_expiry() {
        let session = AuthSession {
            access_token: token_with(r#"{"sub":"x","exp":100}"#),
            refresh_token: None,
            expires_in: Some(3600),
            user: AuthUser { id: Uuid::nil(), email: None },
        };
        assert_eq!(session.expires_at(), Some(100));
        assert!(session.is_expired(100));
        assert!(!session.is_expired(99));
    }

    #[test]
    fn test_listeners_receive_events() {
        let ctx = RestContext::new(BackendConfig::new("https://demo.example.co", "anon")).unwrap();
        let auth = AuthClient::new(ctx);
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = seen.clone();
        auth.subscribe(move |event| {
            if *event == AuthEvent::SignedOut {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });
        auth.emit(AuthEvent::SignedOut);
        auth.emit(AuthEvent::SignedIn(Uuid::nil()));
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_restore_sets_token_unless_expired() {
        let ctx = RestContext::new(BackendConfig::new("https://demo.example.co", "anon")).unwrap();
        let auth = AuthClient::new(ctx.clone());
        let session = AuthSession {
            access_token: token_with(r#"{"sub":"x","exp":100}"#),
            refresh_token: None,
            expires_in: None,
            user: AuthUser { id: Uuid::nil(), email: None },
        };

        assert!(matches!(auth.restore(&session, 200), Err(DomainError::Unauthorized(_))));
        assert_eq!(ctx.access_token(), None);

        auth.restore(&session, 50).unwrap();
        assert_eq!(ctx.access_token(), Some(session.access_token.clone()));
    }
}
