//! Session verification against the managed auth service.
//!
//! A caller proves identity with the access token issued by the auth
//! service, sent either as `Authorization: Bearer <token>` or in the
//! `sb-access-token` cookie. The token is checked remotely on every request;
//! nothing is cached.

use std::time::Duration;

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use cookie::Cookie;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;
use crate::store::Owner;

pub const SESSION_COOKIE: &str = "sb-access-token";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Auth service returned status {0}")]
    Status(u16),
}

#[async_trait]
pub trait SessionVerifier: Send + Sync {
    /// `Ok(None)` means the token was understood and rejected.
    async fn verify(&self, token: &str) -> Result<Option<Uuid>, SessionError>;
}

#[derive(Deserialize)]
struct AuthUser {
    id: Uuid,
}

pub struct ManagedAuthVerifier {
    client: Client,
    auth_url: String,
    anon_key: String,
}

impl ManagedAuthVerifier {
    pub fn new(auth_url: &str, anon_key: &str, timeout: Duration) -> Result<Self, SessionError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            auth_url: auth_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
        })
    }
}

#[async_trait]
impl SessionVerifier for ManagedAuthVerifier {
    async fn verify(&self, token: &str) -> Result<Option<Uuid>, SessionError> {
        let response = self
            .client
            .get(format!("{}/auth/v1/user", self.auth_url))
            .bearer_auth(token)
            .header("apikey", &self.anon_key)
            .send()
            .await?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(None),
            status if status.is_success() => Ok(Some(response.json::<AuthUser>().await?.id)),
            status => Err(SessionError::Status(status.as_u16())),
        }
    }
}

/// Access token from the request, header first, then cookie.
pub fn session_token(parts: &Parts) -> Option<String> {
    let bearer = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());
    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    parts
        .headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|c| c.name() == SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|t| !t.is_empty())
}

/// Optional verified caller. A missing or rejected token yields
/// `Session(None)`; a token the auth service could not check fails the
/// request, so a signed-in caller is never downgraded to anonymous.
#[derive(Debug, Clone, Copy)]
pub struct Session(pub Option<Uuid>);

#[axum::async_trait]
impl FromRequestParts<AppState> for Session {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(token) = session_token(parts) else {
            return Ok(Session(None));
        };
        match state.sessions.verify(&token).await {
            Ok(user) => Ok(Session(user)),
            Err(err) => {
                warn!(error = %err, "Session verification failed");
                Err(AppError::Internal(anyhow::anyhow!(
                    "Session could not be verified: {err}"
                )))
            }
        }
    }
}

/// Verified caller, or 401.
#[derive(Debug, Clone, Copy)]
pub struct RequireUser(pub Uuid);

#[axum::async_trait]
impl FromRequestParts<AppState> for RequireUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Session(user) = Session::from_request_parts(parts, state).await?;
        user.map(RequireUser)
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
    }
}

/// Decides which owner a new analysis is stored under. A caller may only name
/// a user id that matches their own verified session.
pub fn resolve_owner(session: Option<Uuid>, explicit: Option<Uuid>) -> Result<Owner, AppError> {
    match (session, explicit) {
        (None, Some(_)) => Err(AppError::Unauthorized(
            "A user id requires a verified session".to_string(),
        )),
        (Some(session), Some(explicit)) if session != explicit => Err(AppError::Unauthorized(
            "User id does not match the session".to_string(),
        )),
        (Some(session), _) => Ok(Owner::User(session)),
        (None, None) => Ok(Owner::Service),
    }
}

#[cfg(test)]
pub mod fixed {
    use std::collections::HashMap;

    use super::*;

    /// Accepts a fixed set of tokens.
    #[derive(Default)]
    pub struct StaticSessionVerifier {
        tokens: HashMap<String, Uuid>,
    }

    impl StaticSessionVerifier {
        pub fn with_token(mut self, token: &str, user: Uuid) -> Self {
            self.tokens.insert(token.to_string(), user);
            self
        }
    }

    #[async_trait]
    impl SessionVerifier for StaticSessionVerifier {
        async fn verify(&self, token: &str) -> Result<Option<Uuid>, SessionError> {
            Ok(self.tokens.get(token).copied())
        }
    }
}
