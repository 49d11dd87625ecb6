use std::convert::Infallible;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, header, request::Parts},
};
use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

use crate::{
    config::{AppConfig, Env},
    models::CurrentUser,
};

/// Header honoured in `Env::Local` to impersonate a role without a token.
pub const DEV_ROLE_HEADER: &str = "x-dev-role";

/// Claims
///
/// Payload of the storefront session token issued by the shop API at login.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub user_id: i64,
    pub username: String,
    /// `USER` or `ADMIN`.
    pub role_type: String,
    pub exp: usize,
    pub iat: usize,
    pub iss: String,
}

/// Role
///
/// The role a session acts under. Anonymous sessions, and tokens carrying an
/// unknown role, map to `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
#[ts(export)]
pub enum Role {
    User,
    Admin,
    #[default]
    None,
}

impl Role {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "USER" => Role::User,
            "ADMIN" => Role::Admin,
            _ => Role::None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub id: i64,
    pub username: String,
    pub expires_at: Option<DateTime<Utc>>,
}

impl SessionUser {
    pub fn new(id: i64, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            expires_at: None,
        }
    }
}

/// Session
///
/// Authentication and role state for one request. Built from the presented
/// credential and handed to the guard explicitly; the guard only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Session {
    pub user: Option<SessionUser>,
    pub role: Role,
    /// A credential was presented but rejected (expired, bad signature, wrong issuer).
    pub stale_credential: bool,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn signed_in(user: SessionUser, role: Role) -> Self {
        Self {
            user: Some(user),
            role,
            stale_credential: false,
        }
    }

    fn stale() -> Self {
        Self {
            stale_credential: true,
            ..Self::default()
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.is_logged_in() && self.role == Role::Admin
    }

    pub fn is_user(&self) -> bool {
        self.is_logged_in() && self.role == Role::User
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.is_logged_in() && self.role == role
    }

    pub fn current_user(&self) -> Option<CurrentUser> {
        let user = self.user.as_ref()?;
        Some(CurrentUser {
            id: user.id,
            name: user.username.clone(),
            role: self.role,
            is_admin: self.is_admin(),
            is_user: self.is_user(),
            expires_at: user.expires_at,
        })
    }

    /// from_token
    ///
    /// Validates signature, expiry and issuer. Never fails: a rejected token
    /// yields an anonymous session flagged as stale so the caller can clear it.
    pub fn from_token(token: &str, config: &AppConfig) -> Self {
        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.set_issuer(&[config.jwt_issuer.as_str()]);

        match decode::<Claims>(token, &decoding_key, &validation) {
            Ok(data) => {
                let claims = data.claims;
                let user = SessionUser {
                    id: claims.user_id,
                    username: claims.username,
                    expires_at: DateTime::from_timestamp(claims.exp as i64, 0),
                };
                Self::signed_in(user, Role::parse(&claims.role_type))
            }
            Err(e) => {
                match e.kind() {
                    ErrorKind::ExpiredSignature => tracing::debug!("session token expired"),
                    kind => tracing::debug!(?kind, "session token rejected"),
                }
                Self::stale()
            }
        }
    }
}

/// Session Extractor
///
/// Resolution order:
/// 1. `Authorization: Bearer <token>` (API calls from the storefront).
/// 2. The session cookie (plain page navigations).
/// 3. In `Env::Local` only, the `x-dev-role` header.
///
/// Infallible: anything unusable degrades to an anonymous session, leaving
/// the allow/redirect verdict to the guard.
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
    AppConfig: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = AppConfig::from_ref(state);

        let token = bearer_token(&parts.headers)
            .or_else(|| cookie_value(&parts.headers, &config.session_cookie));
        if let Some(token) = token {
            return Ok(Session::from_token(token, &config));
        }

        if config.env == Env::Local {
            let role = parts
                .headers
                .get(DEV_ROLE_HEADER)
                .and_then(|value| value.to_str().ok())
                .map(Role::parse);
            if let Some(role @ (Role::User | Role::Admin)) = role {
                tracing::debug!(?role, "using development session");
                return Ok(Session::signed_in(SessionUser::new(0, "developer"), role));
            }
        }

        Ok(Session::anonymous())
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}
