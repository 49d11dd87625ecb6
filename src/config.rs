use std::{env, net::SocketAddr};

use crate::error::ConfigError;

const LOCAL_JWT_SECRET: &str = "super-secure-test-secret-value-local";

/// AppConfig
///
/// Holds the shell server's configuration. Immutable once loaded and pulled
/// into handlers and extractors via `FromRef`.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Controls the development session header and log format.
    pub env: Env,
    // HMAC secret used to validate storefront session tokens.
    pub jwt_secret: String,
    // Expected `iss` claim on session tokens.
    pub jwt_issuer: String,
    // Shown after every page title: "{title} - {site_name}".
    pub site_name: String,
    // Cookie carrying the session token on page navigations.
    pub session_cookie: String,
    // URL prefix of the built single-page bundle.
    pub asset_base: String,
    pub bind_addr: SocketAddr,
}

/// Env
///
/// Local enables developer conveniences (pretty logs, `x-dev-role` sessions);
/// Production demands explicit secrets.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for AppConfig {
    /// Safe, non-failing values for test state setup.
    fn default() -> Self {
        Self {
            env: Env::Local,
            jwt_secret: LOCAL_JWT_SECRET.to_string(),
            jwt_issuer: "snack-shop".to_string(),
            site_name: "Snack Shop".to_string(),
            session_cookie: "token".to_string(),
            asset_base: "/assets".to_string(),
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8800)),
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads every setting from the environment. Production fails fast when
    /// `JWT_SECRET` is absent; local falls back to a known development secret.
    pub fn load() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let env = match env::var("APP_ENV").as_deref() {
            Ok("production") => Env::Production,
            _ => Env::Local,
        };

        let jwt_secret = match (&env, env::var("JWT_SECRET")) {
            (_, Ok(secret)) if !secret.is_empty() => secret,
            (Env::Production, _) => return Err(ConfigError::Missing("JWT_SECRET")),
            (Env::Local, _) => defaults.jwt_secret,
        };

        let bind_addr = match env::var("BIND_ADDR") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                name: "BIND_ADDR",
                value: raw,
            })?,
            Err(_) => defaults.bind_addr,
        };

        Ok(Self {
            env,
            jwt_secret,
            jwt_issuer: env::var("JWT_ISSUER").unwrap_or(defaults.jwt_issuer),
            site_name: env::var("SITE_NAME").unwrap_or(defaults.site_name),
            session_cookie: env::var("SESSION_COOKIE").unwrap_or(defaults.session_cookie),
            asset_base: env::var("ASSET_BASE")
                .map(|base| base.trim_end_matches('/').to_string())
                .unwrap_or(defaults.asset_base),
            bind_addr,
        })
    }
}
