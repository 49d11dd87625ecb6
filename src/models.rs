use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::{IntoParams, ToSchema};

use crate::{route::RouteMeta, session::Role};

// --- Navigation Schemas ---

/// Location
///
/// A navigation target: a path plus query parameters. Rendered with
/// `full_path` for `Location` headers and client-side `router.replace`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct Location {
    #[schema(example = "/auth/login")]
    pub path: String,
    pub query: BTreeMap<String, String>,
}

impl Location {
    pub fn to(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: BTreeMap::new(),
        }
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Path followed by the percent-encoded query, if any.
    pub fn full_path(&self) -> String {
        if self.query.is_empty() {
            return self.path.clone();
        }
        let query = self
            .query
            .iter()
            .map(|(key, value)| {
                format!("{}={}", urlencoding::encode(key), urlencoding::encode(value))
            })
            .collect::<Vec<_>>()
            .join("&");
        format!("{}?{}", self.path, query)
    }
}

/// Decision
///
/// The guard's verdict for one navigation attempt. A redirect is a valid
/// outcome, not a failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[ts(export)]
pub enum Decision {
    Allow,
    Redirect(Location),
}

impl Decision {
    pub fn is_allow(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

/// MenuItem
///
/// One entry of the admin console sidebar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct MenuItem {
    #[schema(example = "/back/dashboard")]
    pub path: String,
    pub title: String,
    #[schema(example = "HomeFilled")]
    pub icon: String,
}

// --- Session Schemas ---

/// CurrentUser
///
/// The signed-in identity as exposed to the storefront. Absent (`null`) for
/// anonymous sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CurrentUser {
    pub id: i64,
    pub name: String,
    pub role: Role,
    pub is_admin: bool,
    pub is_user: bool,
    #[ts(type = "string | null")]
    pub expires_at: Option<DateTime<Utc>>,
}

// --- Request / Response Payloads ---

/// ResolveQuery
///
/// Query parameters of `GET /api/navigation/resolve`.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct ResolveQuery {
    /// Full path the client wants to navigate to.
    pub to: String,
    /// Full path of the currently active route, if any.
    pub from: Option<String>,
}

/// ResolveResponse
///
/// The guard's first decision for `to`, plus where the navigation finally
/// settles once every redirect has been followed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ResolveResponse {
    pub decision: Decision,
    #[schema(example = "/auth/login?redirect=%2Fcart")]
    pub settled_path: String,
    pub route_name: Option<String>,
    pub title: Option<String>,
    pub meta: RouteMeta,
}
