//! The navigation guard: decides, for one navigation attempt, whether the
//! session may proceed or where it must be sent instead.

use crate::{
    models::{Decision, Location},
    route::ResolvedRoute,
    session::Session,
};

pub const LOGIN_PATH: &str = "/auth/login";
pub const STORE_HOME: &str = "/";
pub const ADMIN_HOME: &str = "/back/dashboard";

/// Query key carrying the post-login return path.
pub const REDIRECT_QUERY: &str = "redirect";

/// Login and registration pages, including the legacy aliases.
const AUTH_PAGES: [&str; 4] = ["/auth/login", "/auth/register", "/login", "/register"];

/// NavigationIntent
///
/// One navigation attempt: where the user wants to go and, when known, the
/// route currently on screen.
#[derive(Debug, Clone)]
pub struct NavigationIntent {
    pub target: ResolvedRoute,
    pub current: Option<String>,
}

impl NavigationIntent {
    pub fn new(target: ResolvedRoute) -> Self {
        Self {
            target,
            current: None,
        }
    }

    pub fn from_current(mut self, current: impl Into<String>) -> Self {
        self.current = Some(current.into());
        self
    }
}

/// decide
///
/// Rules are checked in order and the first match wins:
/// 1. Login required but absent: go to login, remembering the target.
/// 2. Admin required but not admin: signed-in users go to the store home,
///    anonymous ones to login.
/// 3. Signed in and heading for an auth page: go to the role's home.
/// 4. Otherwise allow.
pub fn decide(intent: &NavigationIntent, session: &Session) -> Decision {
    let target = &intent.target;
    let meta = target.meta;

    let decision = if meta.requires_auth && !session.is_logged_in() {
        login_redirect(&target.full_path)
    } else if meta.requires_admin && !session.is_admin() {
        if session.is_logged_in() {
            Decision::Redirect(Location::to(STORE_HOME))
        } else {
            login_redirect(&target.full_path)
        }
    } else if session.is_logged_in() && is_auth_page(&target.path) {
        Decision::Redirect(Location::to(role_home(session)))
    } else {
        Decision::Allow
    };

    tracing::debug!(
        target_path = %target.full_path,
        current = intent.current.as_deref().unwrap_or("-"),
        logged_in = session.is_logged_in(),
        role = ?session.role,
        ?decision,
        "navigation guard evaluated"
    );

    decision
}

/// Landing page for a signed-in session.
pub fn role_home(session: &Session) -> &'static str {
    if session.is_admin() { ADMIN_HOME } else { STORE_HOME }
}

pub fn is_auth_page(path: &str) -> bool {
    AUTH_PAGES.contains(&path)
}

pub(crate) fn login_location(return_to: &str) -> Location {
    Location::to(LOGIN_PATH).with_query(REDIRECT_QUERY, return_to)
}

fn login_redirect(return_to: &str) -> Decision {
    Decision::Redirect(login_location(return_to))
}

/// Document title shown for an allowed, titled route.
pub fn document_title(title: &str, site_name: &str) -> String {
    format!("{title} - {site_name}")
}
