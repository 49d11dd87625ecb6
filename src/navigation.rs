use std::sync::Arc;

use crate::{
    error::NavigationError,
    guard::{self, NavigationIntent, document_title, login_location},
    models::{Decision, Location},
    route::{Resolution, ResolvedRoute, RouteTable},
    session::Session,
};

/// Upper bound on redirects followed for a single navigation.
pub const MAX_REDIRECTS: usize = 8;

/// Settled
///
/// Where a navigation ends up once table redirects and guard redirects have
/// all been followed.
#[derive(Debug, Clone)]
pub struct Settled {
    pub route: ResolvedRoute,
    /// Document title for the settled page, if the route is titled.
    pub title: Option<String>,
    /// The guard's verdict on the originally requested target.
    pub decision: Decision,
    pub redirected: bool,
}

/// Navigator
///
/// The routing layer around the guard: resolves paths against the table,
/// runs the guard, and replaces the target until the navigation settles.
#[derive(Debug, Clone)]
pub struct Navigator {
    table: Arc<RouteTable>,
    site_name: String,
}

impl Navigator {
    pub fn new(table: Arc<RouteTable>, site_name: impl Into<String>) -> Self {
        Self {
            table,
            site_name: site_name.into(),
        }
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// intent
    ///
    /// Resolves `to` into a page, following alias and catch-all redirects.
    pub fn intent(&self, to: &str, from: Option<&str>) -> Result<NavigationIntent, NavigationError> {
        let (target, _) = self.resolve_page(to)?;
        let intent = NavigationIntent::new(target);
        Ok(match from {
            Some(current) => intent.from_current(current),
            None => intent,
        })
    }

    /// navigate
    ///
    /// Applies the guard repeatedly until it allows a page. Only a table whose
    /// redirects never settle produces an error.
    pub fn navigate(
        &self,
        to: &str,
        from: Option<&str>,
        session: &Session,
    ) -> Result<Settled, NavigationError> {
        let (target, mut redirected) = self.resolve_page(to)?;
        let mut intent = NavigationIntent::new(target);
        intent.current = from.map(str::to_string);

        let mut first_decision = None;

        for _ in 0..=MAX_REDIRECTS {
            let decision = guard::decide(&intent, session);
            let first = first_decision.get_or_insert_with(|| decision.clone());

            match decision {
                Decision::Allow => {
                    let title = intent
                        .target
                        .title
                        .as_deref()
                        .map(|title| document_title(title, &self.site_name));
                    return Ok(Settled {
                        decision: first.clone(),
                        route: intent.target,
                        title,
                        redirected,
                    });
                }
                Decision::Redirect(location) => {
                    redirected = true;
                    let (next, _) = self.resolve_page(&location.full_path())?;
                    let current = intent.target.full_path;
                    intent = NavigationIntent::new(next).from_current(current);
                }
            }
        }

        Err(NavigationError::RedirectLoop {
            path: to.to_string(),
            hops: MAX_REDIRECTS,
        })
    }

    fn resolve_page(&self, to: &str) -> Result<(ResolvedRoute, bool), NavigationError> {
        let mut next = to.to_string();
        for hop in 0..=MAX_REDIRECTS {
            match self.table.resolve(&next) {
                Resolution::Matched(route) => return Ok((route, hop > 0)),
                Resolution::Redirect(target) => next = target,
                Resolution::Unmatched => return Err(NavigationError::Unmatched(next)),
            }
        }
        Err(NavigationError::RedirectLoop {
            path: to.to_string(),
            hops: MAX_REDIRECTS,
        })
    }
}

/// redirect_to_login
///
/// Login location that returns to `current` afterwards. `None` when the user
/// is already on an auth page, which would otherwise bounce forever.
pub fn redirect_to_login(current: &str) -> Option<Location> {
    if current.contains("/auth/") {
        return None;
    }
    Some(login_location(current))
}

/// return_path_after_login
///
/// Honours the `redirect` query only for local absolute paths. Anything else
/// lands on the role home.
pub fn return_path_after_login(redirect: Option<&str>, session: &Session) -> String {
    match redirect {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.starts_with("/\\") => {
            path.to_string()
        }
        _ => guard::role_home(session).to_string(),
    }
}
