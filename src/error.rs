use thiserror::Error;

/// ConfigError
///
/// Raised by `AppConfig::load` when the environment cannot produce a usable
/// configuration. Production refuses to start without its secrets.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set in production")]
    Missing(&'static str),

    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// RouteError
///
/// Raised while building a route table from pattern strings.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("route pattern `{0}` must start with `/`")]
    InvalidPattern(String),

    #[error("route pattern `{0}` has a catch-all that is not the last segment")]
    MisplacedCatchAll(String),

    #[error("route pattern `{0}` has an unnamed parameter")]
    UnnamedParam(String),
}

/// NavigationError
///
/// Only a misconfigured table (redirects that never settle on a page) ends
/// up here. The guard itself never fails.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NavigationError {
    #[error("navigation to `{path}` did not settle after {hops} redirects")]
    RedirectLoop { path: String, hops: usize },

    #[error("no route matches `{0}`")]
    Unmatched(String),
}
