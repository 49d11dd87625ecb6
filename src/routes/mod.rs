/// Route Table Index
///
/// The storefront's routes, segregated by the access they demand. Each
/// module contributes declarative `RouteDef`s; `storefront` assembles them
/// in matching order.

/// Pages anyone may visit: catalog, auth pages, legacy aliases, errors.
pub mod public;

/// Front-store pages that need a signed-in session.
pub mod authenticated;

/// The admin console under `/back`.
pub mod admin;

use crate::{error::RouteError, route::RouteTable};

/// storefront
///
/// Registration order matters: the first matching record wins, so the
/// catch-all from `public::error_routes` is registered last.
pub fn storefront() -> Result<RouteTable, RouteError> {
    RouteTable::builder()
        .routes(public::store_routes())
        .routes(authenticated::account_routes())
        .routes(public::auth_routes())
        .group(admin::back_office())
        .routes(public::error_routes())
        .build()
}
