use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderMap, HeaderValue, Method, StatusCode, Uri, header},
    response::{Html, IntoResponse, Redirect, Response},
};

use crate::{
    AppState,
    models::{CurrentUser, MenuItem, ResolveQuery, ResolveResponse},
    navigation::{Settled, redirect_to_login},
    routes::public::NOT_FOUND_PATH,
    session::Session,
};

// --- API Handlers ---

/// health
///
/// Liveness probe for load balancers.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Alive", body = String))
)]
pub async fn health() -> &'static str {
    "ok"
}

/// get_session
///
/// Returns the identity behind the request's credential, or `null` for an
/// anonymous (or stale) session.
#[utoipa::path(
    get,
    path = "/api/session",
    responses((status = 200, description = "Current user, or null when anonymous", body = CurrentUser))
)]
pub async fn get_session(session: Session) -> Json<Option<CurrentUser>> {
    Json(session.current_user())
}

/// resolve_navigation
///
/// Lets the single-page storefront ask the server for a verdict before a
/// client-side navigation. The response carries the guard's first decision
/// and the path the navigation finally settles on.
#[utoipa::path(
    get,
    path = "/api/navigation/resolve",
    params(ResolveQuery),
    responses(
        (status = 200, description = "Navigation verdict", body = ResolveResponse),
        (status = 500, description = "Route table redirects never settle")
    )
)]
pub async fn resolve_navigation(
    session: Session,
    State(state): State<AppState>,
    Query(query): Query<ResolveQuery>,
) -> Result<Json<ResolveResponse>, StatusCode> {
    let settled = state
        .navigator
        .navigate(&query.to, query.from.as_deref(), &session)
        .map_err(|e| {
            tracing::error!(error = %e, to = %query.to, "navigation did not settle");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    Ok(Json(ResolveResponse {
        decision: settled.decision,
        settled_path: settled.route.full_path,
        route_name: settled.route.name,
        title: settled.title,
        meta: settled.route.meta,
    }))
}

/// get_admin_menu
///
/// [Admin] Sidebar entries of the admin console.
#[utoipa::path(
    get,
    path = "/api/navigation/menu",
    responses(
        (status = 200, description = "Admin console menu", body = [MenuItem]),
        (status = 401, description = "Not signed in"),
        (status = 403, description = "Not an admin")
    )
)]
pub async fn get_admin_menu(
    session: Session,
    State(state): State<AppState>,
) -> Result<Json<Vec<MenuItem>>, StatusCode> {
    if !session.is_logged_in() {
        return Err(StatusCode::UNAUTHORIZED);
    }
    if !session.is_admin() {
        return Err(StatusCode::FORBIDDEN);
    }
    Ok(Json(state.navigator.table().menu()))
}

// --- Page Navigation ---

/// serve_page
///
/// Fallback for every page URL of the storefront. Runs the navigation guard
/// before any shell is served, so deep links and reloads are gated the same
/// way client-side navigations are.
///
/// 1. A rejected credential is cleared and the visitor sent to login.
/// 2. A navigation redirected by the table or the guard answers `303`.
/// 3. Otherwise the page shell is rendered with its document title.
pub async fn serve_page(
    session: Session,
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    if method != Method::GET && method != Method::HEAD {
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    }
    if uri.path().starts_with("/api/") {
        return StatusCode::NOT_FOUND.into_response();
    }

    let requested = uri
        .path_and_query()
        .map(|path_and_query| path_and_query.as_str())
        .unwrap_or("/");

    let clear_cookie = session
        .stale_credential
        .then(|| expired_cookie(&state.config.session_cookie))
        .flatten();

    if let Some(cookie) = &clear_cookie {
        if let Some(location) = redirect_to_login(requested) {
            tracing::info!(path = %requested, "stale session credential, signing out");
            return (
                [(header::SET_COOKIE, cookie.clone())],
                Redirect::to(&location.full_path()),
            )
                .into_response();
        }
    }

    let from = headers
        .get(header::REFERER)
        .and_then(|value| value.to_str().ok())
        .and_then(referer_path);

    let settled = match state.navigator.navigate(requested, from, &session) {
        Ok(settled) => settled,
        Err(e) => {
            tracing::error!(error = %e, path = %requested, "navigation did not settle");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    // Non-canonical spellings (`/snacks/`, `//404`) move to the settled URL.
    let mut response = if settled.redirected || settled.route.full_path != requested {
        Redirect::to(&settled.route.full_path).into_response()
    } else {
        let status = if settled.route.path == NOT_FOUND_PATH {
            StatusCode::NOT_FOUND
        } else {
            StatusCode::OK
        };
        (status, render_shell(&settled, &state.config.asset_base)).into_response()
    };

    if let Some(cookie) = clear_cookie {
        response.headers_mut().append(header::SET_COOKIE, cookie);
    }
    response
}

fn render_shell(settled: &Settled, asset_base: &str) -> Html<String> {
    let title = settled.title.as_deref().unwrap_or_default();
    let route_name = settled.route.name.as_deref().unwrap_or_default();
    Html(format!(
        "<!doctype html>\n\
         <html>\n\
         <head>\n\
         <meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{title}</title>\n\
         <link rel=\"stylesheet\" href=\"{assets}/index.css\">\n\
         </head>\n\
         <body>\n\
         <div id=\"app\" data-route=\"{route}\"></div>\n\
         <script type=\"module\" src=\"{assets}/index.js\"></script>\n\
         </body>\n\
         </html>\n",
        title = escape_html(title),
        route = escape_html(route_name),
        assets = escape_html(asset_base),
    ))
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

fn expired_cookie(name: &str) -> Option<HeaderValue> {
    HeaderValue::from_str(&format!("{name}=; Path=/; Max-Age=0; SameSite=Lax")).ok()
}

/// Path part of a `Referer` value, which may be absolute or already a path.
fn referer_path(referer: &str) -> Option<&str> {
    if referer.starts_with('/') {
        return Some(referer);
    }
    let (_, rest) = referer.split_once("://")?;
    rest.find('/').map(|index| &rest[index..])
}
