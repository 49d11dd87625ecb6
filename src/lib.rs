use std::sync::Arc;

use axum::{
    Router,
    extract::FromRef,
    http::HeaderName,
    routing::get,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Navigation core: route table, guard, and the navigator that settles redirects.
pub mod guard;
pub mod navigation;
pub mod route;

// Session, configuration and error types.
pub mod config;
pub mod error;
pub mod session;

// HTTP shell: API payloads and handlers.
pub mod handlers;
pub mod models;

// The storefront's route definitions (Public, Authenticated, Admin).
pub mod routes;

// --- Public Re-exports ---

pub use config::AppConfig;
pub use guard::{NavigationIntent, decide};
pub use models::{Decision, Location};
pub use navigation::Navigator;
pub use route::RouteTable;
pub use session::{Role, Session};

/// ApiDoc
///
/// OpenAPI document for the shell's JSON endpoints, served at
/// `/api-docs/openapi.json` and browsable under `/swagger-ui`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health, handlers::get_session, handlers::resolve_navigation,
        handlers::get_admin_menu
    ),
    components(
        schemas(
            models::Decision, models::Location, models::MenuItem, models::CurrentUser,
            models::ResolveResponse, route::RouteMeta, session::Role,
        )
    ),
    tags(
        (name = "storefront-gate", description = "Storefront navigation gate")
    )
)]
struct ApiDoc;

/// AppState
///
/// Shared by every request: the loaded configuration and the navigator over
/// the immutable route table.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub navigator: Navigator,
}

impl AppState {
    pub fn new(config: AppConfig, table: RouteTable) -> Self {
        let navigator = Navigator::new(Arc::new(table), config.site_name.clone());
        Self { config, navigator }
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// create_router
///
/// JSON endpoints first; every other path falls through to the page handler,
/// which gates the navigation before serving the storefront shell.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name for request correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Base Router Assembly
    let base_router = Router::new()
        // Documentation: Swagger UI over the generated OpenAPI document.
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // JSON API: identity comes from the `Session` extractor in each handler.
        .route("/health", get(handlers::health))
        .route("/api/session", get(handlers::get_session))
        .route("/api/navigation/resolve", get(handlers::resolve_navigation))
        .route("/api/navigation/menu", get(handlers::get_admin_menu))
        // Every other GET is a storefront page and passes through the guard.
        .fallback(handlers::serve_page)
        .with_state(state);

    // 3. Observability and Correlation Layers (applied outermost)
    base_router
        .layer(
            ServiceBuilder::new()
                // 3a. Request ID Generation: a UUID for every incoming request.
                .layer(SetRequestIdLayer::new(
                    x_request_id.clone(),
                    MakeRequestUuid,
                ))
                // 3b. Request Tracing: one span per request via `trace_span_logger`,
                // carrying the generated request ID.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // 3c. Request ID Propagation: echoes x-request-id back to the client.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        // 4. CORS Layer (applied last)
        .layer(cors)
}

/// trace_span_logger
///
/// Span per request carrying method, URI and the `x-request-id` set above,
/// so every guard decision logged inside is correlated to its request.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
