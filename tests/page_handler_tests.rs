use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode, header},
};
use jsonwebtoken::{EncodingKey, Header, encode};
use std::time::SystemTime;
use storefront_gate::{
    AppConfig, AppState, Decision, Location, Role, create_router,
    models::{CurrentUser, MenuItem, ResolveResponse},
    routes,
    session::Claims,
};
use tower::util::ServiceExt;

const TEST_JWT_SECRET: &str = "page-test-secret";

fn app() -> Router {
    let mut config = AppConfig::default();
    config.jwt_secret = TEST_JWT_SECRET.to_string();
    config.site_name = "Snack Shop".to_string();
    create_router(AppState::new(config, routes::storefront().unwrap()))
}

fn token(role: &str, exp_offset: i64) -> String {
    let now = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64;
    let claims = Claims {
        user_id: 5,
        username: "bob".to_string(),
        role_type: role.to_string(),
        iat: now as usize,
        exp: (now + exp_offset) as usize,
        iss: "snack-shop".to_string(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .unwrap()
}

async fn get(uri: &str, cookie: Option<String>) -> Response<Body> {
    let mut request = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        request = request.header(header::COOKIE, cookie);
    }
    app()
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
}

async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

// --- Page Navigation ---

#[tokio::test]
async fn test_home_renders_shell_with_title() {
    let response = get("/", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains("<title>Home - Snack Shop</title>"));
    assert!(html.contains("data-route=\"Home\""));
    assert!(html.contains("src=\"/assets/index.js\""));
}

#[tokio::test]
async fn test_anonymous_cart_redirects_to_login() {
    let response = get("/cart", None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/auth/login?redirect=%2Fcart");
}

#[tokio::test]
async fn test_shopper_is_demoted_from_back_office() {
    let response = get("/back/order", Some(format!("token={}", token("USER", 3600)))).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn test_admin_sees_back_office() {
    let response = get("/back/order", Some(format!("token={}", token("ADMIN", 3600)))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("<title>Orders - Snack Shop</title>"));
}

#[tokio::test]
async fn test_admin_login_visit_goes_to_dashboard() {
    let response = get("/login", Some(format!("token={}", token("ADMIN", 3600)))).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/back/dashboard");
}

#[tokio::test]
async fn test_unknown_path_redirects_to_not_found_page() {
    let response = get("/no/such/page", None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/404");

    let response = get("/404", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_text(response).await.contains("<title>404 - Snack Shop</title>"));
}

#[tokio::test]
async fn test_doubled_slash_login_still_sends_admin_to_dashboard() {
    let response = get("//auth/login", Some(format!("token={}", token("ADMIN", 3600)))).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/back/dashboard");
}

#[tokio::test]
async fn test_doubled_slash_not_found_moves_to_canonical_url() {
    let response = get("//404", None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/404");
}

#[tokio::test]
async fn test_trailing_slash_redirects_to_canonical_path() {
    let response = get("/snacks/", None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/snacks");

    let response = get("/snacks/?category=3", None).await;
    assert_eq!(location(&response), "/snacks?category=3");

    let response = get("/snacks?category=3", None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_stale_cookie_is_cleared_and_sent_to_login() {
    let response = get("/order/list", Some(format!("token={}", token("USER", -3600)))).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/auth/login?redirect=%2Forder%2Flist");
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .unwrap();
    assert!(cookie.starts_with("token=;"));
    assert!(cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn test_stale_cookie_on_login_page_renders_login() {
    let response = get("/auth/login", Some("token=garbage".to_string())).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key(header::SET_COOKIE));
    assert!(body_text(response).await.contains("<title>Sign In - Snack Shop</title>"));
}

#[tokio::test]
async fn test_unknown_api_path_is_not_a_page() {
    let response = get("/api/unknown", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_non_get_page_request_is_rejected() {
    let response = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/cart")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

// --- JSON API ---

#[tokio::test]
async fn test_resolve_endpoint_reports_decision_and_settled_path() {
    let response = get("/api/navigation/resolve?to=%2Ffavorites&from=%2F", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: ResolveResponse = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(
        body.decision,
        Decision::Redirect(Location::to("/auth/login").with_query("redirect", "/favorites"))
    );
    assert_eq!(body.settled_path, "/auth/login?redirect=%2Ffavorites");
    assert_eq!(body.route_name.as_deref(), Some("Login"));
    assert_eq!(body.title.as_deref(), Some("Sign In - Snack Shop"));
}

#[tokio::test]
async fn test_resolve_endpoint_allows_signed_in_shopper() {
    let response = get(
        "/api/navigation/resolve?to=%2Forder%2Fdetail%2F9",
        Some(format!("token={}", token("USER", 3600))),
    )
    .await;

    let body: ResolveResponse = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body.decision, Decision::Allow);
    assert_eq!(body.settled_path, "/order/detail/9");
    assert!(body.meta.requires_auth);
}

#[tokio::test]
async fn test_session_endpoint() {
    let response = get("/api/session", None).await;
    assert_eq!(body_text(response).await, "null");

    let response = get("/api/session", Some(format!("token={}", token("ADMIN", 3600)))).await;
    let user: CurrentUser = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(user.id, 5);
    assert_eq!(user.role, Role::Admin);
    assert!(user.is_admin);
}

#[tokio::test]
async fn test_menu_endpoint_is_admin_only() {
    let response = get("/api/navigation/menu", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = get("/api/navigation/menu", Some(format!("token={}", token("USER", 3600)))).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = get("/api/navigation/menu", Some(format!("token={}", token("ADMIN", 3600)))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let menu: Vec<MenuItem> = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(menu.len(), 8);
    assert_eq!(menu[0].path, "/back/dashboard");
}

#[tokio::test]
async fn test_health_check() {
    let response = get("/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "ok");
}
