use crate::route::RouteDef;

/// Catalog pages of the front store. No session required.
pub fn store_routes() -> Vec<RouteDef> {
    vec![
        RouteDef::page("/").named("Home").titled("Home"),
        RouteDef::page("/snacks").named("SnackList").titled("Snacks"),
        // Product detail; `id` is the snack id.
        RouteDef::page("/snack/:id").named("SnackDetail").titled("Snack Details"),
    ]
}

/// Authentication pages, the pre-`/auth` aliases kept for old bookmarks, and
/// the mock API playground.
///
/// Signed-in sessions are turned away from login/register by the guard, not
/// by metadata here.
pub fn auth_routes() -> Vec<RouteDef> {
    vec![
        RouteDef::page("/auth/login").named("Login").titled("Sign In"),
        RouteDef::page("/auth/register").named("Register").titled("Sign Up"),
        RouteDef::page("/auth/forgot-password")
            .named("ForgotPassword")
            .titled("Reset Password"),
        RouteDef::redirect("/login", "/auth/login"),
        RouteDef::redirect("/register", "/auth/register"),
        RouteDef::page("/mock-test").named("MockTest").titled("Mock Test"),
    ]
}

/// Not-found page plus the catch-all that rewrites every unknown path to it.
pub fn error_routes() -> Vec<RouteDef> {
    vec![
        RouteDef::page(NOT_FOUND_PATH).named("NotFound").titled("404"),
        RouteDef::redirect("/*", NOT_FOUND_PATH),
    ]
}

pub const NOT_FOUND_PATH: &str = "/404";
