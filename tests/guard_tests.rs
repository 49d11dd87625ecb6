use storefront_gate::{
    Decision, Location, NavigationIntent, Role, Session, decide,
    guard::{self, document_title, is_auth_page},
    route::{Resolution, RouteKind, RouteTable},
    routes,
    session::SessionUser,
};

// --- Helper Functions ---

fn table() -> RouteTable {
    routes::storefront().expect("storefront table builds")
}

fn intent(table: &RouteTable, path: &str) -> NavigationIntent {
    match table.resolve(path) {
        Resolution::Matched(route) => NavigationIntent::new(route),
        other => panic!("expected `{path}` to match a page, got {other:?}"),
    }
}

fn shopper() -> Session {
    Session::signed_in(SessionUser::new(7, "alice"), Role::User)
}

fn admin() -> Session {
    Session::signed_in(SessionUser::new(1, "root"), Role::Admin)
}

/// Concrete path for a pattern, filling every `:param` with `42`.
fn concrete(pattern: &str) -> String {
    pattern
        .split('/')
        .map(|segment| if segment.starts_with(':') { "42" } else { segment })
        .collect::<Vec<_>>()
        .join("/")
}

/// Every page path in the table whose meta satisfies `filter`.
fn page_paths(table: &RouteTable, filter: impl Fn(bool, bool) -> bool) -> Vec<String> {
    table
        .records()
        .iter()
        .filter(|record| record.kind == RouteKind::Page)
        .filter(|record| filter(record.meta.requires_auth, record.meta.requires_admin))
        .map(|record| concrete(record.pattern.as_str()))
        .collect()
}

fn login_with_return(path: &str) -> Decision {
    Decision::Redirect(Location::to("/auth/login").with_query("redirect", path))
}

// --- Tests ---

#[test]
fn test_protected_routes_send_anonymous_visitors_to_login() {
    let table = table();
    let paths = page_paths(&table, |auth, _| auth);
    assert!(paths.len() >= 15, "expected account and admin pages, got {paths:?}");

    for path in paths {
        let decision = decide(&intent(&table, &path), &Session::anonymous());
        assert_eq!(decision, login_with_return(&path), "path {path}");
    }
}

#[test]
fn test_admin_routes_demote_signed_in_shoppers_to_store_home() {
    let table = table();
    for path in page_paths(&table, |_, admin| admin) {
        let decision = decide(&intent(&table, &path), &shopper());
        assert_eq!(decision, Decision::Redirect(Location::to("/")), "path {path}");
    }
}

#[test]
fn test_admin_routes_check_login_before_role() {
    let table = table();
    for path in page_paths(&table, |_, admin| admin) {
        let decision = decide(&intent(&table, &path), &Session::anonymous());
        assert_eq!(decision, login_with_return(&path), "path {path}");
    }
}

#[test]
fn test_admin_only_meta_without_auth_flag_still_requires_login() {
    let table = table();
    let mut target = intent(&table, "/back/user");
    target.target.meta.requires_auth = false;

    assert_eq!(
        decide(&target, &Session::anonymous()),
        login_with_return("/back/user")
    );
    assert_eq!(
        decide(&target, &shopper()),
        Decision::Redirect(Location::to("/"))
    );
}

#[test]
fn test_admin_on_login_page_goes_to_dashboard() {
    let table = table();
    let decision = decide(&intent(&table, "/auth/login"), &admin());
    assert_eq!(decision, Decision::Redirect(Location::to("/back/dashboard")));
}

#[test]
fn test_shopper_on_register_page_goes_to_store_home() {
    let table = table();
    let decision = decide(&intent(&table, "/auth/register"), &shopper());
    assert_eq!(decision, Decision::Redirect(Location::to("/")));
}

#[test]
fn test_anonymous_visitor_may_browse_home() {
    let table = table();
    assert_eq!(decide(&intent(&table, "/"), &Session::anonymous()), Decision::Allow);
}

#[test]
fn test_public_pages_are_open_to_everyone() {
    let table = table();
    for session in [Session::anonymous(), shopper(), admin()] {
        for path in ["/", "/snacks", "/snack/9", "/404", "/mock-test"] {
            assert!(
                decide(&intent(&table, path), &session).is_allow(),
                "path {path} for {:?}",
                session.role
            );
        }
    }
}

#[test]
fn test_admin_may_visit_front_store_pages() {
    let table = table();
    for path in ["/", "/cart", "/order/list", "/favorites", "/profile"] {
        assert!(decide(&intent(&table, path), &admin()).is_allow(), "path {path}");
    }
}

#[test]
fn test_shopper_reaches_account_pages() {
    let table = table();
    for path in page_paths(&table, |auth, admin| auth && !admin) {
        assert!(decide(&intent(&table, &path), &shopper()).is_allow(), "path {path}");
    }
}

#[test]
fn test_return_path_keeps_query_string() {
    let table = table();
    let decision = decide(&intent(&table, "/order/list?page=2"), &Session::anonymous());
    assert_eq!(decision, login_with_return("/order/list?page=2"));
}

#[test]
fn test_signed_in_session_without_known_role_is_treated_as_shopper() {
    let table = table();
    let session = Session::signed_in(SessionUser::new(3, "ghost"), Role::None);

    assert_eq!(
        decide(&intent(&table, "/back/dashboard"), &session),
        Decision::Redirect(Location::to("/"))
    );
    assert_eq!(
        decide(&intent(&table, "/auth/login"), &session),
        Decision::Redirect(Location::to("/"))
    );
}

#[test]
fn test_forgot_password_is_not_an_auth_redirect_page() {
    let table = table();
    assert!(decide(&intent(&table, "/auth/forgot-password"), &shopper()).is_allow());
}

#[test]
fn test_doubled_slash_auth_page_still_sends_admin_home() {
    let table = table();
    assert_eq!(
        decide(&intent(&table, "//auth/login"), &admin()),
        Decision::Redirect(Location::to("/back/dashboard"))
    );
    assert_eq!(
        decide(&intent(&table, "/auth//register/"), &shopper()),
        Decision::Redirect(Location::to("/"))
    );
}

#[test]
fn test_auth_pages_include_legacy_aliases() {
    for path in ["/auth/login", "/auth/register", "/login", "/register"] {
        assert!(is_auth_page(path), "{path}");
    }
    assert!(!is_auth_page("/auth/forgot-password"));
    assert!(!is_auth_page("/"));
}

#[test]
fn test_role_home() {
    assert_eq!(guard::role_home(&admin()), "/back/dashboard");
    assert_eq!(guard::role_home(&shopper()), "/");
    assert_eq!(guard::role_home(&Session::anonymous()), "/");
}

#[test]
fn test_document_title_appends_site_name() {
    assert_eq!(document_title("Cart", "Snack Shop"), "Cart - Snack Shop");
}
