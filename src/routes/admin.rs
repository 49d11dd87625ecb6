use crate::{
    guard::ADMIN_HOME,
    route::{RouteDef, RouteGroup, RouteMeta},
};

/// Back Office
///
/// The admin console. Every child inherits the group's admin meta, so a
/// signed-in shopper is demoted to the store home and an anonymous visitor
/// is sent to login. Icons feed the console sidebar (`RouteTable::menu`).
pub fn back_office() -> RouteGroup {
    RouteGroup::new("/back", RouteMeta::admin())
        .redirect_to(ADMIN_HOME)
        .child(
            RouteDef::page("dashboard")
                .named("Dashboard")
                .titled("Dashboard")
                .icon("HomeFilled"),
        )
        .child(
            RouteDef::page("user")
                .named("UserManagement")
                .titled("Users")
                .icon("User"),
        )
        .child(
            RouteDef::page("category")
                .named("CategoryManagement")
                .titled("Categories")
                .icon("Collection"),
        )
        .child(
            RouteDef::page("snack")
                .named("SnackManagement")
                .titled("Snacks")
                .icon("Food"),
        )
        .child(
            RouteDef::page("order")
                .named("OrderManagement")
                .titled("Orders")
                .icon("ShoppingBag"),
        )
        .child(
            RouteDef::page("review")
                .named("ReviewManagement")
                .titled("Reviews")
                .icon("ChatLineSquare"),
        )
        .child(
            RouteDef::page("carousel")
                .named("CarouselManagement")
                .titled("Carousel")
                .icon("PictureFilled"),
        )
        .child(
            RouteDef::page("profile")
                .named("BackendProfile")
                .titled("My Account")
                .icon("UserFilled"),
        )
}
