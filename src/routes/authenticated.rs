use crate::route::{RouteDef, RouteMeta};

/// Account Routes
///
/// Front-store pages bound to a shopper: cart, checkout, orders, profile and
/// favorites. Anonymous visitors are sent to login with a return path.
pub fn account_routes() -> Vec<RouteDef> {
    [
        RouteDef::page("/cart").named("Cart").titled("Cart"),
        RouteDef::page("/order/confirm")
            .named("OrderConfirm")
            .titled("Confirm Order"),
        RouteDef::page("/order/list").named("OrderList").titled("My Orders"),
        RouteDef::page("/order/detail/:id")
            .named("OrderDetail")
            .titled("Order Details"),
        RouteDef::page("/profile").named("Profile").titled("My Account"),
        RouteDef::page("/profile/address")
            .named("AddressManagement")
            .titled("Shipping Addresses"),
        RouteDef::page("/favorites")
            .named("FavoriteList")
            .titled("My Favorites"),
    ]
    .into_iter()
    .map(|def| def.meta(RouteMeta::authenticated()))
    .collect()
}
