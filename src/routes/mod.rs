use axum::Router;

use crate::state::AppState;

pub mod admin;
pub mod auth;
pub mod cart;
pub mod doc;
pub mod health;
pub mod orders;
pub mod params;
pub mod products;
pub mod reviews;
pub mod sellers;
pub mod shipping;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    let shop = Router::new()
        .merge(products::router())
        .merge(reviews::router())
        .merge(cart::router());

    Router::new()
        .nest("/auth", auth::router())
        .nest("/shop", shop)
        .nest("/orders", orders::router())
        .nest("/shipping", shipping::router())
        .nest("/sellers", sellers::router())
        .nest("/admin", admin::router())
}
