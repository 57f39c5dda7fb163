use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};

use crate::{
    dto::{
        cart::{CartList, ToggleCartItemRequest, ToggleCartItemResponse, ToggleResult},
        orders::{CheckoutRequest, OrderWithItems},
    },
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::{cart_service, order_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/cart", get(cart_list).post(toggle_cart_item))
        .route("/checkout", post(checkout))
}

#[utoipa::path(
    get,
    path = "/api/shop/cart",
    responses(
        (status = 200, description = "Unassigned cart lines", body = ApiResponse<CartList>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn cart_list(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<CartList>>> {
    let resp = cart_service::list_cart(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/shop/cart",
    request_body = ToggleCartItemRequest,
    responses(
        (status = 201, description = "Item added to cart", body = ApiResponse<ToggleCartItemResponse>),
        (status = 200, description = "Item updated or removed", body = ApiResponse<ToggleCartItemResponse>),
        (status = 400, description = "Negative quantity"),
        (status = 404, description = "Product not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn toggle_cart_item(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<ToggleCartItemRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<ToggleCartItemResponse>>)> {
    let resp = cart_service::toggle_cart_item(&state, &user, payload).await?;
    let status = match resp.data.as_ref().map(|d| d.result) {
        Some(ToggleResult::Created) => StatusCode::CREATED,
        _ => StatusCode::OK,
    };
    Ok((status, Json(resp)))
}

#[utoipa::path(
    post,
    path = "/api/shop/checkout",
    request_body = CheckoutRequest,
    responses(
        (status = 201, description = "Order placed", body = ApiResponse<OrderWithItems>),
        (status = 404, description = "Empty cart or unknown shipping address")
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn checkout(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CheckoutRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<OrderWithItems>>)> {
    let resp = order_service::checkout(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}
