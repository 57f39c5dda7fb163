use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::shipping::{ShippingAddressList, ShippingAddressRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::ShippingAddress,
    response::ApiResponse,
    services::shipping_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_shipping).post(create_shipping))
        .route(
            "/{id}",
            get(get_shipping).put(update_shipping).delete(delete_shipping),
        )
}

#[utoipa::path(
    get,
    path = "/api/shipping",
    responses(
        (status = 200, description = "Shipping addresses of the caller", body = ApiResponse<ShippingAddressList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Shipping"
)]
pub async fn list_shipping(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<ShippingAddressList>>> {
    let resp = shipping_service::list_shipping(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/shipping",
    request_body = ShippingAddressRequest,
    responses(
        (status = 201, description = "Shipping address created", body = ApiResponse<ShippingAddress>),
        (status = 400, description = "Invalid address")
    ),
    security(("bearer_auth" = [])),
    tag = "Shipping"
)]
pub async fn create_shipping(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<ShippingAddressRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<ShippingAddress>>)> {
    let resp = shipping_service::create_shipping(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/shipping/{id}",
    params(("id" = Uuid, Path, description = "Shipping address ID")),
    responses(
        (status = 200, description = "Shipping address", body = ApiResponse<ShippingAddress>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Shipping"
)]
pub async fn get_shipping(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ShippingAddress>>> {
    let resp = shipping_service::get_shipping(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/shipping/{id}",
    params(("id" = Uuid, Path, description = "Shipping address ID")),
    request_body = ShippingAddressRequest,
    responses(
        (status = 200, description = "Shipping address updated", body = ApiResponse<ShippingAddress>),
        (status = 400, description = "Invalid address"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Shipping"
)]
pub async fn update_shipping(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ShippingAddressRequest>,
) -> AppResult<Json<ApiResponse<ShippingAddress>>> {
    let resp = shipping_service::update_shipping(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/shipping/{id}",
    params(("id" = Uuid, Path, description = "Shipping address ID")),
    responses(
        (status = 200, description = "Shipping address deleted"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Shipping"
)]
pub async fn delete_shipping(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = shipping_service::delete_shipping(&state, &user, id).await?;
    Ok(Json(resp))
}
