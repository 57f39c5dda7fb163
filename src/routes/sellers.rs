use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
};

use crate::{
    dto::{
        products::{CreateProductRequest, ProductList, UpdateProductRequest},
        sellers::{SellerApplicationRequest, SellerOrderItems, SellerOrderList},
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::{Product, Seller},
    response::ApiResponse,
    services::{product_service, seller_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(apply))
        .route("/products", get(list_products).post(create_product))
        .route("/products/{slug}", put(update_product).delete(delete_product))
        .route("/orders", get(list_orders))
        .route("/orders/{tx_ref}", get(list_order_items))
}

#[utoipa::path(
    post,
    path = "/api/sellers",
    request_body = SellerApplicationRequest,
    responses(
        (status = 201, description = "Seller profile created or refreshed", body = ApiResponse<Seller>),
        (status = 400, description = "Blank business name")
    ),
    security(("bearer_auth" = [])),
    tag = "Sellers"
)]
pub async fn apply(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<SellerApplicationRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Seller>>)> {
    let resp = seller_service::apply(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/sellers/products",
    responses(
        (status = 200, description = "Products of the calling seller", body = ApiResponse<ProductList>),
        (status = 403, description = "Not an approved seller")
    ),
    security(("bearer_auth" = [])),
    tag = "Sellers"
)]
pub async fn list_products(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let resp = product_service::list_seller_products(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/sellers/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = ApiResponse<Product>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Not an approved seller"),
        (status = 404, description = "Category not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Sellers"
)]
pub async fn create_product(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateProductRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Product>>)> {
    let resp = product_service::create_product(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/sellers/products/{slug}",
    params(("slug" = String, Path, description = "Product slug")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated", body = ApiResponse<Product>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Not the owning seller"),
        (status = 404, description = "Product or category not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Sellers"
)]
pub async fn update_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(slug): Path<String>,
    Json(payload): Json<UpdateProductRequest>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let resp = product_service::update_product(&state, &user, &slug, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/sellers/products/{slug}",
    params(("slug" = String, Path, description = "Product slug")),
    responses(
        (status = 200, description = "Product deleted"),
        (status = 403, description = "Not the owning seller"),
        (status = 404, description = "Product not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Sellers"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(slug): Path<String>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = product_service::delete_product(&state, &user, &slug).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/sellers/orders",
    responses(
        (status = 200, description = "Orders containing the seller's products", body = ApiResponse<SellerOrderList>),
        (status = 403, description = "No seller profile")
    ),
    security(("bearer_auth" = [])),
    tag = "Sellers"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<SellerOrderList>>> {
    let resp = seller_service::list_orders(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/sellers/orders/{tx_ref}",
    params(("tx_ref" = String, Path, description = "Order transaction reference")),
    responses(
        (status = 200, description = "The seller's lines of one order", body = ApiResponse<SellerOrderItems>),
        (status = 403, description = "No seller profile"),
        (status = 404, description = "Order not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Sellers"
)]
pub async fn list_order_items(
    State(state): State<AppState>,
    user: AuthUser,
    Path(tx_ref): Path<String>,
) -> AppResult<Json<ApiResponse<SellerOrderItems>>> {
    let resp = seller_service::list_order_items(&state, &user, &tx_ref).await?;
    Ok(Json(resp))
}
