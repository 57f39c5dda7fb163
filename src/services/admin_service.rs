use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, Set};

use crate::{
    audit::record,
    dto::orders::OrderList,
    entity::sellers::{ActiveModel as SellerActive, Column as SellerCol, Entity as Sellers},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_staff},
    models::Seller,
    response::{ApiResponse, Meta},
    routes::params::OrderListQuery,
    services::{order_service::list_orders_where, seller_service::seller_from_entity},
    state::AppState,
};

/// Every order in the store, filtered and paginated like the buyer listing.
pub async fn list_all_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    ensure_staff(user)?;
    list_orders_where(state, Condition::all(), query).await
}

pub async fn approve_seller(
    state: &AppState,
    user: &AuthUser,
    slug: &str,
) -> AppResult<ApiResponse<Seller>> {
    ensure_staff(user)?;

    let seller = Sellers::find()
        .filter(SellerCol::Slug.eq(slug))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Seller"))?;

    let seller = if seller.is_approved {
        seller
    } else {
        let mut active: SellerActive = seller.into();
        active.is_approved = Set(true);
        active.updated_at = Set(Utc::now().into());
        active.update(&state.orm).await?
    };

    tracing::info!(seller_id = %seller.id, staff_id = %user.user_id, "seller approved");
    record(
        &state.pool,
        user.user_id,
        "seller_approve",
        "sellers",
        serde_json::json!({ "seller_id": seller.id, "slug": seller.slug }),
    )
    .await;

    Ok(ApiResponse::success(
        "Seller approved",
        seller_from_entity(seller),
        Some(Meta::empty()),
    ))
}
