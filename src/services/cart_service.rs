use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    audit::record,
    dto::cart::{CartList, ToggleCartItemRequest, ToggleCartItemResponse, ToggleResult},
    entity::{
        order_items::{Column as LineCol, Entity as OrderItems},
        sellers::Entity as Sellers,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{LineProduct, OrderLine},
    response::{ApiResponse, Meta},
    services::{catalog_service::find_product_by_slug, order_service::LineRow},
    state::AppState,
};

/// What a toggle did to the single (user, product) cart line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleAction {
    Insert,
    Update,
    Delete,
    /// Zero quantity on a line that does not exist.
    Noop,
}

impl ToggleAction {
    pub fn result(&self) -> ToggleResult {
        match self {
            ToggleAction::Insert => ToggleResult::Created,
            ToggleAction::Update => ToggleResult::Updated,
            ToggleAction::Delete | ToggleAction::Noop => ToggleResult::Removed,
        }
    }
}

pub fn validate_quantity(quantity: i32) -> AppResult<()> {
    if quantity < 0 {
        return Err(AppError::validation(
            "quantity must be greater than or equal to 0",
        ));
    }
    Ok(())
}

/// `row_changed` is whether the statement created (quantity > 0) or removed
/// (quantity 0) the line.
pub fn classify_toggle(quantity: i32, row_changed: bool) -> ToggleAction {
    match (quantity, row_changed) {
        (0, true) => ToggleAction::Delete,
        (0, false) => ToggleAction::Noop,
        (_, true) => ToggleAction::Insert,
        (_, false) => ToggleAction::Update,
    }
}

#[derive(Debug, FromRow)]
struct UpsertedLine {
    id: Uuid,
    quantity: i32,
    inserted: bool,
}

pub async fn list_cart(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<CartList>> {
    let rows = sqlx::query_as::<_, LineRow>(
        r#"
        SELECT oi.id, oi.order_id, oi.quantity,
               p.name, p.slug, p.price_current, s.business_name AS seller_name
        FROM order_items oi
        JOIN products p ON p.id = oi.product_id
        JOIN sellers s ON s.id = p.seller_id
        WHERE oi.user_id = $1 AND oi.order_id IS NULL
        ORDER BY oi.created_at DESC
        "#,
    )
    .bind(user.user_id)
    .fetch_all(&state.pool)
    .await?;

    let total = rows.len() as i64;
    let items: Vec<OrderLine> = rows.into_iter().map(LineRow::into_line).collect();
    let meta = Meta::new(1, total.max(1), total);
    Ok(ApiResponse::success("OK", CartList { items }, Some(meta)))
}

pub async fn toggle_cart_item(
    state: &AppState,
    user: &AuthUser,
    payload: ToggleCartItemRequest,
) -> AppResult<ApiResponse<ToggleCartItemResponse>> {
    validate_quantity(payload.quantity)?;

    let product = find_product_by_slug(state, payload.slug.trim())
        .await?
        .ok_or_else(|| AppError::not_found("Product"))?;

    // Each branch is one statement, so concurrent toggles on the same line
    // serialize on the row and the last write wins.
    let (action, line) = if payload.quantity == 0 {
        let removed = OrderItems::delete_many()
            .filter(LineCol::UserId.eq(user.user_id))
            .filter(LineCol::ProductId.eq(product.id))
            .filter(LineCol::OrderId.is_null())
            .exec(&state.orm)
            .await?;
        (classify_toggle(0, removed.rows_affected > 0), None)
    } else {
        let line = sqlx::query_as::<_, UpsertedLine>(
            r#"
            INSERT INTO order_items (id, user_id, product_id, quantity)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, product_id) WHERE order_id IS NULL
            DO UPDATE SET quantity = EXCLUDED.quantity, updated_at = now()
            RETURNING id, quantity, (xmax = 0) AS inserted
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user.user_id)
        .bind(product.id)
        .bind(payload.quantity)
        .fetch_one(&state.pool)
        .await?;
        (classify_toggle(payload.quantity, line.inserted), Some(line))
    };

    let result = action.result();
    tracing::debug!(user_id = %user.user_id, product = %product.slug, ?result, "cart toggled");
    if action != ToggleAction::Noop {
        record(
            &state.pool,
            user.user_id,
            "cart_toggle",
            "order_items",
            serde_json::json!({
                "product_id": product.id,
                "quantity": payload.quantity,
                "result": result,
            }),
        )
        .await;
    }

    let item = match line {
        Some(line) => {
            let seller = Sellers::find_by_id(product.seller_id)
                .one(&state.orm)
                .await?
                .ok_or_else(|| AppError::not_found("Seller"))?;
            Some(OrderLine {
                id: line.id,
                product: LineProduct {
                    seller: seller.business_name,
                    name: product.name.clone(),
                    slug: product.slug.clone(),
                    price: product.price_current,
                },
                quantity: line.quantity,
                total: line_total(product.price_current, line.quantity),
            })
        }
        None => None,
    };

    Ok(ApiResponse::success(
        result.message(),
        ToggleCartItemResponse { result, item },
        Some(Meta::empty()),
    ))
}

pub fn line_total(price: Decimal, quantity: i32) -> Decimal {
    price * Decimal::from(quantity)
}
