use std::collections::HashMap;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, Condition, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use sea_orm::sea_query::{Expr, LockType};
use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    audit::record,
    dto::orders::{CheckoutRequest, OrderList, OrderWithItems},
    entity::{
        order_items::{Column as LineCol, Entity as OrderItems},
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
        shipping_addresses::{Column as ShippingCol, Entity as ShippingAddresses},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_owner_or_staff},
    models::{DeliveryStatus, LineProduct, Order, OrderLine, PaymentStatus, ShippingDetails},
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    services::cart_service::line_total,
    state::AppState,
};

/// Delivery and tax adjustment applied on top of the subtotal.
pub const DELIVERY_ADJUSTMENT: Decimal = Decimal::ZERO;

/// An order item joined with its product and seller.
#[derive(Debug, FromRow)]
pub(crate) struct LineRow {
    pub id: Uuid,
    pub order_id: Option<Uuid>,
    pub quantity: i32,
    pub name: String,
    pub slug: String,
    pub price_current: Decimal,
    pub seller_name: String,
}

impl LineRow {
    pub(crate) fn into_line(self) -> OrderLine {
        OrderLine {
            id: self.id,
            total: line_total(self.price_current, self.quantity),
            product: LineProduct {
                seller: self.seller_name,
                name: self.name,
                slug: self.slug,
                price: self.price_current,
            },
            quantity: self.quantity,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderTotals {
    pub subtotal: Decimal,
    pub total: Decimal,
}

/// Subtotal is the sum of line totals at current product prices.
pub fn order_totals(lines: &[OrderLine]) -> OrderTotals {
    let subtotal: Decimal = lines.iter().map(|line| line.total).sum();
    OrderTotals {
        subtotal,
        total: subtotal + DELIVERY_ADJUSTMENT,
    }
}

pub async fn checkout(
    state: &AppState,
    user: &AuthUser,
    payload: CheckoutRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let txn = state.orm.begin().await?;

    let cart_lines = OrderItems::find()
        .filter(LineCol::UserId.eq(user.user_id))
        .filter(LineCol::OrderId.is_null())
        .lock(LockType::Update)
        .all(&txn)
        .await?;
    if cart_lines.is_empty() {
        return Err(AppError::EmptyCart);
    }

    let shipping = ShippingAddresses::find()
        .filter(
            Condition::all()
                .add(ShippingCol::Id.eq(payload.shipping_id))
                .add(ShippingCol::UserId.eq(user.user_id)),
        )
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::not_found("Shipping address"))?;

    let order_id = Uuid::new_v4();
    let order = OrderActive {
        id: Set(order_id),
        user_id: Set(user.user_id),
        tx_ref: Set(build_tx_ref(order_id)),
        delivery_status: Set(DeliveryStatus::Pending.as_str().into()),
        payment_status: Set(PaymentStatus::Pending.as_str().into()),
        date_delivered: Set(None),
        full_name: Set(shipping.full_name),
        email: Set(shipping.email),
        phone: Set(shipping.phone),
        address: Set(shipping.address),
        city: Set(shipping.city),
        country: Set(shipping.country),
        zipcode: Set(shipping.zipcode),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;

    // Only the locked lines move; lines added after the lock stay in the cart.
    let locked: Vec<Uuid> = cart_lines.iter().map(|line| line.id).collect();
    let moved = OrderItems::update_many()
        .col_expr(LineCol::OrderId, Expr::value(order.id))
        .col_expr(LineCol::UpdatedAt, Expr::value(Utc::now()))
        .filter(LineCol::Id.is_in(locked))
        .filter(LineCol::OrderId.is_null())
        .exec(&txn)
        .await?;

    txn.commit().await?;

    tracing::info!(
        user_id = %user.user_id,
        tx_ref = %order.tx_ref,
        lines = moved.rows_affected,
        "checkout completed"
    );
    record(
        &state.pool,
        user.user_id,
        "checkout",
        "orders",
        serde_json::json!({ "order_id": order.id, "tx_ref": order.tx_ref }),
    )
    .await;

    let data = order_with_items(state, order).await?;
    Ok(ApiResponse::success(
        "Checkout Successful",
        data,
        Some(Meta::empty()),
    ))
}

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let condition = Condition::all().add(OrderCol::UserId.eq(user.user_id));
    list_orders_where(state, condition, query).await
}

pub(crate) async fn list_orders_where(
    state: &AppState,
    mut condition: Condition,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = query.pagination().normalize();
    if let Some(raw) = query.delivery_status.as_deref().filter(|s| !s.is_empty()) {
        let status = DeliveryStatus::parse(raw)
            .ok_or_else(|| AppError::BadRequest(format!("unknown delivery status {raw}")))?;
        condition = condition.add(OrderCol::DeliveryStatus.eq(status.as_str()));
    }

    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    let mut finder = Orders::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;
    let items = orders_with_lines(state, orders).await?;

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Ok", OrderList { items }, Some(meta)))
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    tx_ref: &str,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let order = Orders::find()
        .filter(OrderCol::TxRef.eq(tx_ref))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Order"))?;
    ensure_owner_or_staff(user, order.user_id)?;

    let data = order_with_items(state, order).await?;
    Ok(ApiResponse::success("OK", data, Some(Meta::empty())))
}

/// Loads the lines of the given orders, optionally only those of one seller.
pub(crate) async fn load_lines(
    state: &AppState,
    order_ids: &[Uuid],
    seller_id: Option<Uuid>,
) -> AppResult<Vec<LineRow>> {
    let rows = sqlx::query_as::<_, LineRow>(
        r#"
        SELECT oi.id, oi.order_id, oi.quantity,
               p.name, p.slug, p.price_current, s.business_name AS seller_name
        FROM order_items oi
        JOIN products p ON p.id = oi.product_id
        JOIN sellers s ON s.id = p.seller_id
        WHERE oi.order_id = ANY($1)
          AND ($2::uuid IS NULL OR p.seller_id = $2)
        ORDER BY oi.created_at
        "#,
    )
    .bind(order_ids)
    .bind(seller_id)
    .fetch_all(&state.pool)
    .await?;
    Ok(rows)
}

pub(crate) async fn orders_with_lines(
    state: &AppState,
    orders: Vec<OrderModel>,
) -> AppResult<Vec<Order>> {
    let ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
    let mut lines: HashMap<Uuid, Vec<OrderLine>> = HashMap::new();
    for row in load_lines(state, &ids, None).await? {
        if let Some(order_id) = row.order_id {
            lines.entry(order_id).or_default().push(row.into_line());
        }
    }

    Ok(orders
        .into_iter()
        .map(|order| {
            let totals = order_totals(lines.get(&order.id).map(Vec::as_slice).unwrap_or(&[]));
            order_from_entity(order, totals)
        })
        .collect())
}

async fn order_with_items(state: &AppState, order: OrderModel) -> AppResult<OrderWithItems> {
    let items: Vec<OrderLine> = load_lines(state, &[order.id], None)
        .await?
        .into_iter()
        .map(LineRow::into_line)
        .collect();
    let totals = order_totals(&items);
    Ok(OrderWithItems {
        order: order_from_entity(order, totals),
        items,
    })
}

pub(crate) fn order_from_entity(model: OrderModel, totals: OrderTotals) -> Order {
    Order {
        id: model.id,
        tx_ref: model.tx_ref,
        email: model.email.clone(),
        delivery_status: model.delivery_status,
        payment_status: model.payment_status,
        date_delivered: model.date_delivered.map(|dt| dt.with_timezone(&Utc)),
        shipping_details: ShippingDetails {
            full_name: model.full_name,
            email: model.email,
            phone: model.phone,
            address: model.address,
            city: model.city,
            country: model.country,
            zipcode: model.zipcode,
        },
        subtotal: totals.subtotal,
        total: totals.total,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

fn build_tx_ref(order_id: Uuid) -> String {
    let date = Utc::now().format("%Y%m%d");
    let suffix = order_id.simple().to_string();
    let short = &suffix[..8];
    format!("ORD-{}-{}", date, short)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(price: &str, quantity: i32) -> OrderLine {
        let price: Decimal = price.parse().unwrap();
        OrderLine {
            id: Uuid::new_v4(),
            product: LineProduct {
                seller: "Ferris Goods".into(),
                name: "Mug".into(),
                slug: "mug".into(),
                price,
            },
            quantity,
            total: line_total(price, quantity),
        }
    }

    #[test]
    fn totals_sum_line_totals() {
        let totals = order_totals(&[line("10.00", 3), line("2.50", 2)]);
        assert_eq!(totals.subtotal, "35.00".parse::<Decimal>().unwrap());
        assert_eq!(totals.total, totals.subtotal);
    }

    #[test]
    fn empty_order_totals_are_zero() {
        let totals = order_totals(&[]);
        assert_eq!(totals.subtotal, Decimal::ZERO);
        assert_eq!(totals.total, Decimal::ZERO);
    }

    #[test]
    fn tx_ref_embeds_date_and_order_prefix() {
        let id = Uuid::new_v4();
        let tx_ref = build_tx_ref(id);
        assert!(tx_ref.starts_with("ORD-"));
        assert!(tx_ref.ends_with(&id.simple().to_string()[..8]));
        assert_eq!(tx_ref.len(), "ORD-YYYYMMDD-".len() + 8);
    }
}
