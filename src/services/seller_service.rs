use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::record,
    dto::sellers::{SellerApplicationRequest, SellerOrderItems, SellerOrderList},
    entity::{
        orders::{Column as OrderCol, Entity as Orders},
        sellers::{ActiveModel as SellerActive, Column as SellerCol, Entity as Sellers, Model as SellerModel},
        users::{ActiveModel as UserActive, Entity as Users},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{AccountType, Seller},
    response::{ApiResponse, Meta},
    services::order_service::{load_lines, orders_with_lines},
    slug::unique_slug,
    state::AppState,
};

/// Creates the caller's seller profile, or refreshes it when one exists, and
/// switches the account to `SELLER`. Approval is left to staff.
pub async fn apply(
    state: &AppState,
    user: &AuthUser,
    payload: SellerApplicationRequest,
) -> AppResult<ApiResponse<Seller>> {
    validate_application(&payload)?;
    let business_name = payload.business_name.trim().to_string();

    let txn = state.orm.begin().await?;

    let account = Users::find_by_id(user.user_id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;

    let existing = Sellers::find()
        .filter(SellerCol::UserId.eq(user.user_id))
        .one(&txn)
        .await?;

    let is_new = existing.is_none();
    let mut active = match existing {
        Some(seller) => {
            let mut active: SellerActive = seller.into();
            active.updated_at = Set(Utc::now().into());
            active
        }
        None => SellerActive {
            id: Set(Uuid::new_v4()),
            user_id: Set(user.user_id),
            slug: Set(unique_slug(&business_name)),
            is_approved: Set(false),
            created_at: NotSet,
            updated_at: NotSet,
            ..Default::default()
        },
    };
    active.business_name = Set(business_name);
    active.inn_identification_number = Set(payload.inn_identification_number);
    active.website_url = Set(payload.website_url);
    active.phone_number = Set(payload.phone_number);
    active.business_description = Set(payload.business_description);
    active.business_address = Set(payload.business_address);
    active.city = Set(payload.city);
    active.postal_code = Set(payload.postal_code);
    active.bank_name = Set(payload.bank_name);
    active.bank_account_number = Set(payload.bank_account_number);
    let seller = if is_new {
        active.insert(&txn).await?
    } else {
        active.update(&txn).await?
    };

    let already_seller = account
        .account_type
        .parse::<AccountType>()
        .is_ok_and(|kind| kind.is_seller());
    if !already_seller {
        let mut account: UserActive = account.into();
        account.account_type = Set(AccountType::Seller.as_str().to_string());
        account.updated_at = Set(Utc::now().into());
        account.update(&txn).await?;
    }

    txn.commit().await?;

    tracing::info!(seller_id = %seller.id, user_id = %user.user_id, "seller application saved");
    record(
        &state.pool,
        user.user_id,
        "seller_apply",
        "sellers",
        serde_json::json!({ "seller_id": seller.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Seller application received",
        seller_from_entity(seller),
        Some(Meta::empty()),
    ))
}

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<SellerOrderList>> {
    let seller = seller_profile(state, user).await?;

    let order_ids: Vec<Uuid> = sqlx::query_as::<_, (Uuid,)>(
        r#"
        SELECT DISTINCT oi.order_id
        FROM order_items oi
        JOIN products p ON p.id = oi.product_id
        WHERE p.seller_id = $1 AND oi.order_id IS NOT NULL
        "#,
    )
    .bind(seller.id)
    .fetch_all(&state.pool)
    .await?
    .into_iter()
    .map(|(id,)| id)
    .collect();

    let orders = Orders::find()
        .filter(OrderCol::Id.is_in(order_ids))
        .order_by_desc(OrderCol::CreatedAt)
        .all(&state.orm)
        .await?;
    let items = orders_with_lines(state, orders).await?;

    Ok(ApiResponse::success(
        "Seller orders",
        SellerOrderList { items },
        Some(Meta::empty()),
    ))
}

pub async fn list_order_items(
    state: &AppState,
    user: &AuthUser,
    tx_ref: &str,
) -> AppResult<ApiResponse<SellerOrderItems>> {
    let seller = seller_profile(state, user).await?;
    let order = Orders::find()
        .filter(OrderCol::TxRef.eq(tx_ref))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Order"))?;

    let items = load_lines(state, &[order.id], Some(seller.id))
        .await?
        .into_iter()
        .map(|row| row.into_line())
        .collect();

    Ok(ApiResponse::success(
        "Seller order items",
        SellerOrderItems {
            order_id: order.id,
            tx_ref: order.tx_ref,
            items,
        },
        Some(Meta::empty()),
    ))
}

/// Column widths of the `sellers` table.
fn validate_application(payload: &SellerApplicationRequest) -> AppResult<()> {
    if payload.business_name.trim().is_empty() {
        return Err(AppError::validation("business_name must not be blank"));
    }
    let limits = [
        ("business_name", Some(payload.business_name.trim()), 255),
        ("inn_identification_number", payload.inn_identification_number.as_deref(), 50),
        ("phone_number", payload.phone_number.as_deref(), 20),
        ("business_address", payload.business_address.as_deref(), 255),
        ("city", payload.city.as_deref(), 100),
        ("postal_code", payload.postal_code.as_deref(), 20),
        ("bank_name", payload.bank_name.as_deref(), 255),
        ("bank_account_number", payload.bank_account_number.as_deref(), 50),
    ];
    for (field, value, max) in limits {
        if value.is_some_and(|v| v.chars().count() > max) {
            return Err(AppError::validation(format!(
                "{field} must be at most {max} characters"
            )));
        }
    }
    Ok(())
}

async fn seller_profile(state: &AppState, user: &AuthUser) -> AppResult<SellerModel> {
    Sellers::find()
        .filter(SellerCol::UserId.eq(user.user_id))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::forbidden("Access is denied"))
}

pub(crate) fn seller_from_entity(model: SellerModel) -> Seller {
    Seller {
        id: model.id,
        business_name: model.business_name,
        slug: model.slug,
        inn_identification_number: model.inn_identification_number,
        website_url: model.website_url,
        phone_number: model.phone_number,
        business_description: model.business_description,
        business_address: model.business_address,
        city: model.city,
        postal_code: model.postal_code,
        is_approved: model.is_approved,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
