use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::{
    dto::shipping::{ShippingAddressList, ShippingAddressRequest},
    entity::shipping_addresses::{
        ActiveModel as ShippingActive, Column as ShippingCol, Entity as ShippingAddresses,
        Model as ShippingModel,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_owner_or_staff},
    models::ShippingAddress,
    response::{ApiResponse, Meta},
    state::AppState,
};

fn validate(payload: &ShippingAddressRequest) -> AppResult<()> {
    let required = [
        ("full_name", &payload.full_name),
        ("email", &payload.email),
        ("phone", &payload.phone),
        ("address", &payload.address),
        ("city", &payload.city),
        ("country", &payload.country),
        ("zipcode", &payload.zipcode),
    ];
    if let Some((field, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
        return Err(AppError::validation(format!("{field} must not be blank")));
    }
    if !payload.email.contains('@') {
        return Err(AppError::validation("email is invalid"));
    }
    if payload.phone.len() > 20 || payload.zipcode.len() > 20 {
        return Err(AppError::validation(
            "phone and zipcode must be at most 20 characters",
        ));
    }
    Ok(())
}

pub async fn list_shipping(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<ShippingAddressList>> {
    let items = ShippingAddresses::find()
        .filter(ShippingCol::UserId.eq(user.user_id))
        .order_by_desc(ShippingCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(shipping_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Shipping addresses",
        ShippingAddressList { items },
        Some(Meta::empty()),
    ))
}

pub async fn create_shipping(
    state: &AppState,
    user: &AuthUser,
    payload: ShippingAddressRequest,
) -> AppResult<ApiResponse<ShippingAddress>> {
    validate(&payload)?;
    let model = ShippingActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        full_name: Set(payload.full_name),
        email: Set(payload.email),
        phone: Set(payload.phone),
        address: Set(payload.address),
        city: Set(payload.city),
        country: Set(payload.country),
        zipcode: Set(payload.zipcode),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    tracing::debug!(user_id = %user.user_id, shipping_id = %model.id, "shipping address created");
    Ok(ApiResponse::success(
        "Shipping address created",
        shipping_from_entity(model),
        Some(Meta::empty()),
    ))
}

pub async fn get_shipping(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<ShippingAddress>> {
    let model = find_shipping(state, user, id).await?;
    Ok(ApiResponse::success(
        "OK",
        shipping_from_entity(model),
        Some(Meta::empty()),
    ))
}

pub async fn update_shipping(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: ShippingAddressRequest,
) -> AppResult<ApiResponse<ShippingAddress>> {
    let current = find_shipping(state, user, id).await?;
    validate(&payload)?;

    let mut active: ShippingActive = current.into();
    active.full_name = Set(payload.full_name);
    active.email = Set(payload.email);
    active.phone = Set(payload.phone);
    active.address = Set(payload.address);
    active.city = Set(payload.city);
    active.country = Set(payload.country);
    active.zipcode = Set(payload.zipcode);
    active.updated_at = Set(Utc::now().into());
    let model = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Shipping address updated",
        shipping_from_entity(model),
        Some(Meta::empty()),
    ))
}

/// Orders keep their own snapshot, so deleting an address never touches them.
pub async fn delete_shipping(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let current = find_shipping(state, user, id).await?;
    ShippingAddresses::delete_by_id(current.id)
        .exec(&state.orm)
        .await?;

    tracing::debug!(user_id = %user.user_id, shipping_id = %current.id, "shipping address deleted");
    Ok(ApiResponse::success(
        "Shipping address deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

async fn find_shipping(state: &AppState, user: &AuthUser, id: Uuid) -> AppResult<ShippingModel> {
    let model = ShippingAddresses::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Shipping address"))?;
    ensure_owner_or_staff(user, model.user_id)?;
    Ok(model)
}

fn shipping_from_entity(model: ShippingModel) -> ShippingAddress {
    ShippingAddress {
        id: model.id,
        full_name: model.full_name,
        email: model.email,
        phone: model.phone,
        address: model.address,
        city: model.city,
        country: model.country,
        zipcode: model.zipcode,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> ShippingAddressRequest {
        ShippingAddressRequest {
            full_name: "Ada Lovelace".into(),
            email: "ada@example.com".into(),
            phone: "+44123456".into(),
            address: "12 Analytical Row".into(),
            city: "London".into(),
            country: "UK".into(),
            zipcode: "N1 9GU".into(),
        }
    }

    #[test]
    fn complete_address_is_valid() {
        assert!(validate(&payload()).is_ok());
    }

    #[test]
    fn blank_field_is_named_in_error() {
        let mut p = payload();
        p.city = " ".into();
        match validate(&p) {
            Err(AppError::Validation(msg)) => assert!(msg.contains("city")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn email_requires_at_sign() {
        let mut p = payload();
        p.email = "ada.example.com".into();
        assert!(matches!(validate(&p), Err(AppError::Validation(_))));
    }
}
