use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::{
    audit::record,
    dto::products::{CreateProductRequest, ProductList, UpdateProductRequest},
    entity::{
        products::{ActiveModel, Column, Entity as Products, Model as ProductModel},
        sellers::Model as SellerModel,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, approved_seller},
    models::Product,
    response::{ApiResponse, Meta},
    services::catalog_service::{find_category_by_slug, hydrate_products},
    slug::unique_slug,
    state::AppState,
};

pub async fn list_seller_products(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<ProductList>> {
    let seller = approved_seller(&state.orm, user).await?;
    let models = Products::find()
        .filter(Column::SellerId.eq(seller.id))
        .order_by_desc(Column::CreatedAt)
        .all(&state.orm)
        .await?;
    let items = hydrate_products(state, models).await?;
    Ok(ApiResponse::success(
        "Seller products",
        ProductList { items },
        Some(Meta::empty()),
    ))
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    let seller = approved_seller(&state.orm, user).await?;
    validate_create(&payload)?;
    let category = find_category_by_slug(state, payload.category_slug.trim()).await?;

    let name = payload.name.trim().to_string();
    let product = ActiveModel {
        id: Set(Uuid::new_v4()),
        seller_id: Set(seller.id),
        category_id: Set(category.id),
        slug: Set(unique_slug(&name)),
        name: Set(name),
        description: Set(payload.description),
        price_current: Set(payload.price_current),
        price_old: Set(None),
        in_stock: Set(payload.in_stock),
        image1: Set(payload.image1),
        image2: Set(payload.image2),
        image3: Set(payload.image3),
        is_deleted: Set(false),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    tracing::info!(product_id = %product.id, seller_id = %seller.id, "product created");
    record(
        &state.pool,
        user.user_id,
        "product_create",
        "products",
        serde_json::json!({ "product_id": product.id, "slug": product.slug }),
    )
    .await;

    let product = hydrate_one(state, product).await?;
    Ok(ApiResponse::success(
        "Product created",
        product,
        Some(Meta::empty()),
    ))
}

pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    slug: &str,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    let seller = approved_seller(&state.orm, user).await?;
    let existing = owned_product(state, &seller, slug).await?;
    validate_update(&payload)?;

    let category_id = match payload.category_slug.as_deref() {
        Some(category_slug) => Some(find_category_by_slug(state, category_slug.trim()).await?.id),
        None => None,
    };

    let (price_current, price_old) =
        shift_price(existing.price_current, existing.price_old, payload.price_current);
    let price_changed = price_current != existing.price_current;

    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(category_id) = category_id {
        active.category_id = Set(category_id);
    }
    if let Some(in_stock) = payload.in_stock {
        active.in_stock = Set(in_stock);
    }
    if let Some(image1) = payload.image1 {
        active.image1 = Set(image1);
    }
    if let Some(image2) = payload.image2 {
        active.image2 = Set(Some(image2));
    }
    if let Some(image3) = payload.image3 {
        active.image3 = Set(Some(image3));
    }
    if price_changed {
        active.price_current = Set(price_current);
        active.price_old = Set(price_old);
    }
    active.updated_at = Set(chrono::Utc::now().into());

    let product = active.update(&state.orm).await?;

    record(
        &state.pool,
        user.user_id,
        "product_update",
        "products",
        serde_json::json!({ "product_id": product.id, "price_changed": price_changed }),
    )
    .await;

    let product = hydrate_one(state, product).await?;
    Ok(ApiResponse::success("Updated", product, Some(Meta::empty())))
}

pub async fn delete_product(
    state: &AppState,
    user: &AuthUser,
    slug: &str,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let seller = approved_seller(&state.orm, user).await?;
    let product = owned_product(state, &seller, slug).await?;

    let result = Products::delete_by_id(product.id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::not_found("Product"));
    }

    record(
        &state.pool,
        user.user_id,
        "product_delete",
        "products",
        serde_json::json!({ "product_id": product.id, "slug": product.slug }),
    )
    .await;

    Ok(ApiResponse::success(
        "Product deleted successfully",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Returns the new `(price_current, price_old)` pair. The old price moves only
/// when the requested price differs from the stored one.
pub fn shift_price(
    current: Decimal,
    old: Option<Decimal>,
    requested: Option<Decimal>,
) -> (Decimal, Option<Decimal>) {
    match requested {
        Some(price) if price != current => (price, Some(current)),
        _ => (current, old),
    }
}

async fn owned_product(
    state: &AppState,
    seller: &SellerModel,
    slug: &str,
) -> AppResult<ProductModel> {
    let product = Products::find()
        .filter(Column::Slug.eq(slug))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Product"))?;
    if product.seller_id != seller.id {
        return Err(AppError::forbidden("The user is not the seller of this product"));
    }
    Ok(product)
}

async fn hydrate_one(state: &AppState, model: ProductModel) -> AppResult<Product> {
    hydrate_products(state, vec![model])
        .await?
        .pop()
        .ok_or_else(|| AppError::not_found("Product"))
}

fn validate_create(payload: &CreateProductRequest) -> AppResult<()> {
    if payload.name.trim().is_empty() {
        return Err(AppError::validation("name must not be blank"));
    }
    if payload.name.chars().count() > 100 {
        return Err(AppError::validation("name must be at most 100 characters"));
    }
    if payload.description.trim().is_empty() {
        return Err(AppError::validation("description must not be blank"));
    }
    if payload.image1.trim().is_empty() {
        return Err(AppError::validation("image1 is required"));
    }
    validate_price(payload.price_current)?;
    validate_stock(payload.in_stock)
}

fn validate_update(payload: &UpdateProductRequest) -> AppResult<()> {
    if let Some(name) = &payload.name {
        if name.trim().is_empty() {
            return Err(AppError::validation("name must not be blank"));
        }
        if name.chars().count() > 100 {
            return Err(AppError::validation("name must be at most 100 characters"));
        }
    }
    if let Some(price) = payload.price_current {
        validate_price(price)?;
    }
    if let Some(in_stock) = payload.in_stock {
        validate_stock(in_stock)?;
    }
    Ok(())
}

/// Exclusive upper bound of a `NUMERIC(10, 2)` column.
const MAX_PRICE: Decimal = Decimal::from_parts(100_000_000, 0, 0, false, 0);

fn validate_price(price: Decimal) -> AppResult<()> {
    if price <= Decimal::ZERO {
        return Err(AppError::validation("price_current must be greater than 0"));
    }
    if price >= MAX_PRICE {
        return Err(AppError::validation(format!(
            "price_current must be less than {MAX_PRICE}"
        )));
    }
    if price.scale() > 2 {
        return Err(AppError::validation(
            "price_current must have at most 2 decimal places",
        ));
    }
    Ok(())
}

fn validate_stock(in_stock: i32) -> AppResult<()> {
    if in_stock < 0 {
        return Err(AppError::validation("in_stock must not be negative"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn same_price_leaves_old_price_alone() {
        let (current, old) = shift_price(dec("10.00"), Some(dec("12.00")), Some(dec("10")));
        assert_eq!(current, dec("10.00"));
        assert_eq!(old, Some(dec("12.00")));
    }

    #[test]
    fn missing_price_leaves_both_prices_alone() {
        assert_eq!(shift_price(dec("10.00"), None, None), (dec("10.00"), None));
    }

    #[test]
    fn price_change_moves_current_into_old() {
        let (current, old) = shift_price(dec("10.00"), Some(dec("12.00")), Some(dec("8.50")));
        assert_eq!(current, dec("8.50"));
        assert_eq!(old, Some(dec("10.00")));
    }

    fn create_payload() -> CreateProductRequest {
        CreateProductRequest {
            name: "Ferris Mug".into(),
            description: "Coffee tastes better with Ferris".into(),
            price_current: dec("12.50"),
            category_slug: "kitchen".into(),
            in_stock: 10,
            image1: "https://cdn.example.com/mug.png".into(),
            image2: None,
            image3: None,
        }
    }

    #[test]
    fn create_validation_accepts_a_complete_payload() {
        assert!(validate_create(&create_payload()).is_ok());
    }

    #[test]
    fn create_validation_rejects_bad_prices_and_stock() {
        let mut payload = create_payload();
        payload.price_current = Decimal::ZERO;
        assert!(matches!(validate_create(&payload), Err(AppError::Validation(_))));

        let mut payload = create_payload();
        payload.price_current = dec("1.999");
        assert!(validate_create(&payload).is_err());

        let mut payload = create_payload();
        payload.price_current = dec("1000000000");
        assert!(matches!(validate_create(&payload), Err(AppError::Validation(_))));

        let mut payload = create_payload();
        payload.price_current = dec("99999999.99");
        assert!(validate_create(&payload).is_ok());

        let mut payload = create_payload();
        payload.in_stock = -1;
        assert!(validate_create(&payload).is_err());
    }

    #[test]
    fn update_validation_only_checks_present_fields() {
        assert!(validate_update(&UpdateProductRequest::default()).is_ok());
        let payload = UpdateProductRequest {
            name: Some("   ".into()),
            ..Default::default()
        };
        assert!(validate_update(&payload).is_err());
    }
}
