#![allow(dead_code)]

use axum_marketplace_api::{
    config::AppConfig,
    db::{create_orm_conn, create_pool, run_migrations},
    dto::{
        catalog::CreateCategoryRequest, products::CreateProductRequest,
        sellers::SellerApplicationRequest, shipping::ShippingAddressRequest,
    },
    entity::users::ActiveModel as UserActive,
    middleware::auth::AuthUser,
    models::{AccountType, Product},
    services::{admin_service, catalog_service, product_service, seller_service, shipping_service},
    state::AppState,
};
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, Set};
use uuid::Uuid;

/// Builds state against `TEST_DATABASE_URL`/`DATABASE_URL`, or `None` to skip.
pub async fn setup_state() -> anyhow::Result<Option<AppState>> {
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            return Ok(None);
        }
    };

    let orm = create_orm_conn(&database_url).await?;
    run_migrations(&orm).await?;
    let pool = create_pool(&database_url).await?;

    let config = AppConfig {
        database_url,
        host: "127.0.0.1".into(),
        port: 0,
        jwt_secret: "test-secret".into(),
        jwt_ttl_hours: 1,
    };
    Ok(Some(AppState::new(pool, orm, config)))
}

/// Short random tag so flows never collide on unique columns.
pub fn tag() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

pub async fn create_user(state: &AppState, name: &str, is_staff: bool) -> anyhow::Result<AuthUser> {
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        email: Set(format!("{name}-{}@example.com", tag())),
        password_hash: Set("dummy".into()),
        first_name: Set(Some(name.to_string())),
        last_name: Set(None),
        account_type: Set(AccountType::Buyer.as_str().into()),
        is_staff: Set(is_staff),
        is_active: Set(true),
        is_deleted: Set(false),
        deleted_at: Set(None),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(AuthUser {
        user_id: user.id,
        is_staff,
    })
}

/// Applies as a seller and returns the caller together with the seller slug.
pub async fn create_seller(
    state: &AppState,
    name: &str,
    staff: Option<&AuthUser>,
) -> anyhow::Result<(AuthUser, String)> {
    let user = create_user(state, name, false).await?;
    let seller = seller_service::apply(
        state,
        &user,
        SellerApplicationRequest {
            business_name: format!("{name} shop"),
            inn_identification_number: None,
            website_url: None,
            phone_number: None,
            business_description: None,
            business_address: None,
            city: None,
            postal_code: None,
            bank_name: None,
            bank_account_number: None,
        },
    )
    .await?
    .data
    .ok_or_else(|| anyhow::anyhow!("missing seller"))?;

    if let Some(staff) = staff {
        admin_service::approve_seller(state, staff, &seller.slug).await?;
    }
    Ok((user, seller.slug))
}

pub async fn create_category(state: &AppState, staff: &AuthUser) -> anyhow::Result<String> {
    let category = catalog_service::create_category(
        state,
        staff,
        CreateCategoryRequest {
            name: format!("Mugs {}", tag()),
            image_url: None,
        },
    )
    .await?
    .data
    .ok_or_else(|| anyhow::anyhow!("missing category"))?;
    Ok(category.slug)
}

pub async fn create_product(
    state: &AppState,
    seller: &AuthUser,
    category_slug: &str,
    price: Decimal,
) -> anyhow::Result<Product> {
    let product = product_service::create_product(
        state,
        seller,
        CreateProductRequest {
            name: "Ferris Mug".into(),
            description: "Ceramic, 350ml".into(),
            price_current: price,
            category_slug: category_slug.to_string(),
            in_stock: 10,
            image1: "https://example.com/mug.png".into(),
            image2: None,
            image3: None,
        },
    )
    .await?
    .data
    .ok_or_else(|| anyhow::anyhow!("missing product"))?;
    Ok(product)
}

pub async fn create_shipping(state: &AppState, user: &AuthUser) -> anyhow::Result<Uuid> {
    let address = shipping_service::create_shipping(
        state,
        user,
        ShippingAddressRequest {
            full_name: "Ada Lovelace".into(),
            email: "ada@example.com".into(),
            phone: "+44123456".into(),
            address: "12 Analytical Row".into(),
            city: "London".into(),
            country: "UK".into(),
            zipcode: "N1 9GU".into(),
        },
    )
    .await?
    .data
    .ok_or_else(|| anyhow::anyhow!("missing shipping address"))?;
    Ok(address.id)
}
