mod common;

use axum_marketplace_api::{
    dto::products::UpdateProductRequest,
    error::AppError,
    routes::params::ProductQuery,
    services::{admin_service, catalog_service, product_service},
};
use rust_decimal::Decimal;

#[tokio::test]
async fn seller_needs_approval_and_owns_its_products() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };

    let staff = common::create_user(&state, "staff", true).await?;
    let category = common::create_category(&state, &staff).await?;

    let (pending, pending_slug) = common::create_seller(&state, "pending", None).await?;
    let blocked = common::create_product(&state, &pending, &category, Decimal::new(1000, 2)).await;
    let blocked = blocked.unwrap_err().downcast::<AppError>()?;
    assert!(matches!(blocked, AppError::Forbidden(_)));

    let buyer = common::create_user(&state, "buyer", false).await?;
    let not_staff = admin_service::approve_seller(&state, &buyer, &pending_slug).await;
    assert!(matches!(not_staff, Err(AppError::Forbidden(_))));

    admin_service::approve_seller(&state, &staff, &pending_slug).await?;
    let product = common::create_product(&state, &pending, &category, Decimal::new(1000, 2)).await?;
    assert!(product.price_old.is_none());
    assert_eq!(product.average_rating, 0.0);

    // Same price leaves the old price alone.
    let same = product_service::update_product(
        &state,
        &pending,
        &product.slug,
        UpdateProductRequest {
            price_current: Some(Decimal::new(1000, 2)),
            in_stock: Some(4),
            ..Default::default()
        },
    )
    .await?
    .data
    .unwrap();
    assert!(same.price_old.is_none());
    assert_eq!(same.in_stock, 4);
    assert_eq!(same.name, product.name);

    let repriced = product_service::update_product(
        &state,
        &pending,
        &product.slug,
        UpdateProductRequest {
            price_current: Some(Decimal::new(1250, 2)),
            ..Default::default()
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(repriced.price_current, Decimal::new(1250, 2));
    assert_eq!(repriced.price_old, Some(Decimal::new(1000, 2)));

    let bad_category = product_service::update_product(
        &state,
        &pending,
        &product.slug,
        UpdateProductRequest {
            category_slug: Some("no-such-category".into()),
            ..Default::default()
        },
    )
    .await;
    assert!(matches!(bad_category, Err(AppError::NotFound(_))));

    let (rival, _) = common::create_seller(&state, "rival", Some(&staff)).await?;
    let stolen = product_service::update_product(
        &state,
        &rival,
        &product.slug,
        UpdateProductRequest {
            name: Some("Mine".into()),
            ..Default::default()
        },
    )
    .await;
    assert!(matches!(stolen, Err(AppError::Forbidden(_))));

    let missing = product_service::delete_product(&state, &rival, "no-such-product").await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));

    let listed = catalog_service::list_products(
        &state,
        ProductQuery {
            min_price: Some(Decimal::new(1200, 2)),
            max_price: Some(Decimal::new(1250, 2)),
            created_at: Some(product.created_at),
            ..Default::default()
        },
    )
    .await?
    .data
    .unwrap();
    assert!(listed.items.iter().any(|p| p.slug == product.slug));

    let own = product_service::list_seller_products(&state, &pending)
        .await?
        .data
        .unwrap();
    assert_eq!(own.items.len(), 1);

    product_service::delete_product(&state, &pending, &product.slug).await?;
    let deleted = catalog_service::get_product(&state, &product.slug).await;
    assert!(matches!(deleted, Err(AppError::NotFound(_))));

    Ok(())
}
