mod common;

use axum_marketplace_api::{
    dto::{
        cart::{ToggleCartItemRequest, ToggleResult},
        orders::CheckoutRequest,
    },
    error::AppError,
    middleware::auth::AuthUser,
    models::OrderLine,
    routes::params::OrderListQuery,
    services::{admin_service, cart_service, order_service, seller_service},
    state::AppState,
};
use rust_decimal::Decimal;
use uuid::Uuid;

fn toggle(slug: &str, quantity: i32) -> ToggleCartItemRequest {
    ToggleCartItemRequest {
        slug: slug.to_string(),
        quantity,
    }
}

/// Open cart rows for one product, read straight from the table.
async fn cart_rows(state: &AppState, user: &AuthUser, product_id: Uuid) -> anyhow::Result<i64> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM order_items WHERE user_id = $1 AND product_id = $2 AND order_id IS NULL",
    )
    .bind(user.user_id)
    .bind(product_id)
    .fetch_one(&state.pool)
    .await?;
    Ok(count)
}

fn sorted_slugs(lines: &[OrderLine]) -> Vec<String> {
    let mut slugs: Vec<String> = lines.iter().map(|line| line.product.slug.clone()).collect();
    slugs.sort();
    slugs
}

// Buyer fills the cart, checks out once, and the order becomes visible to
// the buyer, staff and the seller.
#[tokio::test]
async fn cart_checkout_and_order_visibility_flow() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };

    let staff = common::create_user(&state, "staff", true).await?;
    let buyer = common::create_user(&state, "buyer", false).await?;
    let stranger = common::create_user(&state, "stranger", false).await?;
    let (seller, _) = common::create_seller(&state, "ferris", Some(&staff)).await?;
    let category = common::create_category(&state, &staff).await?;
    let mug = common::create_product(&state, &seller, &category, Decimal::new(1000, 2)).await?;
    let spare = common::create_product(&state, &seller, &category, Decimal::new(500, 2)).await?;
    let shipping_id = common::create_shipping(&state, &buyer).await?;

    // Nothing to check out yet.
    let empty = order_service::checkout(&state, &buyer, CheckoutRequest { shipping_id }).await;
    assert!(matches!(empty, Err(AppError::EmptyCart)));

    let added = cart_service::toggle_cart_item(&state, &buyer, toggle(&mug.slug, 1))
        .await?
        .data
        .unwrap();
    assert_eq!(added.result, ToggleResult::Created);

    let updated = cart_service::toggle_cart_item(&state, &buyer, toggle(&mug.slug, 3))
        .await?
        .data
        .unwrap();
    assert_eq!(updated.result, ToggleResult::Updated);
    assert_eq!(updated.item.unwrap().quantity, 3);

    // Zero on a product that is not in the cart changes nothing.
    let noop = cart_service::toggle_cart_item(&state, &buyer, toggle(&spare.slug, 0))
        .await?
        .data
        .unwrap();
    assert_eq!(noop.result, ToggleResult::Removed);
    assert!(noop.item.is_none());

    let negative = cart_service::toggle_cart_item(&state, &buyer, toggle(&mug.slug, -1)).await;
    assert!(matches!(negative, Err(AppError::Validation(_))));

    let cart = cart_service::list_cart(&state, &buyer).await?.data.unwrap();
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].quantity, 3);
    assert_eq!(cart.items[0].total, Decimal::new(3000, 2));

    // Another user's address does not resolve for the buyer.
    let foreign_shipping = common::create_shipping(&state, &stranger).await?;
    let foreign = order_service::checkout(
        &state,
        &buyer,
        CheckoutRequest {
            shipping_id: foreign_shipping,
        },
    )
    .await;
    assert!(matches!(foreign, Err(AppError::NotFound(_))));

    let placed = order_service::checkout(&state, &buyer, CheckoutRequest { shipping_id })
        .await?
        .data
        .unwrap();
    assert_eq!(placed.items.len(), 1);
    assert_eq!(placed.order.subtotal, Decimal::new(3000, 2));
    assert_eq!(placed.order.total, placed.order.subtotal);
    assert_eq!(placed.order.delivery_status, "PENDING");
    assert_eq!(placed.order.shipping_details.city, "London");
    assert!(placed.order.tx_ref.starts_with("ORD-"));

    let cart = cart_service::list_cart(&state, &buyer).await?.data.unwrap();
    assert!(cart.items.is_empty());

    let again = order_service::checkout(&state, &buyer, CheckoutRequest { shipping_id }).await;
    assert!(matches!(again, Err(AppError::EmptyCart)));

    // Visibility.
    let mine = order_service::list_orders(&state, &buyer, OrderListQuery::default())
        .await?
        .data
        .unwrap();
    assert_eq!(mine.items.len(), 1);
    assert_eq!(mine.items[0].subtotal, Decimal::new(3000, 2));

    let pending = order_service::list_orders(
        &state,
        &buyer,
        OrderListQuery {
            delivery_status: Some("pending".into()),
            ..Default::default()
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(pending.items.len(), 1);

    let unknown_status = order_service::list_orders(
        &state,
        &buyer,
        OrderListQuery {
            delivery_status: Some("lost".into()),
            ..Default::default()
        },
    )
    .await;
    assert!(matches!(unknown_status, Err(AppError::BadRequest(_))));

    let tx_ref = placed.order.tx_ref.clone();
    assert!(order_service::get_order(&state, &buyer, &tx_ref).await.is_ok());
    assert!(order_service::get_order(&state, &staff, &tx_ref).await.is_ok());
    let denied = order_service::get_order(&state, &stranger, &tx_ref).await;
    assert!(matches!(denied, Err(AppError::Forbidden(_))));

    let all = admin_service::list_all_orders(&state, &staff, OrderListQuery::default()).await;
    assert!(all.is_ok());
    let not_staff = admin_service::list_all_orders(&state, &buyer, OrderListQuery::default()).await;
    assert!(matches!(not_staff, Err(AppError::Forbidden(_))));

    let seller_orders = seller_service::list_orders(&state, &seller).await?.data.unwrap();
    assert!(seller_orders.items.iter().any(|o| o.tx_ref == tx_ref));

    let seller_items = seller_service::list_order_items(&state, &seller, &tx_ref)
        .await?
        .data
        .unwrap();
    assert_eq!(seller_items.items.len(), 1);
    assert_eq!(seller_items.items[0].product.slug, mug.slug);

    Ok(())
}

#[tokio::test]
async fn checkout_moves_exactly_the_cart_and_leaves_older_orders_alone() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };

    let staff = common::create_user(&state, "staff", true).await?;
    let buyer = common::create_user(&state, "buyer", false).await?;
    let (seller, _) = common::create_seller(&state, "lathe", Some(&staff)).await?;
    let category = common::create_category(&state, &staff).await?;
    let mug = common::create_product(&state, &seller, &category, Decimal::new(1000, 2)).await?;
    let plate = common::create_product(&state, &seller, &category, Decimal::new(250, 2)).await?;
    let bowl = common::create_product(&state, &seller, &category, Decimal::new(700, 2)).await?;
    let shipping_id = common::create_shipping(&state, &buyer).await?;

    cart_service::toggle_cart_item(&state, &buyer, toggle(&mug.slug, 2)).await?;
    cart_service::toggle_cart_item(&state, &buyer, toggle(&plate.slug, 4)).await?;
    cart_service::toggle_cart_item(&state, &buyer, toggle(&bowl.slug, 3)).await?;
    assert_eq!(cart_rows(&state, &buyer, bowl.id).await?, 1);

    let removed = cart_service::toggle_cart_item(&state, &buyer, toggle(&bowl.slug, 0))
        .await?
        .data
        .unwrap();
    assert_eq!(removed.result, ToggleResult::Removed);
    assert!(removed.item.is_none());
    assert_eq!(cart_rows(&state, &buyer, bowl.id).await?, 0);

    let cart = cart_service::list_cart(&state, &buyer).await?.data.unwrap();
    let cart_slugs = sorted_slugs(&cart.items);
    assert_eq!(cart_slugs.len(), 2);

    let first = order_service::checkout(&state, &buyer, CheckoutRequest { shipping_id })
        .await?
        .data
        .unwrap();
    assert_eq!(sorted_slugs(&first.items), cart_slugs);
    // 2 x 10.00 + 4 x 2.50
    assert_eq!(first.order.subtotal, Decimal::new(3000, 2));
    assert_eq!(cart_rows(&state, &buyer, mug.id).await?, 0);
    assert_eq!(cart_rows(&state, &buyer, plate.id).await?, 0);

    cart_service::toggle_cart_item(&state, &buyer, toggle(&bowl.slug, 1)).await?;
    let second = order_service::checkout(&state, &buyer, CheckoutRequest { shipping_id })
        .await?
        .data
        .unwrap();
    assert_eq!(sorted_slugs(&second.items), vec![bowl.slug.clone()]);
    assert_ne!(second.order.tx_ref, first.order.tx_ref);

    let reread = order_service::get_order(&state, &buyer, &first.order.tx_ref)
        .await?
        .data
        .unwrap();
    assert_eq!(sorted_slugs(&reread.items), cart_slugs);
    assert_eq!(reread.order.subtotal, Decimal::new(3000, 2));

    Ok(())
}

#[tokio::test]
async fn concurrent_toggles_on_one_line_both_succeed() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };

    let staff = common::create_user(&state, "staff", true).await?;
    let buyer = common::create_user(&state, "buyer", false).await?;
    let (seller, _) = common::create_seller(&state, "kiln", Some(&staff)).await?;
    let category = common::create_category(&state, &staff).await?;
    let mug = common::create_product(&state, &seller, &category, Decimal::new(1000, 2)).await?;

    let (left, right) = tokio::join!(
        cart_service::toggle_cart_item(&state, &buyer, toggle(&mug.slug, 2)),
        cart_service::toggle_cart_item(&state, &buyer, toggle(&mug.slug, 5)),
    );
    let left = left?.data.unwrap();
    let right = right?.data.unwrap();
    let mut results = vec![left.result, right.result];
    results.sort_by_key(|result| *result as u8);
    assert_eq!(results, vec![ToggleResult::Created, ToggleResult::Updated]);

    assert_eq!(cart_rows(&state, &buyer, mug.id).await?, 1);
    let cart = cart_service::list_cart(&state, &buyer).await?.data.unwrap();
    assert_eq!(cart.items.len(), 1);
    assert!([2, 5].contains(&cart.items[0].quantity));

    Ok(())
}

// A line added while checkout holds the cart ends up either in the order or
// still in the cart, never in both and never as an error.
#[tokio::test]
async fn toggle_during_checkout_lands_in_order_or_cart() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };

    let staff = common::create_user(&state, "staff", true).await?;
    let buyer = common::create_user(&state, "buyer", false).await?;
    let (seller, _) = common::create_seller(&state, "glaze", Some(&staff)).await?;
    let category = common::create_category(&state, &staff).await?;
    let mug = common::create_product(&state, &seller, &category, Decimal::new(1000, 2)).await?;
    let vase = common::create_product(&state, &seller, &category, Decimal::new(1800, 2)).await?;
    let shipping_id = common::create_shipping(&state, &buyer).await?;

    cart_service::toggle_cart_item(&state, &buyer, toggle(&mug.slug, 1)).await?;

    let (placed, added) = tokio::join!(
        order_service::checkout(&state, &buyer, CheckoutRequest { shipping_id }),
        cart_service::toggle_cart_item(&state, &buyer, toggle(&vase.slug, 1)),
    );
    let placed = placed?.data.unwrap();
    assert_eq!(added?.data.unwrap().result, ToggleResult::Created);

    let ordered = placed.items.iter().filter(|line| line.product.slug == vase.slug).count();
    let in_cart = cart_rows(&state, &buyer, vase.id).await?;
    assert_eq!(ordered as i64 + in_cart, 1);
    assert!(placed.items.iter().any(|line| line.product.slug == mug.slug));
    assert_eq!(cart_rows(&state, &buyer, mug.id).await?, 0);

    Ok(())
}
