mod common;

use axum_marketplace_api::{
    dto::reviews::ReviewRequest,
    error::AppError,
    routes::params::{Ordering, ReviewQuery},
    services::{catalog_service, review_service},
};
use rust_decimal::Decimal;

fn review(rating: i32, text: &str) -> ReviewRequest {
    ReviewRequest {
        rating,
        text: text.into(),
    }
}

#[tokio::test]
async fn one_active_review_per_user_and_product() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };

    let staff = common::create_user(&state, "staff", true).await?;
    let alice = common::create_user(&state, "alice", false).await?;
    let bob = common::create_user(&state, "bob", false).await?;
    let (seller, _) = common::create_seller(&state, "potter", Some(&staff)).await?;
    let category = common::create_category(&state, &staff).await?;
    let product = common::create_product(&state, &seller, &category, Decimal::new(1500, 2)).await?;

    let first = review_service::create_review(&state, &alice, &product.slug, review(4, "Solid mug"))
        .await?
        .data
        .unwrap();
    assert_eq!(first.rating, 4);
    assert_eq!(first.user.first_name.as_deref(), Some("alice"));

    let duplicate =
        review_service::create_review(&state, &alice, &product.slug, review(5, "Again")).await;
    assert!(matches!(duplicate, Err(AppError::DuplicateReview)));

    let out_of_range =
        review_service::create_review(&state, &bob, &product.slug, review(6, "Too good")).await;
    assert!(matches!(out_of_range, Err(AppError::Validation(_))));

    let unknown =
        review_service::create_review(&state, &bob, "no-such-product", review(3, "Hmm")).await;
    assert!(matches!(unknown, Err(AppError::NotFound(_))));

    review_service::create_review(&state, &bob, &product.slug, review(2, "Chipped")).await?;

    let unchanged =
        review_service::update_review(&state, &alice, first.review_id, review(4, "Solid mug"))
            .await;
    assert!(matches!(unchanged, Err(AppError::NoChange)));

    let foreign =
        review_service::update_review(&state, &bob, first.review_id, review(1, "Mine now")).await;
    assert!(matches!(foreign, Err(AppError::Forbidden(_))));

    let edited =
        review_service::update_review(&state, &alice, first.review_id, review(5, "Solid mug!"))
            .await?
            .data
            .unwrap();
    assert_eq!(edited.rating, 5);

    // Average over 5 and 2.
    let rated = catalog_service::get_product(&state, &product.slug)
        .await?
        .data
        .unwrap();
    assert_eq!(rated.average_rating, 3.5);

    let high = review_service::list_reviews(
        &state,
        &product.slug,
        ReviewQuery {
            min_rating: Some(3),
            ..Default::default()
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(high.items.len(), 1);
    assert_eq!(high.items[0].review_id, first.review_id);

    let by_rating = review_service::list_reviews(
        &state,
        &product.slug,
        ReviewQuery {
            ordering_rating: Some(Ordering::Increase),
            ..Default::default()
        },
    )
    .await?
    .data
    .unwrap();
    let ratings: Vec<i32> = by_rating.items.iter().map(|r| r.rating).collect();
    assert_eq!(ratings, vec![2, 5]);

    // Delete then recreate for the same pair.
    review_service::delete_review(&state, &alice, first.review_id).await?;
    let gone = review_service::delete_review(&state, &alice, first.review_id).await;
    assert!(matches!(gone, Err(AppError::NotFound(_))));
    review_service::create_review(&state, &alice, &product.slug, review(3, "Second take")).await?;

    Ok(())
}

#[tokio::test]
async fn concurrent_reviews_by_one_user_keep_a_single_row() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };

    let staff = common::create_user(&state, "staff", true).await?;
    let carol = common::create_user(&state, "carol", false).await?;
    let (seller, _) = common::create_seller(&state, "weaver", Some(&staff)).await?;
    let category = common::create_category(&state, &staff).await?;
    let product = common::create_product(&state, &seller, &category, Decimal::new(900, 2)).await?;

    let (left, right) = tokio::join!(
        review_service::create_review(&state, &carol, &product.slug, review(3, "Fine")),
        review_service::create_review(&state, &carol, &product.slug, review(4, "Nice")),
    );
    let created = [&left, &right].iter().filter(|r| r.is_ok()).count();
    let duplicates = [&left, &right]
        .iter()
        .filter(|r| matches!(r, Err(AppError::DuplicateReview)))
        .count();
    assert_eq!((created, duplicates), (1, 1));

    let listed = review_service::list_reviews(&state, &product.slug, ReviewQuery::default())
        .await?
        .data
        .unwrap();
    assert_eq!(listed.items.len(), 1);
    Ok(())
}
