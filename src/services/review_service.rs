use std::collections::HashMap;

use chrono::{NaiveTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, Condition, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    audit::record,
    dto::reviews::{ReviewList, ReviewRequest},
    entity::{
        products::{Entity as Products, Model as ProductModel},
        reviews::{ActiveModel as ReviewActive, Column as ReviewCol, Entity as Reviews, Model as ReviewModel},
        users::{Column as UserCol, Entity as Users, Model as UserModel},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_owner_or_staff},
    models::{Review, ReviewAuthor},
    response::{ApiResponse, Meta},
    routes::params::{Ordering, ReviewQuery},
    services::catalog_service::find_product_by_slug,
    state::AppState,
};

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

pub fn validate_review(payload: &ReviewRequest) -> AppResult<()> {
    if !(MIN_RATING..=MAX_RATING).contains(&payload.rating) {
        return Err(AppError::validation(format!(
            "rating must be between {MIN_RATING} and {MAX_RATING}"
        )));
    }
    if payload.text.trim().is_empty() {
        return Err(AppError::validation("text must not be blank"));
    }
    Ok(())
}

pub fn is_unchanged(current: &ReviewModel, payload: &ReviewRequest) -> bool {
    current.rating == payload.rating && current.text == payload.text
}

pub async fn list_reviews(
    state: &AppState,
    product_slug: &str,
    query: ReviewQuery,
) -> AppResult<ApiResponse<ReviewList>> {
    let product = find_product_by_slug(state, product_slug)
        .await?
        .ok_or_else(|| AppError::not_found("Product"))?;
    let (page, limit, offset) = query.pagination().normalize();

    let mut condition = Condition::all()
        .add(ReviewCol::ProductId.eq(product.id))
        .add(ReviewCol::IsDeleted.eq(false));
    if let Some(min) = query.min_rating {
        condition = condition.add(ReviewCol::Rating.gte(min));
    }
    if let Some(max) = query.max_rating {
        condition = condition.add(ReviewCol::Rating.lte(max));
    }
    if let Some(date) = query.date_after {
        let since = date.and_time(NaiveTime::MIN).and_utc();
        condition = condition.add(ReviewCol::CreatedAt.gte(since));
    }

    let mut finder = Reviews::find().filter(condition);
    if let Some(ordering) = query.ordering_rating {
        finder = match ordering {
            Ordering::Increase => finder.order_by_asc(ReviewCol::Rating),
            Ordering::Decrease => finder.order_by_desc(ReviewCol::Rating),
        };
    }
    finder = match query.ordering_created {
        Some(Ordering::Increase) => finder.order_by_asc(ReviewCol::CreatedAt),
        Some(Ordering::Decrease) | None => finder.order_by_desc(ReviewCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;
    let models = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    let author_ids: Vec<Uuid> = models.iter().map(|r| r.user_id).collect();
    let authors: HashMap<Uuid, UserModel> = Users::find()
        .filter(UserCol::Id.is_in(author_ids))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();

    let items = models
        .into_iter()
        .map(|model| {
            let author = authors.get(&model.user_id);
            review_from_parts(model, &product, author)
        })
        .collect();

    Ok(ApiResponse::success(
        "Reviews",
        ReviewList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn create_review(
    state: &AppState,
    user: &AuthUser,
    product_slug: &str,
    payload: ReviewRequest,
) -> AppResult<ApiResponse<Review>> {
    let product = find_product_by_slug(state, product_slug)
        .await?
        .ok_or_else(|| AppError::not_found("Product"))?;
    validate_review(&payload)?;

    let existing = Reviews::find()
        .filter(ReviewCol::UserId.eq(user.user_id))
        .filter(ReviewCol::ProductId.eq(product.id))
        .filter(ReviewCol::IsDeleted.eq(false))
        .one(&state.orm)
        .await?;
    if existing.is_some() {
        return Err(AppError::DuplicateReview);
    }

    let review = ReviewActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        product_id: Set(product.id),
        rating: Set(payload.rating),
        text: Set(payload.text),
        is_deleted: Set(false),
        deleted_at: Set(None),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await
    .map_err(|err| {
        // A concurrent create can pass the check above; the index decides.
        if AppError::is_unique_violation(&err, "uniq_active_review") {
            AppError::DuplicateReview
        } else {
            AppError::from(err)
        }
    })?;

    tracing::info!(user_id = %user.user_id, product = %product.slug, rating = review.rating, "review created");
    record(
        &state.pool,
        user.user_id,
        "create_review",
        "reviews",
        serde_json::json!({ "review_id": review.id, "product_id": product.id }),
    )
    .await;

    let author = Users::find_by_id(review.user_id).one(&state.orm).await?;
    Ok(ApiResponse::success(
        "Review created",
        review_from_parts(review, &product, author.as_ref()),
        Some(Meta::empty()),
    ))
}

pub async fn update_review(
    state: &AppState,
    user: &AuthUser,
    review_id: Uuid,
    payload: ReviewRequest,
) -> AppResult<ApiResponse<Review>> {
    let current = find_review(state, review_id).await?;
    ensure_owner_or_staff(user, current.user_id)?;
    validate_review(&payload)?;
    if is_unchanged(&current, &payload) {
        return Err(AppError::NoChange);
    }

    let mut active: ReviewActive = current.into();
    active.rating = Set(payload.rating);
    active.text = Set(payload.text);
    active.updated_at = Set(Utc::now().into());
    let review = active.update(&state.orm).await?;

    tracing::info!(user_id = %user.user_id, review_id = %review.id, "review updated");
    record(
        &state.pool,
        user.user_id,
        "update_review",
        "reviews",
        serde_json::json!({ "review_id": review.id }),
    )
    .await;

    let product = review_product(state, review.product_id).await?;
    let author = Users::find_by_id(review.user_id).one(&state.orm).await?;
    Ok(ApiResponse::success(
        "Review updated",
        review_from_parts(review, &product, author.as_ref()),
        Some(Meta::empty()),
    ))
}

pub async fn delete_review(
    state: &AppState,
    user: &AuthUser,
    review_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let current = find_review(state, review_id).await?;
    ensure_owner_or_staff(user, current.user_id)?;

    Reviews::delete_by_id(current.id).exec(&state.orm).await?;

    tracing::info!(user_id = %user.user_id, review_id = %current.id, "review deleted");
    record(
        &state.pool,
        user.user_id,
        "delete_review",
        "reviews",
        serde_json::json!({ "review_id": current.id, "product_id": current.product_id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Review deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

async fn find_review(state: &AppState, review_id: Uuid) -> AppResult<ReviewModel> {
    Reviews::find_by_id(review_id)
        .filter(ReviewCol::IsDeleted.eq(false))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Review"))
}

async fn review_product(state: &AppState, product_id: Uuid) -> AppResult<ProductModel> {
    Products::find_by_id(product_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Product"))
}

fn review_from_parts(model: ReviewModel, product: &ProductModel, author: Option<&UserModel>) -> Review {
    Review {
        review_id: model.id,
        product_id: product.id,
        product_name: product.name.clone(),
        user: ReviewAuthor {
            id: model.user_id,
            first_name: author.and_then(|u| u.first_name.clone()),
            last_name: author.and_then(|u| u.last_name.clone()),
        },
        rating: model.rating,
        text: model.text,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
