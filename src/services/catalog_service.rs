use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, Condition, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    audit::record,
    dto::{
        catalog::{CategoryList, CreateCategoryRequest},
        products::ProductList,
    },
    entity::{
        categories::{
            ActiveModel as CategoryActive, Column as CategoryCol, Entity as Categories,
            Model as CategoryModel,
        },
        products::{Column as ProdCol, Entity as Products, Model as ProductModel},
        sellers::{Column as SellerCol, Entity as Sellers, Model as SellerModel},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_staff},
    models::{Category, Product, SellerShop},
    response::{ApiResponse, Meta},
    routes::params::ProductQuery,
    slug::slugify,
    state::AppState,
};

pub async fn list_categories(state: &AppState) -> AppResult<ApiResponse<CategoryList>> {
    let items = Categories::find()
        .order_by_asc(CategoryCol::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(category_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Categories",
        CategoryList { items },
        Some(Meta::empty()),
    ))
}

pub async fn create_category(
    state: &AppState,
    user: &AuthUser,
    payload: CreateCategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    ensure_staff(user)?;
    let name = payload.name.trim().to_string();
    let slug = slugify(&name);
    if slug.is_empty() {
        return Err(AppError::validation("Category name must not be blank"));
    }

    let exist = Categories::find()
        .filter(CategoryCol::Slug.eq(slug.as_str()))
        .one(&state.orm)
        .await?;
    if exist.is_some() {
        return Err(AppError::validation("Category already exists"));
    }

    let category = CategoryActive {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        slug: Set(slug),
        image_url: Set(payload.image_url),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    record(
        &state.pool,
        user.user_id,
        "category_create",
        "categories",
        serde_json::json!({ "category_id": category.id, "slug": category.slug }),
    )
    .await;

    Ok(ApiResponse::success(
        "Category created",
        category_from_entity(category),
        Some(Meta::empty()),
    ))
}

pub async fn list_products(
    state: &AppState,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all().add(ProdCol::IsDeleted.eq(false));

    if let Some(max_price) = query.max_price {
        condition = condition.add(ProdCol::PriceCurrent.lte(max_price));
    }
    if let Some(min_price) = query.min_price {
        condition = condition.add(ProdCol::PriceCurrent.gte(min_price));
    }
    if let Some(in_stock) = query.in_stock {
        condition = condition.add(ProdCol::InStock.gte(in_stock));
    }
    if let Some(created_at) = query.created_at {
        condition = condition.add(ProdCol::CreatedAt.gte(created_at));
    }

    let finder = Products::find()
        .filter(condition)
        .order_by_desc(ProdCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;

    let models = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;
    let items = hydrate_products(state, models).await?;

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Products", ProductList { items }, Some(meta)))
}

pub async fn get_product(state: &AppState, slug: &str) -> AppResult<ApiResponse<Product>> {
    let product = find_product_by_slug(state, slug)
        .await?
        .ok_or_else(|| AppError::not_found("Product"))?;
    let product = hydrate_products(state, vec![product])
        .await?
        .pop()
        .ok_or_else(|| AppError::not_found("Product"))?;
    Ok(ApiResponse::success("Product", product, None))
}

pub async fn list_products_by_category(
    state: &AppState,
    slug: &str,
) -> AppResult<ApiResponse<ProductList>> {
    let category = Categories::find()
        .filter(CategoryCol::Slug.eq(slug))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Category"))?;

    let models = Products::find()
        .filter(ProdCol::CategoryId.eq(category.id))
        .filter(ProdCol::IsDeleted.eq(false))
        .order_by_desc(ProdCol::CreatedAt)
        .all(&state.orm)
        .await?;
    let items = hydrate_products(state, models).await?;

    Ok(ApiResponse::success(
        "Category products",
        ProductList { items },
        Some(Meta::empty()),
    ))
}

pub async fn list_products_by_seller(
    state: &AppState,
    slug: &str,
) -> AppResult<ApiResponse<ProductList>> {
    let seller = Sellers::find()
        .filter(SellerCol::Slug.eq(slug))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Seller"))?;

    let models = Products::find()
        .filter(ProdCol::SellerId.eq(seller.id))
        .filter(ProdCol::IsDeleted.eq(false))
        .order_by_desc(ProdCol::CreatedAt)
        .all(&state.orm)
        .await?;
    let items = hydrate_products(state, models).await?;

    Ok(ApiResponse::success(
        "Seller products",
        ProductList { items },
        Some(Meta::empty()),
    ))
}

pub(crate) async fn find_product_by_slug(
    state: &AppState,
    slug: &str,
) -> AppResult<Option<ProductModel>> {
    let product = Products::find()
        .filter(ProdCol::Slug.eq(slug))
        .filter(ProdCol::IsDeleted.eq(false))
        .one(&state.orm)
        .await?;
    Ok(product)
}

pub(crate) async fn find_category_by_slug(
    state: &AppState,
    slug: &str,
) -> AppResult<CategoryModel> {
    Categories::find()
        .filter(CategoryCol::Slug.eq(slug))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Category"))
}

/// Attaches seller, category and average rating to each product, preserving order.
pub(crate) async fn hydrate_products(
    state: &AppState,
    models: Vec<ProductModel>,
) -> AppResult<Vec<Product>> {
    if models.is_empty() {
        return Ok(Vec::new());
    }

    let seller_ids: Vec<Uuid> = models.iter().map(|p| p.seller_id).collect();
    let category_ids: Vec<Uuid> = models.iter().map(|p| p.category_id).collect();
    let product_ids: Vec<Uuid> = models.iter().map(|p| p.id).collect();

    let sellers: HashMap<Uuid, SellerModel> = Sellers::find()
        .filter(SellerCol::Id.is_in(seller_ids))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|s| (s.id, s))
        .collect();
    let categories: HashMap<Uuid, CategoryModel> = Categories::find()
        .filter(CategoryCol::Id.is_in(category_ids))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|c| (c.id, c))
        .collect();

    let ratings: HashMap<Uuid, Option<f64>> = sqlx::query_as::<_, (Uuid, Option<f64>)>(
        r#"
        SELECT product_id, AVG(rating)::float8
        FROM reviews
        WHERE is_deleted = FALSE AND product_id = ANY($1)
        GROUP BY product_id
        "#,
    )
    .bind(&product_ids)
    .fetch_all(&state.pool)
    .await?
    .into_iter()
    .collect();

    let mut items = Vec::with_capacity(models.len());
    for model in models {
        let seller = sellers
            .get(&model.seller_id)
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("product without seller")))?;
        let category = categories
            .get(&model.category_id)
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("product without category")))?;
        let rating = ratings.get(&model.id).copied().flatten();
        items.push(product_from_parts(model, seller, category, rating));
    }
    Ok(items)
}

pub(crate) fn product_from_parts(
    model: ProductModel,
    seller: &SellerModel,
    category: &CategoryModel,
    average_rating: Option<f64>,
) -> Product {
    Product {
        id: model.id,
        seller: SellerShop {
            name: seller.business_name.clone(),
            slug: seller.slug.clone(),
        },
        category: category_from_entity(category.clone()),
        name: model.name,
        slug: model.slug,
        description: model.description,
        price_old: model.price_old,
        price_current: model.price_current,
        in_stock: model.in_stock,
        image1: model.image1,
        image2: model.image2,
        image3: model.image3,
        average_rating: round_rating(average_rating),
        created_at: model.created_at.with_timezone(&Utc),
    }
}

/// Two-decimal average; products without reviews report `0.0`.
pub fn round_rating(avg: Option<f64>) -> f64 {
    match avg {
        Some(avg) => (avg * 100.0).round() / 100.0,
        None => 0.0,
    }
}

fn category_from_entity(model: CategoryModel) -> Category {
    Category {
        name: model.name,
        slug: model.slug,
        image_url: model.image_url,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_rounds_to_two_decimals() {
        assert_eq!(round_rating(Some(4.0 / 3.0)), 1.33);
        assert_eq!(round_rating(Some(4.666_666)), 4.67);
        assert_eq!(round_rating(None), 0.0);
    }
}
