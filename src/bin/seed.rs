use axum_marketplace_api::{
    config::AppConfig,
    db::{create_orm_conn, create_pool, run_migrations},
    services::auth_service::hash_password,
    slug::slugify,
};
use rust_decimal::Decimal;
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let orm = create_orm_conn(&config.database_url).await?;
    run_migrations(&orm).await?;
    let pool = create_pool(&config.database_url).await?;

    let staff_id = ensure_user(&pool, "staff@example.com", "staff12345", "BUYER", true).await?;
    let buyer_id = ensure_user(&pool, "buyer@example.com", "buyer12345", "BUYER", false).await?;
    let seller_user_id =
        ensure_user(&pool, "seller@example.com", "seller12345", "SELLER", false).await?;

    let seller_id = ensure_seller(&pool, seller_user_id, "Ferris Goods").await?;
    let category_id = ensure_category(&pool, "Merch").await?;
    seed_products(&pool, seller_id, category_id).await?;

    println!("Seed completed. Staff ID: {staff_id}, Buyer ID: {buyer_id}, Seller ID: {seller_id}");
    Ok(())
}

async fn ensure_user(
    pool: &sqlx::PgPool,
    email: &str,
    password: &str,
    account_type: &str,
    is_staff: bool,
) -> anyhow::Result<Uuid> {
    let password_hash = hash_password(password).map_err(|e| anyhow::anyhow!(e.to_string()))?;

    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, password_hash, account_type, is_staff)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (email) DO UPDATE
            SET account_type = EXCLUDED.account_type, is_staff = EXCLUDED.is_staff
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(password_hash)
    .bind(account_type)
    .bind(is_staff)
    .fetch_one(pool)
    .await?;

    println!("Ensured user {email} (account_type={account_type}, staff={is_staff})");
    Ok(id)
}

async fn ensure_seller(pool: &sqlx::PgPool, user_id: Uuid, business_name: &str) -> anyhow::Result<Uuid> {
    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO sellers (id, user_id, business_name, slug, is_approved)
        VALUES ($1, $2, $3, $4, TRUE)
        ON CONFLICT (user_id) DO UPDATE SET is_approved = TRUE
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(business_name)
    .bind(slugify(business_name))
    .fetch_one(pool)
    .await?;

    println!("Ensured approved seller {business_name}");
    Ok(id)
}

async fn ensure_category(pool: &sqlx::PgPool, name: &str) -> anyhow::Result<Uuid> {
    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO categories (id, name, slug)
        VALUES ($1, $2, $3)
        ON CONFLICT (slug) DO UPDATE SET name = EXCLUDED.name
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(slugify(name))
    .fetch_one(pool)
    .await?;
    Ok(id)
}

async fn seed_products(pool: &sqlx::PgPool, seller_id: Uuid, category_id: Uuid) -> anyhow::Result<()> {
    let products = vec![
        ("Axum Hoodie", "Warm hoodie for Rustaceans", Decimal::new(5500, 2), 50),
        ("Ferris Mug", "Coffee tastes better with Ferris", Decimal::new(1200, 2), 100),
        ("Rust Sticker Pack", "Decorate your laptop", Decimal::new(500, 2), 200),
        ("E-book: Async Rust", "Learn async Rust patterns", Decimal::new(2500, 2), 75),
    ];

    for (name, desc, price, stock) in products {
        sqlx::query(
            r#"
            INSERT INTO products
                (id, seller_id, category_id, name, slug, description, price_current, in_stock, image1)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (slug) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(seller_id)
        .bind(category_id)
        .bind(name)
        .bind(slugify(name))
        .bind(desc)
        .bind(price)
        .bind(stock)
        .bind(format!("https://example.com/images/{}.png", slugify(name)))
        .execute(pool)
        .await?;
    }

    println!("Seeded products");
    Ok(())
}
