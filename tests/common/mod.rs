// tests/common/mod.rs
//
// Shared scaffolding for the integration suites. Tests are skipped (not
// failed) when DATABASE_URL is absent, so the unit suites still run on
// machines without a Postgres instance.
#![allow(dead_code)]

use inkpost::{config::Config, routes, state::AppState};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

pub const TEST_SECRET: &str = "integration_test_secret";

/// Spawns the app on a random port against the DATABASE_URL database.
/// Returns `None` (skip) when no database is configured.
pub async fn spawn_app() -> Option<(String, PgPool)> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set; skipping integration test");
        return None;
    };

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&database_url)
        .await
        .expect("Failed to connect to Postgres for testing.");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    let config = Config {
        database_url: database_url.clone(),
        jwt_secret: TEST_SECRET.to_string(),
        rust_log: "error".to_string(),
        port: 0,
    };

    let state = AppState {
        pool: pool.clone(),
        config,
    };
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    Some((address, pool))
}

/// Bearer token for the given user, signed the way the identity provider
/// signs real ones.
pub fn token(user_id: i64) -> String {
    inkpost::utils::jwt::sign_jwt(user_id, TEST_SECRET, 600).expect("Failed to sign test token")
}

pub async fn seed_user(pool: &PgPool, prefix: &str) -> i64 {
    let unique = uuid::Uuid::new_v4().simple().to_string();
    let username = format!("{}_{}", prefix, &unique[..8]);

    sqlx::query_scalar::<_, i64>(
        "INSERT INTO users (username, fullname) VALUES ($1, $2) RETURNING id",
    )
    .bind(&username)
    .bind("Test User")
    .fetch_one(pool)
    .await
    .expect("Failed to seed user")
}

pub async fn seed_post(pool: &PgPool, author: i64) -> i64 {
    let slug = format!("test-post-{}", uuid::Uuid::new_v4().simple());

    sqlx::query_scalar::<_, i64>(
        "INSERT INTO posts (slug, user_id, title, des) VALUES ($1, $2, 'Test post', 'about testing') RETURNING id",
    )
    .bind(&slug)
    .bind(author)
    .fetch_one(pool)
    .await
    .expect("Failed to seed post")
}

/// (total_comments, total_parent_comments) for the post.
pub async fn post_counters(pool: &PgPool, post_id: i64) -> (i64, i64) {
    sqlx::query_as::<_, (i64, i64)>(
        "SELECT total_comments, total_parent_comments FROM posts WHERE id = $1",
    )
    .bind(post_id)
    .fetch_one(pool)
    .await
    .expect("Failed to read post counters")
}

/// total_likes for the post.
pub async fn like_count(pool: &PgPool, post_id: i64) -> i64 {
    sqlx::query_scalar::<_, i64>("SELECT total_likes FROM posts WHERE id = $1")
        .bind(post_id)
        .fetch_one(pool)
        .await
        .expect("Failed to read like counter")
}
