// src/routes.rs

use axum::{
    Router, http::Method, middleware,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    handlers::{comments, interaction, notifications, posts, users},
    state::AppState,
    utils::jwt::auth_middleware,
};

/// Assembles the main application router.
///
/// * Public routes serve reads; protected routes sit behind bearer auth.
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (Database Pool + Config).
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let public_routes = Router::new()
        .route("/latest-blogs", post(posts::latest_posts))
        .route("/all-latest-blogs-count", post(posts::latest_posts_count))
        .route("/trending-blogs", get(posts::trending_posts))
        .route("/search-blogs", post(posts::search_posts))
        .route("/search-blogs-count", post(posts::search_posts_count))
        .route("/search-users", post(users::search_users))
        .route("/get-profile", post(users::get_profile))
        .route("/get-blog", post(posts::get_post))
        .route("/get-blog-comments", post(comments::post_comments))
        .route("/get-replies", post(comments::get_replies));

    let protected_routes = Router::new()
        .route("/create-blog", post(posts::create_post))
        .route("/user-written-blogs", post(posts::user_written_posts))
        .route(
            "/user-written-blogs-count",
            post(posts::user_written_posts_count),
        )
        .route("/like-blog", post(interaction::like_post))
        .route("/isliked-by-user", post(interaction::is_liked_by_user))
        .route("/add-comment", post(comments::add_comment))
        .route("/delete-comment", post(comments::delete_comment))
        .route("/new-notification", get(notifications::new_notification))
        .route("/notifications", post(notifications::list_notifications))
        .route(
            "/all-notifications-count",
            post(notifications::notifications_count),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
