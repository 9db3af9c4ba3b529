pub mod error;
pub mod extract;
pub mod handlers;
pub mod models;
pub mod state;

pub use state::ApiState;

use axum::{
    Router, middleware as axum_middleware,
    routing::{any, get},
};

use crate::infra::http::middleware::log_responses;

pub fn build_api_router(state: ApiState) -> Router {
    Router::new()
        .route(
            "/posts",
            get(handlers::list_posts).post(handlers::create_post),
        )
        .route(
            "/posts/{id}",
            get(handlers::get_post)
                .patch(handlers::update_post)
                .put(handlers::replace_post)
                .delete(handlers::delete_post),
        )
        .route("/posts/", any(handlers::missing_post_id))
        .with_state(state)
        .layer(axum_middleware::from_fn(log_responses))
}
