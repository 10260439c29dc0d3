use axum::{
    Router,
    http::HeaderValue,
    routing::{delete, get, patch, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::db::Store;

mod error;
mod ingredients;
mod recipes;
mod types;
pub mod validation;

pub use error::ApiError;
pub use types::*;

pub struct AppState {
    pub config: Config,

    pub store: Store,
}

impl AppState {
    #[must_use]
    pub const fn store(&self) -> &Store {
        &self.store
    }
}

pub async fn create_app_state(config: Config) -> anyhow::Result<Arc<AppState>> {
    let store = Store::with_pool_options(
        &config.general.database_path,
        config.general.max_db_connections,
        config.general.min_db_connections,
    )
    .await?;

    Ok(Arc::new(AppState { config, store }))
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors_origins = state.config.server.cors_allowed_origins.clone();

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    let api_router = Router::new()
        .route("/ingredients", get(ingredients::list_ingredients))
        .route("/ingredients", post(ingredients::create_ingredient))
        .route("/ingredients/{id}", get(ingredients::get_ingredient))
        .route("/ingredients/{id}", patch(ingredients::update_ingredient))
        .route("/ingredients/{id}", delete(ingredients::remove_ingredient))
        .route("/recipes", get(recipes::list_recipes))
        .route("/recipes", post(recipes::create_recipe))
        .route("/recipes/{id}", get(recipes::get_recipe))
        .route("/recipes/{id}", patch(recipes::update_recipe))
        .route("/recipes/{id}", delete(recipes::remove_recipe))
        .route("/add_product_to_recipe", get(recipes::add_product_to_recipe))
        .route("/cook_recipe", get(recipes::cook_recipe))
        .route(
            "/show_recipes_without_product",
            get(recipes::show_recipes_without_product),
        )
        .with_state(state);

    Router::new()
        .nest("/api", api_router)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}
