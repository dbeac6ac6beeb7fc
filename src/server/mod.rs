use std::sync::Arc;

use axum::Router;
use tokio::sync::RwLock;
use tower_http::{
    cors::{
        Any,
        CorsLayer,
    },
    trace::TraceLayer,
};

use crate::core::Settings;

pub mod routes;

/// Shared handler state. Settings are the only mutable piece; the settings
/// endpoint is their only writer.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<RwLock<Settings>>,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        Self { settings: Arc::new(RwLock::new(settings)) }
    }
}

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        .merge(routes::health::routes())
        .merge(routes::decks::routes())
        .merge(routes::models::routes())
        .merge(routes::instructions::routes())
        .merge(routes::notes::routes())
        .merge(routes::settings::routes())
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
