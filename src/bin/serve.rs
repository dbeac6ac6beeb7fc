use std::env;

use ankiforge::{
    core::Settings,
    server::{
        self,
        AppState,
    },
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ankiforge=info,tower_http=info".into()),
        )
        .init();

    let settings = Settings::from_env();
    let state = AppState::new(settings);
    let app = server::app(state);

    let port: u16 = env::var("PORT").ok().and_then(|p| p.parse().ok()).unwrap_or(5000);
    let addr = format!("0.0.0.0:{}", port);
    tracing::info!("Starting ankiforge web API on {}", addr);

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
