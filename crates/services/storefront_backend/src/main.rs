// File: services/storefront_backend/src/main.rs
use std::sync::Arc;
use storefront_backend::{build_router, AppState};
use storefront_common::logging;
use storefront_config::{ensure_dotenv_loaded, load_config};
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() {
    // .env first so RUST_LOG from it reaches the subscriber
    ensure_dotenv_loaded();
    logging::init();

    if let Err(e) = run().await {
        logging::log_error(e, "❌ Storefront backend stopped");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Arc::new(load_config()?);
    let state = AppState::new(config.clone());
    let app = build_router(&state);

    // Bind and serve
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Servidor backend corriendo en http://{}", addr);

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
