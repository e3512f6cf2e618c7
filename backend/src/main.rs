use std::net::SocketAddr;

use axum::http::Method;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, Level};

mod config;
mod db;
mod domain;
mod error;
mod rpc;
mod storage;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    let settings = config::Settings::from_env();

    info!("Setting up database");
    let db = db::DbConnection::new(&settings.database_url).await?;

    // Set up our application state
    let state = rpc::AppState::new(db);

    // CORS setup to allow any frontend origin to make requests
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    let app = rpc::router(state).layer(cors);

    // Start the server
    let addr = SocketAddr::from(([127, 0, 0, 1], settings.port));
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
