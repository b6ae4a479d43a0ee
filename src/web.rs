use std::sync::Arc;

use axum::{Router, routing::get};
use tower_http::cors::{Any, CorsLayer};

use crate::api::{self, AppState};
use crate::config::ServerConfig;

/// Bind the HTTP listener and serve the API until the process is stopped.
///
/// All JSON endpoints live under `/api`; `/health` sits at the root so load
/// balancers can probe it without the prefix.
pub async fn run(config: &ServerConfig, state: Arc<AppState>) -> crate::Result<()> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(api::health))
        .nest("/api", api::router(state))
        .layer(cors);

    let addr = format!("{}:{}", config.bind_address, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("API server listening on http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
