pub mod handlers;

use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

pub use handlers::ApiState;

pub fn router(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/status", get(handlers::handle_status))
        .route("/login", post(handlers::handle_login))
        .route("/peer/register", post(handlers::handle_peer_register))
        .route("/peers", get(handlers::handle_peers))
        .route("/channel/create", post(handlers::handle_channel_create))
        .route("/channel/join", post(handlers::handle_channel_join))
        .route(
            "/channel/{name}/members",
            get(handlers::handle_channel_members),
        )
        .route("/message", post(handlers::handle_post_message))
        .route("/sync", post(handlers::handle_sync))
        .route("/daemon/shutdown", post(handlers::handle_shutdown))
        .with_state(state);

    Router::new().nest("/api", api_routes).layer(cors)
}

/// Serve on an already-bound listener until a shutdown is broadcast.
pub async fn serve_on(listener: TcpListener, state: ApiState) -> anyhow::Result<()> {
    let mut shutdown_rx = state.shutdown_tx.subscribe();
    let app = router(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.recv().await;
        })
        .await?;
    Ok(())
}

pub async fn serve(state: ApiState, bind: &str, port: u16) -> anyhow::Result<()> {
    let listener = TcpListener::bind(format!("{}:{}", bind, port)).await?;
    tracing::info!(bind, port, "API listening");
    serve_on(listener, state).await
}
