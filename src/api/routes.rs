//! HTTP API route definitions.

use std::future::Future;

use axum::{
    routing::{delete, get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::error::AppError;

use super::docs::ApiDoc;
use super::handlers::{
    create_habit, create_user, delete_habit, get_user, health, list_users, metrics_text, ready,
    AppState,
};

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health endpoints
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/metrics", get(metrics_text))
        // Users and habits
        .route("/users", get(list_users).post(create_user))
        .route("/users/:user_id", get(get_user))
        .route("/users/:user_id/habits", post(create_habit))
        .route("/users/:user_id/habits/:habit_id", delete(delete_habit))
        // Docs
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind the HTTP listener.
pub async fn bind(host: &str, port: u16) -> Result<TcpListener, AppError> {
    let listener = TcpListener::bind((host, port)).await?;
    Ok(listener)
}

/// Serve the API on an already bound listener until `shutdown` resolves.
///
/// Marks the state ready once serving starts.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    let router = create_router(state.clone());

    state.set_ready(true);
    info!("Server listening at http://{}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
}
