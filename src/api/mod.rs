//! HTTP API: user and habit routes plus health, metrics and docs endpoints.

pub mod docs;
pub mod handlers;
pub mod routes;

pub use handlers::AppState;
pub use routes::{bind, create_router, serve};
