//! In-memory users and habits HTTP service.
//!
//! Users own an ordered list of habits, each with a daily, weekly or
//! monthly cadence. Everything lives in process memory and is lost on
//! restart; two seed users, Alice and Bob, exist at start.
//!
//! ```text
//! GET    /users
//! GET    /users/:userId
//! POST   /users                          {name, habits?}
//! POST   /users/:userId/habits           {name, frequency?}
//! DELETE /users/:userId/habits/:habitId
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`store`]: User and habit types, in-memory store
//! - [`api`]: HTTP routes, handlers and OpenAPI document
//! - [`metrics`]: Prometheus counters and latency histograms
//! - [`utils`]: Utility functions

pub mod api;
pub mod config;
pub mod error;
pub mod metrics;
pub mod store;
pub mod utils;

pub use config::Config;
pub use error::{ApiError, AppError, Result};
