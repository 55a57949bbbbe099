//! HTTP API handlers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::instrument;
use utoipa::ToSchema;

use crate::error::{ApiError, ErrorBody};
use crate::metrics;
use crate::store::{Habit, HabitStore, NewHabit, NewUser, User};
use crate::utils::parse_id;

/// Application state shared with handlers.
#[derive(Clone)]
pub struct AppState {
    /// Users and habits.
    pub store: Arc<RwLock<HabitStore>>,
    /// Answer 404 when deleting from a user without a habits list.
    pub strict_not_found: bool,
    /// Whether the listener is accepting connections.
    pub ready: Arc<AtomicBool>,
    /// Prometheus handle for `/metrics`, if a recorder is installed.
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create new app state around a store.
    pub fn new(store: HabitStore) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
            strict_not_found: false,
            ready: Arc::new(AtomicBool::new(false)),
            metrics: None,
        }
    }

    /// Enable strict not-found handling on habit deletion.
    pub fn with_strict_not_found(mut self, strict: bool) -> Self {
        self.strict_not_found = strict;
        self
    }

    /// Attach a Prometheus handle.
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// Set ready state.
    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    /// Check if ready.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(HabitStore::default())
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Status: "ok".
    pub status: &'static str,
}

/// Readiness check response.
#[derive(Debug, Serialize)]
pub struct ReadyResponse {
    /// Whether service is ready.
    pub ready: bool,
    /// Number of users in the store.
    pub users: usize,
}

/// Response of `POST /users`.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserEnvelope {
    /// The stored user.
    pub user: User,
}

/// Response of `POST /users/{user_id}/habits`.
#[derive(Debug, Serialize, ToSchema)]
pub struct HabitEnvelope {
    /// The stored habit.
    pub habit: Habit,
}

/// Response of a successful habit deletion.
#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteResponse {
    /// Always true.
    pub success: bool,
}

/// Health check handler - always returns 200.
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}

/// Readiness check handler - returns 200 if ready, 503 otherwise.
pub async fn ready(State(state): State<AppState>) -> impl IntoResponse {
    let is_ready = state.is_ready();
    let users = state.store.read().await.len();

    let response = ReadyResponse {
        ready: is_ready,
        users,
    };

    if is_ready {
        (StatusCode::OK, Json(response))
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(response))
    }
}

/// Prometheus exposition handler.
pub async fn metrics_text(State(state): State<AppState>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            "metrics recorder not installed".to_string(),
        ),
    }
}

/// List every user.
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    responses((status = 200, description = "All users in insertion order", body = [User]))
)]
pub async fn list_users(State(state): State<AppState>) -> Json<Vec<User>> {
    let _timer = metrics::timer_endpoint("list_users");
    let store = state.store.read().await;
    Json(store.users().to_vec())
}

/// Fetch one user by id.
#[utoipa::path(
    get,
    path = "/users/{user_id}",
    tag = "users",
    params(("user_id" = String, Path, description = "Numeric user id")),
    responses(
        (status = 200, description = "The user", body = User),
        (status = 404, description = "No such user", body = ErrorBody)
    )
)]
#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<User>, ApiError> {
    let _timer = metrics::timer_endpoint("get_user");
    let id = parse_id(&user_id).ok_or(ApiError::UserNotFound)?;
    let store = state.store.read().await;
    Ok(Json(store.user(id)?.clone()))
}

/// Create a user.
#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    request_body = NewUser,
    responses(
        (status = 200, description = "User created", body = UserEnvelope),
        (status = 400, description = "Name missing or body malformed", body = ErrorBody),
        (status = 409, description = "Name already taken", body = ErrorBody)
    )
)]
#[instrument(skip_all)]
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<NewUser>, JsonRejection>,
) -> Result<Json<UserEnvelope>, ApiError> {
    let _timer = metrics::timer_endpoint("create_user");
    let Json(new) = payload.map_err(|e| ApiError::MalformedBody(e.body_text()))?;

    let user = state.store.write().await.create_user(new)?;
    metrics::inc_users_created();
    Ok(Json(UserEnvelope { user }))
}

/// Add a habit to a user.
#[utoipa::path(
    post,
    path = "/users/{user_id}/habits",
    tag = "habits",
    params(("user_id" = String, Path, description = "Numeric user id")),
    request_body = NewHabit,
    responses(
        (status = 200, description = "Habit created", body = HabitEnvelope),
        (status = 400, description = "Name or frequency invalid", body = ErrorBody),
        (status = 404, description = "No such user", body = ErrorBody)
    )
)]
#[instrument(skip(state, payload))]
pub async fn create_habit(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    payload: Result<Json<NewHabit>, JsonRejection>,
) -> Result<Json<HabitEnvelope>, ApiError> {
    let _timer = metrics::timer_endpoint("create_habit");
    let id = parse_id(&user_id).ok_or(ApiError::UserNotFound)?;
    let mut store = state.store.write().await;
    store.user(id)?;

    let Json(new) = payload.map_err(|e| ApiError::MalformedBody(e.body_text()))?;
    let habit = store.add_habit(id, new)?;
    metrics::inc_habits_created();
    Ok(Json(HabitEnvelope { habit }))
}

/// Delete a habit.
#[utoipa::path(
    delete,
    path = "/users/{user_id}/habits/{habit_id}",
    tag = "habits",
    params(
        ("user_id" = String, Path, description = "Numeric user id"),
        ("habit_id" = String, Path, description = "Numeric habit id")
    ),
    responses(
        (status = 200, description = "Habit deleted, or the user has no habits list", body = DeleteResponse),
        (status = 404, description = "No such user or habit", body = ErrorBody)
    )
)]
#[instrument(skip(state))]
pub async fn delete_habit(
    State(state): State<AppState>,
    Path((user_id, habit_id)): Path<(String, String)>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let _timer = metrics::timer_endpoint("delete_habit");
    let user_id = parse_id(&user_id).ok_or(ApiError::UserNotFound)?;
    let mut store = state.store.write().await;
    store.user(user_id)?;

    let result = match parse_id(&habit_id) {
        Some(habit_id) => store.delete_habit(user_id, habit_id),
        None if store.user(user_id)?.habits.is_some() => Err(ApiError::HabitNotFound),
        None => Err(ApiError::MissingHabitList),
    };

    match result {
        Ok(_) => {
            metrics::inc_habits_deleted();
            Ok(Json(DeleteResponse { success: true }))
        }
        Err(e) if state.strict_not_found => Err(e.strict()),
        Err(e) => Err(e),
    }
}
