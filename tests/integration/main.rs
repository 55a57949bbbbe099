//! Integration tests for the habit tracker HTTP service.
//!
//! Each test binds a real listener on an ephemeral port and talks to it
//! over HTTP with reqwest.

use habit_tracker::api::{serve, AppState};
use habit_tracker::config::Config;
use habit_tracker::store::{HabitStore, IdStrategy};
use pretty_assertions::assert_eq;
use reqwest::StatusCode;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// Running server plus the means to stop it.
struct TestServer {
    base: String,
    client: reqwest::Client,
    stop: Option<oneshot::Sender<()>>,
    handle: tokio::task::JoinHandle<std::io::Result<()>>,
}

impl TestServer {
    async fn start(state: AppState) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (stop, stopped) = oneshot::channel::<()>();

        let handle = tokio::spawn(serve(listener, state, async move {
            let _ = stopped.await;
        }));

        Self {
            base: format!("http://{}", addr),
            client: reqwest::Client::new(),
            stop: Some(stop),
            handle,
        }
    }

    async fn seeded() -> Self {
        Self::start(AppState::new(HabitStore::seeded(IdStrategy::Count))).await
    }

    async fn get(&self, path: &str) -> (StatusCode, Value) {
        let response = self
            .client
            .get(format!("{}{}", self.base, path))
            .send()
            .await
            .unwrap();
        let status = response.status();
        (status, response.json().await.unwrap())
    }

    async fn post(&self, path: &str, body: Value) -> (StatusCode, Value) {
        let response = self
            .client
            .post(format!("{}{}", self.base, path))
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = response.status();
        (status, response.json().await.unwrap())
    }

    async fn delete(&self, path: &str) -> (StatusCode, Value) {
        let response = self
            .client
            .delete(format!("{}{}", self.base, path))
            .send()
            .await
            .unwrap();
        let status = response.status();
        (status, response.json().await.unwrap())
    }

    async fn shutdown(self) {
        let Self {
            client,
            stop,
            handle,
            ..
        } = self;
        drop(client);
        if let Some(stop) = stop {
            let _ = stop.send(());
        }
        handle.await.unwrap().unwrap();
    }
}

#[tokio::test]
async fn create_user_then_fetch_it() {
    let server = TestServer::seeded().await;

    let (status, body) = server.post("/users", json!({ "name": "Carol" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "user": { "id": 3, "name": "Carol" } }));

    let (status, body) = server.get("/users/3").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "id": 3, "name": "Carol" }));

    let (_, users) = server.get("/users").await;
    assert_eq!(users.as_array().unwrap().len(), 3);

    server.shutdown().await;
}

#[tokio::test]
async fn each_new_name_grows_collection_by_one() {
    let server = TestServer::seeded().await;

    for (i, name) in ["Dave", "Erin", "Frank"].iter().enumerate() {
        let (status, body) = server.post("/users", json!({ "name": name })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["name"], json!(name));
        assert_eq!(body["user"]["id"], json!(3 + i));

        let (_, users) = server.get("/users").await;
        assert_eq!(users.as_array().unwrap().len(), 3 + i);
    }

    server.shutdown().await;
}

#[tokio::test]
async fn duplicate_and_empty_names_are_rejected() {
    let server = TestServer::seeded().await;

    let (status, body) = server
        .post("/users", json!({ "name": "Alice", "habits": [] }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body, json!({ "error": "Name is already taken" }));

    let (status, body) = server.post("/users", json!({ "name": "" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Name is required" }));

    let (_, users) = server.get("/users").await;
    assert_eq!(users.as_array().unwrap().len(), 2);

    server.shutdown().await;
}

#[tokio::test]
async fn habit_create_and_delete_round() {
    let server = TestServer::seeded().await;

    let (status, body) = server
        .post("/users/1/habits", json!({ "name": "Run", "frequency": "daily" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "habit": { "id": 1, "name": "Run", "frequency": "daily" } })
    );

    let (status, body) = server.delete("/users/1/habits/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));

    let (status, body) = server.delete("/users/1/habits/1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Habit not found" }));

    server.shutdown().await;
}

#[tokio::test]
async fn omitted_frequency_defaults_to_daily() {
    let server = TestServer::seeded().await;

    let (status, body) = server.post("/users/2/habits", json!({ "name": "Read" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["habit"]["frequency"], json!("daily"));

    let (_, bob) = server.get("/users/2").await;
    assert_eq!(
        bob,
        json!({ "id": 2, "name": "Bob", "habits": [{ "id": 1, "name": "Read", "frequency": "daily" }] })
    );

    server.shutdown().await;
}

#[tokio::test]
async fn deleting_keeps_other_habit_ids() {
    let server = TestServer::seeded().await;

    for name in ["Run", "Read", "Write"] {
        server
            .post("/users/1/habits", json!({ "name": name, "frequency": "weekly" }))
            .await;
    }

    let (status, _) = server.delete("/users/1/habits/2").await;
    assert_eq!(status, StatusCode::OK);

    let (_, alice) = server.get("/users/1").await;
    let ids: Vec<u64> = alice["habits"]
        .as_array()
        .unwrap()
        .iter()
        .map(|h| h["id"].as_u64().unwrap())
        .collect();
    assert_eq!(ids, vec![1, 3]);

    server.shutdown().await;
}

#[tokio::test]
async fn delete_from_user_without_habits_answers_200_with_error() {
    let server = TestServer::seeded().await;

    let (status, body) = server.delete("/users/2/habits/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "error": "Habit not found" }));

    server.shutdown().await;
}

#[tokio::test]
async fn sequence_store_from_config_never_reuses_habit_ids() {
    let config = Config {
        id_strategy: "sequence".to_string(),
        strict_not_found: true,
        ..Config::default()
    };
    let state = AppState::new(config.build_store().unwrap())
        .with_strict_not_found(config.strict_not_found);
    let server = TestServer::start(state).await;

    server.post("/users/1/habits", json!({ "name": "Run" })).await;
    server.post("/users/1/habits", json!({ "name": "Read" })).await;
    server.delete("/users/1/habits/2").await;

    let (_, body) = server.post("/users/1/habits", json!({ "name": "Write" })).await;
    assert_eq!(body["habit"]["id"], json!(3));

    let (status, _) = server.delete("/users/2/habits/1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    server.shutdown().await;
}

#[tokio::test]
async fn ready_once_serving() {
    let server = TestServer::seeded().await;

    let (status, body) = server.get("/ready").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ready": true, "users": 2 }));

    server.shutdown().await;
}
