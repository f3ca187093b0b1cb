use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use serde_json::{Value, json};

use client::ApiClient;
use client::models::{NewDevice, UserPayload};
use client::session::{FileSessionStore, MemorySessionStore, SessionStore};
use console::controller::ViewState;
use console::gate::{AuthGate, GateState, Redirect};
use console::views::{Confirmation, DevicesView, Overview, UsersView, fetch_overview};

const ADMIN_PASSWORD: &str = "open-sesame";
const SESSION_TOKEN: &str = "tok-1";

#[derive(Clone)]
struct StubState {
    users: Arc<Mutex<Vec<Value>>>,
    device_token: Arc<Mutex<String>>,
    devices_down: Arc<Mutex<bool>>,
}

fn stub_user(id: &str, name: &str) -> Value {
    json!({
        "id": id,
        "admissionNumber": format!("ADM-{id}"),
        "name": name,
        "email": format!("{id}@example.com"),
        "phone": "555-0101",
        "rollNumber": "17",
        "className": "10",
        "section": "B",
        "batch": "2024",
        "createdAt": "2024-01-15T08:30:00Z"
    })
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {SESSION_TOKEN}"))
        .unwrap_or(false)
}

fn reject() -> (StatusCode, Json<Value>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "success": false, "message": "Unauthorized" })),
    )
}

async fn login(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body.get("password").and_then(|p| p.as_str()) == Some(ADMIN_PASSWORD) {
        (
            StatusCode::OK,
            Json(json!({ "token": SESSION_TOKEN, "success": true })),
        )
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "success": false, "message": "Invalid password" })),
        )
    }
}

async fn list_users(State(state): State<StubState>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return reject();
    }
    let users = state.users.lock().unwrap().clone();
    let total = users.len();
    (
        StatusCode::OK,
        Json(json!({
            "users": users,
            "pagination": { "page": 1, "limit": 20, "total": total, "pages": 1 }
        })),
    )
}

async fn create_user(
    State(state): State<StubState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return reject();
    }
    let mut users = state.users.lock().unwrap();
    let id = format!("u{}", users.len() + 1);
    let name = body
        .get("name")
        .and_then(|n| n.as_str())
        .unwrap_or("Unnamed");
    let user = stub_user(&id, name);
    users.push(user.clone());
    (StatusCode::CREATED, Json(user))
}

async fn delete_user(
    State(state): State<StubState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return reject();
    }
    state
        .users
        .lock()
        .unwrap()
        .retain(|u| u.get("id").and_then(|i| i.as_str()) != Some(id.as_str()));
    (StatusCode::OK, Json(json!({})))
}

async fn list_devices(
    State(state): State<StubState>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return reject();
    }
    if *state.devices_down.lock().unwrap() {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "success": false, "message": "Device registry unavailable" })),
        );
    }
    let token = state.device_token.lock().unwrap().clone();
    (
        StatusCode::OK,
        Json(json!([{
            "id": "d1",
            "deviceId": "gate-a",
            "name": "Main Gate",
            "token": token,
            "createdAt": "2024-01-15T08:30:00Z"
        }])),
    )
}

async fn regenerate_token(
    State(state): State<StubState>,
    headers: HeaderMap,
    Path(_id): Path<String>,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return reject();
    }
    let mut token = state.device_token.lock().unwrap();
    *token = format!("{}-rotated", *token);
    (
        StatusCode::OK,
        Json(json!({
            "id": "d1",
            "deviceId": "gate-a",
            "name": "Main Gate",
            "token": *token,
            "createdAt": "2024-01-15T08:30:00Z"
        })),
    )
}

async fn create_device(
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return reject();
    }
    (
        StatusCode::CREATED,
        Json(json!({
            "id": "d2",
            "deviceId": body.get("deviceId").cloned().unwrap_or(json!("gate-b")),
            "name": body.get("name").cloned().unwrap_or(json!("Back Gate")),
            "token": "fresh",
            "createdAt": "2024-01-16T09:00:00Z"
        })),
    )
}

async fn list_attendance(
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return reject();
    }
    // Day-bounded queries see today's count; unbounded ones the full log.
    let total = if query.contains_key("startDate") { 3 } else { 9 };
    (
        StatusCode::OK,
        Json(json!({
            "attendances": [],
            "pagination": { "page": 1, "limit": 1, "total": total, "pages": total }
        })),
    )
}

async fn spawn_stub() -> (SocketAddr, StubState) {
    let state = StubState {
        users: Arc::new(Mutex::new(vec![stub_user("u1", "Asha Rao")])),
        device_token: Arc::new(Mutex::new("secret".to_string())),
        devices_down: Arc::new(Mutex::new(false)),
    };

    let app = Router::new()
        .route("/auth/login", post(login))
        .route("/users", get(list_users).post(create_user))
        .route("/users/{id}", axum::routing::delete(delete_user))
        .route("/devices", get(list_devices).post(create_device))
        .route("/devices/{id}/regenerate-token", post(regenerate_token))
        .route("/attendance", get(list_attendance))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, state)
}

fn api_with(addr: SocketAddr, session: Arc<dyn SessionStore>) -> ApiClient {
    ApiClient::new(&format!("http://{addr}"), Duration::from_secs(5), session).unwrap()
}

#[tokio::test]
async fn login_flow_with_session_surviving_restart() {
    let (addr, _state) = spawn_stub().await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session");

    let session = Arc::new(FileSessionStore::new(&path).unwrap());
    let api = api_with(addr, session.clone());
    let mut gate = AuthGate::new(session.clone());
    assert_eq!(gate.resolve(), GateState::Unauthenticated);

    // Wrong password: stays on the login view, nothing stored.
    assert!(!gate.login(&api, "nope").await.unwrap());
    assert_eq!(gate.state(), GateState::Unauthenticated);
    assert!(!session.is_authenticated());

    assert!(gate.login(&api, ADMIN_PASSWORD).await.unwrap());
    assert_eq!(gate.state(), GateState::Authenticated);

    // A fresh process reads the persisted credential and resolves straight
    // to authenticated.
    let restarted = Arc::new(FileSessionStore::new(&path).unwrap());
    let mut gate = AuthGate::new(restarted);
    assert_eq!(gate.resolve(), GateState::Authenticated);
}

#[tokio::test]
async fn created_user_shows_up_without_manual_refresh() {
    let (addr, _state) = spawn_stub().await;
    let session = Arc::new(MemorySessionStore::new());
    session.set_token(SESSION_TOKEN);
    let api = api_with(addr, session);

    let mut view = UsersView::new();
    view.refresh(&api).await.unwrap();
    match view.state() {
        ViewState::Data(users) => assert_eq!(users.len(), 1),
        other => panic!("expected data, got {other:?}"),
    }

    let payload = UserPayload {
        name: Some("Bilal Khan".into()),
        ..Default::default()
    };
    view.create(&api, &payload).await.unwrap();

    // The mutation invalidated the listing; the next refresh refetches.
    view.refresh(&api).await.unwrap();
    match view.state() {
        ViewState::Data(users) => {
            assert_eq!(users.len(), 2);
            assert!(users.iter().any(|u| u.name == "Bilal Khan"));
        }
        other => panic!("expected data, got {other:?}"),
    }
}

#[tokio::test]
async fn cancelled_delete_issues_no_request() {
    let (addr, state) = spawn_stub().await;
    let session = Arc::new(MemorySessionStore::new());
    session.set_token(SESSION_TOKEN);
    let api = api_with(addr, session);

    let mut view = UsersView::new();
    let issued = view
        .delete(&api, "u1", Confirmation::Cancelled)
        .await
        .unwrap();
    assert!(!issued);
    assert_eq!(state.users.lock().unwrap().len(), 1);

    let issued = view
        .delete(&api, "u1", Confirmation::Confirmed)
        .await
        .unwrap();
    assert!(issued);
    assert!(state.users.lock().unwrap().is_empty());

    view.refresh(&api).await.unwrap();
    assert_eq!(view.state(), ViewState::Empty);
}

#[tokio::test]
async fn regenerated_token_replaces_the_displayed_value() {
    let (addr, _state) = spawn_stub().await;
    let session = Arc::new(MemorySessionStore::new());
    session.set_token(SESSION_TOKEN);
    let api = api_with(addr, session);

    let mut view = DevicesView::new();
    view.refresh(&api).await.unwrap();
    let original = match view.state() {
        ViewState::Data(devices) => devices[0].token.clone(),
        other => panic!("expected data, got {other:?}"),
    };

    let rotated = view
        .regenerate_token(&api, "d1", Confirmation::Confirmed)
        .await
        .unwrap()
        .expect("confirmed regeneration returns the device");
    assert_ne!(rotated.token, original);

    view.refresh(&api).await.unwrap();
    match view.state() {
        ViewState::Data(devices) => {
            assert_eq!(devices[0].token, rotated.token);
            assert!(devices.iter().all(|d| d.token != original));
        }
        other => panic!("expected data, got {other:?}"),
    }
}

#[tokio::test]
async fn overview_composes_the_three_listings() {
    let (addr, _state) = spawn_stub().await;
    let session = Arc::new(MemorySessionStore::new());
    session.set_token(SESSION_TOKEN);
    let api = api_with(addr, session);

    let today = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
    let overview = fetch_overview(&api, today).await.unwrap();
    assert_eq!(
        overview,
        Overview {
            total_users: 1,
            total_devices: 1,
            todays_attendance: 3,
        }
    );
}

#[tokio::test]
async fn device_mutation_clears_a_stale_fetch_error() {
    let (addr, state) = spawn_stub().await;
    let session = Arc::new(MemorySessionStore::new());
    session.set_token(SESSION_TOKEN);
    let api = api_with(addr, session);

    *state.devices_down.lock().unwrap() = true;
    let mut view = DevicesView::new();
    view.refresh(&api).await.unwrap();
    match view.state() {
        ViewState::Error(message) => assert!(message.contains("Device registry unavailable")),
        other => panic!("expected error, got {other:?}"),
    }

    // Recovery alone does not clear the displayed error.
    *state.devices_down.lock().unwrap() = false;
    view.refresh(&api).await.unwrap();
    assert!(matches!(view.state(), ViewState::Error(_)));

    // A successful mutation does: the next refresh refetches.
    view.create(
        &api,
        &NewDevice {
            device_id: "gate-b".into(),
            name: "Back Gate".into(),
        },
    )
    .await
    .unwrap();
    view.refresh(&api).await.unwrap();
    assert!(matches!(view.state(), ViewState::Data(_)));
}

#[tokio::test]
async fn auth_failure_during_device_fetch_leaves_no_loading_state() {
    let (addr, _state) = spawn_stub().await;
    let session = Arc::new(MemorySessionStore::new());
    session.set_token("stale-or-revoked");
    let api = api_with(addr, session);

    let mut view = DevicesView::new();
    let err = view.refresh(&api).await.unwrap_err();
    assert!(err.is_auth_failure());
    assert!(!view.is_loading());
}

#[tokio::test]
async fn rejected_session_is_cleared_and_redirected() {
    let (addr, _state) = spawn_stub().await;
    let session = Arc::new(MemorySessionStore::new());
    session.set_token("stale-or-revoked");
    let api = api_with(addr, session.clone());

    let mut gate = AuthGate::new(session.clone());
    assert_eq!(gate.resolve(), GateState::Authenticated);

    let mut view = UsersView::new();
    let err = view.refresh(&api).await.unwrap_err();
    assert!(err.is_auth_failure());

    assert_eq!(gate.on_auth_failure(&err), Some(Redirect::Login));
    assert_eq!(gate.state(), GateState::Unauthenticated);
    assert!(!session.is_authenticated());
}
