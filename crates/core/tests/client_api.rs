//! Integration tests against an in-memory HTTP server.
//!
//! A small axum app emulates the server's envelope semantics: token
//! issue and validation, request state transitions, and the user store.
//! The tests drive the real reqwest transport over loopback.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use nlq::{AskOptions, CheckFilter, ClientBuilder, Error, NewUser, UserSelector};
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

#[derive(Default)]
struct ServerState {
    next_token: u32,
    valid_tokens: HashSet<String>,
    signin_count: u32,
    signout_count: u32,
    /// srvReqId -> number of in-flight polls left before the record
    /// turns terminal.
    requests: HashMap<String, u32>,
    next_req: u32,
    users: HashMap<i64, Value>,
    next_user: i64,
}

type Shared = Arc<Mutex<ServerState>>;

fn api_err(status: StatusCode, code: &str, msg: &str) -> Response {
    (status, Json(json!({"code": code, "msg": msg}))).into_response()
}

fn check_token(state: &Shared, body: &Value) -> Option<Response> {
    let token = body["acsTok"].as_str().unwrap_or_default();
    if state.lock().valid_tokens.contains(token) {
        None
    } else {
        Some(api_err(
            StatusCode::UNAUTHORIZED,
            "NC_INVALID_ACCESS_TOKEN",
            "Invalid access token.",
        ))
    }
}

async fn signin(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    if body["email"] != "admin@admin.com" || body["passwd"] != "admin" {
        return api_err(StatusCode::UNAUTHORIZED, "NC_SIGNIN_FAILURE", "Bad credentials.");
    }
    let mut s = state.lock();
    s.next_token += 1;
    s.signin_count += 1;
    let token = format!("T{}", s.next_token);
    s.valid_tokens.insert(token.clone());
    Json(json!({"status": "API_OK", "acsTok": token})).into_response()
}

async fn signout(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    if let Some(rejected) = check_token(&state, &body) {
        return rejected;
    }
    let mut s = state.lock();
    let token = body["acsTok"].as_str().unwrap_or_default().to_string();
    s.valid_tokens.remove(&token);
    s.signout_count += 1;
    Json(json!({"status": "API_OK"})).into_response()
}

async fn ask(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    if let Some(rejected) = check_token(&state, &body) {
        return rejected;
    }
    let mut s = state.lock();
    s.next_req += 1;
    let id = format!("r{}", s.next_req);
    // Terminal after two in-flight polls.
    s.requests.insert(id.clone(), 2);
    Json(json!({"status": "API_OK", "srvReqId": id})).into_response()
}

async fn check(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    if let Some(rejected) = check_token(&state, &body) {
        return rejected;
    }
    let mut s = state.lock();
    let wanted: Option<Vec<String>> = body["srvReqIds"]
        .as_array()
        .map(|a| a.iter().filter_map(|v| v.as_str().map(String::from)).collect());

    let mut states = Vec::new();
    let ids: Vec<String> = s.requests.keys().cloned().collect();
    for id in ids {
        if let Some(w) = &wanted {
            if !w.contains(&id) {
                continue;
            }
        }
        let polls_left = s.requests.get_mut(&id).unwrap();
        let ready = *polls_left == 0;
        if !ready {
            *polls_left -= 1;
        }
        states.push(json!({
            "srvReqId": id,
            "txt": "ping",
            "usrId": 1,
            "mdlId": "test.model",
            "status": if ready { "QRY_READY" } else { "QRY_ENLISTED" },
            "resBody": if ready { json!("OK") } else { Value::Null },
        }));
    }
    Json(json!({"status": "API_OK", "states": states})).into_response()
}

async fn cancel(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    if let Some(rejected) = check_token(&state, &body) {
        return rejected;
    }
    state.lock().requests.clear();
    Json(json!({"status": "API_OK"})).into_response()
}

async fn user_add(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    if let Some(rejected) = check_token(&state, &body) {
        return rejected;
    }
    let mut s = state.lock();
    s.next_user += 1;
    let id = s.next_user;
    s.users.insert(
        id,
        json!({
            "id": id,
            "email": body["email"],
            "firstName": body["firstName"],
            "lastName": body["lastName"],
            "isAdmin": body["isAdmin"],
        }),
    );
    Json(json!({"status": "API_OK", "id": id})).into_response()
}

async fn user_get(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    if let Some(rejected) = check_token(&state, &body) {
        return rejected;
    }
    let s = state.lock();
    match body["id"].as_i64().and_then(|id| s.users.get(&id)) {
        Some(user) => {
            let mut reply = user.clone();
            reply["status"] = json!("API_OK");
            Json(reply).into_response()
        }
        None => api_err(StatusCode::NOT_FOUND, "NC_INVALID_FIELD", "Unknown user."),
    }
}

async fn spawn_server() -> (Shared, String) {
    let state: Shared = Arc::new(Mutex::new(ServerState::default()));
    let app = Router::new()
        .route("/api/v1/signin", post(signin))
        .route("/api/v1/signout", post(signout))
        .route("/api/v1/ask", post(ask))
        .route("/api/v1/check", post(check))
        .route("/api/v1/cancel", post(cancel))
        .route("/api/v1/user/add", post(user_add))
        .route("/api/v1/user/get", post(user_get))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (state, format!("http://{addr}/api/v1/"))
}

#[tokio::test]
async fn lifecycle_ask_sync_and_close() {
    let (state, base_url) = spawn_server().await;

    let client = ClientBuilder::new()
        .base_url(&base_url)
        .request_timeout(Duration::from_secs(10))
        .connect()
        .await
        .unwrap();

    // Two in-flight polls, then terminal.
    let result = client
        .ask_sync("test.model", "ping", &AskOptions::default())
        .await
        .unwrap();
    assert_eq!(result.res_body.as_deref(), Some("OK"));
    assert_eq!(result.status, "QRY_READY");

    client.close().await.unwrap();
    assert_eq!(state.lock().signout_count, 1);
    // cancel-on-exit cleared the request book.
    assert!(state.lock().requests.is_empty());

    let err = client
        .ask("test.model", "again", &AskOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotInitialized));
}

#[tokio::test]
async fn expired_token_is_renewed_transparently() {
    let (state, base_url) = spawn_server().await;

    let client = ClientBuilder::new()
        .base_url(&base_url)
        .cancel_on_exit(false)
        .connect()
        .await
        .unwrap();
    assert_eq!(state.lock().signin_count, 1);

    // Simulate server-side token expiry.
    state.lock().valid_tokens.clear();

    let id = client
        .ask("test.model", "ping", &AskOptions::default())
        .await
        .unwrap();
    assert_eq!(id, "r1");
    // Exactly one extra sign-in for the renewal.
    assert_eq!(state.lock().signin_count, 2);

    // The renewed token keeps working without further sign-ins.
    client.check(&CheckFilter::default()).await.unwrap();
    assert_eq!(state.lock().signin_count, 2);

    client.close().await.unwrap();
}

#[tokio::test]
async fn user_round_trip() {
    let (_state, base_url) = spawn_server().await;

    let client = ClientBuilder::new()
        .base_url(&base_url)
        .cancel_on_exit(false)
        .connect()
        .await
        .unwrap();

    let id = client
        .add_user(&NewUser {
            email: "dev@corp.io".into(),
            passwd: "secret".into(),
            first_name: "Dee".into(),
            last_name: "Vee".into(),
            avatar_url: None,
            is_admin: true,
            properties: None,
            ext_id: None,
        })
        .await
        .unwrap();

    let user = client
        .get_user(&UserSelector {
            id: Some(id),
            ext_id: None,
        })
        .await
        .unwrap();
    assert_eq!(user.email, "dev@corp.io");
    assert!(user.is_admin);

    let err = client
        .get_user(&UserSelector {
            id: Some(9999),
            ext_id: None,
        })
        .await
        .unwrap_err();
    assert_eq!(err.remote_code(), Some("NC_INVALID_FIELD"));

    client.close().await.unwrap();
}

#[tokio::test]
async fn concurrent_clients_are_independent() {
    let (_state, base_url) = spawn_server().await;

    let mut handles = Vec::new();
    for _ in 0..4 {
        let base_url = base_url.clone();
        handles.push(tokio::spawn(async move {
            let client = ClientBuilder::new()
                .base_url(&base_url)
                .cancel_on_exit(false)
                .request_timeout(Duration::from_secs(10))
                .connect()
                .await?;
            let state = client
                .ask_sync("test.model", "ping", &AskOptions::default())
                .await?;
            client.close().await?;
            Ok::<_, anyhow::Error>(state)
        }));
    }

    let mut ids = HashSet::new();
    for handle in handles {
        let state = handle.await.unwrap().unwrap();
        assert_eq!(state.res_body.as_deref(), Some("OK"));
        ids.insert(state.srv_req_id);
    }
    assert_eq!(ids.len(), 4, "each client saw its own request");
}
