//! In-process stand-in for the Twitch token endpoint and Helix API.
//!
//! Available to other crates' tests through the `test-util` feature.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Form, RawQuery, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::sync::Notify;

use crate::auth::Credentials;

pub const CLIENT_ID: &str = "test-client";
pub const CLIENT_SECRET: &str = "test-secret";

#[derive(Default)]
struct FakeState {
    token_requests: AtomicUsize,
    helix_requests: AtomicUsize,
    expires_in: AtomicI64,
    reject_next: AtomicBool,
    omit_data: AtomicBool,
    null_data: AtomicBool,
    no_clips: AtomicBool,
    held_clips: Mutex<HashMap<String, Arc<Notify>>>,
    last_query: Mutex<Option<String>>,
}

#[derive(Deserialize)]
struct TokenForm {
    client_id: String,
    client_secret: String,
    grant_type: String,
}

pub struct FakeHelix {
    base: String,
    state: Arc<FakeState>,
}

impl FakeHelix {
    pub async fn start() -> Self {
        let state = Arc::new(FakeState::default());
        state.expires_in.store(3600, Ordering::SeqCst);

        let app = Router::new()
            .route("/oauth2/token", post(token))
            .route("/helix/clips", get(clips))
            .route("/helix/games", get(games))
            .route("/helix/games/top", get(top_games))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base: format!("http://{addr}"),
            state,
        }
    }

    pub fn token_url(&self) -> String {
        format!("{}/oauth2/token", self.base)
    }

    pub fn helix_base(&self) -> String {
        format!("{}/helix", self.base)
    }

    pub fn credentials(&self) -> Credentials {
        Credentials::new(CLIENT_ID, CLIENT_SECRET).with_token_url(self.token_url())
    }

    pub fn token_requests(&self) -> usize {
        self.state.token_requests.load(Ordering::SeqCst)
    }

    pub fn helix_requests(&self) -> usize {
        self.state.helix_requests.load(Ordering::SeqCst)
    }

    pub fn set_expires_in(&self, secs: i64) {
        self.state.expires_in.store(secs, Ordering::SeqCst);
    }

    /// Answer the next Helix call with 401.
    pub fn reject_next(&self) {
        self.state.reject_next.store(true, Ordering::SeqCst);
    }

    /// Answer Helix calls with `{}` instead of `{"data": [...]}`.
    pub fn omit_data(&self) {
        self.state.omit_data.store(true, Ordering::SeqCst);
    }

    /// Answer Helix calls with `{"data": null}`.
    pub fn null_data(&self) {
        self.state.null_data.store(true, Ordering::SeqCst);
    }

    /// Answer clip listings with an empty page.
    pub fn no_clips(&self) {
        self.state.no_clips.store(true, Ordering::SeqCst);
    }

    /// Hold clip listings for `broadcaster_id` until the returned handle
    /// is notified.
    pub fn hold_clips_for(&self, broadcaster_id: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.state
            .held_clips
            .lock()
            .unwrap()
            .insert(broadcaster_id.to_string(), gate.clone());
        gate
    }

    pub fn last_query(&self) -> Option<String> {
        self.state.last_query.lock().unwrap().clone()
    }
}

async fn token(
    State(state): State<Arc<FakeState>>,
    Form(form): Form<TokenForm>,
) -> (StatusCode, Json<Value>) {
    state.token_requests.fetch_add(1, Ordering::SeqCst);

    if form.client_id != CLIENT_ID
        || form.client_secret != CLIENT_SECRET
        || form.grant_type != "client_credentials"
    {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "status": 400, "message": "invalid client" })),
        );
    }

    let n = state.token_requests.load(Ordering::SeqCst);
    (
        StatusCode::OK,
        Json(json!({
            "access_token": format!("token-{n}"),
            "expires_in": state.expires_in.load(Ordering::SeqCst),
            "token_type": "bearer",
        })),
    )
}

fn check_auth(state: &FakeState, headers: &HeaderMap, query: Option<String>) -> Option<StatusCode> {
    state.helix_requests.fetch_add(1, Ordering::SeqCst);
    *state.last_query.lock().unwrap() = query;

    if state.reject_next.swap(false, Ordering::SeqCst) {
        return Some(StatusCode::UNAUTHORIZED);
    }

    let bearer_ok = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("Bearer token-"));
    let client_ok = headers
        .get("client-id")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == CLIENT_ID);

    (!bearer_ok || !client_ok).then_some(StatusCode::UNAUTHORIZED)
}

fn query_values(query: Option<&str>, key: &str) -> Vec<String> {
    query
        .map(|q| {
            url::form_urlencoded::parse(q.as_bytes())
                .filter(|(k, _)| k == key)
                .map(|(_, v)| v.into_owned())
                .collect()
        })
        .unwrap_or_default()
}

fn respond(state: &FakeState, data: Value) -> (StatusCode, Json<Value>) {
    if state.omit_data.load(Ordering::SeqCst) {
        return (StatusCode::OK, Json(json!({})));
    }
    if state.null_data.load(Ordering::SeqCst) {
        return (StatusCode::OK, Json(json!({ "data": null })));
    }
    (StatusCode::OK, Json(json!({ "data": data })))
}

fn unauthorized(status: StatusCode) -> (StatusCode, Json<Value>) {
    (
        status,
        Json(json!({ "error": "Unauthorized", "status": 401, "message": "Invalid OAuth token" })),
    )
}

async fn clips(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> (StatusCode, Json<Value>) {
    let broadcaster_id = query_values(query.as_deref(), "broadcaster_id").pop();
    if let Some(status) = check_auth(&state, &headers, query) {
        return unauthorized(status);
    }

    let gate = broadcaster_id
        .and_then(|id| state.held_clips.lock().unwrap().get(&id).cloned());
    if let Some(gate) = gate {
        gate.notified().await;
    }

    if state.no_clips.load(Ordering::SeqCst) {
        return respond(&state, json!([]));
    }
    respond(
        &state,
        json!([
            {
                "id": "AbC123",
                "url": "https://clips.twitch.tv/AbC123",
                "embed_url": "https://clips.twitch.tv/embed?clip=AbC123",
                "broadcaster_id": "1234",
                "broadcaster_name": "caster",
                "creator_id": "42",
                "creator_name": "clipper",
                "video_id": "",
                "game_id": "33214",
                "language": "en",
                "title": "nice play",
                "view_count": 10,
                "created_at": "2024-05-01T12:00:00Z",
                "thumbnail_url": "https://example.invalid/thumb.jpg",
                "duration": 28.5
            },
            {
                "id": "XyZ789",
                "embed_url": "https://clips.twitch.tv/embed?clip=XyZ789",
                "broadcaster_id": "1234",
                "creator_name": "other",
                "game_id": "509658",
                "title": "funny moment",
                "created_at": "2024-05-02T08:30:00Z"
            }
        ]),
    )
}

async fn games(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> (StatusCode, Json<Value>) {
    let ids = query_values(query.as_deref(), "id");

    if let Some(status) = check_auth(&state, &headers, query) {
        return unauthorized(status);
    }

    let games: Vec<Value> = ids
        .iter()
        .filter_map(|id| match id.as_str() {
            "33214" => Some(json!({ "id": "33214", "name": "Fortnite", "box_art_url": "" })),
            "509658" => Some(json!({ "id": "509658", "name": "Just Chatting", "box_art_url": "" })),
            _ => None,
        })
        .collect();
    respond(&state, Value::Array(games))
}

async fn top_games(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> (StatusCode, Json<Value>) {
    if let Some(status) = check_auth(&state, &headers, query) {
        return unauthorized(status);
    }
    respond(
        &state,
        json!([
            { "id": "743", "name": "Chess", "box_art_url": "", "igdb_id": "" },
            { "id": "509660", "name": "Art", "box_art_url": "", "igdb_id": "" }
        ]),
    )
}
