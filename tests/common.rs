//! Mock backend for integration tests.
//!
//! Serves the REST surface promodesk talks to on an ephemeral port and
//! records every request it receives so tests can assert on the exact wire
//! shape: method, decoded path, bearer header, multipart fields and JSON
//! bodies.

#![allow(dead_code)]

use axum::{
    Json, Router,
    extract::{Multipart, Path, State},
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::net::TcpListener;

/// Token the mock accepts on mutating routes.
pub const TOKEN: &str = "secret-token";

/// One request as seen by the mock.
#[derive(Debug, Clone, Default)]
pub struct Recorded {
    pub method: String,
    /// Raw request path, still percent-encoded.
    pub raw_path: String,
    /// Record id after percent-decoding, for `/api/images/{id}` routes.
    pub id: Option<String>,
    pub authorization: Option<String>,
    pub text_fields: Vec<(String, String)>,
    pub file: Option<UploadedFile>,
    pub json: Option<Value>,
}

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub field: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub len: usize,
}

#[derive(Default)]
struct MockState {
    requests: Mutex<Vec<Recorded>>,
    images: Mutex<Vec<Value>>,
    banner: Mutex<Option<Value>>,
    settings: Mutex<Option<Value>>,
    fail_next: Mutex<Option<(StatusCode, Value)>>,
    next_id: Mutex<u32>,
}

/// Handle to a running mock backend.
pub struct MockBackend {
    pub url: String,
    state: Arc<MockState>,
    _server: tokio::task::JoinHandle<()>,
}

impl MockBackend {
    /// Bind to an ephemeral port and start serving.
    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());
        let app = Router::new()
            .route("/api/images", get(list_images))
            .route("/api/images/upload", post(upload_image))
            .route("/api/images/{id}", delete(delete_image))
            .route("/api/images/{id}/update-date", put(update_date))
            .route("/api/images/{id}/replace", put(replace_image))
            .route("/api/banner", get(get_banner).put(update_banner))
            .route("/api/banner/upload", post(upload_banner_image))
            .route("/api/settings", get(get_settings))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock backend");
        let addr = listener.local_addr().expect("No local addr");
        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Mock backend crashed");
        });

        Self {
            url: format!("http://{addr}"),
            state,
            _server: server,
        }
    }

    /// Seed one stored image.
    pub fn add_image(&self, id: &str, date: &str) {
        self.state.images.lock().push(image_json(id, date));
    }

    pub fn set_banner(&self, banner: Value) {
        *self.state.banner.lock() = Some(banner);
    }

    pub fn set_settings(&self, settings: Value) {
        *self.state.settings.lock() = Some(settings);
    }

    /// Answer the next request with `status` and `body`, whatever it is.
    pub fn fail_next(&self, status: u16, body: Value) {
        let status = StatusCode::from_u16(status).expect("Invalid status");
        *self.state.fail_next.lock() = Some((status, body));
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.requests.lock().clone()
    }

    /// Requests other than `GET`s.
    pub fn mutations(&self) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.method != "GET")
            .collect()
    }

    pub fn stored_dates(&self) -> Vec<(String, String)> {
        self.state
            .images
            .lock()
            .iter()
            .map(|img| {
                (
                    img["id"].as_str().unwrap_or_default().to_string(),
                    img["date"].as_str().unwrap_or_default().to_string(),
                )
            })
            .collect()
    }
}

fn image_json(id: &str, date: &str) -> Value {
    json!({
        "id": id,
        "imageUrl": format!("https://cdn.example.com/{id}.webp"),
        "date": date,
        "createdAt": "2024-01-01T08:00:00Z",
    })
}

fn message(status: StatusCode, text: &str) -> Response {
    (status, Json(json!({ "message": text }))).into_response()
}

impl MockState {
    fn record(&self, recorded: Recorded) -> Option<Response> {
        self.requests.lock().push(recorded);
        self.fail_next
            .lock()
            .take()
            .map(|(status, body)| (status, Json(body)).into_response())
    }

    fn authorized(headers: &HeaderMap) -> bool {
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v == format!("Bearer {TOKEN}"))
    }
}

fn base(method: Method, uri: &Uri, headers: &HeaderMap, id: Option<String>) -> Recorded {
    Recorded {
        method: method.to_string(),
        raw_path: uri.path().to_string(),
        id,
        authorization: headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        ..Recorded::default()
    }
}

async fn read_multipart(mut multipart: Multipart, recorded: &mut Recorded) {
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.unwrap_or_default();

        if file_name.is_some() {
            recorded.file = Some(UploadedFile {
                field: name,
                file_name,
                content_type,
                len: bytes.len(),
            });
        } else {
            recorded
                .text_fields
                .push((name, String::from_utf8_lossy(&bytes).into_owned()));
        }
    }
}

fn text_field<'a>(recorded: &'a Recorded, name: &str) -> Option<&'a str> {
    recorded
        .text_fields
        .iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.as_str())
}

async fn list_images(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    if let Some(injected) = state.record(base(method, &uri, &headers, None)) {
        return injected;
    }
    Json(Value::Array(state.images.lock().clone())).into_response()
}

async fn upload_image(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    multipart: Multipart,
) -> Response {
    let mut recorded = base(method, &uri, &headers, None);
    read_multipart(multipart, &mut recorded).await;
    let date = text_field(&recorded, "date").map(str::to_string);
    let has_file = recorded.file.is_some();

    if let Some(injected) = state.record(recorded) {
        return injected;
    }
    if !MockState::authorized(&headers) {
        return message(StatusCode::UNAUTHORIZED, "Invalid token");
    }
    let (Some(date), true) = (date, has_file) else {
        return message(StatusCode::BAD_REQUEST, "Image and date are required");
    };

    let id = {
        let mut next = state.next_id.lock();
        *next += 1;
        format!("new-{next}")
    };
    state.images.lock().push(image_json(&id, &date));
    (StatusCode::CREATED, Json(json!({ "id": id }))).into_response()
}

async fn delete_image(
    State(state): State<Arc<MockState>>,
    Path(id): Path<String>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    if let Some(injected) = state.record(base(method, &uri, &headers, Some(id.clone()))) {
        return injected;
    }
    if !MockState::authorized(&headers) {
        return message(StatusCode::UNAUTHORIZED, "Invalid token");
    }

    let mut images = state.images.lock();
    let before = images.len();
    images.retain(|img| img["id"] != id.as_str());
    if images.len() == before {
        return message(StatusCode::NOT_FOUND, "Image not found");
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn update_date(
    State(state): State<Arc<MockState>>,
    Path(id): Path<String>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut recorded = base(method, &uri, &headers, Some(id.clone()));
    recorded.json = Some(body.clone());
    if let Some(injected) = state.record(recorded) {
        return injected;
    }
    if !MockState::authorized(&headers) {
        return message(StatusCode::UNAUTHORIZED, "Invalid token");
    }

    let mut images = state.images.lock();
    match images.iter_mut().find(|img| img["id"] == id.as_str()) {
        Some(img) => {
            img["date"] = body["date"].clone();
            StatusCode::OK.into_response()
        },
        None => message(StatusCode::NOT_FOUND, "Image not found"),
    }
}

async fn replace_image(
    State(state): State<Arc<MockState>>,
    Path(id): Path<String>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    multipart: Multipart,
) -> Response {
    let mut recorded = base(method, &uri, &headers, Some(id.clone()));
    read_multipart(multipart, &mut recorded).await;
    let date = text_field(&recorded, "date").map(str::to_string);

    if let Some(injected) = state.record(recorded) {
        return injected;
    }
    if !MockState::authorized(&headers) {
        return message(StatusCode::UNAUTHORIZED, "Invalid token");
    }

    let mut images = state.images.lock();
    match images.iter_mut().find(|img| img["id"] == id.as_str()) {
        Some(img) => {
            if let Some(date) = date {
                img["date"] = Value::String(date);
            }
            img["imageUrl"] = Value::String(format!("https://cdn.example.com/{id}-v2.webp"));
            StatusCode::OK.into_response()
        },
        None => message(StatusCode::NOT_FOUND, "Image not found"),
    }
}

async fn get_banner(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    if let Some(injected) = state.record(base(method, &uri, &headers, None)) {
        return injected;
    }
    match state.banner.lock().clone() {
        Some(banner) => Json(banner).into_response(),
        None => message(StatusCode::NOT_FOUND, "No banner"),
    }
}

async fn update_banner(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut recorded = base(method, &uri, &headers, None);
    recorded.json = Some(body.clone());
    if let Some(injected) = state.record(recorded) {
        return injected;
    }
    if !MockState::authorized(&headers) {
        return message(StatusCode::UNAUTHORIZED, "Invalid token");
    }
    *state.banner.lock() = Some(body);
    StatusCode::OK.into_response()
}

async fn upload_banner_image(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    multipart: Multipart,
) -> Response {
    let mut recorded = base(method, &uri, &headers, None);
    read_multipart(multipart, &mut recorded).await;
    let file_name = recorded
        .file
        .as_ref()
        .and_then(|f| f.file_name.clone())
        .unwrap_or_default();

    if let Some(injected) = state.record(recorded) {
        return injected;
    }
    if !MockState::authorized(&headers) {
        return message(StatusCode::UNAUTHORIZED, "Invalid token");
    }
    Json(json!({ "imageUrl": format!("https://cdn.example.com/banner/{file_name}") }))
        .into_response()
}

async fn get_settings(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    if let Some(injected) = state.record(base(method, &uri, &headers, None)) {
        return injected;
    }
    match state.settings.lock().clone() {
        Some(settings) => Json(settings).into_response(),
        None => message(StatusCode::INTERNAL_SERVER_ERROR, "Settings unavailable"),
    }
}
