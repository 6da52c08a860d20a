//! Integration tests for the REST client against a mock backend.
//!
//! Covers the wire contract of every endpoint:
//! - bearer header on mutating calls, none on public reads
//! - percent-encoded record ids
//! - multipart `image` + `date` fields
//! - JSON `{ "date": .. }` body for date-only updates
//! - `message` parsing on upload failures, fallbacks elsewhere

#[path = "common.rs"]
mod common;

use chrono::NaiveDate;
use common::{MockBackend, TOKEN};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

use promodesk::Error;
use promodesk::api::{BannerData, HttpApi, ImagePayload, SiteApi};
use promodesk::config::ApiConfig;
use promodesk::credentials::Credential;
use promodesk::gallery::GalleryManager;

fn api(backend: &MockBackend) -> HttpApi {
    HttpApi::new(&ApiConfig {
        url: backend.url.clone(),
        ..ApiConfig::default()
    })
    .expect("Failed to build client")
}

fn credential() -> Credential {
    Credential::new(TOKEN).unwrap()
}

fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

fn png() -> ImagePayload {
    ImagePayload::new("photo.png", vec![0x89, b'P', b'N', b'G'])
}

// =============================================================================
// Images
// =============================================================================

#[tokio::test]
async fn test_list_images_in_backend_order() {
    let backend = MockBackend::start().await;
    backend.add_image("b", "2024-02-01");
    backend.add_image("a", "2024-01-01");

    let images = api(&backend).list_images().await.unwrap();
    let ids: Vec<_> = images.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, ["b", "a"]);
    assert_eq!(images[0].date, date("2024-02-01"));
    assert_eq!(images[0].image_url, "https://cdn.example.com/b.webp");

    let requests = backend.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].authorization.is_none());
}

#[tokio::test]
async fn test_list_failure_uses_fallback_message() {
    let backend = MockBackend::start().await;
    backend.fail_next(500, json!({ "message": "db down" }));

    let err = api(&backend).list_images().await.unwrap_err();
    match err {
        Error::Http { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "Failed to fetch images");
        },
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_upload_sends_bearer_and_multipart_fields() {
    let backend = MockBackend::start().await;

    api(&backend)
        .upload_image(&credential(), &png(), date("2024-03-05"))
        .await
        .unwrap();

    let requests = backend.mutations();
    assert_eq!(requests.len(), 1);
    let upload = &requests[0];
    assert_eq!(upload.method, "POST");
    assert_eq!(upload.raw_path, "/api/images/upload");
    assert_eq!(upload.authorization.as_deref(), Some("Bearer secret-token"));
    assert_eq!(
        upload.text_fields,
        vec![("date".to_string(), "2024-03-05".to_string())]
    );

    let file = upload.file.as_ref().expect("no file part");
    assert_eq!(file.field, "image");
    assert_eq!(file.file_name.as_deref(), Some("photo.png"));
    assert_eq!(file.content_type.as_deref(), Some("image/png"));
    assert_eq!(file.len, 4);
}

#[tokio::test]
async fn test_upload_error_message_from_body() {
    let backend = MockBackend::start().await;
    backend.fail_next(413, json!({ "message": "File too large" }));

    let err = api(&backend)
        .upload_image(&credential(), &png(), date("2024-03-05"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "File too large (HTTP 413)");
}

#[tokio::test]
async fn test_upload_error_without_message_uses_fallback() {
    let backend = MockBackend::start().await;
    backend.fail_next(500, json!({ "error": "boom" }));

    let err = api(&backend)
        .upload_image(&credential(), &png(), date("2024-03-05"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Upload failed (HTTP 500)");
}

#[tokio::test]
async fn test_wrong_token_is_auth_failure() {
    let backend = MockBackend::start().await;
    backend.add_image("a", "2024-01-01");

    let wrong = Credential::new("nope").unwrap();
    let err = api(&backend).delete_image(&wrong, "a").await.unwrap_err();
    assert!(err.is_auth_failure(), "got {err:?}");
    assert_eq!(backend.stored_dates().len(), 1);
}

#[tokio::test]
async fn test_record_id_is_percent_encoded() {
    let backend = MockBackend::start().await;
    backend.add_image("a/b c", "2024-01-01");

    api(&backend)
        .update_image_date(&credential(), "a/b c", date("2024-06-01"))
        .await
        .unwrap();

    let request = &backend.mutations()[0];
    assert_eq!(request.raw_path, "/api/images/a%2Fb%20c/update-date");
    assert_eq!(request.id.as_deref(), Some("a/b c"));
}

#[tokio::test]
async fn test_update_date_sends_json_body() {
    let backend = MockBackend::start().await;
    backend.add_image("a", "2024-01-01");

    api(&backend)
        .update_image_date(&credential(), "a", date("2024-02-02"))
        .await
        .unwrap();

    let request = &backend.mutations()[0];
    assert_eq!(request.method, "PUT");
    assert_eq!(request.json, Some(json!({ "date": "2024-02-02" })));
    assert!(request.file.is_none());
    assert_eq!(
        backend.stored_dates(),
        vec![("a".to_string(), "2024-02-02".to_string())]
    );
}

#[tokio::test]
async fn test_replace_sends_image_and_date() {
    let backend = MockBackend::start().await;
    backend.add_image("a", "2024-01-01");

    api(&backend)
        .replace_image(&credential(), "a", &png(), date("2024-01-01"))
        .await
        .unwrap();

    let request = &backend.mutations()[0];
    assert_eq!(request.method, "PUT");
    assert_eq!(request.raw_path, "/api/images/a/replace");
    assert_eq!(request.file.as_ref().map(|f| f.field.as_str()), Some("image"));
    assert_eq!(
        request.text_fields,
        vec![("date".to_string(), "2024-01-01".to_string())]
    );
}

#[tokio::test]
async fn test_delete_missing_record_reports_status() {
    let backend = MockBackend::start().await;

    let err = api(&backend)
        .delete_image(&credential(), "ghost")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Http { status: 404, .. }));
    assert_eq!(err.to_string(), "Delete failed (HTTP 404)");
}

#[tokio::test]
async fn test_unreachable_backend_is_transport_error() {
    let api = HttpApi::new(&ApiConfig {
        url: "http://127.0.0.1:1".to_string(),
        ..ApiConfig::default()
    })
    .unwrap();

    let err = api.list_images().await.unwrap_err();
    assert!(matches!(err, Error::Transport(_)), "got {err:?}");
}

#[tokio::test]
async fn test_stalled_body_is_timeout() {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    // Headers arrive promptly; the body never completes.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 2048];
        let _ = socket.read(&mut buf).await;
        socket
            .write_all(
                b"HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 64\r\n\r\n[",
            )
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_secs(10)).await;
    });

    let api = HttpApi::new(&ApiConfig {
        url: format!("http://{addr}"),
        request_timeout_secs: 1,
        ..ApiConfig::default()
    })
    .unwrap();

    let err = api.list_images().await.unwrap_err();
    assert!(matches!(err, Error::Timeout { .. }), "got {err:?}");
    assert_eq!(err.to_string(), "list images timed out after 1s");
    server.abort();
}

// =============================================================================
// Gallery over HTTP
// =============================================================================

#[tokio::test]
async fn test_gallery_upload_then_refresh() {
    let backend = MockBackend::start().await;
    backend.add_image("a", "2024-01-01");
    let gallery = GalleryManager::new(Arc::new(api(&backend)));

    gallery
        .upload(&credential(), Some(png()), date("2024-04-04"))
        .await
        .unwrap();

    let ids: Vec<_> = gallery.images().into_iter().map(|r| r.id).collect();
    assert_eq!(ids, ["a", "new-1"]);
    assert_eq!(
        gallery.message().map(|m| m.text().to_string()).as_deref(),
        Some("Image uploaded successfully!")
    );

    let methods: Vec<_> = backend.requests().into_iter().map(|r| r.method).collect();
    assert_eq!(methods, ["POST", "GET"]);
}

#[tokio::test]
async fn test_gallery_date_only_edit_over_http() {
    let backend = MockBackend::start().await;
    backend.add_image("a", "2024-01-01");
    let gallery = GalleryManager::new(Arc::new(api(&backend)));

    gallery.list().await.unwrap();
    gallery.begin_edit_by_id("a").unwrap();
    gallery.set_edit_date(date("2024-09-09")).unwrap();
    gallery.commit(&credential()).await.unwrap();

    assert!(!gallery.edit_intent().is_open());
    assert_eq!(gallery.images()[0].date, date("2024-09-09"));

    let mutations = backend.mutations();
    assert_eq!(mutations.len(), 1);
    assert_eq!(mutations[0].raw_path, "/api/images/a/update-date");
}

#[tokio::test]
async fn test_gallery_replace_failure_keeps_session() {
    let backend = MockBackend::start().await;
    backend.add_image("a", "2024-01-01");
    let gallery = GalleryManager::new(Arc::new(api(&backend)));

    gallery.list().await.unwrap();
    gallery.begin_edit_by_id("a").unwrap();
    gallery.stage_replacement(png()).unwrap();
    backend.fail_next(422, json!({ "message": "Unsupported format" }));

    let err = gallery.commit_replace(&credential()).await.unwrap_err();
    assert_eq!(err.to_string(), "Unsupported format (HTTP 422)");
    assert!(gallery.edit_intent().is_open());
    assert_eq!(
        gallery.message().map(|m| m.text().to_string()).as_deref(),
        Some("Error: Unsupported format (HTTP 422)")
    );

    gallery.commit_replace(&credential()).await.unwrap();
    assert!(!gallery.edit_intent().is_open());
    assert_eq!(
        gallery.images()[0].image_url,
        "https://cdn.example.com/a-v2.webp"
    );
}

// =============================================================================
// Banner and settings
// =============================================================================

#[tokio::test]
async fn test_banner_roundtrip_with_image_upload() {
    let backend = MockBackend::start().await;
    backend.set_banner(json!({
        "discountPercentage": 40,
        "date": "2024-05-01",
        "heading": "Spring Sale",
        "description": "Everything must go",
        "imageUrl": "/assets/old.jpg",
    }));

    let api = Arc::new(api(&backend));
    let mut editor = promodesk::banner::BannerEditor::new(api);
    editor.load().await.unwrap();
    assert_eq!(editor.banner().heading, "Spring Sale");
    assert_eq!(editor.banner().discount_percentage, 40);

    editor.banner_mut().discount_percentage = 60;
    editor.stage_image(Some(ImagePayload::new("hero.jpg", vec![1, 2, 3])));
    editor.submit(&credential()).await.unwrap();

    assert_eq!(
        editor.banner().image_url,
        "https://cdn.example.com/banner/hero.jpg"
    );
    assert!(editor.staged_image().is_none());

    let mutations = backend.mutations();
    assert_eq!(mutations.len(), 2);
    assert_eq!(mutations[0].raw_path, "/api/banner/upload");
    assert!(mutations[0].text_fields.is_empty());
    assert_eq!(mutations[1].method, "PUT");
    let sent = mutations[1].json.clone().unwrap();
    assert_eq!(sent["discountPercentage"], 60);
    assert_eq!(sent["imageUrl"], "https://cdn.example.com/banner/hero.jpg");
}

#[tokio::test]
async fn test_banner_created_when_none_stored() {
    let backend = MockBackend::start().await;
    let mut editor = promodesk::banner::BannerEditor::new(Arc::new(api(&backend)));

    let err = editor.load().await.unwrap_err();
    assert!(matches!(err, Error::Http { status: 404, .. }));
    assert_eq!(*editor.banner(), BannerData::default());

    let form = editor.banner_mut();
    form.heading = "Grand Opening".into();
    form.description = "First week only".into();
    form.date = "2024-07-01".into();
    editor.submit(&credential()).await.unwrap();

    let put = backend
        .mutations()
        .into_iter()
        .find(|r| r.method == "PUT")
        .expect("banner was not sent");
    let sent = put.json.unwrap();
    assert_eq!(sent["heading"], "Grand Opening");
    assert_eq!(sent["discountPercentage"], 25);

    let reloaded = api(&backend).get_banner().await.unwrap();
    assert_eq!(reloaded.heading, "Grand Opening");
}

#[tokio::test]
async fn test_invalid_banner_is_not_sent() {
    let backend = MockBackend::start().await;
    let mut editor = promodesk::banner::BannerEditor::new(Arc::new(api(&backend)));
    editor.banner_mut().heading = String::new();

    let err = editor.submit(&credential()).await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn test_settings_fetch() {
    let backend = MockBackend::start().await;
    backend.set_settings(json!({
        "headerText": "Daily Report",
        "subheaderText": "Fresh every morning",
    }));

    let settings = api(&backend).get_settings().await.unwrap();
    assert_eq!(settings.header_text, "Daily Report");
    assert_eq!(settings.subheader_text, "Fresh every morning");
}
