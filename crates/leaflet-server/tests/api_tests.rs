//! Integration tests for the page routes.
//!
//! Tests use Axum's `Router` directly via `tower::ServiceExt` without
//! starting a TCP server. Each test gets its own scratch data directory
//! and an event logger writing to memory, so the event lines produced by
//! a request can be checked after the logger is shut down.

#![allow(clippy::unwrap_used)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use leaflet_events::{DEFAULT_QUEUE_CAPACITY, EventLogger, MemorySink};
use leaflet_server::router::build_router;
use leaflet_server::state::AppState;
use leaflet_server::templates::PageTemplates;
use leaflet_store::{Page, PageStore, PageTitle};
use tower::ServiceExt;

struct TestApp {
    state: Arc<AppState>,
    sink: MemorySink,
    dir: PathBuf,
}

impl TestApp {
    async fn new() -> Self {
        let dir = std::env::temp_dir().join(format!(
            "leaflet_api_{}_{}",
            std::process::id(),
            uuid::Uuid::new_v4()
        ));
        let store = PageStore::open(&dir).await.unwrap();
        let sink = MemorySink::new();
        let events = Arc::new(EventLogger::start(DEFAULT_QUEUE_CAPACITY, sink.clone()).unwrap());
        let templates = PageTemplates::builtin().unwrap();

        Self {
            state: Arc::new(AppState::new(store, events, templates)),
            sink,
            dir,
        }
    }

    async fn send(&self, request: Request<Body>) -> Response {
        build_router(Arc::clone(&self.state))
            .oneshot(request)
            .await
            .unwrap()
    }

    async fn get(&self, uri: &str) -> Response {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    async fn post_form(&self, uri: &str, form: &'static str) -> Response {
        self.send(
            Request::post(uri)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(form))
                .unwrap(),
        )
        .await
    }

    /// Shut the event logger down and return every line it wrote.
    async fn event_lines(&self) -> Vec<String> {
        self.state.events.shutdown().await.unwrap();
        self.sink.lines()
    }
}

/// Removes the scratch data directory, or the file a test put in its
/// place, even when an assertion fails.
impl Drop for TestApp {
    fn drop(&mut self) {
        match std::fs::symlink_metadata(&self.dir) {
            Ok(meta) if meta.is_dir() => std::fs::remove_dir_all(&self.dir).ok(),
            Ok(_) => std::fs::remove_file(&self.dir).ok(),
            Err(_) => None,
        };
    }
}

async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn title(raw: &str) -> PageTitle {
    PageTitle::parse(raw).unwrap()
}

// =========================================================================
// View / edit
// =========================================================================

#[tokio::test]
async fn view_shows_saved_page() {
    let app = TestApp::new().await;
    app.state
        .store
        .save(&Page::new(title("Test"), "This is a sample Page."))
        .await
        .unwrap();

    let response = app.get("/view/Test").await;
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_owned();
    assert!(content_type.contains("text/html"));

    let html = body_text(response).await;
    assert!(html.contains("<h1>Test</h1>"));
    assert!(html.contains("<div>This is a sample Page.</div>"));

    let lines = app.event_lines().await;
    assert!(lines.iter().any(|l| l.ends_with("[INFO] View displayed successfully")));
}

#[tokio::test]
async fn view_of_missing_page_is_empty_not_error() {
    let app = TestApp::new().await;

    let response = app.get("/view/DoesNotExist").await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains("<h1>DoesNotExist</h1>"));
    assert!(html.contains("<div></div>"));
}

#[tokio::test]
async fn edit_prefills_existing_body() {
    let app = TestApp::new().await;
    app.state
        .store
        .save(&Page::new(title("Draft"), "work in progress"))
        .await
        .unwrap();

    let response = app.get("/edit/Draft").await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains("Editing Draft"));
    assert!(html.contains(r#"action="/save/Draft""#));
    assert!(html.contains(">work in progress</textarea>"));

    let lines = app.event_lines().await;
    assert!(lines.iter().any(|l| l.ends_with("[INFO] Edit done successfully!")));
}

#[tokio::test]
async fn edit_of_missing_page_is_empty_form() {
    let app = TestApp::new().await;

    let response = app.get("/edit/Brand%20New").await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains("Editing Brand New"));
    assert!(html.contains("></textarea>"));
}

#[tokio::test]
async fn unreadable_page_degrades_to_empty_with_warning() {
    let app = TestApp::new().await;
    // A directory in place of the page file makes the read fail with a
    // genuine I/O error rather than not-found.
    tokio::fs::create_dir(app.state.store.path_for(&title("Broken")))
        .await
        .unwrap();

    let response = app.get("/view/Broken").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("<h1>Broken</h1>"));

    let lines = app.event_lines().await;
    assert!(
        lines
            .iter()
            .any(|l| l.contains("[WARNING] Failed to load page Broken")),
        "lines: {lines:?}"
    );
}

// =========================================================================
// Save
// =========================================================================

#[tokio::test]
async fn save_stores_body_and_redirects() {
    let app = TestApp::new().await;

    let response = app
        .post_form("/save/Test", "body=This+is+a+sample+Page.")
        .await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/view/Test"
    );

    let stored = app.state.store.load(&title("Test")).await.unwrap();
    assert_eq!(stored.body, b"This is a sample Page.");

    let html = body_text(app.get("/view/Test").await).await;
    assert!(html.contains("<div>This is a sample Page.</div>"));

    let lines = app.event_lines().await;
    let saved = lines
        .iter()
        .position(|l| l.ends_with("[INFO] Page saved successfully!"))
        .unwrap();
    let redirecting = lines
        .iter()
        .position(|l| l.ends_with("[INFO] Redirecting..."))
        .unwrap();
    assert!(saved < redirecting);
}

#[tokio::test]
async fn save_overwrites_previous_body() {
    let app = TestApp::new().await;

    app.post_form("/save/Doc", "body=first+version+is+longer").await;
    app.post_form("/save/Doc", "body=second").await;

    let stored = app.state.store.load(&title("Doc")).await.unwrap();
    assert_eq!(stored.body, b"second");
}

#[tokio::test]
async fn save_without_body_field_stores_empty_page() {
    let app = TestApp::new().await;

    let response = app.post_form("/save/Blank", "").await;
    assert_eq!(response.status(), StatusCode::FOUND);

    let stored = app.state.store.load(&title("Blank")).await.unwrap();
    assert!(stored.body.is_empty());
}

#[tokio::test]
async fn redirect_location_is_percent_encoded() {
    let app = TestApp::new().await;

    let response = app.post_form("/save/Caf%C3%A9%20Menu", "body=espresso").await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/view/Caf%C3%A9%20Menu"
    );

    let stored = app.state.store.load(&title("Café Menu")).await.unwrap();
    assert_eq!(stored.body, b"espresso");
}

#[tokio::test]
async fn failed_save_is_server_error_with_message() {
    let app = TestApp::new().await;
    // Replace the data directory with a plain file so every write fails.
    tokio::fs::remove_dir_all(&app.dir).await.unwrap();
    tokio::fs::write(&app.dir, b"not a directory").await.unwrap();

    let response = app.post_form("/save/Test", "body=lost").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let text = body_text(response).await;
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["status"], 500);
    assert!(json["error"].as_str().unwrap().contains("I/O error"));

    let lines = app.event_lines().await;
    assert!(lines.iter().any(|l| l.contains("[ERROR] Failed to save page Test")));
    assert!(!lines.iter().any(|l| l.contains("Page saved successfully!")));
}

#[tokio::test]
async fn saved_markup_is_escaped_on_view() {
    let app = TestApp::new().await;

    app.post_form("/save/Xss", "body=%3Cscript%3Ealert(1)%3C%2Fscript%3E")
        .await;

    let html = body_text(app.get("/view/Xss").await).await;
    assert!(!html.contains("<script>"));
    assert!(html.contains("&lt;script&gt;"));
}

// =========================================================================
// Title validation
// =========================================================================

#[tokio::test]
async fn traversal_titles_are_rejected() {
    let app = TestApp::new().await;

    for uri in ["/view/..%2Fsecret", "/edit/.hidden", "/view/a%5Cb", "/view/.."] {
        let response = app.get(uri).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
    }

    let response = app.post_form("/save/..%2F..%2Fescape", "body=x").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let parent = app.dir.parent().unwrap().to_path_buf();
    assert!(!parent.join("escape.txt").exists());

    let lines = app.event_lines().await;
    assert!(lines.iter().any(|l| l.contains("[WARNING] Rejected request")));
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let app = TestApp::new().await;
    let response = app.get("/delete/Test").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn scratch_data_is_removed_when_the_app_drops() {
    let app = TestApp::new().await;
    app.post_form("/save/Kept", "body=x").await;
    let dir = app.dir.clone();
    assert!(dir.join("Kept.txt").exists());

    drop(app);
    assert!(!dir.exists());

    let app = TestApp::new().await;
    tokio::fs::remove_dir_all(&app.dir).await.unwrap();
    tokio::fs::write(&app.dir, b"not a directory").await.unwrap();
    let file = app.dir.clone();

    drop(app);
    assert!(!file.exists());
}
