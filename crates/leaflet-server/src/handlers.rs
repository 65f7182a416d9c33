//! Page endpoint handlers.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/view/{title}` | Render a page |
//! | `GET` | `/edit/{title}` | Render the edit form for a page |
//! | `POST` | `/save/{title}` | Store form field `body`, redirect to the view |
//!
//! View and edit never fail because a page is missing or unreadable: they
//! render an empty page with the requested title instead. Unreadable pages
//! are still reported (as a `WARNING` event and a `tracing` warning), so a
//! broken disk is visible to the operator even though the visitor only
//! sees a blank page.

use std::sync::Arc;

use axum::Form;
use axum::extract::{Path, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use leaflet_events::LogEntry;
use leaflet_store::{Page, PageTitle, StoreError};
use tracing::{debug, error, warn};

use crate::error::WikiError;
use crate::links;
use crate::state::AppState;

/// Form body for `POST /save/{title}`.
#[derive(Debug, serde::Deserialize)]
pub struct SaveForm {
    /// New page contents. A missing field saves an empty page.
    #[serde(default)]
    pub body: String,
}

/// Outcome of [`load_or_empty`].
#[derive(Debug)]
pub enum PageLoad {
    /// The page was read from the store.
    Found(Page),
    /// No page exists under the title; an empty one stands in.
    Missing(Page),
    /// The page exists but could not be read; an empty one stands in.
    Failed {
        /// The empty stand-in page.
        page: Page,
        /// Why the read failed.
        error: StoreError,
    },
}

impl PageLoad {
    /// Take the page to render.
    pub fn into_page(self) -> Page {
        match self {
            Self::Found(page) | Self::Missing(page) | Self::Failed { page, .. } => page,
        }
    }
}

/// Load `title`, substituting an empty page if it is missing or unreadable.
pub async fn load_or_empty(state: &AppState, title: &PageTitle) -> PageLoad {
    match state.store.load(title).await {
        Ok(page) => PageLoad::Found(page),
        Err(e) if e.is_not_found() => PageLoad::Missing(Page::empty(title.clone())),
        Err(e) => {
            warn!(%title, error = %e, "Failed to load page, serving empty page");
            record(state, LogEntry::warning(format!("Failed to load page {title}: {e}"))).await;
            PageLoad::Failed {
                page: Page::empty(title.clone()),
                error: e,
            }
        }
    }
}

// ---------------------------------------------------------------------------
// GET /view/{title}
// ---------------------------------------------------------------------------

/// Render a page read-only.
pub async fn view(
    State(state): State<Arc<AppState>>,
    Path(raw): Path<String>,
) -> Result<Html<String>, WikiError> {
    let title = checked_title(&state, &raw).await?;
    let page = load_or_empty(&state, &title).await.into_page();
    let html = state.templates.render_view(&page)?;

    record(&state, LogEntry::info("View displayed successfully")).await;
    Ok(Html(html))
}

// ---------------------------------------------------------------------------
// GET /edit/{title}
// ---------------------------------------------------------------------------

/// Render the edit form for a page.
pub async fn edit(
    State(state): State<Arc<AppState>>,
    Path(raw): Path<String>,
) -> Result<Html<String>, WikiError> {
    let title = checked_title(&state, &raw).await?;
    let page = load_or_empty(&state, &title).await.into_page();
    let html = state.templates.render_edit(&page)?;

    record(&state, LogEntry::info("Edit done successfully!")).await;
    Ok(Html(html))
}

// ---------------------------------------------------------------------------
// POST /save/{title}
// ---------------------------------------------------------------------------

/// Store the submitted body and redirect to the page view.
///
/// Responds `302 Found` on success, or `500` carrying the storage error
/// text if the write fails.
pub async fn save(
    State(state): State<Arc<AppState>>,
    Path(raw): Path<String>,
    Form(form): Form<SaveForm>,
) -> Result<Response, WikiError> {
    let title = checked_title(&state, &raw).await?;
    let page = Page::new(title, form.body);

    if let Err(e) = state.store.save(&page).await {
        error!(title = %page.title, error = %e, "Failed to save page");
        record(
            &state,
            LogEntry::error(format!("Failed to save page {}: {e}", page.title)),
        )
        .await;
        return Err(e.into());
    }

    record(&state, LogEntry::info("Page saved successfully!")).await;
    record(&state, LogEntry::info("Redirecting...")).await;

    let location = HeaderValue::from_str(&links::view_path(&page.title))
        .map_err(|e| WikiError::Internal(format!("invalid redirect location: {e}")))?;
    Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Validate the title from the request path, reporting rejections.
async fn checked_title(state: &AppState, raw: &str) -> Result<PageTitle, WikiError> {
    match PageTitle::parse(raw) {
        Ok(title) => Ok(title),
        Err(e) => {
            warn!(error = %e, "Rejected page title");
            record(state, LogEntry::warning(format!("Rejected request: {e}"))).await;
            Err(e.into())
        }
    }
}

/// Hand an entry to the event logger.
///
/// Waits if the queue is full. Once the logger has shut down entries are
/// dropped here; a request never fails because it could not be logged.
async fn record(state: &AppState, entry: LogEntry) {
    if let Err(e) = state.events.enqueue(entry).await {
        debug!(error = %e, "Event not recorded");
    }
}
