//! Shared application state for the page routes.
//!
//! [`AppState`] bundles the collaborators every handler needs. It holds no
//! page data itself: the store re-reads the filesystem on every request.

use std::sync::Arc;

use leaflet_events::EventLogger;
use leaflet_store::PageStore;

use crate::templates::PageTemplates;

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor.
#[derive(Debug)]
pub struct AppState {
    /// Page persistence.
    pub store: PageStore,
    /// Event log every request reports to.
    pub events: Arc<EventLogger>,
    /// Compiled view and edit templates.
    pub templates: PageTemplates,
}

impl AppState {
    /// Bundle the handler collaborators.
    pub const fn new(store: PageStore, events: Arc<EventLogger>, templates: PageTemplates) -> Self {
        Self {
            store,
            events,
            templates,
        }
    }
}
