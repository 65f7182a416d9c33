//! HTTP front end for Leaflet.
//!
//! This crate provides an Axum server exposing three routes over the page
//! store:
//!
//! - **`GET /view/{title}`** renders a page read-only
//! - **`GET /edit/{title}`** renders a page in an edit form
//! - **`POST /save/{title}`** stores the submitted `body` field and
//!   redirects to the view route
//!
//! # Architecture
//!
//! Handlers share an [`AppState`] holding the [`PageStore`], the
//! [`EventLogger`] and the compiled [`PageTemplates`]. Every request
//! reports its outcome to the event logger; the logger's consumer writes
//! those lines out of band so a slow sink never delays a response.
//!
//! A page that does not exist (or cannot be read) is shown as an empty
//! page rather than an error, so the view and edit routes double as the
//! way to create new pages.
//!
//! [`PageStore`]: leaflet_store::PageStore
//! [`EventLogger`]: leaflet_events::EventLogger
//! [`PageTemplates`]: templates::PageTemplates

pub mod error;
pub mod handlers;
pub mod links;
pub mod router;
pub mod server;
pub mod state;
pub mod templates;

// Re-export primary types for convenience.
pub use error::WikiError;
pub use router::build_router;
pub use server::{ServerConfig, ServerError, bind, serve};
pub use state::AppState;
pub use templates::PageTemplates;
