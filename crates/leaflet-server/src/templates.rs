//! Page template loading and rendering via `minijinja`.
//!
//! Two templates are needed: `view.html` and `edit.html`. Built-in copies
//! are compiled into the binary; operators can point the server at a
//! directory containing their own versions instead. Both templates receive
//! `title`, `body`, `edit_url` and `save_url`. Output is HTML-escaped; the
//! two URLs are already percent-encoded and are inserted as-is.

use std::path::Path;

use leaflet_store::Page;
use minijinja::value::Value;
use minijinja::{Environment, context};

use crate::error::WikiError;
use crate::links;

const VIEW: &str = "view.html";
const EDIT: &str = "edit.html";

const BUILTIN_VIEW: &str = include_str!("../templates/view.html");
const BUILTIN_EDIT: &str = include_str!("../templates/edit.html");

/// The compiled view and edit templates.
#[derive(Debug, Clone)]
pub struct PageTemplates {
    env: Environment<'static>,
}

impl PageTemplates {
    /// Templates compiled into the binary.
    ///
    /// # Errors
    ///
    /// Returns [`WikiError::Template`] if a built-in template fails to
    /// parse.
    pub fn builtin() -> Result<Self, WikiError> {
        let mut env = Environment::new();
        env.add_template(VIEW, BUILTIN_VIEW)?;
        env.add_template(EDIT, BUILTIN_EDIT)?;
        Ok(Self { env })
    }

    /// Load `view.html` and `edit.html` from `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`WikiError::Template`] if either file is missing,
    /// unreadable, or not a valid template.
    pub fn from_dir(dir: &Path) -> Result<Self, WikiError> {
        let mut env = Environment::new();
        for name in [VIEW, EDIT] {
            let path = dir.join(name);
            let source = std::fs::read_to_string(&path).map_err(|e| {
                WikiError::Template(format!("failed to read {}: {e}", path.display()))
            })?;
            env.add_template_owned(name, source)?;
        }
        Ok(Self { env })
    }

    /// Render the read-only view of `page`.
    ///
    /// # Errors
    ///
    /// Returns [`WikiError::Template`] if rendering fails.
    pub fn render_view(&self, page: &Page) -> Result<String, WikiError> {
        self.render(VIEW, page)
    }

    /// Render the edit form for `page`.
    ///
    /// # Errors
    ///
    /// Returns [`WikiError::Template`] if rendering fails.
    pub fn render_edit(&self, page: &Page) -> Result<String, WikiError> {
        self.render(EDIT, page)
    }

    fn render(&self, name: &str, page: &Page) -> Result<String, WikiError> {
        let body = page.body_text();
        let ctx = context! {
            title => page.title.as_str(),
            body => &*body,
            edit_url => Value::from_safe_string(links::edit_path(&page.title)),
            save_url => Value::from_safe_string(links::save_path(&page.title)),
        };
        Ok(self.env.get_template(name)?.render(ctx)?)
    }
}
