//! URL paths for page routes.
//!
//! Titles may contain spaces and non-ASCII text, so they are
//! percent-encoded before being placed in a path.

use leaflet_store::PageTitle;

/// Path of the read-only view of `title`.
pub fn view_path(title: &PageTitle) -> String {
    format!("/view/{}", encode_path_segment(title.as_str()))
}

/// Path of the edit form for `title`.
pub fn edit_path(title: &PageTitle) -> String {
    format!("/edit/{}", encode_path_segment(title.as_str()))
}

/// Path the edit form for `title` posts to.
pub fn save_path(title: &PageTitle) -> String {
    format!("/save/{}", encode_path_segment(title.as_str()))
}

/// Percent-encode every byte outside the RFC 3986 unreserved set.
pub fn encode_path_segment(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn unreserved_characters_pass_through() {
        assert_eq!(encode_path_segment("Front-Page_v1.2~x"), "Front-Page_v1.2~x");
    }

    #[test]
    fn everything_else_is_escaped() {
        assert_eq!(encode_path_segment("two words"), "two%20words");
        assert_eq!(encode_path_segment("Café"), "Caf%C3%A9");
        assert_eq!(encode_path_segment("a?b#c%"), "a%3Fb%23c%25");
    }

    #[test]
    fn route_paths() {
        let title = PageTitle::parse("My Page").unwrap();
        assert_eq!(view_path(&title), "/view/My%20Page");
        assert_eq!(edit_path(&title), "/edit/My%20Page");
        assert_eq!(save_path(&title), "/save/My%20Page");
    }
}
