//! Request/response types for the HTTP API, grouped by route namespace.

pub mod admin;
pub mod api;

/// Public URL of a media file stored relative to the media root.
pub fn media_url(relative: &str) -> String {
    format!("/media/{relative}")
}
