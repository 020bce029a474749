//! Media toolbox for the video-agent server.
//!
//! Everything here shells out to ffmpeg via `ffmpeg-sidecar`:
//! - [`probe`] extracts container metadata (duration).
//! - [`thumbs`] extracts single frames and resizes them into JPEG thumbnails.
//! - [`slides`] detects slide-change timestamps in lecture recordings by
//!   comparing consecutive downscaled frames.
//!
//! All functions are blocking; callers inside an async runtime should wrap
//! them in `spawn_blocking`.

pub mod error;
pub mod probe;
pub mod slides;
pub mod thumbs;

pub use error::MediaError;
