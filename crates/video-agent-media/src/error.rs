use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by the media toolbox.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// ffmpeg could not be spawned or exited with an error.
    #[error("ffmpeg error: {0}")]
    Ffmpeg(String),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
