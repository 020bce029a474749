//! Thumbnail extraction.
//!
//! One ffmpeg invocation per timestamp: `-ss` is placed before `-i` so the
//! seek is frame-accurate, a single frame is written to a temp JPEG, then the
//! `image` crate resizes it to the target width (Lanczos) and writes the
//! final `{uuid}.jpg`. Timestamps that ffmpeg cannot extract (typically past
//! the end of the video) are skipped with a warning rather than failing the
//! whole batch.

use std::path::{Path, PathBuf};

use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::FfmpegEvent;
use image::imageops::FilterType;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::MediaError;

/// A thumbnail written to disk.
#[derive(Debug, Clone)]
pub struct ThumbnailFile {
    /// UUID used as the file stem.
    pub id: Uuid,
    /// Timestamp the frame was taken at, in seconds.
    pub time_second: f64,
    /// Absolute path of the JPEG.
    pub path: PathBuf,
}

/// Evenly spaced sample timestamps across `duration`, excluding the exact
/// start and end (first/last frames of lecture videos are usually blank).
pub fn evenly_spaced(duration: f64, count: usize) -> Vec<f64> {
    if duration <= 0.0 || count == 0 {
        return Vec::new();
    }
    let step = duration / (count as f64 + 1.0);
    (1..=count).map(|i| step * i as f64).collect()
}

/// Extract thumbnails from `video` at `timestamps`, resized to `width`
/// pixels wide (height scaled proportionally), written into `out_dir`.
pub fn generate_thumbnails(
    video: &Path,
    timestamps: &[f64],
    width: u32,
    out_dir: &Path,
) -> Result<Vec<ThumbnailFile>, MediaError> {
    if !video.is_file() {
        return Err(MediaError::FileNotFound(video.to_path_buf()));
    }
    if timestamps.is_empty() {
        return Err(MediaError::InvalidInput("timestamps cannot be empty".into()));
    }
    if width == 0 {
        return Err(MediaError::InvalidInput("width must be positive".into()));
    }

    std::fs::create_dir_all(out_dir)?;

    let input = video
        .to_str()
        .ok_or_else(|| MediaError::InvalidInput("video path is not valid UTF-8".into()))?;

    let mut results = Vec::new();

    for &ts in timestamps {
        let id = Uuid::new_v4();
        let temp_path = out_dir.join(format!("{id}_temp.jpg"));
        let final_path = out_dir.join(format!("{id}.jpg"));

        match extract_frame(input, ts, &temp_path) {
            Ok(()) => {}
            Err(e) => {
                warn!(time_second = ts, error = %e, "failed to extract frame; skipping");
                let _ = std::fs::remove_file(&temp_path);
                continue;
            }
        }

        match resize_to_width(&temp_path, &final_path, width) {
            Ok(()) => {
                let _ = std::fs::remove_file(&temp_path);
                debug!(time_second = ts, path = %final_path.display(), "thumbnail written");
                results.push(ThumbnailFile {
                    id,
                    time_second: ts,
                    path: final_path,
                });
            }
            Err(e) => {
                warn!(time_second = ts, error = %e, "failed to resize frame; skipping");
                let _ = std::fs::remove_file(&temp_path);
                let _ = std::fs::remove_file(&final_path);
            }
        }
    }

    Ok(results)
}

/// Extract a single frame at `ts` seconds into `out`.
fn extract_frame(input: &str, ts: f64, out: &Path) -> Result<(), MediaError> {
    let out_str = out
        .to_str()
        .ok_or_else(|| MediaError::InvalidInput("output path is not valid UTF-8".into()))?;

    let mut ffmpeg_error: Option<String> = None;

    let iter = FfmpegCommand::new()
        .hide_banner()
        .overwrite()
        // -ss before -i: accurate seek without decoding the whole prefix.
        .args(["-ss", &ts.to_string()])
        .input(input)
        .args(["-vframes", "1"])
        // Cap the decoded resolution; the final resize happens in-process.
        .args(["-vf", "scale='min(iw,1920)':-2"])
        .args(["-q:v", "2"])
        .output(out_str)
        .spawn()
        .map_err(|e| MediaError::Ffmpeg(e.to_string()))?
        .iter()
        .map_err(|e| MediaError::Ffmpeg(e.to_string()))?;

    for event in iter {
        if let FfmpegEvent::Error(e) = event {
            ffmpeg_error = Some(e);
        }
    }

    if !out.is_file() {
        return Err(MediaError::Ffmpeg(ffmpeg_error.unwrap_or_else(|| {
            format!("no frame produced at {ts}s (timestamp past end of video?)")
        })));
    }
    Ok(())
}

/// Resize the image at `src` to `width` pixels wide and write a JPEG to `dst`.
fn resize_to_width(src: &Path, dst: &Path, width: u32) -> Result<(), MediaError> {
    let img = image::open(src)?;
    let ratio = width as f64 / img.width() as f64;
    let height = (img.height() as f64 * ratio).round().max(1.0) as u32;
    let resized = img.resize_exact(width, height, FilterType::Lanczos3);
    resized.to_rgb8().save(dst)?;
    Ok(())
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn evenly_spaced_excludes_endpoints() {
        let ts = evenly_spaced(100.0, 4);
        assert_eq!(ts, vec![20.0, 40.0, 60.0, 80.0]);
    }

    #[test]
    fn evenly_spaced_single_sample_is_midpoint() {
        let ts = evenly_spaced(60.0, 1);
        assert_eq!(ts, vec![30.0]);
    }

    #[test]
    fn evenly_spaced_handles_degenerate_inputs() {
        assert!(evenly_spaced(0.0, 5).is_empty());
        assert!(evenly_spaced(-1.0, 5).is_empty());
        assert!(evenly_spaced(100.0, 0).is_empty());
    }

    fn fake_video(name: &str) -> PathBuf {
        // The path check runs before input validation, so point at a real file.
        let path = std::env::temp_dir().join(name);
        std::fs::write(&path, b"not a real video").unwrap();
        path
    }

    #[test]
    fn empty_timestamps_are_rejected() {
        let video = fake_video("thumbs_empty_ts.mp4");
        let err = generate_thumbnails(&video, &[], 200, &std::env::temp_dir()).unwrap_err();
        assert!(matches!(err, MediaError::InvalidInput(_)));
    }

    #[test]
    fn zero_width_is_rejected() {
        let video = fake_video("thumbs_zero_width.mp4");
        let err = generate_thumbnails(&video, &[1.0], 0, &std::env::temp_dir()).unwrap_err();
        assert!(matches!(err, MediaError::InvalidInput(_)));
    }

    #[test]
    fn missing_video_is_an_error() {
        let err = generate_thumbnails(Path::new("/nonexistent.mp4"), &[1.0], 200, &std::env::temp_dir())
            .unwrap_err();
        assert!(matches!(err, MediaError::FileNotFound(_)));
    }
}
