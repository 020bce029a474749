//! Slide-change detection for lecture videos.
//!
//! Frames are sampled at a reduced rate and downscaled, then consecutive
//! frames are compared with a normalized mean-absolute-difference similarity
//! (1.0 = identical). A similarity drop below the threshold marks a slide
//! change; a minimum interval between detections suppresses jitter from
//! cursor movement and encoder noise.

use std::path::Path;

use ffmpeg_sidecar::command::FfmpegCommand;
use tracing::{debug, warn};

use crate::MediaError;

/// Tuning knobs for [`detect_slide_changes`].
#[derive(Debug, Clone)]
pub struct SlideDetectOptions {
    /// Similarity below which a frame pair counts as a slide change.
    /// Range (0, 1); lower is less sensitive.
    pub similarity_threshold: f64,
    /// Minimum seconds between two detected changes.
    pub min_interval_sec: f64,
    /// Frame sampling rate in frames per second.
    pub sampling_fps: f64,
    /// Width frames are downscaled to before comparison.
    pub frame_width: u32,
}

impl Default for SlideDetectOptions {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.92,
            min_interval_sec: 1.0,
            sampling_fps: 1.0,
            frame_width: 64,
        }
    }
}

impl SlideDetectOptions {
    pub fn validate(&self) -> Result<(), MediaError> {
        if !(0.0 < self.similarity_threshold && self.similarity_threshold < 1.0) {
            return Err(MediaError::InvalidInput(
                "similarity_threshold must be in (0, 1)".into(),
            ));
        }
        if self.min_interval_sec < 0.0 {
            return Err(MediaError::InvalidInput(
                "min_interval_sec must be non-negative".into(),
            ));
        }
        if self.sampling_fps <= 0.0 {
            return Err(MediaError::InvalidInput("sampling_fps must be positive".into()));
        }
        if self.frame_width == 0 {
            return Err(MediaError::InvalidInput("frame_width must be positive".into()));
        }
        Ok(())
    }
}

/// Detect slide-change timestamps (seconds, ascending) in `video`.
pub fn detect_slide_changes(
    video: &Path,
    opts: &SlideDetectOptions,
) -> Result<Vec<f64>, MediaError> {
    opts.validate()?;
    if !video.is_file() {
        return Err(MediaError::FileNotFound(video.to_path_buf()));
    }

    let input = video
        .to_str()
        .ok_or_else(|| MediaError::InvalidInput("video path is not valid UTF-8".into()))?;

    let iter = FfmpegCommand::new()
        .hide_banner()
        .input(input)
        .args([
            "-vf",
            &format!("fps={},scale={}:-2", opts.sampling_fps, opts.frame_width),
        ])
        .rawvideo()
        .spawn()
        .map_err(|e| MediaError::Ffmpeg(e.to_string()))?
        .iter()
        .map_err(|e| MediaError::Ffmpeg(e.to_string()))?;

    let mut changes: Vec<f64> = Vec::new();
    let mut prev_gray: Option<Vec<u8>> = None;
    let mut last_change = f64::NEG_INFINITY;
    let mut frame_count = 0usize;

    for frame in iter.filter_frames() {
        frame_count += 1;
        let gray = rgb24_to_gray(&frame.data);
        let ts = frame.timestamp as f64;

        if let Some(prev) = &prev_gray {
            if prev.len() == gray.len() {
                let similarity = frame_similarity(prev, &gray);
                if similarity < opts.similarity_threshold
                    && ts - last_change >= opts.min_interval_sec
                {
                    debug!(time_second = ts, similarity, "slide change detected");
                    changes.push(ts);
                    last_change = ts;
                }
            } else {
                warn!(time_second = ts, "frame size changed mid-stream; skipping compare");
            }
        }
        prev_gray = Some(gray);
    }

    if frame_count == 0 {
        return Err(MediaError::Ffmpeg(format!(
            "no frames decoded from {}",
            video.display()
        )));
    }

    debug!(frames = frame_count, changes = changes.len(), "slide detection finished");
    Ok(changes)
}

/// Convert contiguous change timestamps into `[begin, end)` sections spanning
/// the whole video. Change points outside `(0, duration)` are ignored.
pub fn sections_from_changes(changes: &[f64], duration: f64) -> Vec<(f64, f64)> {
    if duration <= 0.0 {
        return Vec::new();
    }

    let mut starts: Vec<f64> = vec![0.0];
    starts.extend(changes.iter().copied().filter(|&t| t > 0.0 && t < duration));
    starts.sort_by(|a, b| a.total_cmp(b));
    starts.dedup();

    let mut sections = Vec::with_capacity(starts.len());
    for (i, &begin) in starts.iter().enumerate() {
        let end = starts.get(i + 1).copied().unwrap_or(duration);
        if end > begin {
            sections.push((begin, end));
        }
    }
    sections
}

/// Normalized mean-absolute-difference similarity between two equal-length
/// grayscale buffers. 1.0 means identical, 0.0 means maximally different.
pub fn frame_similarity(a: &[u8], b: &[u8]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    if a.is_empty() {
        return 1.0;
    }
    let total: u64 = a
        .iter()
        .zip(b.iter())
        .map(|(&x, &y)| x.abs_diff(y) as u64)
        .sum();
    1.0 - total as f64 / (a.len() as f64 * 255.0)
}

/// ITU-R BT.601 luma conversion of packed rgb24 data.
fn rgb24_to_gray(rgb: &[u8]) -> Vec<u8> {
    rgb.chunks_exact(3)
        .map(|px| {
            let [r, g, b] = [px[0] as f32, px[1] as f32, px[2] as f32];
            (0.299 * r + 0.587 * g + 0.114 * b).round() as u8
        })
        .collect()
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn identical_frames_have_full_similarity() {
        let frame = vec![100u8; 64];
        assert_eq!(frame_similarity(&frame, &frame), 1.0);
    }

    #[test]
    fn inverted_frames_have_zero_similarity() {
        let black = vec![0u8; 64];
        let white = vec![255u8; 64];
        assert!(frame_similarity(&black, &white).abs() < 1e-9);
    }

    #[test]
    fn small_noise_stays_above_threshold() {
        let a = vec![128u8; 1000];
        let mut b = a.clone();
        b[0] = 140; // single-pixel wiggle
        assert!(frame_similarity(&a, &b) > 0.99);
    }

    #[test]
    fn gray_conversion_preserves_extremes() {
        assert_eq!(rgb24_to_gray(&[0, 0, 0]), vec![0]);
        assert_eq!(rgb24_to_gray(&[255, 255, 255]), vec![255]);
    }

    #[test]
    fn sections_cover_whole_duration() {
        let sections = sections_from_changes(&[10.0, 30.0], 60.0);
        assert_eq!(sections, vec![(0.0, 10.0), (10.0, 30.0), (30.0, 60.0)]);
    }

    #[test]
    fn no_changes_yields_single_section() {
        assert_eq!(sections_from_changes(&[], 42.0), vec![(0.0, 42.0)]);
    }

    #[test]
    fn out_of_range_changes_are_dropped() {
        let sections = sections_from_changes(&[-5.0, 0.0, 70.0, 20.0], 60.0);
        assert_eq!(sections, vec![(0.0, 20.0), (20.0, 60.0)]);
    }

    #[test]
    fn unsorted_changes_are_ordered() {
        let sections = sections_from_changes(&[30.0, 10.0], 60.0);
        assert_eq!(sections, vec![(0.0, 10.0), (10.0, 30.0), (30.0, 60.0)]);
    }

    #[test]
    fn invalid_options_are_rejected() {
        let video = std::path::Path::new("/nonexistent.mp4");
        for opts in [
            SlideDetectOptions { similarity_threshold: 0.0, ..Default::default() },
            SlideDetectOptions { similarity_threshold: 1.0, ..Default::default() },
            SlideDetectOptions { min_interval_sec: -1.0, ..Default::default() },
            SlideDetectOptions { sampling_fps: 0.0, ..Default::default() },
            SlideDetectOptions { frame_width: 0, ..Default::default() },
        ] {
            let err = detect_slide_changes(video, &opts).unwrap_err();
            assert!(matches!(err, MediaError::InvalidInput(_)), "{opts:?}");
        }
    }
}
