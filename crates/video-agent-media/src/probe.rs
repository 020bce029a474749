//! Container metadata probing.

use std::path::Path;

use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::FfmpegEvent;
use tracing::debug;

use crate::MediaError;

/// Return the duration of a video file in seconds.
///
/// Runs a decode-to-null pass and scans ffmpeg's log output for the
/// `Duration: HH:MM:SS.cc` header line. Returns an error when ffmpeg cannot
/// open the file or no duration line is emitted (e.g. a truncated stream).
pub fn video_duration(video: &Path) -> Result<f64, MediaError> {
    if !video.is_file() {
        return Err(MediaError::FileNotFound(video.to_path_buf()));
    }

    let input = video
        .to_str()
        .ok_or_else(|| MediaError::InvalidInput("video path is not valid UTF-8".into()))?;

    let mut duration: Option<f64> = None;
    let mut ffmpeg_error: Option<String> = None;

    let iter = FfmpegCommand::new()
        .hide_banner()
        .input(input)
        .args(["-f", "null"])
        .output("-")
        .spawn()
        .map_err(|e| MediaError::Ffmpeg(e.to_string()))?
        .iter()
        .map_err(|e| MediaError::Ffmpeg(e.to_string()))?;

    for event in iter {
        match event {
            FfmpegEvent::Log(_, msg) => {
                if duration.is_none() {
                    duration = parse_duration_line(&msg);
                }
            }
            FfmpegEvent::Error(e) => ffmpeg_error = Some(e),
            _ => {}
        }
    }

    match duration {
        Some(d) => {
            debug!(path = %video.display(), duration_sec = d, "probed video duration");
            Ok(d)
        }
        None => Err(MediaError::Ffmpeg(
            ffmpeg_error.unwrap_or_else(|| format!("no duration found for {}", video.display())),
        )),
    }
}

/// Parse a `Duration: 00:09:56.02` fragment out of an ffmpeg log line.
fn parse_duration_line(line: &str) -> Option<f64> {
    let rest = line.split("Duration:").nth(1)?;
    let stamp = rest.trim_start().split([',', ' ']).next()?;
    parse_timestamp(stamp)
}

/// Parse `HH:MM:SS.cc` into seconds.
fn parse_timestamp(stamp: &str) -> Option<f64> {
    let mut parts = stamp.split(':');
    let hours: f64 = parts.next()?.parse().ok()?;
    let minutes: f64 = parts.next()?.parse().ok()?;
    let seconds: f64 = parts.next()?.parse().ok()?;
    if parts.next().is_some() || !(0.0..60.0).contains(&minutes) || !(0.0..60.0).contains(&seconds)
    {
        return None;
    }
    Some(hours * 3600.0 + minutes * 60.0 + seconds)
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parses_standard_duration_line() {
        let line = "  Duration: 00:09:56.02, start: 0.000000, bitrate: 535 kb/s";
        let d = parse_duration_line(line).unwrap();
        assert!((d - 596.02).abs() < 1e-9);
    }

    #[test]
    fn parses_hours() {
        let d = parse_duration_line("Duration: 01:30:00.00, start: 0").unwrap();
        assert!((d - 5400.0).abs() < 1e-9);
    }

    #[test]
    fn rejects_unrelated_lines() {
        assert!(parse_duration_line("Stream #0:0: Video: h264").is_none());
        assert!(parse_duration_line("Duration: N/A, bitrate: N/A").is_none());
    }

    #[test]
    fn rejects_out_of_range_fields() {
        assert!(parse_timestamp("00:99:00.00").is_none());
        assert!(parse_timestamp("00:00:75.00").is_none());
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = video_duration(Path::new("/nonexistent/video.mp4")).unwrap_err();
        assert!(matches!(err, MediaError::FileNotFound(_)));
    }
}
