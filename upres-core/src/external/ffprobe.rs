//! FFprobe integration for media analysis.
//!
//! Probing is best-effort by design: each metadata field is extracted
//! independently, a field that cannot be determined becomes `None` (or the
//! default frame rate), and no field failure aborts the probe. A single query
//! attempt is made per field; there are no retries.
//!
//! Probing goes through the [`MediaProber`] trait so the pipeline can be
//! exercised in tests without a real ffprobe binary.

use crate::config::DEFAULT_FRAME_RATE;
use ffprobe::{ConfigBuilder, ffprobe, ffprobe_config};
use std::path::Path;

/// Media properties gathered from the source file.
#[derive(Debug, Clone)]
pub struct MediaInfo {
    /// Width of the video stream, if determinable
    pub width: Option<u32>,
    /// Height of the video stream, if determinable
    pub height: Option<u32>,
    /// Frame rate; falls back to [`DEFAULT_FRAME_RATE`] when undeterminable
    pub frame_rate: f64,
    /// Container duration in seconds, if determinable
    pub duration: Option<f64>,
}

impl Default for MediaInfo {
    fn default() -> Self {
        Self {
            width: None,
            height: None,
            frame_rate: DEFAULT_FRAME_RATE,
            duration: None,
        }
    }
}

/// Trait for querying media metadata.
pub trait MediaProber {
    /// Gathers width, height, frame rate, and duration for the input file.
    /// Every field is independently best-effort.
    fn probe(&self, input_path: &Path) -> MediaInfo;

    /// Determines the total frame count: an exact per-frame count when
    /// possible, else `floor(frame_rate * duration)`, else `None`.
    fn total_frames(&self, input_path: &Path, info: &MediaInfo) -> Option<u64>;
}

/// Parses an ffprobe rational frame-rate string ("num/den").
///
/// A zero denominator falls back to the numerator alone. Returns `None` when
/// the string is not a two-part rational of numbers.
pub fn parse_frame_rate(raw: &str) -> Option<f64> {
    let (num, den) = raw.trim().split_once('/')?;
    let num = num.parse::<f64>().ok()?;
    let den = den.parse::<f64>().ok()?;
    if den == 0.0 { Some(num) } else { Some(num / den) }
}

/// Concrete [`MediaProber`] backed by the ffprobe crate.
#[derive(Debug, Clone, Default)]
pub struct CrateFfprobeProber;

impl MediaProber for CrateFfprobeProber {
    fn probe(&self, input_path: &Path) -> MediaInfo {
        log::debug!("Running ffprobe for media info on: {}", input_path.display());
        let metadata = match ffprobe(input_path) {
            Ok(metadata) => metadata,
            Err(err) => {
                log::warn!(
                    "ffprobe failed for {}: {err:?}; treating all fields as unknown",
                    input_path.display()
                );
                return MediaInfo::default();
            }
        };

        let mut info = MediaInfo {
            duration: metadata
                .format
                .duration
                .as_deref()
                .and_then(|d| d.parse::<f64>().ok()),
            ..Default::default()
        };

        if let Some(video_stream) = metadata
            .streams
            .iter()
            .find(|s| s.codec_type.as_deref() == Some("video"))
        {
            info.width = video_stream.width.and_then(|w| u32::try_from(w).ok());
            info.height = video_stream.height.and_then(|h| u32::try_from(h).ok());
            info.frame_rate =
                parse_frame_rate(&video_stream.r_frame_rate).unwrap_or(DEFAULT_FRAME_RATE);
        } else {
            log::warn!(
                "No video stream found by ffprobe for {}",
                input_path.display()
            );
        }

        info
    }

    fn total_frames(&self, input_path: &Path, info: &MediaInfo) -> Option<u64> {
        log::debug!("Running ffprobe frame count on: {}", input_path.display());
        let counted = ffprobe_config(
            ConfigBuilder::new().count_frames(true).build(),
            input_path,
        )
        .ok()
        .and_then(|metadata| {
            metadata
                .streams
                .iter()
                .find(|s| s.codec_type.as_deref() == Some("video"))
                .and_then(|s| s.nb_read_frames.as_deref())
                .and_then(|f| f.parse::<u64>().ok())
        });

        counted.or_else(|| derive_frame_count(info))
    }
}

/// Fallback derivation used when exact frame counting fails.
fn derive_frame_count(info: &MediaInfo) -> Option<u64> {
    if info.frame_rate > 0.0 {
        info.duration.map(|d| (info.frame_rate * d) as u64)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_frame_rate_rational() {
        assert_eq!(parse_frame_rate("30/1"), Some(30.0));
        assert_eq!(parse_frame_rate("30000/1001"), Some(30000.0 / 1001.0));
        assert_eq!(parse_frame_rate("24/1"), Some(24.0));
        assert_eq!(parse_frame_rate(" 25/1 "), Some(25.0));
    }

    #[test]
    fn test_parse_frame_rate_zero_denominator_falls_back_to_numerator() {
        assert_eq!(parse_frame_rate("30/0"), Some(30.0));
        assert_eq!(parse_frame_rate("0/0"), Some(0.0));
    }

    #[test]
    fn test_parse_frame_rate_invalid() {
        assert_eq!(parse_frame_rate(""), None);
        assert_eq!(parse_frame_rate("30"), None);
        assert_eq!(parse_frame_rate("a/b"), None);
        assert_eq!(parse_frame_rate("30/1/2"), None);
    }

    #[test]
    fn test_default_media_info_uses_fallback_frame_rate() {
        let info = MediaInfo::default();
        assert_eq!(info.frame_rate, DEFAULT_FRAME_RATE);
        assert!(info.width.is_none());
        assert!(info.duration.is_none());
    }

    #[test]
    fn test_derive_frame_count_floors_product() {
        let info = MediaInfo {
            frame_rate: 30.0,
            duration: Some(10.5),
            ..Default::default()
        };
        assert_eq!(derive_frame_count(&info), Some(315));
    }

    #[test]
    fn test_derive_frame_count_unknown_without_duration() {
        assert_eq!(derive_frame_count(&MediaInfo::default()), None);
    }
}
