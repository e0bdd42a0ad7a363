//! Bitrate planning and the size-convergence decision.
//!
//! The size target tracks the input file size scaled by the pixel-area ratio
//! of target to source resolution. The bitrate split is a constant-bitrate
//! approximation with a fixed audio reserve; the goal is file-size proximity,
//! not perceptual quality.

use crate::config::{
    AUDIO_RESERVE_KBPS, SIZE_TOLERANCE, TARGET_LONG_EDGE, TARGET_SHORT_EDGE,
};
use crate::error::{CoreError, CoreResult};

/// Target output size and the video bitrate that should land there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeTarget {
    pub target_bytes: u64,
    pub video_bitrate_kbps: u32,
}

/// Computes the video bitrate for a target size over a known duration.
///
/// Reserves [`AUDIO_RESERVE_KBPS`] out of the total budget; every
/// intermediate quantity is floored at 1 so degenerate inputs still yield a
/// usable rate. Fails when the duration is unknown or non-positive.
pub fn plan_bitrate(target_bytes: u64, duration: Option<f64>) -> CoreResult<SizeTarget> {
    let duration = duration
        .filter(|d| *d > 0.0)
        .ok_or_else(|| CoreError::SizeTargetUnavailable("duration unknown".to_string()))?;

    let total_bps = (((target_bytes as f64) * 8.0 / duration) as i64).max(1);
    let video_bps = (total_bps - i64::from(AUDIO_RESERVE_KBPS) * 1000).max(1);
    let video_bitrate_kbps = (video_bps / 1000).max(1) as u32;

    Ok(SizeTarget {
        target_bytes,
        video_bitrate_kbps,
    })
}

/// Chooses the 4K target box so the longer source dimension maps to the long
/// edge, preserving orientation. Unknown source dimensions default to
/// landscape.
#[must_use]
pub fn target_dimensions(width: Option<u32>, height: Option<u32>) -> (u32, u32) {
    match (width, height) {
        (Some(w), Some(h)) if w < h => (TARGET_SHORT_EDGE, TARGET_LONG_EDGE),
        _ => (TARGET_LONG_EDGE, TARGET_SHORT_EDGE),
    }
}

/// Scales the input file size by the target-to-source pixel-area ratio.
#[must_use]
pub fn target_size_bytes(input_size: u64, source: (u32, u32), target: (u32, u32)) -> u64 {
    let source_area = f64::from(source.0) * f64::from(source.1);
    let target_area = f64::from(target.0) * f64::from(target.1);
    if source_area <= 0.0 {
        return 0;
    }
    (input_size as f64 * target_area / source_area) as u64
}

/// Size-convergence decision: re-encode only when the assembled output falls
/// outside the tolerance band around the target.
#[must_use]
pub fn needs_retarget(actual_bytes: u64, target_bytes: u64) -> bool {
    if target_bytes == 0 {
        return false;
    }
    let deviation = (actual_bytes as f64 - target_bytes as f64).abs() / target_bytes as f64;
    deviation > SIZE_TOLERANCE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_bitrate_matches_budget_split() {
        // 200 MB over 10 seconds: 160_000 kbps total, minus the audio reserve.
        let target = plan_bitrate(200_000_000, Some(10.0)).unwrap();
        assert_eq!(target.video_bitrate_kbps, 160_000 - 128);
        assert_eq!(target.target_bytes, 200_000_000);
    }

    #[test]
    fn test_plan_bitrate_floors_at_one() {
        // Budget smaller than the audio reserve still yields 1 kbps.
        let target = plan_bitrate(1_000, Some(60.0)).unwrap();
        assert_eq!(target.video_bitrate_kbps, 1);

        let target = plan_bitrate(0, Some(10.0)).unwrap();
        assert_eq!(target.video_bitrate_kbps, 1);
    }

    #[test]
    fn test_plan_bitrate_requires_known_positive_duration() {
        assert!(matches!(
            plan_bitrate(1_000_000, None),
            Err(CoreError::SizeTargetUnavailable(_))
        ));
        assert!(plan_bitrate(1_000_000, Some(0.0)).is_err());
        assert!(plan_bitrate(1_000_000, Some(-5.0)).is_err());
    }

    #[test]
    fn test_target_dimensions_preserve_orientation() {
        assert_eq!(target_dimensions(Some(1920), Some(1080)), (3840, 2160));
        assert_eq!(target_dimensions(Some(1080), Some(1920)), (2160, 3840));
        // Square sources count as landscape.
        assert_eq!(target_dimensions(Some(1000), Some(1000)), (3840, 2160));
    }

    #[test]
    fn test_target_dimensions_default_when_unknown() {
        assert_eq!(target_dimensions(None, None), (3840, 2160));
        assert_eq!(target_dimensions(Some(1080), None), (3840, 2160));
        assert_eq!(target_dimensions(None, Some(1920)), (3840, 2160));
    }

    #[test]
    fn test_target_size_scales_by_area_ratio() {
        // 1080p to 4K quadruples the pixel area.
        assert_eq!(
            target_size_bytes(50_000_000, (1920, 1080), (3840, 2160)),
            200_000_000
        );
        assert_eq!(target_size_bytes(0, (1920, 1080), (3840, 2160)), 0);
        assert_eq!(target_size_bytes(50_000_000, (0, 1080), (3840, 2160)), 0);
    }

    #[test]
    fn test_needs_retarget_tolerance_band() {
        let target = 200_000_000;
        // 25% under target triggers re-encoding.
        assert!(needs_retarget(150_000_000, target));
        // 2.5% under target is within the band.
        assert!(!needs_retarget(195_000_000, target));
        // Band edges: exactly 10% off is accepted.
        assert!(!needs_retarget(180_000_000, target));
        assert!(!needs_retarget(220_000_000, target));
        assert!(needs_retarget(179_999_999, target));
        assert!(needs_retarget(220_000_001, target));
        // Oversized outputs trigger too.
        assert!(needs_retarget(300_000_000, target));
    }
}
