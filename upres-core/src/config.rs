//! Core configuration and pipeline constants.
//!
//! A [`CoreConfig`] is constructed once at startup (by upres-cli) and passed
//! by reference into each component. Every artifact path the pipeline touches
//! is derived from the work directory here, so no component reads ambient
//! global paths.

use std::path::PathBuf;

/// Fixed image extension for extracted and upscaled frames.
pub const FRAME_EXTENSION: &str = "jpg";

/// Audio bitrate reserved out of the total bitrate budget, in kbps.
pub const AUDIO_RESERVE_KBPS: u32 = 128;

/// Relative tolerance band around the size target. An assembled output within
/// this band of the target is accepted without re-encoding.
pub const SIZE_TOLERANCE: f64 = 0.10;

/// Frame rate assumed when the source frame rate cannot be determined.
pub const DEFAULT_FRAME_RATE: f64 = 30.0;

/// Long edge of the 4K target box.
pub const TARGET_LONG_EDGE: u32 = 3840;

/// Short edge of the 4K target box.
pub const TARGET_SHORT_EDGE: u32 = 2160;

/// Main configuration structure for the upres-core library.
///
/// Holds the work directory that owns every run artifact: the temporary frame
/// directories, the extracted audio track, the assembled video, and the
/// optional size-targeted video.
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Directory owning all pipeline artifacts for a run
    pub work_dir: PathBuf,
}

impl CoreConfig {
    pub fn new(work_dir: PathBuf) -> Self {
        Self { work_dir }
    }

    /// Directory receiving one still image per source frame.
    pub fn input_frames_dir(&self) -> PathBuf {
        self.work_dir.join("tmp").join("in")
    }

    /// Directory receiving the upscaled frames.
    pub fn output_frames_dir(&self) -> PathBuf {
        self.work_dir.join("tmp").join("out")
    }

    /// Standalone audio track demuxed from the input.
    pub fn audio_path(&self) -> PathBuf {
        self.work_dir.join("sound.mp3")
    }

    /// First assembled video, prior to any size targeting.
    pub fn assembled_path(&self) -> PathBuf {
        self.work_dir.join("final.mp4")
    }

    /// Size-targeted video, produced only when the two-pass re-encode runs.
    pub fn targeted_path(&self) -> PathBuf {
        self.work_dir.join("final_target.mp4")
    }

    /// Prefix for the two-pass encoder statistics files.
    pub fn pass_log_prefix(&self) -> PathBuf {
        self.work_dir.join("ffmpeg2pass")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_derive_from_work_dir() {
        let config = CoreConfig::new(PathBuf::from("/srv/app"));
        assert_eq!(config.input_frames_dir(), PathBuf::from("/srv/app/tmp/in"));
        assert_eq!(config.output_frames_dir(), PathBuf::from("/srv/app/tmp/out"));
        assert_eq!(config.audio_path(), PathBuf::from("/srv/app/sound.mp3"));
        assert_eq!(config.assembled_path(), PathBuf::from("/srv/app/final.mp4"));
        assert_eq!(
            config.targeted_path(),
            PathBuf::from("/srv/app/final_target.mp4")
        );
    }
}
