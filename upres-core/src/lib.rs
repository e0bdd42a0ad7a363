//! Core library for upscaling videos to 4K using ffmpeg and ffprobe.
//!
//! This crate orchestrates an external ffmpeg capability through a sequential
//! pipeline: audio extraction, per-frame decode, scale-and-pad upscaling,
//! reassembly, and an optional two-pass re-encode that targets an output file
//! size proportional to the resolution increase.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use upres_core::{CoreConfig, CrateFfprobeProber, SidecarSpawner, upscale_video};
//! use std::path::{Path, PathBuf};
//!
//! upres_core::ensure_dependencies().unwrap();
//! let config = CoreConfig::new(PathBuf::from("app"));
//! let outcome = upscale_video(
//!     &SidecarSpawner,
//!     &CrateFfprobeProber,
//!     &config,
//!     Path::new("input.mp4"),
//!     &mut |_event| {},
//! )
//! .unwrap();
//! println!("final video: {}", outcome.final_path.display());
//! ```

pub mod artifacts;
pub mod config;
pub mod error;
pub mod external;
pub mod planning;
pub mod processing;
pub mod progress;
pub mod utils;

// Re-exports for public API
pub use artifacts::PipelineArtifacts;
pub use config::CoreConfig;
pub use error::{CoreError, CoreResult};
pub use external::ffprobe::{CrateFfprobeProber, MediaInfo, MediaProber, parse_frame_rate};
pub use external::{
    FfmpegProcess, FfmpegSpawner, SidecarSpawner, check_dependency, ensure_dependencies,
    get_file_size,
};
pub use planning::{SizeTarget, needs_retarget, plan_bitrate, target_dimensions, target_size_bytes};
pub use processing::{PipelineEvent, PipelineStage, UpscaleOutcome, upscale_video};
pub use progress::{FrameMonitor, parse_frame_token};
pub use utils::{format_bytes, format_duration};
