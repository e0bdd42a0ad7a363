//! Pipeline orchestration.

pub mod pipeline;

pub use pipeline::{PipelineEvent, PipelineStage, UpscaleOutcome, upscale_video};
