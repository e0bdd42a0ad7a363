//! The upscaling pipeline state machine.
//!
//! Stages execute strictly one after another; each stage's output is the next
//! stage's required input, and the orchestrating thread blocks in the stage's
//! event-drain loop for its entire duration. This module is the only place
//! with cross-stage state: probed media properties, the running frame count,
//! and the artifact set.
//!
//! Stage fatality is decided here, not in the runner: audio extraction, frame
//! extraction, upscaling, and assembly abort the run on failure; the two-pass
//! size-targeting re-encode falls back to the assembled video instead.

use crate::artifacts::PipelineArtifacts;
use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult};
use crate::external::ffmpeg;
use crate::external::ffprobe::{MediaInfo, MediaProber};
use crate::external::get_file_size;
use crate::external::runner::{FfmpegSpawner, run_stage};
use crate::planning::{self, SizeTarget};
use crate::utils::format_bytes;

use ffmpeg_sidecar::command::FfmpegCommand;
use std::fmt;
use std::path::{Path, PathBuf};

/// One discrete, sequential step of the pipeline, bounded by a single ffmpeg
/// invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    ExtractAudio,
    ExtractFrames,
    Upscale,
    Assemble,
    SizeTarget,
}

impl PipelineStage {
    pub fn label(self) -> &'static str {
        match self {
            Self::ExtractAudio => "audio extraction",
            Self::ExtractFrames => "frame extraction",
            Self::Upscale => "upscaling",
            Self::Assemble => "assembly",
            Self::SizeTarget => "size targeting",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Progress and status signals surfaced to the caller while the pipeline
/// runs. Ephemeral; the CLI renders them and drops them.
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    StageStarted {
        stage: PipelineStage,
    },
    StageProgress {
        stage: PipelineStage,
        frame: u64,
        total: Option<u64>,
    },
    StageCompleted {
        stage: PipelineStage,
    },
    Info(String),
}

/// Summary of a completed pipeline run.
#[derive(Debug, Clone)]
pub struct UpscaleOutcome {
    pub source_width: Option<u32>,
    pub source_height: Option<u32>,
    pub target_width: u32,
    pub target_height: u32,
    pub frames: u64,
    pub input_size: u64,
    pub output_size: u64,
    pub target_size: Option<u64>,
    pub size_targeted: bool,
    pub final_path: PathBuf,
}

/// Runs the full pipeline for one input file.
///
/// Sequence: audio extraction, frame extraction, per-frame upscale, input
/// cleanup, assembly, size-convergence check, optional two-pass re-encode,
/// final cleanup. Returns the run summary, or the first fatal stage error.
pub fn upscale_video<S: FfmpegSpawner, P: MediaProber>(
    spawner: &S,
    prober: &P,
    config: &CoreConfig,
    input_path: &Path,
    on_event: &mut dyn FnMut(PipelineEvent),
) -> CoreResult<UpscaleOutcome> {
    let input_size = get_file_size(input_path)?;
    let artifacts = PipelineArtifacts::create(config)?;

    let info = prober.probe(input_path);
    let probed_total = prober.total_frames(input_path, &info);
    log::debug!(
        "Probed {}: {:?}x{:?} @ {} fps, duration {:?}, frames {:?}",
        input_path.display(),
        info.width,
        info.height,
        info.frame_rate,
        info.duration,
        probed_total
    );

    run_fatal_stage(
        spawner,
        PipelineStage::ExtractAudio,
        ffmpeg::extract_audio(input_path, artifacts.audio_path()),
        None,
        on_event,
    )?;

    let extracted = run_fatal_stage(
        spawner,
        PipelineStage::ExtractFrames,
        ffmpeg::extract_frames(input_path, artifacts.input_frames_dir()),
        probed_total,
        on_event,
    )?;
    // The extraction counter is authoritative; the probe total is a fallback
    // when the stream produced no stats lines.
    let frames = if extracted > 0 {
        extracted
    } else {
        probed_total.unwrap_or(0)
    };
    let frame_total = (frames > 0).then_some(frames);

    let (target_width, target_height) = planning::target_dimensions(info.width, info.height);
    run_fatal_stage(
        spawner,
        PipelineStage::Upscale,
        ffmpeg::upscale_frames(
            artifacts.input_frames_dir(),
            artifacts.output_frames_dir(),
            target_width,
            target_height,
        ),
        frame_total,
        on_event,
    )?;

    artifacts.clear_input_frames();

    run_fatal_stage(
        spawner,
        PipelineStage::Assemble,
        ffmpeg::assemble(
            artifacts.output_frames_dir(),
            artifacts.audio_path(),
            info.frame_rate,
            &config.assembled_path(),
        ),
        frame_total,
        on_event,
    )?;
    let assembled_size = get_file_size(&config.assembled_path())?;

    let mut final_path = config.assembled_path();
    let mut output_size = assembled_size;
    let mut size_targeted = false;
    let mut target_size = None;

    match (info.width, info.height) {
        (Some(w), Some(h)) if w > 0 && h > 0 => {
            let target =
                planning::target_size_bytes(input_size, (w, h), (target_width, target_height));
            target_size = Some(target);

            if planning::needs_retarget(assembled_size, target) {
                on_event(PipelineEvent::Info(format!(
                    "Retargeting file size (current ~{}, target ~{})",
                    format_bytes(assembled_size),
                    format_bytes(target)
                )));
                match run_size_target(
                    spawner, config, &artifacts, target, &info, frame_total, on_event,
                ) {
                    Ok(true) => {
                        final_path = config.targeted_path();
                        output_size = get_file_size(&final_path)?;
                        size_targeted = true;
                        on_event(PipelineEvent::Info("Size targeted.".to_string()));
                    }
                    Ok(false) => {}
                    Err(e) => {
                        log::warn!("Size targeting error: {e}");
                        on_event(PipelineEvent::Info(
                            "Size targeting failed; keeping original assembled video.".to_string(),
                        ));
                    }
                }
            } else {
                on_event(PipelineEvent::Info("Size already near target.".to_string()));
            }
        }
        _ => {
            on_event(PipelineEvent::Info(
                "Source resolution unknown; skipping size targeting.".to_string(),
            ));
        }
    }

    // Releases the run's temporaries: output frames and the audio track.
    drop(artifacts);

    Ok(UpscaleOutcome {
        source_width: info.width,
        source_height: info.height,
        target_width,
        target_height,
        frames,
        input_size,
        output_size,
        target_size,
        size_targeted,
        final_path,
    })
}

/// Runs one stage whose failure aborts the pipeline. Returns the final frame
/// counter the stage reported.
fn run_fatal_stage<S: FfmpegSpawner>(
    spawner: &S,
    stage: PipelineStage,
    cmd: FfmpegCommand,
    total: Option<u64>,
    on_event: &mut dyn FnMut(PipelineEvent),
) -> CoreResult<u64> {
    on_event(PipelineEvent::StageStarted { stage });
    let (status, frames) = run_stage(spawner, stage.label(), cmd, |frame| {
        on_event(PipelineEvent::StageProgress { stage, frame, total });
    })?;
    if !status.success() {
        return Err(CoreError::StageFailed {
            stage: stage.label().to_string(),
            status,
        });
    }
    on_event(PipelineEvent::StageCompleted { stage });
    Ok(frames)
}

/// Attempts the two-pass size-targeted re-encode of the assembled video.
///
/// Returns `Ok(true)` only when both passes succeed and the targeted output
/// materialized. `Ok(false)` covers every non-fatal skip or failure (the
/// caller has already been told via events). The transient pass statistics
/// are deleted on every path.
fn run_size_target<S: FfmpegSpawner>(
    spawner: &S,
    config: &CoreConfig,
    artifacts: &PipelineArtifacts,
    target_bytes: u64,
    info: &MediaInfo,
    frame_total: Option<u64>,
    on_event: &mut dyn FnMut(PipelineEvent),
) -> CoreResult<bool> {
    let plan: SizeTarget = match planning::plan_bitrate(target_bytes, info.duration) {
        Ok(plan) => plan,
        Err(_) => {
            on_event(PipelineEvent::Info(
                "Duration unknown; skipping size targeting.".to_string(),
            ));
            return Ok(false);
        }
    };

    on_event(PipelineEvent::Info(format!(
        "Targeting size ~{}, video bitrate ~{}k",
        format_bytes(plan.target_bytes),
        plan.video_bitrate_kbps
    )));
    on_event(PipelineEvent::StageStarted {
        stage: PipelineStage::SizeTarget,
    });

    let assembled = config.assembled_path();
    let result: CoreResult<bool> = (|| {
        let (pass1_status, _) = run_stage(
            spawner,
            "size target pass 1",
            ffmpeg::size_target_pass1(
                &assembled,
                plan.video_bitrate_kbps,
                artifacts.pass_log_prefix(),
            ),
            |frame| {
                on_event(PipelineEvent::StageProgress {
                    stage: PipelineStage::SizeTarget,
                    frame,
                    total: frame_total,
                });
            },
        )?;
        if !pass1_status.success() {
            return Ok(false);
        }

        let (pass2_status, _) = run_stage(
            spawner,
            "size target pass 2",
            ffmpeg::size_target_pass2(
                &assembled,
                plan.video_bitrate_kbps,
                artifacts.pass_log_prefix(),
                &config.targeted_path(),
            ),
            |frame| {
                on_event(PipelineEvent::StageProgress {
                    stage: PipelineStage::SizeTarget,
                    frame,
                    total: frame_total,
                });
            },
        )?;
        Ok(pass2_status.success())
    })();

    artifacts.remove_pass_logs();

    let passes_ok = result?;
    let materialized = passes_ok && config.targeted_path().is_file();
    if materialized {
        on_event(PipelineEvent::StageCompleted {
            stage: PipelineStage::SizeTarget,
        });
    } else {
        on_event(PipelineEvent::Info(
            "Size targeting failed; keeping original assembled video.".to_string(),
        ));
    }
    Ok(materialized)
}
