//! FFmpeg process supervision and the per-stage run loop.
//!
//! Spawning goes through the [`FfmpegSpawner`] trait so tests can substitute
//! scripted processes for real ffmpeg. While a stage runs, its combined
//! output stream is drained event-by-event; draining doubles as progress
//! extraction and keeps the child from stalling on a full pipe buffer.

use crate::error::{CoreResult, command_failed_error, command_start_error, command_wait_error};
use crate::progress::FrameMonitor;

use ffmpeg_sidecar::child::FfmpegChild as SidecarChild;
use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::FfmpegEvent;
use std::process::ExitStatus;

// --- FFmpeg Execution Abstraction ---

/// Trait representing an active ffmpeg process instance.
pub trait FfmpegProcess {
    /// Processes events from the running command using a provided handler closure.
    fn handle_events<F>(&mut self, handler: F) -> CoreResult<()>
    where
        F: FnMut(FfmpegEvent) -> CoreResult<()>;

    /// Waits for the command to complete and returns its exit status.
    fn wait(&mut self) -> CoreResult<ExitStatus>;
}

/// Trait representing something that can spawn an [`FfmpegProcess`].
pub trait FfmpegSpawner {
    type Process: FfmpegProcess;

    /// Spawns the ffmpeg command, consuming the command object.
    fn spawn(&self, cmd: FfmpegCommand) -> CoreResult<Self::Process>;
}

// --- Concrete Implementation using ffmpeg-sidecar ---

/// Wrapper around `ffmpeg_sidecar::child::FfmpegChild` implementing [`FfmpegProcess`].
pub struct SidecarProcess(SidecarChild);

impl FfmpegProcess for SidecarProcess {
    fn handle_events<F>(&mut self, mut handler: F) -> CoreResult<()>
    where
        F: FnMut(FfmpegEvent) -> CoreResult<()>,
    {
        let iterator = self.0.iter().map_err(|e| {
            log::error!("Failed to get ffmpeg event iterator: {e}");
            command_failed_error("ffmpeg (get iter)", ExitStatus::default(), e.to_string())
        })?;
        for event in iterator {
            handler(event)?;
        }
        Ok(())
    }

    fn wait(&mut self) -> CoreResult<ExitStatus> {
        self.0.wait().map_err(|e| command_wait_error("ffmpeg", e))
    }
}

/// Concrete implementation of [`FfmpegSpawner`] using ffmpeg-sidecar.
#[derive(Debug, Clone, Default)]
pub struct SidecarSpawner;

impl FfmpegSpawner for SidecarSpawner {
    type Process = SidecarProcess;

    fn spawn(&self, mut cmd: FfmpegCommand) -> CoreResult<Self::Process> {
        cmd.spawn()
            .map(SidecarProcess)
            .map_err(|e| command_start_error("ffmpeg", e))
    }
}

// --- Stage Runner ---

/// Launches one stage's ffmpeg invocation and blocks until it terminates.
///
/// The combined output stream is drained through a [`FrameMonitor`];
/// `on_frame` fires for every observed frame counter. Returns the process
/// exit status without judging it: a non-zero status is not automatically
/// fatal, the orchestrator decides per stage.
pub fn run_stage<S, F>(
    spawner: &S,
    stage_name: &str,
    mut cmd: FfmpegCommand,
    mut on_frame: F,
) -> CoreResult<(ExitStatus, u64)>
where
    S: FfmpegSpawner,
    F: FnMut(u64),
{
    log::debug!("Running {stage_name} command: {:?}", cmd.as_inner());

    let mut process = spawner.spawn(cmd)?;
    let mut monitor = FrameMonitor::new();

    process.handle_events(|event| {
        if let FfmpegEvent::Error(ref line) = event {
            log::debug!("{stage_name} stderr: {line}");
        }
        if let Some(frame) = monitor.observe(&event) {
            on_frame(frame);
        }
        Ok(())
    })?;

    let status = process.wait()?;
    if !status.success() {
        log::warn!("{stage_name} exited with status {status}");
    }
    Ok((status, monitor.current()))
}
