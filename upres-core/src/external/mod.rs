//! Interactions with the external ffmpeg/ffprobe tools.
//!
//! This module encapsulates everything that crosses the process boundary:
//! dependency preflight checks, metadata probing, stage command construction,
//! and process supervision. The runner submodule exposes spawning through a
//! trait so tests can substitute a mock instead of launching real processes.

use crate::error::{CoreError, CoreResult};

use std::io;
use std::path::Path;
use std::process::{Command, Stdio};

/// Stage command builders for each pipeline step
pub mod ffmpeg;

/// Metadata probing via ffprobe
pub mod ffprobe;

/// Process spawning traits and the stage runner
pub mod runner;

/// Mock spawner for tests (compiled only with the `test-mocks` feature)
pub mod mocks;

pub use runner::{FfmpegProcess, FfmpegSpawner, SidecarProcess, SidecarSpawner, run_stage};

/// Checks if a required external command is available and executable.
///
/// Runs `<cmd> -version` with output discarded. A `NotFound` spawn error maps
/// to [`CoreError::DependencyNotFound`]; any other spawn failure maps to
/// [`CoreError::CommandStart`].
pub fn check_dependency(cmd_name: &str) -> CoreResult<()> {
    let result = Command::new(cmd_name)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match result {
        Ok(_) => {
            log::debug!("Found dependency: {cmd_name}");
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::warn!("Dependency '{cmd_name}' not found.");
            Err(CoreError::DependencyNotFound(cmd_name.to_string()))
        }
        Err(e) => {
            log::error!("Failed to start dependency check command '{cmd_name}': {e}");
            Err(CoreError::CommandStart(cmd_name.to_string(), e))
        }
    }
}

/// Verifies that both ffmpeg and ffprobe are locatable.
///
/// Called before any stage runs or any filesystem path is touched.
pub fn ensure_dependencies() -> CoreResult<()> {
    check_dependency("ffmpeg")?;
    check_dependency("ffprobe")?;
    Ok(())
}

/// Gets the size of the file at the given path in bytes.
pub fn get_file_size(path: &Path) -> CoreResult<u64> {
    Ok(std::fs::metadata(path)?.len())
}
