// upres-core/src/external/mocks.rs

// --- Mocking Infrastructure (for testing) ---

// This module is only compiled when the "test-mocks" feature is enabled.
#![cfg(feature = "test-mocks")]

use super::ffprobe::{MediaInfo, MediaProber};
use super::runner::{FfmpegProcess, FfmpegSpawner};
use crate::error::{CoreError, CoreResult};
use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::FfmpegEvent;
use std::cell::RefCell;
use std::os::unix::process::ExitStatusExt;
use std::path::Path;
use std::process::ExitStatus;
use std::rc::Rc;

/// Mock implementation of [`FfmpegProcess`].
#[derive(Clone)]
pub struct MockFfmpegProcess {
    /// Events to emit when handle_events is called.
    pub events_to_emit: Rc<RefCell<Vec<FfmpegEvent>>>,
    /// Exit status to return when wait is called.
    pub exit_status: ExitStatus,
}

impl FfmpegProcess for MockFfmpegProcess {
    fn handle_events<F>(&mut self, mut handler: F) -> CoreResult<()>
    where
        F: FnMut(FfmpegEvent) -> CoreResult<()>,
    {
        let events = self.events_to_emit.borrow().clone();
        for event in events {
            handler(event)?;
        }
        Ok(())
    }

    fn wait(&mut self) -> CoreResult<ExitStatus> {
        Ok(self.exit_status)
    }
}

/// Represents an expected ffmpeg command call and its mock result.
pub struct MockFfmpegExpectation {
    pub arg_pattern: String,
    pub result: CoreResult<MockFfmpegProcess>,
    /// When set, a dummy output file of this many bytes is created at the
    /// command's last argument (the output path).
    pub dummy_output_size: Option<u64>,
}

/// Mock implementation of [`FfmpegSpawner`] supporting multiple expectations.
///
/// Expectations are matched by substring against the spawned command's
/// argument list and consumed in order of match. An unmatched spawn panics,
/// surfacing unexpected pipeline invocations directly in the failing test.
#[derive(Clone, Default)]
pub struct MockFfmpegSpawner {
    expectations: Rc<RefCell<Vec<MockFfmpegExpectation>>>,
    received_calls: Rc<RefCell<Vec<Vec<String>>>>,
}

impl MockFfmpegSpawner {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn add_expectation(
        &self,
        arg_pattern: &str,
        result: CoreResult<MockFfmpegProcess>,
        dummy_output_size: Option<u64>,
    ) {
        self.expectations.borrow_mut().push(MockFfmpegExpectation {
            arg_pattern: arg_pattern.to_string(),
            result,
            dummy_output_size,
        });
    }

    pub fn add_success_expectation(
        &self,
        arg_pattern: &str,
        events: Vec<FfmpegEvent>,
        create_dummy_output: bool,
    ) {
        let process = MockFfmpegProcess {
            events_to_emit: Rc::new(RefCell::new(events)),
            exit_status: ExitStatus::from_raw(0),
        };
        self.add_expectation(arg_pattern, Ok(process), create_dummy_output.then_some(0));
    }

    /// Success expectation whose dummy output file has a specific size, for
    /// exercising the size-convergence decision.
    pub fn add_sized_success_expectation(
        &self,
        arg_pattern: &str,
        events: Vec<FfmpegEvent>,
        output_size: u64,
    ) {
        let process = MockFfmpegProcess {
            events_to_emit: Rc::new(RefCell::new(events)),
            exit_status: ExitStatus::from_raw(0),
        };
        self.add_expectation(arg_pattern, Ok(process), Some(output_size));
    }

    pub fn add_spawn_error_expectation(&self, arg_pattern: &str, error: CoreError) {
        self.add_expectation(arg_pattern, Err(error), None);
    }

    pub fn add_exit_error_expectation(
        &self,
        arg_pattern: &str,
        events: Vec<FfmpegEvent>,
        exit_code: i32,
    ) {
        let process = MockFfmpegProcess {
            events_to_emit: Rc::new(RefCell::new(events)),
            // from_raw takes a wait(2) status; shift the code into place
            exit_status: ExitStatus::from_raw(exit_code << 8),
        };
        self.add_expectation(arg_pattern, Ok(process), None);
    }

    pub fn get_received_calls(&self) -> Vec<Vec<String>> {
        self.received_calls.borrow().clone()
    }
}

impl FfmpegSpawner for MockFfmpegSpawner {
    type Process = MockFfmpegProcess;

    fn spawn(&self, mut cmd: FfmpegCommand) -> CoreResult<Self::Process> {
        let args: Vec<String> = cmd
            .as_inner()
            .get_args()
            .map(|s| s.to_string_lossy().into_owned())
            .collect();
        self.received_calls.borrow_mut().push(args.clone());

        let mut expectations = self.expectations.borrow_mut();
        let found_index = expectations
            .iter()
            .position(|exp| args.iter().any(|arg| arg.contains(&exp.arg_pattern)));

        let Some(index) = found_index else {
            panic!("MockFfmpegSpawner: No expectation found for command args: {args:?}");
        };
        let expectation = expectations.remove(index);
        log::debug!(
            "MockFfmpegSpawner: Matched expectation with pattern '{}'",
            expectation.arg_pattern
        );

        match expectation.result {
            Ok(process) => {
                if let Some(size) = expectation.dummy_output_size {
                    if let Some(output_path_str) = args.last() {
                        let output_path = std::path::PathBuf::from(output_path_str);
                        if let Some(parent) = output_path.parent() {
                            let _ = std::fs::create_dir_all(parent);
                        }
                        if let Err(e) = std::fs::write(&output_path, vec![0u8; size as usize]) {
                            log::error!(
                                "MockFfmpegSpawner failed to create dummy output {}: {e}",
                                output_path.display()
                            );
                        }
                    }
                }
                Ok(process)
            }
            Err(err) => {
                log::debug!(
                    "MockFfmpegSpawner simulating spawn error for pattern '{}': {err:?}",
                    expectation.arg_pattern
                );
                Err(err)
            }
        }
    }
}

/// Mock implementation of [`MediaProber`] returning canned metadata.
#[derive(Debug, Clone, Default)]
pub struct MockMediaProber {
    pub info: MediaInfo,
    pub frames: Option<u64>,
}

impl MockMediaProber {
    pub fn new(info: MediaInfo, frames: Option<u64>) -> Self {
        Self { info, frames }
    }
}

impl MediaProber for MockMediaProber {
    fn probe(&self, _input_path: &Path) -> MediaInfo {
        self.info.clone()
    }

    fn total_frames(&self, _input_path: &Path, _info: &MediaInfo) -> Option<u64> {
        self.frames
    }
}
