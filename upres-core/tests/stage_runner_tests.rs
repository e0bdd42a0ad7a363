// upres-core/tests/stage_runner_tests.rs
//
// Stage runner behavior against scripted mock processes.
// Run with: cargo test --features test-mocks

#![cfg(feature = "test-mocks")]

use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::{FfmpegEvent, FfmpegProgress, LogLevel};
use upres_core::external::mocks::MockFfmpegSpawner;
use upres_core::external::run_stage;

fn marker_cmd() -> FfmpegCommand {
    let mut cmd = FfmpegCommand::new();
    cmd.arg("stage-marker");
    cmd
}

#[test]
fn test_run_stage_reports_frames_from_mixed_events() {
    let spawner = MockFfmpegSpawner::new();
    spawner.add_success_expectation(
        "stage-marker",
        vec![
            FfmpegEvent::Log(LogLevel::Info, "ffmpeg version 7.1".to_string()),
            FfmpegEvent::Log(LogLevel::Warning, "deprecated pixel format used".to_string()),
            FfmpegEvent::Error("frame=  10 fps= 30 q=1.0".to_string()),
            FfmpegEvent::Progress(FfmpegProgress {
                frame: 25,
                fps: 30.0,
                q: 1.0,
                size_kb: 0,
                time: "00:00:00.83".to_string(),
                bitrate_kbps: 0.0,
                speed: 1.0,
                raw_log_message: String::new(),
            }),
        ],
        false,
    );

    let mut seen = Vec::new();
    let (status, last_frame) = run_stage(&spawner, "test stage", marker_cmd(), |frame| {
        seen.push(frame);
    })
    .expect("run_stage should succeed");

    assert!(status.success());
    assert_eq!(seen, vec![10, 25]);
    assert_eq!(last_frame, 25);
}

#[test]
fn test_run_stage_returns_nonzero_status_without_error() {
    let spawner = MockFfmpegSpawner::new();
    spawner.add_exit_error_expectation("stage-marker", vec![], 1);

    // A failing stage is reported through the status, not an Err; the
    // orchestrator decides per stage whether that is fatal.
    let (status, last_frame) =
        run_stage(&spawner, "test stage", marker_cmd(), |_| {}).expect("no transport error");
    assert!(!status.success());
    assert_eq!(last_frame, 0);
}

#[test]
fn test_run_stage_ignores_bannered_output() {
    let spawner = MockFfmpegSpawner::new();
    spawner.add_success_expectation(
        "stage-marker",
        vec![
            FfmpegEvent::Log(LogLevel::Info, "Stream mapping:".to_string()),
            FfmpegEvent::Log(LogLevel::Info, "  Stream #0:0 -> #0:0 (h264 -> mjpeg)".to_string()),
        ],
        false,
    );

    let mut called = false;
    let (status, last_frame) = run_stage(&spawner, "test stage", marker_cmd(), |_| {
        called = true;
    })
    .expect("run_stage should succeed");

    assert!(status.success());
    assert!(!called, "no frame events should fire for bannered output");
    assert_eq!(last_frame, 0);
}
