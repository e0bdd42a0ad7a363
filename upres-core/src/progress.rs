//! Frame-progress monitoring over a live ffmpeg event stream.
//!
//! ffmpeg reports stats on stderr as `frame= 1234 fps=...` lines. The monitor
//! extracts the frames-processed counter from whatever the stream yields:
//! parsed progress events directly, and raw log lines by token scan. Lines
//! without a frame token (codec banners, warnings) are ignored. Monotonicity
//! is not enforced; the latest parsed value is current progress.

use ffmpeg_sidecar::event::FfmpegEvent;

/// Scans a line for a `frame=<integer>` token, whitespace-tolerant after `=`.
pub fn parse_frame_token(line: &str) -> Option<u64> {
    let start = line.find("frame=")? + "frame=".len();
    let rest = line[start..].trim_start();
    let digits: &str = {
        let end = rest
            .char_indices()
            .find(|(_, c)| !c.is_ascii_digit())
            .map_or(rest.len(), |(i, _)| i);
        &rest[..end]
    };
    digits.parse::<u64>().ok()
}

/// Tracks the frames-processed counter for one running stage.
///
/// Restartable only by constructing a fresh monitor for a new stream.
#[derive(Debug, Default)]
pub struct FrameMonitor {
    current: u64,
}

impl FrameMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest observed frame counter (0 until a frame token is seen).
    pub fn current(&self) -> u64 {
        self.current
    }

    /// Feeds one event to the monitor. Returns the updated counter when the
    /// event carried a frame number, `None` otherwise.
    pub fn observe(&mut self, event: &FfmpegEvent) -> Option<u64> {
        match event {
            FfmpegEvent::Progress(progress) => {
                self.current = u64::from(progress.frame);
                Some(self.current)
            }
            FfmpegEvent::Log(_, line) | FfmpegEvent::Error(line) => self.observe_line(line),
            _ => None,
        }
    }

    /// Feeds one raw output line to the monitor.
    pub fn observe_line(&mut self, line: &str) -> Option<u64> {
        let frame = parse_frame_token(line)?;
        self.current = frame;
        Some(frame)
    }
}
