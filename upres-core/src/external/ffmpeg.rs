//! FFmpeg command construction for each pipeline stage.
//!
//! Every stage of the pipeline is one ffmpeg invocation. The builders here
//! produce fully-configured [`FfmpegCommand`] values; spawning and event
//! draining are the runner's concern. Flag sets are fixed: the container,
//! codec, and pixel-format choices are not negotiable per the pipeline
//! contract.

use crate::config::FRAME_EXTENSION;
use ffmpeg_sidecar::command::FfmpegCommand;
use std::path::Path;

/// Numbered-frame pattern (`%d.jpg`) inside the given directory.
pub fn frame_pattern(dir: &Path) -> String {
    dir.join(format!("%d.{FRAME_EXTENSION}"))
        .to_string_lossy()
        .into_owned()
}

/// Demuxes the input's audio track to a standalone file at best quality.
pub fn extract_audio(input: &Path, audio_out: &Path) -> FfmpegCommand {
    let mut cmd = FfmpegCommand::new();
    cmd.hide_banner()
        .args(["-loglevel", "error"])
        .overwrite()
        .input(input.to_string_lossy().as_ref())
        .args(["-q:a", "0"])
        .args(["-map", "a"])
        .output(audio_out.to_string_lossy().as_ref());
    cmd
}

/// Decodes the source into one still image per frame, numbered from 1.
pub fn extract_frames(input: &Path, frames_dir: &Path) -> FfmpegCommand {
    let mut cmd = FfmpegCommand::new();
    cmd.hide_banner()
        .args(["-loglevel", "warning"])
        .args(["-stats"])
        .overwrite()
        .input(input.to_string_lossy().as_ref())
        .args(["-q:v", "1"])
        .output(&frame_pattern(frames_dir));
    cmd
}

/// Scale-then-pad transform: scale preserving aspect ratio until the frame
/// fits inside the target box, then pad the remainder with black, centered.
fn scale_pad_filter(width: u32, height: u32) -> String {
    format!(
        "scale={width}:{height}:force_original_aspect_ratio=decrease,\
         pad={width}:{height}:(ow-iw)/2:(oh-ih)/2:black"
    )
}

/// Upscales the extracted frame sequence into the output directory, keeping
/// the numeric frame naming identical to the input sequence.
pub fn upscale_frames(
    in_dir: &Path,
    out_dir: &Path,
    width: u32,
    height: u32,
) -> FfmpegCommand {
    let mut cmd = FfmpegCommand::new();
    cmd.hide_banner()
        .args(["-loglevel", "warning"])
        .args(["-stats"])
        .overwrite()
        .input(&frame_pattern(in_dir))
        .args(["-vf", &scale_pad_filter(width, height)])
        .args(["-q:v", "1"])
        .output(&frame_pattern(out_dir));
    cmd
}

/// Muxes the upscaled frame sequence with the extracted audio track into the
/// final container at the source frame rate.
pub fn assemble(
    frames_dir: &Path,
    audio: &Path,
    frame_rate: f64,
    output: &Path,
) -> FfmpegCommand {
    let mut cmd = FfmpegCommand::new();
    cmd.hide_banner()
        .args(["-loglevel", "warning"])
        .args(["-stats"])
        .overwrite()
        .args(["-framerate", &frame_rate.to_string()])
        .input(&frame_pattern(frames_dir))
        .input(audio.to_string_lossy().as_ref())
        .args(["-c:v", "libx264"])
        .args(["-pix_fmt", "yuv420p"])
        .args(["-c:a", "aac"])
        .output(output.to_string_lossy().as_ref());
    cmd
}

/// Constant-bitrate rate-control arguments shared by both re-encode passes.
fn rate_control_args(cmd: &mut FfmpegCommand, video_bitrate_kbps: u32, pass_log_prefix: &Path) {
    cmd.args(["-c:v", "libx264"])
        .args(["-b:v", &format!("{video_bitrate_kbps}k")])
        .args(["-maxrate", &format!("{video_bitrate_kbps}k")])
        .args(["-bufsize", &format!("{}k", 2 * video_bitrate_kbps)])
        .args(["-passlogfile", pass_log_prefix.to_string_lossy().as_ref()]);
}

/// First analysis pass of the size-targeted re-encode. Writes only encoder
/// statistics; the bitstream goes to the platform null sink.
pub fn size_target_pass1(
    input: &Path,
    video_bitrate_kbps: u32,
    pass_log_prefix: &Path,
) -> FfmpegCommand {
    let null_sink = if cfg!(windows) { "NUL" } else { "/dev/null" };
    let mut cmd = FfmpegCommand::new();
    cmd.hide_banner()
        .args(["-loglevel", "error"])
        .args(["-stats"])
        .overwrite()
        .input(input.to_string_lossy().as_ref());
    rate_control_args(&mut cmd, video_bitrate_kbps, pass_log_prefix);
    cmd.args(["-pass", "1"])
        .args(["-an"])
        .args(["-f", "mp4"])
        .output(null_sink);
    cmd
}

/// Second pass of the size-targeted re-encode, producing the final bitstream
/// with the original audio track passed through unmodified.
pub fn size_target_pass2(
    input: &Path,
    video_bitrate_kbps: u32,
    pass_log_prefix: &Path,
    output: &Path,
) -> FfmpegCommand {
    let mut cmd = FfmpegCommand::new();
    cmd.hide_banner()
        .args(["-loglevel", "error"])
        .args(["-stats"])
        .overwrite()
        .input(input.to_string_lossy().as_ref());
    rate_control_args(&mut cmd, video_bitrate_kbps, pass_log_prefix);
    cmd.args(["-pass", "2"])
        .args(["-c:a", "copy"])
        .output(output.to_string_lossy().as_ref());
    cmd
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn args_of(cmd: &mut FfmpegCommand) -> Vec<String> {
        cmd.as_inner()
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_scale_pad_filter_centers_and_pads_black() {
        let filter = scale_pad_filter(3840, 2160);
        assert!(filter.starts_with("scale=3840:2160:force_original_aspect_ratio=decrease"));
        assert!(filter.ends_with("pad=3840:2160:(ow-iw)/2:(oh-ih)/2:black"));
    }

    #[test]
    fn test_frame_pattern_is_numeric_with_fixed_extension() {
        assert_eq!(
            frame_pattern(&PathBuf::from("/work/tmp/in")),
            "/work/tmp/in/%d.jpg"
        );
    }

    #[test]
    fn test_extract_audio_maps_audio_at_best_quality() {
        let mut cmd = extract_audio(Path::new("in.mp4"), Path::new("sound.mp3"));
        let args = args_of(&mut cmd);
        let q_pos = args.iter().position(|a| a == "-q:a").unwrap();
        assert_eq!(args[q_pos + 1], "0");
        assert!(args.windows(2).any(|w| w[0] == "-map" && w[1] == "a"));
    }

    #[test]
    fn test_assemble_uses_fixed_codecs() {
        let mut cmd = assemble(
            Path::new("/work/tmp/out"),
            Path::new("/work/sound.mp3"),
            29.97,
            Path::new("/work/final.mp4"),
        );
        let args = args_of(&mut cmd);
        assert!(args.windows(2).any(|w| w[0] == "-framerate" && w[1] == "29.97"));
        assert!(args.windows(2).any(|w| w[0] == "-c:v" && w[1] == "libx264"));
        assert!(args.windows(2).any(|w| w[0] == "-pix_fmt" && w[1] == "yuv420p"));
        assert!(args.windows(2).any(|w| w[0] == "-c:a" && w[1] == "aac"));
    }

    #[test]
    fn test_two_pass_commands_share_rate_control() {
        let prefix = PathBuf::from("/work/ffmpeg2pass");
        let mut p1 = size_target_pass1(Path::new("final.mp4"), 1500, &prefix);
        let mut p2 = size_target_pass2(
            Path::new("final.mp4"),
            1500,
            &prefix,
            Path::new("final_target.mp4"),
        );
        for cmd in [&mut p1, &mut p2] {
            let args = args_of(cmd);
            assert!(args.windows(2).any(|w| w[0] == "-b:v" && w[1] == "1500k"));
            assert!(args.windows(2).any(|w| w[0] == "-maxrate" && w[1] == "1500k"));
            assert!(args.windows(2).any(|w| w[0] == "-bufsize" && w[1] == "3000k"));
        }
        let args1 = args_of(&mut p1);
        assert!(args1.windows(2).any(|w| w[0] == "-pass" && w[1] == "1"));
        assert!(args1.contains(&"-an".to_string()));
        let args2 = args_of(&mut p2);
        assert!(args2.windows(2).any(|w| w[0] == "-pass" && w[1] == "2"));
        assert!(args2.windows(2).any(|w| w[0] == "-c:a" && w[1] == "copy"));
    }
}
