// upres-cli/src/cli.rs
//
// Defines the command-line argument structure using clap.

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "Upres: 4K video upscaling tool",
    long_about = "Upscales a video to 4K and re-targets the output file size \
                  proportionally to the resolution increase, using ffmpeg."
)]
pub struct Cli {
    /// Input video file to upscale
    #[arg(required = true, value_name = "INPUT_FILE")]
    pub input: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_input_path() {
        let cli = Cli::parse_from(["upres", "clip.mp4"]);
        assert_eq!(cli.input, PathBuf::from("clip.mp4"));
    }

    #[test]
    fn test_missing_input_is_an_error() {
        assert!(Cli::try_parse_from(["upres"]).is_err());
    }

    #[test]
    fn test_extra_positionals_are_rejected() {
        assert!(Cli::try_parse_from(["upres", "a.mp4", "b.mp4"]).is_err());
    }
}
