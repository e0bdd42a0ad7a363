//! Run-owned pipeline artifacts and their lifecycle.
//!
//! A [`PipelineArtifacts`] value owns the temporary locations a run populates:
//! the input- and output-frame directories, the extracted audio track, and the
//! two-pass statistics files. Mid-pipeline cleanup (input frames after the
//! upscale consumes them) is explicit; end-of-run cleanup of the output frames
//! and audio happens in `Drop`, so it runs on every exit path. All deletion is
//! best-effort: failures are logged and never propagated.

use crate::config::CoreConfig;
use crate::error::CoreResult;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct PipelineArtifacts {
    input_frames_dir: PathBuf,
    output_frames_dir: PathBuf,
    audio_path: PathBuf,
    pass_log_prefix: PathBuf,
}

impl PipelineArtifacts {
    /// Creates the frame directories (if absent) and claims ownership of the
    /// run's temporary locations.
    pub fn create(config: &CoreConfig) -> CoreResult<Self> {
        let artifacts = Self {
            input_frames_dir: config.input_frames_dir(),
            output_frames_dir: config.output_frames_dir(),
            audio_path: config.audio_path(),
            pass_log_prefix: config.pass_log_prefix(),
        };
        std::fs::create_dir_all(&artifacts.input_frames_dir)?;
        std::fs::create_dir_all(&artifacts.output_frames_dir)?;
        Ok(artifacts)
    }

    pub fn input_frames_dir(&self) -> &Path {
        &self.input_frames_dir
    }

    pub fn output_frames_dir(&self) -> &Path {
        &self.output_frames_dir
    }

    pub fn audio_path(&self) -> &Path {
        &self.audio_path
    }

    pub fn pass_log_prefix(&self) -> &Path {
        &self.pass_log_prefix
    }

    /// Deletes every extracted source frame once the upscale has consumed
    /// them.
    pub fn clear_input_frames(&self) {
        clear_dir(&self.input_frames_dir);
    }

    /// Deletes the two-pass encoder statistics files, run regardless of the
    /// re-encode's outcome.
    pub fn remove_pass_logs(&self) {
        let prefix = self.pass_log_prefix.to_string_lossy();
        for path in [
            PathBuf::from(format!("{prefix}-0.log")),
            PathBuf::from(format!("{prefix}-0.log.mbtree")),
        ] {
            if path.exists() {
                if let Err(e) = std::fs::remove_file(&path) {
                    log::warn!("Failed to remove pass log {}: {e}", path.display());
                }
            }
        }
    }
}

impl Drop for PipelineArtifacts {
    fn drop(&mut self) {
        clear_dir(&self.output_frames_dir);
        if self.audio_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.audio_path) {
                log::warn!(
                    "Failed to remove extracted audio {}: {e}",
                    self.audio_path.display()
                );
            }
        }
    }
}

/// Removes every file directly inside `dir`, swallowing individual failures.
fn clear_dir(dir: &Path) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            log::warn!("Failed to read {} for cleanup: {e}", dir.display());
            return;
        }
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_file() {
            if let Err(e) = std::fs::remove_file(&path) {
                log::warn!("Failed to remove {}: {e}", path.display());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::tempdir;

    #[test]
    fn test_create_makes_frame_dirs() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let config = CoreConfig::new(dir.path().to_path_buf());
        let artifacts = PipelineArtifacts::create(&config)?;
        assert!(artifacts.input_frames_dir().is_dir());
        assert!(artifacts.output_frames_dir().is_dir());
        Ok(())
    }

    #[test]
    fn test_clear_input_frames_empties_directory() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let config = CoreConfig::new(dir.path().to_path_buf());
        let artifacts = PipelineArtifacts::create(&config)?;

        for n in 1..=3 {
            File::create(artifacts.input_frames_dir().join(format!("{n}.jpg")))?;
        }
        artifacts.clear_input_frames();
        assert_eq!(std::fs::read_dir(artifacts.input_frames_dir())?.count(), 0);
        Ok(())
    }

    #[test]
    fn test_drop_removes_output_frames_and_audio() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let config = CoreConfig::new(dir.path().to_path_buf());
        {
            let artifacts = PipelineArtifacts::create(&config)?;
            File::create(artifacts.output_frames_dir().join("1.jpg"))?;
            File::create(artifacts.audio_path())?;
        }
        assert_eq!(std::fs::read_dir(config.output_frames_dir())?.count(), 0);
        assert!(!config.audio_path().exists());
        Ok(())
    }

    #[test]
    fn test_remove_pass_logs_deletes_stat_files() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let config = CoreConfig::new(dir.path().to_path_buf());
        let artifacts = PipelineArtifacts::create(&config)?;

        let log = PathBuf::from(format!("{}-0.log", config.pass_log_prefix().display()));
        let mbtree = PathBuf::from(format!("{}-0.log.mbtree", config.pass_log_prefix().display()));
        File::create(&log)?;
        File::create(&mbtree)?;

        artifacts.remove_pass_logs();
        assert!(!log.exists());
        assert!(!mbtree.exists());
        Ok(())
    }
}
