// upres-cli/src/terminal.rs
//
// Renders pipeline events as terminal progress. One bar is live at a time,
// matching the strictly sequential stage model.

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use upres_core::{PipelineEvent, PipelineStage};

fn stage_message(stage: PipelineStage) -> &'static str {
    match stage {
        PipelineStage::ExtractAudio => "Extracting audio",
        PipelineStage::ExtractFrames => "Extracting frames",
        PipelineStage::Upscale => "Upscaling frames",
        PipelineStage::Assemble => "Assembling video",
        PipelineStage::SizeTarget => "Re-encoding to target size",
    }
}

/// Terminal renderer for [`PipelineEvent`]s.
#[derive(Default)]
pub struct ProgressRenderer {
    bar: Option<ProgressBar>,
    has_length: bool,
}

impl ProgressRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prints a line without tearing an active progress bar.
    pub fn println(&self, msg: &str) {
        match &self.bar {
            Some(bar) => bar.println(msg),
            None => println!("{msg}"),
        }
    }

    pub fn handle(&mut self, event: PipelineEvent) {
        match event {
            PipelineEvent::StageStarted { stage } => {
                let bar = ProgressBar::new_spinner();
                bar.set_style(
                    ProgressStyle::with_template("{spinner:.green} {msg} (frame {pos})").unwrap(),
                );
                bar.set_message(stage_message(stage));
                self.has_length = false;
                self.bar = Some(bar);
            }
            PipelineEvent::StageProgress { frame, total, .. } => {
                if let Some(bar) = &self.bar {
                    if let Some(total) = total {
                        if !self.has_length {
                            bar.set_length(total);
                            bar.set_style(
                                ProgressStyle::with_template(
                                    "{spinner:.green} {msg} ({pos}/{len})",
                                )
                                .unwrap(),
                            );
                            self.has_length = true;
                        }
                    }
                    bar.set_position(frame);
                }
            }
            PipelineEvent::StageCompleted { stage } => {
                if let Some(bar) = self.bar.take() {
                    bar.finish_and_clear();
                }
                println!("{}... {}", stage_message(stage), style("Done").green());
            }
            PipelineEvent::Info(msg) => self.println(&msg),
        }
    }

    /// Clears any bar left behind by an aborted run.
    pub fn finish(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}
