//! Per-stage progress bars using indicatif

use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Batch stage a progress bar reports on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Bom,
    Placement,
}

impl Stage {
    fn label(self) -> &'static str {
        match self {
            Stage::Bom => "BOM",
            Stage::Placement => "Placement",
        }
    }
}

/// Progress tracker shared by the BOM and placement stages
pub struct ProgressTracker {
    enabled: bool,
}

impl ProgressTracker {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Bar for one stage, or `None` when disabled or there is nothing to do
    pub fn start(&self, stage: Stage, total: usize) -> Option<ProgressBar> {
        if !self.enabled || total == 0 {
            return None;
        }

        let pb = ProgressBar::new(total as u64);
        pb.set_style(
            ProgressStyle::with_template("{prefix:>9.bold.cyan} [{bar:30.green}] {pos}/{len} {wide_msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
        );
        pb.set_prefix(stage.label());
        pb.enable_steady_tick(Duration::from_millis(120));

        debug!("{} stage: {} files queued", stage.label(), total);
        Some(pb)
    }

    /// Count one file and show its name
    pub fn advance(pb: &Option<ProgressBar>, file: &Path) {
        if let Some(progress) = pb {
            let name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            progress.set_message(name);
            progress.inc(1);
        }
    }

    /// Close the bar with the stage outcome
    pub fn finish(pb: Option<ProgressBar>, written: usize, skipped: usize) {
        if let Some(progress) = pb {
            progress.finish_with_message(format!("{} written, {} skipped", written, skipped));
        }
    }
}
