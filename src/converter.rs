//! Fabrication file conversion
//!
//! Runs the BOM stage (XML through XSLT) and the placement stage (header
//! rename and adjustments) over the configured inputs. Failures are contained
//! to the file that caused them; only a missing stylesheet stops the run.

use crate::{
    adjust::PlacementAdjustments,
    config::Config,
    discovery::find_files,
    error::{Result, ResultExt},
    naming::OutputNaming,
    placement::{transform, PlacementTable},
    progress::{ProgressTracker, Stage},
    xslt::{check_stylesheet, XsltProcessor, Xsltproc},
};
use anyhow::Context;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// The main conversion engine
pub struct Converter {
    config: Config,
    progress_tracker: ProgressTracker,
    processor: Box<dyn XsltProcessor>,
    adjustments: PlacementAdjustments,
    stats: ConversionStats,
}

impl Converter {
    /// Create a new converter with the given configuration
    pub fn new(config: Config) -> Self {
        let processor = Box::new(Xsltproc::new(config.xslt_program.clone()));
        Self::with_processor(config, processor)
    }

    /// Create a converter that uses a specific XSLT processor
    pub fn with_processor(config: Config, processor: Box<dyn XsltProcessor>) -> Self {
        let adjustments = PlacementAdjustments::from_specs(
            config.rotation_spec.as_deref(),
            config.x_spec.as_deref(),
            config.y_spec.as_deref(),
        );
        let progress_enabled = !config.no_progress;

        Self {
            config,
            progress_tracker: ProgressTracker::new(progress_enabled),
            processor,
            adjustments,
            stats: ConversionStats::default(),
        }
    }

    /// Run the configured stages
    pub fn run(&mut self) -> Result<()> {
        let start = std::time::Instant::now();
        info!("Starting file processing...");

        self.config
            .validate()
            .context("Configuration validation failed")?;

        if self.config.stages.convert_xml {
            check_stylesheet(&self.config.stylesheet_path).with_context(|| {
                format!(
                    "Current working directory: {}",
                    std::env::current_dir()
                        .map(|p| p.display().to_string())
                        .unwrap_or_default()
                )
            })?;
            self.convert_boms();
        }

        if self.config.stages.replace_header {
            self.replace_headers();
        }

        if self.stats.total_files_processed() == 0 {
            info!("No files were processed.");
        }

        info!("Processing finished in {} ms", start.elapsed().as_millis());
        Ok(())
    }

    /// Convert every XML file in the BOM folder
    fn convert_boms(&mut self) {
        let folder = self.config.xml_folder.clone();
        let files = self.discover(&folder, "xml");

        let progress = self.progress_tracker.start(Stage::Bom, files.len());

        let converted_before = self.stats.bom_files_converted;
        let skipped_before = self.stats.files_skipped;
        for file in &files {
            let output_name = OutputNaming::Bom.file_name(file);
            let output_path = self.config.output_path.join(&output_name);

            match self
                .processor
                .transform(&self.config.stylesheet_path, file, &output_path)
            {
                Ok(()) => {
                    info!("Generated BOM file: {}", output_name);
                    self.stats.bom_files_converted += 1;
                }
                Err(e) => {
                    warn!("Error converting BOM file {}: {}", file.display(), e);
                    self.stats.files_skipped += 1;
                }
            }

            ProgressTracker::advance(&progress, file);
        }

        ProgressTracker::finish(
            progress,
            self.stats.bom_files_converted - converted_before,
            self.stats.files_skipped - skipped_before,
        );

        if self.stats.bom_files_converted == converted_before {
            info!("No XML files were found for BOM generation.");
        }
    }

    /// Process the placement input, a single file or every CSV in a folder
    fn replace_headers(&mut self) {
        let input = self.config.input_path.clone();
        let written_before = self.stats.placement_files_written;

        if input.is_file() {
            self.process_placement(&input, OutputNaming::PlacementSingle);
        } else {
            let files = self.discover(&input, "csv");
            let progress = self.progress_tracker.start(Stage::Placement, files.len());
            let skipped_before = self.stats.files_skipped;

            for file in &files {
                self.process_placement(file, OutputNaming::PlacementBatch);
                ProgressTracker::advance(&progress, file);
            }

            ProgressTracker::finish(
                progress,
                self.stats.placement_files_written - written_before,
                self.stats.files_skipped - skipped_before,
            );
        }

        if self.stats.placement_files_written == written_before {
            info!("No CSV files were processed.");
        }
    }

    /// Convert one placement file, logging and counting a skip on failure
    fn process_placement(&mut self, input: &Path, naming: OutputNaming) {
        let output_name = naming.file_name(input);
        let output_path = self.config.output_path.join(&output_name);

        match self.convert_placement_file(input, &output_path) {
            Ok(adjusted) => {
                info!("Successfully processed: {}", output_path.display());
                info!("Generated position file: {}", output_name);
                self.stats.placement_files_written += 1;
                self.stats.adjustments_applied += adjusted;
            }
            Err(e) => {
                warn!("Error processing {}: {:#}", input.display(), e);
                self.stats.files_skipped += 1;
            }
        }
    }

    /// Read, transform and write one placement file. Returns the number of adjusted values.
    ///
    /// The underlying [`FabError`](crate::error::FabError) stays reachable through `downcast_ref`.
    pub fn convert_placement_file(&self, input: &Path, output: &Path) -> Result<usize> {
        let table = PlacementTable::read(input).with_path_context("read placement", input)?;
        let transformed =
            transform(table, &self.adjustments).with_path_context("adjust placement", input)?;
        transformed
            .table
            .write(output)
            .with_path_context("write position", output)?;
        Ok(transformed.adjustments.len())
    }

    /// List files for a stage; an unreadable folder counts as empty
    fn discover(&self, dir: &Path, extension: &str) -> Vec<PathBuf> {
        match find_files(dir, extension) {
            Ok(files) => {
                info!("Discovered {} .{} files in {}", files.len(), extension, dir.display());
                files
            }
            Err(e) => {
                warn!("Cannot scan for .{} files: {}", extension, e);
                Vec::new()
            }
        }
    }

    /// Adjustments parsed from the configuration
    pub fn adjustments(&self) -> &PlacementAdjustments {
        &self.adjustments
    }

    /// Get statistics about the conversion process
    pub fn get_conversion_stats(&self) -> ConversionStats {
        self.stats.clone()
    }
}

/// Statistics about the conversion process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionStats {
    pub bom_files_converted: usize,
    pub placement_files_written: usize,
    pub files_skipped: usize,
    pub adjustments_applied: usize,
}

impl ConversionStats {
    pub fn total_files_processed(&self) -> usize {
        self.bom_files_converted + self.placement_files_written
    }
}
