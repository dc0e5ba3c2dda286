//! Configuration management for kicad-fab
//!
//! This module handles CLI argument parsing and application settings.

use anyhow::{Context, Result};
use clap::builder::styling;
use clap::{value_parser, Arg, ArgMatches, ColorChoice, Command};
use std::path::PathBuf;
use tracing::info;

use crate::adjust::ADJUSTMENT_FORMAT;
use crate::xslt::{DEFAULT_PROCESSOR, DEFAULT_STYLESHEET};

/// Build the CLI command
pub fn build_cli() -> Command {
    let styles = styling::Styles::styled()
        .header(styling::AnsiColor::Green.on_default() | styling::Effects::BOLD)
        .usage(styling::AnsiColor::Green.on_default() | styling::Effects::BOLD)
        .literal(styling::AnsiColor::Blue.on_default() | styling::Effects::BOLD)
        .placeholder(styling::AnsiColor::Cyan.on_default());

    Command::new("kicad-fab")
        .about("kicad-fab - KiCad fabrication file generator for JLCPCB")
        .version(env!("CARGO_PKG_VERSION"))
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new("convert_xml")
                .long("convert-xml")
                .help("Convert XML BOM files to CSV")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("replace_header")
                .long("replace-header")
                .help("Replace placement CSV headers and apply adjustments")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("folder")
                .short('f')
                .long("folder")
                .help("Folder scanned for XML BOM files")
                .value_parser(value_parser!(PathBuf))
                .default_value("input"),
        )
        .arg(
            Arg::new("xslt")
                .short('x')
                .long("xslt")
                .help("XSLT stylesheet used for BOM conversion")
                .value_parser(value_parser!(PathBuf))
                .default_value(DEFAULT_STYLESHEET),
        )
        .arg(
            Arg::new("xsltproc")
                .long("xsltproc")
                .help("XSLT processor executable")
                .value_parser(value_parser!(String))
                .default_value(DEFAULT_PROCESSOR),
        )
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .help("Placement CSV file or folder")
                .value_parser(value_parser!(PathBuf))
                .default_value("input"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .help("Output directory")
                .value_parser(value_parser!(PathBuf))
                .default_value("output"),
        )
        .arg(
            Arg::new("adjust_rotation")
                .long("adjust-rotation")
                .help("Adjust rotation for specific components (format: \"C1:+90,R2:-180\")")
                .value_parser(value_parser!(String)),
        )
        .arg(
            Arg::new("adjust_x")
                .long("adjust-x")
                .help(format!("Adjust X coordinates (format: \"{}\")", ADJUSTMENT_FORMAT))
                .value_parser(value_parser!(String)),
        )
        .arg(
            Arg::new("adjust_y")
                .long("adjust-y")
                .help(format!("Adjust Y coordinates (format: \"{}\")", ADJUSTMENT_FORMAT))
                .value_parser(value_parser!(String)),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging output")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("no_progress")
                .long("no-progress")
                .help("Disable progress indicators")
                .action(clap::ArgAction::SetTrue),
        )
}

/// Which stages a run performs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stages {
    pub convert_xml: bool,
    pub replace_header: bool,
}

impl Stages {
    /// Neither switch means both stages
    pub fn from_flags(convert_xml: bool, replace_header: bool) -> Self {
        if convert_xml || replace_header {
            Self {
                convert_xml,
                replace_header,
            }
        } else {
            Self::all()
        }
    }

    pub fn all() -> Self {
        Self {
            convert_xml: true,
            replace_header: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Stages to run
    pub stages: Stages,

    /// Folder scanned for XML BOM files
    pub xml_folder: PathBuf,

    /// XSLT stylesheet for the BOM stage
    pub stylesheet_path: PathBuf,

    /// XSLT processor executable
    pub xslt_program: String,

    /// Placement CSV file or folder
    pub input_path: PathBuf,

    /// Output directory path
    pub output_path: PathBuf,

    /// Raw rotation adjustment list
    pub rotation_spec: Option<String>,

    /// Raw X adjustment list
    pub x_spec: Option<String>,

    /// Raw Y adjustment list
    pub y_spec: Option<String>,

    /// Enable verbose logging
    pub verbose: bool,

    /// Disable progress bars
    pub no_progress: bool,
}

impl Config {
    /// Parse arguments and apply initial configuration
    pub fn from_args() -> Result<Self> {
        let matches = build_cli().get_matches();
        let config = Self::from_matches(&matches);

        init_tracing(config.verbose);

        if config.verbose {
            info!("Configuration: {:?}", config);
        }

        Ok(config)
    }

    /// Build a configuration from already parsed arguments
    pub fn from_matches(matches: &ArgMatches) -> Self {
        let path = |id: &str, default: &str| {
            matches
                .get_one::<PathBuf>(id)
                .cloned()
                .unwrap_or_else(|| PathBuf::from(default))
        };

        Config {
            stages: Stages::from_flags(
                matches.get_flag("convert_xml"),
                matches.get_flag("replace_header"),
            ),
            xml_folder: path("folder", "input"),
            stylesheet_path: path("xslt", DEFAULT_STYLESHEET),
            xslt_program: matches
                .get_one::<String>("xsltproc")
                .cloned()
                .unwrap_or_else(|| DEFAULT_PROCESSOR.to_string()),
            input_path: path("input", "input"),
            output_path: path("output", "output"),
            rotation_spec: matches.get_one::<String>("adjust_rotation").cloned(),
            x_spec: matches.get_one::<String>("adjust_x").cloned(),
            y_spec: matches.get_one::<String>("adjust_y").cloned(),
            verbose: matches.get_flag("verbose"),
            no_progress: matches.get_flag("no_progress"),
        }
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<()> {
        // Create output directory if it doesn't exist
        if !self.output_path.exists() {
            std::fs::create_dir_all(&self.output_path).with_context(|| {
                format!(
                    "Failed to create output directory: {}",
                    self.output_path.display()
                )
            })?;
            info!("Created output directory: {}", self.output_path.display());
        }

        if !self.output_path.is_dir() {
            anyhow::bail!(
                "Output path is not a directory: {}",
                self.output_path.display()
            );
        }

        info!("Configuration validation completed successfully");
        Ok(())
    }
}

/// Set up tracing; RUST_LOG takes precedence over the verbose flag
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}
