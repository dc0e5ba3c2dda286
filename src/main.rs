//! kicad-fab - Generate JLCPCB fabrication files from KiCad exports
//!
//! Converts XML BOM exports to grouped CSV through an XSLT stylesheet and
//! rewrites placement CSV headers, applying per-component adjustments.

use kicad_fab::{config::Config, converter::Converter, error::Result};
use tracing::{error, info};

fn main() -> Result<()> {
    // Parse configuration and initialize logging
    let config = Config::from_args().unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    });

    let mut converter = Converter::new(config);

    match converter.run() {
        Ok(()) => {
            let stats = converter.get_conversion_stats();
            info!(
                "Converted {} BOM files, wrote {} position files, skipped {} files, applied {} adjustments",
                stats.bom_files_converted,
                stats.placement_files_written,
                stats.files_skipped,
                stats.adjustments_applied
            );

            println!("Processed {} files", stats.total_files_processed());
            Ok(())
        }
        Err(e) => {
            error!("Processing failed: {:#}", e);
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}
