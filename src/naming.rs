//! Output file naming
//!
//! Batch runs and single-file runs use different separators (`pos_board.csv`
//! versus `pos-board.csv`). Both are kept because existing fabrication scripts
//! look for one or the other.

use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputNaming {
    /// `bom_<stem>.csv`, for XSLT converted BOM files
    Bom,
    /// `pos_<stem>.csv`, for every CSV in an input directory
    PlacementBatch,
    /// `pos-<stem>.csv`, for a single input file
    PlacementSingle,
}

impl OutputNaming {
    fn prefix(self) -> &'static str {
        match self {
            OutputNaming::Bom => "bom_",
            OutputNaming::PlacementBatch => "pos_",
            OutputNaming::PlacementSingle => "pos-",
        }
    }

    /// Output file name derived from the input's stem
    pub fn file_name(self, input: &Path) -> String {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy())
            .unwrap_or_default();
        format!("{}{}.csv", self.prefix(), stem)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_names() {
        let input = Path::new("input/board-top.csv");

        assert_eq!(OutputNaming::PlacementBatch.file_name(input), "pos_board-top.csv");
        assert_eq!(OutputNaming::PlacementSingle.file_name(input), "pos-board-top.csv");
        assert_eq!(
            OutputNaming::Bom.file_name(Path::new("input/board.v2.xml")),
            "bom_board.v2.csv"
        );
    }
}
