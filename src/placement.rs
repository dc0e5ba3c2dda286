//! Pick-and-place tables
//!
//! KiCad exports component placement as a seven column CSV. JLCPCB expects the
//! same columns under different names, so the conversion is a header rename plus
//! optional per-designator coordinate adjustments.

use std::fs::File;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Terminator, WriterBuilder};
use tracing::debug;

use crate::adjust::{Adjustment, Axis, PlacementAdjustments};
use crate::error::FabError;

/// Header written by the KiCad position file exporter
pub const INPUT_HEADER: [&str; 7] = ["Ref", "Val", "Package", "PosX", "PosY", "Rot", "Side"];

/// Header expected by the JLCPCB assembly service
pub const OUTPUT_HEADER: [&str; 7] = [
    "Designator",
    "Val",
    "Package",
    "Mid X",
    "Mid Y",
    "Rotation",
    "Layer",
];

/// One component row. Values are kept as text so untouched rows are written back verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub designator: String,
    pub value: String,
    pub package: String,
    pub pos_x: String,
    pub pos_y: String,
    pub rotation: String,
    pub side: String,
}

impl Placement {
    pub const COLUMNS: usize = 7;

    pub fn from_fields(fields: [&str; 7]) -> Self {
        let [designator, value, package, pos_x, pos_y, rotation, side] = fields;
        Self {
            designator: designator.to_string(),
            value: value.to_string(),
            package: package.to_string(),
            pos_x: pos_x.to_string(),
            pos_y: pos_y.to_string(),
            rotation: rotation.to_string(),
            side: side.to_string(),
        }
    }

    fn from_record(record: &StringRecord) -> Result<Self, FabError> {
        if record.len() != Self::COLUMNS {
            return Err(FabError::MalformedRow {
                line: record.position().map(|p| p.line()).unwrap_or_default(),
                expected: Self::COLUMNS,
                found: record.len(),
            });
        }

        Ok(Self {
            designator: record[0].to_string(),
            value: record[1].to_string(),
            package: record[2].to_string(),
            pos_x: record[3].to_string(),
            pos_y: record[4].to_string(),
            rotation: record[5].to_string(),
            side: record[6].to_string(),
        })
    }

    /// Fields in column order
    pub fn fields(&self) -> [&str; 7] {
        [
            &self.designator,
            &self.value,
            &self.package,
            &self.pos_x,
            &self.pos_y,
            &self.rotation,
            &self.side,
        ]
    }

    /// Input column name for a zero-based column index
    pub fn column_name(column: usize) -> &'static str {
        INPUT_HEADER.get(column).copied().unwrap_or("?")
    }

    pub(crate) fn axis_field_mut(&mut self, axis: Axis) -> &mut String {
        match axis {
            Axis::X => &mut self.pos_x,
            Axis::Y => &mut self.pos_y,
            Axis::Rotation => &mut self.rotation,
        }
    }
}

/// Header plus rows, read fully into memory
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementTable {
    pub header: Vec<String>,
    pub rows: Vec<Placement>,
}

/// Result of a successful [`transform`]
#[derive(Debug, Clone)]
pub struct Transformed {
    pub table: PlacementTable,
    pub adjustments: Vec<Adjustment>,
}

impl PlacementTable {
    pub fn new(header: &[&str], rows: Vec<Placement>) -> Self {
        Self {
            header: header.iter().map(|s| s.to_string()).collect(),
            rows,
        }
    }

    /// Read a KiCad placement CSV.
    ///
    /// The header must be exactly [`INPUT_HEADER`]; it is checked before any row is read.
    pub fn read(path: &Path) -> Result<Self, FabError> {
        Self::read_with_header(path, &INPUT_HEADER)
    }

    /// Read a placement CSV whose header must equal `expected`
    pub fn read_with_header(path: &Path, expected: &[&str; 7]) -> Result<Self, FabError> {
        let file = File::open(path).map_err(|e| FabError::io(path, e))?;
        let mut reader = ReaderBuilder::new().has_headers(false).from_reader(file);

        let mut records = reader.records();
        let header: Vec<String> = match records.next() {
            Some(record) => record
                .map_err(|e| FabError::csv(path, e))?
                .iter()
                .map(str::to_string)
                .collect(),
            None => Vec::new(),
        };

        if header != *expected {
            return Err(schema_mismatch(expected, &header));
        }

        let rows = records
            .map(|record| {
                let record = record.map_err(|e| FabError::csv(path, e))?;
                Placement::from_record(&record)
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!("Read {} placement rows from {}", rows.len(), path.display());
        Ok(Self { header, rows })
    }

    /// Write the table as CSV with minimal quoting and CRLF line endings
    pub fn write(&self, path: &Path) -> Result<(), FabError> {
        let mut writer = WriterBuilder::new()
            .terminator(Terminator::CRLF)
            .from_path(path)
            .map_err(|e| FabError::csv(path, e))?;

        writer
            .write_record(&self.header)
            .map_err(|e| FabError::csv(path, e))?;
        for row in &self.rows {
            writer
                .write_record(row.fields())
                .map_err(|e| FabError::csv(path, e))?;
        }
        writer.flush().map_err(|e| FabError::io(path, e))?;

        debug!("Wrote {} placement rows to {}", self.rows.len(), path.display());
        Ok(())
    }
}

fn schema_mismatch(expected: &[&str], found: &[String]) -> FabError {
    FabError::SchemaMismatch {
        expected: expected.iter().map(|s| s.to_string()).collect(),
        found: found.to_vec(),
    }
}

/// Rename the header to the JLCPCB schema and apply the adjustments row by row.
///
/// The whole table is rejected if its header is not exactly [`INPUT_HEADER`].
pub fn transform(
    table: PlacementTable,
    adjustments: &PlacementAdjustments,
) -> Result<Transformed, FabError> {
    if table.header != INPUT_HEADER {
        return Err(schema_mismatch(&INPUT_HEADER, &table.header));
    }

    let mut applied = Vec::new();
    let mut rows = table.rows;
    if !adjustments.is_empty() {
        for row in &mut rows {
            applied.extend(adjustments.apply(row)?);
        }
    }

    Ok(Transformed {
        table: PlacementTable::new(&OUTPUT_HEADER, rows),
        adjustments: applied,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample_rows() -> Vec<Placement> {
        vec![
            Placement::from_fields(["C1", "1uF", "0402", "0.000000", "0.000000", "0.000000", "top"]),
            Placement::from_fields(["R2", "10k", "0603", "1.000000", "2.000000", "350.000000", "top"]),
            Placement::from_fields(["U3", "MCU", "QFN-32", "12.5", "-4.25", "90", "bottom"]),
        ]
    }

    #[test]
    fn test_transform_renames_header() {
        let table = PlacementTable::new(&INPUT_HEADER, sample_rows());

        let out = transform(table, &PlacementAdjustments::default()).unwrap();

        assert_eq!(out.table.header, OUTPUT_HEADER);
        assert_eq!(out.table.rows, sample_rows());
        assert!(out.adjustments.is_empty());
    }

    #[test]
    fn test_transform_applies_adjustments() {
        let table = PlacementTable::new(&INPUT_HEADER, sample_rows());
        let adjustments =
            PlacementAdjustments::from_specs(Some("C1:+90,R2:-180"), Some("C1:+1.5"), None);

        let out = transform(table, &adjustments).unwrap();
        let rows = &out.table.rows;

        assert_eq!(rows[0].rotation, "90.000000");
        assert_eq!(rows[0].pos_x, "1.500000");
        assert_eq!(rows[0].pos_y, "0.000000");
        assert_eq!(rows[1].rotation, "170.000000");
        assert_eq!(rows[1].pos_x, "1.000000");
        // U3 has no entry and keeps its original formatting
        assert_eq!(rows[2], sample_rows()[2]);
        assert_eq!(out.adjustments.len(), 3);
    }

    #[test]
    fn test_transform_rejects_swapped_columns() {
        let header = ["Ref", "Val", "Package", "PosX", "PosY", "Side", "Rot"];
        let table = PlacementTable::new(&header, sample_rows());
        let adjustments = PlacementAdjustments::from_specs(Some("C1:+90"), None, None);

        let err = transform(table, &adjustments).unwrap_err();

        match err {
            FabError::SchemaMismatch { expected, found } => {
                assert_eq!(expected, INPUT_HEADER);
                assert_eq!(found, header);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_transform_fails_on_bad_value() {
        let rows = vec![Placement::from_fields(["C1", "1uF", "0402", "x", "0", "0", "top"])];
        let table = PlacementTable::new(&INPUT_HEADER, rows);
        let adjustments = PlacementAdjustments::from_specs(None, Some("C1:+1"), None);

        assert!(matches!(
            transform(table, &adjustments),
            Err(FabError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_read_write_files() {
        let dir = tempdir().expect("Failed to create temp dir");
        let input = dir.path().join("board.csv");
        std::fs::write(
            &input,
            "Ref,Val,Package,PosX,PosY,Rot,Side\n\"C1\",\"1uF, 16V\",0402,1.0,2.0,0.0,top\n",
        )
        .expect("Failed to write input");

        let table = PlacementTable::read(&input).unwrap();
        assert_eq!(table.header, INPUT_HEADER);
        assert_eq!(table.rows[0].designator, "C1");
        assert_eq!(table.rows[0].value, "1uF, 16V");

        let output = dir.path().join("out.csv");
        let out = transform(table, &PlacementAdjustments::default()).unwrap();
        out.table.write(&output).unwrap();

        let written = std::fs::read_to_string(&output).unwrap();
        assert_eq!(
            written,
            "Designator,Val,Package,Mid X,Mid Y,Rotation,Layer\r\nC1,\"1uF, 16V\",0402,1.0,2.0,0.0,top\r\n"
        );
    }

    #[test]
    fn test_read_short_header() {
        let dir = tempdir().expect("Failed to create temp dir");
        let input = dir.path().join("short.csv");
        std::fs::write(&input, "Ref,Val,Package\nC1,1uF,0402\n").unwrap();

        assert!(matches!(
            PlacementTable::read(&input),
            Err(FabError::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn test_read_checks_names_before_rows() {
        let dir = tempdir().expect("Failed to create temp dir");
        let input = dir.path().join("swapped.csv");
        std::fs::write(
            &input,
            "Ref,Val,Package,PosX,PosY,Side,Rot\nC1,1uF,0402,1.0,2.0\n",
        )
        .unwrap();

        match PlacementTable::read(&input) {
            Err(FabError::SchemaMismatch { expected, found }) => {
                assert_eq!(expected, INPUT_HEADER);
                assert_eq!(found[5], "Side");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_read_output_schema() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("pos_board.csv");
        std::fs::write(
            &path,
            "Designator,Val,Package,Mid X,Mid Y,Rotation,Layer\r\nC1,1uF,0402,1.0,2.0,90.000000,top\r\n",
        )
        .unwrap();

        let table = PlacementTable::read_with_header(&path, &OUTPUT_HEADER).unwrap();
        assert_eq!(table.rows[0].rotation, "90.000000");
        assert!(matches!(
            PlacementTable::read(&path),
            Err(FabError::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn test_read_empty_file() {
        let dir = tempdir().expect("Failed to create temp dir");
        let input = dir.path().join("empty.csv");
        std::fs::write(&input, "").unwrap();

        match PlacementTable::read(&input) {
            Err(FabError::SchemaMismatch { found, .. }) => assert!(found.is_empty()),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_read_ragged_row() {
        let dir = tempdir().expect("Failed to create temp dir");
        let input = dir.path().join("ragged.csv");
        std::fs::write(
            &input,
            "Ref,Val,Package,PosX,PosY,Rot,Side\nC1,1uF,0402,1.0,2.0\n",
        )
        .unwrap();

        assert!(matches!(
            PlacementTable::read(&input),
            Err(FabError::MalformedRow {
                expected: 7,
                found: 5,
                ..
            })
        ));
    }
}
