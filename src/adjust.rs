//! Per-designator placement adjustments
//!
//! Adjustments are written on the command line as a small list of
//! `designator:delta` pairs, e.g. `C1:+1.5,R2:-2.0`. Each axis (rotation, X, Y)
//! gets its own list and is applied independently to matching placement rows.

use std::collections::HashMap;
use std::fmt;

use tracing::{info, warn};

use crate::error::FabError;
use crate::placement::Placement;

/// Example shown whenever an adjustment string cannot be parsed
pub const ADJUSTMENT_FORMAT: &str = "C1:+1.5,R2:-2.0";

/// One of the three adjustable placement columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Rotation,
    X,
    Y,
}

impl Axis {
    /// Application order within a row
    pub const ALL: [Axis; 3] = [Axis::Rotation, Axis::X, Axis::Y];

    /// Zero-based column holding this axis in the placement schema
    pub fn column(self) -> usize {
        match self {
            Axis::X => 3,
            Axis::Y => 4,
            Axis::Rotation => 5,
        }
    }

    /// Rotation wraps into [0, 360), positions do not
    pub fn is_rotation(self) -> bool {
        matches!(self, Axis::Rotation)
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Axis::Rotation => "rotation",
            Axis::X => "X coordinate",
            Axis::Y => "Y coordinate",
        };
        f.write_str(name)
    }
}

/// Digits written after the decimal point for adjusted values
pub const OUTPUT_DECIMALS: usize = 6;

fn round_to_output(value: f64) -> f64 {
    let scale = 10f64.powi(OUTPUT_DECIMALS as i32);
    (value * scale).round() / scale
}

/// Reduce an angle into [0, 360) at output precision.
///
/// Rounding comes first so a value such as 359.9999996 is written as
/// `0.000000` rather than `360.000000`.
pub fn normalize_rotation(value: f64) -> f64 {
    let wrapped = round_to_output(value).rem_euclid(360.0);
    // rem_euclid rounds tiny negative inputs up to exactly 360.0, and keeps -0.0
    if wrapped >= 360.0 || wrapped == 0.0 {
        0.0
    } else {
        wrapped
    }
}

/// Strip quote marks surrounding a CSV field
pub(crate) fn unquote(field: &str) -> &str {
    field.trim_matches('"')
}

/// A single applied change, kept for logging and statistics
#[derive(Debug, Clone, PartialEq)]
pub struct Adjustment {
    pub designator: String,
    pub axis: Axis,
    pub old: f64,
    pub new: f64,
}

/// Designator to delta mapping for one axis
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdjustmentSpec {
    deltas: HashMap<String, f64>,
}

impl AdjustmentSpec {
    /// Parse a `designator:delta` list.
    ///
    /// An absent or empty string gives an empty spec. A single bad item rejects
    /// the whole string; there is no partial result.
    pub fn parse(input: Option<&str>, axis: Axis) -> Result<Self, FabError> {
        let mut deltas = HashMap::new();

        let input = match input {
            Some(s) if !s.is_empty() => s,
            _ => return Ok(Self { deltas }),
        };

        for item in input.split(',') {
            let (designator, value) =
                item.split_once(':')
                    .ok_or_else(|| FabError::AdjustmentParse {
                        axis,
                        detail: format!("item {:?} is missing ':'", item),
                    })?;

            let value = value.trim();
            let delta = value
                .parse::<f64>()
                .ok()
                .filter(|d| d.is_finite())
                .ok_or_else(|| FabError::AdjustmentParse {
                    axis,
                    detail: format!("{:?} is not a number", value),
                })?;

            deltas.insert(designator.trim().to_string(), delta);
        }

        Ok(Self { deltas })
    }

    /// Parse, or log the problem and fall back to an empty spec
    pub fn parse_or_empty(input: Option<&str>, axis: Axis) -> Self {
        match Self::parse(input, axis) {
            Ok(spec) => spec,
            Err(e) => {
                warn!("{}", e);
                Self::default()
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty()
    }

    pub fn len(&self) -> usize {
        self.deltas.len()
    }

    pub fn get(&self, designator: &str) -> Option<f64> {
        self.deltas.get(designator).copied()
    }

    /// Apply this spec to one column of a placement.
    ///
    /// Rows whose designator has no entry are left untouched.
    pub fn apply(
        &self,
        placement: &mut Placement,
        axis: Axis,
    ) -> Result<Option<Adjustment>, FabError> {
        let designator = unquote(&placement.designator);
        let Some(delta) = self.get(designator) else {
            return Ok(None);
        };
        let designator = designator.to_string();

        let field = placement.axis_field_mut(axis);
        let old = unquote(field)
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| FabError::InvalidValue {
                designator: designator.clone(),
                field: Placement::column_name(axis.column()),
                value: field.clone(),
            })?;

        let mut new = old + delta;
        if axis.is_rotation() {
            new = normalize_rotation(new);
        }
        *field = format!("{:.*}", OUTPUT_DECIMALS, new);

        info!("Adjusted {}: {:?} -> {:?}", designator, old, new);

        Ok(Some(Adjustment {
            designator,
            axis,
            old,
            new,
        }))
    }
}

/// The three per-axis specs used for one run
#[derive(Debug, Clone, Default)]
pub struct PlacementAdjustments {
    pub rotation: AdjustmentSpec,
    pub x: AdjustmentSpec,
    pub y: AdjustmentSpec,
}

impl PlacementAdjustments {
    /// Build from raw command line strings; a malformed axis becomes a no-op
    pub fn from_specs(rotation: Option<&str>, x: Option<&str>, y: Option<&str>) -> Self {
        Self {
            rotation: AdjustmentSpec::parse_or_empty(rotation, Axis::Rotation),
            x: AdjustmentSpec::parse_or_empty(x, Axis::X),
            y: AdjustmentSpec::parse_or_empty(y, Axis::Y),
        }
    }

    pub fn spec(&self, axis: Axis) -> &AdjustmentSpec {
        match axis {
            Axis::Rotation => &self.rotation,
            Axis::X => &self.x,
            Axis::Y => &self.y,
        }
    }

    pub fn is_empty(&self) -> bool {
        Axis::ALL.iter().all(|axis| self.spec(*axis).is_empty())
    }

    /// Apply rotation, then X, then Y. Empty axes are skipped.
    pub fn apply(&self, placement: &mut Placement) -> Result<Vec<Adjustment>, FabError> {
        let mut applied = Vec::new();

        for axis in Axis::ALL {
            let spec = self.spec(axis);
            if spec.is_empty() {
                continue;
            }
            if let Some(adjustment) = spec.apply(placement, axis)? {
                applied.push(adjustment);
            }
        }

        Ok(applied)
    }
}
