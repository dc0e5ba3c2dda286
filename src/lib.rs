// SPDX-FileCopyrightText: 2025 kicad-fab contributors
// SPDX-License-Identifier: Apache-2.0

//! KiCad to JLCPCB fabrication file conversion.
//!
//! Two stages make up a run: BOM XML is turned into CSV by an external XSLT
//! processor, and placement CSVs get JLCPCB column names plus optional
//! per-designator rotation and offset corrections.

pub mod adjust;
pub mod config;
pub mod converter;
pub mod discovery;
pub mod error;
pub mod naming;
pub mod placement;
pub mod progress;
pub mod xslt;

pub use adjust::{AdjustmentSpec, Axis, PlacementAdjustments};
pub use config::Config;
pub use converter::{ConversionStats, Converter};
pub use error::FabError;
pub use placement::{transform, Placement, PlacementTable};
