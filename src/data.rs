//! Decode DMG sample blocks.
//!
//! Each block is a descriptor line followed by fixed-width sample rows:
//!
//! ```text
//!      20 points of accel data equally spaced at  .005 sec, in cm/sec2.  (8F10.3)
//!    -0.123     0.456 ...
//! ```
//!
//! The descriptor gives the point count, the quantity, the unit and the
//! Fortran row format. Fields are sliced by column because adjacent values
//! may touch without separating blanks.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::{DmgError, Result};

/// Standard gravity in cm/s^2.
pub const STANDARD_GRAVITY: f64 = 980.665;

static KIND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(\d+)\s+points\s+of\s+(accel|veloc|displ)").expect("descriptor pattern")
});

static UNIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bin\s+(g|cm/sec2|cm/s2|mm/sec2|cm/sec|cm/s|cm|mm)\b").expect("unit pattern")
});

static ROW_FORMAT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\((\d+)\s*[FfEeGg](\d+)(?:\.\d+)?\)").expect("row format pattern")
});

/// Quantity stored in a data block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataKind {
    Acceleration,
    Velocity,
    Displacement,
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Acceleration => write!(f, "accel"),
            Self::Velocity => write!(f, "veloc"),
            Self::Displacement => write!(f, "displ"),
        }
    }
}

/// Parsed data block descriptor line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataDescriptor {
    pub npts: usize,
    pub kind: DataKind,
    /// Unit token as written, lower-cased (e.g. `"cm/sec2"`, `"g"`).
    pub unit: String,
    pub columns: usize,
    pub width: usize,
}

impl DataDescriptor {
    /// Parse a descriptor line. `line_no` is 1-based, for error reports.
    pub fn parse(line: &str, line_no: usize) -> Result<Self> {
        let kind_caps = KIND
            .captures(line)
            .ok_or_else(|| DmgError::malformed_data(line_no, "missing data block descriptor"))?;
        let npts: usize = kind_caps[1]
            .parse()
            .map_err(|_| DmgError::malformed_data(line_no, "invalid point count"))?;
        let kind = match kind_caps[2].to_ascii_lowercase().as_str() {
            "accel" => DataKind::Acceleration,
            "veloc" => DataKind::Velocity,
            _ => DataKind::Displacement,
        };
        let unit = UNIT
            .captures(line)
            .map(|caps| caps[1].to_ascii_lowercase())
            .ok_or_else(|| DmgError::malformed_data(line_no, "missing data unit"))?;
        let format = ROW_FORMAT
            .captures(line)
            .ok_or_else(|| DmgError::malformed_data(line_no, "missing row format"))?;
        let columns: usize = format[1].parse().unwrap_or(0);
        let width: usize = format[2].parse().unwrap_or(0);
        if columns == 0 || width == 0 {
            return Err(DmgError::malformed_data(
                line_no,
                format!("unusable row format \"{}\"", &format[0]),
            ));
        }
        Ok(Self {
            npts,
            kind,
            unit,
            columns,
            width,
        })
    }

    /// Number of sample rows following the descriptor.
    pub fn rows(&self) -> usize {
        self.npts.div_ceil(self.columns)
    }

    /// Factor converting this block's acceleration values to cm/s^2.
    pub fn acceleration_scale(&self) -> Option<f64> {
        match self.unit.as_str() {
            "g" => Some(STANDARD_GRAVITY),
            "cm/sec2" | "cm/s2" => Some(1.0),
            "mm/sec2" => Some(0.1),
            _ => None,
        }
    }
}

/// One decoded data block.
#[derive(Debug, Clone, PartialEq)]
pub struct DataBlock {
    pub descriptor: DataDescriptor,
    pub samples: Vec<f64>,
}

/// Read the data block starting at `lines[start]` (its descriptor line).
///
/// The descriptor must announce `kind`. Its point count must match
/// `declared` (the integer-header count, when present) and the number of
/// values actually found. Returns the block and the index of the line
/// following it.
pub fn read_block(
    lines: &[&str],
    start: usize,
    kind: DataKind,
    declared: Option<usize>,
) -> Result<(DataBlock, usize)> {
    let line = lines.get(start).ok_or_else(|| {
        DmgError::malformed_data(start + 1, format!("file ends before the {kind} data block"))
    })?;
    let descriptor = DataDescriptor::parse(line, start + 1)?;
    if descriptor.kind != kind {
        return Err(DmgError::malformed_data(
            start + 1,
            format!("expected {kind} data, found {}", descriptor.kind),
        ));
    }
    if let Some(expected) = declared {
        if expected != descriptor.npts {
            return Err(DmgError::SampleCountMismatch {
                expected,
                actual: descriptor.npts,
            });
        }
    }

    let first_row = start + 1;
    let end = first_row.saturating_add(descriptor.rows()).min(lines.len());
    log::trace!(
        "{kind} block at line {}: {} points in {} rows of {}x{}",
        start + 1,
        descriptor.npts,
        descriptor.rows(),
        descriptor.columns,
        descriptor.width
    );

    // The count is untrusted text; reserve only what the rows can hold.
    let available = end.saturating_sub(first_row) * descriptor.columns;
    let mut samples = Vec::with_capacity(descriptor.npts.min(available));
    for (index, row) in lines[first_row..end].iter().enumerate() {
        parse_row(row, first_row + index + 1, &descriptor, &mut samples)?;
    }
    if samples.len() != descriptor.npts {
        return Err(DmgError::SampleCountMismatch {
            expected: descriptor.npts,
            actual: samples.len(),
        });
    }
    Ok((
        DataBlock {
            descriptor,
            samples,
        },
        end,
    ))
}

fn parse_row(
    row: &str,
    line_no: usize,
    descriptor: &DataDescriptor,
    out: &mut Vec<f64>,
) -> Result<()> {
    for column in 0..descriptor.columns {
        let start = column * descriptor.width;
        if start >= row.len() {
            break;
        }
        let end = (start + descriptor.width).min(row.len());
        let field = row
            .get(start..end)
            .ok_or_else(|| DmgError::malformed_data(line_no, "non-ASCII text in sample row"))?
            .trim();
        if field.is_empty() {
            continue;
        }
        let value: f64 = field.parse().map_err(|_| {
            DmgError::malformed_data(line_no, format!("invalid sample value \"{field}\""))
        })?;
        out.push(value);
    }
    Ok(())
}
