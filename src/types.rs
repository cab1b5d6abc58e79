//! Shared types: [`Units`], [`ProcessLevel`], and [`HeaderLayout`].

use std::fmt;
use std::str::FromStr;

/// Physical quantity carried by a trace.
///
/// Acceleration is in cm/s^2, velocity in cm/s, displacement in cm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Units {
    #[default]
    Acc,
    Vel,
    Disp,
}

impl Units {
    /// Short code used in trace metadata: `"acc"`, `"vel"` or `"disp"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Acc => "acc",
            Self::Vel => "vel",
            Self::Disp => "disp",
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown unit code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown units \"{0}\": expected acc, vel or disp")]
pub struct ParseUnitsError(pub String);

impl FromStr for Units {
    type Err = ParseUnitsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "acc" => Ok(Self::Acc),
            "vel" => Ok(Self::Vel),
            "disp" => Ok(Self::Disp),
            _ => Err(ParseUnitsError(s.to_string())),
        }
    }
}

/// DMG processing level declared by the first header line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessLevel {
    /// Uncorrected accelerogram (one acceleration block per channel).
    V1,
    /// Corrected accelerogram (acceleration, velocity and displacement blocks).
    V2,
}

impl ProcessLevel {
    /// Number of free-text header lines per channel block.
    pub fn text_header_rows(self) -> usize {
        match self {
            Self::V1 => 13,
            Self::V2 => 25,
        }
    }

    /// Number of integer header lines (16 fields of width 5).
    pub fn int_header_rows(self) -> usize {
        7
    }

    /// Number of real header lines (8 fields of width 10).
    pub fn real_header_rows(self) -> usize {
        match self {
            Self::V1 => 7,
            Self::V2 => 13,
        }
    }

    /// Total number of header lines preceding the first data block.
    pub fn header_rows(self) -> usize {
        self.text_header_rows() + self.int_header_rows() + self.real_header_rows()
    }
}

impl fmt::Display for ProcessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V1 => write!(f, "V1"),
            Self::V2 => write!(f, "V2"),
        }
    }
}

/// Header sub-layout, which decides the calibration fields on offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderLayout {
    /// Analog-era records: trigger time on the record line, per-channel
    /// sensor sensitivity and timing uncertainty.
    Legacy,
    /// Digital records: absolute start time on the record line, global
    /// scaling factor and band-pass filter corners.
    Modern,
}

impl fmt::Display for HeaderLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Legacy => write!(f, "legacy"),
            Self::Modern => write!(f, "modern"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_units_from_str() {
        assert_eq!("acc".parse::<Units>().unwrap(), Units::Acc);
        assert_eq!("VEL".parse::<Units>().unwrap(), Units::Vel);
        assert_eq!(" disp ".parse::<Units>().unwrap(), Units::Disp);
        assert!("jerk".parse::<Units>().is_err());
    }

    #[test]
    fn test_units_display_roundtrip() {
        for units in [Units::Acc, Units::Vel, Units::Disp] {
            assert_eq!(units.to_string().parse::<Units>().unwrap(), units);
        }
        assert_eq!(Units::default(), Units::Acc);
    }

    #[test]
    fn test_process_level_geometry() {
        assert_eq!(ProcessLevel::V1.header_rows(), 27);
        assert_eq!(ProcessLevel::V2.header_rows(), 45);
        assert_eq!(ProcessLevel::V2.to_string(), "V2");
    }
}
