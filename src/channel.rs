//! SEED-style channel codes for DMG channels.
//!
//! DMG headers give an orientation azimuth instead of a channel code. The
//! code is built as band + instrument + component, e.g. `"HN1"`:
//! - band: `H` at 80 Hz and above, `B` from 10 Hz, `L` below
//! - instrument: always `N` (accelerometer)
//! - component: `Z` vertical, `1` roughly north-south, `2` otherwise

use std::fmt;

/// Orientation code for an upward vertical channel.
pub const VERTICAL_UP: i32 = 500;
/// Orientation code for a downward vertical channel.
pub const VERTICAL_DOWN: i32 = 600;

/// Component of a channel derived from its orientation code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    Vertical,
    /// Azimuth within 45 degrees of north or south.
    First,
    Second,
}

impl Component {
    /// Classify an orientation code. Returns `None` for codes that are
    /// neither an azimuth in `0..=360` nor a vertical marker.
    pub fn from_orientation(angle: i32) -> Option<Self> {
        match angle {
            VERTICAL_UP | VERTICAL_DOWN => Some(Self::Vertical),
            0..=360 => {
                let northish = angle < 45 || angle > 315 || (135 < angle && angle < 225);
                Some(if northish { Self::First } else { Self::Second })
            }
            _ => None,
        }
    }

    fn code(self) -> char {
        match self {
            Self::Vertical => 'Z',
            Self::First => '1',
            Self::Second => '2',
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Band code for a sampling rate in Hz.
pub fn band_code(sampling_rate: f64) -> char {
    if sampling_rate >= 80.0 {
        'H'
    } else if sampling_rate >= 10.0 {
        'B'
    } else {
        'L'
    }
}

/// Build the three-character channel code for an accelerometer channel.
pub fn channel_code(sampling_rate: f64, component: Component) -> String {
    format!("{}N{}", band_code(sampling_rate), component.code())
}
