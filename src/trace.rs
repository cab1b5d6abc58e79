//! Trace and stream types produced by the DMG reader.
//!
//! A [`Trace`] is one channel's samples plus nested, named metadata records
//! ([`Stats`], [`Coordinates`], [`StandardMetadata`], [`FormatSpecific`]).
//! A [`Stream`] holds the traces of one file in file order.

use std::fmt;
use std::ops::Index;

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};

use crate::types::{ProcessLevel, Units};

/// Default location code when the file supplies none.
pub const DEFAULT_LOCATION: &str = "--";

/// Source format tag written to [`StandardMetadata::source_format`].
pub const SOURCE_FORMAT: &str = "dmg";

/// Float equality that treats two NaNs as equal.
///
/// Missing header values decode to NaN, so decoded metadata compares with
/// this instead of `==`.
fn same_value(a: f64, b: f64) -> bool {
    a == b || (a.is_nan() && b.is_nan())
}

/// Station coordinates in decimal degrees.
#[derive(Debug, Clone, Copy)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
    /// Not carried by DMG headers; always NaN.
    pub elevation: f64,
}

impl PartialEq for Coordinates {
    fn eq(&self, other: &Self) -> bool {
        same_value(self.latitude, other.latitude)
            && same_value(self.longitude, other.longitude)
            && same_value(self.elevation, other.elevation)
    }
}

/// Format-independent trace metadata.
#[derive(Debug, Clone)]
pub struct StandardMetadata {
    pub units: Units,
    pub station_name: String,
    pub instrument: String,
    pub sensor_serial_number: String,
    /// Azimuth in degrees, or 500 (up) / 600 (down) for vertical channels.
    pub horizontal_orientation: f64,
    /// Natural period of the sensor in seconds.
    pub instrument_period: f64,
    /// Fraction of critical damping.
    pub instrument_damping: f64,
    pub process_level: ProcessLevel,
    /// Date from the "Processed:" field, if any.
    pub process_time: Option<NaiveDate>,
    pub source_format: String,
    /// Network provenance; empty when the network is unknown.
    pub source: String,
    /// File name the trace was read from; empty for in-memory parsing.
    pub source_file: String,
}

impl PartialEq for StandardMetadata {
    fn eq(&self, other: &Self) -> bool {
        self.units == other.units
            && self.station_name == other.station_name
            && self.instrument == other.instrument
            && self.sensor_serial_number == other.sensor_serial_number
            && same_value(self.horizontal_orientation, other.horizontal_orientation)
            && same_value(self.instrument_period, other.instrument_period)
            && same_value(self.instrument_damping, other.instrument_damping)
            && self.process_level == other.process_level
            && self.process_time == other.process_time
            && self.source_format == other.source_format
            && self.source == other.source
            && self.source_file == other.source_file
    }
}

/// Calibration fields whose set depends on the header layout.
///
/// Header fields that hold the `-999` missing sentinel decode to NaN. The
/// accessor methods return NaN for fields a layout does not carry, so
/// callers can query any field regardless of the variant.
#[derive(Debug, Clone, Copy)]
pub enum FormatSpecific {
    Legacy {
        sensor_sensitivity: f64,
        /// Standard deviation of the trigger timing, in seconds.
        time_sd: f64,
    },
    Modern {
        sensor_sensitivity: f64,
        scaling_factor: f64,
        low_filter_corner: f64,
        high_filter_corner: f64,
    },
}

impl FormatSpecific {
    pub fn sensor_sensitivity(&self) -> f64 {
        match *self {
            Self::Legacy {
                sensor_sensitivity, ..
            }
            | Self::Modern {
                sensor_sensitivity, ..
            } => sensor_sensitivity,
        }
    }

    pub fn time_sd(&self) -> f64 {
        match *self {
            Self::Legacy { time_sd, .. } => time_sd,
            Self::Modern { .. } => f64::NAN,
        }
    }

    pub fn scaling_factor(&self) -> f64 {
        match *self {
            Self::Legacy { .. } => f64::NAN,
            Self::Modern { scaling_factor, .. } => scaling_factor,
        }
    }

    pub fn low_filter_corner(&self) -> f64 {
        match *self {
            Self::Legacy { .. } => f64::NAN,
            Self::Modern {
                low_filter_corner, ..
            } => low_filter_corner,
        }
    }

    pub fn high_filter_corner(&self) -> f64 {
        match *self {
            Self::Legacy { .. } => f64::NAN,
            Self::Modern {
                high_filter_corner, ..
            } => high_filter_corner,
        }
    }
}

impl PartialEq for FormatSpecific {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                Self::Legacy {
                    sensor_sensitivity: a,
                    time_sd: b,
                },
                Self::Legacy {
                    sensor_sensitivity: c,
                    time_sd: d,
                },
            ) => same_value(*a, *c) && same_value(*b, *d),
            (
                Self::Modern {
                    sensor_sensitivity: a,
                    scaling_factor: b,
                    low_filter_corner: c,
                    high_filter_corner: d,
                },
                Self::Modern {
                    sensor_sensitivity: e,
                    scaling_factor: f,
                    low_filter_corner: g,
                    high_filter_corner: h,
                },
            ) => {
                same_value(*a, *e)
                    && same_value(*b, *f)
                    && same_value(*c, *g)
                    && same_value(*d, *h)
            }
            _ => false,
        }
    }
}

/// Identity, timing and metadata of a trace.
#[derive(Debug, Clone, PartialEq)]
pub struct Stats {
    pub network: String,
    pub station: String,
    pub channel: String,
    pub location: String,
    pub starttime: DateTime<Utc>,
    /// Sampling interval in seconds.
    pub delta: f64,
    pub npts: usize,
    pub coordinates: Coordinates,
    pub standard: StandardMetadata,
    pub format_specific: FormatSpecific,
}

impl Stats {
    pub fn sampling_rate(&self) -> f64 {
        1.0 / self.delta
    }

    /// Time of the last sample: `starttime + (npts - 1) * delta`.
    pub fn endtime(&self) -> DateTime<Utc> {
        let span = self.npts.saturating_sub(1) as f64 * self.delta;
        self.starttime + TimeDelta::microseconds((span * 1e6).round() as i64)
    }
}

/// One channel of a DMG file.
#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    pub stats: Stats,
    pub data: Vec<f64>,
}

impl Trace {
    /// Return the SEED identifier: `"NET.STA.LOC.CHA"`.
    pub fn id(&self) -> String {
        format!(
            "{}.{}.{}.{}",
            self.stats.network, self.stats.station, self.stats.location, self.stats.channel
        )
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl fmt::Display for Trace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | {} - {} | {} Hz, {} samples ({})",
            self.id(),
            self.stats.starttime.format("%Y-%m-%dT%H:%M:%S%.6fZ"),
            self.stats.endtime().format("%Y-%m-%dT%H:%M:%S%.6fZ"),
            self.stats.sampling_rate(),
            self.stats.npts,
            self.stats.standard.units,
        )
    }
}

/// Ordered traces read from one file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Stream {
    traces: Vec<Trace>,
}

impl Stream {
    pub fn new(traces: Vec<Trace>) -> Self {
        Self { traces }
    }

    pub fn len(&self) -> usize {
        self.traces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.traces.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Trace> {
        self.traces.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Trace> {
        self.traces.iter()
    }

    pub fn traces(&self) -> &[Trace] {
        &self.traces
    }

    pub fn into_traces(self) -> Vec<Trace> {
        self.traces
    }
}

impl Index<usize> for Stream {
    type Output = Trace;

    fn index(&self, index: usize) -> &Trace {
        &self.traces[index]
    }
}

impl IntoIterator for Stream {
    type Item = Trace;
    type IntoIter = std::vec::IntoIter<Trace>;

    fn into_iter(self) -> Self::IntoIter {
        self.traces.into_iter()
    }
}

impl<'a> IntoIterator for &'a Stream {
    type Item = &'a Trace;
    type IntoIter = std::slice::Iter<'a, Trace>;

    fn into_iter(self) -> Self::IntoIter {
        self.traces.iter()
    }
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} trace(s) in stream", self.traces.len())?;
        for trace in &self.traces {
            write!(f, "\n{trace}")?;
        }
        Ok(())
    }
}
