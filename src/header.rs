//! Decode DMG channel headers.
//!
//! Every channel block starts with three header sections:
//!
//! | section | lines (V1 / V2) | layout |
//! |---|---|---|
//! | text | 13 / 25 | free text with labelled fields |
//! | integer | 7 / 7 | 16 fields of width 5 per line |
//! | real | 7 / 13 | 8 fields of width 10 per line |
//!
//! Numeric fields holding `-999` are missing values. The file-level
//! [`FileHeader`] (processing stage and header layout) is resolved once from
//! the first block; [`decode_channel_header`] then decodes every block with it.

use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;

use crate::channel::{self, Component};
use crate::network;
use crate::sniff;
use crate::time::{combine, extract_date, extract_time};
use crate::trace::{Coordinates, FormatSpecific};
use crate::types::{HeaderLayout, ProcessLevel};
use crate::{DmgError, Result};

/// Missing-value sentinel used in both numeric header sections.
pub const MISSING: i32 = -999;

const INT_FIELDS_PER_LINE: usize = 16;
const INT_FIELD_WIDTH: usize = 5;
const REAL_FIELDS_PER_LINE: usize = 8;
const REAL_FIELD_WIDTH: usize = 10;

// Text header rows.
const STAGE_ROW: usize = 0;
const RECORD_ROW: usize = 1;
const EVENT_ROW: usize = 2;
const STATION_ROW: usize = 3;
const NAME_ROW: usize = 4;
const INSTRUMENT_ROW: usize = 5;

// Integer header indices.
const INT_ORIENTATION: usize = 26;
const INT_NAME_LENGTH: usize = 29;
const INT_ACC_POINTS: usize = 52;
const INT_VEL_POINTS: usize = 63;
const INT_DISP_POINTS: usize = 65;

// Real header indices.
const REAL_DELTA: usize = 29;
const REAL_PERIOD: usize = 39;
const REAL_DAMPING: usize = 40;
const REAL_SENSITIVITY: usize = 41;
const REAL_TIME_SD: usize = 42;
const REAL_SCALING_FACTOR: usize = 43;
const REAL_LOW_CORNER: usize = 52;
const REAL_HIGH_CORNER: usize = 53;

static STATION_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bStation\s+No\.?\s*([A-Za-z0-9]+)").expect("station pattern")
});

static COORDINATES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+(?:\.\d*)?)\s*([NSns])\s*,?\s*(\d+(?:\.\d*)?)\s*([EWew])\b")
        .expect("coordinate pattern")
});

static NETWORK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bNetwork:\s*([A-Za-z0-9]{2})\b").expect("network pattern")
});

static INSTRUMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Instrument:\s*(.*?)\s*(?:S/N\s*(\S+)\s*)?$").expect("instrument pattern")
});

/// Processing stage and header layout shared by all channels of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
    pub stage: ProcessLevel,
    pub layout: HeaderLayout,
}

impl FileHeader {
    /// Resolve the file header from the lines of the first channel block.
    ///
    /// Fails with [`DmgError::UnsupportedVariant`] when the stage is not
    /// decodable, the first block is incomplete, or the record line names
    /// neither a start time nor a trigger time.
    pub fn resolve(block: &[&str]) -> Result<Self> {
        let first = block.first().copied().unwrap_or_default();
        let stage = sniff::detect_stage(first)?;
        if block.len() < stage.header_rows() {
            return Err(DmgError::UnsupportedVariant(format!(
                "{stage} file ends inside the first channel header ({} of {} lines)",
                block.len(),
                stage.header_rows()
            )));
        }
        let layout = resolve_layout(block[RECORD_ROW]).ok_or_else(|| {
            DmgError::UnsupportedVariant(
                "record line carries neither a start time nor a trigger time".into(),
            )
        })?;
        log::debug!("DMG {stage} file with {layout} header layout");
        Ok(Self { stage, layout })
    }
}

/// Pick the header layout from a record line.
pub fn resolve_layout(record_line: &str) -> Option<HeaderLayout> {
    let upper = record_line.to_ascii_uppercase();
    if upper.contains("START TIME") {
        Some(HeaderLayout::Modern)
    } else if upper.contains("TRIGGER TIME") {
        Some(HeaderLayout::Legacy)
    } else {
        None
    }
}

/// Sample counts declared in the integer header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeclaredCounts {
    pub acceleration: Option<usize>,
    pub velocity: Option<usize>,
    pub displacement: Option<usize>,
}

/// Everything decoded from one channel's header sections.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelHeader {
    pub network: String,
    pub station: String,
    pub channel: String,
    pub starttime: DateTime<Utc>,
    pub delta: f64,
    pub coordinates: Coordinates,
    pub station_name: String,
    pub instrument: String,
    pub sensor_serial_number: String,
    pub source: String,
    pub orientation: i32,
    pub instrument_period: f64,
    pub instrument_damping: f64,
    pub process_time: Option<NaiveDate>,
    pub format_specific: FormatSpecific,
    pub declared: DeclaredCounts,
}

/// Fixed-width numeric header section.
///
/// Blank fields and `-999` sentinels are stored as `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericHeader<T> {
    values: Vec<Option<T>>,
}

impl<T: FromStr + Copy + PartialEq> NumericHeader<T> {
    /// Parse `lines` as rows of `per_line` fields of `width` characters.
    ///
    /// `first_line` is the 1-based file line number of `lines[0]`, used in
    /// error reports.
    pub fn parse(
        lines: &[&str],
        first_line: usize,
        per_line: usize,
        width: usize,
        missing: T,
    ) -> Result<Self> {
        let mut values = Vec::with_capacity(lines.len() * per_line);
        for (row, line) in lines.iter().enumerate() {
            let line_no = first_line + row;
            for field in 0..per_line {
                let start = field * width;
                if start >= line.len() {
                    values.push(None);
                    continue;
                }
                let end = (start + width).min(line.len());
                let text = line.get(start..end).ok_or_else(|| {
                    DmgError::corrupt_header(line_no, "non-ASCII text in numeric header")
                })?;
                let text = text.trim();
                if text.is_empty() {
                    values.push(None);
                    continue;
                }
                let value: T = text.parse().map_err(|_| {
                    DmgError::corrupt_header(
                        line_no,
                        format!("invalid numeric field \"{text}\" in column {}", start + 1),
                    )
                })?;
                values.push((value != missing).then_some(value));
            }
        }
        Ok(Self { values })
    }

    pub fn get(&self, index: usize) -> Option<T> {
        self.values.get(index).copied().flatten()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl NumericHeader<f64> {
    /// Value at `index`, or NaN when missing.
    pub fn value(&self, index: usize) -> f64 {
        self.get(index).unwrap_or(f64::NAN)
    }
}

/// Decode one channel's header lines.
///
/// `block` holds exactly the header lines of the channel
/// (`file.stage.header_rows()` of them); `start` is the 0-based index of
/// `block[0]` in the file.
pub fn decode_channel_header(
    block: &[&str],
    start: usize,
    file: &FileHeader,
) -> Result<ChannelHeader> {
    let stage = file.stage;
    let line_no = |row: usize| start + row + 1;
    if block.len() < stage.header_rows() {
        return Err(DmgError::corrupt_header(
            line_no(block.len()),
            format!(
                "file ends inside the channel header starting at line {} ({} of {} lines)",
                line_no(0),
                block.len(),
                stage.header_rows()
            ),
        ));
    }

    let text_rows = stage.text_header_rows();
    let int_rows = stage.int_header_rows();
    let text = &block[..text_rows];
    let ints = NumericHeader::<i32>::parse(
        &block[text_rows..text_rows + int_rows],
        line_no(text_rows),
        INT_FIELDS_PER_LINE,
        INT_FIELD_WIDTH,
        MISSING,
    )?;
    let reals = NumericHeader::<f64>::parse(
        &block[text_rows + int_rows..stage.header_rows()],
        line_no(text_rows + int_rows),
        REAL_FIELDS_PER_LINE,
        REAL_FIELD_WIDTH,
        f64::from(MISSING),
    )?;

    match sniff::detect_stage(text[STAGE_ROW]) {
        Ok(found) if found == stage => {}
        _ => {
            return Err(DmgError::corrupt_header(
                line_no(STAGE_ROW),
                format!("channel header does not start with a {stage} marker"),
            ));
        }
    }
    let process_time = extract_date(text[STAGE_ROW]);

    let record = text[RECORD_ROW];
    if resolve_layout(record) != Some(file.layout) {
        return Err(DmgError::corrupt_header(
            line_no(RECORD_ROW),
            format!("record line does not match the {} header layout", file.layout),
        ));
    }
    let date = match file.layout {
        HeaderLayout::Modern => extract_date(record),
        HeaderLayout::Legacy => extract_date(record).or_else(|| extract_date(text[EVENT_ROW])),
    }
    .ok_or_else(|| DmgError::corrupt_header(line_no(RECORD_ROW), "no valid start date"))?;
    let offset = extract_time(record)
        .ok_or_else(|| DmgError::corrupt_header(line_no(RECORD_ROW), "no valid start time"))?;
    let starttime = combine(date, offset)
        .ok_or_else(|| DmgError::corrupt_header(line_no(RECORD_ROW), "start time out of range"))?;

    let station_line = text[STATION_ROW];
    let station = STATION_CODE
        .captures(station_line)
        .map(|caps| caps[1].to_string())
        .ok_or_else(|| DmgError::corrupt_header(line_no(STATION_ROW), "no station code"))?;
    let coordinates = parse_coordinates(station_line)
        .ok_or_else(|| DmgError::corrupt_header(line_no(STATION_ROW), "no station coordinates"))?;
    let network_code = NETWORK
        .captures(station_line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str());
    let (network, source) = network::resolve(network_code);

    let station_name = parse_station_name(text[NAME_ROW], ints.get(INT_NAME_LENGTH));
    let (instrument, sensor_serial_number) = parse_instrument(text[INSTRUMENT_ROW]);

    let delta = reals.value(REAL_DELTA);
    if !(delta.is_finite() && delta > 0.0) {
        return Err(DmgError::corrupt_header(
            line_no(text_rows + int_rows + REAL_DELTA / REAL_FIELDS_PER_LINE),
            format!("invalid sampling interval {delta}"),
        ));
    }

    let orientation_line = line_no(text_rows + INT_ORIENTATION / INT_FIELDS_PER_LINE);
    let orientation = ints
        .get(INT_ORIENTATION)
        .ok_or_else(|| DmgError::corrupt_header(orientation_line, "missing channel orientation"))?;
    let component = Component::from_orientation(orientation).ok_or_else(|| {
        DmgError::corrupt_header(
            orientation_line,
            format!("invalid channel orientation {orientation}"),
        )
    })?;
    let channel = channel::channel_code(1.0 / delta, component);

    let sensor_sensitivity = reals.value(REAL_SENSITIVITY);
    let format_specific = match file.layout {
        HeaderLayout::Legacy => FormatSpecific::Legacy {
            sensor_sensitivity,
            time_sd: reals.value(REAL_TIME_SD),
        },
        HeaderLayout::Modern => FormatSpecific::Modern {
            sensor_sensitivity,
            scaling_factor: reals.value(REAL_SCALING_FACTOR),
            low_filter_corner: reals.value(REAL_LOW_CORNER),
            high_filter_corner: reals.value(REAL_HIGH_CORNER),
        },
    };

    let count = |index: usize| ints.get(index).and_then(|n| usize::try_from(n).ok());
    let declared = DeclaredCounts {
        acceleration: count(INT_ACC_POINTS),
        velocity: count(INT_VEL_POINTS),
        displacement: count(INT_DISP_POINTS),
    };

    Ok(ChannelHeader {
        network,
        station,
        channel,
        starttime,
        delta,
        coordinates,
        station_name,
        instrument,
        sensor_serial_number,
        source,
        orientation,
        instrument_period: reals.value(REAL_PERIOD),
        instrument_damping: reals.value(REAL_DAMPING),
        process_time,
        format_specific,
        declared,
    })
}

fn parse_coordinates(line: &str) -> Option<Coordinates> {
    let caps = COORDINATES.captures(line)?;
    let mut latitude: f64 = caps[1].parse().ok()?;
    let mut longitude: f64 = caps[3].parse().ok()?;
    if caps[2].eq_ignore_ascii_case("S") {
        latitude = -latitude;
    }
    if caps[4].eq_ignore_ascii_case("W") {
        longitude = -longitude;
    }
    Some(Coordinates {
        latitude,
        longitude,
        elevation: f64::NAN,
    })
}

/// Station name: the first `length` characters with runs of blanks collapsed.
fn parse_station_name(line: &str, length: Option<i32>) -> String {
    let name: String = match length.and_then(|n| usize::try_from(n).ok()) {
        Some(n) if n > 0 => line.chars().take(n).collect(),
        _ => line.to_string(),
    };
    name.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Instrument model and serial number; either may be empty.
fn parse_instrument(line: &str) -> (String, String) {
    match INSTRUMENT.captures(line) {
        Some(caps) => (
            caps.get(1).map_or("", |m| m.as_str()).trim().to_string(),
            caps.get(2).map_or("", |m| m.as_str()).to_string(),
        ),
        None => (String::new(), String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_layout() {
        assert_eq!(
            resolve_layout("89146-L2500-12044.02   Start time:  2/13/12, 21:06:45.0 UTC"),
            Some(HeaderLayout::Modern)
        );
        assert_eq!(
            resolve_layout("14403-S3492-94017.01   Trigger time: 12:31:04.0 GMT"),
            Some(HeaderLayout::Legacy)
        );
        assert_eq!(resolve_layout("    CORRECTED ACCELEROGRAM"), None);
    }

    #[test]
    fn test_truncated_header_names_block() {
        let mut block = vec!["CORRECTED ACCELEROGRAM DATA   Processed: 02/14/12"; 10];
        block[RECORD_ROW] = "89146-L2500-12044.02   Start time:  2/13/12, 21:06:45.0 UTC";

        match FileHeader::resolve(&block).unwrap_err() {
            DmgError::UnsupportedVariant(reason) => {
                assert!(reason.contains("first channel header"), "{reason}");
                assert!(reason.contains("10 of 45"), "{reason}");
            }
            other => panic!("unexpected error: {other}"),
        }

        let file = FileHeader {
            stage: ProcessLevel::V2,
            layout: HeaderLayout::Modern,
        };
        match decode_channel_header(&block, 58, &file).unwrap_err() {
            DmgError::CorruptHeader { line, reason } => {
                assert_eq!(line, 69);
                assert!(reason.contains("starting at line 59"), "{reason}");
                assert!(reason.contains("10 of 45"), "{reason}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_numeric_header_fixed_width() {
        // Fields may touch without separating blanks.
        let lines = ["  500 -999   12-1234", ""];
        let ints = NumericHeader::<i32>::parse(&lines, 1, 4, 5, MISSING).unwrap();
        assert_eq!(ints.len(), 8);
        assert_eq!(ints.get(0), Some(500));
        assert_eq!(ints.get(1), None);
        assert_eq!(ints.get(2), Some(12));
        assert_eq!(ints.get(3), Some(-1234));
        assert_eq!(ints.get(4), None);
        assert_eq!(ints.get(100), None);
    }

    #[test]
    fn test_numeric_header_reals_and_sentinel() {
        let lines = ["     1.915    -999.0 0.0108814"];
        let reals = NumericHeader::<f64>::parse(&lines, 1, 8, 10, -999.0).unwrap();
        assert_eq!(reals.value(0), 1.915);
        assert!(reals.value(1).is_nan());
        assert_eq!(reals.value(2), 0.0108814);
        assert!(reals.value(3).is_nan());
    }

    #[test]
    fn test_numeric_header_bad_field() {
        let lines = ["   12  abc"];
        let err = NumericHeader::<i32>::parse(&lines, 30, 2, 5, MISSING).unwrap_err();
        match err {
            DmgError::CorruptHeader { line, .. } => assert_eq!(line, 30),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_coordinates() {
        let c = parse_coordinates("Station No. 89146   40.941N, 123.633W").unwrap();
        assert_eq!(c.latitude, 40.941);
        assert_eq!(c.longitude, -123.633);
        let c = parse_coordinates("Station No. 1   33.5S, 18.25E").unwrap();
        assert_eq!(c.latitude, -33.5);
        assert_eq!(c.longitude, 18.25);
        assert!(parse_coordinates("Station No. 1").is_none());
    }

    #[test]
    fn test_parse_station_name() {
        let line = "LOS ANGELES -  116TH ST.  SCHOOL    more text";
        assert_eq!(
            parse_station_name(line, Some(32)),
            "LOS ANGELES - 116TH ST. SCHOOL"
        );
        assert_eq!(parse_station_name("  Willow   Creek ", None), "Willow Creek");
    }

    #[test]
    fn test_parse_instrument() {
        assert_eq!(
            parse_instrument("Instrument: Etna   S/N 2500"),
            ("Etna".to_string(), "2500".to_string())
        );
        assert_eq!(
            parse_instrument("Instrument:          S/N 4310   "),
            (String::new(), "4310".to_string())
        );
        assert_eq!(
            parse_instrument("Instrument: SMA-1"),
            ("SMA-1".to_string(), String::new())
        );
        assert_eq!(parse_instrument("no instrument"), (String::new(), String::new()));
    }
}
