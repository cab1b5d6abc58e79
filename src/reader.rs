//! Channel-block iteration and stream assembly.
//!
//! [`ChannelReader`] walks the channel blocks of a DMG text. [`parse`] and
//! [`read`] collect them into a [`Stream`], applying [`ReadOptions`].

use std::path::Path;

use crate::data::{self, DataKind};
use crate::header::{ChannelHeader, FileHeader, decode_channel_header};
use crate::integrate;
use crate::sniff;
use crate::trace::{DEFAULT_LOCATION, SOURCE_FORMAT, StandardMetadata, Stats, Stream, Trace};
use crate::types::{ProcessLevel, Units};
use crate::{DmgError, Result};

/// End-of-record line closing a channel block.
const END_OF_RECORD: &str = "/&";

/// Caller overrides for a read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadOptions {
    pub units: Units,
    pub location: String,
}

impl ReadOptions {
    /// Defaults: acceleration, location `"--"`.
    pub fn new() -> Self {
        Self {
            units: Units::Acc,
            location: DEFAULT_LOCATION.into(),
        }
    }

    /// Set the output units.
    pub fn with_units(mut self, units: Units) -> Self {
        self.units = units;
        self
    }

    /// Set the location code written to every trace.
    pub fn with_location(mut self, location: &str) -> Self {
        self.location = location.into();
        self
    }
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// One decoded channel block: header plus acceleration in cm/s^2.
#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    pub header: ChannelHeader,
    pub acceleration: Vec<f64>,
}

/// Iterator over the channel blocks of a DMG text.
///
/// Each call to `next()` decodes the next block and advances past it.
/// Iteration stops when the text is exhausted or a decode error occurs.
pub struct ChannelReader<'a> {
    lines: Vec<&'a str>,
    offset: usize,
    file: FileHeader,
}

impl<'a> ChannelReader<'a> {
    /// Create a reader, resolving the file-level header from the first block.
    pub fn new(text: &'a str) -> Result<Self> {
        let lines: Vec<&str> = text.lines().collect();
        let offset = skip_blank(&lines, 0);
        let file = FileHeader::resolve(&lines[offset..])?;
        Ok(Self {
            lines,
            offset,
            file,
        })
    }

    /// Processing stage and header layout of the file.
    pub fn file_header(&self) -> FileHeader {
        self.file
    }

    fn read_channel(&mut self) -> Result<Channel> {
        let start = self.offset;
        let header_end = (start + self.file.stage.header_rows()).min(self.lines.len());
        let header = decode_channel_header(&self.lines[start..header_end], start, &self.file)?;

        let (accel, mut cursor) = data::read_block(
            &self.lines,
            header_end,
            DataKind::Acceleration,
            header.declared.acceleration,
        )?;
        let scale = accel.descriptor.acceleration_scale().ok_or_else(|| {
            DmgError::malformed_data(
                header_end + 1,
                format!("unsupported acceleration unit \"{}\"", accel.descriptor.unit),
            )
        })?;
        let mut acceleration = accel.samples;
        if scale != 1.0 {
            acceleration.iter_mut().for_each(|v| *v *= scale);
            log::debug!("scaled acceleration from {} to cm/s^2", accel.descriptor.unit);
        }

        if self.file.stage == ProcessLevel::V2 {
            // Derived series are recomputed from acceleration; these blocks
            // are only validated.
            let (_, next) = data::read_block(
                &self.lines,
                cursor,
                DataKind::Velocity,
                header.declared.velocity,
            )?;
            let (_, next) = data::read_block(
                &self.lines,
                next,
                DataKind::Displacement,
                header.declared.displacement,
            )?;
            cursor = next;
        }

        if self.lines.get(cursor).map(|l| l.trim()) == Some(END_OF_RECORD) {
            cursor += 1;
        }
        self.offset = cursor;

        log::debug!(
            "channel {} ({}): {} samples at {} s",
            header.channel,
            header.station,
            acceleration.len(),
            header.delta
        );
        Ok(Channel {
            header,
            acceleration,
        })
    }
}

impl Iterator for ChannelReader<'_> {
    type Item = Result<Channel>;

    fn next(&mut self) -> Option<Self::Item> {
        self.offset = skip_blank(&self.lines, self.offset);
        if self.offset >= self.lines.len() {
            return None;
        }
        match self.read_channel() {
            Ok(channel) => Some(Ok(channel)),
            Err(e) => {
                // Move offset to end to stop iteration
                self.offset = self.lines.len();
                Some(Err(e))
            }
        }
    }
}

fn skip_blank(lines: &[&str], mut offset: usize) -> usize {
    while offset < lines.len() && lines[offset].trim().is_empty() {
        offset += 1;
    }
    offset
}

/// Parse DMG text into a stream.
///
/// Fails with [`DmgError::FormatMismatch`] when no DMG marker is present.
pub fn parse(text: &str, options: &ReadOptions) -> Result<Stream> {
    assemble(text, options, "")
}

/// Read a DMG file into a stream.
///
/// The file handle is released before decoding starts.
pub fn read(path: impl AsRef<Path>, options: &ReadOptions) -> Result<Stream> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    let text = String::from_utf8_lossy(&bytes);
    let source_file = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    assemble(&text, options, &source_file)
}

fn assemble(text: &str, options: &ReadOptions, source_file: &str) -> Result<Stream> {
    if !sniff::has_marker(text.lines()) {
        return Err(DmgError::FormatMismatch(
            "no DMG processing-stage marker in the leading lines".into(),
        ));
    }
    let reader = ChannelReader::new(text)?;
    let file = reader.file_header();

    let mut traces: Vec<Trace> = Vec::new();
    for channel in reader {
        let trace = build_trace(channel?, file.stage, options, source_file);
        if let Some(first) = traces.first() {
            if timing_differs(&first.stats, &trace.stats) {
                log::warn!(
                    "channel {} timing ({}, {} s) differs from channel {} ({}, {} s)",
                    trace.stats.channel,
                    trace.stats.starttime,
                    trace.stats.delta,
                    first.stats.channel,
                    first.stats.starttime,
                    first.stats.delta
                );
            }
        }
        traces.push(trace);
    }
    Ok(Stream::new(traces))
}

/// Channels of one recording are expected to share start time and delta.
fn timing_differs(first: &Stats, other: &Stats) -> bool {
    first.starttime != other.starttime || first.delta != other.delta
}

fn build_trace(
    channel: Channel,
    stage: ProcessLevel,
    options: &ReadOptions,
    source_file: &str,
) -> Trace {
    let Channel {
        header,
        acceleration,
    } = channel;
    let data = integrate::convert(acceleration, header.delta, options.units);
    Trace {
        stats: Stats {
            network: header.network,
            station: header.station,
            channel: header.channel,
            location: options.location.clone(),
            starttime: header.starttime,
            delta: header.delta,
            npts: data.len(),
            coordinates: header.coordinates,
            standard: StandardMetadata {
                units: options.units,
                station_name: header.station_name,
                instrument: header.instrument,
                sensor_serial_number: header.sensor_serial_number,
                horizontal_orientation: f64::from(header.orientation),
                instrument_period: header.instrument_period,
                instrument_damping: header.instrument_damping,
                process_level: stage,
                process_time: header.process_time,
                source_format: SOURCE_FORMAT.into(),
                source: header.source,
                source_file: source_file.to_string(),
            },
            format_specific: header.format_specific,
        },
        data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HeaderLayout;

    const MODERN_V2: &str = include_str!("../tests/data/CE89146.V2");
    const LEGACY_V2: &str = include_str!("../tests/data/LA116TH.RAW");
    const UNCORRECTED_V1: &str = include_str!("../tests/data/CE89146.V1");

    #[test]
    fn test_reader_file_header() {
        let reader = ChannelReader::new(MODERN_V2).unwrap();
        assert_eq!(
            reader.file_header(),
            FileHeader {
                stage: ProcessLevel::V2,
                layout: HeaderLayout::Modern,
            }
        );
        let reader = ChannelReader::new(LEGACY_V2).unwrap();
        assert_eq!(reader.file_header().layout, HeaderLayout::Legacy);
        let reader = ChannelReader::new(UNCORRECTED_V1).unwrap();
        assert_eq!(reader.file_header().stage, ProcessLevel::V1);
    }

    #[test]
    fn test_reader_multiple_channels() {
        let channels: Vec<_> = ChannelReader::new(MODERN_V2)
            .unwrap()
            .collect::<Result<Vec<_>>>()
            .unwrap();
        assert_eq!(channels.len(), 3);
        let orientations: Vec<_> = channels.iter().map(|c| c.header.orientation).collect();
        assert_eq!(orientations, [360, 90, 500]);
        for channel in &channels {
            assert_eq!(channel.acceleration.len(), 20);
            assert_eq!(channel.header.declared.acceleration, Some(20));
        }
    }

    #[test]
    fn test_reader_leading_blank_lines() {
        let text = format!("\n\n{MODERN_V2}");
        assert_eq!(ChannelReader::new(&text).unwrap().count(), 3);
    }

    #[test]
    fn test_reader_stops_on_error() {
        // Corrupt the second channel's record line.
        let lines: Vec<&str> = MODERN_V2.lines().collect();
        let mut corrupted: Vec<String> = lines.iter().map(|l| l.to_string()).collect();
        corrupted[59] = corrupted[59].replace("Start time:", "Trigger time:");
        let text = corrupted.join("\n");

        let results: Vec<_> = ChannelReader::new(&text).unwrap().collect();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(matches!(
            results[1],
            Err(DmgError::CorruptHeader { line: 60, .. })
        ));
    }

    #[test]
    fn test_parse_keeps_channels_with_differing_timing() {
        // Shift the second channel's start by one second.
        let mut lines: Vec<String> = MODERN_V2.lines().map(String::from).collect();
        assert!(lines[59].contains("21:06:45.0"));
        lines[59] = lines[59].replace("21:06:45.0", "21:06:46.0");
        let text = lines.join("\n");

        let stream = parse(&text, &ReadOptions::new()).unwrap();
        assert_eq!(stream.len(), 3);
        assert_eq!(
            stream[1].stats.starttime - stream[0].stats.starttime,
            chrono::TimeDelta::seconds(1)
        );
        assert_eq!(stream[2].stats.starttime, stream[0].stats.starttime);
        assert!(timing_differs(&stream[0].stats, &stream[1].stats));
        assert!(!timing_differs(&stream[0].stats, &stream[2].stats));
    }

    #[test]
    fn test_reader_v1_scaled_to_cm_s2() {
        let channel = ChannelReader::new(UNCORRECTED_V1)
            .unwrap()
            .next()
            .unwrap()
            .unwrap();
        assert!((channel.acceleration[1] - 0.003694 * data::STANDARD_GRAVITY).abs() < 1e-9);
    }

    #[test]
    fn test_read_options_builder() {
        let options = ReadOptions::default();
        assert_eq!(options.units, Units::Acc);
        assert_eq!(options.location, "--");
        let options = ReadOptions::new().with_units(Units::Vel).with_location("10");
        assert_eq!(options.units, Units::Vel);
        assert_eq!(options.location, "10");
    }

    #[test]
    fn test_parse_empty_stream_rejected() {
        assert!(matches!(
            parse("", &ReadOptions::new()),
            Err(DmgError::FormatMismatch(_))
        ));
    }
}
