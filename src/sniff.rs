//! DMG format detection.
//!
//! A DMG file announces its processing stage in the first few header lines.
//! [`is_format`] only looks for those markers; [`detect_stage`] maps the
//! first line of a file onto a [`ProcessLevel`] the reader can decode.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::types::ProcessLevel;
use crate::{DmgError, Result};

pub const V1_MARKER: &str = "UNCORRECTED ACCELEROGRAM";
pub const V2_MARKER: &str = "CORRECTED ACCELEROGRAM";
pub const V3_MARKER: &str = "RESPONSE AND FOURIER AMPLITUDE SPECTRA";

const MARKERS: [&str; 3] = [V1_MARKER, V2_MARKER, V3_MARKER];

/// Number of leading non-blank lines inspected by [`is_format`].
const SNIFF_LINES: usize = 3;

/// Check whether `path` looks like a DMG file.
///
/// Text is decoded lossily, as [`read`](crate::read) does. Never fails:
/// unreadable files simply return `false`.
pub fn is_format(path: impl AsRef<Path>) -> bool {
    let Ok(file) = File::open(path.as_ref()) else {
        return false;
    };
    let mut reader = BufReader::new(file);
    let mut lines: Vec<String> = Vec::with_capacity(SNIFF_LINES);
    let mut buf = Vec::new();
    while lines.len() < SNIFF_LINES {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                if lines.is_empty() && line.trim().is_empty() {
                    continue;
                }
                lines.push(line.into_owned());
            }
            Err(_) => return false,
        }
    }
    has_marker(lines.iter().map(String::as_str))
}

/// Check the leading lines for any DMG processing-stage marker.
///
/// Blank lines before the first text line are skipped.
pub fn has_marker<'a>(lines: impl IntoIterator<Item = &'a str>) -> bool {
    lines
        .into_iter()
        .skip_while(|line| line.trim().is_empty())
        .take(SNIFF_LINES)
        .any(|line| {
            let upper = line.to_ascii_uppercase();
            MARKERS.iter().any(|marker| upper.contains(marker))
        })
}

/// Determine the processing stage from the first line of a file.
///
/// The uncorrected marker contains the corrected one, so it is tested first.
pub fn detect_stage(first_line: &str) -> Result<ProcessLevel> {
    let upper = first_line.to_ascii_uppercase();
    if upper.contains(V1_MARKER) {
        Ok(ProcessLevel::V1)
    } else if upper.contains(V2_MARKER) {
        Ok(ProcessLevel::V2)
    } else if upper.contains(V3_MARKER) {
        Err(DmgError::UnsupportedVariant(
            "response spectra volumes carry no time series".into(),
        ))
    } else {
        Err(DmgError::UnsupportedVariant(format!(
            "no processing stage on first line: \"{}\"",
            first_line.trim()
        )))
    }
}
