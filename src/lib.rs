//! Pure Rust reader for CSMIP/DMG strong-motion accelerograph files.
//!
//! Decodes V1 (uncorrected) and V2 (corrected) DMG text files into
//! calibrated traces: format sniffing, legacy/modern header layouts, start
//! time reconstruction from free-text header lines, fixed-width sample
//! blocks, and velocity/displacement by numerical integration.
//!
//! # Reading a file
//!
//! ```no_run
//! use dmg_rs::{ReadOptions, Units, is_format, read};
//!
//! let path = "CE89146.V2";
//! if is_format(path) {
//!     let stream = read(path, &ReadOptions::new().with_units(Units::Vel)).unwrap();
//!     for trace in &stream {
//!         println!("{trace}");
//!     }
//! }
//! ```
//!
//! # Extracting header timestamps
//!
//! ```
//! use chrono::{NaiveDate, TimeDelta};
//! use dmg_rs::time::{extract_date, extract_time};
//!
//! let line = "JANUARY 17, 1994 04:31 PST   (ORIGIN(CIT): 01/17/94, 12:30:55.4 GMT)";
//! assert_eq!(extract_date(line), NaiveDate::from_ymd_opt(1994, 1, 17));
//! assert_eq!(
//!     extract_time(line),
//!     Some(TimeDelta::seconds(45055) + TimeDelta::microseconds(399_999))
//! );
//! ```

pub mod channel;
pub mod data;
pub mod error;
pub mod header;
pub mod integrate;
pub mod network;
pub mod reader;
pub mod sniff;
pub mod time;
pub mod trace;
pub mod types;

pub use error::{DmgError, Result};
pub use header::FileHeader;
pub use reader::{Channel, ChannelReader, ReadOptions, parse, read};
pub use sniff::is_format;
pub use trace::{Coordinates, FormatSpecific, StandardMetadata, Stats, Stream, Trace};
pub use types::{HeaderLayout, ProcessLevel, Units};
