//! Compile-time smoke test: verify top-level re-exports work.

use std::path::Path;

use dmg_rs::{
    Channel, ChannelReader, Coordinates, DmgError, FileHeader, FormatSpecific, HeaderLayout,
    ProcessLevel, ReadOptions, Result, StandardMetadata, Stats, Stream, Trace, Units, is_format,
    parse, read,
};

#[test]
fn top_level_imports_compile() {
    // Just verify the types are usable from the crate root
    let _: fn(&str, &ReadOptions) -> Result<Stream> = parse;
    let _: fn(&Path, &ReadOptions) -> Result<Stream> = |p, o| read(p, o);
    let _: fn(&Path) -> bool = |p| is_format(p);
    let _: fn(&str) -> Result<ChannelReader<'_>> = |s| ChannelReader::new(s);

    let _opts = ReadOptions::new()
        .with_units(Units::Disp)
        .with_location("00");
    let _fh = FileHeader {
        stage: ProcessLevel::V1,
        layout: HeaderLayout::Modern,
    };
    let _fs = FormatSpecific::Legacy {
        sensor_sensitivity: 1.0,
        time_sd: 0.1,
    };
    let _c = Coordinates {
        latitude: 0.0,
        longitude: 0.0,
        elevation: f64::NAN,
    };
    let _stream = Stream::new(Vec::<Trace>::new());

    // Accessible types
    let _e: Option<DmgError> = None;
    let _ch: Option<Channel> = None;
    let _st: Option<Stats> = None;
    let _sm: Option<StandardMetadata> = None;
}
