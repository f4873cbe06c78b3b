//! Fuzz target: `LogRecord::parse_line`
//!
//! Feeds arbitrary text to the telemetry line parser.
//!
//! Invariants checked:
//! - No panics under any input
//! - Anything accepted writes back to a line that parses to the same record
//!
//! cargo fuzz run fuzz_log_record

#![no_main]

use chrono::SubsecRound;
use libfuzzer_sys::fuzz_target;
use sousvide::telemetry::LogRecord;

fuzz_target!(|data: &[u8]| {
    let Ok(line) = std::str::from_utf8(data) else {
        return;
    };
    let Some(record) = LogRecord::parse_line(line) else {
        return;
    };
    // Only finite temperatures can be written back at two decimals.
    if !record.temperature.is_finite() || record.temperature.abs() > 1.0e6 {
        return;
    }

    let rewritten = record.to_line();
    let again = LogRecord::parse_line(&rewritten).expect("written line must parse");
    assert_eq!(again.timestamp, record.timestamp.trunc_subsecs(6));
    assert_eq!(again.heating, record.heating);
    assert!((again.temperature - record.temperature).abs() <= 0.0051);
});
