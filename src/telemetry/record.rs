//! One line of the heating log.

use chrono::{Local, NaiveDateTime, SubsecRound};
use serde::Serialize;

/// Timestamp layout written to the file (local time, microseconds).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

// Reading accepts any fraction length, including none.
const TIMESTAMP_PARSE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogRecord {
    pub timestamp: NaiveDateTime,
    pub temperature: f32,
    pub heating: bool,
}

impl LogRecord {
    pub fn new(timestamp: NaiveDateTime, temperature: f32, heating: bool) -> Self {
        Self {
            timestamp: timestamp.trunc_subsecs(6),
            temperature,
            heating,
        }
    }

    pub fn now(temperature: f32, heating: bool) -> Self {
        Self::new(Local::now().naive_local(), temperature, heating)
    }

    /// `<timestamp>\t<temperature .2>\t<0|1>\n`
    pub fn to_line(&self) -> String {
        format!(
            "{}\t{:.2}\t{}\n",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.temperature,
            u8::from(self.heating)
        )
    }

    /// Parse a line written by [`to_line`](Self::to_line).  The temperature
    /// comes back rounded to two decimals.
    pub fn parse_line(line: &str) -> Option<Self> {
        let mut fields = line.trim_end_matches(['\n', '\r']).split('\t');
        let timestamp =
            NaiveDateTime::parse_from_str(fields.next()?, TIMESTAMP_PARSE_FORMAT).ok()?;
        let temperature = fields.next()?.parse::<f32>().ok()?;
        let heating = match fields.next()? {
            "0" => false,
            "1" => true,
            _ => return None,
        };
        if fields.next().is_some() {
            return None;
        }
        Some(Self {
            timestamp,
            temperature,
            heating,
        })
    }
}
