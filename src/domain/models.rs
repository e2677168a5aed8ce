use serde::Serialize;

use crate::domain::validation::ParsedReport;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StationReport {
    pub station_id: i64,
    pub last_seen: String,
    pub alarm1: bool,
    pub alarm2: bool,
}

impl StationReport {
    pub fn from_parsed(parsed: ParsedReport, last_seen: impl Into<String>) -> Self {
        Self {
            station_id: parsed.station_id,
            last_seen: last_seen.into(),
            alarm1: parsed.alarm1,
            alarm2: parsed.alarm2,
        }
    }
}
