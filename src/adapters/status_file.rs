use std::fs;
use std::io;
use std::path::Path;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalStationStatus {
    pub station_id: u64,
    pub alarm1: u64,
    pub alarm2: u64,
}

#[derive(Debug, Error)]
pub enum StatusFileError {
    #[error("failed to read status file: {0}")]
    Io(#[from] io::Error),
    #[error("status file must contain exactly 3 lines, found {0}")]
    LineCount(usize),
    #[error("line {line} is not a non-negative integer: {value:?}")]
    NotDigits { line: usize, value: String },
}

pub fn read_station_status(path: &Path) -> Result<LocalStationStatus, StatusFileError> {
    let content = fs::read_to_string(path)?;
    parse_station_status(&content)
}

pub fn parse_station_status(content: &str) -> Result<LocalStationStatus, StatusFileError> {
    let lines: Vec<&str> = content.lines().collect();
    if lines.len() != 3 {
        return Err(StatusFileError::LineCount(lines.len()));
    }

    let mut values = [0_u64; 3];
    for (index, raw) in lines.iter().enumerate() {
        values[index] = parse_digits(index + 1, raw)?;
    }

    Ok(LocalStationStatus {
        station_id: values[0],
        alarm1: values[1],
        alarm2: values[2],
    })
}

fn parse_digits(line: usize, raw: &str) -> Result<u64, StatusFileError> {
    let not_digits = || StatusFileError::NotDigits {
        line,
        value: raw.to_string(),
    };

    if raw.is_empty() || !raw.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(not_digits());
    }

    raw.parse::<u64>().map_err(|_| not_digits())
}
