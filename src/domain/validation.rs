use thiserror::Error;

use crate::domain::message::WireMessage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedReport {
    pub station_id: i64,
    pub alarm1: bool,
    pub alarm2: bool,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} is not an integer: {value:?}")]
    NotNumeric { field: &'static str, value: String },
    #[error("{field} must be 0 or 1, got {value}")]
    AlarmOutOfRange { field: &'static str, value: i64 },
    #[error("station_id must not be negative, got {0}")]
    NegativeStationId(i64),
}

pub fn validate(message: &WireMessage) -> Result<ParsedReport, ValidationError> {
    let station_id = parse_integer("station_id", &message.station_id)?;
    let alarm1 = parse_integer("alarm1", &message.alarm1)?;
    let alarm2 = parse_integer("alarm2", &message.alarm2)?;

    let alarm1 = alarm_state("alarm1", alarm1)?;
    let alarm2 = alarm_state("alarm2", alarm2)?;

    if station_id < 0 {
        return Err(ValidationError::NegativeStationId(station_id));
    }

    Ok(ParsedReport {
        station_id,
        alarm1,
        alarm2,
    })
}

fn parse_integer(field: &'static str, raw: &str) -> Result<i64, ValidationError> {
    raw.parse::<i64>()
        .map_err(|_| ValidationError::NotNumeric {
            field,
            value: raw.to_string(),
        })
}

fn alarm_state(field: &'static str, value: i64) -> Result<bool, ValidationError> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        _ => Err(ValidationError::AlarmOutOfRange { field, value }),
    }
}
