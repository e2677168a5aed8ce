use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireMessage {
    pub station_id: String,
    pub alarm1: String,
    pub alarm2: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("message is not valid UTF-8")]
    InvalidUtf8,
    #[error("expected 3 whitespace separated tokens, found {found}")]
    WrongTokenCount { found: usize },
}

pub fn encode(station_id: u64, alarm1: u64, alarm2: u64) -> Vec<u8> {
    format!("{station_id} {alarm1} {alarm2}").into_bytes()
}

pub fn decode(bytes: &[u8]) -> Result<WireMessage, DecodeError> {
    let text = std::str::from_utf8(bytes).map_err(|_| DecodeError::InvalidUtf8)?;
    let tokens: Vec<&str> = text.split_whitespace().collect();

    match tokens.as_slice() {
        [station_id, alarm1, alarm2] => Ok(WireMessage {
            station_id: (*station_id).to_string(),
            alarm1: (*alarm1).to_string(),
            alarm2: (*alarm2).to_string(),
        }),
        _ => Err(DecodeError::WrongTokenCount {
            found: tokens.len(),
        }),
    }
}
