use std::time::Duration;

use crate::app::AppError;

#[derive(Debug, Clone)]
pub struct CollectorConfig {
    pub bind: String,
    pub db_path: String,
    pub worker_pool_size: usize,
    pub dispatch_queue_capacity: usize,
    pub read_timeout_ms: u64,
    pub max_message_bytes: usize,
    pub send_ack: bool,
    pub store_busy_retries: u32,
    pub store_busy_timeout_ms: u64,
}

impl CollectorConfig {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            bind: string_or_default(&lookup, "COLLECTOR_BIND", "127.0.0.1:12345"),
            db_path: string_or_default(&lookup, "DB_PATH", "data.SQLite"),
            worker_pool_size: positive_or_default(&lookup, "WORKER_POOL_SIZE", 10)?,
            dispatch_queue_capacity: positive_or_default(&lookup, "DISPATCH_QUEUE_CAPACITY", 128)?,
            read_timeout_ms: parse_or_default(&lookup, "READ_TIMEOUT_MS", 5000_u64)?,
            max_message_bytes: positive_or_default(&lookup, "MAX_MESSAGE_BYTES", 1024)?,
            send_ack: flag_or_default(&lookup, "SEND_ACK", true)?,
            store_busy_retries: parse_or_default(&lookup, "STORE_BUSY_RETRIES", 5_u32)?,
            store_busy_timeout_ms: parse_or_default(&lookup, "STORE_BUSY_TIMEOUT_MS", 1000_u64)?,
        })
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        (self.read_timeout_ms > 0).then(|| Duration::from_millis(self.read_timeout_ms))
    }
}

#[derive(Debug, Clone)]
pub struct ReporterConfig {
    pub collector_addr: String,
    pub status_file: String,
    pub report_interval_secs: u64,
    pub connect_timeout_ms: u64,
}

impl ReporterConfig {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            collector_addr: string_or_default(&lookup, "COLLECTOR_ADDR", "127.0.0.1:12345"),
            status_file: string_or_default(&lookup, "STATUS_FILE", "status.txt"),
            report_interval_secs: parse_or_default(&lookup, "REPORT_INTERVAL_SECS", 60_u64)?,
            connect_timeout_ms: positive_or_default(&lookup, "CONNECT_TIMEOUT_MS", 5000)?,
        })
    }
}

fn string_or_default<F>(lookup: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_or_default<T, F>(lookup: &F, key: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr + Copy,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| AppError::config(format!("{key} must be a valid number"))),
        None => Ok(default),
    }
}

fn flag_or_default<F>(lookup: &F, key: &str, default: bool) -> Result<bool, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).map(|v| v.trim().to_ascii_lowercase()) {
        Some(raw) => match raw.as_str() {
            "1" | "true" | "yes" => Ok(true),
            "0" | "false" | "no" => Ok(false),
            _ => Err(AppError::config(format!("{key} must be true or false"))),
        },
        None => Ok(default),
    }
}

fn positive_or_default<T, F>(lookup: &F, key: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr + Copy + PartialOrd + Default,
    F: Fn(&str) -> Option<String>,
{
    let value = parse_or_default(lookup, key, default)?;
    if value <= T::default() {
        return Err(AppError::config(format!("{key} must be greater than zero")));
    }
    Ok(value)
}
