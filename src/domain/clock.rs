use chrono::{Local, NaiveDateTime};

pub const LAST_SEEN_FORMAT: &str = "%Y-%m-%d %H:%M";

pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

#[derive(Debug, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

pub fn format_last_seen(timestamp: NaiveDateTime) -> String {
    timestamp.format(LAST_SEEN_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::format_last_seen;

    #[test]
    fn formats_to_minute_resolution() {
        let timestamp = NaiveDate::from_ymd_opt(2026, 3, 4)
            .and_then(|date| date.and_hms_opt(5, 6, 59))
            .expect("timestamp should be valid");
        assert_eq!(format_last_seen(timestamp), "2026-03-04 05:06");
    }

    #[test]
    fn formatted_values_sort_chronologically() {
        let earlier = NaiveDate::from_ymd_opt(2026, 9, 30)
            .and_then(|date| date.and_hms_opt(23, 59, 0))
            .expect("timestamp should be valid");
        let later = NaiveDate::from_ymd_opt(2026, 10, 1)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .expect("timestamp should be valid");
        assert!(format_last_seen(earlier) < format_last_seen(later));
    }
}
