use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

const DATE_TIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
];

const DATE_FORMATS: [&str; 6] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d %B %Y",
    "%B %d, %Y",
    "%b %d, %Y",
];

/// Parse a date-like string. Returns `None` for anything unrecognized.
///
/// Zoned timestamps are converted to UTC; date-only values land at midnight.
pub fn parse_date(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    if let Some(dt) = DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
    {
        return Some(dt);
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .map(|d| d.and_time(NaiveTime::MIN))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_time(NaiveTime::MIN)
    }

    #[test]
    fn iso_dates() {
        assert_eq!(parse_date("2019-01-01"), Some(ymd(2019, 1, 1)));
        assert_eq!(parse_date(" 2019-05-21 "), Some(ymd(2019, 5, 21)));
    }

    #[test]
    fn other_common_layouts() {
        assert_eq!(parse_date("05/21/2019"), Some(ymd(2019, 5, 21)));
        assert_eq!(parse_date("2019/05/21"), Some(ymd(2019, 5, 21)));
        assert_eq!(parse_date("21 May 2019"), Some(ymd(2019, 5, 21)));
        assert_eq!(parse_date("May 21, 2019"), Some(ymd(2019, 5, 21)));
    }

    #[test]
    fn timestamps_keep_their_time() {
        let at = NaiveDate::from_ymd_opt(2019, 5, 21).unwrap().and_hms_opt(13, 5, 0).unwrap();
        assert_eq!(parse_date("2019-05-21 13:05:00"), Some(at));
        assert_eq!(parse_date("2019-05-21T13:05:00"), Some(at));
        assert_eq!(parse_date("2019-05-21T15:05:00+02:00"), Some(at));
    }

    #[test]
    fn zoned_timestamp_can_move_to_previous_utc_day() {
        let at = NaiveDate::from_ymd_opt(2019, 5, 20).unwrap().and_hms_opt(22, 30, 0).unwrap();
        assert_eq!(parse_date("2019-05-21T00:30:00+02:00"), Some(at));
    }

    #[test]
    fn garbage_is_none() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("yesterday"), None);
        assert_eq!(parse_date("2019-13-45"), None);
    }
}
