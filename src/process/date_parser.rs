use chrono::{NaiveDate, NaiveDateTime};

/// Fast parse of `"YYYY-MM-DD HH:MM:SS[.fff…]"` into a naive datetime.
///
/// The date separator may be `-` or `/`, the date/time separator a space or
/// `T`. Any fractional-second suffix is accepted and truncated. A bare date
/// parses as midnight.
pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim().trim_matches('"');
    if !s.is_ascii() || s.len() < 10 {
        return None;
    }
    let sep = &s[4..5];
    if (sep != "-" && sep != "/") || &s[7..8] != sep {
        return None;
    }
    let year: i32 = s[0..4].parse().ok()?;
    let month: u32 = s[5..7].parse().ok()?;
    let day: u32 = s[8..10].parse().ok()?;
    let date = NaiveDate::from_ymd_opt(year, month, day)?;

    if s.len() == 10 {
        return date.and_hms_opt(0, 0, 0);
    }

    // minimal length + separators check
    if s.len() < 19 {
        return None;
    }
    let t = &s[10..11];
    if (t != " " && t != "T") || &s[13..14] != ":" || &s[16..17] != ":" {
        return None;
    }
    let hour: u32 = s[11..13].parse().ok()?;
    let min: u32 = s[14..16].parse().ok()?;
    let sec: u32 = s[17..19].parse().ok()?;

    let rest = &s[19..];
    if !rest.is_empty() {
        let frac = rest.strip_prefix('.')?;
        if frac.is_empty() || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
    }

    date.and_hms_opt(hour, min, sec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn parses_plain_timestamp() {
        let dt = parse_datetime("2016-02-08 05:46:00").unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2016, 2, 8));
        assert_eq!((dt.hour(), dt.minute(), dt.second()), (5, 46, 0));
    }

    #[test]
    fn parses_nanosecond_suffix_and_variants() {
        let dt = parse_datetime("2022-09-08 21:38:00.000000000").unwrap();
        assert_eq!(dt.hour(), 21);
        assert!(parse_datetime("2022-09-08T21:38:00").is_some());
        assert!(parse_datetime("2022/09/08 21:38:00").is_some());
        assert!(parse_datetime("\"2022/09/08 21:38:00\"").is_some());
        assert_eq!(parse_datetime("2022-09-08").unwrap().hour(), 0);
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_datetime("").is_none());
        assert!(parse_datetime("not a date").is_none());
        assert!(parse_datetime("2022-13-08 21:38:00").is_none());
        assert!(parse_datetime("2022-09-08 25:38:00").is_none());
        assert!(parse_datetime("2022-09-08 21:38").is_none());
        assert!(parse_datetime("2022-09-08 21:38:00+05").is_none());
        assert!(parse_datetime("2022-09/08").is_none());
        assert!(parse_datetime("2022-09-08 21:38:0é").is_none());
    }
}
