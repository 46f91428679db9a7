use chrono::{NaiveDate, NaiveDateTime};

/// Day-first parse of `"DD/MM/YYYY"` (also `-` separated, two-digit year,
/// optional time-of-day) → `NaiveDate`. ISO `YYYY-MM-DD` is accepted as a
/// fallback since spreadsheet exports render dates that way. Anything else
/// returns `None` and is filter-excluded upstream.
pub fn parse_day_first(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    // drop a trailing " HH:MM:SS"
    let date_part = s.split_whitespace().next()?;

    // four-digit-year formats first so "05/09/2025" never half-matches %y
    const FORMATS: [&str; 6] = [
        "%d/%m/%Y", "%d-%m-%Y", "%Y-%m-%d", "%Y/%m/%d", "%d/%m/%y", "%d-%m-%y",
    ];
    for fmt in FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(date_part, fmt) {
            return Some(date);
        }
    }

    // ISO datetime with a 'T' separator survives split_whitespace intact
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|dt| dt.date())
}

/// `"Jan"`..`"Dec"` label for a date; this is what rows are filtered and
/// columns are named by.
pub fn month_label(date: NaiveDate) -> String {
    date.format("%b").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_day_first_not_month_first() {
        // 5th of September, not 9th of May
        let d = parse_day_first("05/09/2025").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2025, 9, 5).unwrap());
        assert_eq!(month_label(d), "Sep");
    }

    #[test]
    fn parses_variants() {
        let sep5 = NaiveDate::from_ymd_opt(2025, 9, 5).unwrap();
        assert_eq!(parse_day_first("5/9/2025"), Some(sep5));
        assert_eq!(parse_day_first("05-09-2025"), Some(sep5));
        assert_eq!(parse_day_first("05/09/25"), Some(sep5));
        assert_eq!(parse_day_first("2025-09-05"), Some(sep5));
        assert_eq!(parse_day_first("05/09/2025 14:30:00"), Some(sep5));
        assert_eq!(parse_day_first("2025-09-05T14:30:00"), Some(sep5));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_day_first(""), None);
        assert_eq!(parse_day_first("not a date"), None);
        assert_eq!(parse_day_first("32/01/2025"), None);
        assert_eq!(parse_day_first("05/13/2025"), None);
    }
}
