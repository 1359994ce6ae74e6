use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Date-only layouts tried in order. Slash dates are read month-first and
/// fall back to day-first when the first field cannot be a month.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%m/%d/%y",
    "%m/%d/%Y",
    "%d/%m/%y",
    "%d/%m/%Y",
    "%Y/%m/%d",
    "%d.%m.%Y",
    "%m-%d-%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
    "%d-%b-%Y",
    "%b %d %Y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Parse a single date cell, allowing each cell in a column to use a
/// different layout. Time components are discarded.
pub fn parse_mixed_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn accepts_mixed_layouts_in_one_column() {
        let cells = ["2021-01-15", "01/15/2021", "1/5/2021", "2021/01/15", "January 15, 2021"];
        let parsed: Vec<_> = cells.iter().map(|c| parse_mixed_date(c)).collect();
        assert_eq!(
            parsed,
            vec![
                Some(ymd(2021, 1, 15)),
                Some(ymd(2021, 1, 15)),
                Some(ymd(2021, 1, 5)),
                Some(ymd(2021, 1, 15)),
                Some(ymd(2021, 1, 15)),
            ]
        );
    }

    #[test]
    fn day_first_is_a_fallback_only() {
        assert_eq!(parse_mixed_date("15/01/2021"), Some(ymd(2021, 1, 15)));
        assert_eq!(parse_mixed_date("31/12/2020"), Some(ymd(2020, 12, 31)));
        assert_eq!(parse_mixed_date("31/12/20"), Some(ymd(2020, 12, 31)));
        assert_eq!(parse_mixed_date("01/02/2021"), Some(ymd(2021, 1, 2)));
        assert_eq!(parse_mixed_date("15-Jan-2021"), Some(ymd(2021, 1, 15)));
        assert_eq!(parse_mixed_date("Jan 15 2021"), Some(ymd(2021, 1, 15)));
    }

    #[test]
    fn two_digit_years_are_this_century() {
        assert_eq!(parse_mixed_date("11/8/16"), Some(ymd(2016, 11, 8)));
    }

    #[test]
    fn drops_time_of_day() {
        assert_eq!(parse_mixed_date("2021-03-04 17:45:00"), Some(ymd(2021, 3, 4)));
        assert_eq!(parse_mixed_date("2021-03-04T17:45:00Z"), Some(ymd(2021, 3, 4)));
    }

    #[test]
    fn rejects_garbage_and_blanks() {
        assert_eq!(parse_mixed_date(""), None);
        assert_eq!(parse_mixed_date("   "), None);
        assert_eq!(parse_mixed_date("not a date"), None);
        assert_eq!(parse_mixed_date("13/45/2021"), None);
    }
}
