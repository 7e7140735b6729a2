use thiserror::Error;
use time::{macros::format_description, Date, Duration};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalendarError {
    #[error("start date must be formatted as YYYY-MM-DD, got {0:?}")]
    InvalidDate(String),
}

pub fn parse_start_date(value: &str) -> Result<Date, CalendarError> {
    Date::parse(value.trim(), format_description!("[year]-[month]-[day]"))
        .map_err(|_| CalendarError::InvalidDate(value.to_string()))
}

/// Calendar date of simulation day `day`, counting day 0 as `start`.
pub fn date_for_day(start: Date, day: usize) -> Option<Date> {
    let offset = i64::try_from(day).ok()?;
    start.checked_add(Duration::days(offset))
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::{date_for_day, parse_start_date, CalendarError};

    #[test]
    fn parses_iso_dates() {
        assert_eq!(parse_start_date(" 2026-01-05 ").unwrap(), date!(2026 - 01 - 05));
    }

    #[test]
    fn rejects_other_formats() {
        assert_eq!(
            parse_start_date("05/01/2026"),
            Err(CalendarError::InvalidDate("05/01/2026".to_string()))
        );
        assert!(parse_start_date("2026-02-30").is_err());
    }

    #[test]
    fn day_offsets_cross_month_and_leap_boundaries() {
        let start = date!(2028 - 02 - 27);

        assert_eq!(date_for_day(start, 0), Some(start));
        assert_eq!(date_for_day(start, 2), Some(date!(2028 - 02 - 29)));
        assert_eq!(date_for_day(start, 3), Some(date!(2028 - 03 - 01)));
    }

    #[test]
    fn formats_as_iso_date() {
        assert_eq!(date!(2026 - 10 - 19).to_string(), "2026-10-19");
    }
}
