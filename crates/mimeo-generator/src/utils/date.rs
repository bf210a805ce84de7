//! Clock-based functions: `date` and `date_time`.

use crate::error::RenderError;
use chrono::{DateTime, Local, TimeDelta};

/// Today shifted by `days_delta`, as `YYYY-MM-DD`.
pub fn date(days_delta: i64) -> Result<String, RenderError> {
    let shifted = shift("date", &[TimeDelta::try_days(days_delta)])?;
    Ok(shifted.format("%Y-%m-%d").to_string())
}

/// Now shifted by the given deltas, as `YYYY-MM-DDTHH:MM:SS`.
pub fn date_time(
    days_delta: i64,
    hours_delta: i64,
    minutes_delta: i64,
    seconds_delta: i64,
) -> Result<String, RenderError> {
    let shifted = shift(
        "date_time",
        &[
            TimeDelta::try_days(days_delta),
            TimeDelta::try_hours(hours_delta),
            TimeDelta::try_minutes(minutes_delta),
            TimeDelta::try_seconds(seconds_delta),
        ],
    )?;
    Ok(shifted.format("%Y-%m-%dT%H:%M:%S").to_string())
}

fn shift(util: &str, deltas: &[Option<TimeDelta>]) -> Result<DateTime<Local>, RenderError> {
    deltas
        .iter()
        .try_fold(TimeDelta::zero(), |total, delta| total.checked_add(&(*delta)?))
        .and_then(|delta| Local::now().checked_add_signed(delta))
        .ok_or_else(|| RenderError::InvalidValue {
            util: util.to_string(),
            reason: "delta is out of the supported date range".into(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    #[test]
    fn test_date_format() {
        let today = date(0).unwrap();
        assert_eq!(today.len(), 10);
        assert!(NaiveDate::parse_from_str(&today, "%Y-%m-%d").is_ok());
    }

    #[test]
    fn test_date_delta() {
        let today = NaiveDate::parse_from_str(&date(0).unwrap(), "%Y-%m-%d").unwrap();
        let later = NaiveDate::parse_from_str(&date(10).unwrap(), "%Y-%m-%d").unwrap();
        assert_eq!((later - today).num_days(), 10);
    }

    #[test]
    fn test_date_time_format() {
        let now = date_time(0, 0, 0, 0).unwrap();
        assert!(NaiveDateTime::parse_from_str(&now, "%Y-%m-%dT%H:%M:%S").is_ok());

        let before = NaiveDateTime::parse_from_str(&now, "%Y-%m-%dT%H:%M:%S").unwrap();
        let shifted = date_time(-1, 2, 0, 0).unwrap();
        let after = NaiveDateTime::parse_from_str(&shifted, "%Y-%m-%dT%H:%M:%S").unwrap();
        let hours = (after - before).num_hours();
        assert!((-23..=-21).contains(&hours), "unexpected shift: {hours}h");
    }

    #[test]
    fn test_date_out_of_range() {
        assert!(matches!(date(i64::MAX), Err(RenderError::InvalidValue { .. })));
    }
}
