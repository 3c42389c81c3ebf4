use chrono::NaiveTime;

use crate::error::ApiError;

/// A present, non-blank string.
pub fn required(value: Option<String>, field: &str) -> Result<String, ApiError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ApiError::Validation(format!("{field} is required"))),
    }
}

/// `HH:mm`, 24-hour clock.
pub fn clock_time(value: Option<String>, field: &str) -> Result<String, ApiError> {
    let v = required(value, field)?;
    if v.len() != 5 || NaiveTime::parse_from_str(&v, "%H:%M").is_err() {
        return Err(ApiError::Validation(format!("{field} must be in HH:mm format")));
    }
    Ok(v)
}

/// 1 = Monday through 5 = Friday.
pub fn weekday(value: Option<i64>) -> Result<i64, ApiError> {
    match value {
        Some(day @ 1..=5) => Ok(day),
        _ => Err(ApiError::Validation(
            "day_of_week must be between 1 (Monday) and 5 (Friday)".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_rejects_missing_and_blank() {
        assert!(required(None, "title").is_err());
        assert!(required(Some("   ".into()), "title").is_err());
        assert_eq!(required(Some("t".into()), "title").unwrap(), "t");
        assert_eq!(
            required(None, "name").unwrap_err().to_string(),
            "name is required"
        );
    }

    #[test]
    fn clock_time_wants_hh_mm() {
        assert!(clock_time(Some("08:30".into()), "start_time").is_ok());
        assert!(clock_time(Some("23:59".into()), "start_time").is_ok());
        assert!(clock_time(Some("8:30".into()), "start_time").is_err());
        assert!(clock_time(Some("24:00".into()), "start_time").is_err());
        assert!(clock_time(Some("08:30:00".into()), "start_time").is_err());
    }

    #[test]
    fn weekday_is_monday_to_friday() {
        assert_eq!(weekday(Some(1)).unwrap(), 1);
        assert_eq!(weekday(Some(5)).unwrap(), 5);
        assert!(weekday(Some(0)).is_err());
        assert!(weekday(Some(6)).is_err());
        assert!(weekday(None).is_err());
    }
}
