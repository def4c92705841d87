use chrono::{Datelike, Duration, Months, NaiveDate};
use thiserror::Error as ThisError;

#[derive(ThisError, Debug, Clone, PartialEq)]
pub enum ExpiryError {
    #[error("{0} plus {1} months is out of the calendar range")]
    OutOfRange(NaiveDate, u32),
}

/// Get the current local date
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Add whole months to a date.
///
/// The day of month is kept where the target month has it,
/// otherwise it is clamped to the last day of that month:
/// 2024-01-31 plus one month is 2024-02-29, plus two months
/// is 2024-03-31.
pub fn compute_expiry(
    base_date: NaiveDate,
    duration_months: u32,
) -> Result<NaiveDate, ExpiryError> {
    base_date
        .checked_add_months(Months::new(duration_months))
        .ok_or(ExpiryError::OutOfRange(base_date, duration_months))
}

/// First day of the month of `date`
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.day0() as i64)
}

/// Last day of the month of `date`
pub fn month_end(date: NaiveDate) -> NaiveDate {
    month_start(date)
        .checked_add_months(Months::new(1))
        .map_or(NaiveDate::MAX, |next| next - Duration::days(1))
}

/// The last `n` calendar days ending with `today`, oldest first
pub fn last_n_days(today: NaiveDate, n: usize) -> Vec<NaiveDate> {
    (0..n)
        .rev()
        .map(|offset| today - Duration::days(offset as i64))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_compute_expiry_zero_months() {
        let d = date(2024, 7, 19);
        assert_eq!(compute_expiry(d, 0).unwrap(), d);
    }

    #[test]
    fn test_compute_expiry_keeps_day() {
        assert_eq!(compute_expiry(date(2025, 1, 1), 1).unwrap(), date(2025, 2, 1));
        assert_eq!(compute_expiry(date(2024, 11, 15), 3).unwrap(), date(2025, 2, 15));
        assert_eq!(compute_expiry(date(2024, 3, 10), 12).unwrap(), date(2025, 3, 10));
    }

    #[test]
    fn test_compute_expiry_clamps_month_end() {
        assert_eq!(compute_expiry(date(2024, 1, 31), 1).unwrap(), date(2024, 2, 29));
        assert_eq!(compute_expiry(date(2023, 1, 31), 1).unwrap(), date(2023, 2, 28));
        assert_eq!(compute_expiry(date(2024, 1, 31), 2).unwrap(), date(2024, 3, 31));
        assert_eq!(compute_expiry(date(2024, 8, 31), 1).unwrap(), date(2024, 9, 30));
    }

    #[test]
    fn test_compute_expiry_monotonic() {
        for base in [date(2024, 1, 31), date(2023, 5, 30), date(2024, 2, 29)] {
            let mut last = base;
            for n in 0..36 {
                let next = compute_expiry(base, n).unwrap();
                assert!(next >= last, "{} + {} went backwards", base, n);
                last = next;
            }
        }
    }

    #[test]
    fn test_compute_expiry_out_of_range() {
        let result = compute_expiry(NaiveDate::MAX, 1);
        assert_eq!(result, Err(ExpiryError::OutOfRange(NaiveDate::MAX, 1)));
    }

    #[test]
    fn test_month_start() {
        assert_eq!(month_start(date(2024, 2, 29)), date(2024, 2, 1));
        assert_eq!(month_start(date(2024, 2, 1)), date(2024, 2, 1));
    }

    #[test]
    fn test_month_end() {
        assert_eq!(month_end(date(2024, 2, 10)), date(2024, 2, 29));
        assert_eq!(month_end(date(2023, 2, 28)), date(2023, 2, 28));
        assert_eq!(month_end(date(2024, 12, 1)), date(2024, 12, 31));
    }

    #[test]
    fn test_last_n_days() {
        let days = last_n_days(date(2024, 3, 2), 3);
        assert_eq!(days, vec![date(2024, 2, 29), date(2024, 3, 1), date(2024, 3, 2)]);
        assert!(last_n_days(date(2024, 3, 2), 0).is_empty());
    }
}
