use gym_data::Money;
use thiserror::Error as ThisError;

/// Rejected input, reported before anything is written
#[derive(ThisError, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("{0} must not be negative")]
    NegativeAmount(&'static str),

    #[error("duration must be at least one month")]
    InvalidDuration,
}

pub fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(())
}

pub fn non_negative(field: &'static str, amount: Money) -> Result<(), ValidationError> {
    if amount.is_negative() {
        return Err(ValidationError::NegativeAmount(field));
    }
    Ok(())
}

/// Blank optional text is stored as absent
pub fn optional(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require() {
        assert!(require("name", "Eris").is_ok());
        assert_eq!(require("name", "  "), Err(ValidationError::MissingField("name")));
    }

    #[test]
    fn test_non_negative() {
        assert!(non_negative("fee", Money::ZERO).is_ok());
        assert_eq!(
            non_negative("fee", Money::from_cents(-1)),
            Err(ValidationError::NegativeAmount("fee"))
        );
    }

    #[test]
    fn test_optional() {
        assert_eq!(optional(Some("".to_string())), None);
        assert_eq!(optional(Some("ref".to_string())), Some("ref".to_string()));
        assert_eq!(optional(None), None);
    }
}
