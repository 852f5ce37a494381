//! Input validation for the calling layer (chat, HTTP, CLI).
//!
//! The scoring core assumes pre-validated values; this is where out-of-range
//! and non-numeric input is turned into an error the caller can re-prompt on.
//! Text input accepts a comma as the decimal separator ("7,5").

use serde::Deserialize;

use crate::factor::Factor;

pub const MOOD_RANGE: (i64, i64) = (1, 10);
pub const SLEEP_RANGE: (f64, f64) = (0.0, 12.0);
pub const SCALE_RANGE: (f64, f64) = (0.0, 10.0);

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field}: expected a number, got {raw:?}")]
    NotNumeric { field: &'static str, raw: String },
    #[error("{field}: expected a whole number, got {value}")]
    NotInteger { field: &'static str, value: f64 },
    #[error("{field}: {value} is outside {min}..={max}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

impl ValidationError {
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::NotNumeric { field, .. }
            | ValidationError::NotInteger { field, .. }
            | ValidationError::OutOfRange { field, .. } => *field,
        }
    }
}

/// A number or numeric text, as it arrives from a form or chat message.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FieldInput {
    Number(f64),
    Text(String),
}

impl From<f64> for FieldInput {
    fn from(v: f64) -> Self {
        FieldInput::Number(v)
    }
}

impl From<&str> for FieldInput {
    fn from(s: &str) -> Self {
        FieldInput::Text(s.to_string())
    }
}

/// Unvalidated day of input.
#[derive(Debug, Clone, Deserialize)]
pub struct EntryInput {
    pub mood: FieldInput,
    pub sleep: FieldInput,
    pub activity: FieldInput,
    pub focus: FieldInput,
    pub social: FieldInput,
}

/// A day of input that passed every range check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidEntry {
    pub mood: u8,
    pub sleep: f64,
    pub activity: f64,
    pub focus: f64,
    pub social: f64,
}

pub fn parse_number(field: &'static str, input: &FieldInput) -> Result<f64, ValidationError> {
    let v = match input {
        FieldInput::Number(v) => *v,
        FieldInput::Text(raw) => raw
            .trim()
            .replace(',', ".")
            .parse::<f64>()
            .map_err(|_| ValidationError::NotNumeric {
                field,
                raw: raw.clone(),
            })?,
    };
    if !v.is_finite() {
        return Err(ValidationError::NotNumeric {
            field,
            raw: v.to_string(),
        });
    }
    Ok(v)
}

fn in_range(field: &'static str, v: f64, (min, max): (f64, f64)) -> Result<f64, ValidationError> {
    if (min..=max).contains(&v) {
        Ok(v)
    } else {
        Err(ValidationError::OutOfRange {
            field,
            value: v,
            min,
            max,
        })
    }
}

pub fn validate_mood(input: &FieldInput) -> Result<u8, ValidationError> {
    let v = parse_number("mood", input)?;
    if v.fract() != 0.0 {
        return Err(ValidationError::NotInteger {
            field: "mood",
            value: v,
        });
    }
    let (min, max) = MOOD_RANGE;
    in_range("mood", v, (min as f64, max as f64))?;
    Ok(v as u8)
}

pub fn validate_factor(factor: Factor, input: &FieldInput) -> Result<f64, ValidationError> {
    let field = factor.as_str();
    let v = parse_number(field, input)?;
    let range = match factor {
        Factor::Sleep => SLEEP_RANGE,
        Factor::Activity | Factor::Focus | Factor::Social => SCALE_RANGE,
    };
    in_range(field, v, range)
}

impl EntryInput {
    /// Checks fields in prompt order (mood, sleep, activity, focus, social)
    /// and stops at the first failure.
    pub fn validate(&self) -> Result<ValidEntry, ValidationError> {
        Ok(ValidEntry {
            mood: validate_mood(&self.mood)?,
            sleep: validate_factor(Factor::Sleep, &self.sleep)?,
            activity: validate_factor(Factor::Activity, &self.activity)?,
            focus: validate_factor(Factor::Focus, &self.focus)?,
            social: validate_factor(Factor::Social, &self.social)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(mood: FieldInput, sleep: FieldInput) -> EntryInput {
        EntryInput {
            mood,
            sleep,
            activity: 6.0.into(),
            focus: 7.0.into(),
            social: 4.0.into(),
        }
    }

    #[test]
    fn accepts_comma_decimal_text() {
        let v = input("8".into(), "7,5".into()).validate().unwrap();
        assert_eq!(v.mood, 8);
        assert_eq!(v.sleep, 7.5);
    }

    #[test]
    fn rejects_mood_out_of_range_or_fractional() {
        let e = input(11.0.into(), 7.0.into()).validate().unwrap_err();
        assert!(matches!(e, ValidationError::OutOfRange { field: "mood", .. }));
        let e = input(0.0.into(), 7.0.into()).validate().unwrap_err();
        assert_eq!(e.field(), "mood");
        let e = input(7.5.into(), 7.0.into()).validate().unwrap_err();
        assert!(matches!(e, ValidationError::NotInteger { .. }));
    }

    #[test]
    fn rejects_sleep_over_twelve_and_garbage() {
        let e = input(5.0.into(), 12.5.into()).validate().unwrap_err();
        assert_eq!(e.field(), "sleep");
        let e = input(5.0.into(), "lots".into()).validate().unwrap_err();
        assert!(matches!(e, ValidationError::NotNumeric { field: "sleep", .. }));
    }

    #[test]
    fn boundaries_are_inclusive() {
        let mut i = input(1.0.into(), 0.0.into());
        i.social = 10.0.into();
        assert!(i.validate().is_ok());
        let i = input(10.0.into(), 12.0.into());
        assert!(i.validate().is_ok());
    }

    #[test]
    fn deserializes_numbers_and_strings() {
        let i: EntryInput = serde_json::from_str(
            r#"{"mood":"9","sleep":8,"activity":"5,5","focus":6,"social":2}"#,
        )
        .unwrap();
        let v = i.validate().unwrap();
        assert_eq!(v.activity, 5.5);
        assert_eq!(v.mood, 9);
    }
}
