//! Form validation with per-field messages and a whole-form gate.
//!
//! Two rule sets exist and are never mixed:
//!
//! * [`ValidatorMode::Bounded`] checks presence, numeric syntax and the
//!   inclusive `[min, max]` range configured for each field.
//! * [`ValidatorMode::Legacy`] reproduces the older form: presence, numeric
//!   syntax and non-negativity only, with its own wording.

use serde::{Deserialize, Serialize};

use crate::models::{BoundsTable, Field, FieldBounds, FormInput, MeasurementSet};

/// Summary shown when bounded validation blocks a submission.
pub const BOUNDED_SUMMARY: &str = "Please correct the highlighted fields before submitting.";

/// Legacy message for an empty field.
pub const LEGACY_REQUIRED: &str = "Please fill all fields before submitting.";

/// Which validation rule set is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidatorMode {
    #[default]
    Bounded,
    Legacy,
}

impl ValidatorMode {
    /// Parse a validator mode from string.
    ///
    /// # Arguments
    /// * `s` - String representation ("bounded", "legacy")
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.trim().to_lowercase().as_str() {
            "bounded" | "strict" => Ok(Self::Bounded),
            "legacy" | "non-negative" => Ok(Self::Legacy),
            _ => Err(format!("Unknown validation mode: {}", s)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ValidatorMode::Bounded => "bounded",
            ValidatorMode::Legacy => "legacy",
        }
    }
}

/// Validity of a single field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldValidationResult {
    pub field: Field,
    pub is_valid: bool,
    pub message: Option<String>,
    /// Parsed value, present only when the field is valid.
    #[serde(skip)]
    pub value: Option<f64>,
}

impl FieldValidationResult {
    fn valid(field: Field, value: f64) -> Self {
        Self {
            field,
            is_valid: true,
            message: None,
            value: Some(value),
        }
    }

    fn invalid(field: Field, message: String) -> Self {
        Self {
            field,
            is_valid: false,
            message: Some(message),
            value: None,
        }
    }
}

/// Result of validating every field of the form.
#[derive(Debug, Clone, PartialEq)]
pub struct FormValidation {
    pub is_valid: bool,
    /// One entry per field, in form order.
    pub fields: Vec<FieldValidationResult>,
    /// First invalid field in form order; receives focus.
    pub first_invalid: Option<Field>,
    /// Message shown in the form-level message area when invalid.
    pub summary: Option<String>,
    measurements: Option<MeasurementSet>,
}

impl FormValidation {
    /// The validated measurements, available only when the whole form is valid.
    pub fn measurements(&self) -> Option<MeasurementSet> {
        self.measurements
    }

    pub fn errors(&self) -> impl Iterator<Item = &FieldValidationResult> {
        self.fields.iter().filter(|r| !r.is_valid)
    }
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Validate one raw value against optional inclusive bounds.
///
/// Checks run in order: presence, numeric syntax, lower bound, upper bound.
pub fn validate_field(field: Field, raw: &str, bounds: FieldBounds) -> FieldValidationResult {
    if raw.trim().is_empty() {
        return FieldValidationResult::invalid(field, format!("{} is required", field.label()));
    }
    let Some(value) = parse_number(raw) else {
        return FieldValidationResult::invalid(field, format!("{} must be a number", field.label()));
    };
    if let Some(min) = bounds.min {
        if value < min {
            return FieldValidationResult::invalid(
                field,
                format!("{} must be at least {}", field.label(), min),
            );
        }
    }
    if let Some(max) = bounds.max {
        if value > max {
            return FieldValidationResult::invalid(
                field,
                format!("{} must be at most {}", field.label(), max),
            );
        }
    }
    FieldValidationResult::valid(field, value)
}

/// Validate one raw value with the legacy rules (present, numeric, non-negative).
pub fn validate_field_legacy(field: Field, raw: &str) -> FieldValidationResult {
    if raw.trim().is_empty() {
        return FieldValidationResult::invalid(field, LEGACY_REQUIRED.to_string());
    }
    let Some(value) = parse_number(raw) else {
        return FieldValidationResult::invalid(
            field,
            format!("Invalid number for {}.", field.wire_name()),
        );
    };
    if value < 0.0 {
        return FieldValidationResult::invalid(
            field,
            format!("{} cannot be negative.", field.wire_name()),
        );
    }
    FieldValidationResult::valid(field, value)
}

/// Validator for the measurement form.
///
/// # Examples
///
/// ```
/// use crop_advisor::models::{Field, FormInput};
/// use crop_advisor::preprocessing::FormValidator;
///
/// let validator = FormValidator::bounded();
/// let result = validator.validate(Field::Ph, "15");
/// assert!(!result.is_valid);
/// assert_eq!(result.message.as_deref(), Some("pH must be at most 14"));
///
/// let outcome = validator.validate_all(&FormInput::new());
/// assert_eq!(outcome.first_invalid, Some(Field::Nitrogen));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FormValidator {
    mode: ValidatorMode,
    bounds: BoundsTable,
}

impl FormValidator {
    pub fn new(mode: ValidatorMode, bounds: BoundsTable) -> Self {
        Self { mode, bounds }
    }

    /// Bounded validator with the default field ranges.
    pub fn bounded() -> Self {
        Self::new(ValidatorMode::Bounded, BoundsTable::default())
    }

    /// Legacy non-negative validator.
    pub fn legacy() -> Self {
        Self::new(ValidatorMode::Legacy, BoundsTable::default())
    }

    pub fn mode(&self) -> ValidatorMode {
        self.mode
    }

    pub fn bounds(&self) -> &BoundsTable {
        &self.bounds
    }

    pub fn validate(&self, field: Field, raw: &str) -> FieldValidationResult {
        match self.mode {
            ValidatorMode::Bounded => validate_field(field, raw, self.bounds.get(field)),
            ValidatorMode::Legacy => validate_field_legacy(field, raw),
        }
    }

    /// Validate every field; the form is valid iff all fields are.
    pub fn validate_all(&self, form: &FormInput) -> FormValidation {
        let fields: Vec<FieldValidationResult> = form
            .iter()
            .map(|(field, raw)| self.validate(field, raw))
            .collect();

        let first_invalid = fields.iter().find(|r| !r.is_valid);
        let summary = first_invalid.map(|r| match self.mode {
            ValidatorMode::Bounded => BOUNDED_SUMMARY.to_string(),
            ValidatorMode::Legacy => r.message.clone().unwrap_or_default(),
        });
        let first_invalid = first_invalid.map(|r| r.field);

        let measurements = if first_invalid.is_none() {
            let mut values = [0.0; 7];
            for r in &fields {
                values[r.field.index()] = r.value.unwrap_or_default();
            }
            Some(MeasurementSet::from_values(values))
        } else {
            None
        };

        FormValidation {
            is_valid: first_invalid.is_none(),
            fields,
            first_invalid,
            summary,
            measurements,
        }
    }
}

impl Default for FormValidator {
    fn default() -> Self {
        Self::bounded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn full_form() -> FormInput {
        FormInput::from_pairs([
            (Field::Nitrogen, "90"),
            (Field::Phosphorus, "42"),
            (Field::Potassium, "43"),
            (Field::Temperature, "20.8"),
            (Field::Humidity, "82"),
            (Field::Ph, "6.5"),
            (Field::Rainfall, "202.9"),
        ])
    }

    #[test]
    fn test_bounded_messages() {
        let b = FieldBounds::new(0.0, 14.0);
        assert_eq!(
            validate_field(Field::Ph, "   ", b).message.as_deref(),
            Some("pH is required")
        );
        assert_eq!(
            validate_field(Field::Ph, "acid", b).message.as_deref(),
            Some("pH must be a number")
        );
        assert_eq!(
            validate_field(Field::Ph, "-1", b).message.as_deref(),
            Some("pH must be at least 0")
        );
        assert_eq!(
            validate_field(Field::Ph, "14.5", b).message.as_deref(),
            Some("pH must be at most 14")
        );
        let ok = validate_field(Field::Ph, " 6.5 ", b);
        assert!(ok.is_valid);
        assert!(ok.message.is_none());
        assert_eq!(ok.value, Some(6.5));
    }

    #[test]
    fn test_non_finite_is_not_a_number() {
        for raw in ["inf", "NaN", "-infinity"] {
            let r = validate_field(Field::Rainfall, raw, FieldBounds::unbounded());
            assert_eq!(r.message.as_deref(), Some("Rainfall must be a number"));
        }
    }

    #[test]
    fn test_fractional_bound_in_message() {
        let r = validate_field(Field::Ph, "3", FieldBounds::new(3.5, 9.9));
        assert_eq!(r.message.as_deref(), Some("pH must be at least 3.5"));
    }

    #[test]
    fn test_legacy_messages() {
        assert_eq!(
            validate_field_legacy(Field::Potassium, "").message.as_deref(),
            Some(LEGACY_REQUIRED)
        );
        assert_eq!(
            validate_field_legacy(Field::Potassium, "12x").message.as_deref(),
            Some("Invalid number for K.")
        );
        assert_eq!(
            validate_field_legacy(Field::Temperature, "-3").message.as_deref(),
            Some("temperature cannot be negative.")
        );
        // No upper bound in legacy mode
        assert!(validate_field_legacy(Field::Ph, "40").is_valid);
    }

    #[test]
    fn test_validate_all_valid_form() {
        let outcome = FormValidator::bounded().validate_all(&full_form());
        assert!(outcome.is_valid);
        assert!(outcome.first_invalid.is_none());
        assert!(outcome.summary.is_none());
        let set = outcome.measurements().unwrap();
        assert_eq!(set.nitrogen, 90.0);
        assert_eq!(set.rainfall, 202.9);
    }

    #[test]
    fn test_validate_all_focuses_first_invalid() {
        let mut form = full_form();
        form.set(Field::Rainfall, "");
        form.set(Field::Humidity, "");
        let outcome = FormValidator::bounded().validate_all(&form);
        assert!(!outcome.is_valid);
        assert_eq!(outcome.first_invalid, Some(Field::Humidity));
        assert_eq!(outcome.errors().count(), 2);
        assert_eq!(outcome.summary.as_deref(), Some(BOUNDED_SUMMARY));
        assert!(outcome.measurements().is_none());
    }

    #[test]
    fn test_legacy_summary_is_first_message() {
        let mut form = full_form();
        form.set(Field::Phosphorus, "-2");
        form.set(Field::Ph, "");
        let outcome = FormValidator::legacy().validate_all(&form);
        assert_eq!(outcome.first_invalid, Some(Field::Phosphorus));
        assert_eq!(outcome.summary.as_deref(), Some("P cannot be negative."));
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!(ValidatorMode::from_str("Legacy").unwrap(), ValidatorMode::Legacy);
        assert_eq!(ValidatorMode::from_str("bounded").unwrap(), ValidatorMode::Bounded);
        assert!(ValidatorMode::from_str("loose").is_err());
    }

    proptest! {
        #[test]
        fn prop_required_iff_blank(raw in "[ \t]{0,4}|[ \t]{0,2}[0-9a-z.]{1,6}[ \t]{0,2}") {
            let r = validate_field(Field::Nitrogen, &raw, FieldBounds::unbounded());
            let required = r.message.as_deref() == Some("Nitrogen is required");
            prop_assert_eq!(required, raw.trim().is_empty());
        }

        #[test]
        fn prop_bounded_validity(v in -1e6..1e6f64, a in -1e3..1e3f64, b in -1e3..1e3f64) {
            let (min, max) = if a <= b { (a, b) } else { (b, a) };
            let r = validate_field(Field::Humidity, &v.to_string(), FieldBounds::new(min, max));
            prop_assert_eq!(r.is_valid, min <= v && v <= max);
            if v < min {
                prop_assert_eq!(r.message, Some(format!("Humidity must be at least {}", min)));
            } else if v > max {
                prop_assert_eq!(r.message, Some(format!("Humidity must be at most {}", max)));
            }
        }
    }
}
