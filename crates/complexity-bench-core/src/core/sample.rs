// crates/complexity-bench-core/src/core/sample.rs
// ============================================================================
// Module: Samples
// Description: Raw measurements and the benchmark output line format.
// Purpose: Decode `<id>: v v v` lines into typed samples through a template.
// Dependencies: crate::core::spec, thiserror
// ============================================================================

//! ## Overview
//! A benchmark program prints one line per measurement:
//! `<test id>: <value> <value> ...`. The id ends at the first `:`. The values
//! are whitespace separated and map positionally onto the test's template.
//! Fields other than `n`, `time_ns`, and `micro_repeats` are checked for being
//! numeric and otherwise ignored.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::spec::FIELD_MICRO_REPEATS;
use crate::core::spec::FIELD_SIZE;
use crate::core::spec::FIELD_TIME;

// ============================================================================
// SECTION: Sample
// ============================================================================

/// One measurement at one size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Problem size.
    pub n: u64,
    /// Elapsed time in nanoseconds.
    pub time_ns: f64,
    /// In-program repeat count, when the template declares one.
    pub micro_repeats: Option<f64>,
}

impl Sample {
    /// Returns the per-operation time.
    #[must_use]
    pub fn per_operation_ns(&self) -> f64 {
        self.micro_repeats.map_or(self.time_ns, |repeats| self.time_ns / repeats)
    }

    /// Decodes the value part of an output line through a template.
    ///
    /// # Errors
    ///
    /// Returns [`SampleError`] when a value is not numeric, a required field
    /// is absent, there are more values than fields, or the repeat count is
    /// not positive.
    pub fn decode(template: &[String], values: &str) -> Result<Self, SampleError> {
        let tokens: Vec<&str> = values.split_whitespace().collect();
        if tokens.len() > template.len() {
            return Err(SampleError::TooManyValues {
                expected: template.len(),
                found: tokens.len(),
            });
        }
        let mut n = None;
        let mut time_ns = None;
        let mut micro_repeats = None;
        for (field, token) in template.iter().zip(tokens) {
            match field.as_str() {
                FIELD_SIZE => n = Some(parse_size(token)?),
                FIELD_TIME => time_ns = Some(parse_value(field, token)?),
                FIELD_MICRO_REPEATS => {
                    let repeats = parse_value(field, token)?;
                    if repeats <= 0.0 {
                        return Err(SampleError::NonPositiveRepeats(token.to_string()));
                    }
                    micro_repeats = Some(repeats);
                }
                _ => {
                    parse_value(field, token)?;
                }
            }
        }
        Ok(Self {
            n: n.ok_or(SampleError::MissingField(FIELD_SIZE))?,
            time_ns: time_ns.ok_or(SampleError::MissingField(FIELD_TIME))?,
            micro_repeats,
        })
    }
}

/// Splits a raw output line into its test id and value text.
///
/// Returns `None` for lines without a `:` separator.
#[must_use]
pub fn split_output_line(line: &str) -> Option<(&str, &str)> {
    let (id, values) = line.split_once(':')?;
    Some((id.trim(), values))
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Malformed benchmark output.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SampleError {
    /// More values than template fields.
    #[error("expected at most {expected} values, found {found}")]
    TooManyValues {
        /// Template length.
        expected: usize,
        /// Values on the line.
        found: usize,
    },
    /// A value is not a finite number.
    #[error("field `{field}` has non-numeric value `{value}`")]
    NotNumeric {
        /// Template field name.
        field: String,
        /// Offending token.
        value: String,
    },
    /// The size is not a non-negative integer.
    #[error("size `{0}` is not a non-negative integer")]
    InvalidSize(String),
    /// A required field was not present on the line.
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    /// The repeat count is zero or negative.
    #[error("micro_repeats must be positive, found `{0}`")]
    NonPositiveRepeats(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Parses a finite floating point value.
fn parse_value(field: &str, token: &str) -> Result<f64, SampleError> {
    token.parse::<f64>().ok().filter(|value| value.is_finite()).ok_or_else(|| {
        SampleError::NotNumeric {
            field: field.to_string(),
            value: token.to_string(),
        }
    })
}

/// Parses a size token; integral floats such as `1e6` are accepted.
fn parse_size(token: &str) -> Result<u64, SampleError> {
    if let Ok(n) = token.parse::<u64>() {
        return Ok(n);
    }
    let value = token.parse::<f64>().map_err(|_| SampleError::InvalidSize(token.to_string()))?;
    #[allow(clippy::cast_precision_loss, reason = "Compared against the exclusive u64 bound.")]
    let in_range = value >= 0.0 && value.fract() == 0.0 && value < u64::MAX as f64;
    if !in_range {
        return Err(SampleError::InvalidSize(token.to_string()));
    }
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "Value is a non-negative integer below 2^64."
    )]
    let n = value as u64;
    Ok(n)
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::float_cmp, reason = "Test-only assertions.")]

    use super::*;

    /// Builds a template from field names.
    fn template(fields: &[&str]) -> Vec<String> {
        fields.iter().map(|field| (*field).to_string()).collect()
    }

    #[test]
    fn decodes_positional_fields() {
        let sample =
            Sample::decode(&template(&["n", "micro_repeats", "time_ns"]), " 1000 4 400").unwrap();
        assert_eq!(sample.n, 1000);
        assert_eq!(sample.per_operation_ns(), 100.0);
    }

    #[test]
    fn accepts_scientific_sizes() {
        assert_eq!(parse_size("1e6").unwrap(), 1_000_000);
        assert!(parse_size("2.5").is_err());
        assert!(parse_size("-3").is_err());
    }

    #[test]
    fn rejects_surplus_values_and_missing_time() {
        let fields = template(&["n", "time_ns"]);
        assert!(matches!(
            Sample::decode(&fields, "1 2 3"),
            Err(SampleError::TooManyValues { expected: 2, found: 3 })
        ));
        assert_eq!(Sample::decode(&fields, "1"), Err(SampleError::MissingField(FIELD_TIME)));
    }

    #[test]
    fn id_ends_at_first_colon() {
        assert_eq!(split_output_line("a.b: 1 2:3"), Some(("a.b", " 1 2:3")));
        assert_eq!(split_output_line("no separator"), None);
    }
}
