//! Error types for RuleWash.
//!
//! Two families live here:
//! - [`Rejection`]: why a single field failed its rule. These are ordinary
//!   outcomes of a validation pass, never propagated as `Err`.
//! - [`WashError`]: failures loading configuration (I/O, JSON).

use std::fmt;

use thiserror::Error;

/// Value class a field was expected to match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    AlphaNumeric,
    Alpha,
    Numeric,
    Integer,
    Boolean,
    Date,
    Time,
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Pattern::AlphaNumeric => "may only contain alpha-numeric characters",
            Pattern::Alpha => "may only contain alpha characters",
            Pattern::Numeric => "may only contain numeric characters",
            Pattern::Integer => "may only contain integer number",
            Pattern::Boolean => "may only contain a true or false value",
            Pattern::Date => "needs to be a valid date",
            Pattern::Time => "needs to be a valid time",
        };
        f.write_str(text)
    }
}

/// The first constraint a field violated during a validation pass.
///
/// `Display` renders the human-readable message that ends up in the
/// validator's error list.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// No value was supplied and the rule does not carry `checkbox`.
    #[error("The field {field} has not been defined")]
    MissingValue { field: String },

    /// No rule was supplied for the field.
    #[error("No check defined for the field {field}")]
    MissingRule { field: String },

    /// `required` and the trimmed value is empty.
    #[error("The {field} field is required")]
    RequiredEmpty { field: String },

    /// `maxlen,N` exceeded.
    #[error("The {field} field needs to be at most {max} characters in length")]
    TooLong { field: String, max: usize },

    /// `minlen,N` not reached.
    #[error("The {field} field needs to be at least {min} characters in length")]
    TooShort { field: String, min: usize },

    /// `exactlen,N` not matched.
    #[error("The {field} field needs to be exactly {len} characters in length")]
    WrongLength { field: String, len: usize },

    /// Value does not belong to the declared character class or format.
    #[error("The {field} field {pattern}")]
    PatternMismatch { field: String, pattern: Pattern },

    /// `minnumeric`/`maxnumeric` declared but the value is not a base-10 integer.
    #[error("The {field} field needs to be numeric")]
    NotNumeric { field: String },

    /// `minnumeric,N` and the value is below N.
    #[error("The {field} field needs to be greater than or equal to {min}")]
    BelowMinimum { field: String, min: i64 },

    /// `maxnumeric,N` and the value is above N.
    #[error("The {field} field needs to be less than or equal to {max}")]
    AboveMaximum { field: String, max: i64 },
}

impl Rejection {
    /// Name of the field this rejection belongs to.
    pub fn field(&self) -> &str {
        match self {
            Rejection::MissingValue { field }
            | Rejection::MissingRule { field }
            | Rejection::RequiredEmpty { field }
            | Rejection::TooLong { field, .. }
            | Rejection::TooShort { field, .. }
            | Rejection::WrongLength { field, .. }
            | Rejection::PatternMismatch { field, .. }
            | Rejection::NotNumeric { field }
            | Rejection::BelowMinimum { field, .. }
            | Rejection::AboveMaximum { field, .. } => field,
        }
    }
}

/// Errors raised while loading validator configuration.
#[derive(Error, Debug)]
pub enum WashError {
    /// Reading a configuration file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration was not valid JSON or had the wrong shape.
    #[error("Invalid configuration: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, WashError>;
