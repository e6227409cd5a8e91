//! RuleWash - rule-driven field validation and sanitization
//!
//! Given a mapping of field names to raw string values and a mapping of
//! field names to rule expressions (`required|alphanumerical|maxlen,30`),
//! RuleWash decides whether every field satisfies its rule, produces the
//! trimmed and sanitized clean values, and collects one human-readable
//! message per rejected field.
//!
//! ```
//! use rulewash::Validator;
//!
//! let mut v = Validator::new();
//! v.set_values([("title", Some(" Hello ")), ("count", Some("50"))]);
//! v.set_rules([("title", Some("required|maxlen,11")), ("count", Some("maxnumeric,32"))]);
//!
//! assert!(!v.run());
//! assert_eq!(v.clean_value("title"), "Hello");
//! assert_eq!(v.all_errors(), "The count field needs to be less than or equal to 32");
//! ```
//!
//! The sanitizer is a best-effort denylist; see [`safety::sanitizer`].

pub mod config;
pub mod engine;
pub mod error;
pub mod rules;
pub mod safety;

pub use config::Config;
pub use engine::{evaluate_field, normalize_value, FieldOutcome, Validator};
pub use error::{Pattern, Rejection, Result, WashError};
pub use rules::{Flag, RuleExpression};
