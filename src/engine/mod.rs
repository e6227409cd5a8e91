//! Validation engine.
//!
//! A [`Validator`] is configured with a values mapping and a rules mapping,
//! run once, then queried. Every field is evaluated independently; within a
//! field the first failing constraint is the only one reported. Fields are
//! visited in the insertion order of the values mapping, so the error list
//! is reproducible.
//!
//! ```
//! use rulewash::Validator;
//!
//! let mut v = Validator::new();
//! v.set_values([("name", Some("  Hello ")), ("age", Some("x"))]);
//! v.set_rules([("name", Some("required|maxlen,30")), ("age", Some("integer"))]);
//!
//! assert!(!v.run());
//! assert_eq!(v.clean_value("name"), "Hello");
//! assert_eq!(v.clean_value("age"), "");
//! assert_eq!(v.errors(), ["The age field may only contain integer number"]);
//! ```

mod checks;

use indexmap::IndexMap;
use tracing::debug;

use crate::config::{Config, DEFAULT_HTML_SEPARATOR, DEFAULT_SEPARATOR};
use crate::error::Rejection;
use crate::rules::{Flag, RuleExpression};
use crate::safety::sanitizer;

// ---------------------------------------------------------------------------
// FieldOutcome
// ---------------------------------------------------------------------------

/// Terminal result for one field in one pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldOutcome {
    /// The value satisfied its rule; carries the trimmed, sanitized value.
    Accepted(String),
    /// The first constraint the value violated.
    Rejected(Rejection),
}

impl FieldOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, FieldOutcome::Accepted(_))
    }

    /// The clean value: the sanitized value, or `""` when rejected.
    pub fn clean_value(&self) -> &str {
        match self {
            FieldOutcome::Accepted(clean) => clean.as_str(),
            FieldOutcome::Rejected(_) => "",
        }
    }

    /// Rendered rejection messages (empty when accepted).
    pub fn reasons(&self) -> Vec<String> {
        match self {
            FieldOutcome::Accepted(_) => Vec::new(),
            FieldOutcome::Rejected(rejection) => vec![rejection.to_string()],
        }
    }
}

/// Substitute a supplied-or-default value for a field before evaluation.
///
/// An absent value becomes the checkbox default when the rule carries
/// `checkbox` and `""` otherwise.
pub fn normalize_value<'a>(value: Option<&'a str>, rule: Option<&RuleExpression>) -> &'a str {
    match (value, rule) {
        (Some(value), _) => value,
        (None, Some(rule)) if rule.has(Flag::Checkbox) => rule.checkbox_default(),
        (None, _) => "",
    }
}

/// Evaluate one field against its rule.
///
/// [`Validator::run`] normalizes values first, so it never passes `None`.
/// Called directly, an absent value is replaced by the checkbox default when
/// the rule carries `checkbox` and rejected otherwise. An absent rule is
/// always rejected.
/// Constraints see the raw value; the clean value is trimmed and then run
/// through the XSS denylist.
pub fn evaluate_field(
    field: &str,
    value: Option<&str>,
    rule: Option<&RuleExpression>,
) -> FieldOutcome {
    let value = match (value, rule) {
        (Some(value), _) => value,
        (None, Some(rule)) if rule.has(Flag::Checkbox) => rule.checkbox_default(),
        (None, _) => {
            return FieldOutcome::Rejected(Rejection::MissingValue {
                field: field.to_string(),
            })
        }
    };

    let Some(rule) = rule else {
        return FieldOutcome::Rejected(Rejection::MissingRule {
            field: field.to_string(),
        });
    };

    match checks::run_checks(field, value, rule) {
        Ok(()) => {
            let out = sanitizer::sanitize(value.trim());
            if out.was_modified {
                debug!(field, removed = ?out.removed, "Stripped markup from accepted value");
            }
            FieldOutcome::Accepted(out.content)
        }
        Err(rejection) => FieldOutcome::Rejected(rejection),
    }
}

// ---------------------------------------------------------------------------
// Validator
// ---------------------------------------------------------------------------

/// Configure-run-query validator over a set of fields.
///
/// Each call to [`Validator::run`] starts from a clean slate: errors, clean
/// values and outcomes of a previous pass are discarded, so running twice on
/// the same input yields the same result.
#[derive(Debug, Clone)]
pub struct Validator {
    values: IndexMap<String, Option<String>>,
    rules: IndexMap<String, Option<RuleExpression>>,
    outcomes: IndexMap<String, FieldOutcome>,
    clean_values: IndexMap<String, String>,
    errors: Vec<String>,
    valid: bool,
    separator: String,
    html_separator: String,
}

impl Validator {
    /// Create an empty validator with default error separators.
    pub fn new() -> Self {
        Self {
            values: IndexMap::new(),
            rules: IndexMap::new(),
            outcomes: IndexMap::new(),
            clean_values: IndexMap::new(),
            errors: Vec::new(),
            valid: false,
            separator: DEFAULT_SEPARATOR.to_string(),
            html_separator: DEFAULT_HTML_SEPARATOR.to_string(),
        }
    }

    /// Create a validator with the rules and separators from `config`.
    pub fn from_config(config: &Config) -> Self {
        let mut validator = Self::new();
        validator.set_rules(
            config
                .rules
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_deref())),
        );
        validator.separator = config.separator.clone();
        validator.html_separator = config.html_separator.clone();
        validator
    }

    // -- Configuration -----------------------------------------------------

    /// Replace the values mapping. `None` means the value was not supplied.
    pub fn set_values<I, K, V>(&mut self, values: I)
    where
        I: IntoIterator<Item = (K, Option<V>)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.values = values
            .into_iter()
            .map(|(k, v)| (k.into(), v.map(Into::into)))
            .collect();
    }

    /// Replace the rules mapping. Each rule string is parsed once here.
    pub fn set_rules<I, K, V>(&mut self, rules: I)
    where
        I: IntoIterator<Item = (K, Option<V>)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        self.rules = rules
            .into_iter()
            .map(|(k, v)| (k.into(), v.map(|r| RuleExpression::parse(r.as_ref()))))
            .collect();
    }

    /// Set the separators used by [`all_errors`](Self::all_errors) and
    /// [`all_errors_html`](Self::all_errors_html).
    pub fn with_separators(mut self, plain: impl Into<String>, html: impl Into<String>) -> Self {
        self.separator = plain.into();
        self.html_separator = html.into();
        self
    }

    // -- Execution ---------------------------------------------------------

    /// Evaluate every field and return `true` if all were accepted.
    pub fn run(&mut self) -> bool {
        self.outcomes.clear();
        self.clean_values.clear();
        self.errors.clear();

        for (field, value) in &self.values {
            let rule = self.rules.get(field).and_then(Option::as_ref);
            let value = normalize_value(value.as_deref(), rule);
            let outcome = evaluate_field(field, Some(value), rule);

            if let FieldOutcome::Rejected(rejection) = &outcome {
                debug!(field = rejection.field(), reason = %rejection, "Field rejected");
                self.errors.push(rejection.to_string());
            }
            self.clean_values
                .insert(field.clone(), outcome.clean_value().to_string());
            self.outcomes.insert(field.clone(), outcome);
        }

        self.valid = self.errors.is_empty();
        debug!(
            fields = self.outcomes.len(),
            rejected = self.errors.len(),
            "Validation pass complete"
        );
        self.valid
    }

    // -- Queries -----------------------------------------------------------

    /// Result of the last [`run`](Self::run); `false` before any run.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Per-field outcomes of the last run, in evaluation order.
    pub fn outcomes(&self) -> &IndexMap<String, FieldOutcome> {
        &self.outcomes
    }

    pub fn outcome(&self, key: &str) -> Option<&FieldOutcome> {
        self.outcomes.get(key)
    }

    /// Every field's clean value (`""` for rejected fields).
    pub fn clean_values(&self) -> &IndexMap<String, String> {
        &self.clean_values
    }

    /// Clean value for `key`, or `""` if the key is unknown.
    pub fn clean_value(&self, key: &str) -> &str {
        self.clean_values.get(key).map(String::as_str).unwrap_or("")
    }

    /// Clean values whose key contains `pattern`.
    ///
    /// Handy for groups of checkboxes named `checkbox01`, `checkbox02`, ...
    pub fn clean_values_matching(&self, pattern: &str) -> IndexMap<String, String> {
        self.clean_values
            .iter()
            .filter(|(key, _)| key.contains(pattern))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// Clean value reparsed as an integer; `0` if absent or not numeric.
    pub fn clean_value_as_integer(&self, key: &str) -> i64 {
        self.clean_value(key).parse().unwrap_or(0)
    }

    /// Error messages in field order.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// All error messages joined with the plain separator.
    pub fn all_errors(&self) -> String {
        self.errors.join(&self.separator)
    }

    /// All error messages joined with the HTML line-break separator.
    pub fn all_errors_html(&self) -> String {
        self.errors.join(&self.html_separator)
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
