//! Rule expressions -- the constraint mini-language attached to each field.
//!
//! A rule is a pipe-delimited list such as `required|alphanumerical|maxlen,30`.
//! Flag tokens are detected by substring presence (so `requiredinteger`
//! still carries both flags) and parameterized tokens take the run of digits
//! following the literal `name,`. When a parameter is repeated the last
//! occurrence wins. A parameterized name without digits is simply absent;
//! parsing never fails.
//!
//! Each string is parsed once into a [`RuleExpression`] before a validation
//! pass instead of being rescanned for every check.

use std::collections::BTreeSet;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

/// Separator between tokens in a rule string.
pub const RULE_DIV: &str = "|";

// ---------------------------------------------------------------------------
// Flags
// ---------------------------------------------------------------------------

/// A bare constraint token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Flag {
    Required,
    Checkbox,
    Boolean,
    Integer,
    OnlyNumeric,
    OnlyAlpha,
    AlphaNumerical,
    CalendarDate,
    MysqlDate,
    Time,
}

impl Flag {
    /// Every recognized flag, in declaration order.
    pub const ALL: [Flag; 10] = [
        Flag::Required,
        Flag::Checkbox,
        Flag::Boolean,
        Flag::Integer,
        Flag::OnlyNumeric,
        Flag::OnlyAlpha,
        Flag::AlphaNumerical,
        Flag::CalendarDate,
        Flag::MysqlDate,
        Flag::Time,
    ];

    /// The literal token as written in rule strings.
    pub fn as_str(self) -> &'static str {
        match self {
            Flag::Required => "required",
            Flag::Checkbox => "checkbox",
            Flag::Boolean => "boolean",
            Flag::Integer => "integer",
            Flag::OnlyNumeric => "onlynumeric",
            Flag::OnlyAlpha => "onlyalpha",
            Flag::AlphaNumerical => "alphanumerical",
            Flag::CalendarDate => "calendardate",
            Flag::MysqlDate => "mysqldate",
            Flag::Time => "time",
        }
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Parameter patterns
// ---------------------------------------------------------------------------

/// Tokens of the form `name,<digits>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Param {
    MaxLen,
    MinLen,
    ExactLen,
    MinNumeric,
    MaxNumeric,
}

impl Param {
    pub fn as_str(self) -> &'static str {
        match self {
            Param::MaxLen => "maxlen",
            Param::MinLen => "minlen",
            Param::ExactLen => "exactlen",
            Param::MinNumeric => "minnumeric",
            Param::MaxNumeric => "maxnumeric",
        }
    }

    fn pattern(self) -> &'static Regex {
        match self {
            Param::MaxLen => &MAXLEN_RE,
            Param::MinLen => &MINLEN_RE,
            Param::ExactLen => &EXACTLEN_RE,
            Param::MinNumeric => &MINNUMERIC_RE,
            Param::MaxNumeric => &MAXNUMERIC_RE,
        }
    }

    /// The raw digit run following the last `name,<digits>`, if any.
    fn digits(self, rule: &str) -> Option<&str> {
        self.pattern()
            .captures_iter(rule)
            .last()
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }
}

fn param_regex(name: &str) -> Regex {
    Regex::new(&format!("{},([0-9]+)", regex::escape(name)))
        .expect("rule parameter names are fixed literals")
}

static MAXLEN_RE: Lazy<Regex> = Lazy::new(|| param_regex("maxlen"));
static MINLEN_RE: Lazy<Regex> = Lazy::new(|| param_regex("minlen"));
static EXACTLEN_RE: Lazy<Regex> = Lazy::new(|| param_regex("exactlen"));
static MINNUMERIC_RE: Lazy<Regex> = Lazy::new(|| param_regex("minnumeric"));
static MAXNUMERIC_RE: Lazy<Regex> = Lazy::new(|| param_regex("maxnumeric"));

// ---------------------------------------------------------------------------
// RuleExpression
// ---------------------------------------------------------------------------

/// A parsed rule: the set of present flags plus optional integer parameters.
///
/// Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleExpression {
    flags: BTreeSet<Flag>,
    max_len: Option<usize>,
    min_len: Option<usize>,
    exact_len: Option<usize>,
    min_numeric: Option<i64>,
    max_numeric: Option<i64>,
}

impl RuleExpression {
    /// Parse a rule string.
    ///
    /// # Examples
    /// ```
    /// use rulewash::rules::{Flag, RuleExpression};
    ///
    /// let rule = RuleExpression::parse("required|alphanumerical|maxlen,30");
    /// assert!(rule.has(Flag::Required));
    /// assert!(rule.has(Flag::AlphaNumerical));
    /// assert_eq!(rule.max_len(), Some(30));
    /// assert_eq!(rule.min_len(), None);
    /// ```
    pub fn parse(rule: &str) -> Self {
        let flags = Flag::ALL
            .iter()
            .copied()
            .filter(|flag| rule.contains(flag.as_str()))
            .collect();

        Self {
            flags,
            max_len: parse_param(rule, Param::MaxLen),
            min_len: parse_param(rule, Param::MinLen),
            exact_len: parse_param(rule, Param::ExactLen),
            min_numeric: parse_param(rule, Param::MinNumeric),
            max_numeric: parse_param(rule, Param::MaxNumeric),
        }
    }

    /// Whether `flag` appears in the rule.
    pub fn has(&self, flag: Flag) -> bool {
        self.flags.contains(&flag)
    }

    /// Present flags in declaration order.
    pub fn flags(&self) -> impl Iterator<Item = Flag> + '_ {
        self.flags.iter().copied()
    }

    pub fn is_required(&self) -> bool {
        self.has(Flag::Required)
    }

    pub fn max_len(&self) -> Option<usize> {
        self.max_len
    }

    pub fn min_len(&self) -> Option<usize> {
        self.min_len
    }

    pub fn exact_len(&self) -> Option<usize> {
        self.exact_len
    }

    pub fn min_numeric(&self) -> Option<i64> {
        self.min_numeric
    }

    pub fn max_numeric(&self) -> Option<i64> {
        self.max_numeric
    }

    /// Value substituted for an absent checkbox field.
    ///
    /// Numeric checkboxes default to `"0"`, everything else to `""`.
    pub fn checkbox_default(&self) -> &'static str {
        if self.has(Flag::Integer) || self.has(Flag::OnlyNumeric) {
            "0"
        } else {
            ""
        }
    }
}

impl From<&str> for RuleExpression {
    fn from(rule: &str) -> Self {
        Self::parse(rule)
    }
}

impl fmt::Display for RuleExpression {
    /// Canonical pipe-delimited form. Re-parsing it yields an equal value.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tokens: Vec<String> = self.flags().map(|flag| flag.to_string()).collect();
        let params = [
            (Param::MaxLen, self.max_len.map(|n| n as i64)),
            (Param::MinLen, self.min_len.map(|n| n as i64)),
            (Param::ExactLen, self.exact_len.map(|n| n as i64)),
            (Param::MinNumeric, self.min_numeric),
            (Param::MaxNumeric, self.max_numeric),
        ];
        for (param, value) in params {
            if let Some(n) = value {
                tokens.push(format!("{},{}", param.as_str(), n));
            }
        }
        f.write_str(&tokens.join(RULE_DIV))
    }
}

/// Extract and convert a parameter. Digit runs too large for `T` are
/// treated as absent.
fn parse_param<T: std::str::FromStr>(rule: &str, param: Param) -> Option<T> {
    let digits = param.digits(rule)?;
    match digits.parse::<T>() {
        Ok(n) => Some(n),
        Err(_) => {
            warn!(
                param = param.as_str(),
                digits = digits,
                "Rule parameter out of range, ignoring constraint"
            );
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- Flags -------------------------------------------------------------

    #[test]
    fn test_parse_single_flag() {
        let rule = RuleExpression::parse("required");
        assert!(rule.has(Flag::Required));
        assert_eq!(rule.flags().count(), 1);
    }

    #[test]
    fn test_parse_piped_flags() {
        let rule = RuleExpression::parse("required|integer|checkbox");
        assert!(rule.has(Flag::Required));
        assert!(rule.has(Flag::Integer));
        assert!(rule.has(Flag::Checkbox));
        assert!(!rule.has(Flag::Boolean));
    }

    #[test]
    fn test_flags_detected_without_separator() {
        // Concatenated tokens still count, matching substring semantics.
        let rule = RuleExpression::parse("requiredalphanumerical");
        assert!(rule.has(Flag::Required));
        assert!(rule.has(Flag::AlphaNumerical));
    }

    #[test]
    fn test_flags_do_not_collide() {
        let rule = RuleExpression::parse("alphanumerical");
        assert!(!rule.has(Flag::OnlyAlpha));
        assert!(!rule.has(Flag::OnlyNumeric));

        let rule = RuleExpression::parse("minnumeric,3|maxnumeric,9");
        assert!(!rule.has(Flag::OnlyNumeric));
    }

    #[test]
    fn test_flags_are_case_sensitive() {
        let rule = RuleExpression::parse("REQUIRED|Integer");
        assert_eq!(rule.flags().count(), 0);
    }

    #[test]
    fn test_empty_rule_has_nothing() {
        let rule = RuleExpression::parse("");
        assert_eq!(rule, RuleExpression::default());
    }

    // -- Parameters --------------------------------------------------------

    #[test]
    fn test_parse_length_params() {
        let rule = RuleExpression::parse("maxlen,30|minlen,2|exactlen,5");
        assert_eq!(rule.max_len(), Some(30));
        assert_eq!(rule.min_len(), Some(2));
        assert_eq!(rule.exact_len(), Some(5));
    }

    #[test]
    fn test_parse_numeric_params() {
        let rule = RuleExpression::parse("required|minnumeric,10|maxnumeric,32");
        assert_eq!(rule.min_numeric(), Some(10));
        assert_eq!(rule.max_numeric(), Some(32));
    }

    #[test]
    fn test_param_without_digits_is_absent() {
        let rule = RuleExpression::parse("required|maxlen|minlen,|exactlen,x");
        assert_eq!(rule.max_len(), None);
        assert_eq!(rule.min_len(), None);
        assert_eq!(rule.exact_len(), None);
    }

    #[test]
    fn test_param_takes_first_digit_run() {
        let rule = RuleExpression::parse("maxlen,12abc");
        assert_eq!(rule.max_len(), Some(12));
    }

    #[test]
    fn test_repeated_param_last_wins() {
        let rule = RuleExpression::parse("maxlen,5|required|maxlen,10");
        assert_eq!(rule.max_len(), Some(10));

        let rule = RuleExpression::parse("minnumeric,3|minnumeric|minnumeric,7");
        assert_eq!(rule.min_numeric(), Some(7));
    }

    #[test]
    fn test_param_overflow_is_absent() {
        let rule = RuleExpression::parse("minnumeric,99999999999999999999999");
        assert_eq!(rule.min_numeric(), None);
    }

    // -- Checkbox default --------------------------------------------------

    #[test]
    fn test_checkbox_default_numeric() {
        assert_eq!(
            RuleExpression::parse("checkbox|integer").checkbox_default(),
            "0"
        );
        assert_eq!(
            RuleExpression::parse("checkbox|onlynumeric").checkbox_default(),
            "0"
        );
    }

    #[test]
    fn test_checkbox_default_text() {
        assert_eq!(
            RuleExpression::parse("checkbox|alphanumerical").checkbox_default(),
            ""
        );
    }

    // -- Display -----------------------------------------------------------

    #[test]
    fn test_display_reparses_equal() {
        let rule = RuleExpression::parse("maxlen,30|required|alphanumerical");
        let rendered = rule.to_string();
        assert_eq!(rendered, "required|alphanumerical|maxlen,30");
        assert_eq!(RuleExpression::parse(&rendered), rule);
    }
}
