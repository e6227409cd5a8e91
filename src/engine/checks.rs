//! Per-constraint evaluators.
//!
//! Each check inspects the raw (untrimmed, unsanitized) value and returns
//! `Err(Rejection)` on the first violation. [`run_checks`] applies them in
//! the fixed priority order.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Pattern, Rejection};
use crate::rules::{Flag, RuleExpression};

// ---------------------------------------------------------------------------
// Value classes
// ---------------------------------------------------------------------------

/// Letters (including Latin-1 accented), digits and the permitted punctuation.
static ALPHANUMERIC_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-ZÀ-ÿ0-9?;.!@€£$&+=*\{\}\[\]()\-_\r\n\t/,: ]*$")
        .expect("alphanumeric class is a fixed literal")
});

/// Same class as [`ALPHANUMERIC_RE`] without digits, non-empty.
static ALPHA_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-ZÀ-ÿ?;.!@€£$&+=*\{\}\[\]()\-_\r\n\t/,: ]+$")
        .expect("alpha class is a fixed literal")
});

static NUMERIC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9., ]+$").expect("numeric class is a fixed literal"));

static INTEGER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]+$").expect("integer class is a fixed literal"));

/// `DD/MM/YYYY` or `DD-MM-YYYY`, leading zeros optional.
static CALENDAR_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(0?[1-9]|[12][0-9]|3[01])[/\-](0?[1-9]|1[012])[/\-]([0-9]{4})$")
        .expect("calendar date pattern is a fixed literal")
});

/// `YYYY-MM-DD`, structure only.
static MYSQL_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("mysql date pattern is a fixed literal")
});

/// `HH:MM`, structure only.
static TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{2}:[0-9]{2}$").expect("time pattern is a fixed literal"));

type CheckResult = Result<(), Rejection>;

// ---------------------------------------------------------------------------
// Ordered evaluation
// ---------------------------------------------------------------------------

/// Apply every declared constraint in priority order, stopping at the first
/// failure.
pub(crate) fn run_checks(field: &str, value: &str, rule: &RuleExpression) -> CheckResult {
    check_required(field, value, rule)?;
    check_max_len(field, value, rule)?;
    check_min_len(field, value, rule)?;
    check_exact_len(field, value, rule)?;
    check_class(field, value, rule, Flag::AlphaNumerical, Pattern::AlphaNumeric)?;
    check_class(field, value, rule, Flag::OnlyAlpha, Pattern::Alpha)?;
    check_class(field, value, rule, Flag::OnlyNumeric, Pattern::Numeric)?;
    check_class(field, value, rule, Flag::Integer, Pattern::Integer)?;
    check_boolean(field, value, rule)?;
    check_min_numeric(field, value, rule)?;
    check_max_numeric(field, value, rule)?;
    check_class(field, value, rule, Flag::CalendarDate, Pattern::Date)?;
    check_class(field, value, rule, Flag::MysqlDate, Pattern::Date)?;
    check_class(field, value, rule, Flag::Time, Pattern::Time)?;
    Ok(())
}

// -- Presence and length -----------------------------------------------------

fn check_required(field: &str, value: &str, rule: &RuleExpression) -> CheckResult {
    if rule.is_required() && value.trim().is_empty() {
        return Err(Rejection::RequiredEmpty {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Lengths are counted in characters, not bytes.
fn char_len(value: &str) -> usize {
    value.chars().count()
}

fn check_max_len(field: &str, value: &str, rule: &RuleExpression) -> CheckResult {
    match rule.max_len() {
        Some(max) if char_len(value) > max => Err(Rejection::TooLong {
            field: field.to_string(),
            max,
        }),
        _ => Ok(()),
    }
}

fn check_min_len(field: &str, value: &str, rule: &RuleExpression) -> CheckResult {
    match rule.min_len() {
        Some(min) if char_len(value) < min => Err(Rejection::TooShort {
            field: field.to_string(),
            min,
        }),
        _ => Ok(()),
    }
}

fn check_exact_len(field: &str, value: &str, rule: &RuleExpression) -> CheckResult {
    match rule.exact_len() {
        Some(len) if char_len(value) != len => Err(Rejection::WrongLength {
            field: field.to_string(),
            len,
        }),
        _ => Ok(()),
    }
}

// -- Character classes and formats ------------------------------------------

/// Does `value` belong to the class `flag` declares?
fn matches_class(flag: Flag, value: &str) -> bool {
    let has_non_space = || value.chars().any(|c| c != ' ');
    match flag {
        Flag::AlphaNumerical => ALPHANUMERIC_RE.is_match(value),
        Flag::OnlyAlpha => has_non_space() && ALPHA_RE.is_match(value),
        Flag::OnlyNumeric => has_non_space() && NUMERIC_RE.is_match(value),
        Flag::Integer => INTEGER_RE.is_match(value),
        Flag::CalendarDate => CALENDAR_DATE_RE.is_match(value),
        Flag::MysqlDate => MYSQL_DATE_RE.is_match(value),
        Flag::Time => TIME_RE.is_match(value),
        Flag::Required | Flag::Checkbox | Flag::Boolean => true,
    }
}

/// Class checks accept an empty value when the field is optional.
fn check_class(
    field: &str,
    value: &str,
    rule: &RuleExpression,
    flag: Flag,
    pattern: Pattern,
) -> CheckResult {
    if !rule.has(flag) {
        return Ok(());
    }
    if value.is_empty() && !rule.is_required() {
        return Ok(());
    }
    if matches_class(flag, value) {
        Ok(())
    } else {
        Err(Rejection::PatternMismatch {
            field: field.to_string(),
            pattern,
        })
    }
}

/// Exactly `true` or `false`; no optional-empty exemption.
fn check_boolean(field: &str, value: &str, rule: &RuleExpression) -> CheckResult {
    if rule.has(Flag::Boolean) && value != "true" && value != "false" {
        return Err(Rejection::PatternMismatch {
            field: field.to_string(),
            pattern: Pattern::Boolean,
        });
    }
    Ok(())
}

// -- Numeric bounds ----------------------------------------------------------

/// Strict base-10 integer parse; comma or dot decimals do not parse.
fn parse_numeric(field: &str, value: &str) -> Result<i64, Rejection> {
    value.parse::<i64>().map_err(|_| Rejection::NotNumeric {
        field: field.to_string(),
    })
}

fn check_min_numeric(field: &str, value: &str, rule: &RuleExpression) -> CheckResult {
    let Some(min) = rule.min_numeric() else {
        return Ok(());
    };
    if parse_numeric(field, value)? < min {
        return Err(Rejection::BelowMinimum {
            field: field.to_string(),
            min,
        });
    }
    Ok(())
}

fn check_max_numeric(field: &str, value: &str, rule: &RuleExpression) -> CheckResult {
    let Some(max) = rule.max_numeric() else {
        return Ok(());
    };
    if parse_numeric(field, value)? > max {
        return Err(Rejection::AboveMaximum {
            field: field.to_string(),
            max,
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn check(value: &str, rule: &str) -> CheckResult {
        run_checks("f", value, &RuleExpression::parse(rule))
    }

    // -- Required ----------------------------------------------------------

    #[test]
    fn test_required_rejects_whitespace() {
        assert!(matches!(
            check("  \t\n", "required"),
            Err(Rejection::RequiredEmpty { .. })
        ));
    }

    #[test]
    fn test_optional_accepts_empty() {
        assert!(check("", "maxlen,5").is_ok());
    }

    // -- Length bounds -----------------------------------------------------

    #[test]
    fn test_max_len_boundary() {
        assert!(check("abcde", "maxlen,5").is_ok());
        assert_eq!(
            check("abcdef", "maxlen,5"),
            Err(Rejection::TooLong {
                field: "f".into(),
                max: 5
            })
        );
    }

    #[test]
    fn test_min_len_boundary() {
        assert!(check("abcde", "minlen,5").is_ok());
        assert!(matches!(
            check("abcd", "minlen,5"),
            Err(Rejection::TooShort { min: 5, .. })
        ));
    }

    #[test]
    fn test_exact_len() {
        assert!(check("Hello", "exactlen,5").is_ok());
        assert!(check("Hell", "exactlen,5").is_err());
        assert!(check("Hello!", "exactlen,5").is_err());
    }

    #[test]
    fn test_length_counts_chars_not_bytes() {
        assert!(check("èàòù", "maxlen,4").is_ok());
    }

    #[test]
    fn test_length_uses_raw_value() {
        // Surrounding whitespace counts before trimming.
        assert!(check(" abc ", "maxlen,3").is_err());
    }

    // -- Classes -----------------------------------------------------------

    #[test]
    fn test_alphanumerical_accepts_punctuation() {
        assert!(check("Hello / {} () [] @ + = \n ?", "required|alphanumerical").is_ok());
        assert!(check("Prezzo: 5€ o £4; ok!", "alphanumerical").is_ok());
    }

    #[test]
    fn test_alphanumerical_rejects_markup() {
        assert!(matches!(
            check("<b>hi</b>", "alphanumerical"),
            Err(Rejection::PatternMismatch {
                pattern: Pattern::AlphaNumeric,
                ..
            })
        ));
    }

    #[test]
    fn test_only_alpha() {
        assert!(check("Hello fabio how are you good boy èàòù!", "required|onlyalpha").is_ok());
        assert!(check("Hello @  123", "required|onlyalpha").is_err());
    }

    #[test]
    fn test_only_alpha_rejects_all_spaces() {
        assert!(check("   ", "onlyalpha").is_err());
    }

    #[test]
    fn test_only_numeric() {
        assert!(check("1234.56", "required|onlynumeric").is_ok());
        assert!(check("1.234,56", "onlynumeric").is_ok());
        assert!(check("12a", "onlynumeric").is_err());
        assert!(check(" ", "onlynumeric").is_err());
    }

    #[test]
    fn test_integer() {
        assert!(check("1234", "required|integer").is_ok());
        assert!(check("123.5", "required|integer").is_err());
        assert!(check("-5", "integer").is_err());
    }

    #[test]
    fn test_optional_classes_accept_empty() {
        for rule in [
            "alphanumerical",
            "onlyalpha",
            "onlynumeric",
            "integer",
            "calendardate",
            "mysqldate",
            "time",
        ] {
            assert!(check("", rule).is_ok(), "empty should pass optional {rule}");
        }
    }

    #[test]
    fn test_required_classes_reject_empty_at_required_step() {
        assert!(matches!(
            check("", "required|integer"),
            Err(Rejection::RequiredEmpty { .. })
        ));
    }

    // -- Boolean -----------------------------------------------------------

    #[test]
    fn test_boolean() {
        assert!(check("true", "boolean").is_ok());
        assert!(check("false", "boolean").is_ok());
        assert!(check("True", "boolean").is_err());
        assert!(check("true lalala", "required|boolean").is_err());
    }

    #[test]
    fn test_boolean_has_no_empty_exemption() {
        assert!(check("", "boolean").is_err());
    }

    // -- Numeric bounds ----------------------------------------------------

    #[test]
    fn test_min_numeric() {
        assert!(check("50", "required|minnumeric,32").is_ok());
        assert!(check("32", "minnumeric,32").is_ok());
        assert!(matches!(
            check("20", "required|minnumeric,32"),
            Err(Rejection::BelowMinimum { min: 32, .. })
        ));
    }

    #[test]
    fn test_max_numeric() {
        assert!(check("20", "required|maxnumeric,32").is_ok());
        assert!(check("32", "maxnumeric,32").is_ok());
        assert!(matches!(
            check("50", "required|maxnumeric,32"),
            Err(Rejection::AboveMaximum { max: 32, .. })
        ));
    }

    #[test]
    fn test_numeric_parse_failure() {
        assert!(matches!(
            check("aa", "required|minnumeric,32"),
            Err(Rejection::NotNumeric { .. })
        ));
        assert!(matches!(
            check("aa", "required|maxnumeric,32"),
            Err(Rejection::NotNumeric { .. })
        ));
    }

    #[test]
    fn test_numeric_bounds_reject_decimal_input() {
        // Accepted by onlynumeric, but not a base-10 integer.
        assert!(matches!(
            check("1234.56", "onlynumeric|minnumeric,1"),
            Err(Rejection::NotNumeric { .. })
        ));
    }

    #[test]
    fn test_numeric_bounds_accept_sign() {
        assert!(check("-3", "maxnumeric,5").is_ok());
        assert!(check("+7", "minnumeric,5").is_ok());
    }

    // -- Dates and time ----------------------------------------------------

    #[test]
    fn test_calendar_date() {
        assert!(check("22/05/2017", "required|calendardate").is_ok());
        assert!(check("1-5-2017", "calendardate").is_ok());
        assert!(check("22/05/2017a", "required|calendardate").is_err());
        assert!(check("32/05/2017", "calendardate").is_err());
        assert!(check("12/13/2017", "calendardate").is_err());
    }

    #[test]
    fn test_mysql_date() {
        assert!(check("2014-04-02", "required|mysqldate").is_ok());
        assert!(check("2014-99-99", "mysqldate").is_ok());
        assert!(check("2014-04-02a", "required|mysqldate").is_err());
        assert!(check("2014/04/02", "mysqldate").is_err());
    }

    #[test]
    fn test_time() {
        assert!(check("12:45", "required|time").is_ok());
        assert!(check("99:99", "time").is_ok());
        assert!(check("12:45a", "required|time").is_err());
        assert!(check("1:45", "time").is_err());
    }

    // -- Priority ----------------------------------------------------------

    #[test]
    fn test_first_failure_wins() {
        // Too long and not an integer: length is checked first.
        assert!(matches!(
            check("abcdef", "integer|maxlen,3"),
            Err(Rejection::TooLong { .. })
        ));
        // Not an integer and not a date: integer is checked first.
        assert!(matches!(
            check("x", "calendardate|integer"),
            Err(Rejection::PatternMismatch {
                pattern: Pattern::Integer,
                ..
            })
        ));
    }
}
