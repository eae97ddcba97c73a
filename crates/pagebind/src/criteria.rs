//! Criteria Matcher
//!
//! A [`ValidationTable`] is an ordered list of `(field, rule, expected)` rows.
//! Rule names are parsed when a row is built, so a misspelt rule fails while
//! the table is assembled rather than while items are scanned.
//!
//! Matching policy:
//!
//! - Rule and field names are normalized the same way as element names: case,
//!   spacing and punctuation are ignored (`Equals`, `equals`, `EQUALS`).
//! - `Equals`/`NotEquals` compare booleans as booleans, numbers as numbers and
//!   dates as dates when both sides parse as such, and otherwise compare the
//!   trimmed text case-sensitively.
//! - Text rules (`Contains`, `StartsWith`, `EndsWith`, `Regex` and their
//!   negations) are case-sensitive.
//! - Ordering rules parse both sides as numbers, or failing that as dates; an
//!   unparseable operand is an error, not a mismatch.
//! - A field that is declared but not rendered reads as empty text;
//!   `Exists`/`NotExists` test whether it is rendered.

use crate::locator::LookupKey;
use crate::result::{AutomationError, AutomationResult};
use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Source of an item's field values
pub trait FieldLookup {
    /// Rendered text of a field.
    ///
    /// Returns `Ok(None)` when the field is declared but not rendered and
    /// [`AutomationError::FieldNotFound`] when it is not declared at all.
    fn field(&self, name: &str) -> AutomationResult<Option<String>>;
}

/// Comparison applied by one validation row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComparisonRule {
    /// Values are equal
    Equals,
    /// Values differ
    NotEquals,
    /// Actual contains expected
    Contains,
    /// Actual does not contain expected
    NotContains,
    /// Actual starts with expected
    StartsWith,
    /// Actual ends with expected
    EndsWith,
    /// Field is rendered
    Exists,
    /// Field is not rendered
    NotExists,
    /// Actual matches the expected regular expression
    Regex,
    /// Actual is greater than expected
    GreaterThan,
    /// Actual is greater than or equal to expected
    GreaterThanOrEquals,
    /// Actual is less than expected
    LessThan,
    /// Actual is less than or equal to expected
    LessThanOrEquals,
}

impl ComparisonRule {
    /// Every rule
    pub const ALL: [Self; 13] = [
        Self::Equals,
        Self::NotEquals,
        Self::Contains,
        Self::NotContains,
        Self::StartsWith,
        Self::EndsWith,
        Self::Exists,
        Self::NotExists,
        Self::Regex,
        Self::GreaterThan,
        Self::GreaterThanOrEquals,
        Self::LessThan,
        Self::LessThanOrEquals,
    ];

    /// Canonical rule name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Equals => "Equals",
            Self::NotEquals => "NotEquals",
            Self::Contains => "Contains",
            Self::NotContains => "NotContains",
            Self::StartsWith => "StartsWith",
            Self::EndsWith => "EndsWith",
            Self::Exists => "Exists",
            Self::NotExists => "NotExists",
            Self::Regex => "Regex",
            Self::GreaterThan => "GreaterThan",
            Self::GreaterThanOrEquals => "GreaterThanOrEquals",
            Self::LessThan => "LessThan",
            Self::LessThanOrEquals => "LessThanOrEquals",
        }
    }
}

impl FromStr for ComparisonRule {
    type Err = AutomationError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let key = LookupKey::new(name);
        Self::ALL
            .into_iter()
            .find(|rule| LookupKey::new(rule.as_str()) == key)
            .ok_or_else(|| AutomationError::UnknownRule {
                rule: name.to_string(),
            })
    }
}

impl fmt::Display for ComparisonRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `(field, rule, expected)` criterion
#[derive(Debug, Clone)]
pub struct ValidationRow {
    field: String,
    rule: ComparisonRule,
    expected: String,
    pattern: Option<Regex>,
}

impl ValidationRow {
    /// Build a row, parsing the rule name.
    ///
    /// # Errors
    ///
    /// [`AutomationError::UnknownRule`] for an unrecognised rule, or
    /// [`AutomationError::ValueParse`] when a `Regex` row has an invalid pattern.
    pub fn new(
        field: impl Into<String>,
        rule: &str,
        expected: impl Into<String>,
    ) -> AutomationResult<Self> {
        Self::with_rule(field, rule.parse()?, expected)
    }

    /// Build a row from an already parsed rule
    pub fn with_rule(
        field: impl Into<String>,
        rule: ComparisonRule,
        expected: impl Into<String>,
    ) -> AutomationResult<Self> {
        let expected = expected.into();
        let pattern = match rule {
            ComparisonRule::Regex => Some(Regex::new(&expected).map_err(|_| {
                AutomationError::ValueParse {
                    value: expected.clone(),
                    expected: "regular expression",
                }
            })?),
            _ => None,
        };
        Ok(Self {
            field: field.into(),
            rule,
            expected,
            pattern,
        })
    }

    /// Field name as written
    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Comparison rule
    #[must_use]
    pub const fn rule(&self) -> ComparisonRule {
        self.rule
    }

    /// Expected value as written
    #[must_use]
    pub fn expected(&self) -> &str {
        &self.expected
    }
}

/// Ordered set of criteria that must all hold
#[derive(Debug, Clone, Default)]
pub struct ValidationTable {
    rows: Vec<ValidationRow>,
}

impl ValidationTable {
    /// Create an empty table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from raw `[field, rule, value]` cells
    pub fn from_rows<I, S>(rows: I) -> AutomationResult<Self>
    where
        I: IntoIterator<Item = [S; 3]>,
        S: AsRef<str>,
    {
        let rows = rows
            .into_iter()
            .map(|[field, rule, value]| {
                ValidationRow::new(field.as_ref(), rule.as_ref(), value.as_ref())
            })
            .collect::<AutomationResult<Vec<_>>>()?;
        Ok(Self { rows })
    }

    /// Append a row
    pub fn push(&mut self, row: ValidationRow) {
        self.rows.push(row);
    }

    /// Append a row, parsing the rule name
    pub fn with_row(
        mut self,
        field: impl Into<String>,
        rule: &str,
        expected: impl Into<String>,
    ) -> AutomationResult<Self> {
        self.rows.push(ValidationRow::new(field, rule, expected)?);
        Ok(self)
    }

    /// Rows in order
    #[must_use]
    pub fn rows(&self) -> &[ValidationRow] {
        &self.rows
    }

    /// Number of rows
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the table has no rows
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl fmt::Display for ValidationTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "| Field | Rule | Value |")?;
        for row in &self.rows {
            writeln!(f, "| {} | {} | {} |", row.field, row.rule, row.expected)?;
        }
        Ok(())
    }
}

/// Plain field values keyed by normalized name
#[derive(Debug, Clone, Default)]
pub struct FieldMap {
    name: String,
    values: HashMap<LookupKey, Option<String>>,
}

impl FieldMap {
    /// Create an empty map for an item called `name`
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: HashMap::new(),
        }
    }

    /// Add a rendered field
    #[must_use]
    pub fn with(mut self, field: &str, value: impl Into<String>) -> Self {
        let _ = self.values.insert(LookupKey::new(field), Some(value.into()));
        self
    }

    /// Add a declared field that is not rendered
    #[must_use]
    pub fn with_absent(mut self, field: &str) -> Self {
        let _ = self.values.insert(LookupKey::new(field), None);
        self
    }
}

impl FieldLookup for FieldMap {
    fn field(&self, name: &str) -> AutomationResult<Option<String>> {
        self.values
            .get(&LookupKey::new(name))
            .cloned()
            .ok_or_else(|| AutomationError::FieldNotFound {
                field: name.to_string(),
                page: self.name.clone(),
            })
    }
}

/// Evaluates validation tables against item fields
#[derive(Debug, Clone, Copy, Default)]
pub struct CriteriaMatcher;

impl CriteriaMatcher {
    /// Evaluate one row against an item's fields.
    ///
    /// # Errors
    ///
    /// [`AutomationError::FieldNotFound`] when the row names an undeclared field,
    /// [`AutomationError::ValueParse`] when an ordering rule cannot parse an operand.
    pub fn matches(fields: &dyn FieldLookup, row: &ValidationRow) -> AutomationResult<bool> {
        let actual = fields.field(&row.field)?;
        let present = actual.is_some();
        let actual = actual.unwrap_or_default();
        let actual = actual.trim();
        let expected = row.expected.trim();

        Ok(match row.rule {
            ComparisonRule::Exists => present,
            ComparisonRule::NotExists => !present,
            ComparisonRule::Equals => values_equal(actual, expected),
            ComparisonRule::NotEquals => !values_equal(actual, expected),
            ComparisonRule::Contains => actual.contains(expected),
            ComparisonRule::NotContains => !actual.contains(expected),
            ComparisonRule::StartsWith => actual.starts_with(expected),
            ComparisonRule::EndsWith => actual.ends_with(expected),
            ComparisonRule::Regex => row
                .pattern
                .as_ref()
                .is_some_and(|pattern| pattern.is_match(actual)),
            ComparisonRule::GreaterThan => compare_ordered(actual, expected)? == Ordering::Greater,
            ComparisonRule::GreaterThanOrEquals => {
                compare_ordered(actual, expected)? != Ordering::Less
            }
            ComparisonRule::LessThan => compare_ordered(actual, expected)? == Ordering::Less,
            ComparisonRule::LessThanOrEquals => {
                compare_ordered(actual, expected)? != Ordering::Greater
            }
        })
    }

    /// Evaluate every row; stops at the first row that does not match.
    ///
    /// # Errors
    ///
    /// Same as [`CriteriaMatcher::matches`].
    pub fn evaluate(fields: &dyn FieldLookup, table: &ValidationTable) -> AutomationResult<bool> {
        for row in table.rows() {
            if !Self::matches(fields, row)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

fn values_equal(actual: &str, expected: &str) -> bool {
    if let (Some(a), Some(e)) = (parse_bool(actual), parse_bool(expected)) {
        return a == e;
    }
    if let (Some(a), Some(e)) = (parse_number(actual), parse_number(expected)) {
        return a == e;
    }
    if let (Some(a), Some(e)) = (parse_date(actual), parse_date(expected)) {
        return a == e;
    }
    actual == expected
}

fn compare_ordered(actual: &str, expected: &str) -> AutomationResult<Ordering> {
    if let Some(e) = parse_number(expected) {
        let a = parse_number(actual).ok_or_else(|| AutomationError::ValueParse {
            value: actual.to_string(),
            expected: "number",
        })?;
        return a.partial_cmp(&e).ok_or_else(|| AutomationError::ValueParse {
            value: actual.to_string(),
            expected: "number",
        });
    }
    if let Some(e) = parse_date(expected) {
        let a = parse_date(actual).ok_or_else(|| AutomationError::ValueParse {
            value: actual.to_string(),
            expected: "date",
        })?;
        return Ok(a.cmp(&e));
    }
    Err(AutomationError::ValueParse {
        value: expected.to_string(),
        expected: "number or date",
    })
}

fn parse_bool(value: &str) -> Option<bool> {
    if value.eq_ignore_ascii_case("true") {
        Some(true)
    } else if value.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

fn parse_number(value: &str) -> Option<f64> {
    let numeric = value.chars().any(|c| c.is_ascii_digit())
        && value
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-' | '+' | 'e' | 'E'));
    if !numeric || (value.contains(',') && !is_grouped_by_thousands(value)) {
        return None;
    }
    value.replace(',', "").parse().ok()
}

/// `1,234` or `-12,345.6`: commas only between complete groups of three digits
fn is_grouped_by_thousands(value: &str) -> bool {
    let unsigned = value.strip_prefix(['+', '-']).unwrap_or(value);
    let integer = match unsigned.split_once('.') {
        Some((integer, fraction)) if !fraction.is_empty() && all_digits(fraction) => integer,
        Some(_) => return false,
        None => unsigned,
    };
    let mut groups = integer.split(',');
    let leading = groups
        .next()
        .is_some_and(|group| (1..=3).contains(&group.len()) && all_digits(group));
    leading && groups.all(|group| group.len() == 3 && all_digits(group))
}

fn all_digits(text: &str) -> bool {
    text.bytes().all(|b| b.is_ascii_digit())
}

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%d %B %Y"];
const DATE_TIME_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%m/%d/%Y %H:%M"];

fn parse_date(value: &str) -> Option<NaiveDateTime> {
    DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}
