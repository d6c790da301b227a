// ── Filter expressions ──
//
// Predicates as the CV-CUE list endpoints understand them. Each
// expression becomes one JSON-encoded `filter` query parameter; the
// global combination mode travels separately as `operator`.

use std::cmp::Ordering;

use serde::Serialize;
use strum::{Display, EnumString, VariantNames};

use crate::record::DeviceRecord;

/// Comparison operator of a single filter clause.
///
/// Parsed from the camelCase names users type (`notContains`); sent to the
/// API as its own tokens (`notcontains`, `!=`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, VariantNames)]
#[strum(serialize_all = "camelCase")]
pub enum FilterOperator {
    Equals,
    Contains,
    NotContains,
    GreaterThan,
    LessThan,
    GreaterThanOrEquals,
    LessThanOrEquals,
    NotEquals,
}

impl FilterOperator {
    /// The token the API expects in the `operator` field of a filter.
    pub fn wire_token(self) -> &'static str {
        match self {
            Self::Equals => "=",
            Self::LessThan => "<",
            Self::GreaterThan => ">",
            Self::LessThanOrEquals => "<=",
            Self::GreaterThanOrEquals => ">=",
            Self::NotEquals => "!=",
            Self::Contains => "contains",
            Self::NotContains => "notcontains",
        }
    }

    /// Comma-separated list of accepted operator names, for error messages.
    pub fn valid_names() -> String {
        Self::VARIANTS.join(", ")
    }
}

/// How distinct filter groups are combined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum FilterMode {
    #[default]
    #[strum(serialize = "AND")]
    And,
    #[strum(serialize = "OR")]
    Or,
}

/// One predicate: `field operator value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterClause {
    pub field: String,
    pub operator: FilterOperator,
    pub value: String,
}

impl FilterClause {
    pub fn new(field: impl Into<String>, operator: FilterOperator, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }

    /// Evaluate this clause against a record.
    ///
    /// Text comparisons ignore ASCII case; ordering operators compare
    /// numerically when both sides parse as numbers. A missing field only
    /// satisfies the negated operators.
    pub fn matches(&self, record: &DeviceRecord) -> bool {
        let Some(actual) = record.get(&self.field).map(field_text) else {
            return matches!(
                self.operator,
                FilterOperator::NotEquals | FilterOperator::NotContains
            );
        };
        let actual = actual.to_ascii_lowercase();
        let expected = self.value.to_ascii_lowercase();

        match self.operator {
            FilterOperator::Equals => actual == expected,
            FilterOperator::NotEquals => actual != expected,
            FilterOperator::Contains => actual.contains(&expected),
            FilterOperator::NotContains => !actual.contains(&expected),
            FilterOperator::GreaterThan => compare(&actual, &expected) == Ordering::Greater,
            FilterOperator::LessThan => compare(&actual, &expected) == Ordering::Less,
            FilterOperator::GreaterThanOrEquals => {
                compare(&actual, &expected) != Ordering::Less
            }
            FilterOperator::LessThanOrEquals => compare(&actual, &expected) != Ordering::Greater,
        }
    }
}

/// A compiled filter: either an explicit clause or a shortcut group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterExpression {
    /// An explicit `--filter field:operator:value` entry. Stands on its own,
    /// even when another entry targets the same field.
    Clause(FilterClause),
    /// A repeated shortcut: `field` equals any of `values`.
    AnyOf { field: String, values: Vec<String> },
}

/// Wire shape of one filter, field order as the API documents it.
#[derive(Serialize)]
struct WireFilter<'a> {
    property: &'a str,
    operator: &'static str,
    value: Vec<&'a str>,
}

impl FilterExpression {
    pub fn field(&self) -> &str {
        match self {
            Self::Clause(clause) => &clause.field,
            Self::AnyOf { field, .. } => field,
        }
    }

    /// Flatten into individual clauses. An `AnyOf` group expands to one
    /// `equals` clause per value (OR-combined among themselves).
    pub fn clauses(&self) -> Vec<FilterClause> {
        match self {
            Self::Clause(clause) => vec![clause.clone()],
            Self::AnyOf { field, values } => values
                .iter()
                .map(|v| FilterClause::new(field.clone(), FilterOperator::Equals, v.clone()))
                .collect(),
        }
    }

    /// JSON string for the `filter` query parameter.
    pub fn to_wire(&self) -> String {
        let wire = match self {
            Self::Clause(clause) => WireFilter {
                property: &clause.field,
                operator: clause.operator.wire_token(),
                value: vec![clause.value.as_str()],
            },
            Self::AnyOf { field, values } => WireFilter {
                property: field,
                operator: FilterOperator::Equals.wire_token(),
                value: values.iter().map(String::as_str).collect(),
            },
        };
        // A struct of strings always serializes.
        serde_json::to_string(&wire).unwrap_or_default()
    }

    pub fn matches(&self, record: &DeviceRecord) -> bool {
        match self {
            Self::Clause(clause) => clause.matches(record),
            Self::AnyOf { .. } => self.clauses().iter().any(|c| c.matches(record)),
        }
    }
}

/// Text form of a JSON field for comparison.
fn field_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn compare(actual: &str, expected: &str) -> Ordering {
    match (actual.parse::<f64>(), expected.parse::<f64>()) {
        (Ok(a), Ok(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        _ => actual.cmp(expected),
    }
}
