//! Attribute filters and their CQL rendering.
//!
//! A [`FilterDefinition`] is an ordered list of [`FilterCondition`]s joined
//! uniformly by `AND` or `OR`. [`compose_cql`] turns it into the filter
//! string understood by the remote tile and feature services. Malformed
//! conditions are dropped rather than reported, since a partially filled
//! filter form is a normal state.

use crate::prelude::HashMap;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// A value on the right-hand side of a condition.
///
/// JSON strings always deserialize as `Text`; `DateTime` is only built in
/// code and serializes in the same form it renders to CQL. Any other JSON
/// value (objects, for instance) lands in `Other` and renders as its JSON
/// text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Bool(bool),
    Number(f64),
    Text(String),
    #[serde(serialize_with = "serialize_datetime")]
    DateTime(DateTime<Utc>),
    List(Vec<FilterValue>),
    Other(Value),
}

impl FilterValue {
    /// Renders the value as a CQL literal.
    pub fn to_cql_literal(&self) -> String {
        match self {
            FilterValue::Text(text) => quote(text),
            FilterValue::Number(number) => format_number(*number),
            FilterValue::DateTime(at) => quote(&format_datetime(at)),
            FilterValue::Bool(_) | FilterValue::List(_) | FilterValue::Other(_) => {
                quote(&self.to_plain_text())
            }
        }
    }

    /// Unquoted textual form, used inside `LIKE` patterns and for values
    /// that have no literal syntax of their own.
    pub fn to_plain_text(&self) -> String {
        match self {
            FilterValue::Bool(flag) => flag.to_string(),
            FilterValue::Number(number) => format_number(*number),
            FilterValue::Text(text) => text.clone(),
            FilterValue::DateTime(at) => format_datetime(at),
            FilterValue::List(items) => items
                .iter()
                .map(FilterValue::to_plain_text)
                .collect::<Vec<_>>()
                .join(","),
            FilterValue::Other(value) => value.to_string(),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::Text(value)
    }
}

impl From<f64> for FilterValue {
    fn from(value: f64) -> Self {
        FilterValue::Number(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        FilterValue::Number(value as f64)
    }
}

impl From<i32> for FilterValue {
    fn from(value: i32) -> Self {
        FilterValue::Number(f64::from(value))
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        FilterValue::Bool(value)
    }
}

impl From<DateTime<Utc>> for FilterValue {
    fn from(value: DateTime<Utc>) -> Self {
        FilterValue::DateTime(value)
    }
}

impl<T: Into<FilterValue>> From<Vec<T>> for FilterValue {
    fn from(values: Vec<T>) -> Self {
        FilterValue::List(values.into_iter().map(Into::into).collect())
    }
}

/// Single-quotes `text`, doubling embedded quotes.
fn quote(text: &str) -> String {
    format!("'{}'", escape_quotes(text))
}

fn escape_quotes(text: &str) -> String {
    text.replace('\'', "''")
}

fn format_number(number: f64) -> String {
    if number.is_nan() {
        "NaN".to_string()
    } else if number == f64::INFINITY {
        "Infinity".to_string()
    } else if number == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else if number == 0.0 {
        // no "-0"
        "0".to_string()
    } else {
        number.to_string()
    }
}

fn format_datetime(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn serialize_datetime<S: Serializer>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_datetime(at))
}

/// Condition operators. Unknown operator strings are kept as `Other` and
/// render to nothing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FilterOperator {
    Eq,
    NotEq,
    Gt,
    Gte,
    Lt,
    Lte,
    Like,
    In,
    Between,
    IsNull,
    IsNotNull,
    Other(String),
}

impl FilterOperator {
    pub fn as_str(&self) -> &str {
        match self {
            FilterOperator::Eq => "=",
            FilterOperator::NotEq => "!=",
            FilterOperator::Gt => ">",
            FilterOperator::Gte => ">=",
            FilterOperator::Lt => "<",
            FilterOperator::Lte => "<=",
            FilterOperator::Like => "LIKE",
            FilterOperator::In => "IN",
            FilterOperator::Between => "BETWEEN",
            FilterOperator::IsNull => "IS NULL",
            FilterOperator::IsNotNull => "IS NOT NULL",
            FilterOperator::Other(other) => other,
        }
    }

    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            FilterOperator::Eq
                | FilterOperator::NotEq
                | FilterOperator::Gt
                | FilterOperator::Gte
                | FilterOperator::Lt
                | FilterOperator::Lte
        )
    }

    /// Whether the operator takes no value.
    pub fn is_null_check(&self) -> bool {
        matches!(self, FilterOperator::IsNull | FilterOperator::IsNotNull)
    }
}

impl From<&str> for FilterOperator {
    fn from(value: &str) -> Self {
        match value {
            "=" => FilterOperator::Eq,
            "!=" => FilterOperator::NotEq,
            ">" => FilterOperator::Gt,
            ">=" => FilterOperator::Gte,
            "<" => FilterOperator::Lt,
            "<=" => FilterOperator::Lte,
            "LIKE" => FilterOperator::Like,
            "IN" => FilterOperator::In,
            "BETWEEN" => FilterOperator::Between,
            "IS NULL" => FilterOperator::IsNull,
            "IS NOT NULL" => FilterOperator::IsNotNull,
            other => FilterOperator::Other(other.to_string()),
        }
    }
}

impl From<String> for FilterOperator {
    fn from(value: String) -> Self {
        FilterOperator::from(value.as_str())
    }
}

impl From<FilterOperator> for String {
    fn from(value: FilterOperator) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One attribute condition as entered in the filter panel.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FilterCondition {
    #[serde(default)]
    pub attribute: String,
    #[serde(default)]
    pub operator: Option<FilterOperator>,
    /// Absent (or JSON `null`) renders as `NULL`; ignored by null checks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<FilterValue>,
}

impl FilterCondition {
    pub fn new(
        attribute: impl Into<String>,
        operator: impl Into<FilterOperator>,
        value: impl Into<FilterValue>,
    ) -> Self {
        Self {
            attribute: attribute.into(),
            operator: Some(operator.into()),
            value: Some(value.into()),
        }
    }

    pub fn is_null(attribute: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            operator: Some(FilterOperator::IsNull),
            value: None,
        }
    }

    pub fn is_not_null(attribute: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            operator: Some(FilterOperator::IsNotNull),
            value: None,
        }
    }

    /// Renders this condition as a CQL clause, or `None` when it is
    /// malformed and must be dropped.
    pub fn to_cql(&self) -> Option<String> {
        let attribute = self.attribute.as_str();
        if attribute.is_empty() {
            return None;
        }
        let operator = self.operator.as_ref()?;

        match operator {
            op if op.is_comparison() => Some(format!(
                "{attribute} {op} {}",
                self.value
                    .as_ref()
                    .map_or_else(|| "NULL".to_string(), FilterValue::to_cql_literal)
            )),
            FilterOperator::Like => {
                let pattern = self.value.as_ref()?.to_plain_text();
                Some(format!("{attribute} LIKE '%{}%'", escape_quotes(&pattern)))
            }
            FilterOperator::In => match &self.value {
                Some(FilterValue::List(items)) if !items.is_empty() => {
                    let values = items
                        .iter()
                        .map(FilterValue::to_cql_literal)
                        .collect::<Vec<_>>()
                        .join(",");
                    Some(format!("{attribute} IN ({values})"))
                }
                _ => None,
            },
            FilterOperator::Between => match &self.value {
                Some(FilterValue::List(items)) if items.len() == 2 => Some(format!(
                    "{attribute} BETWEEN {} AND {}",
                    items[0].to_cql_literal(),
                    items[1].to_cql_literal()
                )),
                _ => None,
            },
            FilterOperator::IsNull => Some(format!("{attribute} IS NULL")),
            FilterOperator::IsNotNull => Some(format!("{attribute} IS NOT NULL")),
            _ => None,
        }
    }
}

/// How the clauses of a definition are combined. Anything other than the
/// exact string `OR` means `AND`, including `null` and non-string values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Value", into = "String")]
pub enum JoinOperator {
    #[default]
    And,
    Or,
}

impl JoinOperator {
    pub fn separator(&self) -> &'static str {
        match self {
            JoinOperator::And => " AND ",
            JoinOperator::Or => " OR ",
        }
    }
}

impl From<&str> for JoinOperator {
    fn from(value: &str) -> Self {
        if value == "OR" {
            JoinOperator::Or
        } else {
            JoinOperator::And
        }
    }
}

impl From<String> for JoinOperator {
    fn from(value: String) -> Self {
        JoinOperator::from(value.as_str())
    }
}

impl From<Value> for JoinOperator {
    fn from(value: Value) -> Self {
        match value {
            Value::String(text) => JoinOperator::from(text),
            _ => JoinOperator::And,
        }
    }
}

impl From<JoinOperator> for String {
    fn from(value: JoinOperator) -> Self {
        match value {
            JoinOperator::And => "AND".to_string(),
            JoinOperator::Or => "OR".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterDefinition {
    #[serde(default)]
    pub conditions: Vec<FilterCondition>,
    #[serde(default)]
    pub join_operator: JoinOperator,
}

impl FilterDefinition {
    pub fn new(join_operator: JoinOperator) -> Self {
        Self {
            conditions: Vec::new(),
            join_operator,
        }
    }

    pub fn with_condition(mut self, condition: FilterCondition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn push(&mut self, condition: FilterCondition) {
        self.conditions.push(condition);
    }

    /// Removes the condition at `index`, if any.
    pub fn remove(&mut self, index: usize) -> Option<FilterCondition> {
        (index < self.conditions.len()).then(|| self.conditions.remove(index))
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn to_cql(&self) -> String {
        let clauses: Vec<String> = self
            .conditions
            .iter()
            .filter_map(FilterCondition::to_cql)
            .collect();

        match clauses.len() {
            0 => String::new(),
            1 => clauses.into_iter().next().unwrap_or_default(),
            _ => clauses.join(self.join_operator.separator()),
        }
    }
}

/// Composes the CQL filter string for an optional definition.
///
/// Absent and empty definitions yield the empty string.
pub fn compose_cql(definition: Option<&FilterDefinition>) -> String {
    definition.map(FilterDefinition::to_cql).unwrap_or_default()
}

/// Filter definitions keyed by layer id. A layer without an entry is
/// unfiltered.
#[derive(Debug, Clone, Default)]
pub struct LayerFilters {
    filters: HashMap<String, FilterDefinition>,
}

impl LayerFilters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Associates `definition` with `layer_id`, replacing any previous one.
    /// An empty definition clears the entry.
    pub fn set(&mut self, layer_id: impl Into<String>, definition: FilterDefinition) {
        let layer_id = layer_id.into();
        if definition.is_empty() {
            self.filters.remove(&layer_id);
        } else {
            self.filters.insert(layer_id, definition);
        }
    }

    pub fn get(&self, layer_id: &str) -> Option<&FilterDefinition> {
        self.filters.get(layer_id)
    }

    pub fn clear(&mut self, layer_id: &str) -> Option<FilterDefinition> {
        self.filters.remove(layer_id)
    }

    pub fn clear_all(&mut self) {
        self.filters.clear();
    }

    /// CQL for the layer's filter, empty when the layer is unfiltered.
    pub fn cql_for(&self, layer_id: &str) -> String {
        compose_cql(self.get(layer_id))
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}
