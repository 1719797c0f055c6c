//! Filter translation for Tablebase queries
//!
//! Three filter syntaxes are accepted by the SDK and all of them end up as the
//! same canonical wire form, a list of `{field, operator, values}` triples:
//!
//! - nested where-conditions keyed by operator (`{"age": {"$gt": 30}}`),
//! - flat API filter arrays (`[{"field": "age", "operator": ">", "values": [30]}]`),
//! - the fluent [`FilterBuilder`].
//!
//! Filters in a list are AND-combined.

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::{Error, Result};

/// Nested where-condition input, keyed by field name.
pub type WhereCondition = Map<String, Value>;

/// Comparison operator as sent over the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    Like,
    NotLike,
    ILike,
    StartsWith,
    In,
    NotIn,
    Between,
    IsNull,
    IsNotNull,
    ArrayContains,
}

/// Where-condition keys paired with the operator they stand for.
///
/// Both translation directions read this table.
const OPERATOR_TABLE: &[(&str, Operator)] = &[
    ("$eq", Operator::Eq),
    ("$ne", Operator::Ne),
    ("$gt", Operator::Gt),
    ("$gte", Operator::Gte),
    ("$lt", Operator::Lt),
    ("$lte", Operator::Lte),
    ("$like", Operator::Like),
    ("$notLike", Operator::NotLike),
    ("$ilike", Operator::ILike),
    ("$startsWith", Operator::StartsWith),
    ("$in", Operator::In),
    ("$notIn", Operator::NotIn),
    ("$between", Operator::Between),
    ("$isNull", Operator::IsNull),
    ("$isNotNull", Operator::IsNotNull),
    ("$arrayContains", Operator::ArrayContains),
];

/// How many values an operator takes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    None,
    One,
    Two,
    AtLeastOne,
}

impl Operator {
    /// Wire spelling of the operator
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::Lt => "<",
            Operator::Lte => "<=",
            Operator::Like => "like",
            Operator::NotLike => "not like",
            Operator::ILike => "ilike",
            Operator::StartsWith => "starts with",
            Operator::In => "in",
            Operator::NotIn => "not in",
            Operator::Between => "between",
            Operator::IsNull => "is null",
            Operator::IsNotNull => "is not null",
            Operator::ArrayContains => "@>",
        }
    }

    pub fn arity(self) -> Arity {
        match self {
            Operator::IsNull | Operator::IsNotNull => Arity::None,
            Operator::Between => Arity::Two,
            Operator::In | Operator::NotIn | Operator::ArrayContains => Arity::AtLeastOne,
            _ => Arity::One,
        }
    }

    /// Look up the operator a where-condition key stands for, e.g. `$gte`
    pub fn from_key(key: &str) -> Option<Self> {
        OPERATOR_TABLE
            .iter()
            .find(|(candidate, _)| *candidate == key)
            .map(|(_, operator)| *operator)
    }

    /// The where-condition key for this operator
    pub fn key(self) -> Option<&'static str> {
        OPERATOR_TABLE
            .iter()
            .find(|(_, operator)| *operator == self)
            .map(|(key, _)| *key)
    }

    /// Parse a wire operator. Matching ignores ASCII case and surrounding whitespace.
    pub fn from_wire(wire: &str) -> Option<Self> {
        let wire = wire.trim();
        OPERATOR_TABLE
            .iter()
            .map(|(_, operator)| *operator)
            .find(|operator| operator.as_str().eq_ignore_ascii_case(wire))
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Operator::from_wire(s).ok_or_else(|| Error::unsupported(s))
    }
}

impl Serialize for Operator {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Operator {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let wire = String::deserialize(deserializer)?;
        Operator::from_wire(&wire)
            .ok_or_else(|| de::Error::custom(format!("unsupported filter operator: {}", wire)))
    }
}

/// Canonical filter as sent to the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub field: String,
    pub operator: Operator,
    pub values: Vec<Value>,
}

impl Filter {
    pub fn new(field: impl Into<String>, operator: Operator, values: Vec<Value>) -> Self {
        Self {
            field: field.into(),
            operator,
            values,
        }
    }
}

fn identifier_re() -> &'static Regex {
    static IDENTIFIER_RE: OnceLock<Regex> = OnceLock::new();
    IDENTIFIER_RE.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid regex"))
}

/// Whether `name` is usable as a field name
pub fn is_valid_identifier(name: &str) -> bool {
    identifier_re().is_match(name)
}

/// Translate a nested where-condition into canonical filters.
///
/// A bare scalar means equality. Operator objects yield one filter per key, in
/// key order. Either the whole condition translates or an error is returned.
pub fn from_where(condition: &WhereCondition) -> Result<Vec<Filter>> {
    let mut filters = Vec::new();

    for (field, value) in condition {
        match value {
            Value::Object(operators) => {
                if operators.is_empty() {
                    return Err(Error::invalid_filter(format!(
                        "field '{}': operator object is empty",
                        field
                    )));
                }
                for (key, operand) in operators {
                    let operator = Operator::from_key(key).ok_or_else(|| Error::unsupported(key))?;
                    let values = operand_values(field, key, operator, operand)?;
                    filters.push(Filter::new(field.clone(), operator, values));
                }
            }
            Value::Array(_) => {
                return Err(Error::invalid_filter(format!(
                    "field '{}': expected a scalar or an operator object, got an array",
                    field
                )));
            }
            scalar => filters.push(Filter::new(field.clone(), Operator::Eq, vec![scalar.clone()])),
        }
    }

    Ok(filters)
}

fn operand_values(field: &str, key: &str, operator: Operator, operand: &Value) -> Result<Vec<Value>> {
    match operator.arity() {
        Arity::None => Ok(Vec::new()),
        Arity::One => Ok(vec![operand.clone()]),
        Arity::Two => match operand {
            Value::Array(items) if items.len() == 2 => Ok(items.clone()),
            _ => Err(Error::invalid_filter(format!(
                "field '{}': {} expects an array of exactly 2 values",
                field, key
            ))),
        },
        Arity::AtLeastOne => match operand {
            Value::Array(items) => Ok(items.clone()),
            _ => Err(Error::invalid_filter(format!(
                "field '{}': {} expects an array of values",
                field, key
            ))),
        },
    }
}

/// Translate canonical filters back into a nested where-condition.
///
/// Equality always comes back as an explicit `$eq` key, since the wire form does
/// not record whether the shorthand was used. Null checks come back as `true`.
///
/// The filters are validated first. A field can carry each operator only once,
/// so a repeated operator on the same field is rejected instead of merged.
pub fn to_where(filters: &[Filter]) -> Result<WhereCondition> {
    validate(filters)?;

    let mut condition = WhereCondition::new();

    for filter in filters {
        let key = filter
            .operator
            .key()
            .ok_or_else(|| Error::unsupported(filter.operator.as_str()))?;

        let operand = match filter.operator.arity() {
            Arity::None => Value::Bool(true),
            Arity::One => filter.values.first().cloned().unwrap_or(Value::Null),
            Arity::Two | Arity::AtLeastOne => Value::Array(filter.values.clone()),
        };

        let entry = condition
            .entry(filter.field.clone())
            .or_insert_with(|| Value::Object(Map::new()));
        if let Some(operators) = entry.as_object_mut() {
            if operators.contains_key(key) {
                return Err(Error::invalid_filter(format!(
                    "field '{}': '{}' appears more than once and cannot be expressed as a where-condition",
                    filter.field, filter.operator
                )));
            }
            operators.insert(key.to_string(), operand);
        }
    }

    Ok(condition)
}

/// Check canonical filters, reporting every violation at once.
pub fn validate(filters: &[Filter]) -> Result<()> {
    let violations: Vec<String> = filters
        .iter()
        .enumerate()
        .flat_map(|(index, filter)| filter_violations(index, filter))
        .collect();

    if violations.is_empty() {
        Ok(())
    } else {
        Err(Error::FilterValidation { violations })
    }
}

fn filter_violations(index: usize, filter: &Filter) -> Vec<String> {
    let mut violations = Vec::new();

    if filter.field.is_empty() {
        violations.push(format!("filter[{}]: field is required", index));
    } else if !is_valid_identifier(&filter.field) {
        violations.push(format!(
            "filter[{}]: field '{}' is not a valid identifier",
            index, filter.field
        ));
    }

    let count = filter.values.len();
    let problem = match filter.operator.arity() {
        Arity::Two if count != 2 => Some(format!("requires exactly 2 values, got {}", count)),
        Arity::AtLeastOne if count == 0 => Some("requires at least 1 value".to_string()),
        Arity::None if count != 0 => Some(format!("takes no values, got {}", count)),
        Arity::One if count != 1 => Some(format!("requires exactly 1 value, got {}", count)),
        _ => None,
    };
    if let Some(problem) = problem {
        violations.push(format!(
            "filter[{}]: '{}' on '{}' {}",
            index, filter.operator, filter.field, problem
        ));
    }

    violations
}

/// Parse a flat API filter array from raw JSON.
///
/// Shape problems in every entry are collected into one
/// [`Error::FilterValidation`]. An operator string outside the known set fails
/// with [`Error::UnsupportedOperator`].
pub fn parse_filters(raw: &Value) -> Result<Vec<Filter>> {
    let entries = raw
        .as_array()
        .ok_or_else(|| Error::invalid_filter("filters must be an array"))?;

    let mut filters = Vec::with_capacity(entries.len());
    let mut violations = Vec::new();

    for (index, entry) in entries.iter().enumerate() {
        let Some(object) = entry.as_object() else {
            violations.push(format!("filter[{}]: expected an object", index));
            continue;
        };

        let field = match object.get("field") {
            Some(Value::String(field)) => Some(field.clone()),
            _ => {
                violations.push(format!("filter[{}]: field is required", index));
                None
            }
        };

        let operator = match object.get("operator") {
            None | Some(Value::Null) => {
                violations.push(format!("filter[{}]: operator is required", index));
                None
            }
            Some(Value::String(operator)) => Some(operator.parse::<Operator>()?),
            Some(_) => {
                violations.push(format!("filter[{}]: operator must be a string", index));
                None
            }
        };

        let values = match object.get("values") {
            Some(Value::Array(values)) => Some(values.clone()),
            _ => {
                violations.push(format!("filter[{}]: values must be a list", index));
                None
            }
        };

        if let (Some(field), Some(operator), Some(values)) = (field, operator, values) {
            let filter = Filter::new(field, operator, values);
            violations.extend(filter_violations(index, &filter));
            filters.push(filter);
        }
    }

    if violations.is_empty() {
        Ok(filters)
    } else {
        Err(Error::FilterValidation { violations })
    }
}

/// Fluent accumulator of canonical filters
///
/// Every predicate consumes the builder and hands back one with the filter
/// appended, so a builder that was already built from cannot change underneath.
///
/// # Example
/// ```
/// use tablebase::filter::create_filter;
///
/// let filters = create_filter()
///     .greater_than("age", 30)
///     .equals("active", true)
///     .build();
/// assert_eq!(filters.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterBuilder {
    filters: Vec<Filter>,
}

impl FilterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(mut self, field: impl Into<String>, operator: Operator, values: Vec<Value>) -> Self {
        self.filters.push(Filter::new(field, operator, values));
        self
    }

    pub fn equals(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(field, Operator::Eq, vec![value.into()])
    }

    pub fn not_equals(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(field, Operator::Ne, vec![value.into()])
    }

    pub fn greater_than(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(field, Operator::Gt, vec![value.into()])
    }

    pub fn greater_than_or_equal(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(field, Operator::Gte, vec![value.into()])
    }

    pub fn less_than(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(field, Operator::Lt, vec![value.into()])
    }

    pub fn less_than_or_equal(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(field, Operator::Lte, vec![value.into()])
    }

    pub fn like(self, field: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.push(field, Operator::Like, vec![Value::String(pattern.into())])
    }

    pub fn is_in<I, V>(self, field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.push(field, Operator::In, values.into_iter().map(Into::into).collect())
    }

    pub fn not_in<I, V>(self, field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.push(field, Operator::NotIn, values.into_iter().map(Into::into).collect())
    }

    pub fn between(self, field: impl Into<String>, low: impl Into<Value>, high: impl Into<Value>) -> Self {
        self.push(field, Operator::Between, vec![low.into(), high.into()])
    }

    pub fn is_null(self, field: impl Into<String>) -> Self {
        self.push(field, Operator::IsNull, Vec::new())
    }

    pub fn is_not_null(self, field: impl Into<String>) -> Self {
        self.push(field, Operator::IsNotNull, Vec::new())
    }

    /// Match rows whose array column contains all of `values`
    pub fn array_contains<I, V>(self, field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.push(field, Operator::ArrayContains, values.into_iter().map(Into::into).collect())
    }

    /// Snapshot of the accumulated filters
    pub fn build(&self) -> Vec<Filter> {
        self.filters.clone()
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

/// Start a filter chain
pub fn create_filter() -> FilterBuilder {
    FilterBuilder::new()
}

/// Any of the accepted filter syntaxes
#[derive(Debug, Clone)]
pub enum Filters {
    Where(WhereCondition),
    List(Vec<Filter>),
    Builder(FilterBuilder),
}

impl Filters {
    /// Translate to canonical filters and validate them
    pub fn into_canonical(self) -> Result<Vec<Filter>> {
        let filters = match self {
            Filters::Where(condition) => from_where(&condition)?,
            Filters::List(filters) => filters,
            Filters::Builder(builder) => builder.build(),
        };
        validate(&filters)?;
        Ok(filters)
    }
}

impl From<WhereCondition> for Filters {
    fn from(condition: WhereCondition) -> Self {
        Filters::Where(condition)
    }
}

impl From<Vec<Filter>> for Filters {
    fn from(filters: Vec<Filter>) -> Self {
        Filters::List(filters)
    }
}

impl From<FilterBuilder> for Filters {
    fn from(builder: FilterBuilder) -> Self {
        Filters::Builder(builder)
    }
}

impl TryFrom<Value> for Filters {
    type Error = Error;

    /// Objects are where-conditions, arrays are flat API filter lists.
    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Object(condition) => Ok(Filters::Where(condition)),
            Value::Array(_) => Ok(Filters::List(parse_filters(&value)?)),
            other => Err(Error::invalid_filter(format!(
                "expected a where-condition object or a filter array, got {}",
                other
            ))),
        }
    }
}
