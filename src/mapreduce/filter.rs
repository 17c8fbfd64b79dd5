//! Key filters for map-reduce inputs.
//!
//! A filter serializes to an ordered array whose first element is the
//! operator name, e.g. `["greater_than_eq", 5]`. A [`FilterList`] is the
//! pipeline Riak applies to each key, serialized as an array of those arrays.
//!
//! ```
//! use riak_http::mapreduce::{FilterList, KeyFilter, MapReduceFilter};
//! use serde_json::json;
//!
//! let filters: FilterList = [
//!     KeyFilter::tokenize("-", 2),
//!     KeyFilter::string_to_int(),
//!     KeyFilter::greater_than_eq(2010),
//! ]
//! .into_iter()
//! .collect();
//!
//! assert_eq!(
//!     filters.to_serializable(),
//!     json!([["tokenize", "-", 2], ["string_to_int"], ["greater_than_eq", 2010]])
//! );
//! ```

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// Anything that renders to the ordered array form Riak expects.
pub trait MapReduceFilter {
    fn to_serializable(&self) -> Value;
}

/// A filter argument, kept in its native JSON type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Operand {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl Operand {
    fn to_value(&self) -> Value {
        match self {
            Operand::Integer(i) => Value::from(*i),
            // Non-finite floats become null.
            Operand::Float(f) => Value::from(*f),
            Operand::Text(s) => Value::from(s.as_str()),
        }
    }

    /// Type an untyped argument: integer, then float, then text.
    pub fn infer(raw: &str) -> Self {
        if let Ok(i) = raw.parse::<i64>() {
            Operand::Integer(i)
        } else if let Some(f) = raw.parse::<f64>().ok().filter(|f| f.is_finite()) {
            Operand::Float(f)
        } else {
            Operand::Text(raw.to_string())
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Integer(i) => write!(f, "{i}"),
            Operand::Float(x) => write!(f, "{x}"),
            Operand::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Operand {
    fn from(s: &str) -> Self {
        Operand::Text(s.to_string())
    }
}

impl From<String> for Operand {
    fn from(s: String) -> Self {
        Operand::Text(s)
    }
}

impl From<i32> for Operand {
    fn from(i: i32) -> Self {
        Operand::Integer(i64::from(i))
    }
}

impl From<i64> for Operand {
    fn from(i: i64) -> Self {
        Operand::Integer(i)
    }
}

impl From<u32> for Operand {
    fn from(i: u32) -> Self {
        Operand::Integer(i64::from(i))
    }
}

impl From<f64> for Operand {
    fn from(f: f64) -> Self {
        Operand::Float(f)
    }
}

impl From<f32> for Operand {
    fn from(f: f32) -> Self {
        Operand::Float(f64::from(f))
    }
}

/// One step of a key filter pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyFilter {
    GreaterThan(Operand),
    LessThan(Operand),
    GreaterThanEq(Operand),
    LessThanEq(Operand),
    Between {
        low: Operand,
        high: Operand,
        inclusive: Option<bool>,
    },
    Matches(String),
    NotEqual(Operand),
    Equal(Operand),
    SetMember(Vec<Operand>),
    SimilarTo {
        value: String,
        distance: u32,
    },
    StartsWith(String),
    EndsWith(String),

    IntToString,
    StringToInt,
    FloatToString,
    StringToFloat,
    ToUpper,
    ToLower,
    Tokenize {
        separator: String,
        index: u32,
    },
    UrlDecode,

    And(FilterList, FilterList),
    Or(FilterList, FilterList),
    Not(FilterList),
}

impl KeyFilter {
    pub fn greater_than(value: impl Into<Operand>) -> Self {
        KeyFilter::GreaterThan(value.into())
    }

    pub fn less_than(value: impl Into<Operand>) -> Self {
        KeyFilter::LessThan(value.into())
    }

    pub fn greater_than_eq(value: impl Into<Operand>) -> Self {
        KeyFilter::GreaterThanEq(value.into())
    }

    pub fn less_than_eq(value: impl Into<Operand>) -> Self {
        KeyFilter::LessThanEq(value.into())
    }

    /// Inclusive range, Riak's default for `between`.
    pub fn between(low: impl Into<Operand>, high: impl Into<Operand>) -> Self {
        KeyFilter::Between {
            low: low.into(),
            high: high.into(),
            inclusive: None,
        }
    }

    pub fn between_with(
        low: impl Into<Operand>,
        high: impl Into<Operand>,
        inclusive: bool,
    ) -> Self {
        KeyFilter::Between {
            low: low.into(),
            high: high.into(),
            inclusive: Some(inclusive),
        }
    }

    /// Keys matching an Erlang regular expression.
    pub fn matches(pattern: impl Into<String>) -> Self {
        KeyFilter::Matches(pattern.into())
    }

    pub fn not_equal(value: impl Into<Operand>) -> Self {
        KeyFilter::NotEqual(value.into())
    }

    pub fn equal(value: impl Into<Operand>) -> Self {
        KeyFilter::Equal(value.into())
    }

    pub fn set_member<I, T>(members: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Operand>,
    {
        KeyFilter::SetMember(members.into_iter().map(Into::into).collect())
    }

    /// Keys within `distance` Levenshtein edits of `value`.
    pub fn similar_to(value: impl Into<String>, distance: u32) -> Self {
        KeyFilter::SimilarTo {
            value: value.into(),
            distance,
        }
    }

    pub fn starts_with(prefix: impl Into<String>) -> Self {
        KeyFilter::StartsWith(prefix.into())
    }

    pub fn ends_with(suffix: impl Into<String>) -> Self {
        KeyFilter::EndsWith(suffix.into())
    }

    pub fn int_to_string() -> Self {
        KeyFilter::IntToString
    }

    pub fn string_to_int() -> Self {
        KeyFilter::StringToInt
    }

    pub fn float_to_string() -> Self {
        KeyFilter::FloatToString
    }

    pub fn string_to_float() -> Self {
        KeyFilter::StringToFloat
    }

    pub fn to_upper() -> Self {
        KeyFilter::ToUpper
    }

    pub fn to_lower() -> Self {
        KeyFilter::ToLower
    }

    /// Split the key on `separator` and keep token `index` (1-based).
    pub fn tokenize(separator: impl Into<String>, index: u32) -> Self {
        KeyFilter::Tokenize {
            separator: separator.into(),
            index,
        }
    }

    pub fn url_decode() -> Self {
        KeyFilter::UrlDecode
    }

    pub fn and(left: impl Into<FilterList>, right: impl Into<FilterList>) -> Self {
        KeyFilter::And(left.into(), right.into())
    }

    pub fn or(left: impl Into<FilterList>, right: impl Into<FilterList>) -> Self {
        KeyFilter::Or(left.into(), right.into())
    }

    pub fn not(filters: impl Into<FilterList>) -> Self {
        KeyFilter::Not(filters.into())
    }

    /// The operator name Riak knows this filter by.
    pub fn operator(&self) -> &'static str {
        match self {
            KeyFilter::GreaterThan(_) => "greater_than",
            KeyFilter::LessThan(_) => "less_than",
            KeyFilter::GreaterThanEq(_) => "greater_than_eq",
            KeyFilter::LessThanEq(_) => "less_than_eq",
            KeyFilter::Between { .. } => "between",
            KeyFilter::Matches(_) => "matches",
            KeyFilter::NotEqual(_) => "neq",
            KeyFilter::Equal(_) => "eq",
            KeyFilter::SetMember(_) => "set_member",
            KeyFilter::SimilarTo { .. } => "similar_to",
            KeyFilter::StartsWith(_) => "starts_with",
            KeyFilter::EndsWith(_) => "ends_with",
            KeyFilter::IntToString => "int_to_string",
            KeyFilter::StringToInt => "string_to_int",
            KeyFilter::FloatToString => "float_to_string",
            KeyFilter::StringToFloat => "string_to_float",
            KeyFilter::ToUpper => "to_upper",
            KeyFilter::ToLower => "to_lower",
            KeyFilter::Tokenize { .. } => "tokenize",
            KeyFilter::UrlDecode => "urldecode",
            KeyFilter::And(..) => "and",
            KeyFilter::Or(..) => "or",
            KeyFilter::Not(_) => "not",
        }
    }

    fn arguments(&self) -> Vec<Value> {
        match self {
            KeyFilter::GreaterThan(v)
            | KeyFilter::LessThan(v)
            | KeyFilter::GreaterThanEq(v)
            | KeyFilter::LessThanEq(v)
            | KeyFilter::NotEqual(v)
            | KeyFilter::Equal(v) => vec![v.to_value()],
            KeyFilter::Between {
                low,
                high,
                inclusive,
            } => {
                let mut args = vec![low.to_value(), high.to_value()];
                if let Some(inclusive) = inclusive {
                    args.push(Value::Bool(*inclusive));
                }
                args
            }
            KeyFilter::Matches(s) | KeyFilter::StartsWith(s) | KeyFilter::EndsWith(s) => {
                vec![Value::from(s.as_str())]
            }
            KeyFilter::SetMember(members) => members.iter().map(Operand::to_value).collect(),
            KeyFilter::SimilarTo { value, distance } => {
                vec![Value::from(value.as_str()), Value::from(*distance)]
            }
            KeyFilter::IntToString
            | KeyFilter::StringToInt
            | KeyFilter::FloatToString
            | KeyFilter::StringToFloat
            | KeyFilter::ToUpper
            | KeyFilter::ToLower
            | KeyFilter::UrlDecode => Vec::new(),
            KeyFilter::Tokenize { separator, index } => {
                vec![Value::from(separator.as_str()), Value::from(*index)]
            }
            KeyFilter::And(left, right) | KeyFilter::Or(left, right) => {
                vec![left.to_serializable(), right.to_serializable()]
            }
            KeyFilter::Not(filters) => vec![filters.to_serializable()],
        }
    }
}

impl MapReduceFilter for KeyFilter {
    fn to_serializable(&self) -> Value {
        let mut array = Vec::with_capacity(3);
        array.push(Value::from(self.operator()));
        array.extend(self.arguments());
        Value::Array(array)
    }
}

impl Serialize for KeyFilter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_serializable().serialize(serializer)
    }
}

/// An ordered key filter pipeline.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterList {
    filters: Vec<KeyFilter>,
}

impl FilterList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, filter: KeyFilter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn push(&mut self, filter: KeyFilter) {
        self.filters.push(filter);
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, KeyFilter> {
        self.filters.iter()
    }
}

impl MapReduceFilter for FilterList {
    fn to_serializable(&self) -> Value {
        Value::Array(self.filters.iter().map(|f| f.to_serializable()).collect())
    }
}

impl Serialize for FilterList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_serializable().serialize(serializer)
    }
}

impl From<KeyFilter> for FilterList {
    fn from(filter: KeyFilter) -> Self {
        Self {
            filters: vec![filter],
        }
    }
}

impl From<Vec<KeyFilter>> for FilterList {
    fn from(filters: Vec<KeyFilter>) -> Self {
        Self { filters }
    }
}

impl FromIterator<KeyFilter> for FilterList {
    fn from_iter<I: IntoIterator<Item = KeyFilter>>(iter: I) -> Self {
        Self {
            filters: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for FilterList {
    type Item = KeyFilter;
    type IntoIter = std::vec::IntoIter<KeyFilter>;

    fn into_iter(self) -> Self::IntoIter {
        self.filters.into_iter()
    }
}

impl<'a> IntoIterator for &'a FilterList {
    type Item = &'a KeyFilter;
    type IntoIter = std::slice::Iter<'a, KeyFilter>;

    fn into_iter(self) -> Self::IntoIter {
        self.filters.iter()
    }
}
