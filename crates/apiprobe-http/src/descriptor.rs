// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Caller-facing request description.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use serde_json::Value;
use std::time::Duration;

/// A query parameter value.
///
/// Truthiness follows the loose rules of the web hosts this talks to:
/// null, `false`, `0`, NaN, `""` and the empty list are falsy.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// No value.
    Null,
    /// Boolean.
    Bool(bool),
    /// Integer.
    Integer(i64),
    /// Floating point number.
    Float(f64),
    /// Text.
    Text(String),
    /// Sequence of values.
    List(Vec<ParamValue>),
}

impl ParamValue {
    /// True unless the value is falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(b) => *b,
            Self::Integer(i) => *i != 0,
            Self::Float(f) => *f != 0.0 && !f.is_nan(),
            Self::Text(s) => !s.is_empty(),
            Self::List(items) => !items.is_empty(),
        }
    }

    /// True for [`ParamValue::List`].
    pub fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }

    /// Text form used on the wire. Nested lists are comma-joined.
    pub fn render(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Bool(b) => b.to_string(),
            Self::Integer(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Text(s) => s.clone(),
            Self::List(items) => items
                .iter()
                .map(Self::render)
                .collect::<Vec<_>>()
                .join(","),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl<T: Into<ParamValue>> From<Option<T>> for ParamValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl<T: Into<ParamValue>> From<Vec<T>> for ParamValue {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

/// Query parameters in insertion order; keys are unique.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    entries: Vec<(String, ParamValue)>,
}

impl Params {
    /// Empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key`, replacing an existing value in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Value for `key`.
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no keys are set.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when at least one value is a list.
    pub fn has_list(&self) -> bool {
        self.entries.iter().any(|(_, v)| v.is_list())
    }
}

impl<K, V> FromIterator<(K, V)> for Params
where
    K: Into<String>,
    V: Into<ParamValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}

/// Everything a caller may say about one outbound request.
///
/// Unset fields fall back to the dispatcher's session defaults.
#[derive(Debug, Clone, Default)]
pub struct RequestDescriptor {
    /// HTTP method; GET when unset.
    pub method: Option<Method>,
    /// Absolute URL, possibly with its own query.
    pub url: String,
    /// Query parameters appended to `url`.
    pub params: Params,
    /// JSON body.
    pub body: Option<Value>,
    /// Headers that override the injected defaults.
    pub headers: HeaderMap,
    /// Per-call timeout override.
    pub timeout: Option<Duration>,
}

impl RequestDescriptor {
    /// Descriptor for `url` with every other field defaulted.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Explicit GET for `url`.
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(url).method(Method::GET)
    }

    /// Set the method.
    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Add or replace a query parameter.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.params.insert(key, value);
        self
    }

    /// Add or replace a header.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Set a JSON body.
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Override the session timeout for this call.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthiness_matches_loose_rules() {
        let falsy = [
            ParamValue::Null,
            ParamValue::Bool(false),
            ParamValue::Integer(0),
            ParamValue::Float(0.0),
            ParamValue::Float(f64::NAN),
            ParamValue::Text(String::new()),
            ParamValue::List(vec![]),
        ];
        assert!(falsy.iter().all(|v| !v.is_truthy()));

        let truthy = [
            ParamValue::Bool(true),
            ParamValue::Integer(-1),
            ParamValue::Float(0.5),
            ParamValue::Text("0".into()),
            ParamValue::List(vec![ParamValue::Null]),
        ];
        assert!(truthy.iter().all(ParamValue::is_truthy));
    }

    #[test]
    fn render_formats_scalars_and_nested_lists() {
        assert_eq!(ParamValue::Float(1.0).render(), "1");
        assert_eq!(ParamValue::Float(2.5).render(), "2.5");
        assert_eq!(
            ParamValue::from(vec!["a", "b"]).render(),
            "a,b".to_string()
        );
    }

    #[test]
    fn params_keep_insertion_order_and_replace_in_place() {
        let mut params: Params = [("b", "1"), ("a", "2")].into_iter().collect();
        params.insert("b", "3");
        let keys: Vec<_> = params.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert_eq!(params.get("b"), Some(&ParamValue::Text("3".into())));
        assert!(!params.has_list());
        params.insert("ids", vec!["x"]);
        assert!(params.has_list());
    }

    #[test]
    fn option_converts_to_null() {
        assert_eq!(ParamValue::from(None::<&str>), ParamValue::Null);
        assert_eq!(ParamValue::from(Some(7)), ParamValue::Integer(7));
    }
}
