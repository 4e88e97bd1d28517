// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Query-string policy.
//!
//! GET requests with at least one list-valued parameter use repeated-key
//! form (`ids=1&ids=2`) with falsy values and elements dropped. Every other
//! request keeps the transport's native form-urlencoded pairs.

use crate::descriptor::{ParamValue, Params};
use reqwest::Method;
use url::form_urlencoded;
use url::Url;

/// How parameters end up in the URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryEncoding {
    /// Native `key=value` pairs (null values already skipped).
    Native(Vec<(String, String)>),
    /// Pre-encoded repeated-key query string.
    RepeatedKey(String),
}

impl QueryEncoding {
    /// Choose the encoding for `params` sent with `method`.
    pub fn for_request(method: &Method, params: &Params) -> Self {
        if *method == Method::GET && params.has_list() {
            Self::RepeatedKey(repeated_key_query(params))
        } else {
            Self::Native(native_pairs(params))
        }
    }

    /// The query string this encoding contributes.
    pub fn query_string(&self) -> String {
        match self {
            Self::Native(pairs) => form_urlencoded::Serializer::new(String::new())
                .extend_pairs(pairs)
                .finish(),
            Self::RepeatedKey(query) => query.clone(),
        }
    }

    /// Append to `url`'s query, keeping whatever it already has.
    pub fn apply_to(&self, url: &mut Url) {
        match self {
            Self::Native(pairs) => {
                if !pairs.is_empty() {
                    url.query_pairs_mut().extend_pairs(pairs);
                }
            }
            Self::RepeatedKey(query) => {
                if query.is_empty() {
                    return;
                }
                let merged = match url.query() {
                    Some(existing) if !existing.is_empty() => format!("{existing}&{query}"),
                    _ => query.clone(),
                };
                url.set_query(Some(&merged));
            }
        }
    }
}

/// Repeated-key serialization: one pair per truthy scalar or truthy list element.
pub fn repeated_key_query(params: &Params) -> String {
    params
        .iter()
        .filter(|(_, value)| value.is_truthy())
        .flat_map(|(key, value)| {
            let key = encode_component(key);
            let values: Vec<&ParamValue> = match value {
                ParamValue::List(items) => items.iter().filter(|v| v.is_truthy()).collect(),
                scalar => vec![scalar],
            };
            values
                .into_iter()
                .map(move |v| format!("{key}={}", encode_component(&v.render())))
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Percent-encode like `encodeURIComponent`: `!*'()` stay literal.
fn encode_component(raw: &str) -> String {
    const KEPT: [(&str, &str); 5] = [
        ("%21", "!"),
        ("%27", "'"),
        ("%28", "("),
        ("%29", ")"),
        ("%2A", "*"),
    ];
    let mut encoded = urlencoding::encode(raw).into_owned();
    // `%` itself encodes as `%25`, so these triplets only come from the five chars.
    for (escape, literal) in KEPT {
        if encoded.contains(escape) {
            encoded = encoded.replace(escape, literal);
        }
    }
    encoded
}

fn native_pairs(params: &Params) -> Vec<(String, String)> {
    params
        .iter()
        .filter(|(_, value)| !matches!(value, ParamValue::Null))
        .map(|(key, value)| (key.to_string(), value.render()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falsy_list_elements_are_dropped() {
        let params: Params = [("ids", vec!["1", "2", ""])].into_iter().collect();
        assert_eq!(
            QueryEncoding::for_request(&Method::GET, &params).query_string(),
            "ids=1&ids=2"
        );
    }

    #[test]
    fn falsy_scalars_are_dropped_once_a_list_is_present() {
        let mut params = Params::new();
        params.insert("empty", "");
        params.insert("none", ParamValue::Null);
        params.insert("zero", 0);
        params.insert("no", false);
        params.insert("tags", Vec::<&str>::new());
        params.insert("ids", vec!["a"]);
        params.insert("q", "x y");
        assert_eq!(repeated_key_query(&params), "ids=a&q=x%20y");
    }

    #[test]
    fn keys_and_values_are_percent_encoded_in_order() {
        let mut params = Params::new();
        params.insert("a&b", vec!["1/2", "ü", "3"]);
        params.insert("n", 5);
        assert_eq!(
            repeated_key_query(&params),
            "a%26b=1%2F2&a%26b=%C3%BC&a%26b=3&n=5"
        );
    }

    #[test]
    fn component_encoding_keeps_uri_marks_literal() {
        let mut params = Params::new();
        params.insert("f(x)", vec!["it's!", "a*b", "~_.-", "%21"]);
        assert_eq!(
            repeated_key_query(&params),
            "f(x)=it's!&f(x)=a*b&f(x)=~_.-&f(x)=%2521"
        );
    }

    #[test]
    fn scalar_only_params_use_native_encoding() {
        let mut params = Params::new();
        params.insert("q", "x y");
        params.insert("empty", "");
        params.insert("none", ParamValue::Null);
        params.insert("flag", false);
        let encoding = QueryEncoding::for_request(&Method::GET, &params);
        assert_eq!(
            encoding,
            QueryEncoding::Native(vec![
                ("q".into(), "x y".into()),
                ("empty".into(), String::new()),
                ("flag".into(), "false".into()),
            ])
        );
        assert_eq!(encoding.query_string(), "q=x+y&empty=&flag=false");
    }

    #[test]
    fn non_get_methods_keep_native_encoding_even_with_lists() {
        let params: Params = [("ids", vec!["1", "2"])].into_iter().collect();
        assert!(matches!(
            QueryEncoding::for_request(&Method::POST, &params),
            QueryEncoding::Native(_)
        ));
    }

    #[test]
    fn apply_appends_to_existing_query() {
        let mut url = Url::parse("http://x/api?v=1").unwrap();
        QueryEncoding::RepeatedKey("ids=1&ids=2".into()).apply_to(&mut url);
        assert_eq!(url.as_str(), "http://x/api?v=1&ids=1&ids=2");

        let mut url = Url::parse("http://x/api").unwrap();
        QueryEncoding::Native(vec![("q".into(), "a b".into())]).apply_to(&mut url);
        assert_eq!(url.as_str(), "http://x/api?q=a+b");
    }

    #[test]
    fn empty_encodings_leave_url_untouched() {
        let mut url = Url::parse("http://x/api").unwrap();
        QueryEncoding::RepeatedKey(String::new()).apply_to(&mut url);
        QueryEncoding::Native(vec![]).apply_to(&mut url);
        assert_eq!(url.as_str(), "http://x/api");
    }
}
