// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Canonical parameter string and payload flattening.

use std::borrow::Cow;
use std::collections::BTreeMap;

use percent_encoding::percent_decode_str;
use serde::Serialize;
use serde_json::Value;

use crate::{Error, Result};

/// Build the canonical parameter string of `params`.
///
/// Pairs with an empty value are dropped, the rest are form encoded with
/// keys in ascending byte order and then decoded back, so the result holds
/// raw `key=value` pairs joined by `&`.
///
/// An empty input (or one whose values are all empty) yields `""`.
pub fn canonical_string<K, V>(params: impl IntoIterator<Item = (K, V)>) -> Result<String>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let params: BTreeMap<String, String> = params
        .into_iter()
        .filter(|(_, v)| !v.as_ref().is_empty())
        .map(|(k, v)| (k.as_ref().to_string(), v.as_ref().to_string()))
        .collect();

    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (k, v) in &params {
        serializer.append_pair(k, v);
    }
    let escaped = serializer.finish();

    query_unescape(&escaped)
}

/// Decode a form encoded string: `+` turns into a space and every `%XX`
/// must be a valid escape of UTF-8 bytes.
fn query_unescape(s: &str) -> Result<String> {
    let bs = s.as_bytes();
    let mut i = 0;
    while i < bs.len() {
        if bs[i] == b'%' {
            let valid = bs.len() > i + 2
                && bs[i + 1].is_ascii_hexdigit()
                && bs[i + 2].is_ascii_hexdigit();
            if !valid {
                let end = (i + 3).min(bs.len());
                return Err(Error::encoding(format!(
                    "invalid escape {:?} at offset {i}",
                    String::from_utf8_lossy(&bs[i..end])
                )));
            }
            i += 3;
        } else {
            i += 1;
        }
    }

    let s = s.replace('+', " ");
    percent_decode_str(&s)
        .decode_utf8()
        .map(Cow::into_owned)
        .map_err(|e| Error::encoding("decoded parameters are not valid utf-8").with_source(e))
}

/// Flatten a serializable payload into a string-keyed mapping.
///
/// The payload must serialize to a flat object. Strings are kept as they
/// are, numbers and booleans use their JSON text, `null` becomes an empty
/// value. Nested arrays or objects can't be signed and are rejected.
pub fn flatten<T: Serialize + ?Sized>(payload: &T) -> Result<BTreeMap<String, String>> {
    let object = match serde_json::to_value(payload)? {
        Value::Object(object) => object,
        v => {
            return Err(Error::serialization(format!(
                "payload must be an object, got {}",
                json_type(&v)
            )))
        }
    };

    let mut params = BTreeMap::new();
    for (k, v) in object {
        let v = match v {
            Value::String(s) => s,
            Value::Null => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            v @ (Value::Array(_) | Value::Object(_)) => {
                return Err(Error::serialization(format!(
                    "field {k} is {} which can't be flattened",
                    json_type(&v)
                )));
            }
        };
        params.insert(k, v);
    }

    Ok(params)
}

fn json_type(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    #[test]
    fn test_canonical_string_drops_empty_and_sorts() {
        let params = [
            ("appid", "wx123"),
            ("mch_id", "1900"),
            ("nonce_str", ""),
            ("sign", ""),
            ("out_trade_no", "ORDER1"),
        ];
        assert_eq!(
            canonical_string(params).unwrap(),
            "appid=wx123&mch_id=1900&out_trade_no=ORDER1"
        );
    }

    #[test]
    fn test_canonical_string_is_order_independent() {
        let a: HashMap<&str, &str> = [("b", "2"), ("a", "1"), ("c", "3")].into_iter().collect();
        let b: BTreeMap<&str, &str> = [("c", "3"), ("b", "2"), ("a", "1")].into_iter().collect();
        let c = vec![("a", "1"), ("c", "3"), ("b", "2")];

        let expected = "a=1&b=2&c=3";
        assert_eq!(canonical_string(a).unwrap(), expected);
        assert_eq!(canonical_string(b).unwrap(), expected);
        assert_eq!(canonical_string(c).unwrap(), expected);
    }

    #[test]
    fn test_canonical_string_empty() {
        let empty: Vec<(&str, &str)> = vec![];
        assert_eq!(canonical_string(empty).unwrap(), "");
        assert_eq!(canonical_string([("k", "")]).unwrap(), "");
    }

    #[test]
    fn test_canonical_string_keeps_raw_characters() {
        let params = [
            ("body", "hello world"),
            ("attach", "a+b=c&d"),
            ("detail", "100%"),
            ("notify_url", "https://example.com/notify?x=1"),
        ];
        assert_eq!(
            canonical_string(params).unwrap(),
            "attach=a+b=c&d&body=hello world&detail=100%&notify_url=https://example.com/notify?x=1"
        );
    }

    #[test]
    fn test_query_unescape_rejects_malformed() {
        for input in ["a=%zz", "a=%4", "a=%", "a=%e4"] {
            let err = query_unescape(input).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Encoding, "input: {input}");
        }
        assert_eq!(query_unescape("a=%E4%B8%AD+b").unwrap(), "a=中 b");
    }

    #[derive(Serialize)]
    struct Order {
        appid: String,
        total_fee: i64,
        paid: bool,
        attach: Option<String>,
    }

    #[test]
    fn test_flatten() {
        let params = flatten(&Order {
            appid: "wx123".to_string(),
            total_fee: 100,
            paid: false,
            attach: None,
        })
        .unwrap();

        let expected: BTreeMap<String, String> = [
            ("appid", "wx123"),
            ("total_fee", "100"),
            ("paid", "false"),
            ("attach", ""),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        assert_eq!(params, expected);
    }

    #[test]
    fn test_flatten_rejects_nested() {
        let err = flatten(&serde_json::json!({"a": {"b": "c"}})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Serialization);

        let err = flatten(&serde_json::json!({"a": ["b"]})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Serialization);

        let err = flatten("not an object").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Serialization);
    }
}
