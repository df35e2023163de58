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

use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

use log::debug;
use serde::Serialize;

use crate::hash::{upper_hex_hmac_sha256, upper_hex_md5};
use crate::params::{canonical_string, flatten};
use crate::utils::Redact;
use crate::{Error, Result};

/// Name of the signature field carried by signed records.
pub const SIGN_FIELD: &str = "sign";

/// Algorithm used to turn the string to sign into a signature.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SignType {
    /// Uppercase hex MD5, the default.
    #[default]
    Md5,
    /// Uppercase hex HMAC-SHA256 keyed with the api key.
    HmacSha256,
}

impl SignType {
    /// The value the remote side expects in `sign_type` / `signType`.
    pub fn as_str(&self) -> &'static str {
        match self {
            SignType::Md5 => "MD5",
            SignType::HmacSha256 => "HMAC-SHA256",
        }
    }
}

impl Display for SignType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "" | "MD5" => Ok(SignType::Md5),
            "HMAC-SHA256" => Ok(SignType::HmacSha256),
            v => Err(Error::config_invalid(format!("unsupported sign type: {v}"))),
        }
    }
}

/// Signer computes and verifies the `sign` field of request payloads.
///
/// The string to sign is `canonical + "&key=" + api_key`, where `canonical`
/// is the [`canonical_string`] of the flattened payload. Fields with empty
/// values, including the signature field itself while it is unset, never
/// take part in the signature.
#[derive(Clone)]
pub struct Signer {
    api_key: String,
    sign_type: SignType,
}

impl Debug for Signer {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signer")
            .field("api_key", &Redact::from(&self.api_key))
            .field("sign_type", &self.sign_type)
            .finish()
    }
}

impl Signer {
    /// Create a new MD5 signer with the shared api key.
    pub fn new(api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            sign_type: SignType::Md5,
        }
    }

    /// Use another sign type.
    pub fn with_sign_type(mut self, sign_type: SignType) -> Self {
        self.sign_type = sign_type;
        self
    }

    /// The sign type in use.
    pub fn sign_type(&self) -> SignType {
        self.sign_type
    }

    /// Sign a flat payload.
    ///
    /// The signature field must still be empty, or it will be signed too.
    pub fn sign<T: Serialize + ?Sized>(&self, payload: &T) -> Result<String> {
        self.sign_params(flatten(payload)?)
    }

    /// Sign an already flattened payload.
    pub fn sign_params<K, V>(&self, params: impl IntoIterator<Item = (K, V)>) -> Result<String>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let canonical = canonical_string(params)?;
        debug!("calculated canonical string: {canonical}");

        let string_to_sign = format!("{canonical}&key={}", self.api_key);
        let signature = match self.sign_type {
            SignType::Md5 => upper_hex_md5(string_to_sign.as_bytes()),
            SignType::HmacSha256 => {
                upper_hex_hmac_sha256(self.api_key.as_bytes(), string_to_sign.as_bytes())
            }
        };
        Ok(signature)
    }

    /// Verify the `sign` field of an inbound record.
    ///
    /// The signature is recomputed with the `sign` field cleared and must
    /// match exactly. Returns `Ok(false)` on any mismatch, including a
    /// missing signature.
    pub fn verify<T: Serialize + ?Sized>(&self, record: &T) -> Result<bool> {
        self.verify_with_field(record, SIGN_FIELD)
    }

    /// Verify a record whose signature lives in `field` instead of `sign`.
    pub fn verify_with_field<T: Serialize + ?Sized>(&self, record: &T, field: &str) -> Result<bool> {
        let mut params = flatten(record)?;
        let expected = params.remove(field).unwrap_or_default();
        if expected.is_empty() {
            debug!("record has no {field} field, reject");
            return Ok(false);
        }

        let actual = self.sign_params(params)?;
        Ok(actual == expected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use pretty_assertions::assert_eq;
    use serde::Deserialize;
    use test_case::test_case;

    #[derive(Serialize, Deserialize, Clone, Default)]
    struct Notify {
        appid: String,
        mch_id: String,
        nonce_str: String,
        out_trade_no: String,
        total_fee: String,
        sign: String,
    }

    // Field order differs from `Notify` on purpose.
    #[derive(Serialize)]
    struct Reordered {
        total_fee: String,
        out_trade_no: String,
        sign: String,
        nonce_str: String,
        mch_id: String,
        appid: String,
    }

    fn notify() -> Notify {
        Notify {
            appid: "wx123".to_string(),
            mch_id: "1900".to_string(),
            nonce_str: "5K8264ILTKCH16CQ2502SI8ZNMTM67VS".to_string(),
            out_trade_no: "ORDER1".to_string(),
            total_fee: "100".to_string(),
            sign: String::new(),
        }
    }

    #[test]
    fn test_sign_md5() {
        let signer = Signer::new("192006250b4c09247ec02edce69f6a2d");
        let sig = signer.sign(&notify()).unwrap();

        let expected = upper_hex_md5(
            b"appid=wx123&mch_id=1900&nonce_str=5K8264ILTKCH16CQ2502SI8ZNMTM67VS\
              &out_trade_no=ORDER1&total_fee=100&key=192006250b4c09247ec02edce69f6a2d",
        );
        assert_eq!(sig, expected);
        assert_eq!(sig.len(), 32);
        assert!(sig.bytes().all(|b| b.is_ascii_digit() || b.is_ascii_uppercase()));
    }

    #[test]
    fn test_sign_hmac_sha256() {
        let signer = Signer::new("key").with_sign_type(SignType::HmacSha256);
        let sig = signer.sign_params([("a", "1")]).unwrap();
        assert_eq!(sig, upper_hex_hmac_sha256(b"key", b"a=1&key=key"));
        assert_eq!(sig.len(), 64);
    }

    #[test]
    fn test_sign_is_deterministic() {
        let signer = Signer::new("secret");
        let n = notify();
        let first = signer.sign(&n).unwrap();
        for _ in 0..10 {
            assert_eq!(signer.sign(&n).unwrap(), first);
        }

        let r = Reordered {
            total_fee: n.total_fee.clone(),
            out_trade_no: n.out_trade_no.clone(),
            sign: String::new(),
            nonce_str: n.nonce_str.clone(),
            mch_id: n.mch_id.clone(),
            appid: n.appid.clone(),
        };
        assert_eq!(signer.sign(&r).unwrap(), first);
    }

    #[test]
    fn test_verify_round_trip() {
        let signer = Signer::new("secret");
        let mut n = notify();
        n.sign = signer.sign(&n).unwrap();
        assert!(signer.verify(&n).unwrap());

        // Flip every position once.
        for i in 0..n.sign.len() {
            let mut tampered = n.clone();
            let mut bs = tampered.sign.into_bytes();
            bs[i] = if bs[i] == b'A' { b'B' } else { b'A' };
            tampered.sign = String::from_utf8(bs).unwrap();
            assert!(!signer.verify(&tampered).unwrap(), "flipped at {i}");
        }
    }

    #[test]
    fn test_verify_is_case_sensitive() {
        let signer = Signer::new("secret");
        let mut n = notify();
        n.sign = signer.sign(&n).unwrap().to_lowercase();
        assert!(!signer.verify(&n).unwrap());
    }

    #[test]
    fn test_verify_rejects_other_key_and_missing_sign() {
        let mut n = notify();
        n.sign = Signer::new("secret").sign(&n).unwrap();
        assert!(!Signer::new("other").verify(&n).unwrap());

        n.sign = String::new();
        assert!(!Signer::new("secret").verify(&n).unwrap());
    }

    #[test]
    fn test_verify_with_field() {
        let signer = Signer::new("secret");
        let mut v = serde_json::json!({
            "appId": "wx123",
            "nonceStr": "abc",
            "paySign": "",
        });
        let sig = signer.sign(&v).unwrap();
        v["paySign"] = serde_json::Value::String(sig);
        assert!(signer.verify_with_field(&v, "paySign").unwrap());
    }

    #[test]
    fn test_sign_rejects_nested() {
        let err = Signer::new("secret")
            .sign(&serde_json::json!({"data": {"k": "v"}}))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Serialization);
    }

    #[test_case("", SignType::Md5)]
    #[test_case("MD5", SignType::Md5)]
    #[test_case("HMAC-SHA256", SignType::HmacSha256)]
    fn test_sign_type_from_str(input: &str, expected: SignType) {
        assert_eq!(input.parse::<SignType>().unwrap(), expected);
    }

    #[test]
    fn test_signer_debug_redacts_key() {
        let s = format!("{:?}", Signer::new("192006250b4c09247ec02edce69f6a2d"));
        assert!(!s.contains("192006250b4c09247ec02edce69f6a2d"), "{s}");
    }
}
