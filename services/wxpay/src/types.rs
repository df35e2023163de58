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

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use wxsign_core::{Error, Result};

const SUCCESS: &str = "SUCCESS";
const FAIL: &str = "FAIL";

/// Request of the unified order api.
///
/// `appid`, `mch_id`, `nonce_str`, `sign_type` and `trade_type` are filled
/// by [`PayService::unified_order`](crate::PayService::unified_order) when
/// left empty. `sign` is always recomputed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UnifiedOrderRequest {
    pub appid: String,
    pub mch_id: String,
    pub device_info: String,
    pub nonce_str: String,
    pub sign: String,
    pub sign_type: String,
    pub body: String,
    pub detail: String,
    pub attach: String,
    pub out_trade_no: String,
    pub fee_type: String,
    /// Amount in cents.
    pub total_fee: i64,
    pub spbill_create_ip: String,
    pub time_start: String,
    pub time_expire: String,
    pub goods_tag: String,
    pub notify_url: String,
    pub trade_type: String,
    /// Required when `trade_type` is `JSAPI`.
    pub openid: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct UnifiedOrderResponse {
    pub return_code: String,
    pub return_msg: String,
    pub appid: String,
    pub mch_id: String,
    pub nonce_str: String,
    pub sign: String,
    pub result_code: String,
    pub err_code: String,
    pub err_code_des: String,
    pub trade_type: String,
    pub prepay_id: String,
    pub code_url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryOrderRequest {
    pub appid: String,
    pub mch_id: String,
    pub out_trade_no: String,
    pub nonce_str: String,
    pub sign: String,
    pub sign_type: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct QueryOrderResponse {
    pub return_code: String,
    pub return_msg: String,
    pub appid: String,
    pub mch_id: String,
    pub nonce_str: String,
    pub sign: String,
    pub result_code: String,
    pub err_code: String,
    pub err_code_des: String,
    pub device_info: String,
    pub openid: String,
    pub is_subscribe: String,
    pub trade_type: String,
    /// One of `SUCCESS`, `REFUND`, `NOTPAY`, `CLOSED`, `REVOKED`,
    /// `USERPAYING` and `PAYERROR`.
    pub trade_state: String,
    pub trade_state_desc: String,
    pub bank_type: String,
    pub total_fee: i64,
    pub settlement_total_fee: i64,
    pub fee_type: String,
    pub cash_fee: i64,
    pub cash_fee_type: String,
    pub transaction_id: String,
    pub out_trade_no: String,
    pub time_end: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CloseOrderRequest {
    pub appid: String,
    pub mch_id: String,
    pub nonce_str: String,
    pub out_trade_no: String,
    pub sign: String,
    pub sign_type: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CloseOrderResponse {
    pub return_code: String,
    pub return_msg: String,
    pub appid: String,
    pub mch_id: String,
    pub nonce_str: String,
    pub sign: String,
    pub result_code: String,
    pub result_msg: String,
    pub err_code: String,
    pub err_code_des: String,
}

macro_rules! impl_is_success {
    ($($ty:ty),*) => {
        $(
            impl $ty {
                /// Both the communication and the business result succeeded.
                pub fn is_success(&self) -> bool {
                    self.return_code == SUCCESS && self.result_code == SUCCESS
                }
            }
        )*
    };
}

impl_is_success!(UnifiedOrderResponse, QueryOrderResponse, CloseOrderResponse, Notify);

/// Parameters a mini program passes to `wx.requestPayment`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Prepay {
    pub app_id: String,
    pub time_stamp: String,
    pub nonce_str: String,
    /// Always `prepay_id=<prepay id>`.
    pub package: String,
    pub sign_type: String,
    pub pay_sign: String,
}

/// Payment result notification pushed to `notify_url`.
///
/// The sign covers every element of the inbound body, including the ones
/// without a field here. [`Notify::from_xml`] keeps all of them in
/// [`Notify::params`] for verification.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Notify {
    pub return_code: String,
    pub return_msg: String,
    pub appid: String,
    pub mch_id: String,
    pub device_info: String,
    pub nonce_str: String,
    pub sign: String,
    pub sign_type: String,
    pub result_code: String,
    pub err_code: String,
    pub err_code_des: String,
    pub openid: String,
    pub is_subscribe: String,
    pub trade_type: String,
    pub bank_type: String,
    pub total_fee: String,
    pub fee_type: String,
    pub cash_fee: String,
    pub cash_fee_type: String,
    pub transaction_id: String,
    pub out_trade_no: String,
    pub attach: String,
    pub time_end: String,

    #[serde(skip)]
    pub(crate) params: BTreeMap<String, String>,
}

impl Notify {
    /// Parse the XML body of a notification.
    pub fn from_xml(bs: &[u8]) -> Result<Self> {
        let params: BTreeMap<String, String> = quick_xml::de::from_reader(bs)
            .map_err(|e| Error::serialization("failed to decode notify").with_source(e))?;
        let mut notify: Notify = quick_xml::de::from_reader(bs)
            .map_err(|e| Error::serialization("failed to decode notify").with_source(e))?;
        notify.params = params;
        Ok(notify)
    }

    /// Every element of the inbound body, empty unless built by
    /// [`Notify::from_xml`].
    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }
}

/// Reply to a payment notification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotifyReply {
    pub return_code: String,
    pub return_msg: String,
}

impl NotifyReply {
    /// Acknowledge the notification.
    pub fn success() -> Self {
        Self {
            return_code: SUCCESS.to_string(),
            return_msg: "OK".to_string(),
        }
    }

    /// Reject the notification, it will be delivered again later.
    pub fn fail(msg: impl Into<String>) -> Self {
        Self {
            return_code: FAIL.to_string(),
            return_msg: msg.into(),
        }
    }

    /// Marshal the reply under `<xml>`.
    pub fn to_xml(&self) -> Result<String> {
        quick_xml::se::to_string_with_root("xml", self)
            .map_err(|e| Error::serialization("failed to encode notify reply").with_source(e))
    }
}
