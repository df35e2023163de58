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

use serde::{Deserialize, Serialize};

/// Request of the transfer to balance api.
///
/// Note the `mch_appid` and `mchid` field names, unlike the other apis.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferRequest {
    pub mch_appid: String,
    pub mchid: String,
    pub nonce_str: String,
    pub sign: String,
    pub partner_trade_no: String,
    pub openid: String,
    /// `NO_CHECK` or `FORCE_CHECK`.
    pub check_name: String,
    /// Amount in cents.
    pub amount: i64,
    pub desc: String,
    pub spbill_create_ip: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TransferResponse {
    pub return_code: String,
    pub return_msg: String,
    pub mch_appid: String,
    pub mchid: String,
    pub nonce_str: String,
    pub result_code: String,
    pub err_code: String,
    pub err_code_des: String,
    pub partner_trade_no: String,
    pub payment_no: String,
    pub payment_time: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryTransferRequest {
    pub appid: String,
    pub mch_id: String,
    pub nonce_str: String,
    pub sign: String,
    pub partner_trade_no: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct QueryTransferResponse {
    pub return_code: String,
    pub return_msg: String,
    pub appid: String,
    pub mch_id: String,
    pub nonce_str: String,
    pub result_code: String,
    pub err_code: String,
    pub err_code_des: String,
    pub partner_trade_no: String,
    pub detail_id: String,
    /// `SUCCESS`, `FAILED` or `PROCESSING`.
    pub status: String,
    pub reason: String,
    pub openid: String,
    pub transfer_name: String,
    pub payment_amount: i64,
    pub transfer_time: String,
    pub payment_time: String,
    pub desc: String,
}

/// Request of the refund api, one of `transaction_id` and `out_trade_no`
/// identifies the order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RefundRequest {
    pub appid: String,
    pub mch_id: String,
    pub nonce_str: String,
    pub sign: String,
    pub transaction_id: String,
    pub out_trade_no: String,
    pub out_refund_no: String,
    pub total_fee: i64,
    pub refund_fee: i64,
    pub refund_desc: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RefundResponse {
    pub return_code: String,
    pub return_msg: String,
    pub appid: String,
    pub mch_id: String,
    pub nonce_str: String,
    pub result_code: String,
    pub err_code: String,
    pub err_code_des: String,
    pub transaction_id: String,
    pub out_trade_no: String,
    pub out_refund_no: String,
    pub refund_id: String,
    pub refund_fee: i64,
    pub total_fee: i64,
    pub cash_fee: i64,
}

macro_rules! impl_is_success {
    ($($ty:ty),*) => {
        $(
            impl $ty {
                /// Both the communication and the business result succeeded.
                pub fn is_success(&self) -> bool {
                    self.return_code == "SUCCESS" && self.result_code == "SUCCESS"
                }
            }
        )*
    };
}

impl_is_success!(TransferResponse, QueryTransferResponse, RefundResponse);
