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
use serde_json::{Map, Value};

/// The `errcode` / `errmsg` pair every mini program api answers with.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ErrorResponse {
    pub errcode: i64,
    pub errmsg: String,
}

impl ErrorResponse {
    /// `errcode` is `0`.
    pub fn is_ok(&self) -> bool {
        self.errcode == 0
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SessionResponse {
    pub errcode: i64,
    pub errmsg: String,
    pub openid: String,
    pub session_key: String,
    pub unionid: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AccessTokenResponse {
    pub errcode: i64,
    pub errmsg: String,
    pub access_token: String,
    /// Validity of the token in seconds, at most 7200.
    pub expires_in: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SubscribeMessageRequest {
    pub touser: String,
    pub template_id: String,
    pub page: String,
    /// Template data, such as `{"thing1": {"value": "..."}}`.
    pub data: Map<String, Value>,
    /// `developer`, `trial` or `formal`.
    pub miniprogram_state: String,
    pub lang: String,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LineColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct WxacodeUnlimitedRequest {
    /// Up to 32 visible characters passed to the page.
    pub scene: String,
    pub page: String,
    pub width: u32,
    pub auto_color: bool,
    pub line_color: LineColor,
    pub is_hyaline: bool,
}
