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

// Env values used in wechat merchant payments.
pub const WECHAT_APP_ID: &str = "WECHAT_APP_ID";
pub const WECHAT_MCH_ID: &str = "WECHAT_MCH_ID";
pub const WECHAT_API_KEY: &str = "WECHAT_API_KEY";
pub const WECHAT_MCH_ENDPOINT: &str = "WECHAT_MCH_ENDPOINT";

pub const DEFAULT_ENDPOINT: &str = "https://api.mch.weixin.qq.com";

pub const TRANSFER_PATH: &str = "/mmpaymkttransfers/promotion/transfers";
pub const QUERY_TRANSFER_PATH: &str = "/mmpaymkttransfers/gettransferinfo";
pub const REFUND_PATH: &str = "/secapi/pay/refund";

pub const NONCE_LEN: usize = 32;
