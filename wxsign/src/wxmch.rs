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

//! Wechat merchant payments with convenience APIs.

pub use wxsign_wxmch::*;

#[cfg(feature = "default-context")]
use crate::{context_with_client, Result};

/// Create a [`MchService`] around `client`, configured from
/// `WECHAT_APP_ID`, `WECHAT_MCH_ID` and `WECHAT_API_KEY`.
///
/// `client` must present the merchant client certificate.
#[cfg(feature = "default-context")]
pub fn service_with_client(client: reqwest::Client) -> Result<MchService> {
    let ctx = context_with_client(client);
    let config = Config::from_env(&ctx);
    MchService::new(ctx, config)
}
