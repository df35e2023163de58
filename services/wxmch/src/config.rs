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

use std::fmt::{Debug, Formatter};

use wxsign_core::utils::Redact;
use wxsign_core::Context;

use crate::constants::*;

/// Config for wechat merchant payments.
///
/// The apis need the merchant's client certificate, which is configured on
/// the http client of the [`Context`] and not here.
#[derive(Clone, Default)]
pub struct Config {
    /// App id the payments are made for.
    pub app_id: Option<String>,
    /// Merchant id.
    pub mch_id: Option<String>,
    /// Api key shared with the merchant platform.
    pub api_key: Option<String>,
    /// Api endpoint, defaults to `https://api.mch.weixin.qq.com`.
    pub endpoint: Option<String>,
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("app_id", &self.app_id)
            .field("mch_id", &self.mch_id)
            .field("api_key", &Redact::from(&self.api_key))
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl Config {
    /// Load config from environment variables.
    pub fn from_env(ctx: &Context) -> Self {
        Self {
            app_id: ctx.env_var(WECHAT_APP_ID),
            mch_id: ctx.env_var(WECHAT_MCH_ID),
            api_key: ctx.env_var(WECHAT_API_KEY),
            endpoint: ctx.env_var(WECHAT_MCH_ENDPOINT),
        }
    }

    /// Fill the fields that are still unset from environment variables.
    pub fn with_env(mut self, ctx: &Context) -> Self {
        let env = Self::from_env(ctx);
        self.app_id = self.app_id.or(env.app_id);
        self.mch_id = self.mch_id.or(env.mch_id);
        self.api_key = self.api_key.or(env.api_key);
        self.endpoint = self.endpoint.or(env.endpoint);
        self
    }
}
