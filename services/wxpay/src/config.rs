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

use wxsign_core::utils::{required, Redact};
use wxsign_core::{Context, Result, SignType, Signer};

use crate::constants::*;

/// Config for wechat pay.
#[derive(Clone, Default)]
pub struct Config {
    /// App id of the mini program or official account paying with `mch_id`.
    pub app_id: Option<String>,
    /// Merchant id.
    pub mch_id: Option<String>,
    /// Api key shared with the merchant platform.
    pub api_key: Option<String>,
    /// `MD5` or `HMAC-SHA256`, defaults to `MD5`.
    pub sign_type: Option<String>,
    /// Trade type filled into unified orders, defaults to `JSAPI`.
    pub trade_type: Option<String>,
    /// Api endpoint, defaults to `https://api.mch.weixin.qq.com`.
    pub endpoint: Option<String>,
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("app_id", &self.app_id)
            .field("mch_id", &self.mch_id)
            .field("api_key", &Redact::from(&self.api_key))
            .field("sign_type", &self.sign_type)
            .field("trade_type", &self.trade_type)
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
            sign_type: ctx.env_var(WECHAT_SIGN_TYPE),
            trade_type: ctx.env_var(WECHAT_TRADE_TYPE),
            endpoint: ctx.env_var(WECHAT_PAY_ENDPOINT),
        }
    }

    /// Fill the fields that are still unset from environment variables.
    pub fn with_env(mut self, ctx: &Context) -> Self {
        let env = Self::from_env(ctx);
        self.app_id = self.app_id.or(env.app_id);
        self.mch_id = self.mch_id.or(env.mch_id);
        self.api_key = self.api_key.or(env.api_key);
        self.sign_type = self.sign_type.or(env.sign_type);
        self.trade_type = self.trade_type.or(env.trade_type);
        self.endpoint = self.endpoint.or(env.endpoint);
        self
    }

    /// Build the signer out of `api_key` and `sign_type`.
    pub fn signer(&self) -> Result<Signer> {
        let api_key = required(&self.api_key, "api_key")?;
        let sign_type: SignType = self.sign_type.as_deref().unwrap_or_default().parse()?;
        Ok(Signer::new(&api_key).with_sign_type(sign_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use wxsign_core::{ErrorKind, StaticEnv};

    fn ctx() -> Context {
        Context::new().with_env(StaticEnv {
            envs: HashMap::from([
                (WECHAT_APP_ID.to_string(), "wx_env".to_string()),
                (WECHAT_MCH_ID.to_string(), "1900000109".to_string()),
                (
                    WECHAT_API_KEY.to_string(),
                    "192006250b4c09247ec02edce69f6a2d".to_string(),
                ),
                (WECHAT_SIGN_TYPE.to_string(), "HMAC-SHA256".to_string()),
            ]),
        })
    }

    #[test]
    fn test_from_env() {
        let cfg = Config::from_env(&ctx());
        assert_eq!(cfg.app_id.as_deref(), Some("wx_env"));
        assert_eq!(cfg.trade_type, None);
        assert_eq!(
            cfg.signer().unwrap().sign_type(),
            SignType::HmacSha256
        );
    }

    #[test]
    fn test_with_env_keeps_explicit_values() {
        let cfg = Config {
            app_id: Some("wx_explicit".to_string()),
            ..Default::default()
        }
        .with_env(&ctx());
        assert_eq!(cfg.app_id.as_deref(), Some("wx_explicit"));
        assert_eq!(cfg.mch_id.as_deref(), Some("1900000109"));
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let cfg = Config::from_env(&ctx());
        let out = format!("{cfg:?}");
        assert!(out.contains("192***a2d"));
        assert!(!out.contains("192006250b4c09247ec02edce69f6a2d"));
    }

    #[test]
    fn test_signer_requires_api_key() {
        let err = Config::default().signer().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);

        let err = Config {
            api_key: Some("key".to_string()),
            sign_type: Some("SHA1".to_string()),
            ..Default::default()
        }
        .signer()
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
    }
}
