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

use log::{debug, info};
use wxsign_core::utils::{fill_empty, required};
use wxsign_core::{decode_xml, CancelContext, Context, Result, Signer};

use crate::config::Config;
use crate::constants::*;
use crate::types::*;

/// MchService calls the merchant transfer and refund apis.
///
/// These apis authenticate the merchant with a client certificate, so the
/// [`Context`] must carry an http client configured with it.
#[derive(Debug, Clone)]
pub struct MchService {
    ctx: Context,
    signer: Signer,
    app_id: String,
    mch_id: String,
    endpoint: String,
}

impl MchService {
    /// Create a new service, `app_id`, `mch_id` and `api_key` are required.
    pub fn new(ctx: Context, config: Config) -> Result<Self> {
        let api_key = required(&config.api_key, "api_key")?;
        let service = Self {
            app_id: required(&config.app_id, "app_id")?,
            mch_id: required(&config.mch_id, "mch_id")?,
            endpoint: config
                .endpoint
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
                .trim_end_matches('/')
                .to_string(),
            signer: Signer::new(&api_key),
            ctx,
        };
        info!("wechat mch service initiated for mch {}", service.mch_id);
        Ok(service)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint, path)
    }

    /// Transfer money to a user's balance, see
    /// <https://pay.weixin.qq.com/wiki/doc/api/tools/mch_pay.php?chapter=14_2>.
    pub async fn transfer(
        &self,
        cctx: &CancelContext,
        mut req: TransferRequest,
    ) -> Result<TransferResponse> {
        fill_empty(&mut req.mch_appid, &self.app_id);
        fill_empty(&mut req.mchid, &self.mch_id);
        if req.nonce_str.is_empty() {
            req.nonce_str = self.ctx.nonce(NONCE_LEN);
        }
        req.sign.clear();
        req.sign = self.signer.sign(&req)?;

        let resp: TransferResponse = self
            .ctx
            .post_xml(cctx, &self.url(TRANSFER_PATH), &req, decode_xml)
            .await?;
        debug!("transfer {}: {resp:?}", req.partner_trade_no);
        Ok(resp)
    }

    /// Query a transfer by `partner_trade_no`, see
    /// <https://pay.weixin.qq.com/wiki/doc/api/tools/mch_pay.php?chapter=14_3>.
    pub async fn query_transfer(
        &self,
        cctx: &CancelContext,
        partner_trade_no: &str,
    ) -> Result<QueryTransferResponse> {
        let mut req = QueryTransferRequest {
            appid: self.app_id.clone(),
            mch_id: self.mch_id.clone(),
            nonce_str: self.ctx.nonce(NONCE_LEN),
            sign: String::new(),
            partner_trade_no: partner_trade_no.to_string(),
        };
        req.sign = self.signer.sign(&req)?;

        let resp: QueryTransferResponse = self
            .ctx
            .post_xml(cctx, &self.url(QUERY_TRANSFER_PATH), &req, decode_xml)
            .await?;
        debug!("query transfer {partner_trade_no}: {resp:?}");
        Ok(resp)
    }

    /// Refund a paid order, see
    /// <https://pay.weixin.qq.com/wiki/doc/api/jsapi.php?chapter=9_4>.
    pub async fn refund(&self, cctx: &CancelContext, mut req: RefundRequest) -> Result<RefundResponse> {
        fill_empty(&mut req.appid, &self.app_id);
        fill_empty(&mut req.mch_id, &self.mch_id);
        if req.nonce_str.is_empty() {
            req.nonce_str = self.ctx.nonce(NONCE_LEN);
        }
        req.sign.clear();
        req.sign = self.signer.sign(&req)?;

        let resp: RefundResponse = self
            .ctx
            .post_xml(cctx, &self.url(REFUND_PATH), &req, decode_xml)
            .await?;
        debug!("refund {}: {resp:?}", req.out_refund_no);
        Ok(resp)
    }
}
