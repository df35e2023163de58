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

use log::{debug, error, info};
use wxsign_core::time::{format_unix_timestamp, now};
use wxsign_core::utils::{fill_empty, required};
use wxsign_core::{decode_xml, CancelContext, Context, Error, Result, Signer};

use crate::config::Config;
use crate::constants::*;
use crate::types::*;

/// PayService calls the wechat pay order apis.
///
/// Every request is completed with the configured app id, merchant id and
/// a fresh nonce, signed, and posted as XML.
#[derive(Debug, Clone)]
pub struct PayService {
    ctx: Context,
    signer: Signer,
    app_id: String,
    mch_id: String,
    trade_type: String,
    endpoint: String,
}

impl PayService {
    /// Create a new service, `app_id`, `mch_id` and `api_key` are required.
    pub fn new(ctx: Context, config: Config) -> Result<Self> {
        let signer = config.signer()?;
        let service = Self {
            app_id: required(&config.app_id, "app_id")?,
            mch_id: required(&config.mch_id, "mch_id")?,
            trade_type: config
                .trade_type
                .unwrap_or_else(|| DEFAULT_TRADE_TYPE.to_string()),
            endpoint: config
                .endpoint
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
                .trim_end_matches('/')
                .to_string(),
            ctx,
            signer,
        };
        info!("wechat pay service initiated for mch {}", service.mch_id);
        Ok(service)
    }

    /// The signer used by this service.
    pub fn signer(&self) -> &Signer {
        &self.signer
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint, path)
    }

    fn nonce_or(&self, nonce: &mut String) {
        if nonce.is_empty() {
            *nonce = self.ctx.nonce(NONCE_LEN);
        }
    }

    /// Place an order, see <https://pay.weixin.qq.com/wiki/doc/api/jsapi.php?chapter=9_1>.
    ///
    /// A non-empty `sign_type` must match the configured one.
    pub async fn unified_order(
        &self,
        cctx: &CancelContext,
        mut req: UnifiedOrderRequest,
    ) -> Result<UnifiedOrderResponse> {
        fill_empty(&mut req.appid, &self.app_id);
        fill_empty(&mut req.mch_id, &self.mch_id);
        let sign_type = self.signer.sign_type().as_str();
        if !req.sign_type.is_empty() && req.sign_type != sign_type {
            return Err(Error::request_invalid(format!(
                "sign_type {} doesn't match the configured {sign_type}",
                req.sign_type
            )));
        }
        fill_empty(&mut req.sign_type, sign_type);
        fill_empty(&mut req.trade_type, &self.trade_type);
        self.nonce_or(&mut req.nonce_str);
        req.sign.clear();
        req.sign = self.signer.sign(&req)?;

        let resp: UnifiedOrderResponse = self
            .ctx
            .post_xml(cctx, &self.url(UNIFIED_ORDER_PATH), &req, decode_xml)
            .await?;
        debug!("unified order {}: {resp:?}", req.out_trade_no);
        Ok(resp)
    }

    /// Query an order by `out_trade_no`, see <https://pay.weixin.qq.com/wiki/doc/api/jsapi.php?chapter=9_2>.
    pub async fn query_order(
        &self,
        cctx: &CancelContext,
        out_trade_no: &str,
    ) -> Result<QueryOrderResponse> {
        let mut req = QueryOrderRequest {
            appid: self.app_id.clone(),
            mch_id: self.mch_id.clone(),
            out_trade_no: out_trade_no.to_string(),
            nonce_str: self.ctx.nonce(NONCE_LEN),
            sign: String::new(),
            sign_type: self.signer.sign_type().to_string(),
        };
        req.sign = self.signer.sign(&req)?;

        let resp: QueryOrderResponse = self
            .ctx
            .post_xml(cctx, &self.url(QUERY_ORDER_PATH), &req, decode_xml)
            .await?;
        debug!("query order {out_trade_no}: {resp:?}");
        Ok(resp)
    }

    /// Close an unpaid order, see <https://pay.weixin.qq.com/wiki/doc/api/jsapi.php?chapter=9_3>.
    ///
    /// Close the order before placing a new one for the same purchase, or
    /// once the payment window is over, so it can't be paid twice.
    pub async fn close_order(
        &self,
        cctx: &CancelContext,
        out_trade_no: &str,
    ) -> Result<CloseOrderResponse> {
        let mut req = CloseOrderRequest {
            appid: self.app_id.clone(),
            mch_id: self.mch_id.clone(),
            nonce_str: self.ctx.nonce(NONCE_LEN),
            out_trade_no: out_trade_no.to_string(),
            sign: String::new(),
            sign_type: self.signer.sign_type().to_string(),
        };
        req.sign = self.signer.sign(&req)?;

        let resp: CloseOrderResponse = self
            .ctx
            .post_xml(cctx, &self.url(CLOSE_ORDER_PATH), &req, decode_xml)
            .await?;
        debug!("close order {out_trade_no}: {resp:?}");
        Ok(resp)
    }

    /// Build the signed parameters for `wx.requestPayment`.
    ///
    /// A fresh nonce is generated when `nonce` is empty.
    pub fn prepay(&self, prepay_id: &str, nonce: &str) -> Result<Prepay> {
        let mut prepay = Prepay {
            app_id: self.app_id.clone(),
            time_stamp: format_unix_timestamp(now()),
            nonce_str: nonce.to_string(),
            package: format!("prepay_id={prepay_id}"),
            sign_type: self.signer.sign_type().to_string(),
            pay_sign: String::new(),
        };
        self.nonce_or(&mut prepay.nonce_str);
        prepay.pay_sign = self.signer.sign(&prepay)?;
        Ok(prepay)
    }

    /// Check the signature of a payment notification.
    ///
    /// A notification from [`Notify::from_xml`] is checked over every
    /// inbound element, one built by hand over its declared fields.
    /// Failures to compute the signature are logged and reject the
    /// notification.
    pub fn verify_notify(&self, notify: &Notify) -> bool {
        let verified = if notify.params().is_empty() {
            self.signer.verify(notify)
        } else {
            self.signer.verify(notify.params())
        };
        match verified {
            Ok(ok) => {
                if !ok {
                    debug!("notify for {} has a mismatched sign", notify.out_trade_no);
                }
                ok
            }
            Err(err) => {
                error!("failed to verify notify for {}: {err}", notify.out_trade_no);
                false
            }
        }
    }
}
