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

use std::io::Read;
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use log::{debug, info};
use multipart::client::lazy::Multipart;
use wxsign_core::utils::required;
use wxsign_core::{decode_json, CancelContext, Context, Error, Result};

use crate::config::Config;
use crate::constants::*;
use crate::types::*;

/// MiniService calls the wechat mini program server apis.
///
/// Apis other than [`MiniService::code2session`] and
/// [`MiniService::access_token`] need an access token, set it with
/// [`MiniService::set_access_token`]. Clones share the token.
#[derive(Clone)]
pub struct MiniService {
    ctx: Context,
    config: Config,
    endpoint: String,
    token: Arc<Mutex<String>>,
}

impl std::fmt::Debug for MiniService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MiniService")
            .field("ctx", &self.ctx)
            .field("config", &self.config)
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl MiniService {
    /// Create a new service.
    pub fn new(ctx: Context, config: Config) -> Self {
        let endpoint = config
            .endpoint
            .clone()
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
            .trim_end_matches('/')
            .to_string();
        info!("wechat mini service initiated for app {:?}", config.app_id);
        Self {
            ctx,
            config,
            endpoint,
            token: Arc::new(Mutex::new(String::new())),
        }
    }

    /// Set the access token used by the apis that need one.
    pub fn set_access_token(&self, token: &str) {
        *self.token.lock().expect("lock poisoned") = token.to_string();
    }

    fn access_token_or_err(&self) -> Result<String> {
        let token = self.token.lock().expect("lock poisoned").clone();
        if token.is_empty() {
            return Err(Error::credential_invalid("access token missing"));
        }
        Ok(token)
    }

    fn credentials(&self) -> Result<(String, String)> {
        Ok((
            required(&self.config.app_id, "app_id")?,
            required(&self.config.app_secret, "app_secret")?,
        ))
    }

    fn url(&self, path: &str, pairs: &[(&str, &str)]) -> String {
        let query = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs)
            .finish();
        format!("{}{path}?{query}", self.endpoint)
    }

    fn url_with_token(&self, path: &str) -> Result<String> {
        let token = self.access_token_or_err()?;
        Ok(self.url(path, &[("access_token", token.as_str())]))
    }

    /// Exchange the `js_code` from `wx.login` for the user's session, see
    /// <https://developers.weixin.qq.com/miniprogram/dev/api-backend/open-api/login/auth.code2Session.html>.
    pub async fn code2session(&self, cctx: &CancelContext, js_code: &str) -> Result<SessionResponse> {
        let (app_id, secret) = self.credentials()?;
        let url = self.url(
            CODE2SESSION_PATH,
            &[
                ("appid", app_id.as_str()),
                ("secret", secret.as_str()),
                ("js_code", js_code),
                ("grant_type", "authorization_code"),
            ],
        );
        self.ctx.get(cctx, &url, decode_json).await
    }

    /// Fetch a new access token, see
    /// <https://developers.weixin.qq.com/miniprogram/dev/api-backend/open-api/access-token/auth.getAccessToken.html>.
    ///
    /// The token is returned only, call [`MiniService::set_access_token`]
    /// or use [`MiniService::refresh_access_token`] to keep it.
    pub async fn access_token(&self, cctx: &CancelContext) -> Result<AccessTokenResponse> {
        let (app_id, secret) = self.credentials()?;
        let url = self.url(
            ACCESS_TOKEN_PATH,
            &[
                ("grant_type", "client_credential"),
                ("appid", app_id.as_str()),
                ("secret", secret.as_str()),
            ],
        );
        self.ctx.get(cctx, &url, decode_json).await
    }

    /// Fetch a new access token and keep it when the call succeeded.
    pub async fn refresh_access_token(&self, cctx: &CancelContext) -> Result<AccessTokenResponse> {
        let resp = self.access_token(cctx).await?;
        if resp.errcode == 0 && !resp.access_token.is_empty() {
            debug!("access token refreshed, expires in {}s", resp.expires_in);
            self.set_access_token(&resp.access_token);
        }
        Ok(resp)
    }

    /// Send a subscribe message, see
    /// <https://developers.weixin.qq.com/miniprogram/dev/api-backend/open-api/subscribe-message/subscribeMessage.send.html>.
    pub async fn send_subscribe_message(
        &self,
        cctx: &CancelContext,
        req: &SubscribeMessageRequest,
    ) -> Result<ErrorResponse> {
        let url = self.url_with_token(SUBSCRIBE_MESSAGE_PATH)?;
        self.ctx.post_json(cctx, &url, req, decode_json).await
    }

    /// Generate an unlimited mini program code image, see
    /// <https://developers.weixin.qq.com/miniprogram/dev/api-backend/open-api/qr-code/wxacode.getUnlimited.html>.
    ///
    /// The api answers with the same status for both outcomes: a body that
    /// parses as a JSON object is taken as the error, anything else is the
    /// image.
    pub async fn wxacode_unlimited(
        &self,
        cctx: &CancelContext,
        req: &WxacodeUnlimitedRequest,
    ) -> Result<Bytes> {
        let url = self.url_with_token(WXACODE_UNLIMITED_PATH)?;
        self.ctx
            .post_json(cctx, &url, req, |resp: Result<http::Response<Bytes>>| {
                let body = resp?.into_body();
                match serde_json::from_slice::<ErrorResponse>(&body) {
                    Ok(err) if err.errmsg.is_empty() => Err(Error::api(format!(
                        "wxacode failed with errcode {}",
                        err.errcode
                    ))),
                    Ok(err) => Err(Error::api(err.errmsg)),
                    Err(_) => Ok(body),
                }
            })
            .await
    }

    /// Check whether an image contains illegal content, see
    /// <https://developers.weixin.qq.com/miniprogram/dev/api-backend/open-api/sec-check/security.imgSecCheck.html>.
    pub async fn check_image(&self, cctx: &CancelContext, media: &[u8]) -> Result<ErrorResponse> {
        let url = self.url_with_token(CHECK_IMAGE_PATH)?;
        let (content_type, body) = media_form(media)?;
        self.ctx
            .post(cctx, &url, &content_type, body, decode_json)
            .await
    }

    /// Check whether a text contains illegal content, see
    /// <https://developers.weixin.qq.com/miniprogram/dev/api-backend/open-api/sec-check/security.msgSecCheck.html>.
    pub async fn check_message(&self, cctx: &CancelContext, msg: &str) -> Result<ErrorResponse> {
        let url = self.url_with_token(CHECK_MESSAGE_PATH)?;
        let req = serde_json::json!({ "content": msg });
        self.ctx.post_json(cctx, &url, &req, decode_json).await
    }
}

/// Build a `multipart/form-data` body carrying `media` as its only file
/// part, returning the content type and the body.
fn media_form(media: &[u8]) -> Result<(String, Bytes)> {
    let mut form = Multipart::new();
    form.add_stream(
        "media",
        media,
        Some("media"),
        Some(mime::APPLICATION_OCTET_STREAM),
    );

    let mut fields = form.prepare().map_err(|err| {
        Error::request_invalid(format!("failed to prepare multipart field {:?}", err.field_name))
            .with_source(err.error)
    })?;
    let mut body = Vec::with_capacity(media.len() + 256);
    fields.read_to_end(&mut body)?;

    let content_type = format!("multipart/form-data; boundary={}", fields.boundary());
    Ok((content_type, Bytes::from(body)))
}
