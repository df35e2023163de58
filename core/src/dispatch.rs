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

//! Cancelable request dispatching.
//!
//! Every call runs the transport on its own tokio task while the caller
//! waits for whichever comes first: the task's completion or the
//! [`CancelContext`] firing. The [`JoinHandle`](tokio::task::JoinHandle)
//! is the single-shot completion slot, so a task that outlives its caller
//! finishes into a dropped handle instead of blocking.

use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::Method;
use log::{debug, error, info};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::{CancelContext, Context, Error, Result};

/// Content type of XML request bodies.
pub const CONTENT_TYPE_XML: &str = "application/xml";
/// Content type of JSON request bodies.
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Root element of XML request bodies.
const XML_ROOT: &str = "xml";

/// Body of a dispatched request.
#[derive(Debug)]
pub enum Payload<'a, T: ?Sized + 'a = ()> {
    /// No body at all.
    Empty,
    /// Bytes sent unmodified.
    Raw(Bytes),
    /// A value marshaled according to the content type, XML or JSON.
    Value(&'a T),
}

impl Payload<'static, ()> {
    /// A payload without body.
    pub fn empty() -> Self {
        Payload::Empty
    }

    /// A payload sent as-is.
    pub fn raw(bs: impl Into<Bytes>) -> Self {
        Payload::Raw(bs.into())
    }
}

impl<T: Serialize + ?Sized> Payload<'_, T> {
    fn into_body(self, content_type: &str) -> Result<Bytes> {
        let v = match self {
            Payload::Empty => return Ok(Bytes::new()),
            Payload::Raw(bs) => return Ok(bs),
            Payload::Value(v) => v,
        };

        match content_type {
            CONTENT_TYPE_XML => quick_xml::se::to_string_with_root(XML_ROOT, v)
                .map(Bytes::from)
                .map_err(|e| Error::serialization("failed to marshal xml body").with_source(e)),
            CONTENT_TYPE_JSON => serde_json::to_vec(v)
                .map(Bytes::from)
                .map_err(|e| Error::serialization("failed to marshal json body").with_source(e)),
            ct => Err(Error::serialization(format!(
                "can't marshal body for content type {ct:?}, send raw bytes instead"
            ))),
        }
    }
}

impl Context {
    /// Send a GET request.
    pub async fn get<T, F>(&self, ctx: &CancelContext, url: &str, handler: F) -> Result<T>
    where
        F: FnOnce(Result<http::Response<Bytes>>) -> Result<T>,
    {
        self.dispatch(ctx, Method::GET, url, "", Payload::empty(), handler)
            .await
    }

    /// Send a POST request with a raw body.
    pub async fn post<T, F>(
        &self,
        ctx: &CancelContext,
        url: &str,
        content_type: &str,
        body: impl Into<Bytes>,
        handler: F,
    ) -> Result<T>
    where
        F: FnOnce(Result<http::Response<Bytes>>) -> Result<T>,
    {
        self.dispatch(ctx, Method::POST, url, content_type, Payload::raw(body), handler)
            .await
    }

    /// Send a POST request with `body` marshaled as JSON.
    pub async fn post_json<B, T, F>(
        &self,
        ctx: &CancelContext,
        url: &str,
        body: &B,
        handler: F,
    ) -> Result<T>
    where
        B: Serialize + ?Sized,
        F: FnOnce(Result<http::Response<Bytes>>) -> Result<T>,
    {
        self.dispatch(
            ctx,
            Method::POST,
            url,
            CONTENT_TYPE_JSON,
            Payload::Value(body),
            handler,
        )
        .await
    }

    /// Send a POST request with `body` marshaled as XML under `<xml>`.
    pub async fn post_xml<B, T, F>(
        &self,
        ctx: &CancelContext,
        url: &str,
        body: &B,
        handler: F,
    ) -> Result<T>
    where
        B: Serialize + ?Sized,
        F: FnOnce(Result<http::Response<Bytes>>) -> Result<T>,
    {
        self.dispatch(
            ctx,
            Method::POST,
            url,
            CONTENT_TYPE_XML,
            Payload::Value(body),
            handler,
        )
        .await
    }

    /// Build a request out of `payload` and send it with [`Context::send`].
    ///
    /// `content_type` decides how a [`Payload::Value`] is marshaled and is
    /// set as the `Content-Type` header when non-empty.
    pub async fn dispatch<B, T, F>(
        &self,
        ctx: &CancelContext,
        method: Method,
        url: &str,
        content_type: &str,
        payload: Payload<'_, B>,
        handler: F,
    ) -> Result<T>
    where
        B: Serialize + ?Sized,
        F: FnOnce(Result<http::Response<Bytes>>) -> Result<T>,
    {
        let body = payload.into_body(content_type)?;

        let mut req = http::Request::builder().method(method).uri(url);
        if !content_type.is_empty() {
            req = req.header(CONTENT_TYPE, content_type);
        }
        let req = req.body(body)?;

        self.send(ctx, req, handler).await
    }

    /// Send `req` and hand the outcome to `handler`.
    ///
    /// - When the transport completes first, `handler` is called once with
    ///   the response or the transport error, and its result is returned.
    /// - When `ctx` fires first, the cancellation error is returned right
    ///   away and `handler` is never called. The in-flight task is aborted.
    ///
    /// Cancellation is only observed here: once `handler` runs it runs to
    /// completion, even if the deadline passes meanwhile.
    pub async fn send<T, F>(
        &self,
        ctx: &CancelContext,
        req: http::Request<Bytes>,
        handler: F,
    ) -> Result<T>
    where
        F: FnOnce(Result<http::Response<Bytes>>) -> Result<T>,
    {
        // Query strings may carry secrets, keep them out of logs.
        let target = format!(
            "{} {}{}",
            req.method(),
            req.uri().host().unwrap_or_default(),
            req.uri().path()
        );

        if let Some(err) = ctx.err() {
            debug!("skip request {target}: {err}");
            return Err(err);
        }

        info!("send request {target}, body size {}", req.body().len());

        let http = self.http.clone();
        let mut task = tokio::spawn(async move { http.http_send(req).await });

        tokio::select! {
            biased;

            err = ctx.done() => {
                task.abort();
                debug!("request {target} stopped: {err}");
                Err(err)
            }
            joined = &mut task => match joined {
                Ok(resp) => {
                    if let Ok(resp) = &resp {
                        debug!("request {target} got response: {}", resp.status());
                    }
                    handler(resp)
                }
                Err(err) => {
                    error!("request task for {target} failed: {err}");
                    Err(Error::unexpected(format!("request task for {target} failed"))
                        .with_source(err))
                }
            },
        }
    }
}

/// Decode an XML response body, usable as a dispatch handler.
pub fn decode_xml<T: DeserializeOwned>(resp: Result<http::Response<Bytes>>) -> Result<T> {
    let resp = resp?;
    quick_xml::de::from_reader(resp.body().as_ref())
        .map_err(|e| Error::serialization("failed to decode xml response").with_source(e))
}

/// Decode a JSON response body, usable as a dispatch handler.
pub fn decode_json<T: DeserializeOwned>(resp: Result<http::Response<Bytes>>) -> Result<T> {
    let resp = resp?;
    serde_json::from_slice(resp.body())
        .map_err(|e| Error::serialization("failed to decode json response").with_source(e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HttpSend;
    use pretty_assertions::assert_eq;
    use serde::Deserialize;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Records the last request and answers with a fixed body after a delay.
    #[derive(Debug, Default)]
    struct MockHttpSend {
        delay: Duration,
        body: &'static str,
        finished: Arc<AtomicBool>,
        last: Arc<Mutex<Option<http::Request<Bytes>>>>,
    }

    #[async_trait::async_trait]
    impl HttpSend for MockHttpSend {
        async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
            *self.last.lock().unwrap() = Some(req);
            tokio::time::sleep(self.delay).await;
            self.finished.store(true, Ordering::SeqCst);
            Ok(http::Response::new(Bytes::from_static(self.body.as_bytes())))
        }
    }

    #[derive(Debug)]
    struct RefusedHttpSend;

    #[async_trait::async_trait]
    impl HttpSend for RefusedHttpSend {
        async fn http_send(&self, _: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
            Err(Error::transport("connection refused"))
        }
    }

    #[derive(Debug)]
    struct PanicHttpSend;

    #[async_trait::async_trait]
    impl HttpSend for PanicHttpSend {
        async fn http_send(&self, _: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
            panic!("transport exploded")
        }
    }

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Order {
        appid: String,
        out_trade_no: String,
    }

    fn order() -> Order {
        Order {
            appid: "wx123".to_string(),
            out_trade_no: "ORDER1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_post_xml_marshals_body() -> Result<()> {
        let _ = env_logger::builder().is_test(true).try_init();

        let mock = MockHttpSend {
            body: "<xml><appid>wx123</appid><out_trade_no>ORDER1</out_trade_no></xml>",
            ..Default::default()
        };
        let last = mock.last.clone();
        let ctx = Context::new().with_http_send(mock);

        let resp: Order = ctx
            .post_xml(
                &CancelContext::background(),
                "https://api.mch.weixin.qq.com/pay/orderquery",
                &order(),
                decode_xml,
            )
            .await?;
        assert_eq!(resp, order());

        let req = last.lock().unwrap().take().expect("request must be sent");
        assert_eq!(req.method(), Method::POST);
        assert_eq!(req.headers()[CONTENT_TYPE], CONTENT_TYPE_XML);
        assert_eq!(
            std::str::from_utf8(req.body()).unwrap(),
            "<xml><appid>wx123</appid><out_trade_no>ORDER1</out_trade_no></xml>"
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_post_json_and_get() -> Result<()> {
        let mock = MockHttpSend {
            body: r#"{"appid":"wx123","out_trade_no":"ORDER1"}"#,
            ..Default::default()
        };
        let last = mock.last.clone();
        let ctx = Context::new().with_http_send(mock);
        let cctx = CancelContext::background();

        let resp: Order = ctx
            .post_json(&cctx, "https://example.com/json", &order(), decode_json)
            .await?;
        assert_eq!(resp, order());
        {
            let req = last.lock().unwrap().take().unwrap();
            assert_eq!(req.headers()[CONTENT_TYPE], CONTENT_TYPE_JSON);
            let sent: Order = serde_json::from_slice(req.body()).unwrap();
            assert_eq!(sent, order());
        }

        let resp: Order = ctx.get(&cctx, "https://example.com/get", decode_json).await?;
        assert_eq!(resp, order());
        let req = last.lock().unwrap().take().unwrap();
        assert_eq!(req.method(), Method::GET);
        assert!(req.headers().get(CONTENT_TYPE).is_none());
        assert!(req.body().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_post_raw_body_is_unmodified() -> Result<()> {
        let mock = MockHttpSend::default();
        let last = mock.last.clone();
        let ctx = Context::new().with_http_send(mock);

        ctx.post(
            &CancelContext::background(),
            "https://example.com/upload",
            "multipart/form-data; boundary=abc",
            Bytes::from_static(b"\x00\x01raw"),
            |resp| resp.map(|_| ()),
        )
        .await?;

        let req = last.lock().unwrap().take().unwrap();
        assert_eq!(
            req.headers()[CONTENT_TYPE],
            "multipart/form-data; boundary=abc"
        );
        assert_eq!(req.body().as_ref(), b"\x00\x01raw");
        Ok(())
    }

    #[tokio::test]
    async fn test_value_needs_known_content_type() {
        let ctx = Context::new().with_http_send(MockHttpSend::default());
        let called = AtomicBool::new(false);
        let err = ctx
            .dispatch(
                &CancelContext::background(),
                Method::POST,
                "https://example.com",
                "text/plain",
                Payload::Value(&order()),
                |_| {
                    called.store(true, Ordering::SeqCst);
                    Ok(())
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Serialization);
        assert!(!called.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_deadline_wins_over_slow_transport() {
        let mock = MockHttpSend {
            delay: Duration::from_secs(5),
            ..Default::default()
        };
        let finished = mock.finished.clone();
        let ctx = Context::new().with_http_send(mock);
        let (cctx, _handle) = CancelContext::with_timeout(Duration::from_millis(50));

        let called = AtomicBool::new(false);
        let started = tokio::time::Instant::now();
        let err = ctx
            .get(&cctx, "https://example.com/slow", |_| {
                called.store(true, Ordering::SeqCst);
                Ok(())
            })
            .await
            .unwrap_err();

        assert!(err.is_cancelled());
        assert_eq!(err.message(), "context deadline exceeded");
        assert!(!called.load(Ordering::SeqCst));
        assert!(started.elapsed() < Duration::from_secs(1));
        assert!(!finished.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_explicit_cancel() {
        let mock = MockHttpSend {
            delay: Duration::from_secs(5),
            ..Default::default()
        };
        let ctx = Context::new().with_http_send(mock);
        let (cctx, handle) = CancelContext::with_cancel();

        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            handle.cancel();
        });

        let calls = AtomicUsize::new(0);
        let err = ctx
            .get(&cctx, "https://example.com/slow", |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .await
            .unwrap_err();
        canceller.await.unwrap();

        assert!(err.is_cancelled());
        assert_eq!(err.message(), "context canceled");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_already_cancelled_skips_transport() {
        let mock = MockHttpSend::default();
        let last = mock.last.clone();
        let ctx = Context::new().with_http_send(mock);
        let (cctx, handle) = CancelContext::with_cancel();
        handle.cancel();

        let err = ctx
            .get(&cctx, "https://example.com", |_| Ok(()))
            .await
            .unwrap_err();
        assert!(err.is_cancelled());
        assert!(last.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_transport_error_goes_to_handler() {
        let ctx = Context::new().with_http_send(RefusedHttpSend);
        let seen = Mutex::new(None);

        let result = ctx
            .get(&CancelContext::background(), "https://example.com", |resp| {
                let err = resp.expect_err("transport must fail");
                *seen.lock().unwrap() = Some(err.kind());
                Ok("handled")
            })
            .await
            .unwrap();

        assert_eq!(result, "handled");
        assert_eq!(*seen.lock().unwrap(), Some(crate::ErrorKind::Transport));
    }

    #[tokio::test]
    async fn test_panicking_transport_does_not_crash() {
        let _ = env_logger::builder().is_test(true).try_init();

        let ctx = Context::new().with_http_send(PanicHttpSend);
        let called = AtomicBool::new(false);
        let err = ctx
            .get(&CancelContext::background(), "https://example.com", |_| {
                called.store(true, Ordering::SeqCst);
                Ok(())
            })
            .await
            .unwrap_err();

        assert_eq!(err.kind(), crate::ErrorKind::Unexpected);
        assert!(!called.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_handler_runs_after_deadline_passed_inside() {
        let ctx = Context::new().with_http_send(MockHttpSend::default());
        let (cctx, _handle) = CancelContext::with_timeout(Duration::from_millis(100));

        let out = ctx
            .get(&cctx, "https://example.com", |resp| {
                // Blocking past the deadline inside the handler is not observed.
                std::thread::sleep(Duration::from_millis(150));
                resp.map(|_| 42)
            })
            .await
            .unwrap();
        assert_eq!(out, 42);
    }
}
