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

use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use log::debug;
use pretty_assertions::assert_eq;
use wxsign_core::{CancelContext, Context, ErrorKind, HttpSend, Result, Signer, StaticNonce};
use wxsign_wxpay::{Config, Notify, PayService, UnifiedOrderRequest};

const API_KEY: &str = "192006250b4c09247ec02edce69f6a2d";
const NONCE: &str = "5K8264ILTKCH16CQ2502SI8ZNMTM67VS";

/// Answers every request with `body` after `delay` and keeps the requests.
#[derive(Debug, Clone, Default)]
struct MockPay {
    body: &'static str,
    delay: Duration,
    requests: Arc<Mutex<Vec<http::Request<Bytes>>>>,
}

#[async_trait::async_trait]
impl HttpSend for MockPay {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        self.requests.lock().unwrap().push(req);
        tokio::time::sleep(self.delay).await;
        Ok(http::Response::new(Bytes::from_static(self.body.as_bytes())))
    }
}

fn init_service(mock: MockPay) -> PayService {
    let _ = env_logger::builder().is_test(true).try_init();

    let ctx = Context::new()
        .with_http_send(mock)
        .with_nonce_generate(StaticNonce(NONCE.to_string()));
    let config = Config {
        app_id: Some("wxd930ea5d5a258f4f".to_string()),
        mch_id: Some("10000100".to_string()),
        api_key: Some(API_KEY.to_string()),
        ..Default::default()
    };
    PayService::new(ctx, config).unwrap()
}

fn sent_body(mock: &MockPay) -> String {
    let requests = mock.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    String::from_utf8(requests[0].body().to_vec()).unwrap()
}

#[tokio::test]
async fn test_unified_order() -> Result<()> {
    let mock = MockPay {
        body: r#"<xml>
<return_code><![CDATA[SUCCESS]]></return_code>
<return_msg><![CDATA[OK]]></return_msg>
<appid><![CDATA[wxd930ea5d5a258f4f]]></appid>
<mch_id><![CDATA[10000100]]></mch_id>
<nonce_str><![CDATA[IITRi8Iabbblz1Jc]]></nonce_str>
<sign><![CDATA[7921E432F65EB8ED0CE9755F0E86D72F]]></sign>
<result_code><![CDATA[SUCCESS]]></result_code>
<prepay_id><![CDATA[wx201411101639507cbf6ffd8b0779950874]]></prepay_id>
<trade_type><![CDATA[JSAPI]]></trade_type>
</xml>"#,
        ..Default::default()
    };
    let svc = init_service(mock.clone());

    let req = UnifiedOrderRequest {
        body: "test".to_string(),
        out_trade_no: "20150806125346".to_string(),
        total_fee: 1,
        spbill_create_ip: "123.12.12.123".to_string(),
        notify_url: "https://example.com/notify".to_string(),
        openid: "oUpF8uMuAJO_M2pxb1Q9zNjWeS6o".to_string(),
        ..Default::default()
    };
    let resp = svc
        .unified_order(&CancelContext::background(), req.clone())
        .await?;
    debug!("got response: {resp:?}");
    assert!(resp.is_success());
    assert_eq!(resp.prepay_id, "wx201411101639507cbf6ffd8b0779950874");

    let expected = UnifiedOrderRequest {
        appid: "wxd930ea5d5a258f4f".to_string(),
        mch_id: "10000100".to_string(),
        nonce_str: NONCE.to_string(),
        sign_type: "MD5".to_string(),
        trade_type: "JSAPI".to_string(),
        ..req
    };
    let sign = Signer::new(API_KEY).sign(&expected)?;

    {
        let requests = mock.requests.lock().unwrap();
        assert_eq!(requests[0].uri(), "https://api.mch.weixin.qq.com/pay/unifiedorder");
        assert_eq!(requests[0].headers()["content-type"], "application/xml");
    }
    let body = sent_body(&mock);
    assert!(body.starts_with("<xml>"), "{body}");
    assert!(body.contains("<total_fee>1</total_fee>"), "{body}");
    assert!(body.contains(&format!("<nonce_str>{NONCE}</nonce_str>")), "{body}");
    assert!(body.contains(&format!("<sign>{sign}</sign>")), "{body}");
    Ok(())
}

#[tokio::test]
async fn test_query_order() -> Result<()> {
    let mock = MockPay {
        body: r#"<xml>
<return_code><![CDATA[SUCCESS]]></return_code>
<result_code><![CDATA[SUCCESS]]></result_code>
<trade_state><![CDATA[SUCCESS]]></trade_state>
<total_fee>101</total_fee>
<out_trade_no><![CDATA[1415757673]]></out_trade_no>
</xml>"#,
        ..Default::default()
    };
    let svc = init_service(mock.clone());

    let resp = svc
        .query_order(&CancelContext::background(), "1415757673")
        .await?;
    assert_eq!(resp.trade_state, "SUCCESS");
    assert_eq!(resp.total_fee, 101);
    assert_eq!(resp.cash_fee, 0);

    let body = sent_body(&mock);
    assert!(body.contains("<mch_id>10000100</mch_id>"), "{body}");
    assert!(body.contains("<out_trade_no>1415757673</out_trade_no>"), "{body}");
    Ok(())
}

#[tokio::test]
async fn test_close_order() -> Result<()> {
    let mock = MockPay {
        body: "<xml><return_code>SUCCESS</return_code><result_code>FAIL</result_code><err_code>ORDERPAID</err_code></xml>",
        ..Default::default()
    };
    let svc = init_service(mock.clone());

    let resp = svc
        .close_order(&CancelContext::background(), "1415757673")
        .await?;
    assert!(!resp.is_success());
    assert_eq!(resp.err_code, "ORDERPAID");
    assert_eq!(
        mock.requests.lock().unwrap()[0].uri(),
        "https://api.mch.weixin.qq.com/pay/closeorder"
    );
    Ok(())
}

#[tokio::test]
async fn test_query_order_timeout() {
    let mock = MockPay {
        body: "<xml></xml>",
        delay: Duration::from_secs(5),
        ..Default::default()
    };
    let svc = init_service(mock);

    let (cctx, _handle) = CancelContext::with_timeout(Duration::from_millis(50));
    let err = svc.query_order(&cctx, "1415757673").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Cancelled);
    assert_eq!(err.message(), "context deadline exceeded");
}

#[tokio::test]
async fn test_malformed_response() {
    let mock = MockPay {
        body: "<xml><return_code>",
        ..Default::default()
    };
    let svc = init_service(mock);

    let err = svc
        .close_order(&CancelContext::background(), "1415757673")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Serialization);
}

#[test]
fn test_verify_notify_with_extra_fields() -> Result<()> {
    let svc = init_service(MockPay::default());

    let fields = [
        ("appid", "wxd930ea5d5a258f4f"),
        ("mch_id", "10000100"),
        ("nonce_str", "5d2b6c2a8db53831f7eda20af46e531c"),
        ("out_trade_no", "1409811653"),
        ("result_code", "SUCCESS"),
        ("return_code", "SUCCESS"),
        ("total_fee", "101"),
        ("attach", "gift card"),
        ("coupon_fee", "10"),
    ];
    let sign = Signer::new(API_KEY).sign_params(fields)?;

    let render = |fields: &[(&str, &str)]| {
        let mut xml = String::from("<xml>");
        for (k, v) in fields {
            xml.push_str(&format!("<{k}><![CDATA[{v}]]></{k}>"));
        }
        xml.push_str(&format!("<sign><![CDATA[{sign}]]></sign></xml>"));
        xml
    };

    let notify = Notify::from_xml(render(&fields).as_bytes())?;
    assert_eq!(notify.attach, "gift card");
    assert!(svc.verify_notify(&notify));

    let mut tampered = fields;
    tampered[8] = ("coupon_fee", "100");
    let notify = Notify::from_xml(render(&tampered).as_bytes())?;
    assert!(!svc.verify_notify(&notify));
    Ok(())
}

#[tokio::test]
async fn test_unified_order_rejects_other_sign_type() {
    let mock = MockPay::default();
    let svc = init_service(mock.clone());

    let req = UnifiedOrderRequest {
        sign_type: "HMAC-SHA256".to_string(),
        out_trade_no: "20150806125346".to_string(),
        total_fee: 1,
        ..Default::default()
    };
    let err = svc
        .unified_order(&CancelContext::background(), req)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RequestInvalid);
    assert!(mock.requests.lock().unwrap().is_empty());
}
