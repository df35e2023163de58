use std::time::Duration;

use anyhow::Result;
use wxsign::wxpay::{self, UnifiedOrderRequest};
use wxsign::CancelContext;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    // Reads WECHAT_APP_ID, WECHAT_MCH_ID, WECHAT_API_KEY, WECHAT_SIGN_TYPE
    // and WECHAT_TRADE_TYPE.
    let pay = wxpay::default_service()?;

    let (cctx, _handle) = CancelContext::with_timeout(Duration::from_secs(10));
    let req = UnifiedOrderRequest {
        body: "coffee".to_string(),
        out_trade_no: "20150806125346".to_string(),
        total_fee: 1,
        spbill_create_ip: "127.0.0.1".to_string(),
        notify_url: "https://example.com/notify".to_string(),
        openid: "oUpF8uMuAJO_M2pxb1Q9zNjWeS6o".to_string(),
        ..Default::default()
    };
    let resp = pay.unified_order(&cctx, req).await?;
    if !resp.is_success() {
        println!("unified order failed: {} {}", resp.return_msg, resp.err_code_des);
        return Ok(());
    }

    let prepay = pay.prepay(&resp.prepay_id, "")?;
    println!("prepay: {prepay:?}");

    let order = pay.query_order(&cctx, "20150806125346").await?;
    println!("trade state: {}", order.trade_state);

    Ok(())
}
