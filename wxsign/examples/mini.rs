use std::time::Duration;

use anyhow::Result;
use wxsign::wxmini::{self, WxacodeUnlimitedRequest};
use wxsign::CancelContext;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    // Reads WECHAT_APP_ID and WECHAT_APP_SECRET.
    let mini = wxmini::default_service();

    let (cctx, handle) = CancelContext::with_timeout(Duration::from_secs(10));
    let token = mini.refresh_access_token(&cctx).await?;
    if token.errcode != 0 {
        println!("failed to get access token: {}", token.errmsg);
        return Ok(());
    }

    let check = mini.check_message(&cctx, "hello").await?;
    println!("message check: {} {}", check.errcode, check.errmsg);

    let image = mini
        .wxacode_unlimited(
            &cctx,
            &WxacodeUnlimitedRequest {
                scene: "id=1".to_string(),
                width: 430,
                ..Default::default()
            },
        )
        .await?;
    std::fs::write("wxacode.png", &image)?;

    // Nothing else to wait for.
    handle.cancel();
    Ok(())
}
