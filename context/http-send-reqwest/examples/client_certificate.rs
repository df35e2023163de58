use std::time::Duration;

use anyhow::Result;
use wxsign_core::{CancelContext, Context, OsEnv};
use wxsign_http_send_reqwest::ReqwestHttpSend;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = env_logger::try_init();

    // Merchant APIs authenticate the caller with the apiclient certificate.
    // Point these at the files downloaded from the merchant platform.
    let cert = std::fs::read("apiclient_cert.pem")?;
    let key = std::fs::read("apiclient_key.pem")?;
    let identity = reqwest::Identity::from_pem(&[cert, key].concat())?;

    let client = reqwest::Client::builder()
        .identity(identity)
        .timeout(Duration::from_secs(30))
        .build()?;

    let ctx = Context::new()
        .with_http_send(ReqwestHttpSend::new(client))
        .with_env(OsEnv);

    let (cctx, _handle) = CancelContext::with_timeout(Duration::from_secs(10));
    let status = ctx
        .get(&cctx, "https://api.mch.weixin.qq.com/", |resp| {
            resp.map(|resp| resp.status())
        })
        .await?;
    println!("merchant endpoint answered with {status}");

    Ok(())
}
