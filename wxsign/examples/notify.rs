use anyhow::Result;
use wxsign::wxpay::{self, Notify, NotifyReply};

fn main() -> Result<()> {
    env_logger::init();

    let pay = wxpay::default_service()?;

    // The body wechat posts to `notify_url`.
    let body = std::fs::read("notify.xml")?;
    let notify = Notify::from_xml(&body)?;

    let reply = if pay.verify_notify(&notify) {
        println!("order {} paid: {}", notify.out_trade_no, notify.total_fee);
        NotifyReply::success()
    } else {
        NotifyReply::fail("invalid sign")
    };
    println!("{}", reply.to_xml()?);

    Ok(())
}
