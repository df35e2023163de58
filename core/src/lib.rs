//! Core components for signed WeChat API requests.
//!
//! This crate provides the foundational types for the wxsign ecosystem:
//! the canonical parameter string, the request signer, nonce generation and
//! the cancelable dispatcher every endpoint call is built from.
//!
//! ## Overview
//!
//! - **Signer**: flattens a request payload, builds its canonical string and
//!   computes the uppercase hex `sign` with the shared api key.
//! - **Context**: a container of pluggable capabilities, the [`HttpSend`]
//!   transport, [`Env`] access and the [`NonceGenerate`] source.
//! - **Dispatch**: [`Context::send`] and friends run one request on a
//!   background task and race it against a [`CancelContext`].
//!
//! ## Example
//!
//! ```no_run
//! use std::time::Duration;
//! use serde::{Deserialize, Serialize};
//! use wxsign_core::{decode_xml, CancelContext, Context, Result, Signer};
//!
//! #[derive(Serialize)]
//! struct CloseOrder {
//!     appid: String,
//!     mch_id: String,
//!     nonce_str: String,
//!     out_trade_no: String,
//!     sign: String,
//! }
//!
//! #[derive(Deserialize)]
//! struct CloseOrderResp {
//!     return_code: String,
//! }
//!
//! # async fn example(ctx: Context) -> Result<()> {
//! let signer = Signer::new("your-api-key");
//!
//! let mut req = CloseOrder {
//!     appid: "wx123".to_string(),
//!     mch_id: "1900".to_string(),
//!     nonce_str: ctx.nonce(32),
//!     out_trade_no: "ORDER1".to_string(),
//!     sign: String::new(),
//! };
//! req.sign = signer.sign(&req)?;
//!
//! let (cctx, _handle) = CancelContext::with_timeout(Duration::from_secs(10));
//! let resp: CloseOrderResp = ctx
//!     .post_xml(&cctx, "https://api.mch.weixin.qq.com/pay/closeorder", &req, decode_xml)
//!     .await?;
//! println!("{}", resp.return_code);
//! # Ok(())
//! # }
//! ```
//!
//! ## Utilities
//!
//! - [`hash`]: MD5 and HMAC-SHA256 digests
//! - [`nonce`]: nonce generators
//! - [`params`]: canonical parameter strings and payload flattening
//! - [`time`]: time helpers
//! - [`utils`]: redaction of secrets in logs

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod hash;
pub mod nonce;
pub mod params;
pub mod time;
pub mod utils;

mod error;
pub use error::{Error, ErrorKind, Result};

mod context;
pub use context::Context;
pub use context::Env;
pub use context::HttpSend;
pub use context::NoopEnv;
pub use context::NoopHttpSend;
pub use context::OsEnv;
pub use context::StaticEnv;
pub use nonce::{NonceGenerate, RandNonce, StaticNonce};

mod sign;
pub use sign::{SignType, Signer, SIGN_FIELD};

mod cancel;
pub use cancel::{CancelContext, CancelHandle};

mod dispatch;
pub use dispatch::{decode_json, decode_xml, Payload, CONTENT_TYPE_JSON, CONTENT_TYPE_XML};
