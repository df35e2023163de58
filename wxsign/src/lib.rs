#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub use wxsign_core::*;

#[cfg(feature = "default-context")]
mod context;
#[cfg(feature = "default-context")]
pub use context::{context_with_client, default_context};

#[cfg(feature = "wxpay")]
pub mod wxpay;

#[cfg(feature = "wxmini")]
pub mod wxmini;

#[cfg(feature = "wxmch")]
pub mod wxmch;
