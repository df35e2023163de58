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

//! Wechat merchant payments: transfers to user balance and refunds.
//!
//! Both need the merchant client certificate. Build the [`Context`] with an
//! http client that presents it, for example:
//!
//! ```no_run
//! use wxsign_core::{Context, OsEnv};
//! use wxsign_http_send_reqwest::ReqwestHttpSend;
//! use wxsign_wxmch::{Config, MchService};
//!
//! # fn build(pem: &[u8]) -> anyhow::Result<MchService> {
//! let client = reqwest::Client::builder()
//!     .identity(reqwest::Identity::from_pem(pem)?)
//!     .build()?;
//! let ctx = Context::new()
//!     .with_http_send(ReqwestHttpSend::new(client))
//!     .with_env(OsEnv);
//! let config = Config::from_env(&ctx);
//! Ok(MchService::new(ctx, config)?)
//! # }
//! ```
//!
//! [`Context`]: wxsign_core::Context

mod constants;

mod config;
pub use config::Config;

mod types;
pub use types::*;

mod service;
pub use service::MchService;
