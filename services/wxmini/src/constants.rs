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

// Env values used in wechat mini program.
pub const WECHAT_APP_ID: &str = "WECHAT_APP_ID";
pub const WECHAT_APP_SECRET: &str = "WECHAT_APP_SECRET";
pub const WECHAT_MINI_ENDPOINT: &str = "WECHAT_MINI_ENDPOINT";

pub const DEFAULT_ENDPOINT: &str = "https://api.weixin.qq.com";

pub const CODE2SESSION_PATH: &str = "/sns/jscode2session";
pub const ACCESS_TOKEN_PATH: &str = "/cgi-bin/token";
pub const SUBSCRIBE_MESSAGE_PATH: &str = "/cgi-bin/message/subscribe/send";
pub const WXACODE_UNLIMITED_PATH: &str = "/wxa/getwxacodeunlimit";
pub const CHECK_IMAGE_PATH: &str = "/wxa/img_sec_check";
pub const CHECK_MESSAGE_PATH: &str = "/wxa/msg_sec_check";
