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

//! Nonce generation for the `nonce_str` anti-replay field.
//!
//! Nonces only need to be unique-ish and uniformly distributed, they are
//! not secrets. The generator is a plain seeded [`StdRng`] behind a mutex.

use std::fmt::Debug;
use std::sync::Mutex;

use once_cell::sync::Lazy;
use rand::rngs::StdRng;
use rand::RngCore;
use rand::SeedableRng;

use crate::time::now;

const LETTERS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
/// 6 bits to represent a letter index.
const INDEX_BITS: u32 = 6;
const INDEX_MASK: u64 = (1 << INDEX_BITS) - 1;
/// Letter indices we take out of one 63 bit draw.
const INDEX_MAX: u32 = 63 / INDEX_BITS;

static GLOBAL: Lazy<RandNonce> = Lazy::new(RandNonce::new);

/// Generate a nonce of `len` alphanumeric characters from the process-wide generator.
pub fn generate(len: usize) -> String {
    GLOBAL.generate(len)
}

/// NonceGenerate is used to produce the per-request `nonce_str`.
///
/// Services take it from [`Context`](crate::Context) so tests can pin nonces.
pub trait NonceGenerate: Debug + Send + Sync + 'static {
    /// Generate a string of exactly `len` characters out of `[0-9a-zA-Z]`.
    fn generate(&self, len: usize) -> String;
}

/// RandNonce draws nonces from a [`StdRng`] seeded once at construction.
#[derive(Debug)]
pub struct RandNonce {
    rng: Mutex<StdRng>,
}

impl Default for RandNonce {
    fn default() -> Self {
        Self::new()
    }
}

impl RandNonce {
    /// Create a generator seeded from the current time.
    pub fn new() -> Self {
        let seed = now().timestamp_nanos_opt().unwrap_or_default() as u64;
        Self::with_seed(seed)
    }

    /// Create a generator with a fixed seed.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl NonceGenerate for RandNonce {
    fn generate(&self, len: usize) -> String {
        // A poisoned lock still holds a usable rng state.
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        fill(&mut *rng, len)
    }
}

/// StaticNonce always returns the same nonce, truncated or padded with `0`.
///
/// This is useful for testing or for reproducing a recorded request.
#[derive(Debug, Clone)]
pub struct StaticNonce(pub String);

impl NonceGenerate for StaticNonce {
    fn generate(&self, len: usize) -> String {
        self.0.chars().chain(std::iter::repeat('0')).take(len).collect()
    }
}

fn fill(rng: &mut impl RngCore, len: usize) -> String {
    let mut buf = vec![0u8; len];

    let mut i = len;
    let mut cache = rng.next_u64() >> 1;
    let mut remain = INDEX_MAX;
    while i > 0 {
        if remain == 0 {
            cache = rng.next_u64() >> 1;
            remain = INDEX_MAX;
        }
        let idx = (cache & INDEX_MASK) as usize;
        if idx < LETTERS.len() {
            i -= 1;
            buf[i] = LETTERS[idx];
        }
        cache >>= INDEX_BITS;
        remain -= 1;
    }

    buf.into_iter().map(char::from).collect()
}
