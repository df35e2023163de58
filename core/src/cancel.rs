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

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{sleep_until, Instant};

use crate::Error;

const CANCELED: &str = "context canceled";
const DEADLINE_EXCEEDED: &str = "context deadline exceeded";

/// CancelContext carries the cancellation signal of one dispatch.
///
/// The signal fires when the deadline passes or when the paired
/// [`CancelHandle`] is cancelled, whichever comes first. The context is
/// owned by the caller; dispatching only observes it. Clones share the
/// same signal.
///
/// ```
/// use std::time::Duration;
/// use wxsign_core::CancelContext;
///
/// # #[tokio::main]
/// # async fn main() {
/// let (ctx, handle) = CancelContext::with_timeout(Duration::from_secs(10));
/// assert!(ctx.err().is_none());
///
/// handle.cancel();
/// assert!(ctx.err().unwrap().is_cancelled());
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CancelContext {
    deadline: Option<Instant>,
    cancelled: watch::Receiver<bool>,
}

/// CancelHandle fires the signal of its [`CancelContext`].
///
/// Dropping the handle does NOT cancel the context.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    /// Fire the cancellation signal. Calling it again is a no-op.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

impl CancelContext {
    /// A context that never fires.
    pub fn background() -> Self {
        let (_, rx) = watch::channel(false);
        Self {
            deadline: None,
            cancelled: rx,
        }
    }

    /// A context that only fires through the returned handle.
    pub fn with_cancel() -> (Self, CancelHandle) {
        let (tx, rx) = watch::channel(false);
        let ctx = Self {
            deadline: None,
            cancelled: rx,
        };
        (ctx, CancelHandle { tx })
    }

    /// A context that fires once `timeout` elapsed from now.
    pub fn with_timeout(timeout: Duration) -> (Self, CancelHandle) {
        Self::with_deadline(Instant::now() + timeout)
    }

    /// A context that fires at `deadline`.
    pub fn with_deadline(deadline: Instant) -> (Self, CancelHandle) {
        let (mut ctx, handle) = Self::with_cancel();
        ctx.deadline = Some(deadline);
        (ctx, handle)
    }

    /// The deadline of this context, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns the cancellation error if the signal already fired.
    pub fn err(&self) -> Option<Error> {
        if *self.cancelled.borrow() {
            return Some(Error::cancelled(CANCELED));
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => {
                Some(Error::cancelled(DEADLINE_EXCEEDED))
            }
            _ => None,
        }
    }

    /// Wait until the signal fires and return the cancellation error.
    ///
    /// Never resolves for a context that can't fire anymore.
    pub async fn done(&self) -> Error {
        let mut rx = self.cancelled.clone();
        let cancelled = async move {
            // An error means the handle is gone without cancelling.
            let closed = rx.wait_for(|v| *v).await.is_err();
            if closed {
                std::future::pending::<()>().await;
            }
        };

        match self.deadline {
            Some(deadline) => tokio::select! {
                _ = cancelled => Error::cancelled(CANCELED),
                _ = sleep_until(deadline) => Error::cancelled(DEADLINE_EXCEEDED),
            },
            None => {
                cancelled.await;
                Error::cancelled(CANCELED)
            }
        }
    }
}

impl Default for CancelContext {
    fn default() -> Self {
        Self::background()
    }
}
