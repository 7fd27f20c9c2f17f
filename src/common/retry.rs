// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@on1.no>

use std::future::Future;
use std::time::Duration;
use tokio::time::{Instant, sleep};

/// Retry an async operation with exponential backoff.
///
/// Only for idempotent reads; state-changing sends are never retried.
pub async fn retry_async<F, Fut, T, E>(
    mut op: F,
    attempts: usize,
    initial_delay: Duration,
) -> Result<T, E>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut delay = initial_delay;
    let mut attempt = 1;
    loop {
        match op(attempt).await {
            Ok(v) => return Ok(v),
            Err(_) if attempt < attempts => {
                sleep(delay).await;
                delay = delay.saturating_mul(2);
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Poll `op` at a fixed interval until it yields `Some` or the timeout passes.
///
/// A failed attempt counts as "not yet". At the deadline the last error is
/// returned if the final attempt failed, otherwise `Ok(None)`.
pub async fn poll_until<F, Fut, T, E>(
    mut op: F,
    interval: Duration,
    timeout: Duration,
) -> Result<Option<T>, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>, E>>,
{
    let deadline = Instant::now() + timeout;
    loop {
        let last_err = match op().await {
            Ok(Some(v)) => return Ok(Some(v)),
            Ok(None) => None,
            Err(e) => Some(e),
        };
        if Instant::now() + interval > deadline {
            return match last_err {
                Some(e) => Err(e),
                None => Ok(None),
            };
        }
        sleep(interval).await;
    }
}
