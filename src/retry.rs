use std::future::Future;
use std::time::Duration;

use crate::error::{PipeError, Result};

/// Runs `op` up to `max_attempts` times, sleeping `2^attempt` seconds
/// between attempts (1s, 2s, 4s, ...). Only errors accepted by `retryable`
/// are tried again; anything else is terminal, as is bound exhaustion.
///
/// Both completion paths share this loop; they differ only in the bound.
pub async fn retry_with_backoff<T, Op, Fut, Pred>(
    max_attempts: u32,
    mut op: Op,
    retryable: Pred,
) -> Result<T>
where
    Op: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T>>,
    Pred: Fn(&PipeError) -> bool,
{
    let mut attempt = 0;
    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(err) if retryable(&err) && attempt + 1 < max_attempts => {
                let wait = Duration::from_secs(2u64.pow(attempt));
                log::warn!(
                    "Attempt {}/{} failed ({}); retrying in {}s",
                    attempt + 1,
                    max_attempts,
                    err,
                    wait.as_secs()
                );
                tokio::time::sleep(wait).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
