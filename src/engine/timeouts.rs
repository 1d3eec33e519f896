// ── Emotebank: External Call Budgets ───────────────────────────────────────
// Every registry and platform round-trip goes through `with_timeout` so a
// stalled collaborator surfaces as `ExternalTimeout` instead of parking the
// event loop.

use crate::atoms::error::{EmoteError, EmoteResult};
use log::warn;
use std::future::Future;
use std::time::Duration;

pub async fn with_timeout<T, F>(operation: &str, limit: Duration, fut: F) -> EmoteResult<T>
where
    F: Future<Output = EmoteResult<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => {
            warn!("[timeouts] {} exceeded {}ms", operation, limit.as_millis());
            Err(EmoteError::ExternalTimeout { operation: operation.to_string(), after: limit })
        }
    }
}
