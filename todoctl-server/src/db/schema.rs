//! Schema bootstrap with bounded retries

use std::time::Duration;

use super::TodoStore;

/// How hard to try creating the schema at startup
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first (at least 1)
    pub attempts: u32,
    /// Delay before the second attempt; doubles after each further failure
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 5,
            delay: Duration::from_millis(500),
        }
    }
}

/// Ensure the `todos` table exists, retrying while the database is
/// unreachable.
///
/// Never fails: on exhaustion the error is logged and `false` is returned so
/// the caller can keep serving the health endpoint.
pub async fn bootstrap_schema(store: &dyn TodoStore, policy: &RetryPolicy) -> bool {
    let attempts = policy.attempts.max(1);
    let mut delay = policy.delay;

    tracing::info!(dialect = %store.dialect(), "Initializing database schema...");

    for attempt in 1..=attempts {
        match store.initialize_schema().await {
            Ok(()) => {
                tracing::info!(attempt, "Database schema ready");
                return true;
            }
            Err(e) if attempt < attempts => {
                tracing::warn!(
                    attempt,
                    attempts,
                    retry_in_ms = delay.as_millis() as u64,
                    error = %e,
                    "Schema initialization failed, retrying"
                );
                tokio::time::sleep(delay).await;
                delay = delay.saturating_mul(2);
            }
            Err(e) => {
                tracing::error!(
                    attempts,
                    error = %e,
                    "Schema initialization failed; continuing without it"
                );
            }
        }
    }

    false
}
