//! Timeout helper for provider reads
//!
//! Sync never retries. A provider that hangs is cut off after the configured
//! timeout and the sync fails with [`HistoryError::OperationTimeout`]; the
//! next natural trigger runs it again.

use std::future::Future;
use std::time::Duration;

use tracing::error;

use crate::error::{HistoryError, HistoryResult};

/// Run `future`, failing with `OperationTimeout` if it takes longer than `timeout`
///
/// ```rust
/// # use dialer_call_history::recovery::with_timeout;
/// # use dialer_call_history::{HistoryError, HistoryResult};
/// # use std::time::Duration;
/// # #[tokio::main]
/// # async fn main() {
/// let result: HistoryResult<u32> = with_timeout(
///     "fetch_contacts",
///     Duration::from_millis(20),
///     async {
///         tokio::time::sleep(Duration::from_secs(1)).await;
///         Ok(7)
///     },
/// )
/// .await;
///
/// assert!(matches!(result, Err(HistoryError::OperationTimeout { duration_ms: 20, .. })));
/// # }
/// ```
pub async fn with_timeout<T, F>(operation_name: &str, timeout: Duration, future: F) -> HistoryResult<T>
where
    F: Future<Output = HistoryResult<T>>,
{
    match tokio::time::timeout(timeout, future).await {
        Ok(result) => result,
        Err(_) => {
            error!(
                operation = operation_name,
                timeout_ms = timeout.as_millis() as u64,
                "Operation timed out"
            );
            Err(HistoryError::OperationTimeout {
                operation: operation_name.to_string(),
                duration_ms: timeout.as_millis() as u64,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[tokio::test]
    async fn passes_through_fast_results() {
        let result = with_timeout("quick", Duration::from_secs(1), async { Ok::<_, HistoryError>(3) }).await;
        assert_eq!(result, Ok(3));
    }

    #[tokio::test]
    async fn passes_through_inner_errors() {
        let result: HistoryResult<()> = with_timeout("failing", Duration::from_secs(1), async {
            Err(HistoryError::provider_read_failed("call_log", "denied"))
        })
        .await;
        assert_eq!(result.unwrap_err().category(), "provider");
    }

    #[tokio::test(start_paused = true)]
    #[traced_test]
    async fn times_out_slow_operations() {
        let result: HistoryResult<()> = with_timeout("slow", Duration::from_millis(100), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;
        assert_eq!(
            result,
            Err(HistoryError::OperationTimeout {
                operation: "slow".to_string(),
                duration_ms: 100
            })
        );
        assert!(logs_contain("Operation timed out"));
    }
}
