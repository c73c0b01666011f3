//! Time-bounded retry for cloud API calls and status polling.
//!
//! Every mutating call and most reads run inside [`within`]: the operation
//! is re-attempted until it succeeds, fails fatally, or the deadline
//! passes. Classification is by platform error code; see [`retry_error`]
//! and [`crate::error::RETRYABLE_ERROR_CODES`]. Status polls reuse the
//! same loop by returning [`Retry::Retryable`] while the resource is
//! still in a transitional state.

use std::time::Duration;

use tokio::time::Instant;

use crate::error::{ProviderError, Result, code_matches};

/// Deadline for read paths (describe + flatten).
pub const READ_RETRY_TIMEOUT: Duration = Duration::from_secs(3 * 60);

/// Deadline for mutating paths (create/update/delete and their polls).
pub const WRITE_RETRY_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Classified failure inside a retry loop.
#[derive(Debug)]
pub enum Retry {
    /// Try again until the deadline.
    Retryable(ProviderError),
    /// Stop immediately and surface the error.
    Fatal(ProviderError),
}

impl Retry {
    pub(crate) fn into_error(self) -> ProviderError {
        match self {
            Self::Retryable(e) | Self::Fatal(e) => e,
        }
    }

    /// Retryable "still in progress" error for status polls.
    ///
    /// 轮询中资源尚未到达终态时用它继续等待；超出预算后该错误
    /// 原样返回给调用方。
    #[must_use]
    pub fn not_ready(product: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Retryable(ProviderError::RetryableOperation {
            product: product.into(),
            raw_code: "ResourceBusy".to_string(),
            raw_message: detail.into(),
        })
    }
}

/// Default classification: retry transient transport failures and codes on
/// the platform allow-list, everything else is fatal.
#[must_use]
pub fn retry_error(err: ProviderError) -> Retry {
    if err.is_retryable() {
        Retry::Retryable(err)
    } else {
        Retry::Fatal(err)
    }
}

/// Like [`retry_error`], with extra retryable codes for this call site.
///
/// The extra entries follow the allow-list matching rule: a full code or a
/// family prefix before the dot.
#[must_use]
pub fn retry_error_with(err: ProviderError, extra_retryable: &[&str]) -> Retry {
    if err.is_retryable() {
        return Retry::Retryable(err);
    }
    if let Some(code) = err.api_code()
        && code_matches(code, extra_retryable)
    {
        return Retry::Retryable(err);
    }
    Retry::Fatal(err)
}

/// Run `op` until it succeeds, fails fatally, or `timeout` elapses.
///
/// On deadline the last error is returned verbatim. The delay between
/// attempts backs off exponentially (100ms doubling, capped at 10s); a
/// rate-limit error with a server-provided `retry_after` waits that long
/// instead (capped at 30s).
pub async fn within<T, F, Fut>(timeout: Duration, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, Retry>>,
{
    let deadline = Instant::now() + timeout;
    let mut attempt: u32 = 0;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(Retry::Fatal(e)) => return Err(e),
            Err(Retry::Retryable(e)) => {
                let delay = retry_delay(&e, attempt);
                if Instant::now() + delay >= deadline {
                    log::warn!("Retry deadline ({timeout:?}) exceeded: {e}");
                    return Err(e);
                }
                log::warn!(
                    "Attempt {} failed, retrying in {:.1}s: {e}",
                    attempt + 1,
                    delay.as_secs_f32()
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

/// 计算下一次重试前的等待时间。
///
/// `RateLimited` 且带 `retry_after` 时使用该值（上限 30 秒），
/// 其余情况走指数退避。
fn retry_delay(error: &ProviderError, attempt: u32) -> Duration {
    if let ProviderError::RateLimited {
        retry_after: Some(secs),
        ..
    } = error
    {
        Duration::from_secs((*secs).min(30))
    } else {
        backoff_delay(attempt)
    }
}

/// 指数退避：100ms, 200ms, 400ms, ...，上限 10 秒。
fn backoff_delay(attempt: u32) -> Duration {
    let capped_attempt = attempt.min(20); // 防止 2^attempt 溢出
    let delay_ms = 100_u64.saturating_mul(1_u64 << capped_attempt);
    Duration::from_millis(delay_ms.min(10_000))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn retryable_err() -> ProviderError {
        ProviderError::RetryableOperation {
            product: "test".into(),
            raw_code: "FailedOperation".into(),
            raw_message: "busy".into(),
        }
    }

    fn fatal_err() -> ProviderError {
        ProviderError::InvalidParameter {
            product: "test".into(),
            param: "name".into(),
            detail: "bad".into(),
        }
    }

    // ---- classification ----

    #[test]
    fn default_classification() {
        assert!(matches!(retry_error(retryable_err()), Retry::Retryable(_)));
        assert!(matches!(retry_error(fatal_err()), Retry::Fatal(_)));
    }

    #[test]
    fn extra_codes_promote_to_retryable() {
        let e = ProviderError::Unknown {
            product: "mongodb".into(),
            raw_code: Some("InvalidParameterValue.InvalidTradeOperation".into()),
            raw_message: "trade in flight".into(),
        };
        assert!(matches!(
            retry_error_with(e, &["InvalidParameterValue.InvalidTradeOperation"]),
            Retry::Retryable(_)
        ));
    }

    #[test]
    fn extra_codes_match_family_prefix() {
        let e = ProviderError::Unknown {
            product: "dayu".into(),
            raw_code: Some("InvalidParameterValue.SomeDetail".into()),
            raw_message: "x".into(),
        };
        assert!(matches!(
            retry_error_with(e, &["InvalidParameterValue"]),
            Retry::Retryable(_)
        ));
    }

    #[test]
    fn extra_codes_do_not_demote_defaults() {
        assert!(matches!(
            retry_error_with(retryable_err(), &[]),
            Retry::Retryable(_)
        ));
        assert!(matches!(retry_error_with(fatal_err(), &[]), Retry::Fatal(_)));
    }

    #[test]
    fn not_ready_is_retryable() {
        let r = Retry::not_ready("cdn", "domain still processing");
        assert!(matches!(r, Retry::Retryable(_)));
        let e = r.into_error();
        assert!(e.is_retryable());
        assert_eq!(e.api_code(), Some("ResourceBusy"));
    }

    // ---- delays ----

    #[test]
    fn backoff_progression() {
        assert_eq!(backoff_delay(0), Duration::from_millis(100));
        assert_eq!(backoff_delay(1), Duration::from_millis(200));
        assert_eq!(backoff_delay(3), Duration::from_millis(800));
        // attempt 7: 100 * 2^7 = 12800ms, capped to 10000ms
        assert_eq!(backoff_delay(7), Duration::from_millis(10_000));
    }

    #[test]
    fn rate_limited_uses_retry_after_capped() {
        let e = ProviderError::RateLimited {
            product: "t".into(),
            retry_after: Some(120),
            raw_message: None,
        };
        assert_eq!(retry_delay(&e, 0), Duration::from_secs(30));

        let e = ProviderError::RateLimited {
            product: "t".into(),
            retry_after: Some(5),
            raw_message: None,
        };
        assert_eq!(retry_delay(&e, 3), Duration::from_secs(5));
    }

    // ---- within ----

    #[tokio::test]
    async fn within_returns_first_success() {
        let calls = AtomicU32::new(0);
        let result = within(Duration::from_secs(5), || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, Retry>(42)
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn within_retries_until_success() {
        let calls = AtomicU32::new(0);
        let result = within(Duration::from_secs(5), || async {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            if n < 2 {
                Err(retry_error(retryable_err()))
            } else {
                Ok("done")
            }
        })
        .await;
        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn within_stops_on_fatal() {
        let calls = AtomicU32::new(0);
        let result: Result<()> = within(Duration::from_secs(5), || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(retry_error(fatal_err()))
        })
        .await;
        assert!(matches!(result, Err(ProviderError::InvalidParameter { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn within_deadline_returns_last_error() {
        let result: Result<()> = within(Duration::from_millis(150), || async {
            Err(retry_error(retryable_err()))
        })
        .await;
        assert!(
            matches!(result, Err(ProviderError::RetryableOperation { .. })),
            "got {result:?}"
        );
    }
}
