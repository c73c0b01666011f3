//! Per-action request pacing.
//!
//! 云 API 对单账号单接口限频（多数为 20 次/秒）。每个 action 维护
//! 一个最早可调用时刻，调用间隔不足时在锁外睡眠补齐。

use std::collections::HashMap;
use std::sync::{Mutex, OnceLock, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

/// Minimum spacing between two calls to the same action (20 QPS).
const MIN_INTERVAL: Duration = Duration::from_millis(50);

static NEXT_SLOT: OnceLock<Mutex<HashMap<String, Instant>>> = OnceLock::new();

/// Wait until the named action may be called again.
pub(crate) async fn acquire(action: &str) {
    let wait = {
        let mut slots = NEXT_SLOT
            .get_or_init(|| Mutex::new(HashMap::new()))
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let now = Instant::now();
        match slots.get(action).copied() {
            Some(slot) if slot > now => {
                // 并发调用按 MIN_INTERVAL 依次排队
                slots.insert(action.to_string(), slot + MIN_INTERVAL);
                Some(slot - now)
            }
            _ => {
                slots.insert(action.to_string(), now + MIN_INTERVAL);
                None
            }
        }
    };
    if let Some(delay) = wait {
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn same_action_is_spaced() {
        let start = Instant::now();
        acquire("TestDescribeSpacing").await;
        acquire("TestDescribeSpacing").await;
        acquire("TestDescribeSpacing").await;
        // 第二、三次调用各等待约 50ms
        assert!(start.elapsed() >= Duration::from_millis(90));
    }

    #[tokio::test]
    async fn different_actions_do_not_block_each_other() {
        acquire("TestActionAlpha").await;
        let start = Instant::now();
        acquire("TestActionBeta").await;
        assert!(start.elapsed() < Duration::from_millis(40));
    }
}
