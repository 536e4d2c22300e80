//! 周期许可限流器
//!
//! @yutiansut @quantaxis
//!
//! 每个周期发放 `allowed` 个许可：
//! - 周期已结束：开启新周期，许可重置
//! - 周期内仍有许可：消耗一个，放行
//! - 周期内许可耗尽：按策略处理
//!   - Drop: 直接丢弃，不阻塞
//!   - Pause: 阻塞到周期结束，开启新周期后放行
//!
//! 状态不做内部同步，只允许单线程顺序调用。

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::clock::Clock;

/// 许可耗尽时的策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitPolicy {
    /// 丢弃 (debounce)
    Drop,
    /// 阻塞等待下一个周期 (throttle)
    Pause,
}

/// 限流器状态
#[derive(Debug)]
pub struct RateLimiter {
    allowed: u32,
    period: Duration,
    policy: LimitPolicy,
    clock: Arc<dyn Clock>,
    period_end: Duration,
    remaining: u32,
    dropped: u64,
}

impl RateLimiter {
    /// 创建时即开启第一个周期
    ///
    /// # Panics
    ///
    /// `allowed == 0` 时 panic。
    pub fn new(allowed: u32, period: Duration, policy: LimitPolicy, clock: Arc<dyn Clock>) -> Self {
        assert!(allowed > 0, "rate limiter needs at least one permit per period");
        let period_end = clock.now() + period;
        Self {
            allowed,
            period,
            policy,
            clock,
            period_end,
            remaining: allowed,
            dropped: 0,
        }
    }

    /// 尝试获取一个许可，返回元素是否放行
    pub fn attempt(&mut self) -> bool {
        let now = self.clock.now();
        if now < self.period_end && self.remaining == 0 {
            match self.policy {
                LimitPolicy::Drop => {
                    self.dropped += 1;
                    log::trace!("rate limiter: permits exhausted, dropping element");
                    return false;
                }
                LimitPolicy::Pause => {
                    log::debug!(
                        "rate limiter: permits exhausted, pausing {:?}",
                        self.period_end - now
                    );
                    self.clock.park_until(self.period_end);
                    self.reset();
                }
            }
        } else if now >= self.period_end {
            self.reset();
        }
        self.remaining -= 1;
        true
    }

    fn reset(&mut self) {
        self.period_end = self.clock.now() + self.period;
        self.remaining = self.allowed;
    }

    /// 当前周期剩余许可
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// 当前周期结束时刻
    pub fn period_end(&self) -> Duration {
        self.period_end
    }

    /// 累计丢弃数量
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn policy(&self) -> LimitPolicy {
        self.policy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::throttle::ManualClock;

    fn limiter(policy: LimitPolicy, clock: &ManualClock) -> RateLimiter {
        RateLimiter::new(2, Duration::from_millis(100), policy, Arc::new(clock.clone()))
    }

    #[test]
    fn test_drop_within_period() {
        let clock = ManualClock::new();
        let mut limiter = limiter(LimitPolicy::Drop, &clock);
        assert!(limiter.attempt());
        assert!(limiter.attempt());
        assert!(!limiter.attempt());
        assert_eq!(limiter.dropped(), 1);
        assert_eq!(clock.parks(), 0);
    }

    #[test]
    fn test_new_period_restores_permits() {
        let clock = ManualClock::new();
        let mut limiter = limiter(LimitPolicy::Drop, &clock);
        assert!(limiter.attempt());
        assert!(limiter.attempt());
        clock.advance(Duration::from_millis(100));
        assert!(limiter.attempt());
        assert_eq!(limiter.remaining(), 1);
        assert_eq!(limiter.period_end(), Duration::from_millis(200));
    }

    #[test]
    fn test_pause_waits_for_period_end() {
        let clock = ManualClock::new();
        clock.advance(Duration::from_millis(7));
        let mut limiter = limiter(LimitPolicy::Pause, &clock);
        assert!(limiter.attempt());
        assert!(limiter.attempt());
        assert!(limiter.attempt());
        assert_eq!(clock.parks(), 1);
        assert_eq!(clock.now(), Duration::from_millis(107));
        assert_eq!(limiter.remaining(), 1);
    }
}
