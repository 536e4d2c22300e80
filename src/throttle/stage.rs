//! 限流算子
//!
//! @yutiansut @quantaxis
//!
//! - throttle: 许可耗尽时阻塞到下一周期 (Pause)
//! - debounce: 许可耗尽时丢弃 (Drop)
//!
//! 顺序敏感，不支持 combine。

use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use super::clock::Clock;
use super::limiter::{LimitPolicy, RateLimiter};
use crate::stage::{Sink, Stage};
use crate::{Result, StageError};

/// 周期最短 1 毫秒
const MIN_PERIOD: Duration = Duration::from_millis(1);

/// 限流算子
#[derive(Debug)]
pub struct Throttle<T> {
    allowed: u32,
    period: Duration,
    policy: LimitPolicy,
    clock: Arc<dyn Clock>,
    _element: PhantomData<fn(T) -> T>,
}

impl<T> Throttle<T> {
    pub fn new(
        policy: LimitPolicy,
        allowed: u32,
        period: Duration,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        if allowed == 0 {
            return Err(StageError::ConfigError(
                "allowed permits per period must be positive".to_string(),
            ));
        }
        if period < MIN_PERIOD {
            return Err(StageError::ConfigError(format!(
                "period {:?} must be at least {:?}",
                period, MIN_PERIOD
            )));
        }
        Ok(Self {
            allowed,
            period,
            policy,
            clock,
            _element: PhantomData,
        })
    }

    /// 超出许可时阻塞等待
    pub fn throttle(allowed: u32, period: Duration, clock: Arc<dyn Clock>) -> Result<Self> {
        Self::new(LimitPolicy::Pause, allowed, period, clock)
    }

    /// 超出许可时丢弃
    pub fn debounce(allowed: u32, period: Duration, clock: Arc<dyn Clock>) -> Result<Self> {
        Self::new(LimitPolicy::Drop, allowed, period, clock)
    }

    pub fn policy(&self) -> LimitPolicy {
        self.policy
    }

    pub fn allowed(&self) -> u32 {
        self.allowed
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}

impl<T> Stage for Throttle<T> {
    type State = RateLimiter;
    type Input = T;
    type Output = T;

    fn name(&self) -> &'static str {
        match self.policy {
            LimitPolicy::Drop => "debounce",
            LimitPolicy::Pause => "throttle",
        }
    }

    fn init(&self) -> Self::State {
        RateLimiter::new(self.allowed, self.period, self.policy, Arc::clone(&self.clock))
    }

    fn integrate<S>(&self, state: &mut Self::State, element: T, sink: &mut S) -> Result<bool>
    where
        S: Sink<T> + ?Sized,
    {
        if !sink.is_rejecting() && state.attempt() {
            sink.push(element);
        }
        Ok(!sink.is_rejecting())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::{collect, drive, FnSink};
    use crate::throttle::ManualClock;

    #[test]
    fn test_debounce_drops_excess() {
        let clock = ManualClock::new();
        let stage = Throttle::debounce(2, Duration::from_millis(100), Arc::new(clock.clone())).unwrap();
        assert_eq!(stage.name(), "debounce");
        let out = collect(&stage, vec!['a', 'b', 'c']).unwrap();
        assert_eq!(out, vec!['a', 'b']);
    }

    #[test]
    fn test_throttle_emits_third_after_period() {
        let clock = ManualClock::new();
        let stage = Throttle::throttle(2, Duration::from_millis(100), Arc::new(clock.clone())).unwrap();

        let mut stamps = Vec::new();
        let observer = clock.clone();
        let mut sink = FnSink::new(|value: u32| {
            stamps.push((value, observer.now()));
            true
        });
        drive(&stage, 1..=3, &mut sink).unwrap();

        assert_eq!(stamps.len(), 3);
        assert_eq!(stamps[0].1, Duration::ZERO);
        assert!(stamps[2].1 >= Duration::from_millis(100));
    }

    #[test]
    fn test_invalid_configuration() {
        let clock: Arc<dyn Clock> = Arc::new(ManualClock::new());
        let err = Throttle::<u8>::debounce(0, Duration::from_millis(10), Arc::clone(&clock)).unwrap_err();
        assert!(matches!(err, StageError::ConfigError(_)));
        let err = Throttle::<u8>::throttle(1, Duration::from_micros(500), clock).unwrap_err();
        assert!(matches!(err, StageError::ConfigError(_)));
    }

    #[test]
    fn test_each_run_gets_fresh_period() {
        let clock = ManualClock::new();
        let stage = Throttle::debounce(1, Duration::from_millis(50), Arc::new(clock.clone())).unwrap();
        assert_eq!(collect(&stage, 0..5).unwrap(), vec![0]);
        assert_eq!(collect(&stage, 5..10).unwrap(), vec![5]);
    }
}
