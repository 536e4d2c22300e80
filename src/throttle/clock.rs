//! 单调时钟抽象
//!
//! @yutiansut @quantaxis
//!
//! 限流器只通过 `Clock` 读取时间与等待：
//! - SystemClock: 基于 `Instant`，等待即线程 sleep
//! - ManualClock: 手动推进的虚拟时钟，等待直接把时间拨到截止点

use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// 单调时钟
pub trait Clock: Send + Sync + Debug {
    /// 自时钟原点起经过的时间
    fn now(&self) -> Duration;

    /// 阻塞直到 `deadline` (已过期则立即返回)
    fn park_until(&self, deadline: Duration);
}

/// 系统单调时钟
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn park_until(&self, deadline: Duration) {
        let now = self.now();
        if deadline > now {
            std::thread::sleep(deadline - now);
        }
    }
}

/// 手动时钟 (测试用)
///
/// Clone 之后共享同一个时间轴。
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    nanos: Arc<AtomicU64>,
    parks: Arc<AtomicU64>,
}

fn to_nanos(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// 时间前进 `delta`
    pub fn advance(&self, delta: Duration) {
        self.nanos.fetch_add(to_nanos(delta), Ordering::SeqCst);
    }

    /// 直接设置时间 (不允许倒退)
    pub fn set(&self, now: Duration) {
        self.nanos.fetch_max(to_nanos(now), Ordering::SeqCst);
    }

    /// 发生过的等待次数
    pub fn parks(&self) -> u64 {
        self.parks.load(Ordering::SeqCst)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.nanos.load(Ordering::SeqCst))
    }

    fn park_until(&self, deadline: Duration) {
        self.parks.fetch_add(1, Ordering::SeqCst);
        self.set(deadline);
    }
}
