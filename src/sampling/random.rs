//! 随机源抽象
//!
//! @yutiansut @quantaxis
//!
//! 采样与洗牌算子不直接使用全局随机数，而是显式注入 `RandomSource`：
//! - 测试时可传入固定种子或脚本化序列，结果完全确定
//! - 跨线程共享时使用 `SharedRandom` (parking_lot::Mutex 保护)

use std::sync::Arc;

use parking_lot::Mutex;
use rand::rngs::{StdRng, ThreadRng};
use rand::{Rng, SeedableRng};

/// 均匀整数随机源
pub trait RandomSource {
    /// 返回 `[0, bound)` 内的均匀随机整数，`bound <= 1` 时返回 0
    fn next_bounded(&mut self, bound: u64) -> u64;
}

impl RandomSource for StdRng {
    fn next_bounded(&mut self, bound: u64) -> u64 {
        if bound <= 1 {
            return 0;
        }
        self.gen_range(0..bound)
    }
}

impl RandomSource for ThreadRng {
    fn next_bounded(&mut self, bound: u64) -> u64 {
        if bound <= 1 {
            return 0;
        }
        self.gen_range(0..bound)
    }
}

impl<R: RandomSource + ?Sized> RandomSource for Box<R> {
    fn next_bounded(&mut self, bound: u64) -> u64 {
        (**self).next_bounded(bound)
    }
}

/// 线程安全的共享随机源
///
/// Clone 之后共享同一个底层生成器，适合让多次运行 / 多个分区
/// 从同一条随机序列中取数。
#[derive(Debug)]
pub struct SharedRandom<R> {
    inner: Arc<Mutex<R>>,
}

impl<R> SharedRandom<R> {
    pub fn new(random: R) -> Self {
        Self {
            inner: Arc::new(Mutex::new(random)),
        }
    }
}

impl SharedRandom<StdRng> {
    /// 固定种子
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    /// 系统熵初始化
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R> Clone for SharedRandom<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R: RandomSource> RandomSource for SharedRandom<R> {
    fn next_bounded(&mut self, bound: u64) -> u64 {
        self.inner.lock().next_bounded(bound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounded_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for bound in 1..50u64 {
            for _ in 0..20 {
                assert!(rng.next_bounded(bound) < bound);
            }
        }
        assert_eq!(rng.next_bounded(0), 0);
    }

    #[test]
    fn test_seeded_is_deterministic() {
        let mut a = SharedRandom::seeded(42);
        let mut b = SharedRandom::seeded(42);
        let xs: Vec<u64> = (0..10).map(|_| a.next_bounded(1000)).collect();
        let ys: Vec<u64> = (0..10).map(|_| b.next_bounded(1000)).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn test_shared_clone_shares_sequence() {
        let mut reference = StdRng::seed_from_u64(9);
        let expected: Vec<u64> = (0..4).map(|_| reference.next_bounded(100)).collect();

        let mut first = SharedRandom::seeded(9);
        let mut second = first.clone();
        let got = vec![
            first.next_bounded(100),
            second.next_bounded(100),
            first.next_bounded(100),
            second.next_bounded(100),
        ];
        assert_eq!(got, expected);
    }

    #[test]
    fn test_shared_across_threads() {
        let shared = SharedRandom::seeded(1);
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let mut random = shared.clone();
                std::thread::spawn(move || (0..100).map(|_| random.next_bounded(10)).max())
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap().unwrap() < 10);
        }
    }
}
