//! 蓄水池采样 - 未知长度序列上的定长均匀采样
//!
//! @yutiansut @quantaxis
//!
//! Algorithm R 变体：
//! - 前 k 个元素直接保留 (按出现顺序)
//! - 第 i 个元素 (0 起，i ≥ k) 抽取 r ∈ [0, i]，若 r < k 则移除槽位 r，新元素追加到末尾
//! - 每个元素最终留在样本中的概率为 k / n
//!
//! 样本始终保持元素的出现顺序。

use std::marker::PhantomData;

use super::random::RandomSource;
use crate::stage::{push_all, Sink, Stage};
use crate::{Result, StageError};

/// 蓄水池采样器
#[derive(Debug, Clone)]
pub struct ReservoirSampler<T, R> {
    capacity: usize,
    elements: Vec<T>,
    seen: u64,
    random: R,
}

impl<T, R: RandomSource> ReservoirSampler<T, R> {
    /// # Panics
    ///
    /// `capacity == 0` 时 panic。
    pub fn new(capacity: usize, random: R) -> Self {
        assert!(capacity > 0, "reservoir capacity must be positive");
        Self {
            capacity,
            elements: Vec::with_capacity(capacity.min(4096)),
            seen: 0,
            random,
        }
    }

    /// 提供一个元素，返回它是否进入了样本
    pub fn offer(&mut self, item: T) -> bool {
        let retained = if self.elements.len() < self.capacity {
            self.elements.push(item);
            true
        } else {
            let slot = self.random.next_bounded(self.seen + 1);
            if slot < self.capacity as u64 {
                self.elements.remove(slot as usize);
                self.elements.push(item);
                true
            } else {
                false
            }
        };
        self.seen += 1;
        retained
    }

    /// 当前样本 (出现顺序)
    pub fn sample(&self) -> &[T] {
        &self.elements
    }

    pub fn into_sample(self) -> Vec<T> {
        self.elements
    }

    /// 已见元素数量
    pub fn seen(&self) -> u64 {
        self.seen
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// SampleFixedSize 算子
// ═══════════════════════════════════════════════════════════════════════════

/// 定长采样算子，finish 时一次性输出样本
///
/// 每次 `init` 克隆一份随机源；顺序敏感，不支持 combine。
pub struct SampleFixedSize<T, R> {
    sample_size: usize,
    random: R,
    _element: PhantomData<fn(T) -> T>,
}

impl<T, R: RandomSource + Clone> SampleFixedSize<T, R> {
    pub fn new(sample_size: usize, random: R) -> Result<Self> {
        if sample_size < 1 {
            return Err(StageError::ConfigError(
                "sample size must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            sample_size,
            random,
            _element: PhantomData,
        })
    }

    pub fn sample_size(&self) -> usize {
        self.sample_size
    }
}

impl<T, R: RandomSource + Clone> Stage for SampleFixedSize<T, R> {
    type State = ReservoirSampler<T, R>;
    type Input = T;
    type Output = T;

    fn name(&self) -> &'static str {
        "sample_fixed_size"
    }

    fn init(&self) -> Self::State {
        ReservoirSampler::new(self.sample_size, self.random.clone())
    }

    fn integrate<S>(&self, state: &mut Self::State, element: T, sink: &mut S) -> Result<bool>
    where
        S: Sink<T> + ?Sized,
    {
        state.offer(element);
        Ok(!sink.is_rejecting())
    }

    fn finish<S>(&self, state: Self::State, sink: &mut S) -> Result<()>
    where
        S: Sink<T> + ?Sized,
    {
        push_all(state.into_sample(), sink);
        Ok(())
    }
}
