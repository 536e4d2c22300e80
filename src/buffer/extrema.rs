//! 单调队列 - 滑动窗口最值追踪
//!
//! @yutiansut @quantaxis
//!
//! 维护 (序号, 值) 的单调双端队列，队首永远是当前窗口的最值：
//! 1. 队首淘汰：序号已滑出窗口的候选
//! 2. 队尾淘汰：被新值支配的候选 (它们在新值存活期间不可能成为最值)
//! 3. 新值入队尾
//!
//! 每个元素最多入队、出队各一次，均摊 O(1)。

use std::cmp::Ordering;
use std::collections::VecDeque;

/// 最值方向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtremaKind {
    Min,
    Max,
}

impl ExtremaKind {
    /// `candidate` 是否被 `incoming` 支配
    ///
    /// 相等不算支配，因此最早存活的相等元素保持在队首。
    fn dominated(self, ordering: Ordering) -> bool {
        match self {
            ExtremaKind::Max => ordering == Ordering::Less,
            ExtremaKind::Min => ordering == Ordering::Greater,
        }
    }
}

/// 滑动最值追踪器
pub struct MonotonicExtremaTracker<T, C> {
    kind: ExtremaKind,
    window_size: u64,
    comparator: C,
    candidates: VecDeque<(u64, T)>,
    seen: u64,
}

impl<T, C> MonotonicExtremaTracker<T, C>
where
    C: Fn(&T, &T) -> Ordering,
{
    /// 创建追踪器
    ///
    /// # Panics
    ///
    /// `window_size == 0` 时 panic，窗口大小应由算子构造时校验。
    pub fn new(kind: ExtremaKind, window_size: usize, comparator: C) -> Self {
        assert!(window_size > 0, "window size must be positive");
        Self {
            kind,
            window_size: window_size as u64,
            comparator,
            candidates: VecDeque::with_capacity(window_size.min(1024)),
            seen: 0,
        }
    }

    /// 接收一个新值，返回当前窗口最值
    pub fn push(&mut self, value: T) -> Option<&T> {
        let index = self.seen;

        while let Some((front_index, _)) = self.candidates.front() {
            if front_index + self.window_size <= index {
                self.candidates.pop_front();
            } else {
                break;
            }
        }

        while let Some((_, back)) = self.candidates.back() {
            if self.kind.dominated((self.comparator)(back, &value)) {
                self.candidates.pop_back();
            } else {
                break;
            }
        }

        self.candidates.push_back((index, value));
        self.seen += 1;
        self.current()
    }

    /// 当前窗口最值
    pub fn current(&self) -> Option<&T> {
        self.candidates.front().map(|(_, value)| value)
    }

    /// 已接收的元素数量
    pub fn seen(&self) -> u64 {
        self.seen
    }

    /// 窗口是否已填满
    pub fn is_full(&self) -> bool {
        self.seen >= self.window_size
    }

    /// 队列中候选数量 (≤ 窗口大小)
    pub fn candidates(&self) -> usize {
        self.candidates.len()
    }

    pub fn kind(&self) -> ExtremaKind {
        self.kind
    }

    pub fn reset(&mut self) {
        self.candidates.clear();
        self.seen = 0;
    }
}
