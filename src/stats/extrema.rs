//! 滑动最值算子 - Moving Min / Max
//!
//! @yutiansut @quantaxis
//!
//! 基于 MonotonicExtremaTracker，每个元素均摊 O(1)。
//! 空值 (`None`) 整体跳过：既不入队，也不计入窗口。

use std::cmp::Ordering;

use crate::buffer::{ExtremaKind, MonotonicExtremaTracker};
use crate::stage::{Sink, Stage};
use crate::stats::require_window;
use crate::Result;

/// 自然序比较器
pub type NaturalOrder<T> = fn(&T, &T) -> Ordering;

/// 滑动最值算子 (默认输出部分窗口)
#[derive(Debug, Clone)]
pub struct MovingExtrema<T, C> {
    kind: ExtremaKind,
    window_size: usize,
    include_partial: bool,
    comparator: C,
    _element: std::marker::PhantomData<fn(T) -> T>,
}

impl<T, C> MovingExtrema<T, C>
where
    C: Fn(&T, &T) -> Ordering + Clone,
{
    pub fn new(kind: ExtremaKind, window_size: usize, comparator: C) -> Result<Self> {
        require_window("moving_extrema", window_size, 1)?;
        Ok(Self {
            kind,
            window_size,
            include_partial: true,
            comparator,
            _element: std::marker::PhantomData,
        })
    }

    pub fn min_by(window_size: usize, comparator: C) -> Result<Self> {
        Self::new(ExtremaKind::Min, window_size, comparator)
    }

    pub fn max_by(window_size: usize, comparator: C) -> Result<Self> {
        Self::new(ExtremaKind::Max, window_size, comparator)
    }

    pub fn include_partial(mut self, include: bool) -> Self {
        self.include_partial = include;
        self
    }

    pub fn kind(&self) -> ExtremaKind {
        self.kind
    }
}

impl<T: Ord> MovingExtrema<T, NaturalOrder<T>> {
    pub fn min(window_size: usize) -> Result<Self> {
        Self::new(ExtremaKind::Min, window_size, T::cmp)
    }

    pub fn max(window_size: usize) -> Result<Self> {
        Self::new(ExtremaKind::Max, window_size, T::cmp)
    }
}

impl<T, C> Stage for MovingExtrema<T, C>
where
    T: Clone,
    C: Fn(&T, &T) -> Ordering + Clone,
{
    type State = MonotonicExtremaTracker<T, C>;
    type Input = Option<T>;
    type Output = T;

    fn name(&self) -> &'static str {
        match self.kind {
            ExtremaKind::Min => "moving_min",
            ExtremaKind::Max => "moving_max",
        }
    }

    fn init(&self) -> Self::State {
        MonotonicExtremaTracker::new(self.kind, self.window_size, self.comparator.clone())
    }

    fn integrate<S>(&self, state: &mut Self::State, element: Option<T>, sink: &mut S) -> Result<bool>
    where
        S: Sink<T> + ?Sized,
    {
        if let Some(value) = element {
            let current = state.push(value).cloned();
            if (self.include_partial || state.is_full()) && !sink.is_rejecting() {
                if let Some(extremum) = current {
                    sink.push(extremum);
                }
            }
        }
        Ok(!sink.is_rejecting())
    }
}
