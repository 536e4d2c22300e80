//! 窗口算子 - 固定大小、可设步长的分组
//!
//! @yutiansut @quantaxis
//!
//! - step < size: 窗口重叠，输出后丢弃最旧的 step 个元素
//! - step ≥ size: 窗口不重叠，输出后清空并跳过 step - size 个元素
//! - finish 时按配置输出尾部不完整窗口

use std::marker::PhantomData;

use crate::buffer::RingBuffer;
use crate::stage::{Sink, Stage};
use crate::{Result, StageError};

/// 窗口算子
#[derive(Debug, Clone, Copy)]
pub struct Window<T> {
    size: usize,
    step: usize,
    include_partial: bool,
    _element: PhantomData<fn(T) -> T>,
}

impl<T> Window<T> {
    pub fn new(size: usize, step: usize, include_partial: bool) -> Result<Self> {
        if size == 0 {
            return Err(StageError::ConfigError(
                "window size must be greater than zero".to_string(),
            ));
        }
        if step == 0 {
            return Err(StageError::ConfigError(
                "window step must be greater than zero".to_string(),
            ));
        }
        Ok(Self {
            size,
            step,
            include_partial,
            _element: PhantomData,
        })
    }

    /// 不重叠、丢弃尾部的分块
    pub fn chunks(size: usize) -> Result<Self> {
        Self::new(size, size, false)
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn step(&self) -> usize {
        self.step
    }
}

/// 窗口状态
#[derive(Debug, Clone)]
pub struct WindowState<T> {
    window: RingBuffer<T>,
    /// 还需跳过的元素数
    skip: usize,
}

impl<T: Clone> Stage for Window<T> {
    type State = WindowState<T>;
    type Input = T;
    type Output = Vec<T>;

    fn name(&self) -> &'static str {
        "window"
    }

    fn init(&self) -> Self::State {
        WindowState {
            window: RingBuffer::new(self.size),
            skip: 0,
        }
    }

    fn integrate<S>(&self, state: &mut Self::State, element: T, sink: &mut S) -> Result<bool>
    where
        S: Sink<Vec<T>> + ?Sized,
    {
        if state.skip == 0 {
            state.window.push(element);
        } else {
            state.skip -= 1;
        }

        if state.window.is_full() {
            if !sink.is_rejecting() {
                sink.push(state.window.snapshot());
            }
            state.skip = self.step.saturating_sub(self.size);
            if self.step >= self.size {
                state.window.clear();
            } else {
                state.window.drop_front(self.step);
            }
        }
        Ok(!sink.is_rejecting())
    }

    fn finish<S>(&self, state: Self::State, sink: &mut S) -> Result<()>
    where
        S: Sink<Vec<T>> + ?Sized,
    {
        if self.include_partial && !state.window.is_empty() && !sink.is_rejecting() {
            sink.push(state.window.snapshot());
        }
        Ok(())
    }
}
