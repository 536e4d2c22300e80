//! 末尾 N 个元素

use std::marker::PhantomData;

use crate::buffer::RingBuffer;
use crate::stage::{Sink, Stage};
use crate::Result;

/// 只保留最后 `count` 个元素，finish 时按原顺序输出
#[derive(Debug, Clone, Copy)]
pub struct TakeLast<T> {
    count: usize,
    _element: PhantomData<fn(T) -> T>,
}

impl<T> TakeLast<T> {
    pub fn new(count: usize) -> Self {
        Self {
            count,
            _element: PhantomData,
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }
}

impl<T> Stage for TakeLast<T> {
    /// `count == 0` 时不缓冲任何元素
    type State = Option<RingBuffer<T>>;
    type Input = T;
    type Output = T;

    fn name(&self) -> &'static str {
        "take_last"
    }

    fn init(&self) -> Self::State {
        (self.count > 0).then(|| RingBuffer::new(self.count))
    }

    fn integrate<S>(&self, state: &mut Self::State, element: T, sink: &mut S) -> Result<bool>
    where
        S: Sink<T> + ?Sized,
    {
        if let Some(buffer) = state.as_mut() {
            buffer.push(element);
        }
        Ok(!sink.is_rejecting())
    }

    fn finish<S>(&self, state: Self::State, sink: &mut S) -> Result<()>
    where
        S: Sink<T> + ?Sized,
    {
        if let Some(mut buffer) = state {
            while !sink.is_rejecting() {
                match buffer.pop_front() {
                    Some(value) => {
                        sink.push(value);
                    }
                    None => break,
                }
            }
        }
        Ok(())
    }
}
