//! 洗牌算子
//!
//! 缓冲全部输入，finish 时按 Fisher-Yates 逐个抽取输出；
//! 每次推送前检查下游是否已拒绝。

use std::marker::PhantomData;

use super::random::RandomSource;
use crate::stage::{Sink, Stage};
use crate::Result;

/// 洗牌算子
pub struct Shuffle<T, R> {
    random: R,
    _element: PhantomData<fn(T) -> T>,
}

impl<T, R: RandomSource + Clone> Shuffle<T, R> {
    pub fn new(random: R) -> Self {
        Self {
            random,
            _element: PhantomData,
        }
    }
}

/// 洗牌状态
pub struct ShuffleState<T, R> {
    inputs: Vec<T>,
    random: R,
}

impl<T, R: RandomSource + Clone> Stage for Shuffle<T, R> {
    type State = ShuffleState<T, R>;
    type Input = T;
    type Output = T;

    fn name(&self) -> &'static str {
        "shuffle"
    }

    fn init(&self) -> Self::State {
        ShuffleState {
            inputs: Vec::new(),
            random: self.random.clone(),
        }
    }

    fn integrate<S>(&self, state: &mut Self::State, element: T, sink: &mut S) -> Result<bool>
    where
        S: Sink<T> + ?Sized,
    {
        state.inputs.push(element);
        Ok(!sink.is_rejecting())
    }

    fn finish<S>(&self, mut state: Self::State, sink: &mut S) -> Result<()>
    where
        S: Sink<T> + ?Sized,
    {
        while !sink.is_rejecting() {
            let remaining = state.inputs.len() as u64;
            let slot = state.random.next_bounded(remaining) as usize;
            let Some(last) = state.inputs.pop() else {
                break;
            };
            if slot < state.inputs.len() {
                let picked = std::mem::replace(&mut state.inputs[slot], last);
                sink.push(picked);
            } else {
                sink.push(last);
            }
        }
        Ok(())
    }
}
