//! Stage 执行契约
//!
//! @yutiansut @quantaxis
//!
//! 所有算子共享的单遍、推模式执行协议：
//! - init: 按配置创建一份新的 State (可重复调用，用于并行分区)
//! - integrate: 每个输入元素调用一次，可向下游推送 0..n 个输出
//! - combine: 合并两个相邻分区的 State (仅交换/结合类聚合支持)
//! - finish: 所有 integrate 结束后调用一次，冲刷缓冲的输出
//!
//! 取消是协作式的：integrate 返回 false，或下游 `is_rejecting()` 为 true，
//! 驱动器即停止供数并直接进入 finish。

pub mod driver;
pub mod map;
pub mod sink;

pub use driver::*;
pub use map::*;
pub use sink::*;

use crate::{Result, StageError};

/// 单遍流式算子核心 Trait
///
/// Stage 本身是不可变配置，两次运行之间不保留任何状态；
/// 每次运行通过 `init` 拿到独占的 State。
pub trait Stage {
    /// 单次运行的可变状态
    type State;

    /// 输入元素类型
    type Input;

    /// 输出元素类型
    type Output;

    /// 算子名称 (日志与错误信息使用)
    fn name(&self) -> &'static str;

    /// 创建初始状态
    fn init(&self) -> Self::State;

    /// 消费一个输入元素
    ///
    /// 返回值表示上游是否应继续供数。贪婪型算子自身从不要求提前停止，
    /// 但每次推送后仍需检查 `sink.is_rejecting()`。
    fn integrate<S>(&self, state: &mut Self::State, element: Self::Input, sink: &mut S) -> Result<bool>
    where
        S: Sink<Self::Output> + ?Sized;

    /// 是否支持并行分区合并
    fn supports_combine(&self) -> bool {
        false
    }

    /// 合并两个相邻分区的状态 (left 在前，right 在后)
    fn combine(&self, _left: Self::State, _right: Self::State) -> Result<Self::State> {
        Err(StageError::CombineUnsupported(format!(
            "{} is order-sensitive and cannot merge partition states",
            self.name()
        )))
    }

    /// 冲刷缓冲的输出，每次运行恰好调用一次
    ///
    /// 推送之间必须检查 `sink.is_rejecting()`。
    fn finish<S>(&self, _state: Self::State, _sink: &mut S) -> Result<()>
    where
        S: Sink<Self::Output> + ?Sized,
    {
        Ok(())
    }
}

/// Stage 扩展方法
pub trait StageExt: Stage + Sized {
    /// 在本算子之前套一层输入映射
    fn map_input<I, F>(self, mapper: F) -> MapInput<Self, F, I>
    where
        F: Fn(I) -> Self::Input,
    {
        MapInput::new(self, mapper)
    }
}

impl<S: Stage> StageExt for S {}

#[cfg(test)]
mod tests {
    use super::*;

    /// 每个元素原样输出，并在 finish 时追加一个计数
    struct Echo;

    impl Stage for Echo {
        type State = i64;
        type Input = i64;
        type Output = i64;

        fn name(&self) -> &'static str {
            "echo"
        }

        fn init(&self) -> Self::State {
            0
        }

        fn integrate<S>(&self, state: &mut i64, element: i64, sink: &mut S) -> Result<bool>
        where
            S: Sink<i64> + ?Sized,
        {
            *state += 1;
            sink.push(element);
            Ok(!sink.is_rejecting())
        }

        fn finish<S>(&self, state: i64, sink: &mut S) -> Result<()>
        where
            S: Sink<i64> + ?Sized,
        {
            if !sink.is_rejecting() {
                sink.push(state * 100);
            }
            Ok(())
        }
    }

    #[test]
    fn test_default_combine_is_unsupported() {
        let stage = Echo;
        assert!(!stage.supports_combine());
        let err = stage.combine(1, 2).unwrap_err();
        assert!(matches!(err, StageError::CombineUnsupported(_)));
    }

    #[test]
    fn test_init_is_repeatable() {
        let stage = Echo;
        assert_eq!(stage.init(), stage.init());
    }

    #[test]
    fn test_collect_runs_finisher() {
        let out = collect(&Echo, vec![1, 2, 3]).unwrap();
        assert_eq!(out, vec![1, 2, 3, 300]);
    }

    #[test]
    fn test_map_input_adapter() {
        let stage = Echo.map_input(|s: &str| s.len() as i64);
        let out = collect(&stage, vec!["a", "bbb"]).unwrap();
        assert_eq!(out, vec![1, 3, 200]);
    }
}
