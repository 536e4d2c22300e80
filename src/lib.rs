//! # QASTREAM-RS
//!
//! 单遍流式算子库 - 基于 Stage 执行契约的有状态序列变换
//!
//! ## 核心能力
//!
//! - **执行契约**: init / integrate / combine / finish + 协作式取消 (stage/)
//! - **环形缓冲区**: 固定容量 FIFO，滑动窗口的底层存储 (buffer/)
//! - **单调队列**: O(1) 均摊的滑动最值追踪 (buffer/)
//! - **蓄水池采样**: 未知长度序列上的定长均匀采样 (sampling/)
//! - **限流器**: 固定窗口计数，Drop / Pause 两种策略 (throttle/)
//! - **任意精度数学**: Newton-Raphson 开 n 次方、二进制快速幂 (math/)
//! - **滑动统计**: 移动和/积/均值/中位数/几何均值/标准差 (stats/)
//!
//! ## 架构设计
//!
//! ```text
//! Driver (stage::driver)
//!     ↓ integrate(state, element, sink)
//! Stage<State, Input, Output>
//!     ↓ 组合
//! RingBuffer / MonotonicExtremaTracker / ReservoirSampler / RateLimiter / MathContext
//!     ↓ push(value)
//! Sink (下游, 可拒绝)
//! ```
//!
//! 所有 Stage 状态都由一次执行独占，核心不创建线程；唯一的阻塞点是
//! 限流器的 Pause 策略。

// ============================================================================
// 内部模块
// ============================================================================

/// Stage 执行契约、Sink、驱动器
pub mod stage;

/// 环形缓冲区与单调队列
pub mod buffer;

/// 随机源、蓄水池采样、洗牌
pub mod sampling;

/// 时钟与限流器
pub mod throttle;

/// 任意精度十进制运算
pub mod math;

/// 数值统计算子
pub mod stats;

/// 通用序列算子 (窗口、末尾 N 个、顺序/长度校验、频次)
pub mod stages;

/// 配置管理
pub mod config;

// ============================================================================
// 重导出常用类型
// ============================================================================

pub use buffer::{ExtremaKind, MonotonicExtremaTracker, RingBuffer};
pub use math::{MathContext, RoundingRule};
pub use sampling::{RandomSource, ReservoirSampler, SharedRandom};
pub use stage::{collect, drive, drive_partitioned, LimitSink, Sink, Stage, VecSink};
pub use throttle::{Clock, LimitPolicy, ManualClock, RateLimiter, SystemClock};

// ============================================================================
// 全局错误类型
// ============================================================================

/// Stage 错误类型
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StageError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Arithmetic error: {0}")]
    ArithmeticError(String),

    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Size violation: {0}")]
    SizeViolation(String),

    #[error("Combine unsupported: {0}")]
    CombineUnsupported(String),

    #[error("Config load error: {0}")]
    ConfigLoadError(String),
}

pub type Result<T> = std::result::Result<T, StageError>;

// ============================================================================
// 测试模块
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StageError::ConfigError("window size must be positive".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: window size must be positive"
        );

        let err = StageError::ArithmeticError("even root of negative".to_string());
        assert!(err.to_string().starts_with("Arithmetic error"));
    }
}
