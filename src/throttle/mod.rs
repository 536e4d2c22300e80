//! 限流模块
//!
//! @yutiansut @quantaxis
//!
//! - 时钟 (clock) - 可注入的单调时钟
//! - 限流器 (limiter) - 周期许可状态机
//! - 算子 (stage) - throttle / debounce
//!
//! 整个库中唯一的阻塞点是 Pause 策略的等待。

pub mod clock;
pub mod limiter;
pub mod stage;

pub use clock::*;
pub use limiter::*;
pub use stage::*;
