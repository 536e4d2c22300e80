//! 通用序列算子
//!
//! @yutiansut @quantaxis
//!
//! - 窗口 (window) - 固定大小 + 步长分组
//! - 末尾 (last) - 保留最后 N 个元素
//! - 校验 (ensure) - 顺序校验、长度校验
//! - 频次 (frequency) - 可分区合并的计数

pub mod ensure;
pub mod frequency;
pub mod last;
pub mod window;

pub use ensure::*;
pub use frequency::*;
pub use last::*;
pub use window::*;
