//! 缓冲区模块
//!
//! @yutiansut @quantaxis
//!
//! - 环形缓冲区 (ring_buffer) - 滑动窗口的原始元素存储
//! - 单调队列 (extrema) - O(1) 均摊的滑动最值

pub mod extrema;
pub mod ring_buffer;

pub use extrema::*;
pub use ring_buffer::*;
