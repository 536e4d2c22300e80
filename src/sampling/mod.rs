//! 采样模块
//!
//! @yutiansut @quantaxis
//!
//! - 随机源 (random) - 可注入、可共享的均匀整数随机源
//! - 蓄水池采样 (reservoir) - O(k) 内存的定长均匀采样
//! - 洗牌 (shuffle) - finish 时输出随机排列

pub mod random;
pub mod reservoir;
pub mod shuffle;

pub use random::*;
pub use reservoir::*;
pub use shuffle::*;
