//! 高精度十进制运算
//!
//! @yutiansut @quantaxis
//!
//! - 精度上下文 (context) - 有效位数与舍入规则
//! - 幂与开方 (root) - 快速幂、Newton-Raphson n 次方根

pub mod context;
pub mod root;

pub use context::{MathContext, RoundingRule};
pub use root::{nth_root, pow, sqrt};
