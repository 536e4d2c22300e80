//! 数值统计算子模块
//!
//! @yutiansut @quantaxis
//!
//! 所有十进制统计算子共享同一套控制流 (NumericStage)：
//! 1. 空值按 `NullPolicy` 跳过或替换
//! 2. 值交给累加器 (Accumulator) 增量更新
//! 3. 累加器允许计算时向下游推送结果
//!
//! 各统计量只需提供一个累加器策略：
//! - 滑动窗口 (moving) - 求和、乘积、均值、几何平均
//! - 中位数 (median) - 滑动 / 累计
//! - 标准差 (deviation) - Welford 增量方差，支持窗口淘汰
//! - 累计量 (running) - 求和、乘积、均值、几何平均、指数移动平均
//! - 动态类型 (kind) - 由配置构建的统计量
//! - 滑动最值 (extrema) - 基于单调队列的通用最值算子

pub mod deviation;
pub mod extrema;
pub mod kind;
pub mod median;
pub mod moving;
pub mod running;

pub use deviation::*;
pub use extrema::*;
pub use kind::*;
pub use median::*;
pub use moving::*;
pub use running::*;

use bigdecimal::BigDecimal;
use num_traits::{One, Zero};

use crate::math::MathContext;
use crate::stage::{Sink, Stage};
use crate::{Result, StageError};

/// 累加器策略
///
/// 一个累加器对应一次运行的全部增量状态。
pub trait Accumulator {
    /// 增量加入一个值
    fn add(&mut self, value: BigDecimal, ctx: &MathContext) -> Result<()>;

    /// 当前是否应向下游输出 (部分窗口策略)
    fn can_calculate(&self) -> bool {
        true
    }

    /// 计算当前统计量
    fn calculate(&self, ctx: &MathContext) -> Result<BigDecimal>;
}

impl<A: Accumulator + ?Sized> Accumulator for Box<A> {
    fn add(&mut self, value: BigDecimal, ctx: &MathContext) -> Result<()> {
        (**self).add(value, ctx)
    }

    fn can_calculate(&self) -> bool {
        (**self).can_calculate()
    }

    fn calculate(&self, ctx: &MathContext) -> Result<BigDecimal> {
        (**self).calculate(ctx)
    }
}

/// 统计量配置：负责校验参数并创建累加器
pub trait AccumulatorSpec {
    type Acc: Accumulator;

    fn name(&self) -> &'static str;

    fn create(&self) -> Self::Acc;

    /// 包装为默认空值策略、DECIMAL64 精度的算子
    fn into_stage(self) -> NumericStage<Self>
    where
        Self: Sized,
    {
        NumericStage::new(self)
    }
}

/// 窗口大小校验
pub(crate) fn require_window(name: &str, window_size: usize, minimum: usize) -> Result<()> {
    if window_size < minimum {
        return Err(StageError::ConfigError(format!(
            "{}: window size must be at least {}, got {}",
            name, minimum, window_size
        )));
    }
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════
// 空值策略
// ═══════════════════════════════════════════════════════════════════════════

/// 空值处理策略，在值进入累加器之前生效
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum NullPolicy {
    /// 跳过 (不计入窗口)
    #[default]
    Skip,
    /// 替换为给定值
    Replace(BigDecimal),
}

impl NullPolicy {
    pub fn zero() -> Self {
        NullPolicy::Replace(BigDecimal::zero())
    }

    pub fn one() -> Self {
        NullPolicy::Replace(BigDecimal::one())
    }

    fn resolve(&self, element: Option<BigDecimal>) -> Option<BigDecimal> {
        match (element, self) {
            (Some(value), _) => Some(value),
            (None, NullPolicy::Skip) => None,
            (None, NullPolicy::Replace(replacement)) => Some(replacement.clone()),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// NumericStage
// ═══════════════════════════════════════════════════════════════════════════

/// 十进制统计算子
///
/// 输入为 `Option<BigDecimal>`，`None` 表示空值；顺序敏感，不支持 combine。
#[derive(Debug, Clone)]
pub struct NumericStage<K> {
    spec: K,
    nulls: NullPolicy,
    ctx: MathContext,
}

impl<K: AccumulatorSpec> NumericStage<K> {
    pub fn new(spec: K) -> Self {
        Self {
            spec,
            nulls: NullPolicy::Skip,
            ctx: MathContext::DECIMAL64,
        }
    }

    pub fn with_nulls(mut self, nulls: NullPolicy) -> Self {
        self.nulls = nulls;
        self
    }

    pub fn treat_null_as(self, replacement: BigDecimal) -> Self {
        self.with_nulls(NullPolicy::Replace(replacement))
    }

    pub fn treat_null_as_zero(self) -> Self {
        self.with_nulls(NullPolicy::zero())
    }

    pub fn with_math_context(mut self, ctx: MathContext) -> Self {
        self.ctx = ctx;
        self
    }

    pub fn spec(&self) -> &K {
        &self.spec
    }

    pub fn nulls(&self) -> &NullPolicy {
        &self.nulls
    }

    pub fn math_context(&self) -> &MathContext {
        &self.ctx
    }
}

impl<K: AccumulatorSpec> Stage for NumericStage<K> {
    type State = K::Acc;
    type Input = Option<BigDecimal>;
    type Output = BigDecimal;

    fn name(&self) -> &'static str {
        self.spec.name()
    }

    fn init(&self) -> Self::State {
        self.spec.create()
    }

    fn integrate<S>(
        &self,
        state: &mut Self::State,
        element: Option<BigDecimal>,
        sink: &mut S,
    ) -> Result<bool>
    where
        S: Sink<BigDecimal> + ?Sized,
    {
        if let Some(value) = self.nulls.resolve(element) {
            state.add(value, &self.ctx)?;
            if state.can_calculate() && !sink.is_rejecting() {
                sink.push(state.calculate(&self.ctx)?);
            }
        }
        Ok(!sink.is_rejecting())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use bigdecimal::BigDecimal;
    use std::str::FromStr;

    pub fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    pub fn some(values: &[&str]) -> Vec<Option<BigDecimal>> {
        values.iter().map(|v| Some(dec(v))).collect()
    }

    pub fn decs(values: &[&str]) -> Vec<BigDecimal> {
        values.iter().map(|v| dec(v)).collect()
    }
}
