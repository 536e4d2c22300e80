//! 累计统计 - Sum, Product, Average, Geometric Mean, EMA
//!
//! @yutiansut @quantaxis
//!
//! 不设窗口，每个元素到来后输出截至当前的累计值。

use std::str::FromStr;

use bigdecimal::BigDecimal;
use num_traits::{One, Zero};

use super::{Accumulator, AccumulatorSpec};
use crate::math::{nth_root, MathContext};
use crate::{Result, StageError};

// ═══════════════════════════════════════════════════════════════════════════
// RunningSum - 累计求和
// ═══════════════════════════════════════════════════════════════════════════

/// 累计求和
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunningSum;

#[derive(Debug, Clone, Default)]
pub struct RunningSumState {
    sum: BigDecimal,
}

impl Accumulator for RunningSumState {
    fn add(&mut self, value: BigDecimal, ctx: &MathContext) -> Result<()> {
        self.sum = ctx.add(&self.sum, &value);
        Ok(())
    }

    fn calculate(&self, _ctx: &MathContext) -> Result<BigDecimal> {
        Ok(self.sum.clone())
    }
}

impl AccumulatorSpec for RunningSum {
    type Acc = RunningSumState;

    fn name(&self) -> &'static str {
        "running_sum"
    }

    fn create(&self) -> Self::Acc {
        RunningSumState::default()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// RunningProduct - 累计乘积
// ═══════════════════════════════════════════════════════════════════════════

/// 累计乘积
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunningProduct;

#[derive(Debug, Clone)]
pub struct RunningProductState {
    product: BigDecimal,
}

impl Accumulator for RunningProductState {
    fn add(&mut self, value: BigDecimal, ctx: &MathContext) -> Result<()> {
        self.product = ctx.multiply(&self.product, &value);
        Ok(())
    }

    fn calculate(&self, _ctx: &MathContext) -> Result<BigDecimal> {
        Ok(self.product.clone())
    }
}

impl AccumulatorSpec for RunningProduct {
    type Acc = RunningProductState;

    fn name(&self) -> &'static str {
        "running_product"
    }

    fn create(&self) -> Self::Acc {
        RunningProductState {
            product: BigDecimal::one(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// RunningAverage - 累计均值
// ═══════════════════════════════════════════════════════════════════════════

/// 累计均值：avg += (x - avg) / n
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunningAverage;

#[derive(Debug, Clone, Default)]
pub struct RunningAverageState {
    count: u64,
    average: BigDecimal,
}

impl Accumulator for RunningAverageState {
    fn add(&mut self, value: BigDecimal, ctx: &MathContext) -> Result<()> {
        self.count += 1;
        let step = ctx.divide(&(&value - &self.average), &BigDecimal::from(self.count))?;
        self.average = ctx.add(&self.average, &step);
        Ok(())
    }

    fn calculate(&self, _ctx: &MathContext) -> Result<BigDecimal> {
        Ok(self.average.clone())
    }
}

impl AccumulatorSpec for RunningAverage {
    type Acc = RunningAverageState;

    fn name(&self) -> &'static str {
        "running_average"
    }

    fn create(&self) -> Self::Acc {
        RunningAverageState::default()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// RunningGeometricMean - 累计几何平均
// ═══════════════════════════════════════════════════════════════════════════

/// 累计几何平均：n 次根 (x1 · x2 · … · xn)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunningGeometricMean;

#[derive(Debug, Clone)]
pub struct RunningGeometricMeanState {
    count: u64,
    product: BigDecimal,
}

impl Accumulator for RunningGeometricMeanState {
    fn add(&mut self, value: BigDecimal, ctx: &MathContext) -> Result<()> {
        self.count += 1;
        self.product = ctx.multiply(&self.product, &value);
        Ok(())
    }

    fn calculate(&self, ctx: &MathContext) -> Result<BigDecimal> {
        if self.count == 0 {
            return Ok(BigDecimal::zero());
        }
        nth_root(&self.product, self.count, ctx)
    }
}

impl AccumulatorSpec for RunningGeometricMean {
    type Acc = RunningGeometricMeanState;

    fn name(&self) -> &'static str {
        "running_geometric_mean"
    }

    fn create(&self) -> Self::Acc {
        RunningGeometricMeanState {
            count: 0,
            product: BigDecimal::one(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// ExponentialMovingAverage - 指数移动平均
// ═══════════════════════════════════════════════════════════════════════════

/// 指数移动平均
///
/// `ema = x · α + ema · (1 - α)`，第一个值直接作为初始均值。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExponentialMovingAverage {
    alpha: BigDecimal,
}

impl ExponentialMovingAverage {
    /// α ∈ (0, 1)，两端都不包含
    pub fn with_alpha(alpha: f64) -> Result<Self> {
        if !(alpha > 0.0 && alpha < 1.0) {
            return Err(StageError::ConfigError(format!(
                "alpha must be between 0.0 and 1.0, exclusive, got {}",
                alpha
            )));
        }
        let alpha = BigDecimal::from_str(&alpha.to_string())
            .map_err(|e| StageError::ConfigError(format!("alpha {}: {}", alpha, e)))?;
        Ok(Self { alpha })
    }

    /// α = 2 / (periods + 1)，periods > 1
    pub fn with_periods(periods: u32) -> Result<Self> {
        if periods <= 1 {
            return Err(StageError::ConfigError(format!(
                "periods must be greater than 1, got {}",
                periods
            )));
        }
        Self::with_alpha(2.0 / (periods as f64 + 1.0))
    }

    pub fn alpha(&self) -> &BigDecimal {
        &self.alpha
    }
}

#[derive(Debug, Clone)]
pub struct ExponentialMovingAverageState {
    alpha: BigDecimal,
    one_minus_alpha: BigDecimal,
    ema: Option<BigDecimal>,
}

impl Accumulator for ExponentialMovingAverageState {
    fn add(&mut self, value: BigDecimal, ctx: &MathContext) -> Result<()> {
        let next = match self.ema.take() {
            None => value,
            Some(previous) => ctx.add(
                &ctx.multiply(&value, &self.alpha),
                &ctx.multiply(&previous, &self.one_minus_alpha),
            ),
        };
        self.ema = Some(next);
        Ok(())
    }

    fn can_calculate(&self) -> bool {
        self.ema.is_some()
    }

    fn calculate(&self, _ctx: &MathContext) -> Result<BigDecimal> {
        Ok(self.ema.clone().unwrap_or_else(BigDecimal::zero))
    }
}

impl AccumulatorSpec for ExponentialMovingAverage {
    type Acc = ExponentialMovingAverageState;

    fn name(&self) -> &'static str {
        "exponential_moving_average"
    }

    fn create(&self) -> Self::Acc {
        ExponentialMovingAverageState {
            alpha: self.alpha.clone(),
            one_minus_alpha: BigDecimal::one() - &self.alpha,
            ema: None,
        }
    }
}
