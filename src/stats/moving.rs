//! 滑动窗口统计 - Moving Sum, Product, Average, Geometric Mean
//!
//! @yutiansut @quantaxis
//!
//! 窗口内原始值保存在 RingBuffer 中，累加量按淘汰值增量修正，
//! 每个元素 O(1) 更新，不做 O(W) 重算。
//! 累加量本身不舍入 (十进制加乘是精确的)，只在输出时按上下文舍入一次，
//! 否则被舍掉的低位在淘汰大数后无法找回。

use bigdecimal::BigDecimal;
use num_integer::Integer;
use num_traits::{One, Zero};

use super::{require_window, Accumulator, AccumulatorSpec};
use crate::buffer::RingBuffer;
use crate::math::{nth_root, MathContext};
use crate::Result;

// ═══════════════════════════════════════════════════════════════════════════
// MovingSum - 移动求和
// ═══════════════════════════════════════════════════════════════════════════

/// 移动求和 (窗口 > 1，默认输出部分窗口)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovingSum {
    window_size: usize,
    include_partial: bool,
}

impl MovingSum {
    pub fn new(window_size: usize) -> Result<Self> {
        require_window("moving_sum", window_size, 2)?;
        Ok(Self {
            window_size,
            include_partial: true,
        })
    }

    pub fn include_partial(mut self, include: bool) -> Self {
        self.include_partial = include;
        self
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }
}

/// 移动求和状态
#[derive(Debug, Clone)]
pub struct MovingSumState {
    window: RingBuffer<BigDecimal>,
    sum: BigDecimal,
    include_partial: bool,
}

impl MovingSumState {
    fn new(window_size: usize, include_partial: bool) -> Self {
        Self {
            window: RingBuffer::new(window_size),
            sum: BigDecimal::zero(),
            include_partial,
        }
    }

    /// 淘汰旧值、加入新值 (精确)
    fn shift(&mut self, value: BigDecimal) {
        self.sum += &value;
        if let Some(evicted) = self.window.push(value) {
            self.sum -= evicted;
        }
    }

    pub fn sum(&self) -> &BigDecimal {
        &self.sum
    }

    pub fn count(&self) -> usize {
        self.window.len()
    }
}

impl Accumulator for MovingSumState {
    fn add(&mut self, value: BigDecimal, _ctx: &MathContext) -> Result<()> {
        self.shift(value);
        Ok(())
    }

    fn can_calculate(&self) -> bool {
        self.include_partial || self.window.is_full()
    }

    fn calculate(&self, ctx: &MathContext) -> Result<BigDecimal> {
        Ok(ctx.round(&self.sum))
    }
}

impl AccumulatorSpec for MovingSum {
    type Acc = MovingSumState;

    fn name(&self) -> &'static str {
        "moving_sum"
    }

    fn create(&self) -> Self::Acc {
        MovingSumState::new(self.window_size, self.include_partial)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// MovingAverage - 简单移动平均
// ═══════════════════════════════════════════════════════════════════════════

/// 简单移动平均 (窗口 > 1，默认不输出部分窗口)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovingAverage {
    window_size: usize,
    include_partial: bool,
}

impl MovingAverage {
    pub fn new(window_size: usize) -> Result<Self> {
        require_window("moving_average", window_size, 2)?;
        Ok(Self {
            window_size,
            include_partial: false,
        })
    }

    pub fn include_partial(mut self, include: bool) -> Self {
        self.include_partial = include;
        self
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }
}

/// 移动平均状态：sum / count，count 以窗口大小为上限
#[derive(Debug, Clone)]
pub struct MovingAverageState {
    inner: MovingSumState,
}

impl Accumulator for MovingAverageState {
    fn add(&mut self, value: BigDecimal, _ctx: &MathContext) -> Result<()> {
        self.inner.shift(value);
        Ok(())
    }

    fn can_calculate(&self) -> bool {
        self.inner.can_calculate()
    }

    fn calculate(&self, ctx: &MathContext) -> Result<BigDecimal> {
        let count = BigDecimal::from(self.inner.count() as u64);
        ctx.divide(self.inner.sum(), &count)
    }
}

impl AccumulatorSpec for MovingAverage {
    type Acc = MovingAverageState;

    fn name(&self) -> &'static str {
        "moving_average"
    }

    fn create(&self) -> Self::Acc {
        MovingAverageState {
            inner: MovingSumState::new(self.window_size, self.include_partial),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// 窗口乘积 (乘积 / 几何平均共用)
// ═══════════════════════════════════════════════════════════════════════════

/// 窗口非零值的乘积 + 零值计数
///
/// 窗口内存在零时结果直接为零，淘汰零值时只修正计数，
/// 因此永远不会除以零。
#[derive(Debug, Clone)]
pub struct WindowedProduct {
    window: RingBuffer<BigDecimal>,
    product: BigDecimal,
    zeros: usize,
    include_partial: bool,
}

impl WindowedProduct {
    fn new(window_size: usize, include_partial: bool) -> Self {
        Self {
            window: RingBuffer::new(window_size),
            product: BigDecimal::one(),
            zeros: 0,
            include_partial,
        }
    }

    fn shift(&mut self, value: BigDecimal) {
        match self.window.push(value.clone()) {
            Some(evicted) if evicted.is_zero() => self.zeros -= 1,
            Some(evicted) => self.divide_out(&evicted),
            None => {}
        }
        if value.is_zero() {
            self.zeros += 1;
        } else {
            self.product *= value;
        }
    }

    /// 精确除去一个曾经乘入的非零值
    ///
    /// 乘积尾数是各值尾数之积，通常可整除；否则按窗口内其余值重算。
    fn divide_out(&mut self, evicted: &BigDecimal) {
        let (mantissa, scale) = self.product.as_bigint_and_exponent();
        let (divisor, divisor_scale) = evicted.as_bigint_and_exponent();
        let (quotient, remainder) = mantissa.div_rem(&divisor);
        if remainder.is_zero() {
            self.product = BigDecimal::new(quotient, scale - divisor_scale);
            return;
        }
        // 最新值此时已在窗口中，但尚未乘入
        let retained = self.window.len().saturating_sub(1);
        self.product = self
            .window
            .iter()
            .take(retained)
            .filter(|v| !v.is_zero())
            .fold(BigDecimal::one(), |acc, v| acc * v);
    }

    fn can_calculate(&self) -> bool {
        self.include_partial || self.window.is_full()
    }

    /// 窗口内的零值数量
    pub fn zeros(&self) -> usize {
        self.zeros
    }

    pub fn count(&self) -> usize {
        self.window.len()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// MovingProduct - 移动乘积
// ═══════════════════════════════════════════════════════════════════════════

/// 移动乘积 (窗口 ≥ 1，默认不输出部分窗口)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovingProduct {
    window_size: usize,
    include_partial: bool,
}

impl MovingProduct {
    pub fn new(window_size: usize) -> Result<Self> {
        require_window("moving_product", window_size, 1)?;
        Ok(Self {
            window_size,
            include_partial: false,
        })
    }

    pub fn include_partial(mut self, include: bool) -> Self {
        self.include_partial = include;
        self
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }
}

/// 移动乘积状态
#[derive(Debug, Clone)]
pub struct MovingProductState {
    inner: WindowedProduct,
}

impl Accumulator for MovingProductState {
    fn add(&mut self, value: BigDecimal, _ctx: &MathContext) -> Result<()> {
        self.inner.shift(value);
        Ok(())
    }

    fn can_calculate(&self) -> bool {
        self.inner.can_calculate()
    }

    fn calculate(&self, ctx: &MathContext) -> Result<BigDecimal> {
        if self.inner.zeros > 0 {
            return Ok(BigDecimal::zero());
        }
        Ok(ctx.round(&self.inner.product))
    }
}

impl AccumulatorSpec for MovingProduct {
    type Acc = MovingProductState;

    fn name(&self) -> &'static str {
        "moving_product"
    }

    fn create(&self) -> Self::Acc {
        MovingProductState {
            inner: WindowedProduct::new(self.window_size, self.include_partial),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// MovingGeometricMean - 移动几何平均
// ═══════════════════════════════════════════════════════════════════════════

/// 移动几何平均 (窗口 > 1，默认输出部分窗口)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovingGeometricMean {
    window_size: usize,
    include_partial: bool,
}

impl MovingGeometricMean {
    pub fn new(window_size: usize) -> Result<Self> {
        require_window("moving_geometric_mean", window_size, 2)?;
        Ok(Self {
            window_size,
            include_partial: true,
        })
    }

    pub fn include_partial(mut self, include: bool) -> Self {
        self.include_partial = include;
        self
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }
}

/// 移动几何平均状态
#[derive(Debug, Clone)]
pub struct MovingGeometricMeanState {
    inner: WindowedProduct,
}

impl Accumulator for MovingGeometricMeanState {
    fn add(&mut self, value: BigDecimal, _ctx: &MathContext) -> Result<()> {
        self.inner.shift(value);
        Ok(())
    }

    fn can_calculate(&self) -> bool {
        self.inner.can_calculate()
    }

    fn calculate(&self, ctx: &MathContext) -> Result<BigDecimal> {
        if self.inner.zeros > 0 || self.inner.count() == 0 {
            return Ok(BigDecimal::zero());
        }
        nth_root(&self.inner.product, self.inner.count() as u64, ctx)
    }
}

impl AccumulatorSpec for MovingGeometricMean {
    type Acc = MovingGeometricMeanState;

    fn name(&self) -> &'static str {
        "moving_geometric_mean"
    }

    fn create(&self) -> Self::Acc {
        MovingGeometricMeanState {
            inner: WindowedProduct::new(self.window_size, self.include_partial),
        }
    }
}
