//! 标准差 - Welford 增量算法 (十进制)
//!
//! @yutiansut @quantaxis
//!
//! 增量更新：
//! - mean' = mean + (x - mean) / n
//! - d² += (x - mean') · (x - mean)
//!
//! 滑动窗口版本改为精确维护 Σx 与 Σx² (十进制加乘不舍入)，
//! 淘汰时精确扣除，输出时才按上下文舍入一次：
//! var = (n·Σx² - (Σx)²) / (n · 分母)
//! 总体 / 样本两种模式只影响分母 (n 或 n - 1)。

use bigdecimal::BigDecimal;
use num_traits::{Signed, Zero};
use serde::{Deserialize, Serialize};

use super::{require_window, Accumulator, AccumulatorSpec};
use crate::buffer::RingBuffer;
use crate::math::{sqrt, MathContext};
use crate::Result;

/// 方差分母模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviationMode {
    /// 总体 (÷ n)
    #[default]
    Population,
    /// 样本 (÷ n - 1)，n ≤ 1 时为 0
    Sample,
}

impl DeviationMode {
    /// n 个数据点对应的方差分母
    pub fn denominator(self, count: u64) -> u64 {
        match self {
            DeviationMode::Population => count,
            DeviationMode::Sample => count.saturating_sub(1),
        }
    }
}

/// 十进制 Welford 状态
#[derive(Debug, Clone, Default)]
pub struct DecimalWelford {
    /// 数据点数量
    pub count: u64,
    /// 均值
    pub mean: BigDecimal,
    /// d² = Σ(x - mean)²
    pub d_squared: BigDecimal,
}

impl DecimalWelford {
    pub fn new() -> Self {
        Self::default()
    }

    /// 增量加入
    pub fn update(&mut self, x: &BigDecimal, ctx: &MathContext) -> Result<()> {
        self.count += 1;
        let previous = self.mean.clone();
        let step = ctx.divide(&(x - &previous), &BigDecimal::from(self.count))?;
        self.mean = ctx.add(&previous, &step);
        let term = ctx.multiply(&(x - &self.mean), &(x - &previous));
        self.d_squared = ctx.add(&self.d_squared, &term);
        Ok(())
    }

    /// 方差 (舍入误差导致的负值截为 0)
    pub fn variance(&self, mode: DeviationMode, ctx: &MathContext) -> Result<BigDecimal> {
        let denominator = mode.denominator(self.count);
        if denominator == 0 || !self.d_squared.is_positive() {
            return Ok(BigDecimal::zero());
        }
        ctx.divide(&self.d_squared, &BigDecimal::from(denominator))
    }

    /// 标准差
    pub fn std(&self, mode: DeviationMode, ctx: &MathContext) -> Result<BigDecimal> {
        sqrt(&self.variance(mode, ctx)?, ctx)
    }
}

/// 滑动窗口精确矩：Σx、Σx²
///
/// 十进制加减乘不舍入，淘汰值可以精确扣除，不会留下累积误差。
#[derive(Debug, Clone)]
pub struct WindowMoments {
    window: RingBuffer<BigDecimal>,
    sum: BigDecimal,
    sum_squares: BigDecimal,
}

impl WindowMoments {
    pub fn new(window_size: usize) -> Self {
        Self {
            window: RingBuffer::new(window_size),
            sum: BigDecimal::zero(),
            sum_squares: BigDecimal::zero(),
        }
    }

    pub fn push(&mut self, x: BigDecimal) {
        self.sum += &x;
        self.sum_squares += &x * &x;
        if let Some(evicted) = self.window.push(x) {
            self.sum -= &evicted;
            self.sum_squares -= &evicted * &evicted;
        }
    }

    pub fn count(&self) -> u64 {
        self.window.len() as u64
    }

    pub fn is_full(&self) -> bool {
        self.window.is_full()
    }

    /// 方差，只在最后的除法处舍入
    pub fn variance(&self, mode: DeviationMode, ctx: &MathContext) -> Result<BigDecimal> {
        let count = self.count();
        let denominator = mode.denominator(count);
        if denominator == 0 {
            return Ok(BigDecimal::zero());
        }
        let n = BigDecimal::from(count);
        let spread = &n * &self.sum_squares - &self.sum * &self.sum;
        if !spread.is_positive() {
            return Ok(BigDecimal::zero());
        }
        ctx.divide(&spread, &(n * BigDecimal::from(denominator)))
    }
}

/// 标准差
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StandardDeviation {
    mode: DeviationMode,
    window_size: Option<usize>,
    include_partial: bool,
}

impl StandardDeviation {
    /// 累计标准差
    pub fn running(mode: DeviationMode) -> Self {
        Self {
            mode,
            window_size: None,
            include_partial: true,
        }
    }

    /// 滑动标准差 (窗口 > 1，默认不输出部分窗口)
    pub fn moving(mode: DeviationMode, window_size: usize) -> Result<Self> {
        require_window("moving_standard_deviation", window_size, 2)?;
        Ok(Self {
            mode,
            window_size: Some(window_size),
            include_partial: false,
        })
    }

    pub fn include_partial(mut self, include: bool) -> Self {
        self.include_partial = include;
        self
    }

    pub fn mode(&self) -> DeviationMode {
        self.mode
    }

    pub fn window_size(&self) -> Option<usize> {
        self.window_size
    }
}

/// 累计用 Welford，滑动窗口用精确矩
#[derive(Debug, Clone)]
pub enum Estimator {
    Running(DecimalWelford),
    Windowed(WindowMoments),
}

/// 标准差状态
#[derive(Debug, Clone)]
pub struct StandardDeviationState {
    mode: DeviationMode,
    estimator: Estimator,
    include_partial: bool,
}

impl StandardDeviationState {
    pub fn estimator(&self) -> &Estimator {
        &self.estimator
    }
}

impl Accumulator for StandardDeviationState {
    fn add(&mut self, value: BigDecimal, ctx: &MathContext) -> Result<()> {
        match &mut self.estimator {
            Estimator::Running(welford) => welford.update(&value, ctx),
            Estimator::Windowed(moments) => {
                moments.push(value);
                Ok(())
            }
        }
    }

    fn can_calculate(&self) -> bool {
        match &self.estimator {
            Estimator::Running(_) => true,
            Estimator::Windowed(moments) => self.include_partial || moments.is_full(),
        }
    }

    fn calculate(&self, ctx: &MathContext) -> Result<BigDecimal> {
        match &self.estimator {
            Estimator::Running(welford) => welford.std(self.mode, ctx),
            Estimator::Windowed(moments) => sqrt(&moments.variance(self.mode, ctx)?, ctx),
        }
    }
}

impl AccumulatorSpec for StandardDeviation {
    type Acc = StandardDeviationState;

    fn name(&self) -> &'static str {
        match self.window_size {
            Some(_) => "moving_standard_deviation",
            None => "running_standard_deviation",
        }
    }

    fn create(&self) -> Self::Acc {
        StandardDeviationState {
            mode: self.mode,
            estimator: match self.window_size {
                Some(size) => Estimator::Windowed(WindowMoments::new(size)),
                None => Estimator::Running(DecimalWelford::new()),
            },
            include_partial: self.include_partial,
        }
    }
}
