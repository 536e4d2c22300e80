//! 中位数 - 滑动 / 累计
//!
//! @yutiansut @quantaxis
//!
//! 每个新元素都对当前序列的副本做一次完整排序：
//! 滑动版本 O(W log W)，累计版本 O(n log n)。
//! 偶数个元素时取中间两个值的平均。

use bigdecimal::BigDecimal;
use num_traits::Zero;

use super::{require_window, Accumulator, AccumulatorSpec};
use crate::buffer::RingBuffer;
use crate::math::MathContext;
use crate::Result;

/// 中位数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Median {
    window_size: Option<usize>,
    include_partial: bool,
}

impl Median {
    /// 滑动中位数 (窗口 ≥ 1，默认不输出部分窗口)
    pub fn moving(window_size: usize) -> Result<Self> {
        require_window("moving_median", window_size, 1)?;
        Ok(Self {
            window_size: Some(window_size),
            include_partial: false,
        })
    }

    /// 累计中位数
    pub fn running() -> Self {
        Self {
            window_size: None,
            include_partial: true,
        }
    }

    pub fn include_partial(mut self, include: bool) -> Self {
        self.include_partial = include;
        self
    }

    pub fn window_size(&self) -> Option<usize> {
        self.window_size
    }
}

#[derive(Debug, Clone)]
enum Series {
    Windowed(RingBuffer<BigDecimal>),
    Running(Vec<BigDecimal>),
}

/// 中位数状态
#[derive(Debug, Clone)]
pub struct MedianState {
    series: Series,
    include_partial: bool,
}

impl MedianState {
    fn sorted(&self) -> Vec<BigDecimal> {
        let mut copy: Vec<BigDecimal> = match &self.series {
            Series::Windowed(window) => window.iter().cloned().collect(),
            Series::Running(values) => values.clone(),
        };
        copy.sort();
        copy
    }
}

impl Accumulator for MedianState {
    fn add(&mut self, value: BigDecimal, _ctx: &MathContext) -> Result<()> {
        match &mut self.series {
            Series::Windowed(window) => {
                window.push(value);
            }
            Series::Running(values) => values.push(value),
        }
        Ok(())
    }

    fn can_calculate(&self) -> bool {
        match &self.series {
            Series::Windowed(window) => self.include_partial || window.is_full(),
            Series::Running(values) => !values.is_empty(),
        }
    }

    fn calculate(&self, ctx: &MathContext) -> Result<BigDecimal> {
        let sorted = self.sorted();
        let mid = sorted.len() / 2;
        match sorted.len() {
            0 => Ok(BigDecimal::zero()),
            n if n % 2 == 0 => {
                let pair = &sorted[mid - 1] + &sorted[mid];
                ctx.divide(&pair, &BigDecimal::from(2u32))
            }
            _ => Ok(sorted[mid].clone()),
        }
    }
}

impl AccumulatorSpec for Median {
    type Acc = MedianState;

    fn name(&self) -> &'static str {
        match self.window_size {
            Some(_) => "moving_median",
            None => "running_median",
        }
    }

    fn create(&self) -> Self::Acc {
        let series = match self.window_size {
            Some(size) => Series::Windowed(RingBuffer::new(size)),
            None => Series::Running(Vec::new()),
        };
        MedianState {
            series,
            include_partial: self.include_partial,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::collect;
    use crate::stats::test_support::*;

    #[test]
    fn test_moving_median_partial() {
        let stage = Median::moving(2).unwrap().include_partial(true).into_stage();
        let out = collect(&stage, some(&["1", "2", "3", "4"])).unwrap();
        assert_eq!(out, decs(&["1", "1.5", "2.5", "3.5"]));
    }

    #[test]
    fn test_moving_median_full_window_only() {
        let stage = Median::moving(3).unwrap().into_stage();
        let out = collect(&stage, some(&["5", "1", "3", "10", "2"])).unwrap();
        assert_eq!(out, decs(&["3", "3", "3"]));
    }

    #[test]
    fn test_moving_median_ignores_nulls() {
        let stage = Median::moving(3).unwrap().include_partial(true).into_stage();
        let input = vec![None, Some(dec("1")), Some(dec("2")), Some(dec("10"))];
        let out = collect(&stage, input).unwrap();
        assert_eq!(out, decs(&["1", "1.5", "2"]));
    }

    #[test]
    fn test_duplicates() {
        let stage = Median::moving(3).unwrap().include_partial(true).into_stage();
        let out = collect(&stage, some(&["2", "2", "2", "2", "2"])).unwrap();
        assert_eq!(out, decs(&["2", "2", "2", "2", "2"]));
    }

    #[test]
    fn test_running_median() {
        let stage = Median::running().into_stage();
        let out = collect(&stage, some(&["1", "2", "10", "20", "30"])).unwrap();
        assert_eq!(out, decs(&["1", "1.5", "2", "6", "10"]));
    }

    #[test]
    fn test_window_size_validation() {
        assert!(Median::moving(0).is_err());
        assert!(Median::moving(1).is_ok());
    }
}
