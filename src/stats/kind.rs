//! 动态统计类型 - 由配置在运行时选择统计量
//!
//! @yutiansut @quantaxis

use serde::{Deserialize, Serialize};

use super::{
    Accumulator, AccumulatorSpec, DeviationMode, ExponentialMovingAverage, Median, MovingAverage,
    MovingGeometricMean, MovingProduct, MovingSum, RunningAverage, RunningGeometricMean,
    RunningProduct, RunningSum, StandardDeviation,
};
use crate::{Result, StageError};

/// 统计量种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatKind {
    MovingSum,
    MovingProduct,
    MovingAverage,
    MovingMedian,
    MovingGeometricMean,
    MovingStandardDeviation,
    RunningSum,
    RunningProduct,
    RunningAverage,
    RunningMedian,
    RunningGeometricMean,
    RunningStandardDeviation,
    ExponentialMovingAverage,
}

impl StatKind {
    pub fn is_windowed(self) -> bool {
        matches!(
            self,
            StatKind::MovingSum
                | StatKind::MovingProduct
                | StatKind::MovingAverage
                | StatKind::MovingMedian
                | StatKind::MovingGeometricMean
                | StatKind::MovingStandardDeviation
        )
    }

    /// 按参数构建统计量
    pub fn build(self, params: &StatParams) -> Result<AnyStat> {
        let window = || {
            params.window_size.ok_or_else(|| {
                StageError::ConfigError(format!("{:?} requires window_size", self))
            })
        };
        let partial = |default: bool| params.include_partial.unwrap_or(default);

        let stat = match self {
            StatKind::MovingSum => AnyStat::MovingSum(MovingSum::new(window()?)?.include_partial(partial(true))),
            StatKind::MovingProduct => {
                AnyStat::MovingProduct(MovingProduct::new(window()?)?.include_partial(partial(false)))
            }
            StatKind::MovingAverage => {
                AnyStat::MovingAverage(MovingAverage::new(window()?)?.include_partial(partial(false)))
            }
            StatKind::MovingMedian => AnyStat::Median(Median::moving(window()?)?.include_partial(partial(false))),
            StatKind::MovingGeometricMean => AnyStat::MovingGeometricMean(
                MovingGeometricMean::new(window()?)?.include_partial(partial(true)),
            ),
            StatKind::MovingStandardDeviation => AnyStat::StandardDeviation(
                StandardDeviation::moving(params.mode, window()?)?.include_partial(partial(false)),
            ),
            StatKind::RunningSum => AnyStat::RunningSum(RunningSum),
            StatKind::RunningProduct => AnyStat::RunningProduct(RunningProduct),
            StatKind::RunningAverage => AnyStat::RunningAverage(RunningAverage),
            StatKind::RunningMedian => AnyStat::Median(Median::running()),
            StatKind::RunningGeometricMean => AnyStat::RunningGeometricMean(RunningGeometricMean),
            StatKind::RunningStandardDeviation => {
                AnyStat::StandardDeviation(StandardDeviation::running(params.mode))
            }
            StatKind::ExponentialMovingAverage => match (params.alpha, params.periods) {
                (Some(alpha), None) => AnyStat::Ema(ExponentialMovingAverage::with_alpha(alpha)?),
                (None, Some(periods)) => AnyStat::Ema(ExponentialMovingAverage::with_periods(periods)?),
                _ => {
                    return Err(StageError::ConfigError(
                        "exponential_moving_average requires exactly one of alpha or periods".to_string(),
                    ))
                }
            },
        };
        Ok(stat)
    }
}

/// 构建参数
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatParams {
    pub window_size: Option<usize>,
    pub include_partial: Option<bool>,
    pub mode: DeviationMode,
    pub alpha: Option<f64>,
    pub periods: Option<u32>,
}

/// 已校验的任意统计量
#[derive(Debug, Clone, PartialEq)]
pub enum AnyStat {
    MovingSum(MovingSum),
    MovingProduct(MovingProduct),
    MovingAverage(MovingAverage),
    MovingGeometricMean(MovingGeometricMean),
    Median(Median),
    StandardDeviation(StandardDeviation),
    RunningSum(RunningSum),
    RunningProduct(RunningProduct),
    RunningAverage(RunningAverage),
    RunningGeometricMean(RunningGeometricMean),
    Ema(ExponentialMovingAverage),
}

/// 动态分发的累加器
pub type DynAccumulator = Box<dyn Accumulator + Send>;

fn boxed<A: Accumulator + Send + 'static>(acc: A) -> DynAccumulator {
    Box::new(acc)
}

impl AccumulatorSpec for AnyStat {
    type Acc = DynAccumulator;

    fn name(&self) -> &'static str {
        match self {
            AnyStat::MovingSum(s) => s.name(),
            AnyStat::MovingProduct(s) => s.name(),
            AnyStat::MovingAverage(s) => s.name(),
            AnyStat::MovingGeometricMean(s) => s.name(),
            AnyStat::Median(s) => s.name(),
            AnyStat::StandardDeviation(s) => s.name(),
            AnyStat::RunningSum(s) => s.name(),
            AnyStat::RunningProduct(s) => s.name(),
            AnyStat::RunningAverage(s) => s.name(),
            AnyStat::RunningGeometricMean(s) => s.name(),
            AnyStat::Ema(s) => s.name(),
        }
    }

    fn create(&self) -> Self::Acc {
        match self {
            AnyStat::MovingSum(s) => boxed(s.create()),
            AnyStat::MovingProduct(s) => boxed(s.create()),
            AnyStat::MovingAverage(s) => boxed(s.create()),
            AnyStat::MovingGeometricMean(s) => boxed(s.create()),
            AnyStat::Median(s) => boxed(s.create()),
            AnyStat::StandardDeviation(s) => boxed(s.create()),
            AnyStat::RunningSum(s) => boxed(s.create()),
            AnyStat::RunningProduct(s) => boxed(s.create()),
            AnyStat::RunningAverage(s) => boxed(s.create()),
            AnyStat::RunningGeometricMean(s) => boxed(s.create()),
            AnyStat::Ema(s) => boxed(s.create()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::{collect, Stage};
    use crate::stats::test_support::*;

    fn windowed(size: usize) -> StatParams {
        StatParams {
            window_size: Some(size),
            ..StatParams::default()
        }
    }

    #[test]
    fn test_build_matches_static_stage() {
        let dynamic = StatKind::MovingSum.build(&windowed(2)).unwrap().into_stage();
        assert_eq!(dynamic.name(), "moving_sum");
        let out = collect(&dynamic, some(&["1", "2", "3"])).unwrap();
        assert_eq!(out, decs(&["1", "3", "5"]));
    }

    #[test]
    fn test_partial_override() {
        let params = StatParams {
            include_partial: Some(true),
            ..windowed(2)
        };
        let stage = StatKind::MovingAverage.build(&params).unwrap().into_stage();
        let out = collect(&stage, some(&["2", "4"])).unwrap();
        assert_eq!(out, decs(&["2", "3"]));
    }

    #[test]
    fn test_missing_window() {
        let err = StatKind::MovingMedian.build(&StatParams::default()).unwrap_err();
        assert!(matches!(err, StageError::ConfigError(_)));
        assert!(StatKind::RunningMedian.build(&StatParams::default()).is_ok());
        assert!(!StatKind::RunningMedian.is_windowed());
    }

    #[test]
    fn test_ema_parameters() {
        let both = StatParams {
            alpha: Some(0.5),
            periods: Some(3),
            ..StatParams::default()
        };
        assert!(StatKind::ExponentialMovingAverage.build(&both).is_err());

        let periods = StatParams {
            periods: Some(3),
            ..StatParams::default()
        };
        let stage = StatKind::ExponentialMovingAverage.build(&periods).unwrap().into_stage();
        let out = collect(&stage, some(&["10.5", "15.2"])).unwrap();
        assert_eq!(out, decs(&["10.5", "12.85"]));
    }

    #[test]
    fn test_sample_mode() {
        let params = StatParams {
            mode: DeviationMode::Sample,
            ..StatParams::default()
        };
        let stage = StatKind::RunningStandardDeviation.build(&params).unwrap().into_stage();
        let out = collect(&stage, some(&["1", "2", "3"])).unwrap();
        assert_eq!(out.last(), Some(&dec("1")));
    }
}
