//! 配置管理模块
//!
//! @yutiansut @quantaxis
//!
//! TOML 配置文件 → 精度上下文 / 限流算子 / 数值统计算子。
//! 配置文件格式示例：
//!
//! ```toml
//! [math]
//! precision = 16
//! rounding = "half_even"
//!
//! [throttle]
//! policy = "drop"
//! allowed = 100
//! period_ms = 1000
//!
//! [[stats]]
//! kind = "moving_average"
//! window_size = 20
//! nulls = "0"
//! ```

use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::math::{MathContext, RoundingRule};
use crate::stats::{AccumulatorSpec, AnyStat, DeviationMode, NullPolicy, NumericStage, StatKind, StatParams};
use crate::throttle::{Clock, LimitPolicy, Throttle};
use crate::{Result, StageError};

/// 顶层配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QaStreamConfig {
    #[serde(default)]
    pub math: MathConfig,
    #[serde(default)]
    pub throttle: Option<ThrottleConfig>,
    #[serde(default)]
    pub stats: Vec<MovingStatConfig>,
}

impl QaStreamConfig {
    /// 从文件加载配置
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            StageError::ConfigLoadError(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        let config = Self::from_toml_str(&content)?;
        log::info!(
            "loaded config from {} ({} stats)",
            path.display(),
            config.stats.len()
        );
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| StageError::ConfigLoadError(format!("Failed to parse config: {}", e)))
    }

    /// 按 `math` 段构建全部统计算子
    pub fn build_stats(&self) -> Result<Vec<NumericStage<AnyStat>>> {
        let ctx = self.math.to_context();
        self.stats.iter().map(|stat| stat.build(&ctx)).collect()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// 精度
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MathConfig {
    #[serde(default = "default_precision")]
    pub precision: u64,
    #[serde(default)]
    pub rounding: RoundingRule,
}

fn default_precision() -> u64 {
    MathContext::DECIMAL64.precision
}

impl Default for MathConfig {
    fn default() -> Self {
        Self {
            precision: default_precision(),
            rounding: RoundingRule::default(),
        }
    }
}

impl MathConfig {
    pub fn to_context(&self) -> MathContext {
        MathContext::new(self.precision, self.rounding)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// 限流
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThrottleConfig {
    pub policy: LimitPolicy,
    pub allowed: u32,
    pub period_ms: u64,
}

impl ThrottleConfig {
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }

    /// 构建限流算子，时钟由调用方注入
    pub fn build<T>(&self, clock: Arc<dyn Clock>) -> Result<Throttle<T>> {
        Throttle::new(self.policy, self.allowed, self.period(), clock)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// 数值统计
// ═══════════════════════════════════════════════════════════════════════════

/// 单个统计算子配置
///
/// `nulls` 为 `"skip"` 时跳过空值，否则按十进制数解析为替换值。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovingStatConfig {
    pub kind: StatKind,
    #[serde(default)]
    pub window_size: Option<usize>,
    #[serde(default)]
    pub include_partial: Option<bool>,
    #[serde(default = "default_nulls")]
    pub nulls: String,
    #[serde(default)]
    pub mode: DeviationMode,
    #[serde(default)]
    pub alpha: Option<f64>,
    #[serde(default)]
    pub periods: Option<u32>,
}

fn default_nulls() -> String {
    "skip".to_string()
}

impl MovingStatConfig {
    pub fn new(kind: StatKind) -> Self {
        Self {
            kind,
            window_size: None,
            include_partial: None,
            nulls: default_nulls(),
            mode: DeviationMode::default(),
            alpha: None,
            periods: None,
        }
    }

    pub fn null_policy(&self) -> Result<NullPolicy> {
        let nulls = self.nulls.trim();
        if nulls.eq_ignore_ascii_case("skip") {
            return Ok(NullPolicy::Skip);
        }
        BigDecimal::from_str(nulls)
            .map(NullPolicy::Replace)
            .map_err(|e| {
                StageError::ConfigError(format!("invalid null replacement {:?}: {}", self.nulls, e))
            })
    }

    pub fn build(&self, ctx: &MathContext) -> Result<NumericStage<AnyStat>> {
        let params = StatParams {
            window_size: self.window_size,
            include_partial: self.include_partial,
            mode: self.mode,
            alpha: self.alpha,
            periods: self.periods,
        };
        let stage = self
            .kind
            .build(&params)?
            .into_stage()
            .with_nulls(self.null_policy()?)
            .with_math_context(*ctx);
        log::debug!("built {:?} stage with {:?}", self.kind, ctx);
        Ok(stage)
    }
}
