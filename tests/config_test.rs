// 配置文件端到端测试
//
// TOML 文件 → QaStreamConfig → 数值统计算子 / 限流算子 → 驱动执行

mod common;

use std::io::Write;
use std::sync::Arc;

use qastream::config::QaStreamConfig;
use qastream::stats::StatKind;
use qastream::{collect, ManualClock, Stage, StageError};

use common::{dec, some};

const PIPELINE: &str = r#"
[math]
precision = 10

[throttle]
policy = "pause"
allowed = 1
period_ms = 50

[[stats]]
kind = "moving_geometric_mean"
window_size = 2
nulls = "1"

[[stats]]
kind = "moving_standard_deviation"
window_size = 3
mode = "sample"

[[stats]]
kind = "exponential_moving_average"
periods = 3
"#;

fn write_config(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_pipeline_from_file() {
    common::init_logger();

    let file = write_config(PIPELINE);
    let config = QaStreamConfig::load_from_file(file.path()).unwrap();
    let stages = config.build_stats().unwrap();
    assert_eq!(stages.len(), 3);
    assert_eq!(config.stats[1].kind, StatKind::MovingStandardDeviation);

    // 几何均值：空值按 1 处理
    let geo = &stages[0];
    assert_eq!(geo.name(), "moving_geometric_mean");
    let out = collect(geo, vec![Some(dec("4")), None, Some(dec("9"))]).unwrap();
    assert_eq!(out, vec![dec("4"), dec("2"), dec("3")]);

    // 样本标准差，窗口满后才输出
    let out = collect(&stages[1], some(&["2", "4", "6", "8"])).unwrap();
    assert_eq!(out, vec![dec("2"), dec("2")]);

    // periods = 3 → alpha = 0.5
    let out = collect(&stages[2], some(&["10", "20", "10"])).unwrap();
    assert_eq!(out, vec![dec("10"), dec("15"), dec("12.5")]);
}

#[test]
fn test_throttle_from_file() {
    let file = write_config(PIPELINE);
    let config = QaStreamConfig::load_from_file(file.path()).unwrap();
    let clock = ManualClock::new();
    let stage = config
        .throttle
        .expect("throttle section")
        .build::<&str>(Arc::new(clock.clone()))
        .unwrap();

    assert_eq!(collect(&stage, vec!["a", "b", "c"]).unwrap(), vec!["a", "b", "c"]);
    assert_eq!(clock.parks(), 2);
}

#[test]
fn test_bad_file_is_reported() {
    let file = write_config("[math]\nprecision = \"sixteen\"\n");
    let err = QaStreamConfig::load_from_file(file.path()).unwrap_err();
    assert!(matches!(err, StageError::ConfigLoadError(_)));

    let file = write_config("[[stats]]\nkind = \"moving_sum\"\nwindow_size = 1\n");
    let config = QaStreamConfig::load_from_file(file.path()).unwrap();
    assert!(matches!(config.build_stats(), Err(StageError::ConfigError(_))));
}
