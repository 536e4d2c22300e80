// 集成测试公共工具

#![allow(dead_code)]

use std::str::FromStr;

use bigdecimal::BigDecimal;

/// 安装测试日志 (重复调用无副作用)
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn dec(s: &str) -> BigDecimal {
    BigDecimal::from_str(s).unwrap()
}

pub fn some(values: &[&str]) -> Vec<Option<BigDecimal>> {
    values.iter().map(|v| Some(dec(v))).collect()
}
