//! 精度上下文 - 有效位数 + 舍入规则
//!
//! @yutiansut @quantaxis
//!
//! 所有十进制运算结果按 `MathContext` 舍入到固定有效位数：
//! - `precision == 0` 表示不限精度 (加减乘精确，除法回退到 34 位)
//! - 舍入在整数尾数上完成，不经过浮点数

use std::cmp::Ordering;

use bigdecimal::BigDecimal;
use num_bigint::{BigInt, Sign};
use num_integer::Integer;
use num_traits::{Signed, Zero};
use serde::{Deserialize, Serialize};

use crate::{Result, StageError};

/// 不限精度时除法使用的有效位数
const UNLIMITED_DIVISION_PRECISION: u64 = 34;

/// 舍入规则
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingRule {
    /// 远离零
    Up,
    /// 趋向零 (截断)
    Down,
    /// 趋向正无穷
    Ceiling,
    /// 趋向负无穷
    Floor,
    /// 四舍五入 (.5 远离零)
    HalfUp,
    /// 五舍六入 (.5 趋向零)
    HalfDown,
    /// 银行家舍入 (.5 取偶)
    HalfEven,
}

impl Default for RoundingRule {
    fn default() -> Self {
        RoundingRule::HalfEven
    }
}

impl RoundingRule {
    /// 截断后的商是否需要向远离零方向进一位
    ///
    /// `remainder` 与被除数同号 (截断除法)，`divisor` 为正。
    fn rounds_away(self, quotient: &BigInt, remainder: &BigInt, divisor: &BigInt, negative: bool) -> bool {
        if remainder.is_zero() {
            return false;
        }
        let half = (remainder.abs() * 2u32).cmp(divisor);
        match self {
            RoundingRule::Up => true,
            RoundingRule::Down => false,
            RoundingRule::Ceiling => !negative,
            RoundingRule::Floor => negative,
            RoundingRule::HalfUp => half != Ordering::Less,
            RoundingRule::HalfDown => half == Ordering::Greater,
            RoundingRule::HalfEven => {
                half == Ordering::Greater || (half == Ordering::Equal && quotient.is_odd())
            }
        }
    }
}

/// 十进制精度上下文
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MathContext {
    /// 有效位数，0 表示不限
    pub precision: u64,
    /// 舍入规则
    pub rounding: RoundingRule,
}

impl Default for MathContext {
    fn default() -> Self {
        Self::DECIMAL64
    }
}

impl MathContext {
    /// 16 位有效数字，银行家舍入
    pub const DECIMAL64: MathContext = MathContext {
        precision: 16,
        rounding: RoundingRule::HalfEven,
    };

    /// 34 位有效数字，银行家舍入
    pub const DECIMAL128: MathContext = MathContext {
        precision: 34,
        rounding: RoundingRule::HalfEven,
    };

    /// 不限精度
    pub const UNLIMITED: MathContext = MathContext {
        precision: 0,
        rounding: RoundingRule::HalfUp,
    };

    pub fn new(precision: u64, rounding: RoundingRule) -> Self {
        Self { precision, rounding }
    }

    pub fn with_precision(precision: u64) -> Self {
        Self {
            precision,
            rounding: RoundingRule::HalfEven,
        }
    }

    pub fn is_unlimited(&self) -> bool {
        self.precision == 0
    }

    /// 按本上下文舍入
    pub fn round(&self, value: &BigDecimal) -> BigDecimal {
        if self.is_unlimited() {
            return value.clone();
        }
        let (mantissa, scale) = value.as_bigint_and_exponent();
        round_mantissa(mantissa, scale, self.precision, self.rounding)
    }

    pub fn add(&self, left: &BigDecimal, right: &BigDecimal) -> BigDecimal {
        self.round(&(left + right))
    }

    pub fn subtract(&self, left: &BigDecimal, right: &BigDecimal) -> BigDecimal {
        self.round(&(left - right))
    }

    pub fn multiply(&self, left: &BigDecimal, right: &BigDecimal) -> BigDecimal {
        self.round(&(left * right))
    }

    /// 除法，结果按本上下文舍入
    ///
    /// 不限精度时使用 34 位有效数字，避免无限循环小数。
    pub fn divide(&self, dividend: &BigDecimal, divisor: &BigDecimal) -> Result<BigDecimal> {
        if divisor.is_zero() {
            return Err(StageError::ArithmeticError("division by zero".to_string()));
        }
        if dividend.is_zero() {
            return Ok(BigDecimal::zero());
        }

        let precision = if self.is_unlimited() {
            UNLIMITED_DIVISION_PRECISION
        } else {
            self.precision
        };

        let (top, top_scale) = dividend.as_bigint_and_exponent();
        let (bottom, bottom_scale) = divisor.as_bigint_and_exponent();

        // 左移被除数，使商至少有 precision + 1 位
        let needed = precision as i64 + 1 + count_digits(&bottom) as i64 - count_digits(&top) as i64;
        let shift = needed.max(0) as u32;
        let shifted = top * ten_pow(shift);
        let negative = (shifted.sign() == Sign::Minus) != (bottom.sign() == Sign::Minus);

        let (mut quotient, remainder) = shifted.div_rem(&bottom);
        let mut scale = top_scale - bottom_scale + shift as i64;

        // 余数非零时追加一位粘滞位，保证舍入方向正确
        if !remainder.is_zero() {
            quotient = quotient * 10u32 + if negative { BigInt::from(-1) } else { BigInt::from(1) };
            scale += 1;
        }

        Ok(round_mantissa(quotient, scale, precision, self.rounding))
    }
}

/// 十进制位数 (0 记为 1 位)
pub(crate) fn count_digits(value: &BigInt) -> u64 {
    if value.is_zero() {
        return 1;
    }
    value.magnitude().to_str_radix(10).len() as u64
}

pub(crate) fn ten_pow(exponent: u32) -> BigInt {
    BigInt::from(10u32).pow(exponent)
}

fn round_mantissa(mantissa: BigInt, scale: i64, precision: u64, rule: RoundingRule) -> BigDecimal {
    let digits = count_digits(&mantissa);
    if digits <= precision {
        return BigDecimal::new(mantissa, scale);
    }

    let dropped = (digits - precision) as u32;
    let divisor = ten_pow(dropped);
    let negative = mantissa.sign() == Sign::Minus;
    let (mut quotient, remainder) = mantissa.div_rem(&divisor);

    if rule.rounds_away(&quotient, &remainder, &divisor, negative) {
        if negative {
            quotient -= 1u32;
        } else {
            quotient += 1u32;
        }
    }

    let mut scale = scale - dropped as i64;
    // 999.. 进位成 1000..，多出的一位必然是 0
    if count_digits(&quotient) > precision {
        quotient /= 10u32;
        scale -= 1;
    }
    BigDecimal::new(quotient, scale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn round(s: &str, precision: u64, rule: RoundingRule) -> BigDecimal {
        MathContext::new(precision, rule).round(&dec(s))
    }

    #[test]
    fn test_rounding_rules() {
        assert_eq!(round("2.5", 1, RoundingRule::HalfEven), dec("2"));
        assert_eq!(round("3.5", 1, RoundingRule::HalfEven), dec("4"));
        assert_eq!(round("2.5", 1, RoundingRule::HalfUp), dec("3"));
        assert_eq!(round("2.5", 1, RoundingRule::HalfDown), dec("2"));
        assert_eq!(round("2.51", 1, RoundingRule::HalfDown), dec("3"));
        assert_eq!(round("2.1", 1, RoundingRule::Up), dec("3"));
        assert_eq!(round("2.9", 1, RoundingRule::Down), dec("2"));
        assert_eq!(round("-2.1", 1, RoundingRule::Ceiling), dec("-2"));
        assert_eq!(round("-2.1", 1, RoundingRule::Floor), dec("-3"));
        assert_eq!(round("-2.5", 1, RoundingRule::HalfUp), dec("-3"));
    }

    #[test]
    fn test_round_carry_adds_no_digit() {
        let rounded = round("9.99", 2, RoundingRule::HalfUp);
        assert_eq!(rounded, dec("10"));
        let (mantissa, _) = rounded.as_bigint_and_exponent();
        assert_eq!(count_digits(&mantissa), 2);
    }

    #[test]
    fn test_round_short_value_untouched() {
        assert_eq!(round("1.25", 16, RoundingRule::HalfEven), dec("1.25"));
        assert_eq!(MathContext::UNLIMITED.round(&dec("1.23456789")), dec("1.23456789"));
    }

    #[test]
    fn test_divide() {
        let ctx = MathContext::DECIMAL64;
        assert_eq!(ctx.divide(&dec("1"), &dec("4")).unwrap(), dec("0.25"));
        assert_eq!(ctx.divide(&dec("1"), &dec("3")).unwrap(), dec("0.3333333333333333"));
        assert_eq!(ctx.divide(&dec("2"), &dec("3")).unwrap(), dec("0.6666666666666667"));
        assert_eq!(ctx.divide(&dec("-2"), &dec("3")).unwrap(), dec("-0.6666666666666667"));
        assert_eq!(ctx.divide(&dec("100"), &dec("0.5")).unwrap(), dec("200"));
    }

    #[test]
    fn test_divide_half_even_tie() {
        // 0.125 精确落在两位有效数字的中点
        let ctx = MathContext::new(2, RoundingRule::HalfEven);
        assert_eq!(ctx.divide(&dec("1"), &dec("8")).unwrap(), dec("0.12"));
        let ctx = MathContext::new(2, RoundingRule::HalfUp);
        assert_eq!(ctx.divide(&dec("1"), &dec("8")).unwrap(), dec("0.13"));
    }

    #[test]
    fn test_divide_by_zero() {
        let err = MathContext::DECIMAL64.divide(&dec("1"), &dec("0")).unwrap_err();
        assert!(matches!(err, StageError::ArithmeticError(_)));
    }

    #[test]
    fn test_serde_names() {
        let text = toml::to_string(&MathContext::DECIMAL64).unwrap();
        assert!(text.contains("half_even"));
        let back: MathContext = toml::from_str(&text).unwrap();
        assert_eq!(back, MathContext::DECIMAL64);
    }
}
