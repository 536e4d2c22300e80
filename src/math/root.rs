//! 高精度幂与开方
//!
//! @yutiansut @quantaxis
//!
//! - pow: 二进制快速幂，每次乘法按上下文舍入
//! - nth_root: Newton-Raphson 迭代 `x' = ((n-1)x + a / x^(n-1)) / n`
//!   在目标精度 + 5 位的工作精度上进行，最后只舍入一次

use bigdecimal::BigDecimal;
use num_traits::{FromPrimitive, One, Signed, ToPrimitive, Zero};

use super::context::{count_digits, MathContext};
use crate::{Result, StageError};

/// 工作精度比目标精度多出的位数
const GUARD_DIGITS: u64 = 5;

/// 不限精度时开方使用的最小有效位数
const UNLIMITED_ROOT_PRECISION: u64 = 34;

/// 迭代上限，保证病态输入也能终止
const MAX_ITERATIONS: usize = 1_000;

/// `base^exponent`，二进制快速幂
pub fn pow(base: &BigDecimal, exponent: u64, ctx: &MathContext) -> BigDecimal {
    match exponent {
        0 => BigDecimal::one(),
        1 => base.clone(),
        _ => {
            let mut result = BigDecimal::one();
            let mut current = base.clone();
            let mut remaining = exponent;
            while remaining > 0 {
                if remaining & 1 == 1 {
                    result = ctx.multiply(&result, &current);
                }
                remaining >>= 1;
                if remaining > 0 {
                    current = ctx.multiply(&current, &current);
                }
            }
            result
        }
    }
}

/// `value` 的 n 次方根
///
/// # Errors
///
/// - `n == 0`
/// - 负数开偶次方
pub fn nth_root(value: &BigDecimal, n: u64, ctx: &MathContext) -> Result<BigDecimal> {
    if n == 0 {
        return Err(StageError::ArithmeticError("root index must be > 0".to_string()));
    }
    if value.is_zero() {
        return Ok(BigDecimal::zero());
    }
    let negative = value.is_negative();
    if negative && n % 2 == 0 {
        return Err(StageError::ArithmeticError(format!(
            "even root ({}) of negative value {} is not real",
            n, value
        )));
    }

    let abs = value.abs();
    let precision = if ctx.is_unlimited() {
        let (mantissa, _) = abs.as_bigint_and_exponent();
        count_digits(&mantissa).max(UNLIMITED_ROOT_PRECISION)
    } else {
        ctx.precision
    };
    let work = MathContext::new(precision + GUARD_DIGITS, ctx.rounding);
    let target = MathContext::new(precision, ctx.rounding);
    let eps = BigDecimal::new(1.into(), precision as i64);

    let n_dec = BigDecimal::from(n);
    let n_minus_one = BigDecimal::from(n - 1);
    let mut x = initial_guess(&abs, n, &work);
    let mut iterations = 0;

    while iterations < MAX_ITERATIONS {
        iterations += 1;
        let mut x_pow = pow(&x, n - 1, &work);
        if x_pow.is_zero() {
            x = BigDecimal::one();
            x_pow = BigDecimal::one();
        }
        let numerator = work.add(&work.multiply(&work.multiply(&x_pow, &x), &n_minus_one), &abs);
        let next = work.divide(&numerator, &work.multiply(&n_dec, &x_pow))?;
        let delta = (&next - &x).abs();
        x = next;

        // 按相对误差判断收敛，极小的根同样要迭代到目标精度
        if delta <= &eps * &x {
            break;
        }
    }

    log::trace!("nth_root(n={}) converged after {} iterations", n, iterations);

    let root = target.round(&x);
    Ok(if negative { -root } else { root })
}

/// 平方根
pub fn sqrt(value: &BigDecimal, ctx: &MathContext) -> Result<BigDecimal> {
    nth_root(value, 2, ctx)
}

/// f64 能直接开方的尾数根上限，超过时退回十的幂估计
const MAX_SCALED_INDEX: u64 = 300;

/// 浮点估计初值
///
/// 超出 f64 范围时把 `abs` 拆成 `s * 10^(k*n)`，`s` 落在 `[1, 10^n)`，
/// 用 `s` 的浮点根乘以 `10^k`，尾数的前几位仍然参与估计。
fn initial_guess(abs: &BigDecimal, n: u64, work: &MathContext) -> BigDecimal {
    let estimate = abs
        .to_f64()
        .and_then(|v| float_root(v, n))
        .filter(|seed| !seed.is_zero());
    if let Some(seed) = estimate {
        return work.round(&seed);
    }

    let (mantissa, scale) = abs.as_bigint_and_exponent();
    let magnitude = count_digits(&mantissa) as i64 - scale - 1;
    let index = n.min(i64::MAX as u64) as i64;
    let k = magnitude.div_euclid(index);
    let power_of_ten = BigDecimal::new(1.into(), -k);

    let scaled_seed = if n <= MAX_SCALED_INDEX {
        k.checked_mul(index)
            .and_then(|shift| scale.checked_add(shift))
            .and_then(|scaled_exp| BigDecimal::new(mantissa, scaled_exp).to_f64())
            .and_then(|v| float_root(v, n))
    } else {
        None
    };

    match scaled_seed {
        Some(seed) if !seed.is_zero() => work.round(&(seed * power_of_ten)),
        _ => power_of_ten,
    }
}

fn float_root(v: f64, n: u64) -> Option<BigDecimal> {
    let r = v.powf(1.0 / n as f64);
    if r.is_finite() && r > 0.0 {
        BigDecimal::from_f64(r)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::RoundingRule;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn root(s: &str, n: u64) -> BigDecimal {
        nth_root(&dec(s), n, &MathContext::DECIMAL64).unwrap()
    }

    #[test]
    fn test_exact_roots() {
        assert_eq!(root("16", 2), dec("4"));
        assert_eq!(root("27", 3), dec("3"));
        assert_eq!(root("625", 4), dec("5"));
        assert_eq!(root("0", 2), dec("0"));
        assert_eq!(root("1", 1), dec("1"));
    }

    #[test]
    fn test_odd_root_of_negative() {
        assert_eq!(root("-8", 3), dec("-2"));
    }

    #[test]
    fn test_even_root_of_negative_fails() {
        let err = nth_root(&dec("-16"), 2, &MathContext::DECIMAL64).unwrap_err();
        assert!(matches!(err, StageError::ArithmeticError(_)));
    }

    #[test]
    fn test_zero_index_fails() {
        assert!(nth_root(&dec("4"), 0, &MathContext::DECIMAL64).is_err());
    }

    #[test]
    fn test_precision_ten() {
        let ctx = MathContext::new(10, RoundingRule::HalfUp);
        assert_eq!(nth_root(&dec("2"), 2, &ctx).unwrap(), dec("1.414213562"));
    }

    #[test]
    fn test_huge_index() {
        let n = i32::MAX as u64 + 1;
        assert_eq!(nth_root(&dec("1"), n, &MathContext::DECIMAL64).unwrap(), dec("1"));
    }

    #[test]
    fn test_outside_f64_range() {
        let value = BigDecimal::new(1.into(), -400);
        let r = nth_root(&value, 2, &MathContext::DECIMAL64).unwrap();
        assert_eq!(r, BigDecimal::new(1.into(), -200));
    }

    #[test]
    fn test_tiny_value_outside_f64_range() {
        let ctx = MathContext::DECIMAL64;
        let value = dec("5e-400");
        let r = nth_root(&value, 3, &ctx).unwrap();
        // 5e-400 = 500e-402，立方根为 cbrt(500) * 1e-134
        assert!((&r - dec("7.937005259840997e-134")).abs() <= dec("1e-148"), "{}", r);

        let back = pow(&r, 3, &ctx);
        assert!((&back - &value).abs() <= dec("1e-14") * &value, "{}", back);
    }

    #[test]
    fn test_small_root_converges_to_precision() {
        let ctx = MathContext::DECIMAL64;
        let r = nth_root(&dec("2e-40"), 2, &ctx).unwrap();
        assert_eq!(r, dec("1.414213562373095e-20"));

        let r = nth_root(&dec("7e+500"), 2, &ctx).unwrap();
        assert!((&r - dec("2.645751311064591e250")).abs() <= dec("1e236"), "{}", r);
    }

    #[test]
    fn test_pow() {
        let ctx = MathContext::DECIMAL64;
        assert_eq!(pow(&dec("10"), 0, &ctx), dec("1"));
        assert_eq!(pow(&dec("10"), 1, &ctx), dec("10"));
        assert_eq!(pow(&dec("2"), 10, &ctx), dec("1024"));
        assert_eq!(pow(&dec("-1.5"), 3, &ctx), dec("-3.375"));
    }

    #[test]
    fn test_root_pow_round_trip() {
        let ctx = MathContext::DECIMAL64;
        let tolerance = dec("0.000000000001");
        for (value, n) in [("2", 2u64), ("10", 3), ("123.456", 5), ("0.0081", 4)] {
            let v = dec(value);
            let r = nth_root(&v, n, &ctx).unwrap();
            let back = pow(&r, n, &ctx);
            assert!((&back - &v).abs() <= &tolerance * &v, "{} ^ (1/{}) = {}", value, n, r);
        }
    }
}
