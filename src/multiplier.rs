// multiplier.rs - Integer-safe stepping through decimal temperature ranges

use crate::error::{Error, Result};

/// Largest exponent tried by [`multiplier`]; values needing more decimal
/// places are rejected instead of searched for indefinitely.
pub const MAX_DECIMALS: u32 = 12;

/// Upper bound on the number of temperatures one sweep may produce.
pub const MAX_SWEEP_POINTS: i128 = 1_000_000;

/// `x` has at most `log10(m)` decimals if rounding `x * m` and scaling back
/// reproduces `x` exactly. `0.07 * 100` is `7.000000000000001`, but
/// `7.0 / 100.0` is `0.07` again.
fn is_integral(value: f64, m: f64) -> bool {
    (value * m).round() / m == value
}

/// Smallest power of ten that turns `x` into an integer.
///
/// ```
/// use largedev_sbm::multiplier::multiplier;
/// assert_eq!(multiplier(0.25).unwrap(), 100);
/// assert_eq!(multiplier(3.0).unwrap(), 1);
/// ```
pub fn multiplier(x: f64) -> Result<u64> {
    if !x.is_finite() {
        return Err(Error::Precision { value: x, max_decimals: MAX_DECIMALS });
    }
    let mut m: u64 = 1;
    for _ in 0..=MAX_DECIMALS {
        if is_integral(x, m as f64) {
            return Ok(m);
        }
        m *= 10;
    }
    Err(Error::Precision { value: x, max_decimals: MAX_DECIMALS })
}

/// The largest of the three multipliers, so min, max and step can all be
/// advanced with one integer stride.
pub fn max_multiplier(a: f64, b: f64, c: f64) -> Result<u64> {
    Ok(multiplier(a)?.max(multiplier(b)?).max(multiplier(c)?))
}

/// Temperatures of the half-open range `[min, max)` in steps of `step`,
/// computed on integers scaled by [`max_multiplier`]. Exactly zero is skipped.
/// A negative step walks downwards, as long as the value stays above `max`.
pub fn temperature_sweep(min: f64, max: f64, step: f64) -> Result<Vec<f64>> {
    let invalid = || Error::InvalidSweep { min, max, step };

    let mult = max_multiplier(min, max, step)?;
    let scale = mult as f64;
    let to_int = |x: f64| -> Result<i64> {
        let scaled = (x * scale).round();
        if scaled.abs() >= i64::MAX as f64 {
            return Err(invalid());
        }
        Ok(scaled as i64)
    };

    let lo = to_int(min)?;
    let hi = to_int(max)?;
    let stride = to_int(step)?;
    if stride == 0 {
        return Err(invalid());
    }

    let points = (hi as i128 - lo as i128) / stride as i128;
    if points > MAX_SWEEP_POINTS {
        return Err(invalid());
    }

    let mut temps = Vec::new();
    let mut k = lo;
    while (stride > 0 && k < hi) || (stride < 0 && k > hi) {
        if k != 0 {
            temps.push(k as f64 / scale);
        }
        match k.checked_add(stride) {
            Some(next) => k = next,
            None => break,
        }
    }
    Ok(temps)
}
