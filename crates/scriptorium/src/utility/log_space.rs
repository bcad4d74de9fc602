//! # Log-Space Arithmetic
//!
//! Lattice scores are natural-log probabilities; ``f64::NEG_INFINITY`` is
//! probability zero.

/// ``ln(exp(a) + exp(b))``, stable for large magnitudes.
pub fn log_add(
    a: f64,
    b: f64,
) -> f64 {
    if a == f64::NEG_INFINITY {
        return b;
    }
    if b == f64::NEG_INFINITY {
        return a;
    }
    let (hi, lo) = if a >= b { (a, b) } else { (b, a) };
    hi + (lo - hi).exp().ln_1p()
}

/// ``ln(sum(exp(x)))`` over `values`.
///
/// Returns ``f64::NEG_INFINITY`` for an empty input.
pub fn log_sum_exp<I>(values: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    let values: Vec<f64> = values.into_iter().collect();
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !max.is_finite() {
        return max;
    }
    max + values.iter().map(|v| (v - max).exp()).sum::<f64>().ln()
}
