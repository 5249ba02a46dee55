//! Piecewise-linear resampling over sampled curves.
//!
//! [`interp`] follows the usual table lookup convention: `xp` must be
//! non-decreasing, and queries outside `[xp[0], xp[last]]` clamp to the end
//! values of `fp`.

/// Linear interpolation between two values.
#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Clamps a value to `[min, max]`. NaN maps to `min`.
#[inline]
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() {
        return min;
    }
    value.max(min).min(max)
}

/// `n` evenly spaced samples from `start` to `end` inclusive.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { end } else { start + step * i as f64 })
                .collect()
        }
    }
}

/// Samples the curve `(xp, fp)` at `x`.
///
/// Returns 0.0 for an empty curve. A degenerate domain (all `xp` equal)
/// yields the last value for any `x` at or past it.
pub fn interp(x: f64, xp: &[f64], fp: &[f64]) -> f64 {
    let n = xp.len().min(fp.len());
    if n == 0 {
        return 0.0;
    }
    let last = n - 1;
    if x >= xp[last] {
        return fp[last];
    }
    if x <= xp[0] {
        return fp[0];
    }
    // first index with xp > x; guaranteed in 1..=last by the checks above
    let hi = xp[..n].partition_point(|&v| v <= x);
    let lo = hi - 1;
    let span = xp[hi] - xp[lo];
    if span <= 0.0 {
        return fp[hi];
    }
    lerp(fp[lo], fp[hi], (x - xp[lo]) / span)
}

/// Samples the curve `(xp, fp)` at every point of `xs`.
pub fn resample(xs: &[f64], xp: &[f64], fp: &[f64]) -> Vec<f64> {
    xs.iter().map(|&x| interp(x, xp, fp)).collect()
}

/// True if no sample is smaller than its predecessor.
pub fn is_non_decreasing(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[1] >= w[0])
}
