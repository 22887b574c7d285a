use super::super::domain::Factor;

/// Maps `value` on `[min, max]` onto `[0, 1]`, clamping anything outside the range.
pub fn normalize(value: f64, min: f64, max: f64) -> f64 {
    if max <= min {
        return 0.0;
    }
    clamp01((value - min) / (max - min))
}

/// Clamps to `[0, 1]`; NaN collapses to 0.
pub fn clamp01(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Flips client concentration so that 5 is best and 1 is worst.
///
/// Applied before normalization so the weighting stays linear.
pub fn invert_concentration(raw: u8) -> u8 {
    let (min, max) = Factor::ClientConcentration
        .bounds()
        .unwrap_or((1, 5));
    (min + max).saturating_sub(raw)
}

/// Normalized value of a graded factor, with concentration inverted first.
pub fn normalize_grade(factor: Factor, raw: u8) -> f64 {
    let Some((min, max)) = factor.bounds() else {
        return clamp01(f64::from(raw));
    };
    let value = match factor {
        Factor::ClientConcentration => invert_concentration(raw),
        _ => raw,
    };
    normalize(f64::from(value), f64::from(min), f64::from(max))
}
