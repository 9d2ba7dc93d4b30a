//! Lenient numeric coercion: anything that does not parse becomes `None`.

/// Parse a float, treating blanks, non-numeric text and `NaN` as missing.
pub fn coerce_f64(field: &str) -> Option<f64> {
    field.trim().parse::<f64>().ok().filter(|v| !v.is_nan())
}

/// Parse an integer, also accepting integral floats such as `"2020.0"`.
pub fn coerce_i64(field: &str) -> Option<i64> {
    let trimmed = field.trim();
    if let Ok(v) = trimmed.parse::<i64>() {
        return Some(v);
    }
    coerce_f64(trimmed)
        .filter(|v| v.is_finite() && v.fract() == 0.0)
        .map(|v| v as i64)
}

pub fn coerce_i32(field: &str) -> Option<i32> {
    coerce_i64(field).and_then(|v| i32::try_from(v).ok())
}

pub fn coerce_u32(field: &str) -> Option<u32> {
    coerce_i64(field).and_then(|v| u32::try_from(v).ok())
}
