//! Small numeric helpers shared by the particle and scene code.

/// Linear re-map of `value` from one range onto another (not clamped)
pub fn map_range(value: f32, in_low: f32, in_high: f32, out_low: f32, out_high: f32) -> f32 {
    let span = in_high - in_low;
    if span == 0.0 {
        return out_low;
    }
    out_low + (value - in_low) / span * (out_high - out_low)
}

/// `map_range` with the input clamped to its range first
pub fn map_clamped(value: f32, in_low: f32, in_high: f32, out_low: f32, out_high: f32) -> f32 {
    let (lo, hi) = if in_low <= in_high {
        (in_low, in_high)
    } else {
        (in_high, in_low)
    };
    map_range(value.clamp(lo, hi), in_low, in_high, out_low, out_high)
}
