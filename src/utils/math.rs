//! # Game Mathematics
//!
//! Stat scaling helpers shared by character creation and enemy rolls.

/// Scales an integer stat by a multiplier, truncating toward zero.
///
/// # Examples
///
/// ```
/// use console_dungeon::utils::math::scale;
///
/// assert_eq!(scale(200, 0.2), 40);
/// assert_eq!(scale(1, 0.5), 0);
/// assert_eq!(scale(100, 0.5 * 2.0 * 0.93), 93);
/// ```
pub fn scale(base: i32, multiplier: f64) -> i32 {
    (base as f64 * multiplier) as i32
}

/// Product of a chain of multipliers applied to one stat.
pub fn combined(multipliers: &[f64]) -> f64 {
    multipliers.iter().product()
}

/// Random roll expressed in percent, turned into a multiplier.
pub fn percent(value: u32) -> f64 {
    value as f64 / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_truncates() {
        assert_eq!(scale(70, 0.2), 14);
        assert_eq!(scale(50, 0.0), 0);
        assert_eq!(scale(100, 3.0 * 0.9), 270);
    }

    #[test]
    fn test_combined_multipliers() {
        assert_eq!(combined(&[]), 1.0);
        assert!((combined(&[0.5, 2.0, 0.9]) - 0.9).abs() < f64::EPSILON);
    }

    #[test]
    fn test_percent() {
        assert!((percent(95) - 0.95).abs() < f64::EPSILON);
    }
}
