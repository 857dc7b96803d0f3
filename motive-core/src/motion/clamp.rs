//! Output saturation

/// Bound a drive output to `[-1, 1]`
pub fn clamp(value: f32) -> f32 {
    value.clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(0.25), 0.25);
        assert_eq!(clamp(1.0), 1.0);
        assert_eq!(clamp(-1.0), -1.0);
        assert_eq!(clamp(3.5), 1.0);
        assert_eq!(clamp(-42.0), -1.0);
    }
}
