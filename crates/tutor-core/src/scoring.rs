//! Distance-to-confidence normalization.

/// Maps a raw vector distance (lower is closer) onto a confidence
/// percentage in (0, 100].
///
/// `confidence(0) == 100` and the value decreases strictly as distance
/// grows, approaching but never reaching zero. The naive `1 - distance`
/// alternative goes negative for distances above 1 and is not used
/// anywhere in this workspace. Negative inputs are clamped to zero so the
/// function stays total.
#[must_use]
pub fn confidence(distance: f32) -> f32 {
    100.0 / (1.0 + distance.max(0.0))
}

#[cfg(test)]
mod tests {
    use super::confidence;

    #[test]
    fn zero_distance_is_full_confidence() {
        assert!((confidence(0.0) - 100.0).abs() < f32::EPSILON);
    }

    #[test]
    fn strictly_decreasing() {
        let samples = [0.0, 0.1, 0.5, 1.0, 1.5, 3.0, 10.0, 1000.0];
        for w in samples.windows(2) {
            assert!(confidence(w[0]) > confidence(w[1]), "not decreasing at {:?}", w);
        }
    }

    #[test]
    fn bounded_and_positive() {
        for d in [0.0, 0.3, 1.0, 2.5, 50.0, 1e9] {
            let c = confidence(d);
            assert!(c > 0.0 && c <= 100.0, "confidence({}) = {}", d, c);
        }
    }

    #[test]
    fn negative_distance_clamped() {
        assert!((confidence(-0.5) - 100.0).abs() < f32::EPSILON);
    }

    #[test]
    fn distance_one_is_fifty_percent() {
        assert!((confidence(1.0) - 50.0).abs() < 1e-4);
    }
}
