use crate::error::{Result, ScoreError};

/// The five fulfillment levels a score can land in, lowest first.
pub const FUK_LEVELS: [f64; 5] = [0.0, 0.25, 0.5, 0.75, 1.0];

/// Convert a raw average score to its fulfillment level (FUK).
///
/// Thresholds are exclusive on the lower side: a score sitting exactly on a
/// boundary falls into the bucket below it. Input is not clamped, so values
/// above 1 or below 0 walk the same ladder.
pub fn score_to_fuk(score: f64) -> f64 {
    if score > 0.85 {
        1.0
    } else if score > 0.75 {
        0.75
    } else if score > 0.5 {
        0.5
    } else if score > 0.0 {
        0.25
    } else {
        0.0
    }
}

/// Like [`score_to_fuk`], but rejects NaN and infinities instead of letting
/// them fall through to a bucket.
pub fn try_score_to_fuk(score: f64) -> Result<f64> {
    if !score.is_finite() {
        return Err(ScoreError::invalid(format!("score: not a finite number ({})", score)));
    }
    Ok(score_to_fuk(score))
}

/// Human-readable label for a FUK value.
///
/// Boundaries here are inclusive (`>=`), unlike [`score_to_fuk`].
pub fn fuk_label(fuk: f64) -> &'static str {
    if fuk >= 0.85 {
        "Sangat Baik"
    } else if fuk >= 0.75 {
        "Baik"
    } else if fuk >= 0.5 {
        "Cukup"
    } else if fuk >= 0.25 {
        "Kurang"
    } else {
        "Tidak Ada"
    }
}

/// Symbolic color class for a FUK value, bucketed like [`fuk_label`].
pub fn fuk_color_class(fuk: f64) -> &'static str {
    if fuk >= 0.85 {
        "fuk-excellent"
    } else if fuk >= 0.75 {
        "fuk-good"
    } else if fuk >= 0.5 {
        "fuk-fair"
    } else if fuk >= 0.25 {
        "fuk-poor"
    } else {
        "fuk-none"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fuk_always_in_level_set() {
        let samples = [
            -5.0, -0.1, 0.0, 0.0001, 0.25, 0.5, 0.5000001, 0.75, 0.76, 0.85, 0.86, 1.0, 3.0,
        ];
        for s in samples {
            let fuk = score_to_fuk(s);
            assert!(FUK_LEVELS.contains(&fuk), "{} mapped to {}", s, fuk);
        }
    }

    #[test]
    fn test_upper_boundary_is_exclusive() {
        assert_eq!(score_to_fuk(0.85), 0.75);
        assert_eq!(score_to_fuk(0.8500001), 1.0);
    }

    #[test]
    fn test_middle_boundaries_are_exclusive() {
        assert_eq!(score_to_fuk(0.75), 0.5);
        assert_eq!(score_to_fuk(0.7500001), 0.75);
        assert_eq!(score_to_fuk(0.5), 0.25);
        assert_eq!(score_to_fuk(0.5000001), 0.5);
    }

    #[test]
    fn test_zero_boundary() {
        assert_eq!(score_to_fuk(0.0), 0.0);
        assert_eq!(score_to_fuk(0.0001), 0.25);
    }

    #[test]
    fn test_out_of_range_not_clamped() {
        assert_eq!(score_to_fuk(-1.0), 0.0);
        assert_eq!(score_to_fuk(4.0), 1.0);
    }

    #[test]
    fn test_try_score_to_fuk_rejects_non_finite() {
        assert!(try_score_to_fuk(f64::NAN).is_err());
        assert!(try_score_to_fuk(f64::INFINITY).is_err());
        assert!(try_score_to_fuk(f64::NEG_INFINITY).is_err());
        assert_eq!(try_score_to_fuk(0.9).unwrap(), 1.0);
    }

    #[test]
    fn test_fuk_label_buckets() {
        assert_eq!(fuk_label(1.0), "Sangat Baik");
        assert_eq!(fuk_label(0.85), "Sangat Baik");
        assert_eq!(fuk_label(0.75), "Baik");
        assert_eq!(fuk_label(0.5), "Cukup");
        assert_eq!(fuk_label(0.25), "Kurang");
        assert_eq!(fuk_label(0.0), "Tidak Ada");
    }

    #[test]
    fn test_fuk_label_uses_inclusive_boundaries() {
        // 0.85 is "Sangat Baik" here even though score_to_fuk(0.85) is 0.75
        assert_eq!(fuk_label(0.85), "Sangat Baik");
        assert_eq!(fuk_label(0.8499), "Baik");
        assert_eq!(fuk_label(0.2499), "Tidak Ada");
    }

    #[test]
    fn test_fuk_color_class_buckets() {
        assert_eq!(fuk_color_class(1.0), "fuk-excellent");
        assert_eq!(fuk_color_class(0.75), "fuk-good");
        assert_eq!(fuk_color_class(0.5), "fuk-fair");
        assert_eq!(fuk_color_class(0.25), "fuk-poor");
        assert_eq!(fuk_color_class(0.0), "fuk-none");
    }

    #[test]
    fn test_label_and_color_agree_on_buckets() {
        for fuk in FUK_LEVELS {
            let label = fuk_label(fuk);
            let class = fuk_color_class(fuk);
            let expected = match label {
                "Sangat Baik" => "fuk-excellent",
                "Baik" => "fuk-good",
                "Cukup" => "fuk-fair",
                "Kurang" => "fuk-poor",
                _ => "fuk-none",
            };
            assert_eq!(class, expected);
        }
    }
}
