//! Credit weights for multiple-response questions.
//!
//! Every correct choice shares +100% of the credit and every incorrect choice
//! shares -100%. Percentages are rendered with at most
//! [`SIGNIFICANT_DIGITS`] significant digits, without trailing zeros and
//! without a `+` sign (`100`, `50`, `33.33333`, `-14.28571`).

/// Precision used when rendering a percentage.
pub const SIGNIFICANT_DIGITS: i32 = 7;

/// Per-choice percentage weights, in the order of `correct`.
///
/// A denominator that would be zero (no correct or no incorrect choices) is
/// treated as one.
pub fn checkbox_weights(correct: &[bool]) -> Vec<f64> {
    let correct_count = correct.iter().filter(|is_correct| **is_correct).count();
    let incorrect_count = correct.len() - correct_count;

    let correct_weight = 100.0 / correct_count.max(1) as f64;
    let incorrect_weight = -100.0 / incorrect_count.max(1) as f64;

    correct
        .iter()
        .map(|is_correct| {
            if *is_correct {
                correct_weight
            } else {
                incorrect_weight
            }
        })
        .collect()
}

/// Render a percentage with at most [`SIGNIFICANT_DIGITS`] significant digits.
pub fn format_percentage(value: f64) -> String {
    if value == 0.0 || !value.is_finite() {
        return "0".to_string();
    }

    let magnitude = value.abs().log10().floor() as i32;
    let decimals = (SIGNIFICANT_DIGITS - 1 - magnitude).max(0) as usize;
    let text = format!("{value:.decimals$}");

    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkbox_weights_one_correct_two_incorrect() {
        let weights = checkbox_weights(&[true, false, false]);
        assert_eq!(weights, vec![100.0, -50.0, -50.0]);
    }

    #[test]
    fn test_checkbox_weights_sum_to_full_credit() {
        let correct = [true, false, true, true, false, false, false];
        let weights = checkbox_weights(&correct);

        let positive: f64 = weights.iter().filter(|w| **w > 0.0).sum();
        let negative: f64 = weights.iter().filter(|w| **w < 0.0).sum();
        assert!((positive - 100.0).abs() < 1e-9);
        assert!((negative + 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_checkbox_weights_all_correct() {
        assert_eq!(checkbox_weights(&[true, true]), vec![50.0, 50.0]);
    }

    #[test]
    fn test_checkbox_weights_none_correct() {
        assert_eq!(checkbox_weights(&[false, false]), vec![-50.0, -50.0]);
    }

    #[test]
    fn test_checkbox_weights_empty() {
        assert!(checkbox_weights(&[]).is_empty());
    }

    #[test]
    fn test_format_percentage_whole_numbers() {
        assert_eq!(format_percentage(100.0), "100");
        assert_eq!(format_percentage(50.0), "50");
        assert_eq!(format_percentage(-100.0), "-100");
        assert_eq!(format_percentage(-50.0), "-50");
    }

    #[test]
    fn test_format_percentage_fractions() {
        assert_eq!(format_percentage(100.0 / 3.0), "33.33333");
        assert_eq!(format_percentage(-100.0 / 7.0), "-14.28571");
        assert_eq!(format_percentage(12.5), "12.5");
        assert_eq!(format_percentage(100.0 / 6.0), "16.66667");
        assert_eq!(format_percentage(0.1), "0.1");
    }

    #[test]
    fn test_format_percentage_zero() {
        assert_eq!(format_percentage(0.0), "0");
    }
}
