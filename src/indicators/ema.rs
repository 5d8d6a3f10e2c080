// =============================================================================
// Exponential Moving Average (EMA)
// =============================================================================
//
// EMA gives more weight to recent prices, making it more responsive to new
// information than the Simple Moving Average (SMA).
//
// Formula:
//   multiplier = 2 / (period + 1)
//   EMA_0      = close_0
//   EMA_t      = close_t * multiplier + EMA_{t-1} * (1 - multiplier)
//
// Seeding with the first close means the output is defined from the very
// first bar and has the same length as the input.
// =============================================================================

/// Compute the EMA series for the given `closes` slice and look-back `period`.
///
/// Returns an empty `Vec` when the input is empty or the period is zero.
/// Otherwise the output is aligned 1:1 with `closes`.
pub fn calculate_ema(closes: &[f64], period: usize) -> Vec<f64> {
    let Some((&first, rest)) = closes.split_first() else {
        return Vec::new();
    };
    if period == 0 {
        return Vec::new();
    }

    let multiplier = 2.0 / (period as f64 + 1.0);

    let mut result = Vec::with_capacity(closes.len());
    result.push(first);

    let mut prev_ema = first;
    for &close in rest {
        prev_ema = close * multiplier + prev_ema * (1.0 - multiplier);
        result.push(prev_ema);
    }

    result
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ema_empty_input() {
        assert!(calculate_ema(&[], 5).is_empty());
    }

    #[test]
    fn ema_period_zero() {
        assert!(calculate_ema(&[1.0, 2.0, 3.0], 0).is_empty());
    }

    #[test]
    fn ema_is_aligned_with_input_even_when_short() {
        // Fewer closes than the period still yields one value per close.
        let ema = calculate_ema(&[10.0, 20.0], 50);
        assert_eq!(ema.len(), 2);
        assert_eq!(ema[0], 10.0);
    }

    #[test]
    fn ema_known_values() {
        // 5-period EMA of [1..=10], multiplier = 1/3, seeded with 1.0.
        let closes: Vec<f64> = (1..=10).map(|x| x as f64).collect();
        let ema = calculate_ema(&closes, 5);
        assert_eq!(ema.len(), 10);

        let mult = 2.0 / 6.0;
        let mut expected = 1.0;
        assert!((ema[0] - expected).abs() < 1e-12);
        for (i, &c) in closes.iter().enumerate().skip(1) {
            expected = c * mult + expected * (1.0 - mult);
            assert!((ema[i] - expected).abs() < 1e-10, "index {i}: got {}, expected {expected}", ema[i]);
        }
    }

    #[test]
    fn ema_flat_series_stays_flat() {
        let ema = calculate_ema(&[100.0; 60], 20);
        assert!(ema.iter().all(|v| (v - 100.0).abs() < 1e-12));
    }

    #[test]
    fn ema_lags_a_rising_series() {
        let closes: Vec<f64> = (1..=100).map(|x| x as f64).collect();
        let ema = calculate_ema(&closes, 20);
        let last = *ema.last().unwrap();
        assert!(last < 100.0);
        assert!(last > 80.0);
    }
}
