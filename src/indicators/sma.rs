// =============================================================================
// Simple Moving Average (SMA)
// =============================================================================
//
// Rolling arithmetic mean of the last `period` closes. Until `period` closes
// have been seen, the mean of every close so far is used instead, so the
// output never has leading gaps.
// =============================================================================

/// Compute the SMA series, aligned 1:1 with `closes`.
///
/// Returns an empty `Vec` when the input is empty or `period == 0`.
pub fn calculate_sma(closes: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || closes.is_empty() {
        return Vec::new();
    }

    let mut result = Vec::with_capacity(closes.len());
    let mut sum = 0.0;

    for (i, &close) in closes.iter().enumerate() {
        sum += close;
        if i >= period {
            sum -= closes[i - period];
        }
        let count = (i + 1).min(period);
        result.push(sum / count as f64);
    }

    result
}
