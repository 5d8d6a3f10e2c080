// =============================================================================
// Bollinger Bands
// =============================================================================
//
// Bollinger Bands consist of a middle band (SMA), an upper band (SMA + k*σ),
// and a lower band (SMA - k*σ), where σ is the population standard deviation
// of the same window.
//
// Unlike the moving averages, the bands are left undefined (`None`) until a
// full window is available.

/// Result of a Bollinger Band calculation over one window.
#[derive(Debug, Clone, PartialEq)]
pub struct BollingerResult {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

/// Upper and lower band series aligned 1:1 with the input closes.
#[derive(Debug, Clone, PartialEq)]
pub struct BollingerSeries {
    pub upper: Vec<Option<f64>>,
    pub lower: Vec<Option<f64>>,
}

/// Calculate Bollinger Bands over the last `period` closes.
///
/// Returns `None` when:
/// - Fewer than `period` data points, or `period == 0`.
/// - The result is non-finite.
pub fn calculate_bollinger(closes: &[f64], period: usize, num_std: f64) -> Option<BollingerResult> {
    if period == 0 || closes.len() < period {
        return None;
    }

    let window = &closes[closes.len() - period..];
    let middle = window.iter().sum::<f64>() / period as f64;

    let variance = window.iter().map(|x| (x - middle).powi(2)).sum::<f64>() / period as f64;
    let std_dev = variance.sqrt();

    let upper = middle + num_std * std_dev;
    let lower = middle - num_std * std_dev;

    if upper.is_finite() && lower.is_finite() {
        Some(BollingerResult {
            upper,
            middle,
            lower,
        })
    } else {
        None
    }
}

/// Rolling Bollinger Bands: one value per close, `None` for the first
/// `period - 1` closes.
pub fn bollinger_series(closes: &[f64], period: usize, num_std: f64) -> BollingerSeries {
    let mut upper = Vec::with_capacity(closes.len());
    let mut lower = Vec::with_capacity(closes.len());

    for end in 1..=closes.len() {
        match calculate_bollinger(&closes[..end], period, num_std) {
            Some(bb) => {
                upper.push(Some(bb.upper));
                lower.push(Some(bb.lower));
            }
            None => {
                upper.push(None);
                lower.push(None);
            }
        }
    }

    BollingerSeries { upper, lower }
}
