//! Rolling and exponential building blocks shared by the smoothing strategies.
//!
//! All functions keep the input length and use `f64::NAN` for positions
//! without a value.

/// Number of undefined values at the start of `data`
pub fn leading_undefined(data: &[f64]) -> usize {
    data.iter().take_while(|x| x.is_nan()).count()
}

/// `alpha` for a span-parameterised exponential average
pub fn span_alpha(span: usize) -> f64 {
    2.0 / (span as f64 + 1.0)
}

/// Exponentially weighted mean with smoothing factor `alpha`.
///
/// With `adjust = false` this is the plain recurrence
/// `y[t] = y[t-1] + alpha * (x[t] - y[t-1])` seeded by the first defined
/// input, so `y` equals `x` at that point. With `adjust = true` it is the
/// bias-corrected weighted mean `sum((1-alpha)^i * x[t-i]) / sum((1-alpha)^i)`.
///
/// Leading undefined inputs stay undefined. An undefined input after the
/// seed holds the previous output, and with `adjust = true` the accumulated
/// weights are carried over the gap unchanged rather than decayed across it.
pub fn ewm(data: &[f64], alpha: f64, adjust: bool) -> Vec<f64> {
    let decay = 1.0 - alpha;
    let mut result = vec![f64::NAN; data.len()];
    // (weighted sum, weight total) when adjusting, (mean, unused) otherwise
    let mut state: Option<(f64, f64)> = None;

    for (i, &x) in data.iter().enumerate() {
        state = match state {
            None if x.is_nan() => None,
            None => Some((x, 1.0)),
            Some(held) if x.is_nan() => Some(held),
            Some((acc, weight)) if adjust => Some((x + decay * acc, 1.0 + decay * weight)),
            Some((mean, weight)) => Some((mean + alpha * (x - mean), weight)),
        };

        if let Some((acc, weight)) = state {
            result[i] = if adjust { acc / weight } else { acc };
        }
    }

    result
}

/// Trailing mean over `window` values.
///
/// Undefined for the first `window - 1` positions and wherever the window
/// contains an undefined value.
pub fn rolling_mean(data: &[f64], window: usize) -> Vec<f64> {
    rolling(data, window, |slice| slice.iter().sum::<f64>() / window as f64)
}

/// Trailing linearly weighted mean, weights `1..=window` with the newest heaviest
pub fn rolling_weighted_mean(data: &[f64], window: usize) -> Vec<f64> {
    let denominator = (window * (window + 1)) as f64 / 2.0;
    rolling(data, window, |slice| {
        slice
            .iter()
            .enumerate()
            .map(|(i, x)| (i + 1) as f64 * x)
            .sum::<f64>()
            / denominator
    })
}

/// `result[t] = data[t - lag]`, undefined for the first `lag` positions
pub fn shift(data: &[f64], lag: usize) -> Vec<f64> {
    let mut result = vec![f64::NAN; data.len()];
    for i in lag..data.len() {
        result[i] = data[i - lag];
    }
    result
}

fn rolling<F>(data: &[f64], window: usize, reduce: F) -> Vec<f64>
where
    F: Fn(&[f64]) -> f64,
{
    let mut result = vec![f64::NAN; data.len()];
    if window == 0 || data.len() < window {
        return result;
    }

    for i in window - 1..data.len() {
        let slice = &data[i + 1 - window..=i];
        if slice.iter().any(|x| x.is_nan()) {
            continue;
        }
        result[i] = reduce(slice);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_ewm_unadjusted_seed() {
        let result = ewm(&[10.0, 20.0], 0.5, false);
        assert_eq!(result[0], 10.0);
        assert_relative_eq!(result[1], 15.0);
    }

    #[test]
    fn test_ewm_adjusted_weights() {
        // alpha 0.5: (20 + 0.5 * 10) / (1 + 0.5)
        let result = ewm(&[10.0, 20.0], 0.5, true);
        assert_eq!(result[0], 10.0);
        assert_relative_eq!(result[1], 25.0 / 1.5);
    }

    #[test]
    fn test_ewm_skips_leading_gap() {
        let result = ewm(&[f64::NAN, f64::NAN, 4.0, 8.0], 0.5, false);
        assert!(result[0].is_nan() && result[1].is_nan());
        assert_eq!(result[2], 4.0);
        assert_relative_eq!(result[3], 6.0);
    }

    #[test]
    fn test_ewm_holds_interior_gap() {
        let result = ewm(&[4.0, f64::NAN, 8.0], 0.5, false);
        assert_eq!(result[1], 4.0);
        assert_relative_eq!(result[2], 6.0);
    }

    #[test]
    fn test_ewm_adjusted_gap_keeps_weights() {
        // weights are not decayed across the gap: (8 + 0.5 * 4) / (1 + 0.5)
        let result = ewm(&[4.0, f64::NAN, 8.0], 0.5, true);
        assert_eq!(result[1], 4.0);
        assert_relative_eq!(result[2], 10.0 / 1.5);
    }

    #[test]
    fn test_rolling_mean_propagates_gaps() {
        let result = rolling_mean(&[f64::NAN, 1.0, 2.0, 3.0], 2);
        assert!(result[0].is_nan());
        assert!(result[1].is_nan());
        assert_relative_eq!(result[2], 1.5);
        assert_relative_eq!(result[3], 2.5);
    }

    #[test]
    fn test_rolling_weighted_mean() {
        // (1*1 + 2*2 + 3*3) / 6
        let result = rolling_weighted_mean(&[1.0, 2.0, 3.0], 3);
        assert_relative_eq!(result[2], 14.0 / 6.0);
    }

    #[test]
    fn test_shift() {
        let result = shift(&[1.0, 2.0, 3.0], 2);
        assert!(result[0].is_nan() && result[1].is_nan());
        assert_eq!(result[2], 1.0);
        assert_eq!(shift(&[1.0, 2.0], 0), vec![1.0, 2.0]);
    }

    #[test]
    fn test_span_alpha() {
        assert_relative_eq!(span_alpha(1), 1.0);
        assert_relative_eq!(span_alpha(9), 0.2);
    }
}
