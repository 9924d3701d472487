use rrg_core::{Result, RrgError, SmoothingMethod};

use crate::primitives::{ewm, leading_undefined, rolling_mean, rolling_weighted_mean, shift, span_alpha};

/// KAMA fast/slow smoothing-constant periods
const KAMA_FAST: usize = 2;
const KAMA_SLOW: usize = 30;

/// A `(series, period) -> series` smoothing strategy.
///
/// The output has the input's length; `f64::NAN` marks warm-up positions.
pub trait Smoother: Send + Sync {
    fn smooth(&self, data: &[f64], period: usize) -> Result<Vec<f64>>;

    fn name(&self) -> &str;
}

impl Smoother for SmoothingMethod {
    fn smooth(&self, data: &[f64], period: usize) -> Result<Vec<f64>> {
        smooth(*self, data, period)
    }

    fn name(&self) -> &str {
        SmoothingMethod::name(self)
    }
}

/// Adapts a plain function into a [`Smoother`]
pub struct FnSmoother<F> {
    name: String,
    func: F,
}

impl<F> FnSmoother<F>
where
    F: Fn(&[f64], usize) -> Result<Vec<f64>> + Send + Sync,
{
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

impl<F> Smoother for FnSmoother<F>
where
    F: Fn(&[f64], usize) -> Result<Vec<f64>> + Send + Sync,
{
    fn smooth(&self, data: &[f64], period: usize) -> Result<Vec<f64>> {
        (self.func)(data, period)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Apply `method` with lookback `period`.
///
/// This is the only entry point to the strategies; the per-method functions
/// assume a period that already passed these checks.
///
/// Fails with `InvalidParameter` when `period < 2` or `period >= data.len()`.
/// The strategy runs on the input after its leading undefined values, which
/// stay undefined in the output.
pub fn smooth(method: SmoothingMethod, data: &[f64], period: usize) -> Result<Vec<f64>> {
    check_period(data, period)?;

    let gap = leading_undefined(data);
    let defined = &data[gap..];
    let smoothed = match method {
        SmoothingMethod::Wilder => wilder(defined, period),
        SmoothingMethod::Sma => sma(defined, period),
        SmoothingMethod::Wma => wma(defined, period),
        SmoothingMethod::Dema => dema(defined, period),
        SmoothingMethod::Tema => tema(defined, period),
        SmoothingMethod::Hma => hma(defined, period),
        SmoothingMethod::Kama => kama(defined, period),
        SmoothingMethod::Zlema => zlema(defined, period),
        SmoothingMethod::Tma => tma(defined, period),
    };

    let mut result = vec![f64::NAN; gap];
    result.extend(smoothed);
    Ok(result)
}

fn check_period(data: &[f64], period: usize) -> Result<()> {
    if period < 2 {
        return Err(RrgError::InvalidParameter(format!(
            "smoothing period must be >= 2, got {}",
            period
        )));
    }
    if period >= data.len() {
        return Err(RrgError::InvalidParameter(format!(
            "smoothing period {} needs more than {} samples",
            period,
            data.len()
        )));
    }
    Ok(())
}

/// Wilder's smoothing (RMA): alpha `1/period`, seeded by the first value.
pub(crate) fn wilder(data: &[f64], period: usize) -> Vec<f64> {
    ewm(data, 1.0 / period as f64, false)
}

/// Simple moving average, undefined for the first `period - 1` positions
pub(crate) fn sma(data: &[f64], period: usize) -> Vec<f64> {
    rolling_mean(data, period)
}

/// Linearly weighted moving average
pub(crate) fn wma(data: &[f64], period: usize) -> Vec<f64> {
    rolling_weighted_mean(data, period)
}

/// Span-based, bias-adjusted EMA used by the lag-reducing variants
fn ema_span(data: &[f64], span: usize) -> Vec<f64> {
    ewm(data, span_alpha(span), true)
}

/// Double EMA: `2·EMA − EMA(EMA)`
pub(crate) fn dema(data: &[f64], period: usize) -> Vec<f64> {
    let e1 = ema_span(data, period);
    let e2 = ema_span(&e1, period);
    e1.iter().zip(&e2).map(|(a, b)| 2.0 * a - b).collect()
}

/// Triple EMA: `3·EMA − 3·EMA(EMA) + EMA(EMA(EMA))`
pub(crate) fn tema(data: &[f64], period: usize) -> Vec<f64> {
    let e1 = ema_span(data, period);
    let e2 = ema_span(&e1, period);
    let e3 = ema_span(&e2, period);
    e1.iter()
        .zip(&e2)
        .zip(&e3)
        .map(|((a, b), c)| 3.0 * a - 3.0 * b + c)
        .collect()
}

/// Hull-style MA: rolling mean over `floor(sqrt(period))` of
/// `2·EMA(period/2) − EMA(period)`
pub(crate) fn hma(data: &[f64], period: usize) -> Vec<f64> {
    let half = ema_span(data, (period / 2).max(1));
    let full = ema_span(data, period);
    let raw: Vec<f64> = half.iter().zip(&full).map(|(h, f)| 2.0 * h - f).collect();
    let window = ((period as f64).sqrt() as usize).max(1);
    rolling_mean(&raw, window)
}

/// Kaufman adaptive MA.
///
/// Seeded at index `period - 1` with the mean of the first `period` values.
/// Each later step moves toward the input by
/// `(er * (fast_sc - slow_sc) + slow_sc)^2`, where the efficiency ratio `er`
/// is the net change over `period` steps divided by the summed absolute
/// step changes. A flat window has no efficiency ratio and holds the
/// previous value.
pub(crate) fn kama(data: &[f64], period: usize) -> Vec<f64> {
    let mut result = vec![f64::NAN; data.len()];
    if period == 0 || data.len() < period {
        return result;
    }

    let fast_sc = 2.0 / (KAMA_FAST as f64 + 1.0);
    let slow_sc = 2.0 / (KAMA_SLOW as f64 + 1.0);

    let mut prev = data[..period].iter().sum::<f64>() / period as f64;
    result[period - 1] = prev;

    for i in period..data.len() {
        let change = (data[i] - data[i - period]).abs();
        let volatility: f64 = (i + 1 - period..=i)
            .map(|j| (data[j] - data[j - 1]).abs())
            .sum();

        if volatility > 0.0 && volatility.is_finite() && data[i].is_finite() {
            let er = change / volatility;
            let sc = (er * (fast_sc - slow_sc) + slow_sc).powi(2);
            prev += sc * (data[i] - prev);
        } else {
            tracing::trace!(index = i, "kama efficiency ratio undefined, holding");
        }
        result[i] = prev;
    }

    result
}

/// Zero-lag EMA: `EMA(x) + 0.5·EMA(x − x[t − lag])` with `lag = (period − 1) / 2`
pub(crate) fn zlema(data: &[f64], period: usize) -> Vec<f64> {
    let lag = period.saturating_sub(1) / 2;
    let base = ema_span(data, period);
    let lagged = shift(data, lag);
    let momentum: Vec<f64> = data.iter().zip(&lagged).map(|(x, l)| x - l).collect();
    let correction = ema_span(&momentum, period);
    base.iter()
        .zip(&correction)
        .map(|(b, c)| b + c * 0.5)
        .collect()
}

/// Triangular MA: SMA of the SMA
pub(crate) fn tma(data: &[f64], period: usize) -> Vec<f64> {
    rolling_mean(&rolling_mean(data, period), period)
}
