use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

use crate::error::{Result, RrgError};
use crate::types::Interval;

/// Smoothing formula used for both normalization stages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmoothingMethod {
    /// Wilder's RMA, `ewm(alpha = 1/p, adjust = false)`. Canonical JdK smoothing.
    Wilder,
    /// Simple rolling mean, the legacy pipeline
    Sma,
    Wma,
    Dema,
    Tema,
    Hma,
    Kama,
    Zlema,
    Tma,
}

impl SmoothingMethod {
    pub fn name(&self) -> &'static str {
        match self {
            SmoothingMethod::Wilder => "wilder",
            SmoothingMethod::Sma => "sma",
            SmoothingMethod::Wma => "wma",
            SmoothingMethod::Dema => "dema",
            SmoothingMethod::Tema => "tema",
            SmoothingMethod::Hma => "hma",
            SmoothingMethod::Kama => "kama",
            SmoothingMethod::Zlema => "zlema",
            SmoothingMethod::Tma => "tma",
        }
    }

    pub fn all() -> Vec<SmoothingMethod> {
        let mut methods = vec![SmoothingMethod::Wilder, SmoothingMethod::Sma];
        methods.extend(Self::exploratory());
        methods
    }

    /// Methods that only exist for comparative parameter search
    pub fn exploratory() -> Vec<SmoothingMethod> {
        vec![
            SmoothingMethod::Wma,
            SmoothingMethod::Dema,
            SmoothingMethod::Tema,
            SmoothingMethod::Hma,
            SmoothingMethod::Kama,
            SmoothingMethod::Zlema,
            SmoothingMethod::Tma,
        ]
    }
}

impl FromStr for SmoothingMethod {
    type Err = RrgError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "wilder" | "rma" | "ema_alpha" => Ok(SmoothingMethod::Wilder),
            "sma" => Ok(SmoothingMethod::Sma),
            "wma" => Ok(SmoothingMethod::Wma),
            "dema" => Ok(SmoothingMethod::Dema),
            "tema" => Ok(SmoothingMethod::Tema),
            "hma" => Ok(SmoothingMethod::Hma),
            "kama" => Ok(SmoothingMethod::Kama),
            "zlema" => Ok(SmoothingMethod::Zlema),
            "tma" => Ok(SmoothingMethod::Tma),
            other => Err(RrgError::InvalidConfig(format!(
                "unknown smoothing method '{}'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for SmoothingMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

pub const DEFAULT_MIN_OVERLAP_MARGIN: usize = 10;
pub const DEFAULT_MIN_OUTPUT_POINTS: usize = 5;

/// One parameter set for a batch run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RrgConfig {
    pub rs_period: usize,
    pub mom_period: usize,
    pub smoothing: SmoothingMethod,
    /// Extra aligned samples required on top of `rs_period + mom_period`
    pub min_overlap_margin: usize,
    /// Series shorter than this after the transform are skipped
    pub min_output_points: usize,
    /// Display window; never changes computed values
    pub tail_length: usize,
}

impl Default for RrgConfig {
    fn default() -> Self {
        Self {
            rs_period: 10,
            mom_period: 10,
            smoothing: SmoothingMethod::Wilder,
            min_overlap_margin: DEFAULT_MIN_OVERLAP_MARGIN,
            min_output_points: DEFAULT_MIN_OUTPUT_POINTS,
            tail_length: 10,
        }
    }
}

impl RrgConfig {
    pub fn new(rs_period: usize, mom_period: usize, smoothing: SmoothingMethod) -> Self {
        Self {
            rs_period,
            mom_period,
            smoothing,
            ..Self::default()
        }
    }

    /// Preset periods and tail for a sampling interval
    pub fn for_interval(interval: Interval) -> Self {
        let (rs_period, mom_period, tail_length) = match interval {
            Interval::Weekly => (8, 8, 5),
            Interval::Daily => (10, 10, 10),
            Interval::Hour1 => (10, 10, 20),
        };
        Self {
            rs_period,
            mom_period,
            tail_length,
            ..Self::default()
        }
    }

    pub fn with_smoothing(mut self, smoothing: SmoothingMethod) -> Self {
        self.smoothing = smoothing;
        self
    }

    pub fn with_periods(mut self, rs_period: usize, mom_period: usize) -> Self {
        self.rs_period = rs_period;
        self.mom_period = mom_period;
        self
    }

    pub fn with_tail_length(mut self, tail_length: usize) -> Self {
        self.tail_length = tail_length;
        self
    }

    /// Aligned samples a sector needs before the transform is attempted.
    ///
    /// Saturates, so an oversized margin means no sector ever qualifies.
    pub fn min_overlap(&self) -> usize {
        self.rs_period
            .saturating_add(self.mom_period)
            .saturating_add(self.min_overlap_margin)
    }

    pub fn validate(&self) -> Result<()> {
        if self.rs_period < 2 {
            return Err(RrgError::InvalidConfig(format!(
                "rs_period must be >= 2, got {}",
                self.rs_period
            )));
        }
        if self.mom_period < 2 {
            return Err(RrgError::InvalidConfig(format!(
                "mom_period must be >= 2, got {}",
                self.mom_period
            )));
        }
        if self.tail_length < 1 {
            return Err(RrgError::InvalidConfig("tail_length must be >= 1".to_string()));
        }
        Ok(())
    }

    /// Load from `RRG_*` environment variables, starting from `base`.
    pub fn from_env_with(base: RrgConfig) -> Result<Self> {
        let config = Self {
            rs_period: env_or("RRG_RS_PERIOD", base.rs_period)?,
            mom_period: env_or("RRG_MOM_PERIOD", base.mom_period)?,
            smoothing: env_or("RRG_SMOOTHING", base.smoothing)?,
            min_overlap_margin: env_or("RRG_MIN_OVERLAP_MARGIN", base.min_overlap_margin)?,
            min_output_points: env_or("RRG_MIN_OUTPUT_POINTS", base.min_output_points)?,
            tail_length: env_or("RRG_TAIL_LENGTH", base.tail_length)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_env() -> Result<Self> {
        Self::from_env_with(Self::default())
    }
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| RrgError::InvalidConfig(format!("{}={}: {}", key, raw, e))),
        Err(_) => Ok(default),
    }
}
