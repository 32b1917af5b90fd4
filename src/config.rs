//! Every tuning constant of the estimation pipeline in one place.
//!
//! The policies themselves (piecewise-linear confidence, range-doubling
//! market bands, the ±25/±50/±100 proximity ladder) are fixed in shape;
//! only their breakpoints live here. Callers thread a `ModelConfig`
//! explicitly into each query instead of relying on ambient state.

#[derive(Debug, Clone, Copy)]
pub struct EloConfig {
    pub k: f64,
    pub home_adv_pts: f64,
    pub initial: f64,
}

impl Default for EloConfig {
    fn default() -> Self {
        Self {
            k: 35.0,
            home_adv_pts: 100.0,
            initial: 1800.0,
        }
    }
}

/// Progressive widening of the rating-proximity tolerance. Steps are
/// tried in order; only after the last one comes up empty does a query
/// report "no comparable sample".
#[derive(Debug, Clone)]
pub struct RelaxationLadder {
    pub steps: Vec<f64>,
}

impl Default for RelaxationLadder {
    fn default() -> Self {
        Self {
            steps: vec![25.0, 50.0, 100.0],
        }
    }
}

/// Implied-probability band policy for market-odds reconciliation.
///
/// Deliberately separate from [`RelaxationLadder`]: the odds band doubles
/// once and then gives up, while the Elo ladder escalates through three
/// tiers. The asymmetry is inherited behavior and kept configurable per
/// policy rather than unified.
#[derive(Debug, Clone, Copy)]
pub struct MarketBandConfig {
    /// Half-width of the probability band, as an absolute probability.
    pub half_width: f64,
    pub prob_floor: f64,
    pub prob_ceil: f64,
    /// How many times an empty result doubles the half-width before
    /// giving up.
    pub widen_retries: u32,
}

impl Default for MarketBandConfig {
    fn default() -> Self {
        Self {
            half_width: 0.05,
            prob_floor: 0.01,
            prob_ceil: 0.99,
            widen_retries: 1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfidenceConfig {
    pub floor: f64,
    pub ceiling: f64,
    /// (sample size, confidence) anchors for the piecewise-linear map.
    /// Must be sorted by sample size and non-decreasing in confidence.
    pub breakpoints: Vec<(usize, f64)>,
    pub sample_weight: f64,
    pub dispersion_weight: f64,
    /// Dispersion confidence = base − slope × avg goal stddev, clamped.
    pub dispersion_base: f64,
    pub dispersion_slope: f64,
}

impl Default for ConfidenceConfig {
    fn default() -> Self {
        Self {
            floor: 5.0,
            ceiling: 85.0,
            breakpoints: vec![
                (0, 10.0),
                (5, 15.0),
                (10, 20.0),
                (20, 30.0),
                (50, 50.0),
                (100, 65.0),
                (200, 80.0),
                (400, 85.0),
            ],
            sample_weight: 0.6,
            dispersion_weight: 0.4,
            dispersion_base: 85.0,
            dispersion_slope: 10.0,
        }
    }
}

/// Draw probability for the closed-form estimate shrinks linearly as the
/// rating gap widens.
#[derive(Debug, Clone, Copy)]
pub struct DrawCurve {
    pub base: f64,
    pub slope_per_point: f64,
    pub min: f64,
    pub max: f64,
}

impl Default for DrawCurve {
    fn default() -> Self {
        Self {
            base: 0.30,
            slope_per_point: 0.00075,
            min: 0.10,
            max: 0.35,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ModelConfig {
    pub elo: EloConfig,
    pub relaxation: RelaxationLadder,
    pub market: MarketBandConfig,
    pub confidence: ConfidenceConfig,
    pub draw_curve: DrawCurve,
}

impl ModelConfig {
    /// Truncation point of the Poisson score grid. Residual mass above
    /// this is absorbed by renormalizing the outcome buckets.
    pub const MAX_GOALS: u32 = 5;
}
