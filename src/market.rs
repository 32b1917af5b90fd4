//! Market-odds reconciliation: when the caller supplies bookmaker odds,
//! comparable matches are the ones whose rating-implied odds would have
//! landed near the market's view, instead of the ones with nearby raw
//! ratings.

use crate::config::{MarketBandConfig, ModelConfig};
use crate::data::MatchRecord;
use crate::error::EstimateError;
use crate::history::ComparableSet;
use crate::model;

/// Decimal odds supplied by an external market feed. The draw price is
/// carried for display but reconciliation keys off the two win prices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarketOdds {
    pub home: f64,
    pub draw: Option<f64>,
    pub away: f64,
}

pub fn implied_probability(odd: f64) -> Option<f64> {
    (odd > 0.0).then(|| 1.0 / odd)
}

/// Symmetric probability band around an implied probability, clamped
/// away from the degenerate endpoints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbBand {
    pub lo: f64,
    pub hi: f64,
}

pub fn probability_band(implied: f64, half_width: f64, cfg: &MarketBandConfig) -> ProbBand {
    ProbBand {
        lo: (implied - half_width).clamp(cfg.prob_floor, cfg.prob_ceil),
        hi: (implied + half_width).clamp(cfg.prob_floor, cfg.prob_ceil),
    }
}

/// Odds bounds for a probability band. Probability and odds are inverse,
/// so the band's upper probability becomes the lower odds bound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OddsBounds {
    pub min: f64,
    pub max: f64,
}

impl OddsBounds {
    pub fn from_band(band: ProbBand) -> Self {
        Self {
            min: 1.0 / band.hi,
            max: 1.0 / band.lo,
        }
    }

    pub fn contains(&self, odd: f64) -> bool {
        odd >= self.min && odd <= self.max
    }
}

/// Selects the league matches whose closed-form estimated odds (from
/// their own pre-match ratings) fall inside both market bands. An empty
/// result doubles the band half-width `widen_retries` times before
/// reporting "no comparable sample" - deliberately a shorter ladder than
/// the Elo-proximity one.
pub fn reconcile<'a>(
    league_matches: &[&'a MatchRecord],
    odds: &MarketOdds,
    cfg: &ModelConfig,
) -> Result<ComparableSet<'a>, EstimateError> {
    let p_home = implied_probability(odds.home).ok_or(EstimateError::NoComparableSample)?;
    let p_away = implied_probability(odds.away).ok_or(EstimateError::NoComparableSample)?;

    let mut half_width = cfg.market.half_width;
    for attempt in 0..=cfg.market.widen_retries {
        let home_bounds = OddsBounds::from_band(probability_band(p_home, half_width, &cfg.market));
        let away_bounds = OddsBounds::from_band(probability_band(p_away, half_width, &cfg.market));

        let kept: Vec<&MatchRecord> = league_matches
            .iter()
            .copied()
            .filter(|m| {
                let est = model::closed_form_estimate(m.home_elo_pre, m.away_elo_pre, cfg);
                match (est.home_odd, est.away_odd) {
                    (Some(h), Some(a)) => home_bounds.contains(h) && away_bounds.contains(a),
                    _ => false,
                }
            })
            .collect();

        if !kept.is_empty() {
            return Ok(ComparableSet::from_shared(kept, half_width, attempt > 0));
        }
        half_width *= 2.0;
    }

    Err(EstimateError::NoComparableSample)
}
