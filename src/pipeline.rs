//! Per-fixture orchestration: market reconciliation first, rating
//! proximity next, closed form last. Each run is a pure function of its
//! inputs, so a batch is embarrassingly parallel across fixtures.

use rayon::prelude::*;

use crate::config::ModelConfig;
use crate::confidence;
use crate::data::league_name_to_code;
use crate::economics::{self, GoalEconomics};
use crate::elo::RatingBook;
use crate::error::EstimateError;
use crate::history::{FormTrend, MatchHistoryIndex};
use crate::market::{self, MarketOdds};
use crate::model::{self, OutcomeEstimate};

/// Matches considered for a club's recent-form average.
const FORM_MATCHES: usize = 5;

#[derive(Debug, Clone)]
pub struct Fixture {
    pub date: Option<String>,
    pub home_id: u32,
    pub away_id: u32,
    /// League display name; resolved against the fixed code table.
    pub league_name: Option<String>,
    pub market_odds: Option<MarketOdds>,
}

/// Which estimation tier finally produced the primary estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EstimateMethod {
    MarketBand,
    LeagueHistory,
    ClosedForm,
}

#[derive(Debug, Clone)]
pub struct FixtureEstimate {
    pub method: EstimateMethod,
    pub estimate: OutcomeEstimate,
    pub confidence: f64,
    /// Secondary estimate from the two clubs' own role-specific history,
    /// when such a sample exists. Rendered alongside the primary.
    pub club_estimate: Option<OutcomeEstimate>,
    pub club_confidence: Option<f64>,
    pub economics: Option<GoalEconomics>,
    /// Economics recomputed over the club-pair sample's goal means.
    pub club_economics: Option<GoalEconomics>,
    pub home_rating: f64,
    pub away_rating: f64,
    pub home_trend: Option<FormTrend>,
    pub away_trend: Option<FormTrend>,
}

/// Runs the full fallback chain for one fixture. Never fails: the closed
/// form always produces a value from two finite ratings.
pub fn estimate_fixture(
    fixture: &Fixture,
    index: &MatchHistoryIndex<'_>,
    book: &RatingBook,
    cfg: &ModelConfig,
) -> FixtureEstimate {
    let home_rating = book.home_rating(fixture.home_id);
    let away_rating = book.away_rating(fixture.away_id);
    let league_code = fixture.league_name.as_deref().and_then(|name| {
        let code = league_name_to_code(name);
        if code.is_none() {
            // Both history tiers will be skipped for this fixture.
            log::debug!("{}", EstimateError::UnresolvedLeague(name.to_string()));
        }
        code
    });

    let mut method = EstimateMethod::ClosedForm;
    let mut estimate = None;

    // Tier 1: market-implied bands, when the caller supplied odds.
    if let (Some(odds), Some(code)) = (&fixture.market_odds, league_code) {
        let league = index.league_matches(code);
        if let Ok(set) = market::reconcile(&league, odds, cfg)
            && let Some(est) = model::estimate_from_set(&set, cfg)
        {
            method = EstimateMethod::MarketBand;
            estimate = Some(est);
        }
    }

    // Tier 2: league-wide rating proximity.
    if estimate.is_none()
        && let Some(code) = league_code
        && let Ok(set) =
            index.by_league_and_rating_proximity(code, home_rating, away_rating, &cfg.relaxation)
        && let Some(est) = model::estimate_from_set(&set, cfg)
    {
        method = EstimateMethod::LeagueHistory;
        estimate = Some(est);
    }

    // Tier 3: closed form, the estimate of last resort.
    let estimate =
        estimate.unwrap_or_else(|| model::closed_form_estimate(home_rating, away_rating, cfg));

    let confidence = estimate_confidence(&estimate, cfg);

    let club_estimate = index
        .club_pair_history(
            fixture.home_id,
            fixture.away_id,
            home_rating,
            away_rating,
            &cfg.relaxation,
        )
        .ok()
        .and_then(|set| model::estimate_from_set(&set, cfg));
    let club_confidence = club_estimate
        .as_ref()
        .map(|est| estimate_confidence(est, cfg));

    let econ_for = |est: &OutcomeEstimate| {
        est.goals.as_ref().map(|goals| {
            let (home_odd, away_odd) = match &fixture.market_odds {
                Some(odds) => economics::market_pair(odds),
                None => (est.home_odd, est.away_odd),
            };
            economics::goal_economics(goals, home_odd, away_odd)
        })
    };
    let economics = econ_for(&estimate);
    let club_economics = club_estimate.as_ref().and_then(|est| econ_for(est));

    let home_trend = index
        .recent_form(fixture.home_id, true, FORM_MATCHES)
        .map(|form| FormTrend::classify(home_rating, form));
    let away_trend = index
        .recent_form(fixture.away_id, false, FORM_MATCHES)
        .map(|form| FormTrend::classify(away_rating, form));

    FixtureEstimate {
        method,
        estimate,
        confidence,
        club_estimate,
        club_confidence,
        economics,
        club_economics,
        home_rating,
        away_rating,
        home_trend,
        away_trend,
    }
}

fn estimate_confidence(estimate: &OutcomeEstimate, cfg: &ModelConfig) -> f64 {
    match estimate.dispersion_confidence {
        Some(dispersion) => {
            confidence::combined_confidence(estimate.sample_size, dispersion, &cfg.confidence)
        }
        None => confidence::sample_size_confidence(estimate.sample_size, &cfg.confidence),
    }
}

/// Batch entry point. Fixtures are independent, so they fan out across
/// the rayon pool; output order matches input order.
pub fn estimate_all(
    fixtures: &[Fixture],
    index: &MatchHistoryIndex<'_>,
    book: &RatingBook,
    cfg: &ModelConfig,
) -> Vec<FixtureEstimate> {
    fixtures
        .par_iter()
        .map(|fixture| estimate_fixture(fixture, index, book, cfg))
        .collect()
}
