//! Margin-adjusted Elo rating engine. Pure functions; the only authority
//! for rating mutation anywhere in the crate.

use std::collections::HashMap;

use crate::config::EloConfig;
use crate::data::{MatchRecord, RawResult};

/// Result of applying one recorded match to both sides' ratings.
#[derive(Debug, Clone, Copy)]
pub struct EloUpdate {
    pub home_post: f64,
    pub away_post: f64,
    pub home_delta: f64,
    pub away_delta: f64,
}

/// Logistic expected score for the home side, with the fixed home
/// advantage folded into the home rating before the comparison.
pub fn expected_home(home_rating: f64, away_rating: f64, cfg: &EloConfig) -> f64 {
    let home_adj = home_rating + cfg.home_adv_pts;
    1.0 / (1.0 + 10.0_f64.powf(-((home_adj - away_rating) / 400.0)))
}

/// Larger winning margins produce larger rating swings: one-goal results
/// are unscaled, two-goal wins get 1.5x, and from three goals up the
/// factor grows linearly as (11 + diff) / 8.
pub fn margin_multiplier(goal_diff: u32) -> f64 {
    match goal_diff {
        0 | 1 => 1.0,
        2 => 1.5,
        d => (11.0 + d as f64) / 8.0,
    }
}

/// Applies one match result to both pre-match ratings. Must be called
/// exactly once per recorded match, in chronological order, so that the
/// stored pre/post snapshots stay consistent.
pub fn update_elo(
    home_pre: f64,
    away_pre: f64,
    home_goals: u32,
    away_goals: u32,
    cfg: &EloConfig,
) -> EloUpdate {
    let exp_home = expected_home(home_pre, away_pre, cfg);
    let exp_away = 1.0 - exp_home;

    let s_home = if home_goals > away_goals {
        1.0
    } else if home_goals < away_goals {
        0.0
    } else {
        0.5
    };
    let s_away = 1.0 - s_home;

    let m = margin_multiplier(home_goals.abs_diff(away_goals));
    let home_delta = cfg.k * m * (s_home - exp_home);
    let away_delta = cfg.k * m * (s_away - exp_away);

    EloUpdate {
        home_post: home_pre + home_delta,
        away_post: away_pre + away_delta,
        home_delta,
        away_delta,
    }
}

/// Current ratings per club in all three contexts. Values drift forward
/// only; replaying the log is the sole way to produce them.
#[derive(Debug, Clone, Default)]
pub struct RatingBook {
    pub overall: HashMap<u32, f64>,
    pub home_ctx: HashMap<u32, f64>,
    pub away_ctx: HashMap<u32, f64>,
    pub initial: f64,
}

impl RatingBook {
    pub fn overall_rating(&self, club_id: u32) -> f64 {
        self.overall.get(&club_id).copied().unwrap_or(self.initial)
    }

    pub fn home_rating(&self, club_id: u32) -> f64 {
        self.home_ctx.get(&club_id).copied().unwrap_or(self.initial)
    }

    pub fn away_rating(&self, club_id: u32) -> f64 {
        self.away_ctx.get(&club_id).copied().unwrap_or(self.initial)
    }
}

/// Replays raw results in the given (chronological) order, producing the
/// per-match pre/post snapshots and the final rating book.
///
/// Home/away-context ratings use the same update rule but each record only
/// touches the home club's home-context value and the away club's
/// away-context value.
pub fn replay_results(results: &[RawResult], cfg: &EloConfig) -> (Vec<MatchRecord>, RatingBook) {
    let mut book = RatingBook {
        initial: cfg.initial,
        ..RatingBook::default()
    };
    let mut log = Vec::with_capacity(results.len());

    for r in results {
        let home_pre = book.overall_rating(r.home);
        let away_pre = book.overall_rating(r.away);
        let up = update_elo(home_pre, away_pre, r.home_goals, r.away_goals, cfg);
        book.overall.insert(r.home, up.home_post);
        book.overall.insert(r.away, up.away_post);

        let ctx_home_pre = book.home_rating(r.home);
        let ctx_away_pre = book.away_rating(r.away);
        let ctx = update_elo(ctx_home_pre, ctx_away_pre, r.home_goals, r.away_goals, cfg);
        book.home_ctx.insert(r.home, ctx.home_post);
        book.away_ctx.insert(r.away, ctx.away_post);

        log.push(MatchRecord {
            date: r.date.clone(),
            date_raw: r.date.clone(),
            source: r.source.clone(),
            home: r.home,
            away: r.away,
            home_goals: r.home_goals,
            away_goals: r.away_goals,
            home_elo_pre: home_pre,
            away_elo_pre: away_pre,
            home_elo_post: up.home_post,
            away_elo_post: up.away_post,
        });
    }

    (log, book)
}
