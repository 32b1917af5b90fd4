//! Outcome probability models: the Poisson goal model over a comparable
//! set, and the closed-form rating-only estimate used when no history
//! survives the filters.

use crate::config::ModelConfig;
use crate::confidence;
use crate::elo;
use crate::history::ComparableSet;

/// Mean/stddev of goals scored by one side across its comparable sample.
#[derive(Debug, Clone, Copy)]
pub struct GoalStats {
    pub mean: f64,
    pub stddev: f64,
    pub n: usize,
}

pub fn goal_stats(goals: &[u32]) -> Option<GoalStats> {
    if goals.is_empty() {
        return None;
    }
    let n = goals.len() as f64;
    let mean = goals.iter().map(|g| *g as f64).sum::<f64>() / n;
    let variance = goals
        .iter()
        .map(|g| {
            let d = *g as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / n;
    Some(GoalStats {
        mean,
        stddev: variance.sqrt(),
        n: goals.len(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GoalSummary {
    pub home_mean: f64,
    pub home_stddev: f64,
    pub away_mean: f64,
    pub away_stddev: f64,
}

/// Derived value object for one fixture query. Probabilities sum to 1
/// within float tolerance; odds are absent where a bucket's probability
/// is exactly zero.
#[derive(Debug, Clone, PartialEq)]
pub struct OutcomeEstimate {
    pub home_prob: f64,
    pub draw_prob: f64,
    pub away_prob: f64,
    pub home_odd: Option<f64>,
    pub draw_odd: Option<f64>,
    pub away_odd: Option<f64>,
    pub sample_size: usize,
    /// Lower goal spread in the sample means a steadier scoring pattern
    /// and a higher value here. Absent for the closed-form estimate.
    pub dispersion_confidence: Option<f64>,
    pub goals: Option<GoalSummary>,
    /// True when the sample only exists because a tolerance was widened.
    pub widened: bool,
}

fn safe_odd(p: f64) -> Option<f64> {
    (p > 0.0).then(|| 1.0 / p)
}

/// P(X = k) for k in 0..=max_k via the usual multiplicative recurrence.
/// The truncated tail is *not* folded back in; the outcome buckets are
/// renormalized instead.
fn poisson_pmf(lambda: f64, max_k: u32) -> Vec<f64> {
    let lambda = lambda.max(0.0);
    let mut out = vec![0.0; max_k as usize + 1];
    out[0] = (-lambda).exp();
    for k in 1..=max_k as usize {
        out[k] = out[k - 1] * lambda / k as f64;
    }
    out
}

/// Poisson model over a comparable set. Each side's goals are modeled as
/// independent Poisson draws with lambda equal to that side's sample
/// mean; the joint grid over 0..=5 goals is folded into win/draw/loss
/// buckets and renormalized to absorb the truncated mass.
///
/// Returns `None` when either side has no observations: an empty sample
/// yields no estimate, never a fabricated one.
pub fn estimate_from_set(set: &ComparableSet<'_>, cfg: &ModelConfig) -> Option<OutcomeEstimate> {
    let home_goals: Vec<u32> = set.home_side.iter().map(|m| m.home_goals).collect();
    let away_goals: Vec<u32> = set.away_side.iter().map(|m| m.away_goals).collect();
    let home = goal_stats(&home_goals)?;
    let away = goal_stats(&away_goals)?;

    let pmf_h = poisson_pmf(home.mean, ModelConfig::MAX_GOALS);
    let pmf_a = poisson_pmf(away.mean, ModelConfig::MAX_GOALS);

    let mut p_home = 0.0;
    let mut p_draw = 0.0;
    let mut p_away = 0.0;
    for (h, p_h) in pmf_h.iter().enumerate() {
        for (a, p_a) in pmf_a.iter().enumerate() {
            let joint = p_h * p_a;
            if h > a {
                p_home += joint;
            } else if h == a {
                p_draw += joint;
            } else {
                p_away += joint;
            }
        }
    }

    let total = p_home + p_draw + p_away;
    if total <= 0.0 {
        return None;
    }
    p_home /= total;
    p_draw /= total;
    p_away /= total;

    let avg_stddev = (home.stddev + away.stddev) / 2.0;
    let dispersion = confidence::dispersion_confidence(avg_stddev, &cfg.confidence);

    Some(OutcomeEstimate {
        home_prob: p_home,
        draw_prob: p_draw,
        away_prob: p_away,
        home_odd: safe_odd(p_home),
        draw_odd: safe_odd(p_draw),
        away_odd: safe_odd(p_away),
        sample_size: set.sample_size(),
        dispersion_confidence: Some(dispersion),
        goals: Some(GoalSummary {
            home_mean: home.mean,
            home_stddev: home.stddev,
            away_mean: away.mean,
            away_stddev: away.stddev,
        }),
        widened: set.widened,
    })
}

/// Estimate of last resort, straight from current ratings: logistic
/// expected score plus a draw share that shrinks as the rating gap
/// widens. Always succeeds given two finite ratings; carries the lowest
/// confidence tier (sample size 0).
pub fn closed_form_estimate(
    home_rating: f64,
    away_rating: f64,
    cfg: &ModelConfig,
) -> OutcomeEstimate {
    let exp_home = elo::expected_home(home_rating, away_rating, &cfg.elo);
    let gap = (home_rating - away_rating).abs();
    let dc = cfg.draw_curve;
    let draw = (dc.base - dc.slope_per_point * gap).clamp(dc.min, dc.max);

    let home = exp_home * (1.0 - draw);
    let away = (1.0 - exp_home) * (1.0 - draw);

    OutcomeEstimate {
        home_prob: home,
        draw_prob: draw,
        away_prob: away,
        home_odd: safe_odd(home),
        draw_odd: safe_odd(draw),
        away_odd: safe_odd(away),
        sample_size: 0,
        dispersion_confidence: None,
        goals: None,
        widened: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::MatchRecord;

    fn record(home_goals: u32, away_goals: u32) -> MatchRecord {
        MatchRecord {
            date: None,
            date_raw: None,
            source: Some("E0_2425.csv".into()),
            home: 1,
            away: 2,
            home_goals,
            away_goals,
            home_elo_pre: 1800.0,
            away_elo_pre: 1800.0,
            home_elo_post: 1800.0,
            away_elo_post: 1800.0,
        }
    }

    #[test]
    fn goal_stats_population_spread() {
        let s = goal_stats(&[0, 2, 4]).unwrap();
        assert!((s.mean - 2.0).abs() < 1e-12);
        assert!((s.stddev - (8.0f64 / 3.0).sqrt()).abs() < 1e-12);
        assert!(goal_stats(&[]).is_none());
    }

    #[test]
    fn probabilities_sum_to_one() {
        let records = vec![record(2, 1), record(1, 1), record(3, 0), record(0, 2)];
        let refs: Vec<&MatchRecord> = records.iter().collect();
        let set = ComparableSet::from_shared(refs, 25.0, false);
        let est = estimate_from_set(&set, &ModelConfig::default()).unwrap();
        let sum = est.home_prob + est.draw_prob + est.away_prob;
        assert!((sum - 1.0).abs() < 1e-9);
        assert_eq!(est.sample_size, 4);
        assert!(est.home_odd.is_some());
    }

    #[test]
    fn zero_probability_bucket_has_no_odds() {
        // All comparable matches were goalless, so both lambdas are zero
        // and the whole mass lands on the draw.
        let records = vec![record(0, 0), record(0, 0)];
        let refs: Vec<&MatchRecord> = records.iter().collect();
        let set = ComparableSet::from_shared(refs, 25.0, false);
        let est = estimate_from_set(&set, &ModelConfig::default()).unwrap();
        assert!((est.draw_prob - 1.0).abs() < 1e-9);
        assert_eq!(est.home_odd, None);
        assert_eq!(est.away_odd, None);
        assert!((est.draw_odd.unwrap() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn steadier_samples_score_higher_dispersion_confidence() {
        let cfg = ModelConfig::default();
        let steady = vec![record(1, 1), record(1, 1), record(1, 1)];
        let wild = vec![record(0, 4), record(5, 0), record(0, 0)];
        let steady_refs: Vec<&MatchRecord> = steady.iter().collect();
        let wild_refs: Vec<&MatchRecord> = wild.iter().collect();
        let s = estimate_from_set(&ComparableSet::from_shared(steady_refs, 25.0, false), &cfg)
            .unwrap();
        let w =
            estimate_from_set(&ComparableSet::from_shared(wild_refs, 25.0, false), &cfg).unwrap();
        assert!(s.dispersion_confidence.unwrap() > w.dispersion_confidence.unwrap());
    }

    #[test]
    fn closed_form_draw_share_shrinks_with_gap() {
        let cfg = ModelConfig::default();
        let even = closed_form_estimate(1800.0, 1800.0, &cfg);
        assert!((even.draw_prob - 0.30).abs() < 1e-12);

        let lopsided = closed_form_estimate(2200.0, 1700.0, &cfg);
        // 0.30 - 0.00075 * 500 clamps at the floor.
        assert!((lopsided.draw_prob - 0.10).abs() < 1e-12);
        assert!(lopsided.home_prob > lopsided.away_prob);

        for est in [&even, &lopsided] {
            let sum = est.home_prob + est.draw_prob + est.away_prob;
            assert!((sum - 1.0).abs() < 1e-9);
            assert_eq!(est.sample_size, 0);
            assert!(est.goals.is_none());
        }
    }
}
