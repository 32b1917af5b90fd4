//! Goal economics: unitless efficiency indicators comparing a side's
//! expected goals against the odds on offer. Display ranking only; these
//! never feed back into outcome probabilities.

use crate::market::MarketOdds;
use crate::model::GoalSummary;

/// Per-side indicators. Higher value / lower cost favors that side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SideEconomics {
    /// Mean goals divided by the opposing side's odds.
    pub goal_value: Option<f64>,
    /// Reciprocal of mean goals times the side's own odds.
    pub goal_cost: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GoalEconomics {
    pub home: SideEconomics,
    pub away: SideEconomics,
}

fn side(mean_goals: f64, own_odd: Option<f64>, opposing_odd: Option<f64>) -> SideEconomics {
    let goal_value = opposing_odd
        .filter(|o| *o > 0.0)
        .map(|o| mean_goals / o);
    let goal_cost = own_odd
        .filter(|o| *o > 0.0 && mean_goals > 0.0)
        .map(|o| 1.0 / (mean_goals * o));
    SideEconomics {
        goal_value,
        goal_cost,
    }
}

/// Computes both sides' indicators from the goal model's means and a pair
/// of home/away odds (market prices when available, model odds
/// otherwise).
pub fn goal_economics(
    goals: &GoalSummary,
    home_odd: Option<f64>,
    away_odd: Option<f64>,
) -> GoalEconomics {
    GoalEconomics {
        home: side(goals.home_mean, home_odd, away_odd),
        away: side(goals.away_mean, away_odd, home_odd),
    }
}

/// Model odds vs market odds, the way the comparison is surfaced:
/// a market price more than 10% above the model's is flagged as value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSignal {
    Value,
    Fair,
    Poor,
}

pub fn value_signal(model_odd: f64, market_odd: f64) -> Option<ValueSignal> {
    if model_odd <= 0.0 || market_odd <= 0.0 {
        return None;
    }
    Some(if market_odd > model_odd * 1.10 {
        ValueSignal::Value
    } else if market_odd > model_odd {
        ValueSignal::Fair
    } else {
        ValueSignal::Poor
    })
}

pub fn market_pair(odds: &MarketOdds) -> (Option<f64>, Option<f64>) {
    (Some(odds.home), Some(odds.away))
}
