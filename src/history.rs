//! Read-only comparable-match retrieval over the match log.
//!
//! Every query filters on *both* sides' pre-match ratings at once (both
//! tolerances must hold, not either), and widens the tolerance through
//! the configured ladder before admitting defeat. An empty result is
//! reported as an absence, never padded with fabricated matches.

use chrono::NaiveDate;

use crate::config::RelaxationLadder;
use crate::data::MatchRecord;
use crate::error::EstimateError;

/// Matches selected as statistically similar to one queried fixture.
/// `home_side` supplies home-goal observations and `away_side` away-goal
/// observations; league-wide queries share one set for both.
#[derive(Debug, Clone)]
pub struct ComparableSet<'a> {
    pub home_side: Vec<&'a MatchRecord>,
    pub away_side: Vec<&'a MatchRecord>,
    /// Tolerance that finally produced the sample.
    pub range: f64,
    /// True when any relaxation step beyond the base range was needed.
    pub widened: bool,
    shared: bool,
}

impl<'a> ComparableSet<'a> {
    pub fn from_sides(
        home_side: Vec<&'a MatchRecord>,
        away_side: Vec<&'a MatchRecord>,
        range: f64,
        widened: bool,
    ) -> Self {
        Self {
            home_side,
            away_side,
            range,
            widened,
            shared: false,
        }
    }

    pub fn from_shared(records: Vec<&'a MatchRecord>, range: f64, widened: bool) -> Self {
        Self {
            home_side: records.clone(),
            away_side: records,
            range,
            widened,
            shared: true,
        }
    }

    /// Distinct matches backing the estimate. A shared set counts each
    /// match once even though it feeds both goal distributions.
    pub fn sample_size(&self) -> usize {
        if self.shared {
            self.home_side.len()
        } else {
            self.home_side.len() + self.away_side.len()
        }
    }
}

/// Average pre-match rating over a club's most recent matches in a role.
#[derive(Debug, Clone, Copy)]
pub struct FormSample {
    pub avg_elo: f64,
    pub sample_size: usize,
}

/// Current rating vs recent form, with a ±20-point dead zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormTrend {
    Up,
    Flat,
    Down,
}

impl FormTrend {
    pub fn classify(current_elo: f64, form: FormSample) -> Self {
        let diff = current_elo - form.avg_elo;
        if diff >= 20.0 {
            FormTrend::Up
        } else if diff <= -20.0 {
            FormTrend::Down
        } else {
            FormTrend::Flat
        }
    }
}

pub struct MatchHistoryIndex<'a> {
    matches: &'a [MatchRecord],
}

impl<'a> MatchHistoryIndex<'a> {
    pub fn new(matches: &'a [MatchRecord]) -> Self {
        Self { matches }
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Matches where `club_id` played in the stated role and both sides'
    /// pre-match ratings fall within `range` of their targets. A league
    /// code, when given, must also match the record's source tag.
    pub fn by_club_and_rating_proximity(
        &self,
        club_id: u32,
        is_home: bool,
        home_target: f64,
        away_target: f64,
        league_code: Option<&str>,
        range: f64,
    ) -> Vec<&'a MatchRecord> {
        self.matches
            .iter()
            .filter(|m| {
                if is_home {
                    m.home == club_id
                } else {
                    m.away == club_id
                }
            })
            .filter(|m| match league_code {
                Some(code) => m.league_code() == Some(code),
                None => true,
            })
            .filter(|m| within_ranges(m, home_target, away_target, range))
            .collect()
    }

    /// Club-pair retrieval for a fixture: the home club's home matches
    /// supply home goals, the away club's away matches supply away goals.
    /// The ladder widens while *both* sides are empty; a one-sided sample
    /// still fails because the goal model needs observations for each
    /// side.
    pub fn club_pair_history(
        &self,
        home_club: u32,
        away_club: u32,
        home_target: f64,
        away_target: f64,
        ladder: &RelaxationLadder,
    ) -> Result<ComparableSet<'a>, EstimateError> {
        let mut chosen: Option<(Vec<&MatchRecord>, Vec<&MatchRecord>, f64, bool)> = None;
        for (step, range) in ladder.steps.iter().copied().enumerate() {
            let home_side = self.by_club_and_rating_proximity(
                home_club,
                true,
                home_target,
                away_target,
                None,
                range,
            );
            let away_side = self.by_club_and_rating_proximity(
                away_club,
                false,
                home_target,
                away_target,
                None,
                range,
            );
            if !home_side.is_empty() || !away_side.is_empty() {
                chosen = Some((home_side, away_side, range, step > 0));
                break;
            }
        }

        let (home_side, away_side, range, widened) =
            chosen.ok_or(EstimateError::NoComparableSample)?;
        if home_side.is_empty() || away_side.is_empty() {
            return Err(EstimateError::NoComparableSample);
        }
        Ok(ComparableSet::from_sides(home_side, away_side, range, widened))
    }

    /// League-wide baseline: ignores club identity and keeps any match in
    /// the league whose two pre-match ratings sit near the fixture's.
    pub fn by_league_and_rating_proximity(
        &self,
        league_code: &str,
        home_target: f64,
        away_target: f64,
        ladder: &RelaxationLadder,
    ) -> Result<ComparableSet<'a>, EstimateError> {
        for (step, range) in ladder.steps.iter().copied().enumerate() {
            let found: Vec<&MatchRecord> = self
                .matches
                .iter()
                .filter(|m| m.league_code() == Some(league_code))
                .filter(|m| within_ranges(m, home_target, away_target, range))
                .collect();
            if !found.is_empty() {
                return Ok(ComparableSet::from_shared(found, range, step > 0));
            }
        }
        Err(EstimateError::NoComparableSample)
    }

    /// Every match recorded for a league, for callers that do their own
    /// filtering (market-odds reconciliation).
    pub fn league_matches(&self, league_code: &str) -> Vec<&'a MatchRecord> {
        self.matches
            .iter()
            .filter(|m| m.league_code() == Some(league_code))
            .collect()
    }

    /// Average pre-match rating over the club's last `n` matches in the
    /// given role, newest first. Records without a parseable date are
    /// skipped so ordering stays well-defined.
    pub fn recent_form(&self, club_id: u32, is_home: bool, n: usize) -> Option<FormSample> {
        if n == 0 {
            return None;
        }
        let mut played: Vec<(NaiveDate, f64)> = self
            .matches
            .iter()
            .filter(|m| {
                if is_home {
                    m.home == club_id
                } else {
                    m.away == club_id
                }
            })
            .filter_map(|m| {
                let date = m.parsed_date()?;
                let pre = if is_home {
                    m.home_elo_pre
                } else {
                    m.away_elo_pre
                };
                Some((date, pre))
            })
            .collect();
        if played.is_empty() {
            return None;
        }
        played.sort_by(|a, b| b.0.cmp(&a.0));
        played.truncate(n);

        let sum: f64 = played.iter().map(|(_, pre)| pre).sum();
        Some(FormSample {
            avg_elo: sum / played.len() as f64,
            sample_size: played.len(),
        })
    }
}

fn within_ranges(m: &MatchRecord, home_target: f64, away_target: f64, range: f64) -> bool {
    (m.home_elo_pre - home_target).abs() <= range && (m.away_elo_pre - away_target).abs() <= range
}
