//! Reference data and the match log: JSON shapes, loaders, league-code
//! resolution, and the pre/post rating consistency check.
//!
//! The pipeline itself never touches the filesystem; everything here runs
//! once up front and hands the pipeline immutable snapshots.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::config::EloConfig;
use crate::elo;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Club {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub league: Option<String>,
    #[serde(default)]
    pub continent: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeagueEntry {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClubRating {
    pub club_id: u32,
    pub elo: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeAwayRating {
    pub club_id: u32,
    #[serde(default)]
    pub home_elo: Option<f64>,
    #[serde(default)]
    pub away_elo: Option<f64>,
}

/// One immutable, time-ordered log entry with both sides' rating
/// snapshots at the time the match was recorded. Post ratings are never
/// re-derived when later matches occur.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecord {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default, rename = "date_raw")]
    pub date_raw: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    pub home: u32,
    pub away: u32,
    pub home_goals: u32,
    pub away_goals: u32,
    pub home_elo_pre: f64,
    pub away_elo_pre: f64,
    pub home_elo_post: f64,
    pub away_elo_post: f64,
}

impl MatchRecord {
    /// League code derived from the source tag, e.g. "E0_2425.csv" -> "E0".
    pub fn league_code(&self) -> Option<&str> {
        league_code_from_source(self.source.as_deref()?)
    }

    pub fn parsed_date(&self) -> Option<NaiveDate> {
        self.date
            .as_deref()
            .and_then(parse_flexible_date)
            .or_else(|| self.date_raw.as_deref().and_then(parse_flexible_date))
    }
}

/// A result before rating replay has attached snapshots to it.
#[derive(Debug, Clone)]
pub struct RawResult {
    pub date: Option<String>,
    pub source: Option<String>,
    pub home: u32,
    pub away: u32,
    pub home_goals: u32,
    pub away_goals: u32,
}

/// Everything one estimation pass needs, loaded once and then immutable.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub clubs: Vec<Club>,
    pub leagues: Vec<LeagueEntry>,
    pub matches: Vec<MatchRecord>,
    pub ratings: Vec<ClubRating>,
    pub home_away: Vec<HomeAwayRating>,
}

impl Dataset {
    pub fn club_by_id(&self, id: u32) -> Option<&Club> {
        self.clubs.iter().find(|c| c.id == id)
    }

    /// Name resolution cascade: exact match, then contains, then
    /// starts-with, all case-insensitive. Fixture feeds abbreviate names
    /// inconsistently, so the looser passes catch most of them.
    pub fn club_by_name(&self, name: &str) -> Option<&Club> {
        let n = name.trim().to_lowercase();
        if n.is_empty() {
            return None;
        }
        self.clubs
            .iter()
            .find(|c| c.name.to_lowercase() == n)
            .or_else(|| self.clubs.iter().find(|c| c.name.to_lowercase().contains(&n)))
            .or_else(|| {
                self.clubs
                    .iter()
                    .find(|c| c.name.to_lowercase().starts_with(&n))
            })
    }

    /// Rating book assembled from the rating files, falling back to the
    /// initial rating for unknown clubs.
    pub fn rating_book(&self, cfg: &EloConfig) -> elo::RatingBook {
        let mut book = elo::RatingBook {
            initial: cfg.initial,
            ..elo::RatingBook::default()
        };
        for r in &self.ratings {
            book.overall.insert(r.club_id, r.elo);
        }
        for r in &self.home_away {
            if let Some(h) = r.home_elo {
                book.home_ctx.insert(r.club_id, h);
            }
            if let Some(a) = r.away_elo {
                book.away_ctx.insert(r.club_id, a);
            }
        }
        book
    }
}

/// Loads the data directory layout the site generators produce:
/// clubs.json, leagues.json, matches_full.json, ratings.json and the
/// optional ratings_home_away.json.
pub fn load_dataset(dir: &Path) -> Result<Dataset> {
    let clubs: Vec<Club> = read_json(&dir.join("clubs.json")).context("load clubs")?;
    let leagues: Vec<LeagueEntry> = read_json(&dir.join("leagues.json")).context("load leagues")?;
    let matches: Vec<MatchRecord> =
        read_json(&dir.join("matches_full.json")).context("load match log")?;
    let ratings: Vec<ClubRating> = read_json(&dir.join("ratings.json")).context("load ratings")?;

    // Home/away ratings are optional; fall back to overall-only.
    let home_away: Vec<HomeAwayRating> = match read_json(&dir.join("ratings_home_away.json")) {
        Ok(v) => v,
        Err(err) => {
            log::warn!("ratings_home_away.json unavailable: {err:#}");
            Vec::new()
        }
    };

    log::info!(
        "dataset loaded: {} clubs, {} leagues, {} matches, {} ratings",
        clubs.len(),
        leagues.len(),
        matches.len(),
        ratings.len()
    );

    Ok(Dataset {
        clubs,
        leagues,
        matches,
        ratings,
        home_away,
    })
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))
}

/// Leading alphanumeric segment of a source tag, up to the first '_'.
pub fn league_code_from_source(source: &str) -> Option<&str> {
    let (code, _) = source.split_once('_')?;
    if code.is_empty() || !code.chars().all(|ch| ch.is_ascii_alphanumeric()) {
        return None;
    }
    Some(code)
}

static LEAGUE_NAME_TO_CODE: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("premier league", "E0"),
        ("championship", "E1"),
        ("league one", "E2"),
        ("league two", "E3"),
        ("la liga", "SP1"),
        ("la liga 2", "SP2"),
        ("ligue 1", "F1"),
        ("ligue 2", "F2"),
        ("serie a", "I1"),
        ("serie b", "I2"),
        ("bundesliga", "D1"),
        ("bundesliga 2", "D2"),
        ("primeira división argentina", "AR1"),
        ("brasileirão série a", "BR1"),
    ])
});

/// Fixed league-name -> source-code table. Unmapped names make every
/// league-scoped query report "no comparable sample".
pub fn league_name_to_code(name: &str) -> Option<&'static str> {
    LEAGUE_NAME_TO_CODE
        .get(name.trim().to_lowercase().as_str())
        .copied()
}

/// Parses the date formats seen across the feeds: ISO, dd/mm/yyyy and
/// dd/mm/yy (two-digit years pivot at 50).
pub fn parse_flexible_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    // chrono's %Y happily accepts a two-digit year (as year 00xx), so the
    // format is chosen by the actual width of the year segment.
    let short_year = s.rsplit(['/', '-']).next().map(str::len) == Some(2);
    let formats: &[&str] = if short_year {
        &["%d/%m/%y", "%d-%m-%y"]
    } else {
        &["%d/%m/%Y", "%d-%m-%Y"]
    };
    for fmt in formats {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(if short_year { pivot_two_digit_year(d) } else { d });
        }
    }
    None
}

fn pivot_two_digit_year(d: NaiveDate) -> NaiveDate {
    // chrono maps %y to 20xx for 00-68 and 19xx for 69-99; the feeds pivot
    // at 50, so 51-68 belong to the 1900s. 69-99 already land there.
    use chrono::Datelike;
    let y = d.year();
    if (2051..=2068).contains(&y) {
        d.with_year(y - 100).unwrap_or(d)
    } else {
        d
    }
}

/// One log entry whose stored post ratings disagree with a fresh
/// recomputation from its own pre ratings and goals.
#[derive(Debug, Clone)]
pub struct LogInconsistency {
    pub index: usize,
    pub expected_home_post: f64,
    pub expected_away_post: f64,
}

/// Recomputes every record's deltas and reports the ones whose stored
/// post ratings drift beyond `tolerance`. A clean log returns an empty
/// vec.
pub fn verify_log(
    matches: &[MatchRecord],
    cfg: &EloConfig,
    tolerance: f64,
) -> Vec<LogInconsistency> {
    let mut out = Vec::new();
    for (index, m) in matches.iter().enumerate() {
        let up = elo::update_elo(
            m.home_elo_pre,
            m.away_elo_pre,
            m.home_goals,
            m.away_goals,
            cfg,
        );
        if (up.home_post - m.home_elo_post).abs() > tolerance
            || (up.away_post - m.away_elo_post).abs() > tolerance
        {
            out.push(LogInconsistency {
                index,
                expected_home_post: up.home_post,
                expected_away_post: up.away_post,
            });
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn league_code_from_source_strips_season_suffix() {
        assert_eq!(league_code_from_source("E0_2425.csv"), Some("E0"));
        assert_eq!(league_code_from_source("SP1_2021.csv"), Some("SP1"));
        assert_eq!(league_code_from_source("nounderscore"), None);
        assert_eq!(league_code_from_source("_2425.csv"), None);
    }

    #[test]
    fn league_name_mapping_is_case_insensitive() {
        assert_eq!(league_name_to_code("Premier League"), Some("E0"));
        assert_eq!(league_name_to_code("  la liga "), Some("SP1"));
        assert_eq!(league_name_to_code("Brasileirão Série A"), Some("BR1"));
        assert_eq!(league_name_to_code("MLS"), None);
    }

    #[test]
    fn flexible_date_formats() {
        let want = NaiveDate::from_ymd_opt(2024, 8, 17).unwrap();
        assert_eq!(parse_flexible_date("2024-08-17"), Some(want));
        assert_eq!(parse_flexible_date("17/08/2024"), Some(want));
        assert_eq!(parse_flexible_date("17-08-2024"), Some(want));
        // The two-digit form must land in 2024, not year 0024, or mixed
        // ISO and dd/mm/yy logs sort nonsensically.
        assert_eq!(parse_flexible_date("17/08/24"), Some(want));
        assert_eq!(parse_flexible_date("-"), None);
    }

    #[test]
    fn two_digit_years_pivot_at_fifty() {
        let d = |y, m, day| NaiveDate::from_ymd_opt(y, m, day).unwrap();
        assert_eq!(parse_flexible_date("01/01/00"), Some(d(2000, 1, 1)));
        assert_eq!(parse_flexible_date("01/01/50"), Some(d(2050, 1, 1)));
        // 51-68 sit above chrono's own pivot but below the feeds'.
        assert_eq!(parse_flexible_date("17/08/55"), Some(d(1955, 8, 17)));
        assert_eq!(parse_flexible_date("17/08/68"), Some(d(1968, 8, 17)));
        assert_eq!(parse_flexible_date("17/08/69"), Some(d(1969, 8, 17)));
        assert_eq!(parse_flexible_date("17/08/99"), Some(d(1999, 8, 17)));
        // Four-digit years are never re-pivoted.
        assert_eq!(parse_flexible_date("17/08/1955"), Some(d(1955, 8, 17)));
        assert_eq!(parse_flexible_date("17/08/2055"), Some(d(2055, 8, 17)));
    }

    #[test]
    fn club_name_cascade() {
        let ds = Dataset {
            clubs: vec![
                Club {
                    id: 1,
                    name: "Manchester United".into(),
                    league: Some("Premier League".into()),
                    continent: Some("Europe".into()),
                },
                Club {
                    id: 2,
                    name: "Manchester City".into(),
                    league: Some("Premier League".into()),
                    continent: Some("Europe".into()),
                },
            ],
            ..Dataset::default()
        };
        assert_eq!(ds.club_by_name("manchester city").unwrap().id, 2);
        // "United" only appears in one name, so the contains pass finds it.
        assert_eq!(ds.club_by_name("United").unwrap().id, 1);
        assert!(ds.club_by_name("Arsenal").is_none());
    }

    #[test]
    fn verify_log_flags_tampered_record() {
        let cfg = EloConfig::default();
        let up = elo::update_elo(1800.0, 1750.0, 3, 1, &cfg);
        let good = MatchRecord {
            date: None,
            date_raw: None,
            source: Some("E0_2425.csv".into()),
            home: 1,
            away: 2,
            home_goals: 3,
            away_goals: 1,
            home_elo_pre: 1800.0,
            away_elo_pre: 1750.0,
            home_elo_post: up.home_post,
            away_elo_post: up.away_post,
        };
        let mut bad = good.clone();
        bad.home_elo_post += 4.0;

        assert!(verify_log(&[good.clone()], &cfg, 1e-6).is_empty());
        let issues = verify_log(&[good, bad], &cfg, 1e-6);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].index, 1);
    }
}
