//! Fixture-list and result-list CSV ingestion (football-data.co.uk
//! column layout). Input acquisition happens here, before the pipeline
//! runs; the pipeline itself never parses anything.

use crate::data::{Dataset, RawResult, parse_flexible_date};
use crate::market::MarketOdds;
use crate::pipeline::Fixture;

fn header_index(headers: &[&str], name: &str) -> Option<usize> {
    headers.iter().position(|h| h.trim() == name)
}

fn cell<'a>(cols: &'a [&'a str], idx: Option<usize>) -> Option<&'a str> {
    let s = cols.get(idx?)?.trim();
    (!s.is_empty()).then_some(s)
}

/// Parses an upcoming-fixtures CSV into pipeline fixtures. Club names
/// are resolved against the directory; rows naming unknown clubs are
/// dropped rather than guessed at. The fixture's league comes from the
/// home club's directory entry, and the B365 columns become market odds
/// when both win prices parse.
pub fn parse_fixtures_csv(text: &str, dataset: &Dataset) -> Vec<Fixture> {
    let mut lines = text.lines().filter(|l| !l.trim().is_empty());
    let Some(header_line) = lines.next() else {
        return Vec::new();
    };
    let headers: Vec<&str> = header_line.split(',').collect();

    let date_idx = header_index(&headers, "Date");
    let home_idx = header_index(&headers, "HomeTeam");
    let away_idx = header_index(&headers, "AwayTeam");
    let odd_h_idx = header_index(&headers, "B365H");
    let odd_d_idx = header_index(&headers, "B365D");
    let odd_a_idx = header_index(&headers, "B365A");
    let (Some(home_idx), Some(away_idx)) = (home_idx, away_idx) else {
        log::warn!("fixtures csv is missing HomeTeam/AwayTeam columns");
        return Vec::new();
    };

    let mut out = Vec::new();
    for line in lines {
        let cols: Vec<&str> = line.split(',').collect();
        let Some(home_name) = cell(&cols, Some(home_idx)) else {
            continue;
        };
        let Some(away_name) = cell(&cols, Some(away_idx)) else {
            continue;
        };
        let (Some(home), Some(away)) = (
            dataset.club_by_name(home_name),
            dataset.club_by_name(away_name),
        ) else {
            log::debug!("skipping fixture with unknown club: {home_name} vs {away_name}");
            continue;
        };

        let odd_h = cell(&cols, odd_h_idx).and_then(|s| s.parse::<f64>().ok());
        let odd_d = cell(&cols, odd_d_idx).and_then(|s| s.parse::<f64>().ok());
        let odd_a = cell(&cols, odd_a_idx).and_then(|s| s.parse::<f64>().ok());
        let market_odds = match (odd_h, odd_a) {
            (Some(h), Some(a)) => Some(MarketOdds {
                home: h,
                draw: odd_d,
                away: a,
            }),
            _ => None,
        };

        out.push(Fixture {
            date: cell(&cols, date_idx).map(|s| s.to_string()),
            home_id: home.id,
            away_id: away.id,
            league_name: home.league.clone(),
            market_odds,
        });
    }

    // Soonest first; rows without a parseable date sink to the end.
    out.sort_by(|a, b| {
        let da = a.date.as_deref().and_then(parse_flexible_date);
        let db = b.date.as_deref().and_then(parse_flexible_date);
        match (da, db) {
            (Some(da), Some(db)) => da.cmp(&db),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        }
    });
    out
}

/// Parses a finished-results CSV (Date, HomeTeam, AwayTeam, FTHG, FTAG)
/// into raw results ready for rating replay. `source` tags every row so
/// league codes survive into the match log.
pub fn parse_results_csv(text: &str, source: &str, dataset: &Dataset) -> Vec<RawResult> {
    let mut lines = text.lines().filter(|l| !l.trim().is_empty());
    let Some(header_line) = lines.next() else {
        return Vec::new();
    };
    let headers: Vec<&str> = header_line.split(',').collect();

    let date_idx = header_index(&headers, "Date");
    let home_idx = header_index(&headers, "HomeTeam");
    let away_idx = header_index(&headers, "AwayTeam");
    let fthg_idx = header_index(&headers, "FTHG");
    let ftag_idx = header_index(&headers, "FTAG");
    let (Some(home_idx), Some(away_idx), Some(fthg_idx), Some(ftag_idx)) =
        (home_idx, away_idx, fthg_idx, ftag_idx)
    else {
        log::warn!("results csv {source} is missing required columns");
        return Vec::new();
    };

    let mut out = Vec::new();
    for line in lines {
        let cols: Vec<&str> = line.split(',').collect();
        let (Some(home_name), Some(away_name)) =
            (cell(&cols, Some(home_idx)), cell(&cols, Some(away_idx)))
        else {
            continue;
        };
        let (Some(home_goals), Some(away_goals)) = (
            cell(&cols, Some(fthg_idx)).and_then(|s| s.parse::<u32>().ok()),
            cell(&cols, Some(ftag_idx)).and_then(|s| s.parse::<u32>().ok()),
        ) else {
            continue;
        };
        let (Some(home), Some(away)) = (
            dataset.club_by_name(home_name),
            dataset.club_by_name(away_name),
        ) else {
            continue;
        };

        out.push(RawResult {
            date: cell(&cols, date_idx).map(|s| s.to_string()),
            source: Some(source.to_string()),
            home: home.id,
            away: away.id,
            home_goals,
            away_goals,
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Club;

    fn dataset() -> Dataset {
        Dataset {
            clubs: vec![
                Club {
                    id: 1,
                    name: "Arsenal".into(),
                    league: Some("Premier League".into()),
                    continent: Some("Europe".into()),
                },
                Club {
                    id: 2,
                    name: "Chelsea".into(),
                    league: Some("Premier League".into()),
                    continent: Some("Europe".into()),
                },
            ],
            ..Dataset::default()
        }
    }

    #[test]
    fn fixtures_csv_resolves_clubs_and_odds() {
        let csv = "\
Div,Date,HomeTeam,AwayTeam,B365H,B365D,B365A
E0,17/08/24,Arsenal,Chelsea,1.50,4.20,6.00
E0,10/08/24,Chelsea,Arsenal,2.50,3.40,
E0,11/08/24,Narnia FC,Arsenal,2.00,3.00,4.00
";
        let ds = dataset();
        let fixtures = parse_fixtures_csv(csv, &ds);
        // The unknown club row is dropped; the rest sort by date.
        assert_eq!(fixtures.len(), 2);
        assert_eq!(fixtures[0].home_id, 2);
        assert_eq!(fixtures[1].home_id, 1);

        let odds = fixtures[1].market_odds.as_ref().unwrap();
        assert!((odds.home - 1.50).abs() < 1e-12);
        assert_eq!(odds.draw, Some(4.20));
        // Missing away price means no usable market odds for that row.
        assert!(fixtures[0].market_odds.is_none());
        assert_eq!(fixtures[0].league_name.as_deref(), Some("Premier League"));
    }

    #[test]
    fn results_csv_tags_source() {
        let csv = "\
Date,HomeTeam,AwayTeam,FTHG,FTAG
10/08/24,Arsenal,Chelsea,2,0
17/08/24,Chelsea,Arsenal,x,1
";
        let ds = dataset();
        let results = parse_results_csv(csv, "E0_2425.csv", &ds);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].source.as_deref(), Some("E0_2425.csv"));
        assert_eq!(results[0].home_goals, 2);
    }
}
