use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

use matchday_model::config::ModelConfig;
use matchday_model::data::{self, verify_log};
use matchday_model::economics::{ValueSignal, value_signal};
use matchday_model::fixtures::parse_fixtures_csv;
use matchday_model::history::{FormTrend, MatchHistoryIndex};
use matchday_model::pipeline::{EstimateMethod, Fixture, FixtureEstimate, estimate_all};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let data_dir = PathBuf::from(args.next().unwrap_or_else(|| "data".to_string()));
    let fixtures_path = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| data_dir.join("fixtures.csv"));

    let cfg = ModelConfig::default();
    let dataset = data::load_dataset(&data_dir)?;

    let issues = verify_log(&dataset.matches, &cfg.elo, 0.5);
    if !issues.is_empty() {
        log::warn!(
            "match log: {} of {} records have inconsistent rating snapshots",
            issues.len(),
            dataset.matches.len()
        );
    }

    let csv = fs::read_to_string(&fixtures_path)
        .with_context(|| format!("read fixtures {}", fixtures_path.display()))?;
    let fixtures = parse_fixtures_csv(&csv, &dataset);
    if fixtures.is_empty() {
        log::warn!("no usable fixtures in {}", fixtures_path.display());
        return Ok(());
    }

    let index = MatchHistoryIndex::new(&dataset.matches);
    let book = dataset.rating_book(&cfg.elo);
    let estimates = estimate_all(&fixtures, &index, &book, &cfg);

    println!(
        "{:<9} {:>5} {:<18} {:<18} {:>5}  {:>5} {:>5} {:>5}  {:>6} {:>6} {:>6}  {:>5}  {}",
        "Date", "Elo", "Home", "Away", "Elo", "H%", "D%", "A%", "OddH", "OddD", "OddA", "Conf",
        "Method"
    );
    for (fixture, est) in fixtures.iter().zip(&estimates) {
        let home_name = dataset
            .club_by_id(fixture.home_id)
            .map(|c| c.name.as_str())
            .unwrap_or("?");
        let away_name = dataset
            .club_by_id(fixture.away_id)
            .map(|c| c.name.as_str())
            .unwrap_or("?");
        let e = &est.estimate;

        println!(
            "{:<9} {:>5.0}{} {:<18} {:<18} {:>5.0}{}  {:>4.1}% {:>4.1}% {:>4.1}%  {:>6} {:>6} {:>6}  {:>4.0}%  {}{}",
            fixture.date.as_deref().unwrap_or(""),
            est.home_rating,
            trend_marker(est.home_trend),
            truncate(home_name, 18),
            truncate(away_name, 18),
            est.away_rating,
            trend_marker(est.away_trend),
            e.home_prob * 100.0,
            e.draw_prob * 100.0,
            e.away_prob * 100.0,
            odd(e.home_odd),
            odd(e.draw_odd),
            odd(e.away_odd),
            est.confidence,
            method_label(est.method),
            if e.widened { " (widened)" } else { "" },
        );
        if let Some(side) = value_side(fixture, est) {
            println!("{:>24} market offers value on the {side} side", "");
        }
    }

    let by_market = estimates
        .iter()
        .filter(|e| e.method == EstimateMethod::MarketBand)
        .count();
    let by_history = estimates
        .iter()
        .filter(|e| e.method == EstimateMethod::LeagueHistory)
        .count();
    log::info!(
        "{} fixtures: {} market-band, {} league-history, {} closed-form",
        estimates.len(),
        by_market,
        by_history,
        estimates.len() - by_market - by_history
    );

    Ok(())
}

/// Side whose market price beats the model's odds by the value margin,
/// if any. Home wins the tie on the off chance both qualify.
fn value_side(fixture: &Fixture, est: &FixtureEstimate) -> Option<&'static str> {
    let odds = fixture.market_odds.as_ref()?;
    let home = est
        .estimate
        .home_odd
        .and_then(|model| value_signal(model, odds.home));
    if home == Some(ValueSignal::Value) {
        return Some("home");
    }
    let away = est
        .estimate
        .away_odd
        .and_then(|model| value_signal(model, odds.away));
    (away == Some(ValueSignal::Value)).then_some("away")
}

fn odd(v: Option<f64>) -> String {
    match v {
        Some(o) => format!("{o:.2}"),
        None => "—".to_string(),
    }
}

fn trend_marker(trend: Option<FormTrend>) -> &'static str {
    match trend {
        Some(FormTrend::Up) => "▲",
        Some(FormTrend::Down) => "▼",
        Some(FormTrend::Flat) => "●",
        None => " ",
    }
}

fn method_label(method: EstimateMethod) -> &'static str {
    match method {
        EstimateMethod::MarketBand => "market",
        EstimateMethod::LeagueHistory => "history",
        EstimateMethod::ClosedForm => "closed-form",
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        s.chars().take(max.saturating_sub(1)).collect::<String>() + "…"
    }
}
