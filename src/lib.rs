//! Club-strength estimation from historical football results.
//!
//! The crate is a pure, synchronous pipeline: an Elo-style rating engine
//! feeds a comparable-match retriever, whose samples drive a Poisson
//! outcome model with confidence scoring, market-odds reconciliation and
//! goal-economics indicators layered on top. All I/O lives at the edges
//! ([`data`] and [`fixtures`]); everything downstream of a loaded
//! [`data::Dataset`] is referentially transparent.

pub mod config;
pub mod confidence;
pub mod data;
pub mod economics;
pub mod elo;
pub mod error;
pub mod fixtures;
pub mod history;
pub mod market;
pub mod model;
pub mod pipeline;

pub use config::ModelConfig;
pub use error::EstimateError;
pub use pipeline::{EstimateMethod, Fixture, FixtureEstimate, estimate_all, estimate_fixture};
