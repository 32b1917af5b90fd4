use thiserror::Error;

/// Recoverable failures of a single estimation query. Every variant means
/// "fall back to the next-lower-fidelity method", never "invent numbers".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EstimateError {
    /// Zero matches at every relaxation level of the active policy.
    #[error("no comparable sample at any relaxation level")]
    NoComparableSample,

    /// The fixture's league name has no entry in the league-code table,
    /// so league-scoped history cannot be queried at all.
    #[error("league '{0}' has no code mapping")]
    UnresolvedLeague(String),
}
