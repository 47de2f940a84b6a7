//! Error types for structure learning.

use thiserror::Error;

/// Errors that can occur while building variables, configuring the learner,
/// or enumerating orientations.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in the future without breaking changes.
///
/// Independence-oracle failures during skeleton learning are *not* surfaced
/// through this type: the learner recovers them (the edge is kept) and
/// records them in [`LearningDiagnostics`](crate::engine::learning_net::LearningDiagnostics).
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum LearnError {
    /// Unusable input data (too few variables, an extractor that fails on a
    /// row, non-finite values, duplicate names).
    #[error("input error: {0}")]
    Input(String),

    /// Invalid configuration or an over-sized request.
    #[error("validation error: {0}")]
    Validation(String),

    /// An independence test failed and the caller asked for it directly.
    #[error("oracle failure: {0}")]
    Oracle(#[from] OracleError),

    /// Numerical stability error (NaN/Inf statistics, invalid degrees of freedom).
    #[error("numerical error: {0}")]
    Numerical(String),

    /// Internal invariant violation (programmer error, not user error).
    #[error("internal error: {0}")]
    Internal(String),
}

/// Failure of an independence oracle to decide a query.
///
/// The learner treats every variant as "not independent".
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OracleError {
    /// The test statistic cannot be computed (e.g. every stratum collapsed).
    #[error("degenerate contingency table: {0}")]
    Degenerate(String),

    /// The query referenced a variable the oracle does not know.
    #[error("unknown variable: {0}")]
    UnknownVariable(String),

    /// The statistic or p-value was not finite.
    #[error("numerical failure: {0}")]
    Numerical(String),

    /// The oracle could not answer in time or its backend is unavailable.
    #[error("oracle unavailable: {0}")]
    Unavailable(String),
}
