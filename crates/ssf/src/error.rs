//! Error types for the ssfsim-ssf crate.

/// Error type for all fallible operations in the ssfsim-ssf crate.
///
/// Every variant is a configuration error: it reflects a malformed model
/// or engine setting and is raised at construction time, before any
/// simulated value is produced. Nothing here is transient or retryable.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SsfError {
    /// Returned when a dynamics instance fails its own consistency check.
    #[error("dynamics failed its consistency check")]
    InvalidDynamics,

    /// Returned when the dynamics and the measurement disagree on the
    /// state dimension.
    #[error("state dimension mismatch: dynamics has {dynamics}, measurement has {measurement}")]
    DimensionMismatch {
        /// State dimension declared by the dynamics.
        dynamics: usize,
        /// State dimension implied by the measurement loading.
        measurement: usize,
    },

    /// Returned when the diffuse subspace is larger than the state.
    #[error("invalid non-stationary dimension: {non_stationary_dim} exceeds state dimension {state_dim}")]
    InvalidNonStationaryDim {
        /// Declared dimension of the diffuse subspace.
        non_stationary_dim: usize,
        /// State dimension.
        state_dim: usize,
    },

    /// Returned when the shock vector is larger than the state.
    #[error("invalid innovations dimension: {innovations_dim} exceeds state dimension {state_dim}")]
    InvalidInnovationsDim {
        /// Declared dimension of the shock vector.
        innovations_dim: usize,
        /// State dimension.
        state_dim: usize,
    },

    /// Returned when the diffuse constraint matrix does not have full
    /// column rank.
    #[error("diffuse constraints are rank deficient: rank {rank} < {expected}")]
    RankDeficientConstraints {
        /// Numerical rank found.
        rank: usize,
        /// Required rank (the non-stationary dimension).
        expected: usize,
    },

    /// Returned when a Cholesky factorisation meets a pivot below the
    /// negative tolerance.
    #[error("matrix is not positive semi-definite: pivot {pivot} at index {index}")]
    NotPositiveSemiDefinite {
        /// Row/column of the failing pivot.
        index: usize,
        /// Value of the failing pivot.
        pivot: f64,
    },

    /// Returned when a variance is negative or non-finite.
    #[error("invalid variance at index {index}: {value} (must be finite and >= 0)")]
    InvalidVariance {
        /// Position of the offending variance.
        index: usize,
        /// The offending value.
        value: f64,
    },

    /// Returned when a covariance or loading matrix has the wrong shape.
    #[error("matrix shape mismatch: expected {expected_rows}x{expected_cols}, got {rows}x{cols}")]
    ShapeMismatch {
        /// Expected number of rows.
        expected_rows: usize,
        /// Expected number of columns.
        expected_cols: usize,
        /// Actual number of rows.
        rows: usize,
        /// Actual number of columns.
        cols: usize,
    },

    /// Returned when a covariance matrix is not symmetric.
    #[error("covariance matrix is not symmetric at ({row}, {col})")]
    NotSymmetric {
        /// Row of the first asymmetric pair.
        row: usize,
        /// Column of the first asymmetric pair.
        col: usize,
    },

    /// Returned when a simulation length of zero is requested.
    #[error("invalid simulation length: {n} (must be >= 1)")]
    InvalidLength {
        /// The requested length.
        n: usize,
    },

    /// Returned when an engine setting is out of range.
    #[error("invalid simulation config: {reason}")]
    InvalidConfig {
        /// Description of the problem.
        reason: String,
    },
}
