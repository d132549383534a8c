//! Domain error types.

/// Top-level error type for picktrack.
#[derive(Debug, thiserror::Error)]
pub enum PicktrackError {
    #[error("price data error: {reason}")]
    PriceData { reason: String },

    #[error("analysis feed error: {reason}")]
    Feed { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("invalid holding period: {days} days (position dated after the calculation date?)")]
    InvalidPeriod { days: i64 },

    #[error("unknown simulation policy: {value} (expected 'incremental' or 'equal')")]
    UnknownPolicy { value: String },

    #[error("no positions with resolvable prices for {context}")]
    NoPositions { context: String },

    #[error("snapshot write error: {reason}")]
    SnapshotWrite { reason: String },

    #[error("run state error: {reason}")]
    RunState { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&PicktrackError> for std::process::ExitCode {
    fn from(err: &PicktrackError) -> Self {
        let code: u8 = match err {
            PicktrackError::Io(_)
            | PicktrackError::SnapshotWrite { .. }
            | PicktrackError::RunState { .. } => 1,
            PicktrackError::ConfigParse { .. }
            | PicktrackError::ConfigMissing { .. }
            | PicktrackError::ConfigInvalid { .. } => 2,
            PicktrackError::PriceData { .. } | PicktrackError::Feed { .. } => 3,
            PicktrackError::InvalidPeriod { .. } | PicktrackError::UnknownPolicy { .. } => 4,
            PicktrackError::NoPositions { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
