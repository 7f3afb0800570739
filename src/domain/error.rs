//! Domain error types.

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, BarlensError>;

/// Top-level error type for barlens.
#[derive(Debug, thiserror::Error)]
pub enum BarlensError {
    #[error("index {index} is out of bounds for bar series `{series}` with {size} bars")]
    IndexOutOfRange {
        series: String,
        size: usize,
        index: isize,
    },

    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: String },

    #[error("{operation} is not supported")]
    Unsupported { operation: &'static str },

    #[error("incompatible series `{left}` and `{right}`: base time and time period must match")]
    IncompatibleSeries { left: String, right: String },

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

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl BarlensError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        BarlensError::InvalidArgument {
            reason: reason.into(),
        }
    }

    pub(crate) fn unsupported(operation: &'static str) -> Self {
        log::warn!("rejected unsupported operation {operation}");
        BarlensError::Unsupported { operation }
    }
}

impl From<&BarlensError> for std::process::ExitCode {
    fn from(err: &BarlensError) -> Self {
        let code: u8 = match err {
            BarlensError::Io(_) => 1,
            BarlensError::ConfigParse { .. }
            | BarlensError::ConfigMissing { .. }
            | BarlensError::ConfigInvalid { .. } => 2,
            BarlensError::Data { .. } => 3,
            BarlensError::InvalidArgument { .. } | BarlensError::IncompatibleSeries { .. } => 4,
            BarlensError::IndexOutOfRange { .. } | BarlensError::Unsupported { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
