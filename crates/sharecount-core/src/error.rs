use thiserror::Error;

/// Collection error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectErrorKind {
    Transport,
    HttpStatus,
    Parse,
    Config,
    TaskLost,
}

/// Failure of a single platform within one collection run.
///
/// Every variant is recoverable at platform granularity: the run records the
/// rendered message in the report's `errors` list and carries on.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CollectError {
    #[error("{platform}: request to {url} failed: {message}")]
    Transport {
        platform: String,
        url: String,
        message: String,
    },

    #[error("{platform}: got non-success HTTP status {status} at {url}")]
    HttpStatus {
        platform: String,
        url: String,
        status: u16,
    },

    #[error("{platform}: {message}")]
    Parse { platform: String, message: String },

    #[error("{platform}: invalid proxy '{proxy}': {message}")]
    Config {
        platform: String,
        proxy: String,
        message: String,
    },

    #[error("{platform}: dispatch task ended without reporting")]
    TaskLost { platform: String },
}

impl CollectError {
    pub fn parse(platform: impl Into<String>, error: ParseError) -> Self {
        Self::Parse {
            platform: platform.into(),
            message: error.to_string(),
        }
    }

    pub const fn kind(&self) -> CollectErrorKind {
        match self {
            Self::Transport { .. } => CollectErrorKind::Transport,
            Self::HttpStatus { .. } => CollectErrorKind::HttpStatus,
            Self::Parse { .. } => CollectErrorKind::Parse,
            Self::Config { .. } => CollectErrorKind::Config,
            Self::TaskLost { .. } => CollectErrorKind::TaskLost,
        }
    }

    pub const fn code(&self) -> &'static str {
        match self.kind() {
            CollectErrorKind::Transport => "collect.transport",
            CollectErrorKind::HttpStatus => "collect.http_status",
            CollectErrorKind::Parse => "collect.parse",
            CollectErrorKind::Config => "collect.config",
            CollectErrorKind::TaskLost => "collect.task_lost",
        }
    }

    pub fn platform(&self) -> &str {
        match self {
            Self::Transport { platform, .. }
            | Self::HttpStatus { platform, .. }
            | Self::Parse { platform, .. }
            | Self::Config { platform, .. }
            | Self::TaskLost { platform } => platform,
        }
    }
}

/// Error raised by a platform parser when a payload has an unexpected shape.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("malformed JSON payload: {0}")]
    Json(String),

    #[error("payload is not wrapped in a JSONP callback")]
    NotJsonp,

    #[error("payload is missing '{0}'")]
    MissingField(&'static str),

    #[error("payload field '{field}' has unexpected type, expected {expected}")]
    UnexpectedType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("payload contains no data")]
    Empty,

    #[error("unable to read count '{0}'")]
    InvalidCount(String),
}

impl From<serde_json::Error> for ParseError {
    fn from(error: serde_json::Error) -> Self {
        Self::Json(error.to_string())
    }
}

/// Validation errors for the platform table.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("platform table must contain exactly one 'origin' entry, found {0}")]
    OriginCount(usize),

    #[error("platform name cannot be empty")]
    EmptyName,

    #[error("platform '{0}' is registered more than once")]
    DuplicateName(String),

    #[error("platform name '{0}' is reserved for report metadata")]
    ReservedName(String),

    #[error("url template for '{0}' must contain the '{{url}}' placeholder")]
    MissingPlaceholder(String),
}
