use std::fmt;

/// Status values the map provider's place, geocoding and directions
/// services report.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ProviderStatus {
    Ok,
    ZeroResults,
    OverQueryLimit,
    RequestDenied,
    InvalidRequest,
    NotFound,
    UnknownError,
}

impl ProviderStatus {
    /// Parses the provider's wire string; unrecognised values map to
    /// `UnknownError`.
    pub fn parse(s: &str) -> Self {
        match s {
            "OK" => ProviderStatus::Ok,
            "ZERO_RESULTS" => ProviderStatus::ZeroResults,
            "OVER_QUERY_LIMIT" => ProviderStatus::OverQueryLimit,
            "REQUEST_DENIED" => ProviderStatus::RequestDenied,
            "INVALID_REQUEST" => ProviderStatus::InvalidRequest,
            "NOT_FOUND" => ProviderStatus::NotFound,
            _ => ProviderStatus::UnknownError,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderStatus::Ok => "OK",
            ProviderStatus::ZeroResults => "ZERO_RESULTS",
            ProviderStatus::OverQueryLimit => "OVER_QUERY_LIMIT",
            ProviderStatus::RequestDenied => "REQUEST_DENIED",
            ProviderStatus::InvalidRequest => "INVALID_REQUEST",
            ProviderStatus::NotFound => "NOT_FOUND",
            ProviderStatus::UnknownError => "UNKNOWN_ERROR",
        }
    }

    pub fn is_ok(&self) -> bool {
        *self == ProviderStatus::Ok
    }
}

impl fmt::Display for ProviderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// The service answered with a non-OK status.
    Status(ProviderStatus),
    PermissionDenied,
    Unavailable,
    /// The browser lacks the capability (e.g. no geolocation).
    Unsupported,
    Timeout,
    InvalidResponse(String),
    Network(String),
}

impl ProviderError {
    /// Maps a raw status to `Ok(())` or the matching error.
    pub fn check(status: ProviderStatus) -> Result<(), ProviderError> {
        if status.is_ok() {
            Ok(())
        } else {
            Err(ProviderError::Status(status))
        }
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::Status(status) => write!(f, "provider returned status {status}"),
            ProviderError::PermissionDenied => write!(f, "permission denied"),
            ProviderError::Unavailable => write!(f, "service unavailable"),
            ProviderError::Unsupported => write!(f, "capability not supported by this browser"),
            ProviderError::Timeout => write!(f, "request timed out"),
            ProviderError::InvalidResponse(msg) => write!(f, "invalid provider response: {msg}"),
            ProviderError::Network(msg) => write!(f, "network error: {msg}"),
        }
    }
}

impl std::error::Error for ProviderError {}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    Parse(String),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Parse(msg) => write!(f, "config parse error: {msg}"),
            ConfigError::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}
