use thiserror::Error;

/// Status reported for an empty upstream result.
pub const EMPTY_RESULT_STATUS: u16 = 404;

/// Status reported when the upstream could not be reached at all.
pub const TRANSPORT_FAILURE_STATUS: u16 = 502;

/// Failure of a remote data fetch.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Transport failure or non-2xx response.
    #[error("HTTP {status}: {status_text}")]
    Http { status: u16, status_text: String },

    /// Response body was not valid JSON.
    #[error("Failed to parse response body: {0}")]
    Parse(String),

    /// Upstream returned no results and the route does not allow that.
    #[error("Upstream returned no results")]
    EmptyResult,
}

/// Discriminant of [`FetchError`], for logs and error bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    Http,
    Parse,
    EmptyResult,
}

impl FetchErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FetchErrorKind::Http => "http",
            FetchErrorKind::Parse => "parse",
            FetchErrorKind::EmptyResult => "empty_result",
        }
    }
}

impl FetchError {
    /// Builds an `Http` error for a transport failure.
    pub fn transport(message: impl Into<String>) -> Self {
        FetchError::Http {
            status: TRANSPORT_FAILURE_STATUS,
            status_text: message.into(),
        }
    }

    pub fn kind(&self) -> FetchErrorKind {
        match self {
            FetchError::Http { .. } => FetchErrorKind::Http,
            FetchError::Parse(_) => FetchErrorKind::Parse,
            FetchError::EmptyResult => FetchErrorKind::EmptyResult,
        }
    }

    /// The HTTP status associated with the failure, when there is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Http { status, .. } => Some(*status),
            FetchError::Parse(_) => None,
            FetchError::EmptyResult => Some(EMPTY_RESULT_STATUS),
        }
    }
}

pub type Result<T> = std::result::Result<T, FetchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_error() {
        let error = FetchError::transport("connection refused");
        assert_eq!(error.status(), Some(502));
        assert_eq!(error.kind(), FetchErrorKind::Http);
        assert_eq!(error.to_string(), "HTTP 502: connection refused");
    }

    #[test]
    fn test_empty_result_status() {
        assert_eq!(FetchError::EmptyResult.status(), Some(404));
        assert_eq!(FetchError::EmptyResult.kind().as_str(), "empty_result");
    }

    #[test]
    fn test_parse_has_no_status() {
        let error = FetchError::Parse("expected value at line 1 column 1".to_string());
        assert_eq!(error.status(), None);
        assert_eq!(error.kind(), FetchErrorKind::Parse);
    }
}
