use rust_i18n::t;
use thiserror::Error;

/// Normalized failure for every call that crosses the gateway, plus the
/// client-side checks that guard those calls.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),

    #[error("session is no longer valid")]
    Unauthenticated,

    #[error("not logged in")]
    NotAuthenticated,

    #[error("{0}")]
    Validation(String),

    #[error("{message} ({code})")]
    Server { code: String, message: String },

    #[error("unexpected response body: {0}")]
    Decode(String),

    /// The HTTP round trip itself ran past `request_timeout_secs`. Poll
    /// exhaustion is `PollOutcome::TimedOut`, not this.
    #[error("request timed out")]
    Timeout,
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }

    /// Stable identifier shown next to messages and used in logs.
    pub fn code(&self) -> &str {
        match self {
            ApiError::Network(_) => "network",
            ApiError::Unauthenticated => "unauthenticated",
            ApiError::NotAuthenticated => "not_authenticated",
            ApiError::Validation(_) => "validation",
            ApiError::Server { code, .. } => code,
            ApiError::Decode(_) => "decode",
            ApiError::Timeout => "timeout",
        }
    }

    /// Text for the UI, in the active locale.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Network(_) => t!("errors.network").into_owned(),
            ApiError::Unauthenticated => t!("errors.unauthenticated").into_owned(),
            ApiError::NotAuthenticated => t!("errors.not_authenticated").into_owned(),
            ApiError::Validation(message) => message.clone(),
            ApiError::Server { message, .. } => message.clone(),
            ApiError::Decode(_) => t!("errors.decode").into_owned(),
            ApiError::Timeout => t!("errors.timeout").into_owned(),
        }
    }

    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, ApiError::Unauthenticated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_error_code_comes_from_payload() {
        let err = ApiError::Server {
            code: "http_400".to_string(),
            message: "Invalid session token".to_string(),
        };
        assert_eq!(err.code(), "http_400");
        assert_eq!(err.user_message(), "Invalid session token");
    }

    #[test]
    fn fixed_codes_are_stable() {
        assert_eq!(ApiError::Unauthenticated.code(), "unauthenticated");
        assert_eq!(ApiError::Timeout.code(), "timeout");
        assert_eq!(ApiError::validation("x").code(), "validation");
        assert!(ApiError::Unauthenticated.is_unauthenticated());
        assert!(!ApiError::NotAuthenticated.is_unauthenticated());
    }

    #[test]
    fn timeout_text_fits_any_request() {
        assert_eq!(ApiError::Timeout.to_string(), "request timed out");
        assert!(!ApiError::Timeout.to_string().contains("recommendation"));
    }
}
