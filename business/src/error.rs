use thiserror::Error;

use crate::http::HttpError;

/// Everything a submission can fail with.
///
/// Validation errors surface immediately and never reach the network. The
/// transport/status/parse kinds collapse into one retryable class at the
/// retry boundary. `Linking` is the partial-success state: the record exists
/// but the tag association failed, and no rollback is attempted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("both pass phrases are required")]
    MissingCredentials,
    #[error("{0} is required")]
    MissingRequiredField(&'static str),
    #[error("network error: {0}")]
    Network(String),
    #[error("request timed out")]
    Timeout,
    #[error("backend responded with status {0}")]
    Status(u16),
    #[error("failed to parse backend response: {0}")]
    Parse(String),
    #[error("entry created but tag linking failed with status {0}")]
    Linking(u16),
}

impl SubmitError {
    /// Whether the retry loop may try the whole sequence again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::Timeout | Self::Status(_) | Self::Parse(_)
        )
    }
}

impl From<HttpError> for SubmitError {
    fn from(err: HttpError) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Network(err.message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_not_retryable() {
        assert!(!SubmitError::MissingCredentials.is_retryable());
        assert!(!SubmitError::MissingRequiredField("title").is_retryable());
        assert!(!SubmitError::Linking(502).is_retryable());
    }

    #[test]
    fn transport_errors_are_retryable() {
        assert!(SubmitError::Network("connection reset".to_owned()).is_retryable());
        assert!(SubmitError::Timeout.is_retryable());
        assert!(SubmitError::Status(500).is_retryable());
        assert!(SubmitError::Parse("eof".to_owned()).is_retryable());
    }

    #[test]
    fn http_timeout_maps_to_timeout() {
        let err: SubmitError = HttpError::timeout(std::time::Duration::from_secs(120)).into();
        assert_eq!(err, SubmitError::Timeout);

        let err: SubmitError = HttpError::new("refused").into();
        assert_eq!(err, SubmitError::Network("refused".to_owned()));
    }
}
