use thiserror::Error;

use crate::errors::CapabilityError;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("invalid base url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("missing api key")]
    MissingApiKey,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request timeout")]
    Timeout,

    #[error("http error {status}: {body}")]
    Http {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("response had no content")]
    EmptyResponse,

    #[error("could not parse response: {0}")]
    Parse(String),

    #[error("unknown: {0}")]
    Unknown(String),
}

impl LlmError {
    pub fn should_retry(&self) -> bool {
        match self {
            Self::InvalidUrl(_) => false,
            Self::MissingApiKey => false,
            Self::Parse(_) => false,
            Self::EmptyResponse => false,
            Self::Http { status, .. } => {
                status.is_server_error() || *status == reqwest::StatusCode::TOO_MANY_REQUESTS
            }

            Self::Connect(_) => true,
            Self::Timeout => true,
            Self::Unknown(_) => true,
        }
    }

    pub fn from_reqwest_error(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if let Some(status) = err.status() {
            Self::Http {
                status,
                body: err.to_string(),
            }
        } else if err.is_connect() || err.is_request() {
            Self::Connect(err.to_string())
        } else if err.is_decode() {
            Self::Parse(err.to_string())
        } else {
            Self::Unknown(err.to_string())
        }
    }
}

impl From<LlmError> for CapabilityError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Parse(_) | LlmError::EmptyResponse => Self::MalformedResponse(err.to_string()),
            other => Self::Unavailable(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    fn http(status: StatusCode) -> LlmError {
        LlmError::Http {
            status,
            body: String::new(),
        }
    }

    #[test]
    fn test_retry_classification() {
        assert!(http(StatusCode::TOO_MANY_REQUESTS).should_retry());
        assert!(http(StatusCode::BAD_GATEWAY).should_retry());
        assert!(!http(StatusCode::UNAUTHORIZED).should_retry());
        assert!(!http(StatusCode::BAD_REQUEST).should_retry());
        assert!(LlmError::Timeout.should_retry());
        assert!(!LlmError::Parse("eof".to_string()).should_retry());
    }

    #[test]
    fn test_capability_error_mapping() {
        assert!(matches!(
            CapabilityError::from(LlmError::Parse("eof".to_string())),
            CapabilityError::MalformedResponse(_)
        ));
        assert!(matches!(
            CapabilityError::from(LlmError::Timeout),
            CapabilityError::Unavailable(_)
        ));
    }
}
