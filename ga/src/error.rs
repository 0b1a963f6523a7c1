//! Run-level error type
//!
//! Every failure of a find run surfaces as one [`FindError`]. Search failures
//! never appear here; they degrade to an empty observation inside the loop.

use thiserror::Error;

use crate::governor::GovernorError;
use crate::llm::LlmError;
use crate::reply::ParseError;
use crate::search::LookupError;

/// Coarse classification of a [`FindError`], stable for callers and exit codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    FatalUpstream,
    ExhaustedRetries,
    EmptyResponse,
    MalformedReply,
    NoFinalDecision,
    ProductNotFound,
    MissingPrice,
    ProductLookup,
    Prompt,
    Cancelled,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FatalUpstream => "fatal-upstream",
            Self::ExhaustedRetries => "exhausted-retries",
            Self::EmptyResponse => "empty-response",
            Self::MalformedReply => "malformed-reply",
            Self::NoFinalDecision => "no-final-decision",
            Self::ProductNotFound => "product-not-found",
            Self::MissingPrice => "missing-price",
            Self::ProductLookup => "product-lookup",
            Self::Prompt => "prompt",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a find run produced no result
#[derive(Debug, Error)]
pub enum FindError {
    #[error("Completion service failed: {0}")]
    FatalUpstream(#[source] LlmError),

    #[error("Completion service still failing after {attempts} attempts")]
    ExhaustedRetries {
        attempts: u32,
        #[source]
        last: LlmError,
    },

    #[error("Completion service returned no content")]
    EmptyResponse,

    #[error("Model reply could not be decoded: {0}")]
    MalformedReply(#[from] ParseError),

    #[error("Final response not a result")]
    NoFinalDecision,

    #[error("Product data not found for {id}")]
    ProductNotFound { id: String },

    #[error("Product price not found for {id}")]
    MissingPrice { id: String },

    #[error("Product lookup failed: {0}")]
    ProductLookup(#[source] LookupError),

    #[error("Prompt template error: {0}")]
    Prompt(String),

    #[error("Run cancelled")]
    Cancelled,
}

impl FindError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::FatalUpstream(_) => ErrorKind::FatalUpstream,
            Self::ExhaustedRetries { .. } => ErrorKind::ExhaustedRetries,
            Self::EmptyResponse => ErrorKind::EmptyResponse,
            Self::MalformedReply(_) => ErrorKind::MalformedReply,
            Self::NoFinalDecision => ErrorKind::NoFinalDecision,
            Self::ProductNotFound { .. } => ErrorKind::ProductNotFound,
            Self::MissingPrice { .. } => ErrorKind::MissingPrice,
            Self::ProductLookup(_) => ErrorKind::ProductLookup,
            Self::Prompt(_) => ErrorKind::Prompt,
            Self::Cancelled => ErrorKind::Cancelled,
        }
    }
}

impl From<GovernorError> for FindError {
    fn from(e: GovernorError) -> Self {
        match e {
            GovernorError::Fatal(source) => Self::FatalUpstream(source),
            GovernorError::ExhaustedRetries { attempts, last } => Self::ExhaustedRetries { attempts, last },
            GovernorError::EmptyResponse => Self::EmptyResponse,
            GovernorError::Cancelled => Self::Cancelled,
        }
    }
}

impl From<LookupError> for FindError {
    fn from(e: LookupError) -> Self {
        match e {
            LookupError::NotFound { ids } => Self::ProductNotFound { id: ids },
            other => Self::ProductLookup(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_governor_errors_map_to_kinds() {
        let fatal: FindError = GovernorError::Fatal(LlmError::ApiError {
            status: 400,
            message: "bad".to_string(),
        })
        .into();
        assert_eq!(fatal.kind(), ErrorKind::FatalUpstream);

        let exhausted: FindError = GovernorError::ExhaustedRetries {
            attempts: 5,
            last: LlmError::ApiError {
                status: 429,
                message: "slow down".to_string(),
            },
        }
        .into();
        assert_eq!(exhausted.kind(), ErrorKind::ExhaustedRetries);
        assert!(exhausted.to_string().contains("5 attempts"));

        assert_eq!(FindError::from(GovernorError::EmptyResponse).kind(), ErrorKind::EmptyResponse);
        assert_eq!(FindError::from(GovernorError::Cancelled).kind(), ErrorKind::Cancelled);
    }

    #[test]
    fn test_lookup_errors_map_to_kinds() {
        let missing: FindError = LookupError::NotFound {
            ids: "B0858J4BTK".to_string(),
        }
        .into();
        assert_eq!(missing.kind(), ErrorKind::ProductNotFound);
        assert!(missing.to_string().contains("B0858J4BTK"));

        let upstream: FindError = LookupError::ApiError {
            status: 502,
            message: "bad gateway".to_string(),
        }
        .into();
        assert_eq!(upstream.kind(), ErrorKind::ProductLookup);
    }

    #[test]
    fn test_parse_error_is_malformed_reply() {
        let err: FindError = ParseError::MissingDiscriminant.into();
        assert_eq!(err.kind(), ErrorKind::MalformedReply);
        assert_eq!(err.kind().to_string(), "malformed-reply");
    }
}
