//! Sorting provider failures into retry classes.
//!
//! Classification is independent of the retry policy: the client asks
//! [`FailureKind::is_retryable`] and nothing else.

use serde::{Deserialize, Serialize};

use crate::providers::ProviderError;

/// How a provider failure should be treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Upstream temporarily overloaded; worth another attempt.
    Overloaded,
    /// Account quota exhausted.
    QuotaExceeded,
    /// Too many requests from this client.
    RateLimited,
    /// Anything else.
    Fatal,
}

impl FailureKind {
    pub fn is_retryable(&self) -> bool {
        matches!(self, FailureKind::Overloaded)
    }
}

/// Classify a provider failure.
///
/// Structured variants win; status codes come next; as a last resort the
/// error text is searched, quota before rate limit before overload.
pub fn classify(error: &ProviderError) -> FailureKind {
    match error {
        ProviderError::Overloaded(_) => FailureKind::Overloaded,
        ProviderError::QuotaExceeded(_) => FailureKind::QuotaExceeded,
        ProviderError::RateLimited { .. } => FailureKind::RateLimited,
        ProviderError::ApiError { status: 529, .. } => FailureKind::Overloaded,
        ProviderError::ApiError {
            status: 429,
            message,
        } => {
            if message.to_lowercase().contains("quota") {
                FailureKind::QuotaExceeded
            } else {
                FailureKind::RateLimited
            }
        }
        other => classify_message(&other.to_string()),
    }
}

fn classify_message(message: &str) -> FailureKind {
    let lowered = message.to_lowercase();

    if mentions_quota(&lowered) {
        FailureKind::QuotaExceeded
    } else if lowered.contains("rate_limit") || lowered.contains("too many requests") {
        FailureKind::RateLimited
    } else if lowered.contains("overloaded") || lowered.contains("529") {
        FailureKind::Overloaded
    } else {
        FailureKind::Fatal
    }
}

fn mentions_quota(lowered: &str) -> bool {
    lowered.contains("insufficient_quota")
        || (lowered.contains("quota") && lowered.contains("insufficient"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_structured_variants() {
        assert_eq!(
            classify(&ProviderError::Overloaded("busy".into())),
            FailureKind::Overloaded
        );
        assert_eq!(
            classify(&ProviderError::QuotaExceeded("billing".into())),
            FailureKind::QuotaExceeded
        );
        assert_eq!(
            classify(&ProviderError::RateLimited {
                retry_after: Some(Duration::from_secs(1))
            }),
            FailureKind::RateLimited
        );
    }

    #[test]
    fn test_status_codes() {
        let overloaded = ProviderError::ApiError {
            status: 529,
            message: "".into(),
        };
        assert_eq!(classify(&overloaded), FailureKind::Overloaded);

        let quota = ProviderError::ApiError {
            status: 429,
            message: "You exceeded your current quota".into(),
        };
        assert_eq!(classify(&quota), FailureKind::QuotaExceeded);

        let rate = ProviderError::ApiError {
            status: 429,
            message: "slow down".into(),
        };
        assert_eq!(classify(&rate), FailureKind::RateLimited);
    }

    #[test]
    fn test_message_sniffing() {
        assert_eq!(
            classify(&ProviderError::HttpError("upstream Overloaded".into())),
            FailureKind::Overloaded
        );
        assert_eq!(
            classify(&ProviderError::HttpError("status 529 from gateway".into())),
            FailureKind::Overloaded
        );
        assert_eq!(
            classify(&ProviderError::HttpError("Too Many Requests".into())),
            FailureKind::RateLimited
        );
        assert_eq!(
            classify(&ProviderError::HttpError("insufficient_quota".into())),
            FailureKind::QuotaExceeded
        );
    }

    #[test]
    fn test_quota_wins_over_rate_limit() {
        let err = ProviderError::HttpError("rate_limit: insufficient quota".into());
        assert_eq!(classify(&err), FailureKind::QuotaExceeded);
    }

    #[test]
    fn test_everything_else_is_fatal() {
        assert_eq!(classify(&ProviderError::AuthError), FailureKind::Fatal);
        assert_eq!(
            classify(&ProviderError::ParseError("eof".into())),
            FailureKind::Fatal
        );
        assert_eq!(
            classify(&ProviderError::ApiError {
                status: 500,
                message: "internal".into()
            }),
            FailureKind::Fatal
        );
    }

    #[test]
    fn test_only_overloaded_is_retryable() {
        assert!(FailureKind::Overloaded.is_retryable());
        assert!(!FailureKind::QuotaExceeded.is_retryable());
        assert!(!FailureKind::RateLimited.is_retryable());
        assert!(!FailureKind::Fatal.is_retryable());
    }
}
