use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Domain error taxonomy for the analysis pipeline and its external services.
///
/// Pipeline stages convert these into user-facing strings on the run's error
/// list; they never escape a stage. The `Display` text is what the user sees
/// in a failed job, so every variant reads as a complete sentence.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Failed to parse CV: {0}")]
    CvParsing(String),

    #[error("Failed to analyze job description: {0}")]
    RequirementAnalysis(String),

    #[error("Failed to analyze skill gaps: {0}")]
    GapAnalysis(String),

    #[error("Failed to generate recommendations: {0}")]
    Recommendation(String),

    #[error("{provider} API error: {message}")]
    ExternalService {
        provider: &'static str,
        status_code: Option<u16>,
        message: String,
    },

    #[error("Rate limit exceeded for {provider}")]
    RateLimited {
        provider: &'static str,
        /// Seconds to wait before retrying, when the provider said so.
        retry_after: Option<u64>,
    },
}

impl AnalysisError {
    /// Whether a retry policy should attempt this error again.
    ///
    /// Transient external failures (transport errors, 429, 5xx) qualify;
    /// domain failures (bad CV, malformed LLM output) never do.
    pub fn is_retryable(&self) -> bool {
        match self {
            AnalysisError::ExternalService { status_code, .. } => match status_code {
                Some(code) => *code == 429 || (500..=599).contains(code),
                None => true, // transport-level failure, no response
            },
            AnalysisError::RateLimited { .. } => true,
            _ => false,
        }
    }
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Analysis(e) => {
                tracing::error!("Analysis error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "ANALYSIS_ERROR",
                    e.to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_errors_are_retryable() {
        let err = AnalysisError::ExternalService {
            provider: "GitHub",
            status_code: None,
            message: "connection reset".to_string(),
        };
        assert!(err.is_retryable());
    }

    #[test]
    fn test_429_and_5xx_are_retryable() {
        for code in [429, 500, 503] {
            let err = AnalysisError::ExternalService {
                provider: "YouTube",
                status_code: Some(code),
                message: "upstream".to_string(),
            };
            assert!(err.is_retryable(), "status {code} should be retryable");
        }
    }

    #[test]
    fn test_client_errors_are_not_retryable() {
        let err = AnalysisError::ExternalService {
            provider: "GitHub",
            status_code: Some(422),
            message: "bad query".to_string(),
        };
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_domain_errors_are_not_retryable() {
        assert!(!AnalysisError::CvParsing("empty file".to_string()).is_retryable());
        assert!(!AnalysisError::GapAnalysis("missing data".to_string()).is_retryable());
    }

    #[test]
    fn test_rate_limited_carries_retry_hint() {
        let err = AnalysisError::RateLimited {
            provider: "YouTube",
            retry_after: Some(86400),
        };
        assert!(err.is_retryable());
        assert_eq!(err.to_string(), "Rate limit exceeded for YouTube");
    }

    #[test]
    fn test_error_messages_are_user_facing() {
        let err = AnalysisError::CvParsing("file appears to be empty".to_string());
        assert_eq!(
            err.to_string(),
            "Failed to parse CV: file appears to be empty"
        );
    }
}
