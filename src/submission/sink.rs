//! Downstream acceptance of validated submissions.

use async_trait::async_trait;
use thiserror::Error;

use crate::submission::Submission;

/// Failure reported by a sink. Surfaces to clients as a generic 500.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("submission rejected by downstream: {0}")]
    Rejected(String),

    #[error("downstream unavailable: {0}")]
    Unavailable(String),
}

/// Receives submissions that passed every gate.
///
/// Delivery is at-most-once from the pipeline's point of view; the sink owns
/// any retry or queueing.
#[async_trait]
pub trait SubmissionSink: Send + Sync {
    async fn accept(&self, submission: &Submission) -> Result<(), SinkError>;
}

/// Default sink: records the submission in the log and accepts it.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingSink;

#[async_trait]
impl SubmissionSink for LoggingSink {
    async fn accept(&self, submission: &Submission) -> Result<(), SinkError> {
        tracing::info!(
            email = submission.email.as_deref().unwrap_or_default(),
            has_phone = submission.phone.as_deref().is_some_and(|p| !p.is_empty()),
            message_chars = submission
                .message
                .as_deref()
                .map(|m| m.chars().count())
                .unwrap_or(0),
            "Contact submission accepted"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_logging_sink_accepts() {
        let sink = LoggingSink;
        let sub = Submission {
            name: Some("Ab".into()),
            email: Some("a@b.co".into()),
            phone: None,
            message: Some("hello there friend".into()),
        };
        assert!(sink.accept(&sub).await.is_ok());
    }

    #[test]
    fn test_error_display() {
        let err = SinkError::Unavailable("smtp down".into());
        assert_eq!(err.to_string(), "downstream unavailable: smtp down");
    }
}
