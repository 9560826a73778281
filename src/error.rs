// Error types for octopulse.
// Covers GitHub API status errors, transport and decoding failures, and aggregate wrapping.

use thiserror::Error;

use crate::http::HttpError;

#[derive(Error, Debug)]
pub enum InsightsError {
    #[error("GitHub API error: {status} {status_text}")]
    Api { status: u16, status_text: String },

    #[error("HTTP transport error: {0}")]
    Transport(#[from] HttpError),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Username is required")]
    MissingUsername,

    #[error("Failed to fetch {operation}: {source}")]
    Aggregate {
        operation: &'static str,
        #[source]
        source: Box<InsightsError>,
    },

    #[error("{0}")]
    Other(String),
}

impl InsightsError {
    /// Wrap a sub-request failure with the name of the aggregate that failed.
    pub fn aggregate(operation: &'static str, source: InsightsError) -> Self {
        InsightsError::Aggregate {
            operation,
            source: Box::new(source),
        }
    }

    /// HTTP status of the underlying API error, if there is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            InsightsError::Api { status, .. } => Some(*status),
            InsightsError::Aggregate { source, .. } => source.status(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, InsightsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregate_message_names_operation_and_cause() {
        let err = InsightsError::aggregate(
            "repository data",
            InsightsError::Api {
                status: 404,
                status_text: "Not Found".to_string(),
            },
        );
        assert_eq!(
            err.to_string(),
            "Failed to fetch repository data: GitHub API error: 404 Not Found"
        );
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn test_precondition_has_no_status() {
        assert_eq!(InsightsError::MissingUsername.status(), None);
    }
}
