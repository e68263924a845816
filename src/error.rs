//! Errors surfaced to the user while generating a table

use crate::model::PopulateError;
use crate::services::CompletionError;
use thiserror::Error;

/// Why a generation request was refused or failed
///
/// Every variant is recovered locally: it becomes a notice dialog and the
/// table keeps its previous contents.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Enter a product description before generating a table.")]
    EmptyDescription,

    #[error("A table is already being generated. Please wait for it to finish.")]
    AlreadyInFlight,

    #[error("The completion service could not be reached: {0}")]
    Completion(#[from] CompletionError),

    #[error("The generated response could not be used: {0}")]
    Parse(#[from] PopulateError),
}

impl GenerationError {
    /// Title for the notice dialog
    pub fn title(&self) -> &str {
        match self {
            GenerationError::EmptyDescription => "Description required",
            GenerationError::AlreadyInFlight => "Generation in progress",
            GenerationError::Completion(_) => "Generation failed",
            GenerationError::Parse(_) => "Unusable response",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrapped_errors_keep_detail() {
        let err = GenerationError::from(CompletionError::Http {
            status: 502,
            message: "upstream timed out".to_string(),
        });
        assert_eq!(err.title(), "Generation failed");
        assert!(err.to_string().contains("upstream timed out"));

        let err = GenerationError::from(PopulateError::NoRows);
        assert_eq!(err.title(), "Unusable response");
        assert!(err.to_string().contains("no rows"));
    }
}
