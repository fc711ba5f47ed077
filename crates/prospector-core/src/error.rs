//! Error types for Prospector.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Network failure, timeout or non-success status from an external service.
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// The provider answered, but not in a shape we can use.
    #[error("Malformed provider output: {0}")]
    MalformedOutput(String),

    #[error("Insufficient output: got {got}, needed at least {needed}")]
    InsufficientOutput { got: usize, needed: usize },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_output_message() {
        let err = Error::InsufficientOutput { got: 2, needed: 5 };
        assert_eq!(err.to_string(), "Insufficient output: got 2, needed at least 5");
    }
}
