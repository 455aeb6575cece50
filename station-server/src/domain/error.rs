//! Domain error types.
//!
//! Validation failures in the domain layer, distinct from API/IO errors.

/// Domain-level validation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// A raw candidate record is missing a required field
    #[error("candidate missing required field: {0}")]
    MissingField(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = DomainError::MissingField("price");
        assert_eq!(err.to_string(), "candidate missing required field: price");
    }
}
