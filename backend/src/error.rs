use thiserror::Error;

/// Failure classes surfaced by the domain services.
///
/// Validation and referential failures are rejected before any write is
/// attempted; storage failures are propagated unchanged.
#[derive(Debug, Error)]
pub enum DomainError {
    /// Input failed a shape or range check
    #[error("invalid {field}: {message}")]
    Validation { field: &'static str, message: String },

    /// A foreign key points at a row that does not exist
    #[error("referenced {entity} not found: {id}")]
    MissingReference { entity: &'static str, id: i64 },

    /// The target row of a write operation does not exist
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: i64 },

    /// Underlying storage engine failure
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl DomainError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        DomainError::Validation {
            field,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_offender() {
        let err = DomainError::validation("price", "price must be greater than zero");
        assert_eq!(err.to_string(), "invalid price: price must be greater than zero");

        let err = DomainError::MissingReference { entity: "user", id: 99999 };
        assert_eq!(err.to_string(), "referenced user not found: 99999");

        let err = DomainError::NotFound { entity: "order", id: 7 };
        assert_eq!(err.to_string(), "order not found: 7");
    }
}
