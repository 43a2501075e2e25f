//! Domain error types.

use cart_store::StoreError;
use thiserror::Error;

use crate::accumulator::ErrorAccumulator;
use crate::cart::CartError;

/// Errors that can occur during cart orchestration.
#[derive(Debug, Error)]
pub enum DomainError {
    /// The request violated one or more business rules; nothing was
    /// persisted. Carries every accumulated violation.
    #[error("Request rejected: {}", format_errors(errors))]
    Rejected { errors: Vec<CartError> },

    /// An error occurred in the cart store.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DomainError {
    /// Builds a rejection from the request's accumulator.
    pub fn rejected(accumulator: ErrorAccumulator) -> Self {
        DomainError::Rejected {
            errors: accumulator.into_errors(),
        }
    }
}

fn format_errors(errors: &[CartError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::ProductId;

    #[test]
    fn rejected_display_lists_every_error() {
        let mut acc = ErrorAccumulator::new();
        acc.push(CartError::ItemNotFound {
            product_id: ProductId::new("SKU-001"),
        });
        acc.push(CartError::PersistenceFailure);

        let error = DomainError::rejected(acc);
        let display = error.to_string();
        assert!(display.contains("SKU-001"));
        assert!(display.contains("could not be persisted"));
    }
}
