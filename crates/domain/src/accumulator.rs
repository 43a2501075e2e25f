//! Request-scoped collection of business-rule violations.

use crate::cart::CartError;

/// Collects every business error raised while handling one request.
///
/// An accumulator is constructed fresh inside each orchestration call
/// and threaded through the pipeline stages explicitly; it is never
/// shared between requests. Persistence is gated on the accumulator
/// being empty, so either every rule passed and the mutation commits,
/// or the caller gets the full list of violations and storage is left
/// untouched.
#[derive(Debug, Default)]
pub struct ErrorAccumulator {
    errors: Vec<CartError>,
}

impl ErrorAccumulator {
    /// Creates an empty accumulator for one request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a single violation.
    pub fn push(&mut self, error: CartError) {
        self.errors.push(error);
    }

    /// Records every violation from an iterator, preserving order.
    pub fn extend(&mut self, errors: impl IntoIterator<Item = CartError>) {
        self.errors.extend(errors);
    }

    /// Returns true iff no violation has been recorded; the operation
    /// may proceed to persistence.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the number of recorded violations.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Returns the recorded violations in order.
    pub fn errors(&self) -> &[CartError] {
        &self.errors
    }

    /// Consumes the accumulator, yielding the violations in order.
    pub fn into_errors(self) -> Vec<CartError> {
        self.errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{CustomerId, ProductId};

    #[test]
    fn new_accumulator_is_empty() {
        let acc = ErrorAccumulator::new();
        assert!(acc.is_empty());
        assert_eq!(acc.len(), 0);
    }

    #[test]
    fn push_and_extend_preserve_order() {
        let mut acc = ErrorAccumulator::new();
        acc.push(CartError::CartNotFound {
            customer_id: CustomerId::new(),
        });
        acc.extend(vec![
            CartError::ItemNotFound {
                product_id: ProductId::new("SKU-001"),
            },
            CartError::PersistenceFailure,
        ]);

        assert_eq!(acc.len(), 3);
        let errors = acc.into_errors();
        assert!(matches!(errors[0], CartError::CartNotFound { .. }));
        assert!(matches!(errors[1], CartError::ItemNotFound { .. }));
        assert!(matches!(errors[2], CartError::PersistenceFailure));
    }

    #[test]
    fn accumulators_are_independent_per_request() {
        let mut first = ErrorAccumulator::new();
        first.push(CartError::PersistenceFailure);

        let second = ErrorAccumulator::new();
        assert!(!first.is_empty());
        assert!(second.is_empty());
    }
}
