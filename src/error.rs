use std::sync::Arc;

use thiserror::Error;

/// Failure attached to a single entry of a batch result.
///
/// `Query` holds the failure reported by a query function. It is shared by every entry of the
/// batch it broke, so all of them point at the same allocation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AssociationError<E> {
    /// Has-one only: no row was returned for this key.
    #[error("not found")]
    NotFound,
    #[error("batch query failed: {0}")]
    Query(Arc<E>),
}

impl<E> AssociationError<E> {
    pub fn is_not_found(&self) -> bool {
        matches!(self, AssociationError::NotFound)
    }

    pub fn query_error(&self) -> Option<&E> {
        match self {
            AssociationError::NotFound => None,
            AssociationError::Query(error) => Some(error.as_ref()),
        }
    }
}

impl<E> Clone for AssociationError<E> {
    fn clone(&self) -> Self {
        match self {
            AssociationError::NotFound => AssociationError::NotFound,
            AssociationError::Query(error) => AssociationError::Query(Arc::clone(error)),
        }
    }
}
