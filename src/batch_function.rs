use async_trait::async_trait;

use crate::error::AssociationError;

/// The outcome of loading a single key: the associated value(s), or the reason it could not be
/// produced.
pub type BatchResult<V, E> = Result<V, AssociationError<E>>;

/// A `BatchFunction` resolves one already-assembled batch of keys into one result per key.
///
/// This is the contract a dataloader consumes: the loader decides when a batch is dispatched,
/// coalesces concurrent callers and caches results, then hands the collected keys to `load`.
/// The returned list always has the same length as `keys`, and entry `i` belongs to `keys[i]`,
/// duplicates included.
///
/// The context is passed through untouched to every query the batch function issues, so
/// cancellation or deadline policy carried by it applies to all of them.
#[async_trait]
pub trait BatchFunction<K, V> {
    type Context: Send + Sync;
    type Error: Send + Sync;

    async fn load(&self, context: &Self::Context, keys: &[K]) -> Vec<BatchResult<V, Self::Error>>;
}
