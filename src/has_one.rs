use std::hash::Hash;

use async_trait::async_trait;
use tracing_futures::Instrument;

use crate::{
    batch_function::{BatchFunction, BatchResult},
    error::AssociationError,
    group::{broadcast_error, Groups},
    query_function::{KeyFn, QueryFunction},
};

/// Resolves a relationship where each key has at most one row.
///
/// Keys without a row resolve to [`AssociationError::NotFound`]; the other keys of the batch are
/// unaffected. If the query returns several rows for one key, the last one wins.
pub struct HasOne<K, V, Q> {
    query: Q,
    key_fn: KeyFn<V, K>,
}

impl<K, V, Q> HasOne<K, V, Q>
where
    Q: QueryFunction<K, V>,
{
    pub fn new<F>(query: Q, key_fn: F) -> Self
    where
        F: Fn(&V) -> K + Send + Sync + 'static,
    {
        Self { query, key_fn: Box::new(key_fn) }
    }
}

#[async_trait]
impl<K, V, Q> BatchFunction<K, V> for HasOne<K, V, Q>
where
    K: Eq + Hash + Send + Sync,
    V: Clone + Send + Sync,
    Q: QueryFunction<K, V>,
{
    type Context = Q::Context;
    type Error = Q::Error;

    #[tracing::instrument(skip_all, fields(keys = keys.len()))]
    async fn load(&self, context: &Q::Context, keys: &[K]) -> Vec<BatchResult<V, Q::Error>> {
        let rows = match self
            .query
            .query(context, keys)
            .instrument(tracing::debug_span!("query"))
            .await
        {
            Ok(rows) => rows,
            Err(e) => {
                tracing::debug!("query failed, failing the whole batch");
                return broadcast_error(e, keys.len());
            }
        };
        tracing::debug!(rows = rows.len(), "fetched rows");

        let data = Groups::index(rows, &self.key_fn);
        data.assemble(keys, || Err(AssociationError::NotFound))
    }
}
