use std::hash::Hash;

use async_trait::async_trait;
use tracing_futures::Instrument;

use crate::{
    batch_function::{BatchFunction, BatchResult},
    group::{broadcast_error, Groups},
    query_function::{KeyFn, QueryFunction, SortFn},
};

/// Resolves a relationship where each key has any number of rows.
///
/// Every key resolves to the rows whose extracted key equals it, in the order the query returned
/// them. A key with no rows resolves to an empty `Vec`, never to an error.
pub struct HasMany<K, V, Q> {
    query: Q,
    key_fn: KeyFn<V, K>,
    sort_fn: Option<SortFn<V>>,
}

impl<K, V, Q> HasMany<K, V, Q>
where
    Q: QueryFunction<K, V>,
{
    pub fn new<F>(query: Q, key_fn: F) -> Self
    where
        F: Fn(&V) -> K + Send + Sync + 'static,
    {
        Self { query, key_fn: Box::new(key_fn), sort_fn: None }
    }

    /// Orders every group in place before results are assembled.
    ///
    /// Once set, the sort alone decides the order of each group.
    pub fn with_sort<F>(mut self, sort_fn: F) -> Self
    where
        F: Fn(&mut [V]) + Send + Sync + 'static,
    {
        self.sort_fn = Some(Box::new(sort_fn));
        self
    }
}

#[async_trait]
impl<K, V, Q> BatchFunction<K, Vec<V>> for HasMany<K, V, Q>
where
    K: Eq + Hash + Send + Sync,
    V: Clone + Send + Sync,
    Q: QueryFunction<K, V>,
{
    type Context = Q::Context;
    type Error = Q::Error;

    #[tracing::instrument(skip_all, fields(keys = keys.len()))]
    async fn load(&self, context: &Q::Context, keys: &[K]) -> Vec<BatchResult<Vec<V>, Q::Error>> {
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

        let mut data = Groups::group(rows, &self.key_fn);
        if let Some(sort_fn) = &self.sort_fn {
            data.sort_each(sort_fn);
        }
        tracing::debug!(groups = data.len(), "grouped rows");

        data.assemble(keys, || Ok(Vec::new()))
    }
}
