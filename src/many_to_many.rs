use std::hash::Hash;

use async_trait::async_trait;
use tracing_futures::Instrument;

use crate::{
    batch_function::{BatchFunction, BatchResult},
    group::{broadcast_error, Groups},
    query_function::{KeyFn, QueryFunction, SortFn},
};

/// Builds an output item from a join row and the child value it points at.
pub type CombineFn<A, V, S> = Box<dyn Fn(&A, &V) -> S + Send + Sync>;

/// Resolves a relationship that goes through a join collection.
///
/// A batch runs two queries in sequence, both with the caller's context:
///
/// 1. the association query fetches the join rows (`A`) for the requested parent keys (`K`);
/// 2. the child query fetches the values (`V`) for every child key (`CK`) those join rows
///    reference. Child keys are not deduplicated.
///
/// Each parent key then resolves to one output item (`S`) per join row of that parent, in join
/// row order. Join rows whose child key has no value are skipped. Parents without join rows
/// resolve to an empty `Vec`. A failure of either query fails every key of the batch.
pub struct ManyToMany<K, CK, A, V, S, AQ, Q> {
    association_query: AQ,
    query: Q,
    parent_key_fn: KeyFn<A, K>,
    child_key_fn: KeyFn<A, CK>,
    key_fn: KeyFn<V, CK>,
    combine_fn: CombineFn<A, V, S>,
    association_sort_fn: Option<SortFn<A>>,
    sort_fn: Option<SortFn<S>>,
}

impl<K, CK, A, V, AQ, Q> ManyToMany<K, CK, A, V, V, AQ, Q>
where
    A: 'static,
    V: Clone + 'static,
    AQ: QueryFunction<K, A>,
    Q: QueryFunction<CK, V, Context = AQ::Context, Error = AQ::Error>,
{
    /// Creates a many-to-many batch function whose output items are the child values themselves.
    pub fn new<PF, CF, F>(
        association_query: AQ,
        query: Q,
        parent_key_fn: PF,
        child_key_fn: CF,
        key_fn: F,
    ) -> Self
    where
        PF: Fn(&A) -> K + Send + Sync + 'static,
        CF: Fn(&A) -> CK + Send + Sync + 'static,
        F: Fn(&V) -> CK + Send + Sync + 'static,
    {
        Self::new_with_combiner(
            association_query,
            query,
            parent_key_fn,
            child_key_fn,
            key_fn,
            |_: &A, value: &V| value.clone(),
        )
    }
}

impl<K, CK, A, V, S, AQ, Q> ManyToMany<K, CK, A, V, S, AQ, Q>
where
    AQ: QueryFunction<K, A>,
    Q: QueryFunction<CK, V, Context = AQ::Context, Error = AQ::Error>,
{
    /// Creates a many-to-many batch function that builds each output item with `combine_fn`,
    /// e.g. to keep a field of the join row next to the child value.
    pub fn new_with_combiner<PF, CF, F, C>(
        association_query: AQ,
        query: Q,
        parent_key_fn: PF,
        child_key_fn: CF,
        key_fn: F,
        combine_fn: C,
    ) -> Self
    where
        PF: Fn(&A) -> K + Send + Sync + 'static,
        CF: Fn(&A) -> CK + Send + Sync + 'static,
        F: Fn(&V) -> CK + Send + Sync + 'static,
        C: Fn(&A, &V) -> S + Send + Sync + 'static,
    {
        Self {
            association_query,
            query,
            parent_key_fn: Box::new(parent_key_fn),
            child_key_fn: Box::new(child_key_fn),
            key_fn: Box::new(key_fn),
            combine_fn: Box::new(combine_fn),
            association_sort_fn: None,
            sort_fn: None,
        }
    }

    /// Orders the fetched join rows before they are joined, so each parent's output follows the
    /// sorted join row order.
    pub fn with_association_sort<F>(mut self, sort_fn: F) -> Self
    where
        F: Fn(&mut [A]) + Send + Sync + 'static,
    {
        self.association_sort_fn = Some(Box::new(sort_fn));
        self
    }

    /// Orders every parent's output items after the join. This runs after
    /// [`ManyToMany::with_association_sort`] and decides the final order.
    pub fn with_sort<F>(mut self, sort_fn: F) -> Self
    where
        F: Fn(&mut [S]) + Send + Sync + 'static,
    {
        self.sort_fn = Some(Box::new(sort_fn));
        self
    }
}

#[async_trait]
impl<K, CK, A, V, S, AQ, Q> BatchFunction<K, Vec<S>> for ManyToMany<K, CK, A, V, S, AQ, Q>
where
    K: Eq + Hash + Send + Sync,
    CK: Eq + Hash + Send + Sync,
    A: Send + Sync,
    V: Send + Sync,
    S: Clone + Send + Sync,
    AQ: QueryFunction<K, A>,
    Q: QueryFunction<CK, V, Context = AQ::Context, Error = AQ::Error>,
{
    type Context = AQ::Context;
    type Error = AQ::Error;

    #[tracing::instrument(skip_all, fields(keys = keys.len()))]
    async fn load(
        &self,
        context: &AQ::Context,
        keys: &[K],
    ) -> Vec<BatchResult<Vec<S>, AQ::Error>> {
        let mut associations = match self
            .association_query
            .query(context, keys)
            .instrument(tracing::debug_span!("association_query"))
            .await
        {
            Ok(associations) => associations,
            Err(e) => {
                tracing::debug!("association query failed, failing the whole batch");
                return broadcast_error(e, keys.len());
            }
        };

        let child_keys = associations.iter().map(|a| (self.child_key_fn)(a)).collect::<Vec<_>>();
        tracing::debug!(associations = associations.len(), "fetched join rows");

        let rows = match self
            .query
            .query(context, &child_keys)
            .instrument(tracing::debug_span!("child_query", child_keys = child_keys.len()))
            .await
        {
            Ok(rows) => rows,
            Err(e) => {
                tracing::debug!("child query failed, failing the whole batch");
                return broadcast_error(e, keys.len());
            }
        };
        tracing::debug!(rows = rows.len(), "fetched child rows");

        let values = Groups::index(rows, &self.key_fn);

        if let Some(sort_fn) = &self.association_sort_fn {
            sort_fn(associations.as_mut_slice());
        }

        let mut data: Groups<K, Vec<S>> = Groups::default();
        let mut dangling = 0usize;
        for association in &associations {
            match values.get(&(self.child_key_fn)(association)) {
                Some(value) => {
                    let parent_key = (self.parent_key_fn)(association);
                    data.push(parent_key, (self.combine_fn)(association, value));
                }
                None => dangling += 1,
            }
        }
        if let Some(sort_fn) = &self.sort_fn {
            data.sort_each(sort_fn);
        }
        tracing::debug!(groups = data.len(), dangling, "joined rows");

        data.assemble(keys, || Ok(Vec::new()))
    }
}
