use async_trait::async_trait;

/// A `QueryFunction` fetches the rows for a list of keys from some resource.
///
/// Rows may come back in any order and in any number; the batch functions regroup them by key.
/// A returned error fails the whole batch that issued the query.
#[async_trait]
pub trait QueryFunction<K, V>: Send + Sync {
    type Context: Send + Sync;
    type Error: Send + Sync;

    async fn query(&self, context: &Self::Context, keys: &[K]) -> Result<Vec<V>, Self::Error>;
}

/// Extracts the grouping key from a row.
pub type KeyFn<T, K> = Box<dyn Fn(&T) -> K + Send + Sync>;

/// Reorders a grouped sequence in place.
pub type SortFn<T> = Box<dyn Fn(&mut [T]) + Send + Sync>;
