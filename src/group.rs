use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use crate::{batch_function::BatchResult, error::AssociationError};

/// Rows fetched for one batch, keyed by the key they were extracted under.
///
/// `T` is either a single row (has-one, child lookup in many-to-many) or a `Vec` of rows. Bucket
/// iteration order is irrelevant; order within a `Vec` bucket is the order rows were pushed.
#[derive(Debug)]
pub(crate) struct Groups<K, T> {
    map: HashMap<K, T>,
}

impl<K, T> Default for Groups<K, T> {
    fn default() -> Self {
        Self { map: HashMap::new() }
    }
}

impl<K, T> Groups<K, T>
where
    K: Eq + Hash,
{
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn get(&self, key: &K) -> Option<&T> {
        self.map.get(key)
    }

    /// Builds one result per requested key, in the order of `keys`.
    ///
    /// Keys without a group get whatever `missing` produces.
    pub fn assemble<E, F>(&self, keys: &[K], missing: F) -> Vec<BatchResult<T, E>>
    where
        T: Clone,
        F: Fn() -> BatchResult<T, E>,
    {
        keys.iter()
            .map(|key| match self.map.get(key) {
                Some(value) => Ok(value.clone()),
                None => missing(),
            })
            .collect()
    }
}

impl<K, V> Groups<K, V>
where
    K: Eq + Hash,
{
    /// Maps each row to its key. A later row with the same key replaces an earlier one.
    pub fn index<I, F>(rows: I, key_fn: F) -> Self
    where
        I: IntoIterator<Item = V>,
        F: Fn(&V) -> K,
    {
        let rows = rows.into_iter();
        let mut map = HashMap::with_capacity(rows.size_hint().0);
        for row in rows {
            map.insert(key_fn(&row), row);
        }
        Self { map }
    }
}

impl<K, V> Groups<K, Vec<V>>
where
    K: Eq + Hash,
{
    /// Appends each row to the bucket of its key, keeping fetch order within a bucket.
    pub fn group<I, F>(rows: I, key_fn: F) -> Self
    where
        I: IntoIterator<Item = V>,
        F: Fn(&V) -> K,
    {
        let mut groups = Self::default();
        for row in rows {
            groups.push(key_fn(&row), row);
        }
        groups
    }

    pub fn push(&mut self, key: K, value: V) {
        self.map.entry(key).or_default().push(value);
    }

    /// Applies `sort_fn` to every bucket, including buckets for keys nobody asked for.
    pub fn sort_each<F>(&mut self, sort_fn: F)
    where
        F: Fn(&mut [V]),
    {
        for values in self.map.values_mut() {
            sort_fn(values.as_mut_slice());
        }
    }
}

/// Fails every entry of a batch of `n` keys with the same query error.
pub(crate) fn broadcast_error<T, E>(error: E, n: usize) -> Vec<BatchResult<T, E>> {
    let error = Arc::new(error);
    (0..n).map(|_| Err(AssociationError::Query(Arc::clone(&error)))).collect()
}
