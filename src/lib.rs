//! Batch functions that resolve has-one, has-many and many-to-many associations for a
//! dataloader.
//!
//! A dataloader collects keys, dispatches them as one batch and caches what comes back. This
//! crate supplies the batch side: given the collected keys, it runs caller-supplied
//! [`QueryFunction`]s and reshapes the returned rows into exactly one result per key, in key
//! order.
mod batch_function;
mod error;
mod group;
mod has_many;
mod has_one;
mod many_to_many;
mod query_function;

pub use batch_function::{BatchFunction, BatchResult};
pub use error::AssociationError;
pub use has_many::HasMany;
pub use has_one::HasOne;
pub use many_to_many::{CombineFn, ManyToMany};
pub use query_function::{KeyFn, QueryFunction, SortFn};
