#![warn(clippy::all)]
#![warn(rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! A concurrent hash map with per-bucket locks and incremental resizing.
//!
//! [`HashMap`] lets any number of threads insert, look up and remove entries
//! through a shared reference. Every bucket of the table has its own lock, so
//! threads working on different buckets do not wait for each other, and there
//! is no lock over the whole map on the hot path.
//!
//! When the map holds more entries than `capacity * load_factor`, the table is
//! doubled. The resizing thread splits the old buckets into the new table one
//! by one; an entry whose hash is `h` either stays at index `h & (capacity - 1)`
//! or moves to that index plus `capacity`. Entries are relinked, never cloned
//! or rehashed. The other threads keep using the map while this happens: a
//! bucket that has not been split is still served from the old table, and one
//! that has been split is served from the new one.
//!
//! Retired tables are reclaimed with epoch-based garbage collection
//! ([`crossbeam-epoch`][crossbeam-epoch]).
//!
//! # Example
//!
//! ```rust
//! use splitmap::HashMap;
//!
//! let map = HashMap::new();
//!
//! for i in 0..100 {
//!     map.insert(i, i * i);
//! }
//!
//! assert_eq!(map.len(), 100);
//! assert_eq!(map.get(&9), Some(81));
//! assert!(map.remove_if_eq(&9, &81));
//! assert!(!map.contains_key(&9));
//! ```
//!
//! # Logging
//!
//! With the `logging` feature enabled, a map emits [`log`][log-crate] records
//! when it allocates its first table (`debug`), when it resizes (`debug`) and
//! when it skips a resize (`trace`). Records are prefixed with the name given
//! to [`HashMapBuilder::name`].
//!
//! [crossbeam-epoch]: https://docs.rs/crossbeam-epoch
//! [log-crate]: https://docs.rs/log

#[cfg(test)]
#[macro_use]
mod test_util;

pub(crate) mod builder;
pub(crate) mod common;
pub(crate) mod map;

pub use builder::HashMapBuilder;
pub use common::error::ConfigError;
pub use map::{
    iter::{Iter, Keys, Values},
    HashMap,
};
