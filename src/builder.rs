use crate::{
    common::{error::ConfigError, sizing},
    HashMap,
};

use std::{
    collections::hash_map::RandomState,
    hash::{BuildHasher, Hash},
    marker::PhantomData,
};

/// Builds a [`HashMap`] with various configuration knobs.
///
/// # Examples
///
/// ```rust
/// use splitmap::HashMapBuilder;
///
/// let map = HashMapBuilder::new()
///     .name("sessions")
///     // Start with 1024 buckets.
///     .initial_capacity(1000)
///     // Double the table once it holds more than 512 entries per 1024 buckets.
///     .load_factor(0.5)
///     .build()
///     .unwrap();
///
/// map.insert("alice", 1);
/// assert_eq!(map.name(), Some("sessions"));
/// assert_eq!(map.capacity(), 1024);
/// ```
///
#[must_use]
pub struct HashMapBuilder<K, V> {
    name: Option<String>,
    initial_capacity: Option<usize>,
    load_factor: f32,
    map_type: PhantomData<HashMap<K, V>>,
}

impl<K, V> Default for HashMapBuilder<K, V> {
    fn default() -> Self {
        Self {
            name: None,
            initial_capacity: None,
            load_factor: sizing::DEFAULT_LOAD_FACTOR,
            map_type: PhantomData,
        }
    }
}

impl<K, V> HashMapBuilder<K, V>
where
    K: Hash + Eq,
{
    /// Constructs a new `HashMapBuilder` with the default capacity (16) and
    /// load factor (0.75).
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a `HashMap<K, V>` hashing its keys with `RandomState`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidLoadFactor`] if the load factor is not a
    /// finite number greater than zero.
    pub fn build(self) -> Result<HashMap<K, V, RandomState>, ConfigError> {
        self.build_with_hasher(RandomState::default())
    }

    /// Builds a `HashMap<K, V, S>` hashing its keys with `hasher`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidLoadFactor`] if the load factor is not a
    /// finite number greater than zero.
    pub fn build_with_hasher<S>(self, hasher: S) -> Result<HashMap<K, V, S>, ConfigError>
    where
        S: BuildHasher,
    {
        self.validate()?;

        Ok(HashMap::with_everything(
            self.name,
            self.initial_capacity.unwrap_or(sizing::DEFAULT_CAPACITY),
            self.load_factor,
            hasher,
        ))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if sizing::is_valid_load_factor(self.load_factor) {
            Ok(())
        } else {
            Err(ConfigError::InvalidLoadFactor(self.load_factor))
        }
    }
}

impl<K, V> HashMapBuilder<K, V> {
    /// Sets the name of the map. The name prefixes the log messages of the map
    /// when the `logging` feature is enabled.
    pub fn name(self, name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..self
        }
    }

    /// Sets the number of buckets of the first table. It is rounded up to a
    /// power of two between 16 and 2^30.
    pub fn initial_capacity(self, capacity: usize) -> Self {
        Self {
            initial_capacity: Some(capacity),
            ..self
        }
    }

    /// Sets the ratio of entries to buckets above which the table is doubled.
    /// Values above 1.0 are allowed and lengthen the chains.
    pub fn load_factor(self, load_factor: f32) -> Self {
        Self {
            load_factor,
            ..self
        }
    }
}
