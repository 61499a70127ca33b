use std::hash::{BuildHasher, Hash, Hasher};

/// The capacity of the first table when none was requested, and the lower bound
/// of every table capacity.
pub(crate) const DEFAULT_CAPACITY: usize = 16;

/// The capacity is never doubled past this point.
pub(crate) const MAX_CAPACITY: usize = 1 << 30;

pub(crate) const DEFAULT_LOAD_FACTOR: f32 = 0.75;

/// Rounds the requested capacity up to a power of two within
/// `[DEFAULT_CAPACITY, MAX_CAPACITY]`.
#[inline]
pub(crate) fn table_size_for(capacity: usize) -> usize {
    capacity
        .clamp(DEFAULT_CAPACITY, MAX_CAPACITY)
        .next_power_of_two()
}

/// Returns `floor(capacity * load_factor)`, saturating at `usize::MAX`.
#[inline]
pub(crate) fn threshold_for(capacity: usize, load_factor: f32) -> usize {
    // Float to int casts saturate, and truncation is the floor for positive
    // values.
    (capacity as f64 * f64::from(load_factor)) as usize
}

/// Returns the capacity of the table that follows a table of `capacity`, or
/// `None` when the table is already as large as it can get.
#[inline]
pub(crate) fn next_capacity(capacity: usize) -> Option<usize> {
    if capacity >= MAX_CAPACITY {
        None
    } else {
        Some(capacity << 1)
    }
}

pub(crate) fn is_valid_load_factor(load_factor: f32) -> bool {
    load_factor.is_finite() && load_factor > 0.0
}

/// Hashes `key` with the map's hasher and folds the result into 32 bits.
pub(crate) fn hash<K, H>(build_hasher: &H, key: &K) -> u32
where
    K: ?Sized + Hash,
    H: BuildHasher,
{
    let mut hasher = build_hasher.build_hasher();
    key.hash(&mut hasher);

    spread(hasher.finish())
}

/// Folds the high bits into the low bits, which are the only ones used to
/// select a bucket in small tables.
#[inline]
pub(crate) fn spread(hash: u64) -> u32 {
    let h = (hash ^ (hash >> 32)) as u32;
    h ^ (h >> 16)
}
