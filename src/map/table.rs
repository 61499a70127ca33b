use super::bucket::{Bucket, Chain};

use std::sync::atomic::{self, AtomicIsize, Ordering};

use crossbeam_epoch::{Atomic, Guard, Owned, Shared};

/// One generation of the bucket array.
///
/// Besides its buckets, a table records the resize *out of* it: `successor`
/// is the table twice its size that its entries are being split into, and
/// `migration_cursor` is the number of buckets already split (`-1` before a
/// resize starts). A table that has been fully migrated keeps both, so a
/// thread still holding a pointer to it is routed to the newer generation.
pub(crate) struct Table<K, V> {
    buckets: Box<[Atomic<Bucket<K, V>>]>,
    successor: Atomic<Table<K, V>>,
    migration_cursor: AtomicIsize,
}

/// Where the authoritative bucket for an index of a table lives.
pub(crate) enum Route<'g, K, V> {
    /// No resize has started.
    Stable,
    /// A resize is in flight but has not reached the index yet.
    Unmigrated,
    /// The index has been split into the successor.
    Migrated(&'g Table<K, V>),
}

impl<K, V> Table<K, V> {
    /// Creates a table whose buckets are all live and empty.
    pub(crate) fn live(capacity: usize) -> Self {
        Self::with_buckets(capacity, || Bucket::live(Chain::default()))
    }

    /// Creates a table of placeholder buckets, to be filled by a resize.
    pub(crate) fn pending(capacity: usize) -> Self {
        Self::with_buckets(capacity, Bucket::pending)
    }

    fn with_buckets(capacity: usize, mut new_bucket: impl FnMut() -> Bucket<K, V>) -> Self {
        assert!(capacity.is_power_of_two());

        let buckets = (0..capacity)
            .map(|_| Atomic::new(new_bucket()))
            .collect::<Vec<_>>()
            .into_boxed_slice();

        Self {
            buckets,
            successor: Atomic::null(),
            migration_cursor: AtomicIsize::new(-1),
        }
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.buckets.len()
    }

    #[inline]
    pub(crate) fn index_of(&self, hash: u32) -> usize {
        hash as usize & (self.capacity() - 1)
    }

    /// Loads the bucket at `index`.
    ///
    /// Returns `None` only if the slot has not been published, in which case
    /// the caller should retry.
    #[inline]
    pub(crate) fn bucket_at<'g>(&self, index: usize, guard: &'g Guard) -> Option<&'g Bucket<K, V>> {
        let bucket_ptr = self.buckets[index].load(Ordering::Acquire, guard);
        // Safety: buckets are only destroyed through the epoch garbage
        // collector, after they have been unlinked from this slot or after the
        // whole table has been retired, so they outlive `guard`.
        unsafe { bucket_ptr.as_ref() }
    }

    /// Stores `bucket` at `index`. The bucket it replaces is destroyed once no
    /// thread can still be reading it.
    pub(crate) fn publish_bucket(&self, index: usize, bucket: Bucket<K, V>, guard: &Guard) {
        let old_ptr = self.buckets[index].swap(Owned::new(bucket), Ordering::AcqRel, guard);
        if !old_ptr.is_null() {
            unsafe { guard.defer_destroy(old_ptr) };
        }
    }

    pub(crate) fn successor<'g>(&self, guard: &'g Guard) -> Option<&'g Table<K, V>> {
        // Safety: a successor is retired only after this table, which the
        // caller reached under `guard`.
        unsafe { self.successor_ptr(guard).as_ref() }
    }

    pub(crate) fn successor_ptr<'g>(&self, guard: &'g Guard) -> Shared<'g, Table<K, V>> {
        self.successor.load(Ordering::Acquire, guard)
    }

    /// Decides whether `current[index]` or the successor holds the
    /// authoritative bucket. The answer may be stale by the time the bucket is
    /// locked, so callers check the bucket state after locking.
    pub(crate) fn route<'g>(&self, index: usize, guard: &'g Guard) -> Route<'g, K, V> {
        let Some(successor) = self.successor(guard) else {
            return Route::Stable;
        };

        // The cursor is advanced only after the split buckets are published,
        // so observing it past `index` also makes them visible.
        if self.migration_cursor.load(Ordering::Acquire) > index as isize {
            Route::Migrated(successor)
        } else {
            Route::Unmigrated
        }
    }

    /// Links `successor` and resets the cursor to zero.
    pub(crate) fn begin_migration(&self, successor: Shared<'_, Table<K, V>>) {
        self.successor.store(successor, Ordering::Release);
        self.migration_cursor.store(0, Ordering::Release);
    }

    /// Marks one more bucket as split. Must be called after the bucket has
    /// been unlocked.
    pub(crate) fn advance_migration_cursor(&self) {
        self.migration_cursor.fetch_add(1, Ordering::AcqRel);
    }

    #[cfg(test)]
    pub(crate) fn migration_cursor(&self) -> isize {
        self.migration_cursor.load(Ordering::Acquire)
    }
}

impl<K, V> Drop for Table<K, V> {
    fn drop(&mut self) {
        // The successor is owned by the map, not by its predecessor.
        let guard = unsafe { crossbeam_epoch::unprotected() };
        atomic::fence(Ordering::Acquire);

        for bucket in self.buckets.iter() {
            let bucket_ptr = bucket.load(Ordering::Relaxed, guard);
            if !bucket_ptr.is_null() {
                drop(unsafe { bucket_ptr.into_owned() });
            }
        }
    }
}
