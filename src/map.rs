//! A concurrent hash map with per-bucket locks and incremental resizing.

pub(crate) mod bucket;
pub(crate) mod iter;
pub(crate) mod table;

use self::{
    bucket::{Bucket, BucketState, Chain},
    iter::{Iter, Keys, Values},
    table::{Route, Table},
};
use crate::{
    builder::HashMapBuilder,
    common::{error::ConfigError, sizing},
};

use std::{
    borrow::Borrow,
    collections::hash_map::RandomState,
    fmt,
    hash::{BuildHasher, Hash},
    mem,
    ops::ControlFlow,
    sync::atomic::{self, AtomicUsize, Ordering},
};

use crossbeam_epoch::{Atomic, Guard, Owned};
use crossbeam_utils::{Backoff, CachePadded};
use parking_lot::{MappedMutexGuard, Mutex, MutexGuard};

/// A concurrent hash map with per-bucket locks and incremental resizing.
///
/// Every bucket of the table owns a mutex and a chain of entries. An operation
/// hashes its key, locks the one bucket the key belongs to, and works on that
/// bucket's chain, so operations on keys in different buckets never contend.
///
/// When the number of entries exceeds `capacity * load_factor`, the thread
/// whose insertion crossed the threshold doubles the table. It allocates the
/// next table and splits the old buckets into it one at a time, in index
/// order, holding only the lock of the bucket being split. The other threads
/// keep operating during the resize: a bucket that has not been split yet is
/// used from the old table, one that has been split is used from the new table.
///
/// Reads also take the bucket lock; there is no lock-free read path.
///
/// # Examples
///
/// ```rust
/// use splitmap::HashMap;
///
/// use std::{sync::Arc, thread};
///
/// let map = Arc::new(HashMap::new());
///
/// let threads: Vec<_> = (0..4)
///     .map(|i| {
///         let map = Arc::clone(&map);
///         thread::spawn(move || {
///             for j in 0..100 {
///                 map.insert(i * 100 + j, j);
///             }
///         })
///     })
///     .collect();
///
/// for t in threads {
///     t.join().unwrap();
/// }
///
/// assert_eq!(map.len(), 400);
/// assert_eq!(map.get(&101), Some(1));
/// ```
///
/// # Hashing Algorithm
///
/// By default, `HashMap` uses the hashing algorithm of
/// `std::collections::HashMap`, which is resistant to HashDoS attacks. It can
/// be replaced through [`with_hasher`](#method.with_hasher) or
/// [`HashMapBuilder::build_with_hasher`]. The 64-bit hash is folded into 32
/// bits before a bucket is selected.
///
/// It is a logic error for a key to be modified in such a way that its hash or
/// its equality changes while it is in the map.
pub struct HashMap<K, V, S = RandomState> {
    current: Atomic<Table<K, V>>,
    len: CachePadded<AtomicUsize>,
    threshold: AtomicUsize,
    load_factor: f32,
    initial_capacity: usize,
    resize_lock: Mutex<()>,
    build_hasher: S,
    name: Option<String>,
}

impl<K, V> HashMap<K, V, RandomState>
where
    K: Hash + Eq,
{
    /// Creates an empty `HashMap` with the default capacity (16) and load
    /// factor (0.75).
    ///
    /// No table is allocated until the first insertion.
    pub fn new() -> Self {
        Self::with_capacity(sizing::DEFAULT_CAPACITY)
    }

    /// Creates an empty `HashMap` whose first table has room for `capacity`
    /// buckets, rounded up to a power of two.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_everything(
            None,
            capacity,
            sizing::DEFAULT_LOAD_FACTOR,
            RandomState::default(),
        )
    }

    /// Creates an empty `HashMap` with the given initial capacity and load
    /// factor.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidLoadFactor`] if `load_factor` is not a
    /// finite number greater than zero.
    pub fn with_capacity_and_load_factor(
        capacity: usize,
        load_factor: f32,
    ) -> Result<Self, ConfigError> {
        Self::builder()
            .initial_capacity(capacity)
            .load_factor(load_factor)
            .build()
    }

    /// Returns a [`HashMapBuilder`], which can build a `HashMap` with a name,
    /// an initial capacity, a load factor and a custom hasher.
    pub fn builder() -> HashMapBuilder<K, V> {
        HashMapBuilder::default()
    }
}

impl<K, V, S> HashMap<K, V, S> {
    /// Creates an empty `HashMap` with the default capacity and load factor,
    /// using `build_hasher` to hash the keys.
    pub fn with_hasher(build_hasher: S) -> Self {
        Self::with_capacity_and_hasher(sizing::DEFAULT_CAPACITY, build_hasher)
    }

    /// Creates an empty `HashMap` with the given initial capacity, using
    /// `build_hasher` to hash the keys.
    pub fn with_capacity_and_hasher(capacity: usize, build_hasher: S) -> Self {
        Self::with_everything(None, capacity, sizing::DEFAULT_LOAD_FACTOR, build_hasher)
    }

    pub(crate) fn with_everything(
        name: Option<String>,
        initial_capacity: usize,
        load_factor: f32,
        build_hasher: S,
    ) -> Self {
        debug_assert!(sizing::is_valid_load_factor(load_factor));

        Self {
            current: Atomic::null(),
            len: CachePadded::new(AtomicUsize::new(0)),
            threshold: AtomicUsize::new(0),
            load_factor,
            initial_capacity: sizing::table_size_for(initial_capacity),
            resize_lock: Mutex::new(()),
            build_hasher,
            name,
        }
    }

    /// Returns the name of the map, if one was given to the builder.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the number of entries in the map.
    ///
    /// Other threads can insert or remove entries at any time, so the returned
    /// number may already be outdated.
    pub fn len(&self) -> usize {
        self.len.load(Ordering::Relaxed)
    }

    /// Returns `true` if the map contains no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of buckets of the current table, or `0` if nothing
    /// has been inserted yet.
    pub fn capacity(&self) -> usize {
        let guard = &crossbeam_epoch::pin();
        self.current_table(guard).map_or(0, Table::capacity)
    }

    pub fn load_factor(&self) -> f32 {
        self.load_factor
    }

    /// Returns the number of entries that triggers the next resize.
    pub fn threshold(&self) -> usize {
        self.threshold.load(Ordering::Relaxed)
    }

    /// Removes all entries, keeping the capacity.
    ///
    /// `clear` empties the buckets one at a time. Entries inserted by other
    /// threads while it runs may or may not survive.
    pub fn clear(&self) {
        let guard = &crossbeam_epoch::pin();
        // No resize can be in flight while this lock is held, so every bucket
        // of the current table is live.
        let phase = self.resize_lock.lock();

        if let Some(table) = self.current_table(guard) {
            for index in 0..table.capacity() {
                let removed = table.bucket_at(index, guard).and_then(|bucket| {
                    let mut state = bucket.lock();
                    state.as_live_mut().map(mem::take)
                });

                // Drop the entries after the bucket is unlocked.
                if let Some(chain) = removed {
                    self.len.fetch_sub(chain.len(), Ordering::Relaxed);
                }
            }
        }

        // Inserts that crossed the threshold meanwhile skipped their resize.
        self.release_phase(phase, guard);
    }

    #[inline]
    fn current_table<'g>(&self, guard: &'g Guard) -> Option<&'g Table<K, V>> {
        let table_ptr = self.current.load(Ordering::Acquire, guard);
        // Safety: a table is destroyed only through the epoch garbage collector
        // after it has been replaced as the current table.
        unsafe { table_ptr.as_ref() }
    }

    /// Returns the current table, allocating the first one if needed.
    fn current_or_init_table<'g>(&self, guard: &'g Guard) -> &'g Table<K, V> {
        if let Some(table) = self.current_table(guard) {
            return table;
        }

        let phase = self.resize_lock.lock();
        // Another thread may have allocated it while this one was waiting.
        let table = match self.current_table(guard) {
            Some(table) => table,
            None => self.allocate_first_table(guard),
        };

        // The table may be stale once this returns; callers follow its routes.
        self.release_phase(phase, guard);
        table
    }

    fn allocate_first_table<'g>(&self, guard: &'g Guard) -> &'g Table<K, V> {
        let capacity = self.initial_capacity;
        self.threshold.store(
            sizing::threshold_for(capacity, self.load_factor),
            Ordering::Relaxed,
        );
        let table_ptr = Owned::new(Table::live(capacity)).into_shared(guard);
        self.current.store(table_ptr, Ordering::Release);

        #[cfg(feature = "logging")]
        log::debug!(
            "{}Allocated the first table with {} buckets (threshold: {})",
            self.log_prefix(),
            capacity,
            self.threshold()
        );

        // Safety: it was just allocated and is now owned by `self.current`.
        unsafe { table_ptr.deref() }
    }

    /// Locks the live chain that is authoritative for `hash`. Returns `None`
    /// if no table has been allocated yet.
    fn lock_chain<'g>(
        &self,
        hash: u32,
        guard: &'g Guard,
    ) -> Option<MappedMutexGuard<'g, Chain<K, V>>> {
        let backoff = Backoff::new();
        loop {
            let table = self.current_table(guard)?;
            if let Some(chain) = try_lock_live_chain(table, hash, guard) {
                return Some(chain);
            }
            backoff.snooze();
        }
    }

    /// Like `lock_chain`, but allocates the first table if needed.
    fn lock_chain_or_init<'g>(
        &self,
        hash: u32,
        guard: &'g Guard,
    ) -> MappedMutexGuard<'g, Chain<K, V>> {
        let backoff = Backoff::new();
        loop {
            let table = self.current_or_init_table(guard);
            if let Some(chain) = try_lock_live_chain(table, hash, guard) {
                return chain;
            }
            backoff.snooze();
        }
    }

    /// Calls `visit` with every live chain of the buckets whose index in a
    /// table of `class_capacity` buckets is `class`. Stops at the first
    /// `Break`.
    pub(crate) fn scan_class<F>(
        &self,
        class: usize,
        class_capacity: usize,
        visit: &mut F,
    ) -> ControlFlow<()>
    where
        F: FnMut(&Chain<K, V>) -> ControlFlow<()>,
    {
        let guard = &crossbeam_epoch::pin();
        let Some(table) = self.current_table(guard) else {
            return ControlFlow::Continue(());
        };

        // Tables never shrink, so the current table has at least
        // `class_capacity` buckets, and the class spans every
        // `class_capacity`-th one of them.
        let mut index = class;
        while index < table.capacity() {
            if visit_bucket(table, index, guard, visit).is_break() {
                return ControlFlow::Break(());
            }
            index += class_capacity;
        }

        ControlFlow::Continue(())
    }

    /// Doubles the table, unless another thread holds the resize phase lock.
    /// Keeps doubling while the map is still over its threshold.
    fn try_resize(&self, guard: &Guard) {
        // Pairs with the fence in `release_phase`: either this thread gets the
        // lock, or the holder sees the new length after releasing it.
        atomic::fence(Ordering::SeqCst);
        let Some(phase) = self.resize_lock.try_lock() else {
            #[cfg(feature = "logging")]
            log::trace!("{}Skipped resizing; another thread holds the lock", self.log_prefix());
            return;
        };

        while let Some(table) = self.current_table(guard) {
            if self.len() <= self.threshold() {
                break;
            }
            let Some(new_capacity) = sizing::next_capacity(table.capacity()) else {
                #[cfg(feature = "logging")]
                log::trace!("{}Skipped resizing; already at max capacity", self.log_prefix());
                break;
            };
            self.resize(&phase, table, new_capacity, guard);
        }

        self.release_phase(phase, guard);
    }

    /// Unlocks the resize phase lock, then runs the resizes that other threads
    /// skipped while it was held.
    fn release_phase(&self, phase: MutexGuard<'_, ()>, guard: &Guard) {
        drop(phase);
        atomic::fence(Ordering::SeqCst);
        if self.is_over_threshold(guard) {
            self.try_resize(guard);
        }
    }

    fn is_over_threshold(&self, guard: &Guard) -> bool {
        self.len() > self.threshold()
            && self
                .current_table(guard)
                .map_or(false, |t| t.capacity() < sizing::MAX_CAPACITY)
    }

    /// Splits every bucket of `table` into a new table of `new_capacity`
    /// buckets, then makes the new table current.
    fn resize(
        &self,
        _phase: &MutexGuard<'_, ()>,
        table: &Table<K, V>,
        new_capacity: usize,
        guard: &Guard,
    ) {
        let capacity = table.capacity();
        debug_assert_eq!(new_capacity, capacity * 2);

        #[cfg(feature = "logging")]
        log::debug!(
            "{}Resizing from {} to {} buckets (len: {}, threshold: {})",
            self.log_prefix(),
            capacity,
            new_capacity,
            self.len(),
            self.threshold()
        );

        self.threshold.store(
            sizing::threshold_for(new_capacity, self.load_factor),
            Ordering::Relaxed,
        );

        let successor_ptr = Owned::new(Table::pending(new_capacity)).into_shared(guard);
        // Safety: `successor_ptr` was just allocated and nothing frees it
        // before it is retired as a current table.
        let successor = unsafe { successor_ptr.deref() };
        table.begin_migration(successor_ptr);

        for index in 0..capacity {
            let mut state = table.bucket_at(index, guard).map(Bucket::lock);
            let chain = state
                .as_mut()
                .and_then(|s| s.take_for_move())
                .unwrap_or_default();

            // Entries whose hash has the `capacity` bit set move up by
            // `capacity`; the others keep their index.
            let (low, high) = chain.split(capacity as u32);
            successor.publish_bucket(index, Bucket::live(low), guard);
            successor.publish_bucket(index + capacity, Bucket::live(high), guard);

            // Unlock before advancing the cursor.
            drop(state);
            table.advance_migration_cursor();
        }

        let old_ptr = self.current.swap(successor_ptr, Ordering::AcqRel, guard);
        // Safety: the old table is no longer reachable from `self.current`;
        // threads still holding it are routed to the successor.
        unsafe { guard.defer_destroy(old_ptr) };

        #[cfg(feature = "logging")]
        log::debug!(
            "{}Resized to {} buckets (len: {}, threshold: {})",
            self.log_prefix(),
            new_capacity,
            self.len(),
            self.threshold()
        );
    }

    #[cfg(feature = "logging")]
    fn log_prefix(&self) -> String {
        self.name
            .as_deref()
            .map(|name| format!("[{name}] "))
            .unwrap_or_default()
    }
}

impl<K, V, S> HashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// Inserts a key-value pair, returning the value previously associated
    /// with the key, if any.
    ///
    /// If the insertion grows the map past its threshold, the calling thread
    /// doubles the table before returning, unless another thread is already
    /// resizing it.
    pub fn insert(&self, key: K, value: V) -> Option<V> {
        let hash = sizing::hash(&self.build_hasher, &key);
        let guard = &crossbeam_epoch::pin();

        let len = {
            let mut chain = self.lock_chain_or_init(hash, guard);
            if let old @ Some(_) = chain.upsert(hash, key, value) {
                return old;
            }
            // Count the new entry while its bucket is still locked, so that a
            // removal of it can never be counted first.
            self.len.fetch_add(1, Ordering::Relaxed) + 1
        };

        if len > self.threshold() {
            self.try_resize(guard);
        }

        None
    }

    /// Returns a clone of the value corresponding to the key.
    ///
    /// The key may be any borrowed form of the map's key type, but [`Hash`] and
    /// [`Eq`] on the borrowed form *must* match those for the key type.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        self.get_key_value_and(key, |_, v| v.clone())
    }

    /// Returns the result of invoking `with_value` with the value corresponding
    /// to the key, without cloning it.
    pub fn get_with<Q, F, T>(&self, key: &Q, with_value: F) -> Option<T>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        F: FnOnce(&V) -> T,
    {
        self.get_key_value_and(key, |_, v| with_value(v))
    }

    /// Returns clones of the key and the value corresponding to the key.
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q> + Clone,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        self.get_key_value_and(key, |k, v| (k.clone(), v.clone()))
    }

    /// Returns the result of invoking `with_entry` with the key-value pair
    /// corresponding to the key.
    ///
    /// `with_entry` runs while the bucket of the key is locked, so it should
    /// be short and must not access this map.
    pub fn get_key_value_and<Q, F, T>(&self, key: &Q, with_entry: F) -> Option<T>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        F: FnOnce(&K, &V) -> T,
    {
        let hash = sizing::hash(&self.build_hasher, key);
        let guard = &crossbeam_epoch::pin();

        let chain = self.lock_chain(hash, guard)?;
        let entry = chain.find(hash, key)?;
        Some(with_entry(&entry.key, &entry.value))
    }

    /// Returns `true` if the map contains a value for the key.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get_key_value_and(key, |_, _| ()).is_some()
    }

    /// Removes a key from the map, returning the value previously associated
    /// with it.
    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.remove_entry_if(key, |_, _| true).map(|(_, v)| v)
    }

    /// Removes a key from the map, returning the key and the value previously
    /// associated with it.
    pub fn remove_entry<Q>(&self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.remove_entry_if(key, |_, _| true)
    }

    /// Removes the key only if its current value equals `expected`. Returns
    /// `true` if the entry was removed.
    pub fn remove_if_eq<Q>(&self, key: &Q, expected: &V) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: PartialEq,
    {
        self.remove_entry_if(key, |_, v| v == expected).is_some()
    }

    /// Removes the key if `condition` returns `true` for its entry, returning
    /// the removed value.
    ///
    /// `condition` runs while the bucket of the key is locked.
    pub fn remove_if<Q, F>(&self, key: &Q, condition: F) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        F: FnOnce(&K, &V) -> bool,
    {
        self.remove_entry_if(key, condition).map(|(_, v)| v)
    }

    fn remove_entry_if<Q, F>(&self, key: &Q, condition: F) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        F: FnOnce(&K, &V) -> bool,
    {
        let hash = sizing::hash(&self.build_hasher, key);
        let guard = &crossbeam_epoch::pin();

        let removed = self
            .lock_chain(hash, guard)?
            .remove_if(hash, key, condition)?;
        self.len.fetch_sub(1, Ordering::Relaxed);

        Some(removed)
    }

    /// Replaces the value of the key only if the key is present, returning the
    /// old value.
    pub fn replace<Q>(&self, key: &Q, value: V) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = sizing::hash(&self.build_hasher, key);
        let guard = &crossbeam_epoch::pin();

        let mut chain = self.lock_chain(hash, guard)?;
        let entry = chain.find_mut(hash, key)?;
        Some(mem::replace(&mut entry.value, value))
    }

    /// Replaces the value of the key with `new` only if its current value
    /// equals `current`. Returns `true` if the value was replaced.
    pub fn replace_if_eq<Q>(&self, key: &Q, current: &V, new: V) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: PartialEq,
    {
        let hash = sizing::hash(&self.build_hasher, key);
        let guard = &crossbeam_epoch::pin();

        let Some(mut chain) = self.lock_chain(hash, guard) else {
            return false;
        };
        match chain.find_mut(hash, key) {
            Some(entry) if entry.value == *current => {
                entry.value = new;
                true
            }
            _ => false,
        }
    }

    /// Returns `true` if some key of the map is associated with `value`.
    ///
    /// This scans every bucket, locking one at a time.
    pub fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        let capacity = self.capacity();
        let mut visit = |chain: &Chain<K, V>| {
            if chain.iter().any(|e| e.value == *value) {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        };

        (0..capacity).any(|class| self.scan_class(class, capacity, &mut visit).is_break())
    }

    /// Returns an iterator over clones of the key-value pairs of the map.
    ///
    /// The iterator is weakly consistent: it snapshots one bucket at a time,
    /// so an entry that stays in the map for the whole iteration is yielded
    /// exactly once, while entries inserted or removed concurrently may or may
    /// not be.
    pub fn iter(&self) -> Iter<'_, K, V, S>
    where
        K: Clone,
        V: Clone,
    {
        Iter::new(self, self.capacity())
    }

    /// Returns an iterator over clones of the keys of the map. See
    /// [`iter`](#method.iter) for its consistency.
    pub fn keys(&self) -> Keys<'_, K, V, S>
    where
        K: Clone,
        V: Clone,
    {
        Keys::new(self.iter())
    }

    /// Returns an iterator over clones of the values of the map. See
    /// [`iter`](#method.iter) for its consistency.
    pub fn values(&self) -> Values<'_, K, V, S>
    where
        K: Clone,
        V: Clone,
    {
        Values::new(self.iter())
    }
}

/// Follows the routes from `table` to the bucket that should be authoritative
/// for `hash` and locks it. Returns `None` if that bucket turns out not to be
/// live, in which case the caller should retry from the current table.
fn try_lock_live_chain<'g, K, V>(
    mut table: &'g Table<K, V>,
    hash: u32,
    guard: &'g Guard,
) -> Option<MappedMutexGuard<'g, Chain<K, V>>> {
    let bucket = loop {
        let index = table.index_of(hash);
        match table.route(index, guard) {
            Route::Migrated(successor) => table = successor,
            Route::Stable | Route::Unmigrated => break table.bucket_at(index, guard)?,
        }
    };

    // A split or a resize may have happened between routing and locking. The
    // bucket state tells which.
    MutexGuard::try_map(bucket.lock(), BucketState::as_live_mut).ok()
}

/// Calls `visit` with the chain of `table[index]`, or, if that bucket has
/// been split, with the chains of the two buckets it was split into.
fn visit_bucket<K, V, F>(
    table: &Table<K, V>,
    index: usize,
    guard: &Guard,
    visit: &mut F,
) -> ControlFlow<()>
where
    F: FnMut(&Chain<K, V>) -> ControlFlow<()>,
{
    let backoff = Backoff::new();
    loop {
        let moved = match table.bucket_at(index, guard) {
            Some(bucket) => {
                let state = bucket.lock();
                match &*state {
                    BucketState::Live(chain) => return visit(chain),
                    BucketState::Moved => true,
                    BucketState::Pending => false,
                }
            }
            None => false,
        };

        if moved {
            break;
        }
        backoff.snooze();
    }

    let Some(successor) = table.successor(guard) else {
        return ControlFlow::Continue(());
    };
    let capacity = table.capacity();
    if visit_bucket(successor, index, guard, visit).is_break() {
        return ControlFlow::Break(());
    }
    visit_bucket(successor, index + capacity, guard, visit)
}

impl<K, V, S> Drop for HashMap<K, V, S> {
    fn drop(&mut self) {
        let guard = unsafe { crossbeam_epoch::unprotected() };
        atomic::fence(Ordering::Acquire);

        let mut table_ptr = self.current.load(Ordering::Relaxed, guard);
        while let Some(table) = unsafe { table_ptr.as_ref() } {
            // The current table has a successor only if a resize panicked
            // halfway. Both tables then hold some of the entries.
            let successor_ptr = table.successor_ptr(guard);
            drop(unsafe { table_ptr.into_owned() });
            table_ptr = successor_ptr;
        }
    }
}

impl<K, V> Default for HashMap<K, V, RandomState>
where
    K: Hash + Eq,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> Extend<(K, V)> for HashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K, V, S> FromIterator<(K, V)> for HashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::with_hasher(S::default());
        map.extend(iter);
        map
    }
}

impl<K, V, S> fmt::Debug for HashMap<K, V, S>
where
    K: fmt::Debug + Hash + Eq + Clone,
    V: fmt::Debug + Clone,
    S: BuildHasher,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, S> PartialEq for HashMap<K, V, S>
where
    K: Hash + Eq + Clone,
    V: PartialEq + Clone,
    S: BuildHasher,
{
    /// Compares snapshots of the two maps, so the result is only meaningful
    /// while neither is being modified.
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(k, v)| other.get_with(&k, |ov| *ov == v).unwrap_or(false))
    }
}

impl<K, V, S> Eq for HashMap<K, V, S>
where
    K: Hash + Eq + Clone,
    V: Eq + Clone,
    S: BuildHasher,
{
}
