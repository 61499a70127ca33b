use std::{borrow::Borrow, mem};

use parking_lot::{Mutex, MutexGuard};

pub(crate) struct Entry<K, V> {
    pub(crate) hash: u32,
    pub(crate) key: K,
    pub(crate) value: V,
    next: Link<K, V>,
}

type Link<K, V> = Option<Box<Entry<K, V>>>;

impl<K, V> Entry<K, V> {
    #[inline]
    fn matches<Q>(&self, hash: u32, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        self.hash == hash && self.key.borrow() == key
    }
}

/// A singly linked list of the entries that hash to one bucket.
///
/// New entries are appended at the tail, so a chain keeps its insertion order,
/// and splitting a chain in two keeps the relative order of both halves.
pub(crate) struct Chain<K, V> {
    head: Link<K, V>,
}

impl<K, V> Default for Chain<K, V> {
    fn default() -> Self {
        Self { head: None }
    }
}

impl<K, V> Chain<K, V> {
    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    pub(crate) fn len(&self) -> usize {
        self.iter().count()
    }

    pub(crate) fn iter(&self) -> ChainIter<'_, K, V> {
        ChainIter {
            next: self.head.as_deref(),
        }
    }

    /// Returns the link that holds the entry for `key`, or the empty link at
    /// the tail of the chain if there is no such entry.
    fn link_of<Q>(&mut self, hash: u32, key: &Q) -> &mut Link<K, V>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        let mut link = &mut self.head;
        while link.as_ref().map_or(false, |e| !e.matches(hash, key)) {
            if let Some(entry) = link {
                link = &mut entry.next;
            }
        }
        link
    }

    pub(crate) fn find<Q>(&self, hash: u32, key: &Q) -> Option<&Entry<K, V>>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        self.iter().find(|e| e.matches(hash, key))
    }

    pub(crate) fn find_mut<Q>(&mut self, hash: u32, key: &Q) -> Option<&mut Entry<K, V>>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        self.link_of(hash, key).as_deref_mut()
    }

    /// Replaces the value of the entry for `key`, or appends a new entry at the
    /// tail. Returns the replaced value.
    pub(crate) fn upsert(&mut self, hash: u32, key: K, value: V) -> Option<V>
    where
        K: Eq,
    {
        let link = self.link_of(hash, &key);
        match link {
            Some(entry) => Some(mem::replace(&mut entry.value, value)),
            None => {
                *link = Some(Box::new(Entry {
                    hash,
                    key,
                    value,
                    next: None,
                }));
                None
            }
        }
    }

    /// Unlinks the entry for `key` if `condition` holds for it. Removing the
    /// head makes its successor the new head; otherwise the predecessor is
    /// relinked to the successor.
    pub(crate) fn remove_if<Q, F>(&mut self, hash: u32, key: &Q, condition: F) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
        F: FnOnce(&K, &V) -> bool,
    {
        let link = self.link_of(hash, key);
        let entry = link.as_mut()?;
        if !condition(&entry.key, &entry.value) {
            return None;
        }

        let next = entry.next.take();
        let Entry { key, value, .. } = *mem::replace(link, next)?;
        Some((key, value))
    }

    /// Moves every entry into one of two chains depending on whether
    /// `hash & bit` is set. Entries are relinked, not copied.
    pub(crate) fn split(mut self, bit: u32) -> (Self, Self) {
        let mut low = Self::default();
        let mut high = Self::default();
        let mut low_tail = &mut low.head;
        let mut high_tail = &mut high.head;

        let mut rest = self.head.take();
        while let Some(mut entry) = rest {
            rest = entry.next.take();
            if entry.hash & bit == 0 {
                low_tail = &mut low_tail.insert(entry).next;
            } else {
                high_tail = &mut high_tail.insert(entry).next;
            }
        }

        (low, high)
    }
}

impl<K, V> Drop for Chain<K, V> {
    fn drop(&mut self) {
        // Unlink iteratively so a long chain does not overflow the stack.
        let mut rest = self.head.take();
        while let Some(mut entry) = rest {
            rest = entry.next.take();
        }
    }
}

pub(crate) struct ChainIter<'a, K, V> {
    next: Option<&'a Entry<K, V>>,
}

impl<'a, K, V> Iterator for ChainIter<'a, K, V> {
    type Item = &'a Entry<K, V>;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.next?;
        self.next = entry.next.as_deref();
        Some(entry)
    }
}

/// What a bucket holds. Only a `Live` bucket is authoritative for its hashes.
pub(crate) enum BucketState<K, V> {
    /// A placeholder in a table that is still being filled by a resize.
    Pending,
    Live(Chain<K, V>),
    /// The entries were split into the successor table.
    Moved,
}

pub(crate) struct Bucket<K, V> {
    state: Mutex<BucketState<K, V>>,
}

impl<K, V> Bucket<K, V> {
    pub(crate) fn live(chain: Chain<K, V>) -> Self {
        Self {
            state: Mutex::new(BucketState::Live(chain)),
        }
    }

    pub(crate) fn pending() -> Self {
        Self {
            state: Mutex::new(BucketState::Pending),
        }
    }

    #[inline]
    pub(crate) fn lock(&self) -> MutexGuard<'_, BucketState<K, V>> {
        self.state.lock()
    }
}

impl<K, V> BucketState<K, V> {
    pub(crate) fn as_live_mut(&mut self) -> Option<&mut Chain<K, V>> {
        match self {
            Self::Live(chain) => Some(chain),
            _ => None,
        }
    }

    /// Takes the chain out of a live bucket, leaving it `Moved`.
    pub(crate) fn take_for_move(&mut self) -> Option<Chain<K, V>> {
        match mem::replace(self, Self::Moved) {
            Self::Live(chain) => Some(chain),
            other => {
                *self = other;
                None
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn is_moved(&self) -> bool {
        matches!(self, Self::Moved)
    }
}
