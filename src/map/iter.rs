use super::HashMap;

use std::{iter::FusedIterator, ops::ControlFlow};

use smallvec::SmallVec;

type Snapshot<K, V> = SmallVec<[(K, V); 8]>;

/// An iterator over clones of the entries of a [`HashMap`].
///
/// Created by [`HashMap::iter`]. The buckets are partitioned by the capacity
/// the map had when the iterator was created; each call that runs out of
/// buffered entries clones the entries of the next partition, locking one
/// bucket at a time.
pub struct Iter<'a, K, V, S> {
    map: &'a HashMap<K, V, S>,
    class_capacity: usize,
    next_class: usize,
    buffered: smallvec::IntoIter<[(K, V); 8]>,
}

impl<'a, K, V, S> Iter<'a, K, V, S> {
    pub(crate) fn new(map: &'a HashMap<K, V, S>, class_capacity: usize) -> Self {
        Self {
            map,
            class_capacity,
            next_class: 0,
            buffered: Snapshot::new().into_iter(),
        }
    }
}

impl<K, V, S> Iterator for Iter<'_, K, V, S>
where
    K: Clone,
    V: Clone,
{
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let entry @ Some(_) = self.buffered.next() {
                return entry;
            }
            if self.next_class >= self.class_capacity {
                return None;
            }

            let mut snapshot = Snapshot::new();
            let _ = self
                .map
                .scan_class(self.next_class, self.class_capacity, &mut |chain| {
                    snapshot.extend(chain.iter().map(|e| (e.key.clone(), e.value.clone())));
                    ControlFlow::Continue(())
                });

            self.next_class += 1;
            self.buffered = snapshot.into_iter();
        }
    }
}

impl<K: Clone, V: Clone, S> FusedIterator for Iter<'_, K, V, S> {}

/// An iterator over clones of the keys of a [`HashMap`]. Created by
/// [`HashMap::keys`].
pub struct Keys<'a, K, V, S> {
    inner: Iter<'a, K, V, S>,
}

impl<'a, K, V, S> Keys<'a, K, V, S> {
    pub(crate) fn new(inner: Iter<'a, K, V, S>) -> Self {
        Self { inner }
    }
}

impl<K: Clone, V: Clone, S> Iterator for Keys<'_, K, V, S> {
    type Item = K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }
}

impl<K: Clone, V: Clone, S> FusedIterator for Keys<'_, K, V, S> {}

/// An iterator over clones of the values of a [`HashMap`]. Created by
/// [`HashMap::values`].
pub struct Values<'a, K, V, S> {
    inner: Iter<'a, K, V, S>,
}

impl<'a, K, V, S> Values<'a, K, V, S> {
    pub(crate) fn new(inner: Iter<'a, K, V, S>) -> Self {
        Self { inner }
    }
}

impl<K: Clone, V: Clone, S> Iterator for Values<'_, K, V, S> {
    type Item = V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }
}

impl<K: Clone, V: Clone, S> FusedIterator for Values<'_, K, V, S> {}
