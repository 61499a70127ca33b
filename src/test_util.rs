use std::{
    borrow::Borrow,
    hash::{BuildHasher, Hash, Hasher},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use crossbeam_epoch::Owned;

/// Wraps a value and flips its `DropNotifier` when dropped. Dropping it twice
/// panics.
#[derive(Debug)]
pub(crate) struct NoisyDropper<T: ?Sized> {
    parent: Arc<DropNotifier>,
    pub(crate) elem: T,
}

impl<T> NoisyDropper<T> {
    pub(crate) fn new(parent: Arc<DropNotifier>, elem: T) -> Self {
        Self { parent, elem }
    }
}

impl<T: ?Sized> Drop for NoisyDropper<T> {
    fn drop(&mut self) {
        assert!(!self.parent.dropped.swap(true, Ordering::Relaxed));
    }
}

impl<T: ?Sized + PartialEq> PartialEq for NoisyDropper<T> {
    fn eq(&self, other: &Self) -> bool {
        self.elem == other.elem
    }
}

impl<T: ?Sized + Eq> Eq for NoisyDropper<T> {}

impl<T: ?Sized + Hash> Hash for NoisyDropper<T> {
    fn hash<H: Hasher>(&self, hasher: &mut H) {
        self.elem.hash(hasher);
    }
}

impl<T: ?Sized> Borrow<T> for NoisyDropper<T> {
    fn borrow(&self) -> &T {
        &self.elem
    }
}

#[derive(Debug)]
pub(crate) struct DropNotifier {
    dropped: AtomicBool,
}

impl DropNotifier {
    pub(crate) fn new() -> Self {
        Self {
            dropped: AtomicBool::new(false),
        }
    }

    pub(crate) fn was_dropped(&self) -> bool {
        self.dropped.load(Ordering::Relaxed)
    }
}

/// Hashes every key to the same value, so that all entries share one chain.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct ConstantHasher;

impl BuildHasher for ConstantHasher {
    type Hasher = ConstantHasher;

    fn build_hasher(&self) -> Self::Hasher {
        *self
    }
}

impl Hasher for ConstantHasher {
    fn finish(&self) -> u64 {
        0x5a5a
    }

    fn write(&mut self, _bytes: &[u8]) {}
}

/// Pushes enough garbage through the epoch collector that retired tables and
/// buckets are likely to have been destroyed.
pub(crate) fn run_deferred() {
    for _ in 0..65536 {
        let guard = crossbeam_epoch::pin();
        unsafe { guard.defer_destroy(Owned::new(0).into_shared(&guard)) };
        guard.flush();
    }
}

/// Writes the test cases that every map configuration must pass. `$m` must
/// have `new` and `with_capacity` constructors.
macro_rules! write_test_cases_for_me {
    ($m:ident) => {
        #[test]
        fn insertion() {
            const MAX_VALUE: i32 = 256;

            let map = $m::with_capacity(MAX_VALUE as usize * 2);

            for i in 0..MAX_VALUE {
                assert_eq!(map.insert(i, i), None);
                assert!(!map.is_empty());
                assert_eq!(map.len(), (i + 1) as usize);

                for j in 0..=i {
                    assert_eq!(map.get(&j), Some(j));
                    assert_eq!(map.insert(j, j), Some(j));
                }
                for k in i + 1..MAX_VALUE {
                    assert_eq!(map.get(&k), None);
                }
            }
            // Never went over the threshold of the initial table.
            assert_eq!(map.capacity(), MAX_VALUE as usize * 2);

            $crate::test_util::run_deferred();
        }

        #[test]
        fn growth() {
            const MAX_VALUE: i32 = 256;

            let map = $m::new();

            for i in 0..MAX_VALUE {
                assert_eq!(map.insert(i, i), None);
                assert_eq!(map.len(), (i + 1) as usize);
                assert!(map.len() <= map.threshold());

                for j in 0..=i {
                    assert_eq!(map.get(&j), Some(j));
                }
                for k in i + 1..MAX_VALUE {
                    assert!(!map.contains_key(&k));
                }
            }

            $crate::test_util::run_deferred();
        }

        #[test]
        fn concurrent_growth() {
            const MAX_VALUE: i32 = 512;
            const NUM_THREADS: usize = 16;
            const MAX_INSERTED_VALUE: i32 = (NUM_THREADS as i32) * MAX_VALUE;

            let map = std::sync::Arc::new($m::new());
            let barrier = std::sync::Arc::new(std::sync::Barrier::new(NUM_THREADS));

            let threads: Vec<_> = (0..NUM_THREADS)
                .map(|i| {
                    let map = std::sync::Arc::clone(&map);
                    let barrier = std::sync::Arc::clone(&barrier);

                    std::thread::spawn(move || {
                        barrier.wait();
                        for j in (0..MAX_VALUE).map(|j| j + (i as i32 * MAX_VALUE)) {
                            assert_eq!(map.insert(j, j), None);
                        }
                    })
                })
                .collect();

            for result in threads.into_iter().map(std::thread::JoinHandle::join) {
                assert!(result.is_ok());
            }

            assert_eq!(map.len(), MAX_INSERTED_VALUE as usize);
            for i in 0..MAX_INSERTED_VALUE {
                assert_eq!(map.get(&i), Some(i));
            }

            $crate::test_util::run_deferred();
        }

        #[test]
        fn removal() {
            const MAX_VALUE: i32 = 512;

            let map = $m::new();
            for i in 0..MAX_VALUE {
                assert_eq!(map.insert(i, i), None);
            }
            for i in 0..MAX_VALUE {
                assert_eq!(map.remove(&i), Some(i));
                assert_eq!(map.remove(&i), None);
            }

            assert!(map.is_empty());
            for i in 0..MAX_VALUE {
                assert_eq!(map.get(&i), None);
            }

            $crate::test_util::run_deferred();
        }

        #[test]
        fn concurrent_growth_and_removal() {
            const MAX_VALUE: i32 = 512;
            const NUM_THREADS: usize = 8;
            const MAX_INSERTED_VALUE: i32 = (NUM_THREADS as i32) * MAX_VALUE * 2;
            const INSERTED_MIDPOINT: i32 = MAX_INSERTED_VALUE / 2;

            let map = $m::new();
            for i in INSERTED_MIDPOINT..MAX_INSERTED_VALUE {
                assert_eq!(map.insert(i, i), None);
            }

            let map = std::sync::Arc::new(map);
            let barrier = std::sync::Arc::new(std::sync::Barrier::new(NUM_THREADS * 2));

            let inserters = (0..NUM_THREADS).map(|i| {
                let map = std::sync::Arc::clone(&map);
                let barrier = std::sync::Arc::clone(&barrier);

                std::thread::spawn(move || {
                    barrier.wait();
                    for j in (0..MAX_VALUE).map(|j| j + (i as i32 * MAX_VALUE)) {
                        assert_eq!(map.insert(j, j), None);
                    }
                })
            });

            let removers = (0..NUM_THREADS).map(|i| {
                let map = std::sync::Arc::clone(&map);
                let barrier = std::sync::Arc::clone(&barrier);

                std::thread::spawn(move || {
                    barrier.wait();
                    for j in (0..MAX_VALUE).map(|j| INSERTED_MIDPOINT + j + (i as i32 * MAX_VALUE))
                    {
                        assert_eq!(map.remove(&j), Some(j));
                    }
                })
            });

            let threads: Vec<_> = inserters.chain(removers).collect();
            for result in threads.into_iter().map(std::thread::JoinHandle::join) {
                assert!(result.is_ok());
            }

            assert_eq!(map.len(), INSERTED_MIDPOINT as usize);
            for i in 0..INSERTED_MIDPOINT {
                assert_eq!(map.get(&i), Some(i));
            }
            for i in INSERTED_MIDPOINT..MAX_INSERTED_VALUE {
                assert_eq!(map.get(&i), None);
            }

            $crate::test_util::run_deferred();
        }

        #[test]
        fn concurrent_overlapped_insertion() {
            const NUM_THREADS: usize = 16;
            const MAX_VALUE: i32 = 256;

            let map = std::sync::Arc::new($m::new());
            let barrier = std::sync::Arc::new(std::sync::Barrier::new(NUM_THREADS));

            // Every thread inserts the same keys; exactly one insertion of each
            // key sees it as new.
            let threads: Vec<_> = (0..NUM_THREADS)
                .map(|_| {
                    let map = std::sync::Arc::clone(&map);
                    let barrier = std::sync::Arc::clone(&barrier);

                    std::thread::spawn(move || {
                        barrier.wait();
                        (0..MAX_VALUE)
                            .filter(|&j| map.insert(j, j).is_none())
                            .count()
                    })
                })
                .collect();

            let fresh: usize = threads
                .into_iter()
                .map(|t| t.join().expect("thread panicked"))
                .sum();

            assert_eq!(fresh, MAX_VALUE as usize);
            assert_eq!(map.len(), MAX_VALUE as usize);

            $crate::test_util::run_deferred();
        }

        #[test]
        fn concurrent_overlapped_removal() {
            const NUM_THREADS: usize = 16;
            const MAX_VALUE: i32 = 512;

            let map = $m::new();
            for i in 0..MAX_VALUE {
                map.insert(i, i);
            }

            let map = std::sync::Arc::new(map);
            let barrier = std::sync::Arc::new(std::sync::Barrier::new(NUM_THREADS));

            let threads: Vec<_> = (0..NUM_THREADS)
                .map(|_| {
                    let map = std::sync::Arc::clone(&map);
                    let barrier = std::sync::Arc::clone(&barrier);

                    std::thread::spawn(move || {
                        barrier.wait();
                        (0..MAX_VALUE).filter(|j| map.remove(j).is_some()).count()
                    })
                })
                .collect();

            let removed: usize = threads
                .into_iter()
                .map(|t| t.join().expect("thread panicked"))
                .sum();

            assert_eq!(removed, MAX_VALUE as usize);
            assert!(map.is_empty());

            $crate::test_util::run_deferred();
        }

        #[test]
        fn concurrent_compare_and_set() {
            const NUM_THREADS: usize = 8;
            const NUM_INCREMENTS: usize = 1000;

            let map = std::sync::Arc::new($m::new());
            map.insert(0, 0);
            let barrier = std::sync::Arc::new(std::sync::Barrier::new(NUM_THREADS));

            let threads: Vec<_> = (0..NUM_THREADS)
                .map(|t| {
                    let map = std::sync::Arc::clone(&map);
                    let barrier = std::sync::Arc::clone(&barrier);

                    std::thread::spawn(move || {
                        barrier.wait();
                        for i in 0..NUM_INCREMENTS {
                            // Grow the map meanwhile.
                            map.insert((t * NUM_INCREMENTS + i + 1) as i32, 0);
                            loop {
                                let current = map.get(&0).expect("never removed");
                                if map.replace_if_eq(&0, &current, current + 1) {
                                    break;
                                }
                            }
                        }
                    })
                })
                .collect();

            for result in threads.into_iter().map(std::thread::JoinHandle::join) {
                assert!(result.is_ok());
            }

            assert_eq!(map.get(&0), Some((NUM_THREADS * NUM_INCREMENTS) as i32));

            $crate::test_util::run_deferred();
        }

        #[test]
        fn get_with_and_remove_if() {
            let map = $m::new();
            map.insert(1, String::from("one"));

            assert_eq!(map.get_with(&1, String::len), Some(3));
            assert_eq!(map.get_with(&2, String::len), None);

            assert_eq!(map.remove_if(&1, |_, v| v.is_empty()), None);
            assert_eq!(map.len(), 1);
            assert_eq!(map.remove_if(&1, |k, v| *k == 1 && v == "one").as_deref(), Some("one"));
            assert!(map.is_empty());
        }

        #[test]
        fn drop_value() {
            let key_parent = std::sync::Arc::new($crate::test_util::DropNotifier::new());
            let value_parent = std::sync::Arc::new($crate::test_util::DropNotifier::new());

            {
                let map = $m::new();

                assert!(map
                    .insert(
                        $crate::test_util::NoisyDropper::new(std::sync::Arc::clone(&key_parent), 0),
                        $crate::test_util::NoisyDropper::new(std::sync::Arc::clone(&value_parent), 0),
                    )
                    .is_none());
                assert_eq!(map.get_with(&0, |v| v.elem), Some(0));

                let removed = map.remove(&0);
                assert!(removed.is_some());
                assert!(!value_parent.was_dropped());
                drop(removed);

                assert!(map.is_empty());
                assert!(key_parent.was_dropped());
                assert!(value_parent.was_dropped());
            }

            $crate::test_util::run_deferred();
        }

        #[test]
        fn drop_many_values() {
            const NUM_VALUES: usize = 1 << 14;

            let parents: Vec<_> = std::iter::repeat_with(|| {
                std::sync::Arc::new($crate::test_util::DropNotifier::new())
            })
            .take(NUM_VALUES)
            .collect();

            {
                let map = $m::new();
                for (i, parent) in parents.iter().enumerate() {
                    let value =
                        $crate::test_util::NoisyDropper::new(std::sync::Arc::clone(parent), i);
                    assert!(map.insert(i, value).is_none());
                }
                assert_eq!(map.len(), NUM_VALUES);

                $crate::test_util::run_deferred();
                // Resizing relinks entries; none of them may have been dropped.
                assert!(parents.iter().all(|p| !p.was_dropped()));

                for i in (0..NUM_VALUES).step_by(2) {
                    assert!(map.remove(&i).is_some());
                }
                for (i, parent) in parents.iter().enumerate() {
                    assert_eq!(parent.was_dropped(), i % 2 == 0);
                }
            }

            $crate::test_util::run_deferred();
            assert!(parents.iter().all(|p| p.was_dropped()));
        }

        #[test]
        fn iteration() {
            const MAX_VALUE: i32 = 300;

            let map = $m::new();
            for i in 0..MAX_VALUE {
                map.insert(i, i * 2);
            }

            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_unstable();
            assert_eq!(entries, (0..MAX_VALUE).map(|i| (i, i * 2)).collect::<Vec<_>>());

            let mut keys: Vec<_> = map.keys().collect();
            keys.sort_unstable();
            assert_eq!(keys, (0..MAX_VALUE).collect::<Vec<_>>());

            assert_eq!(map.values().map(i64::from).sum::<i64>(), i64::from(MAX_VALUE * (MAX_VALUE - 1)));
        }

        #[test]
        fn default() {
            let map: $m<i32, i32> = Default::default();
            assert!(map.is_empty());
            assert_eq!(map.capacity(), 0);
            assert_eq!(map.name(), None);
        }
    };
}
