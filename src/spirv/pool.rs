//! Shared pool of word arrays.
//!
//! Arrays are bucketed by power-of-two capacity class. A [`PooledWords`]
//! goes back to its bucket when dropped, so steady-state compilation reuses
//! the same handful of arrays instead of hitting the allocator.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use once_cell::sync::Lazy;
use parking_lot::Mutex;

use crate::spirv::error::SpirvError;
use crate::spirv::options::SpirvOptions;

const CAPACITY_CLASSES: usize = usize::BITS as usize;

static SHARED: Lazy<Arc<WordPool>> = Lazy::new(|| WordPool::new(&SpirvOptions::default()));

/// Pool counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolStats {
    /// Arrays handed out.
    pub rented: usize,
    /// Rents served from a retained array.
    pub reused: usize,
    /// Arrays taken back into a bucket.
    pub returned: usize,
    /// Arrays freed because their bucket was full.
    pub discarded: usize,
}

/// Thread-safe word-array pool.
#[derive(Debug)]
pub struct WordPool {
    classes: Mutex<Vec<Vec<Vec<u32>>>>,
    max_retained_per_class: usize,
    rented: AtomicUsize,
    reused: AtomicUsize,
    returned: AtomicUsize,
    discarded: AtomicUsize,
}

impl WordPool {
    /// Creates a private pool.
    pub fn new(options: &SpirvOptions) -> Arc<Self> {
        Arc::new(Self {
            classes: Mutex::new(vec![Vec::new(); CAPACITY_CLASSES]),
            max_retained_per_class: options.max_retained_per_class,
            rented: AtomicUsize::new(0),
            reused: AtomicUsize::new(0),
            returned: AtomicUsize::new(0),
            discarded: AtomicUsize::new(0),
        })
    }

    /// Returns the process-wide pool.
    pub fn shared() -> Arc<Self> {
        Arc::clone(&SHARED)
    }

    /// Rents an empty array with room for at least `min_words` words.
    ///
    /// The capacity is rounded up to the next power of two.
    pub fn rent(self: &Arc<Self>, min_words: usize) -> Result<PooledWords, SpirvError> {
        let capacity = min_words
            .max(1)
            .checked_next_power_of_two()
            .ok_or_else(|| SpirvError::capacity_exhausted(min_words))?;
        let class = capacity.trailing_zeros() as usize;

        self.rented.fetch_add(1, Ordering::Relaxed);
        let retained = self.classes.lock()[class].pop();
        let words = match retained {
            Some(words) => {
                self.reused.fetch_add(1, Ordering::Relaxed);
                words
            }
            None => {
                let mut words = Vec::new();
                words
                    .try_reserve_exact(capacity)
                    .map_err(|_| SpirvError::capacity_exhausted(capacity))?;
                tracing::trace!(capacity, "allocated fresh word array");
                words
            }
        };

        Ok(PooledWords {
            words,
            pool: Arc::clone(self),
        })
    }

    /// Returns an array that owns no storage yet; renting is deferred.
    pub fn empty(self: &Arc<Self>) -> PooledWords {
        PooledWords {
            words: Vec::new(),
            pool: Arc::clone(self),
        }
    }

    fn release(&self, mut words: Vec<u32>) {
        let capacity = words.capacity();
        if capacity == 0 {
            return;
        }
        // Floor class: every array in class `c` holds at least `1 << c` words.
        let class = (usize::BITS - 1 - capacity.leading_zeros()) as usize;
        words.clear();

        let mut classes = self.classes.lock();
        let bucket = &mut classes[class];
        if bucket.len() < self.max_retained_per_class {
            bucket.push(words);
            self.returned.fetch_add(1, Ordering::Relaxed);
        } else {
            self.discarded.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Returns the pool counters.
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            rented: self.rented.load(Ordering::Relaxed),
            reused: self.reused.load(Ordering::Relaxed),
            returned: self.returned.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
        }
    }

    /// Returns the number of arrays currently retained.
    pub fn retained(&self) -> usize {
        self.classes.lock().iter().map(Vec::len).sum()
    }
}

/// Word array rented from a [`WordPool`]; returned to it on drop.
#[derive(Debug)]
pub struct PooledWords {
    words: Vec<u32>,
    pool: Arc<WordPool>,
}

impl PooledWords {
    /// Returns the live words.
    pub fn as_slice(&self) -> &[u32] {
        &self.words
    }

    /// Returns the number of live words.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Returns `true` when no words are live.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Returns the array capacity in words.
    pub fn capacity(&self) -> usize {
        self.words.capacity()
    }

    /// Returns the pool this array goes back to.
    pub fn pool(&self) -> &Arc<WordPool> {
        &self.pool
    }

    pub(crate) fn vec_mut(&mut self) -> &mut Vec<u32> {
        &mut self.words
    }
}

impl Drop for PooledWords {
    fn drop(&mut self) {
        let words = std::mem::take(&mut self.words);
        self.pool.release(words);
    }
}
