use std::collections::VecDeque;
use log::trace;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A generic trait for implementing new replacement policies. Can be used to parameterise a Cache.
///
/// Policies see the whole cache as one set, lines are indexed from 0
pub trait ReplacementPolicy {
    /// Updates the policy when a cache line is read and hits
    ///
    /// Not applicable for some policies, a default which does nothing is provided
    ///
    /// # Arguments
    ///
    /// * `line`: The index of the cache line which was read
    ///
    /// returns: ()
    fn update_on_read(&mut self, _line: usize) {}

    /// Used by the cache to get a line number when a new block needs added to the cache.
    ///
    /// Implementations should assume that when this method is called, the returned line has been
    /// replaced
    ///
    /// # Arguments
    ///
    /// * `direct_mapped_line`: The line the block would occupy in a direct mapped cache, which is
    /// `block % lines`
    ///
    /// returns: usize
    fn get_new_line(&mut self, direct_mapped_line: usize) -> usize;
}

#[derive(Default)]
/// NoPolicy is used for direct mapped caches. It does nothing when updating on read, and simply
/// returns the direct mapped line when a new line is requested
pub struct NoPolicy;

impl ReplacementPolicy for NoPolicy {
    fn get_new_line(&mut self, direct_mapped_line: usize) -> usize {
        direct_mapped_line
    }
}

/// First in, first out. Lines are replaced in the order their blocks were installed, reads don't
/// change the order
///
/// The initial contents count as installed in line order, so line 0 is replaced first
pub struct FirstInFirstOut {
    install_order: VecDeque<usize>,
}

impl FirstInFirstOut {
    pub fn new(line_count: usize) -> Self {
        Self {
            install_order: (0..line_count).collect(),
        }
    }
}

impl ReplacementPolicy for FirstInFirstOut {
    fn get_new_line(&mut self, _direct_mapped_line: usize) -> usize {
        let line = self
            .install_order
            .pop_front()
            .expect("the install queue always holds every line");
        self.install_order.push_back(line);
        trace!("FIFO replacing line {line}");
        line
    }
}

/// A chronological record of line touches
///
/// Every touch is appended; older entries for the same line are tombstoned, so each line has
/// exactly one live entry and the live entries run from least to most recently used
///
/// Tombstones are dropped once there are as many as there are lines, which keeps the ledger
/// under twice the line count and every operation linear in the number of lines
#[derive(Debug, Clone)]
pub struct AccessLedger {
    entries: Vec<Option<usize>>,
    line_count: usize,
    tombstones: usize,
}

impl AccessLedger {
    /// Creates a ledger with lines `0..line_count` recorded oldest first
    pub fn new(line_count: usize) -> Self {
        let mut entries = Vec::with_capacity(2 * line_count + 1);
        entries.extend((0..line_count).map(Some));
        Self { entries, line_count, tombstones: 0 }
    }

    /// Appends a touch of `line` without superseding its older entries
    pub fn record(&mut self, line: usize) {
        self.entries.push(Some(line));
    }

    /// Records a touch of `line`, leaving it as the line's only live entry
    pub fn touch(&mut self, line: usize) {
        let newest = self.entries.len();
        self.record(line);
        for entry in &mut self.entries[..newest] {
            if *entry == Some(line) {
                *entry = None;
                self.tombstones += 1;
            }
        }
        if self.tombstones >= self.line_count.max(1) {
            self.entries.retain(Option::is_some);
            self.tombstones = 0;
        }
    }

    /// Number of entries held, live or tombstoned
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The least recently used line, the oldest live entry
    pub fn pick_victim(&self) -> Option<usize> {
        self.entries.iter().flatten().next().copied()
    }

    /// Live lines from least to most recently used
    pub fn recency_order(&self) -> Vec<usize> {
        self.entries.iter().flatten().copied().collect()
    }
}

/// Least Recently Used replacement policy, backed by an [`AccessLedger`]
pub struct LeastRecentlyUsed {
    ledger: AccessLedger,
}

impl LeastRecentlyUsed {
    pub fn new(line_count: usize) -> Self {
        Self {
            ledger: AccessLedger::new(line_count),
        }
    }

    pub fn ledger(&self) -> &AccessLedger {
        &self.ledger
    }
}

impl ReplacementPolicy for LeastRecentlyUsed {
    fn update_on_read(&mut self, line: usize) {
        self.ledger.touch(line);
    }

    fn get_new_line(&mut self, _direct_mapped_line: usize) -> usize {
        let line = self
            .ledger
            .pick_victim()
            .expect("the ledger always holds a live entry for every line");
        self.ledger.touch(line);
        trace!("LRU replacing line {line}, recency order now {:?}", self.ledger.recency_order());
        line
    }
}

/// Least frequently used replacement policy
///
/// Counts reads since each block was installed; the initial contents start at zero. Ties go to
/// the lowest line
pub struct LeastFrequentlyUsed {
    usages: Vec<u64>,
}

impl LeastFrequentlyUsed {
    pub fn new(line_count: usize) -> Self {
        Self {
            usages: vec![0; line_count],
        }
    }
}

impl ReplacementPolicy for LeastFrequentlyUsed {
    fn update_on_read(&mut self, line: usize) {
        self.usages[line] += 1;
    }

    fn get_new_line(&mut self, _direct_mapped_line: usize) -> usize {
        let (line, uses) = self
            .usages
            .iter()
            .enumerate()
            .min_by_key(|(_, uses)| **uses)
            .map(|(line, uses)| (line, *uses))
            .expect("a cache has at least one line");
        trace!("LFU replacing line {line}, used {uses} times");
        // The install itself counts as a use
        self.usages[line] = 1;
        line
    }
}

/// Replaces a uniformly random line. Seeded, so runs are reproducible
pub struct RandomReplacement {
    rng: StdRng,
    line_count: usize,
}

impl RandomReplacement {
    pub fn new(line_count: usize, seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            line_count,
        }
    }
}

impl ReplacementPolicy for RandomReplacement {
    fn get_new_line(&mut self, _direct_mapped_line: usize) -> usize {
        let line = self.rng.random_range(0..self.line_count);
        trace!("Random replacing line {line}");
        line
    }
}
