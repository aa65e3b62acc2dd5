use serde::{Deserialize, Serialize};
use crate::replacement_policies::{FirstInFirstOut, LeastFrequentlyUsed, LeastRecentlyUsed, NoPolicy, RandomReplacement, ReplacementPolicy};

/// The words held by every line of a cache
///
/// Each line holds the absolute addresses of one whole block, in order. Serialises as a list of
/// lines, each a list of addresses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheContents {
    lines: Vec<Vec<u64>>,
}

impl CacheContents {
    /// Creates the starting contents, filled row-major with consecutive addresses
    ///
    /// Line `n` starts out holding block `n`, so accesses to the first `line_count` blocks hit
    /// before anything has been loaded
    pub fn seeded(line_count: usize, words_per_block: u64) -> Self {
        let lines = (0..line_count as u64)
            .map(|line| {
                let first = line * words_per_block;
                (first..first + words_per_block).collect()
            })
            .collect();
        Self { lines }
    }

    /// Finds the first line whose resident block contains `address`
    pub fn find_line(&self, address: u64) -> Option<usize> {
        (0..self.lines.len()).find(|&line| {
            let (first, last) = self.bounds(line);
            first <= address && address <= last
        })
    }

    /// The first and last address resident in a line
    pub fn bounds(&self, line: usize) -> (u64, u64) {
        let words = &self.lines[line];
        (words[0], words[words.len() - 1])
    }

    /// The block currently held by a line
    pub fn resident_block(&self, line: usize) -> u64 {
        let words = &self.lines[line];
        words[0] / words.len() as u64
    }

    /// Overwrites a line with every word of `block`
    pub fn fill(&mut self, line: usize, block: u64) {
        let words = &mut self.lines[line];
        let first = block * words.len() as u64;
        for (offset, word) in words.iter_mut().enumerate() {
            *word = first + offset as u64;
        }
    }

    pub fn lines(&self) -> &[Vec<u64>] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// The outcome of reading one address
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct LineAccess {
    /// The line which hit, or which the block was loaded into
    pub line: usize,
    pub hit: bool,
    /// The block replaced on a miss
    pub evicted_block: Option<u64>,
}

/// A generic trait for caches
///
/// Technically not required as we're using static dispatch instead of dyn Cache, but this gives
/// flexibility for the future with no overhead
pub trait CacheTrait {
    /// Converts an address into its block number and label
    ///
    /// The block is the address divided by the block size, the label is the block divided by the
    /// number of lines
    ///
    /// returns: (u64, u64)
    fn address_to_block_and_label(&self, address: u64) -> (u64, u64);

    /// Reads an address, loading its block on a miss
    ///
    /// On both hits and misses, the implementation must update the replacement policy
    ///
    /// # Arguments
    ///
    /// * `address`: The word address of the read
    ///
    /// returns: LineAccess
    fn read_and_update_line(&mut self, address: u64) -> LineAccess;

    /// Gets the number of words in a block
    fn get_words_per_block(&self) -> u64;

    /// Gets the number of lines in the cache
    fn get_line_count(&self) -> usize;

    /// Gets the current contents of every line
    fn contents(&self) -> &CacheContents;
}

/// A cache implementation, parameterised by a replacement policy
///
/// Lookups search every line, so the same implementation serves direct mapped and fully
/// associative placement; only the policy differs. With [`NoPolicy`] a block always goes to line
/// `block % lines`, which is where lookups find it again
pub struct Cache<R: ReplacementPolicy> {
    contents: CacheContents,
    line_count: usize,
    words_per_block: u64,
    replacement_policy: R,
}

impl<R: ReplacementPolicy> Cache<R> {
    pub fn new(line_count: usize, words_per_block: u64, policy: R) -> Self {
        Self {
            contents: CacheContents::seeded(line_count, words_per_block),
            line_count,
            words_per_block,
            replacement_policy: policy,
        }
    }

    pub fn policy(&self) -> &R {
        &self.replacement_policy
    }
}

impl<R: ReplacementPolicy> CacheTrait for Cache<R> {
    fn address_to_block_and_label(&self, address: u64) -> (u64, u64) {
        let block = address / self.words_per_block;
        (block, block / self.line_count as u64)
    }

    fn read_and_update_line(&mut self, address: u64) -> LineAccess {
        if let Some(line) = self.contents.find_line(address) {
            self.replacement_policy.update_on_read(line);
            return LineAccess { line, hit: true, evicted_block: None };
        }
        let block = address / self.words_per_block;
        let direct_mapped_line = (block % self.line_count as u64) as usize;
        let line = self.replacement_policy.get_new_line(direct_mapped_line);
        assert!(
            line < self.line_count,
            "replacement policy chose line {line} in a cache of {} lines",
            self.line_count
        );
        let evicted_block = self.contents.resident_block(line);
        self.contents.fill(line, block);
        LineAccess { line, hit: false, evicted_block: Some(evicted_block) }
    }

    fn get_words_per_block(&self) -> u64 {
        self.words_per_block
    }

    fn get_line_count(&self) -> usize {
        self.line_count
    }

    fn contents(&self) -> &CacheContents {
        &self.contents
    }
}

/// Enum for every cache type provided by the library
///
/// Trait objects would remove the boilerplate, but explicitly branching on the implementations
/// lets the compiler see the concrete types and inline the policy calls
pub enum GenericCache {
    NoPolicy(Cache<NoPolicy>),
    FirstInFirstOut(Cache<FirstInFirstOut>),
    LeastRecentlyUsed(Cache<LeastRecentlyUsed>),
    LeastFrequentlyUsed(Cache<LeastFrequentlyUsed>),
    Random(Cache<RandomReplacement>),
}

impl From<Cache<NoPolicy>> for GenericCache {
    fn from(value: Cache<NoPolicy>) -> Self {
        Self::NoPolicy(value)
    }
}

impl From<Cache<FirstInFirstOut>> for GenericCache {
    fn from(value: Cache<FirstInFirstOut>) -> Self {
        Self::FirstInFirstOut(value)
    }
}

impl From<Cache<LeastRecentlyUsed>> for GenericCache {
    fn from(value: Cache<LeastRecentlyUsed>) -> Self {
        Self::LeastRecentlyUsed(value)
    }
}

impl From<Cache<LeastFrequentlyUsed>> for GenericCache {
    fn from(value: Cache<LeastFrequentlyUsed>) -> Self {
        Self::LeastFrequentlyUsed(value)
    }
}

impl From<Cache<RandomReplacement>> for GenericCache {
    fn from(value: Cache<RandomReplacement>) -> Self {
        Self::Random(value)
    }
}

macro_rules! dispatch {
    ($cache:expr, $c:ident => $call:expr) => {
        match $cache {
            GenericCache::NoPolicy($c) => $call,
            GenericCache::FirstInFirstOut($c) => $call,
            GenericCache::LeastRecentlyUsed($c) => $call,
            GenericCache::LeastFrequentlyUsed($c) => $call,
            GenericCache::Random($c) => $call,
        }
    };
}

impl CacheTrait for GenericCache {
    fn address_to_block_and_label(&self, address: u64) -> (u64, u64) {
        dispatch!(self, c => c.address_to_block_and_label(address))
    }

    fn read_and_update_line(&mut self, address: u64) -> LineAccess {
        dispatch!(self, c => c.read_and_update_line(address))
    }

    fn get_words_per_block(&self) -> u64 {
        dispatch!(self, c => c.get_words_per_block())
    }

    fn get_line_count(&self) -> usize {
        dispatch!(self, c => c.get_line_count())
    }

    fn contents(&self) -> &CacheContents {
        dispatch!(self, c => c.contents())
    }
}
