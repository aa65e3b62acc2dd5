use log::debug;
use serde::{Deserialize, Serialize};
use crate::cache::{Cache, CacheContents, CacheTrait, GenericCache};
use crate::config::{CachePolicyConfig, ConfigError, ReplacementAlgorithmConfig, SimulationConfig};
use crate::replacement_policies::{FirstInFirstOut, LeastFrequentlyUsed, LeastRecentlyUsed, NoPolicy, RandomReplacement};

/// The simulator replays an address sequence against one cache and collects a result per access.
///
/// Running consumes the simulator; build a new one to simulate again from the initial contents
pub struct Simulator {
    cache: GenericCache,
    addresses: Vec<u64>,
    initial_snapshot: CacheContents,
}

/// The addresses covered by a block, inclusive
#[derive(Debug, Copy, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct BlockRange {
    pub range_min: u64,
    pub range_max: u64,
}

/// The result of one access
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct AccessResult {
    pub address: u64,
    pub block: u64,
    pub line: usize,
    pub label: u64,
    pub hit: bool,
    pub block_addresses: BlockRange,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evicted_block: Option<u64>,
}

/// The result of a whole run. Can be serialised as the output format
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct RunSummary {
    pub results: Vec<AccessResult>,
    pub miss_count: u64,
    pub initial_snapshot: CacheContents,
    pub final_snapshot: CacheContents,
}

impl RunSummary {
    pub fn hit_count(&self) -> u64 {
        self.results.len() as u64 - self.miss_count
    }
}

impl Simulator {
    /// Creates a new simulator for a given configuration
    ///
    /// # Arguments
    ///
    /// * `config`: A simulation configuration, usually resulting from parsing JSON or the command
    /// line
    ///
    /// returns: Result<Simulator, ConfigError>
    pub fn new(config: &SimulationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let cache = Self::config_to_cache(config)?;
        debug!(
            "Simulating {} addresses on {} lines of {} words, {:?} with {:?}",
            config.addresses.len(),
            config.lines,
            config.words_per_block,
            config.policy,
            config.algorithm
        );
        Ok(Self {
            initial_snapshot: cache.contents().clone(),
            cache,
            addresses: config.addresses.clone(),
        })
    }

    /// The contents before any address is read
    pub fn initial_snapshot(&self) -> &CacheContents {
        &self.initial_snapshot
    }

    /// Reads every address in order
    pub fn run(self) -> RunSummary {
        let Simulator { mut cache, addresses, initial_snapshot } = self;
        let words_per_block = cache.get_words_per_block();
        let mut results = Vec::with_capacity(addresses.len());
        let mut miss_count = 0;
        for address in addresses {
            let (block, label) = cache.address_to_block_and_label(address);
            let access = cache.read_and_update_line(address);
            if !access.hit {
                miss_count += 1;
            }
            let range_min = block * words_per_block;
            let result = AccessResult {
                address,
                block,
                line: access.line,
                label,
                hit: access.hit,
                block_addresses: BlockRange {
                    range_min,
                    range_max: range_min + words_per_block - 1,
                },
                evicted_block: access.evicted_block,
            };
            debug!(
                "{address}: block {block}, label {label}, line {} -> {}",
                result.line,
                match result.evicted_block {
                    None => "hit".to_string(),
                    Some(evicted) => format!("miss, replaced block {evicted}"),
                }
            );
            results.push(result);
        }
        debug!("{miss_count} misses in {} accesses", results.len());
        RunSummary {
            results,
            miss_count,
            initial_snapshot,
            final_snapshot: cache.contents().clone(),
        }
    }

    /// Creates a new cache from a configuration
    ///
    /// Direct mapped caches have no choice of line, so the replacement algorithm is ignored
    fn config_to_cache(config: &SimulationConfig) -> Result<GenericCache, ConfigError> {
        let lines = config.lines;
        let words = config.words_per_block;
        let cache = match config.policy {
            CachePolicyConfig::DirectMapped => GenericCache::from(Cache::new(lines, words, NoPolicy)),
            CachePolicyConfig::SetAssociative => {
                return Err(ConfigError::UnsupportedPolicy(config.policy));
            }
            CachePolicyConfig::FullyAssociative => match config.algorithm {
                ReplacementAlgorithmConfig::FirstInFirstOut => {
                    GenericCache::from(Cache::new(lines, words, FirstInFirstOut::new(lines)))
                }
                ReplacementAlgorithmConfig::LeastRecentlyUsed => {
                    GenericCache::from(Cache::new(lines, words, LeastRecentlyUsed::new(lines)))
                }
                ReplacementAlgorithmConfig::LeastFrequentlyUsed => {
                    GenericCache::from(Cache::new(lines, words, LeastFrequentlyUsed::new(lines)))
                }
                ReplacementAlgorithmConfig::Random => {
                    GenericCache::from(Cache::new(lines, words, RandomReplacement::new(lines, config.seed)))
                }
            },
        };
        Ok(cache)
    }
}
