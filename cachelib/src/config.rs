use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::Read;
use clap::ValueEnum;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};

/// The address sequence used when none is given, matching the classroom exercise the simulator
/// was written for
pub const DEFAULT_ADDRESSES: [u64; 20] = [
    22, 23, 24, 22, 12, 53, 25, 8, 73, 34, 35, 93, 86, 119, 36, 25, 94, 120, 26, 95,
];

pub const DEFAULT_LINES: usize = 4;

pub const DEFAULT_WORDS_PER_BLOCK: u64 = 16;

/// Upper bound on `lines * words_per_block`, every word is held in memory
pub const MAX_CACHE_WORDS: u64 = 1 << 24;

lazy_static! {
    static ref ADDRESS_TOKEN: Regex = Regex::new(r"^[0-9]+$").unwrap();
    // Commas or line breaks, with any surrounding whitespace
    static ref ADDRESS_SEPARATOR: Regex = Regex::new(r"\s*[,\n]\s*").unwrap();
}

/// A configuration for a single simulation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationConfig {
    #[serde(default)]
    pub policy: CachePolicyConfig,
    #[serde(default)]
    pub algorithm: ReplacementAlgorithmConfig,
    pub lines: usize,
    pub words_per_block: u64,
    /// Either a JSON array of addresses or a comma separated string
    #[serde(deserialize_with = "deserialize_addresses")]
    pub addresses: Vec<u64>,
    /// Only used by the random replacement policy
    #[serde(default)]
    pub seed: u64,
}

/// How blocks are placed into lines - direct, set, or full. Set associative placement is accepted
/// by the parser but not simulated
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum CachePolicyConfig {
    #[serde(alias = "direct")]
    #[value(name = "direct")]
    DirectMapped,
    #[serde(alias = "set")]
    #[value(name = "set")]
    SetAssociative,
    #[serde(alias = "full")]
    #[value(name = "full")]
    FullyAssociative,
}

impl Default for CachePolicyConfig {
    fn default() -> Self {
        CachePolicyConfig::DirectMapped
    }
}

/// The replacement algorithm for associative caches - fifo, lru, lfu, or random. Defaults to fifo.
/// Ignored by direct mapped caches, which have no choice of line
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum ReplacementAlgorithmConfig {
    #[serde(alias = "fifo")]
    #[value(name = "fifo")]
    FirstInFirstOut,
    #[serde(alias = "lru")]
    #[value(name = "lru")]
    LeastRecentlyUsed,
    #[serde(alias = "lfu")]
    #[value(name = "lfu")]
    LeastFrequentlyUsed,
    #[serde(alias = "random")]
    #[value(name = "random")]
    Random,
}

impl Default for ReplacementAlgorithmConfig {
    fn default() -> Self {
        ReplacementAlgorithmConfig::FirstInFirstOut
    }
}

/// Everything that can be wrong with a configuration before a simulation starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    ZeroLines,
    ZeroWordsPerBlock,
    UnsupportedPolicy(CachePolicyConfig),
    /// A token in an address list which isn't a non-negative decimal integer. `position` is the
    /// 0-based index of the token in the list
    InvalidAddress { position: usize, token: String },
    /// The last word of the block holding this address can't be represented
    AddressOutOfRange(u64),
    /// More words than [`MAX_CACHE_WORDS`] across all lines
    CacheTooLarge { lines: usize, words_per_block: u64 },
    Parse(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ZeroLines => write!(f, "the cache needs at least one line"),
            ConfigError::ZeroWordsPerBlock => write!(f, "a block needs at least one word"),
            ConfigError::UnsupportedPolicy(policy) => {
                write!(f, "the {policy:?} placement policy isn't supported")
            }
            ConfigError::InvalidAddress { position, token } => {
                write!(f, "address {position} ({token:?}) isn't a non-negative integer")
            }
            ConfigError::AddressOutOfRange(address) => {
                write!(f, "the block holding address {address} extends past the address space")
            }
            ConfigError::CacheTooLarge { lines, words_per_block } => write!(
                f,
                "{lines} lines of {words_per_block} words is more than the {MAX_CACHE_WORDS} words a cache can hold"
            ),
            ConfigError::Parse(message) => write!(f, "couldn't parse the configuration: {message}"),
        }
    }
}

impl Error for ConfigError {}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            policy: CachePolicyConfig::default(),
            algorithm: ReplacementAlgorithmConfig::default(),
            lines: DEFAULT_LINES,
            words_per_block: DEFAULT_WORDS_PER_BLOCK,
            addresses: DEFAULT_ADDRESSES.to_vec(),
            seed: 0,
        }
    }
}

impl SimulationConfig {
    /// Reads a configuration from JSON and validates it
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self, ConfigError> {
        let config: SimulationConfig =
            serde_json::from_reader(reader).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the policy, sizes and addresses can be simulated
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.policy == CachePolicyConfig::SetAssociative {
            return Err(ConfigError::UnsupportedPolicy(self.policy));
        }
        if self.lines == 0 {
            return Err(ConfigError::ZeroLines);
        }
        if self.words_per_block == 0 {
            return Err(ConfigError::ZeroWordsPerBlock);
        }
        let words = (self.lines as u64).checked_mul(self.words_per_block);
        if !matches!(words, Some(words) if words <= MAX_CACHE_WORDS) {
            return Err(ConfigError::CacheTooLarge { lines: self.lines, words_per_block: self.words_per_block });
        }
        let last_offset = self.words_per_block - 1;
        if let Some(&address) = self.addresses.iter().find(|a| a.checked_add(last_offset).is_none()) {
            return Err(ConfigError::AddressOutOfRange(address));
        }
        Ok(())
    }
}

/// Parses a list of addresses separated by commas or line breaks
///
/// Whitespace around each address is ignored, and a blank input is an empty list. Empty tokens
/// (`"1,,2"`) and anything which isn't a plain decimal integer are rejected rather than guessed at
///
/// # Examples
///
/// ```
/// use cachelib::config::parse_addresses;
/// assert_eq!(parse_addresses("22, 23,24").unwrap(), vec![22, 23, 24]);
/// assert!(parse_addresses("22, x").is_err());
/// ```
pub fn parse_addresses(input: &str) -> Result<Vec<u64>, ConfigError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    ADDRESS_SEPARATOR
        .split(trimmed)
        .enumerate()
        .map(|(position, token)| {
            let invalid = || ConfigError::InvalidAddress { position, token: token.to_string() };
            if !ADDRESS_TOKEN.is_match(token) {
                return Err(invalid());
            }
            // Only fails on overflow once the pattern matched
            token.parse::<u64>().map_err(|_| invalid())
        })
        .collect()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AddressInput {
    Sequence(Vec<u64>),
    Delimited(String),
}

fn deserialize_addresses<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u64>, D::Error> {
    match AddressInput::deserialize(deserializer)? {
        AddressInput::Sequence(addresses) => Ok(addresses),
        AddressInput::Delimited(text) => parse_addresses(&text).map_err(serde::de::Error::custom),
    }
}
