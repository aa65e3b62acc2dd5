//! # CacheLib
//!
//! Cachelib simulates how a single cache places and replaces blocks
//!
//! It provides a cache implementation which can be parameterised by a replacement policy, and a
//! simulator which replays a list of word addresses, reporting the block, label and line of every
//! access along with whether it hit
//!
//! Placement is direct mapped or fully associative; fully associative caches replace lines with
//! FIFO, LRU, LFU, or seeded random replacement

/// Contains the implementation of the cache, and a utility enum for the existing cache types
pub mod cache;

/// Contains definitions for the JSON input format and address list parsing
pub mod config;

/// Contains helpers for reading address files
pub mod io;

/// Contains the provided replacement policies, with a trait for implementing custom replacement
/// policies
pub mod replacement_policies;

/// Contains the simulator used to replay an address sequence with a given cache configuration
pub mod simulator;

#[cfg(test)]
mod test;

/// Contains utilities for running tests and benchmarks.
pub mod util;
