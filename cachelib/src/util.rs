use crate::config::{CachePolicyConfig, ReplacementAlgorithmConfig, SimulationConfig, DEFAULT_ADDRESSES};

/// A named configuration used by the tests and benchmarks
pub struct SampleCase {
    pub name: String,
    pub config: SimulationConfig,
}

/// Every supported policy and algorithm pairing
pub const SUPPORTED_POLICIES: [(CachePolicyConfig, ReplacementAlgorithmConfig); 5] = [
    (CachePolicyConfig::DirectMapped, ReplacementAlgorithmConfig::FirstInFirstOut),
    (CachePolicyConfig::FullyAssociative, ReplacementAlgorithmConfig::FirstInFirstOut),
    (CachePolicyConfig::FullyAssociative, ReplacementAlgorithmConfig::LeastRecentlyUsed),
    (CachePolicyConfig::FullyAssociative, ReplacementAlgorithmConfig::LeastFrequentlyUsed),
    (CachePolicyConfig::FullyAssociative, ReplacementAlgorithmConfig::Random),
];

/// Generates `count` addresses walking through memory in steps of `stride`, wrapping at `span`
///
/// Gives a trace with a predictable mix of hits and misses for larger runs
pub fn strided_addresses(count: usize, stride: u64, span: u64) -> Vec<u64> {
    (0..count as u64).map(|i| (i * stride) % span).collect()
}

/// The default exercise and a longer strided trace, for every supported policy
pub fn sample_cases() -> Vec<SampleCase> {
    let traces = [
        ("exercise", 4, 16, DEFAULT_ADDRESSES.to_vec()),
        ("strided", 64, 8, strided_addresses(10_000, 12, 4_096)),
    ];
    let mut out = Vec::new();
    for (trace, lines, words_per_block, addresses) in traces {
        for (policy, algorithm) in SUPPORTED_POLICIES {
            out.push(SampleCase {
                name: format!("{trace}-{policy:?}-{algorithm:?}"),
                config: SimulationConfig {
                    policy,
                    algorithm,
                    lines,
                    words_per_block,
                    addresses: addresses.clone(),
                    seed: 0,
                },
            })
        }
    }
    out
}
