use std::error::Error;
use pretty_assertions::assert_eq;
use rstest::rstest;
use crate::cache::CacheContents;
use crate::config::{CachePolicyConfig, ReplacementAlgorithmConfig, SimulationConfig};
use crate::simulator::{AccessResult, BlockRange, RunSummary, Simulator};
use crate::util::{sample_cases, SUPPORTED_POLICIES};

fn config(
    policy: CachePolicyConfig,
    algorithm: ReplacementAlgorithmConfig,
    lines: usize,
    words_per_block: u64,
    addresses: &[u64],
) -> SimulationConfig {
    SimulationConfig {
        policy,
        algorithm,
        lines,
        words_per_block,
        addresses: addresses.to_vec(),
        seed: 0,
    }
}

fn simulate(config: &SimulationConfig) -> RunSummary {
    Simulator::new(config).unwrap().run()
}

fn hits(summary: &RunSummary) -> Vec<bool> {
    summary.results.iter().map(|r| r.hit).collect()
}

fn lines(summary: &RunSummary) -> Vec<usize> {
    summary.results.iter().map(|r| r.line).collect()
}

#[test]
fn seeded_contents_hold_one_block_per_line() {
    let contents = CacheContents::seeded(3, 4);
    assert_eq!(contents.lines(), &[vec![0, 1, 2, 3], vec![4, 5, 6, 7], vec![8, 9, 10, 11]]);
    assert_eq!(contents.bounds(2), (8, 11));
    assert_eq!(contents.resident_block(1), 1);
}

#[test]
fn direct_mapped_opening_accesses_hit_seeded_lines() {
    let summary = simulate(&config(
        CachePolicyConfig::DirectMapped,
        ReplacementAlgorithmConfig::FirstInFirstOut,
        4,
        16,
        &[22, 23, 24, 22, 12, 53],
    ));
    assert_eq!(summary.miss_count, 0);
    assert_eq!(
        summary.results[0],
        AccessResult {
            address: 22,
            block: 1,
            line: 1,
            label: 0,
            hit: true,
            block_addresses: BlockRange { range_min: 16, range_max: 31 },
            evicted_block: None,
        }
    );
    let last = &summary.results[5];
    assert_eq!((last.block, last.line, last.label, last.hit), (3, 3, 0, true));
    assert_eq!(summary.results[4].block_addresses, BlockRange { range_min: 0, range_max: 15 });
}

#[test]
fn direct_mapped_default_exercise() {
    let summary = simulate(&SimulationConfig::default());
    assert_eq!(summary.miss_count, 7);
    assert_eq!(
        hits(&summary),
        vec![
            true, true, true, true, true, true, true, true, false, true,
            true, false, true, false, true, false, false, true, false, false,
        ]
    );
    assert_eq!(lines(&summary), vec![1, 1, 1, 1, 0, 3, 1, 0, 0, 2, 2, 1, 1, 3, 2, 1, 1, 3, 1, 1]);
    // 73 lands on line 0 as block 4, the second block to map there
    let result = &summary.results[8];
    assert_eq!((result.block, result.label, result.evicted_block), (4, 1, Some(0)));
    let expected: Vec<Vec<u64>> = [64u64, 80, 32, 112].iter().map(|&first| (first..first + 16).collect()).collect();
    assert_eq!(summary.final_snapshot.lines(), expected.as_slice());
}

#[test]
fn lru_keeps_recently_used_line() {
    let summary = simulate(&config(
        CachePolicyConfig::FullyAssociative,
        ReplacementAlgorithmConfig::LeastRecentlyUsed,
        2,
        4,
        &[0, 4, 0, 8, 0],
    ));
    assert_eq!(hits(&summary), vec![true, true, true, false, true]);
    assert_eq!(lines(&summary), vec![0, 1, 0, 1, 0]);
    assert_eq!(summary.results[3].evicted_block, Some(1));
    assert_eq!(summary.miss_count, 1);
    assert_eq!(summary.final_snapshot.lines(), &[vec![0, 1, 2, 3], vec![8, 9, 10, 11]]);
}

#[test]
fn fifo_ignores_reads_when_replacing() {
    let summary = simulate(&config(
        CachePolicyConfig::FullyAssociative,
        ReplacementAlgorithmConfig::FirstInFirstOut,
        2,
        4,
        &[0, 4, 0, 8, 0],
    ));
    assert_eq!(hits(&summary), vec![true, true, true, false, false]);
    assert_eq!(lines(&summary), vec![0, 1, 0, 0, 1]);
    assert_eq!(summary.results[3].evicted_block, Some(0));
    assert_eq!(summary.results[4].evicted_block, Some(1));
    assert_eq!(summary.final_snapshot.lines(), &[vec![8, 9, 10, 11], vec![0, 1, 2, 3]]);
}

#[test]
fn lfu_replaces_least_read_line() {
    let summary = simulate(&config(
        CachePolicyConfig::FullyAssociative,
        ReplacementAlgorithmConfig::LeastFrequentlyUsed,
        2,
        4,
        &[0, 0, 4, 8, 4, 12],
    ));
    assert_eq!(hits(&summary), vec![true, true, true, false, false, false]);
    assert_eq!(lines(&summary), vec![0, 0, 1, 1, 1, 1]);
    assert_eq!(summary.miss_count, 3);
}

#[test]
fn fully_associative_labels_use_line_count() {
    let summary = simulate(&config(
        CachePolicyConfig::FullyAssociative,
        ReplacementAlgorithmConfig::LeastRecentlyUsed,
        4,
        2,
        &[17],
    ));
    let result = &summary.results[0];
    assert_eq!((result.block, result.label), (8, 2));
    assert_eq!(result.block_addresses, BlockRange { range_min: 16, range_max: 17 });
}

#[test]
fn random_is_reproducible_for_a_seed() {
    let mut random = config(
        CachePolicyConfig::FullyAssociative,
        ReplacementAlgorithmConfig::Random,
        4,
        4,
        &[40, 80, 120, 160, 40, 200, 80, 0, 4, 8, 12, 240],
    );
    random.seed = 17;
    let first = simulate(&random);
    assert_eq!(first, simulate(&random));
    assert!(first.results.iter().all(|r| r.line < 4));
}

#[rstest]
#[case(&[0, 5, 3, 9, 0, 2])]
#[case(&[7, 7, 100, 1, 100, 3])]
#[case(&[])]
fn single_line_caches_agree(#[case] addresses: &[u64]) {
    let summaries: Vec<RunSummary> = SUPPORTED_POLICIES
        .iter()
        .map(|(policy, algorithm)| simulate(&config(*policy, *algorithm, 1, 4, addresses)))
        .collect();
    for summary in &summaries[1..] {
        assert_eq!(summary, &summaries[0]);
    }
    assert!(summaries[0].results.iter().all(|r| r.line == 0));
}

#[test]
fn empty_address_list() {
    let summary = simulate(&config(
        CachePolicyConfig::FullyAssociative,
        ReplacementAlgorithmConfig::LeastRecentlyUsed,
        3,
        2,
        &[],
    ));
    assert!(summary.results.is_empty());
    assert_eq!(summary.miss_count, 0);
    assert_eq!(summary.initial_snapshot, summary.final_snapshot);
}

#[test]
fn summary_serialises_for_the_table() -> Result<(), Box<dyn Error>> {
    let summary = simulate(&config(
        CachePolicyConfig::DirectMapped,
        ReplacementAlgorithmConfig::FirstInFirstOut,
        2,
        2,
        &[1, 9],
    ));
    let json = serde_json::to_value(&summary)?;
    assert_eq!(json["miss_count"], 1);
    assert_eq!(json["initial_snapshot"], serde_json::json!([[0, 1], [2, 3]]));
    assert_eq!(json["final_snapshot"], serde_json::json!([[8, 9], [2, 3]]));
    assert!(json["results"][0].get("evicted_block").is_none());
    assert_eq!(json["results"][1]["evicted_block"], 0);
    assert_eq!(json["results"][1]["block_addresses"]["range_max"], 9);
    let parsed: RunSummary = serde_json::from_value(json)?;
    assert_eq!(parsed, summary);
    Ok(())
}

#[test]
fn run_all_samples() {
    for case in sample_cases() {
        let summary = simulate(&case.config);
        assert_eq!(summary.results.len(), case.config.addresses.len(), "{}", case.name);
        assert_eq!(summary.hit_count() + summary.miss_count, case.config.addresses.len() as u64);
    }
}
