#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    sequence: Vec<u8>,
    pattern: Vec<u8>,
    allow_overlapping: bool,
    window: u8,
}

fuzz_target!(|input: Input| {
    // Fold bytes into a two-letter alphabet so partial matches are common
    let sequence: Vec<u8> = input.sequence.iter().map(|b| b'A' + (b & 1)).collect();
    let pattern: Vec<u8> = input.pattern.iter().take(16).map(|b| b'A' + (b & 1)).collect();

    let kmp = dnaseek::search::find_positions(&sequence, &pattern, input.allow_overlapping);
    let naive = dnaseek::search::find_positions_naive(&sequence, &pattern, input.allow_overlapping);
    assert_eq!(kmp, naive);

    // Context windows must never slice out of bounds
    let matches = dnaseek::search::enrich_matches(&sequence, pattern.len(), input.window as usize, &kmp);
    assert_eq!(matches.len(), kmp.len());
});
