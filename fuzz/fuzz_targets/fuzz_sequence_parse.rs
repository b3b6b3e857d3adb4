#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Parsers must reject bad input with an error, never panic
    if let Ok(seq) = dnaseek::sequence::parse_sequence_text(data) {
        assert!(dnaseek::sequence::validate_dna(&seq).is_ok());
    }
    let _ = dnaseek::sequence::parse_sequence_column(data, "sequence");
    let _ = dnaseek::sequence::validate_pattern(data, 1000);
});
