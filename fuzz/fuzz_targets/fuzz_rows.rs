#![no_main]
use geoextract::input::{Row, RowReader};
use geoextract::output::encode_line;
use libfuzzer_sys::fuzz_target;

// Arbitrary bytes as a tab-delimited entry: every line either parses into a
// row of the right width or fails cleanly, and every parsed row serializes.
fuzz_target!(|data: &[u8]| {
    let width = 1 + data.first().map_or(0, |b| (b % 19) as usize);
    let mut reader = RowReader::new(data, "fuzz.txt", width);
    let mut row = Row::new();
    while let Ok(true) = reader.next_row(&mut row) {
        assert_eq!(row.len(), width);
        let line = encode_line(&row).expect("in-memory encode cannot fail");
        assert!(line.ends_with('\n'));
    }
});
