#![no_main]
use std::io::Read;

use geoextract::archive::for_each_entry;
use geoextract::error::Error;
use libfuzzer_sys::fuzz_target;

// Arbitrary bytes as a streamed archive. Corrupt headers and bad checksums
// must come back as errors, never as panics or runaway allocation.
fuzz_target!(|data: &[u8]| {
    let _ = for_each_entry(data, |_, reader| {
        let mut sink = Vec::new();
        reader
            .take(1 << 20)
            .read_to_end(&mut sink)
            .map_err(Error::from_read)?;
        Ok(())
    });
});
