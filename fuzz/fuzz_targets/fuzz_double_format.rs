#![no_main]
use geoextract::output::format_double;
use libfuzzer_sys::fuzz_target;

// Every finite f64 must format to text that parses back to the same bits
// (with -0 normalized to 0).
fuzz_target!(|data: &[u8]| {
    let Some(bytes) = data.get(..8) else {
        return;
    };
    let f = f64::from_le_bytes(bytes.try_into().unwrap());
    if !f.is_finite() {
        return;
    }

    let mut out = String::new();
    format_double(f, &mut out);

    let parsed: f64 = out
        .parse()
        .unwrap_or_else(|e| panic!("output {out:?} for f64 {f} is not a valid number: {e}"));
    let expected = if f == 0.0 { 0.0f64 } else { f };
    assert_eq!(
        parsed.to_bits(),
        expected.to_bits(),
        "round-trip failed: f={f}, output={out:?}"
    );
});
