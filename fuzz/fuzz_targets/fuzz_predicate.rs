#![no_main]
use geoextract::Schema;
use geoextract::filter::Predicate;
use geoextract::value::Value;
use libfuzzer_sys::fuzz_target;

// Split input into a tab-separated row and a filter expression, compile the
// filter and evaluate it. Catches panics in the lexer, parser and evaluator:
// deep nesting, integer overflow, odd literal forms.
fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let (row_part, filter) = text.split_once('\n').unwrap_or(("", text));

    let schema = Schema::geonames();
    let Ok(predicate) = Predicate::compile(filter, &schema) else {
        return;
    };

    let mut row: Vec<Value> = row_part.split('\t').map(Value::infer).collect();
    row.resize(schema.len(), Value::Null);
    let _ = predicate.evaluate(&row);
});
