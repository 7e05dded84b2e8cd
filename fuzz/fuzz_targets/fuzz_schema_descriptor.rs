//! Fuzz target for user-defined schema descriptors.
//!
//! Goal: any descriptor JSON either fails to deserialize or parses any text **without
//! panicking**.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_schema_descriptor
//! ```

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct DescriptorInput {
    /// Descriptor as JSON (e.g. `{"vendor": "x", "style": {"kind": "braces"}}`).
    descriptor: String,
    text: String,
}

fuzz_target!(|input: DescriptorInput| {
    if input.descriptor.len() > 4096 || input.text.len() > 16 * 1024 {
        return;
    }
    // Errors are fine; panics are not.
    let _ = netguard_parser::fuzz::parse_with_descriptor(&input.descriptor, &input.text);
});
