#![no_main]
use libfuzzer_sys::fuzz_target;
use squeezl::huffman::{Decoder, Encoder};

fuzz_target!(|data: &[u8]| {
    let compressed = Encoder::new().encode(data).expect("Encoding a buffer never fails");
    let result = Decoder::new().decode(&compressed);
    assert_eq!(result.as_deref().ok(), Some(data), "{:?}", result.err());
});
