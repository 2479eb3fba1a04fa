#![no_main]
use libfuzzer_sys::fuzz_target;
use squeezl::lzw::{Configuration, Decoder, Encoder};

fuzz_target!(|input: (u8, &[u8])| {
    let (nb, data) = input;
    // Small widths fill the dictionary early, which is the interesting part.
    let nb = 8 + nb % 9;
    let config = match Configuration::new(nb, 256) {
        Ok(config) => config,
        Err(_) => return,
    };

    let mut encoder = Encoder::new(config);
    let compressed = encoder.encode(data).expect("Encoding a byte stream never fails");
    assert!(encoder.dictionary_len() <= config.max_code() + 1);

    let mut decoder = Decoder::new(config);
    let result = decoder.decode(&compressed);
    assert_eq!(result.as_deref().ok(), Some(data), "{:?}", result.err());
});
