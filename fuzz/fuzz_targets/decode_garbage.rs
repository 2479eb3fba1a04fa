#![no_main]
use libfuzzer_sys::fuzz_target;
use squeezl::{huffman, lzw};
use std::io;

const CUT_OFF: usize = 1 << 20;

/// A sink that fails once it has seen `CUT_OFF` bytes.
///
/// A header may announce up to `u64::MAX` repetitions of a single symbol.
struct Limited(usize);

impl io::Write for Limited {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.0 + buf.len() > CUT_OFF {
            return Err(io::ErrorKind::WriteZero.into());
        }
        self.0 += buf.len();
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fuzz_target!(|raw_data: &[u8]| {
    // Errors are fine, panics are not.
    let _ = huffman::Decoder::with_output_limit(CUT_OFF as u64)
        .into_stream(Limited(0))
        .decode_all(raw_data);

    for &nb in &[9, 12, 16] {
        if let Ok(config) = lzw::Configuration::new(nb, 256) {
            let _ = lzw::Decoder::new(config)
                .into_stream(Limited(0))
                .decode_all(raw_data);
        }
    }
});
