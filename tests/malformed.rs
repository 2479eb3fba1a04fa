use squeezl::huffman::{CodeTable, Frequencies};
use squeezl::{huffman, lzw, CodecError};
use std::io;

/// Assemble a Huffman stream from `(symbol, len, code bytes)` entries.
fn header(entries: &[(u8, u8, &[u8])], total: u64) -> Vec<u8> {
    let mut data = (entries.len() as u16).to_be_bytes().to_vec();
    for &(symbol, len, code) in entries {
        data.push(symbol);
        data.push(len);
        data.extend_from_slice(code);
    }
    data.extend_from_slice(&total.to_be_bytes());
    data
}

fn huffman_decode(data: &[u8]) -> Result<Vec<u8>, CodecError> {
    huffman::Decoder::new().decode(data)
}

fn assert_malformed(data: &[u8], what: &str) {
    match huffman_decode(data) {
        Err(CodecError::MalformedHeader(_)) => {}
        other => panic!("{}: expected a malformed header, got {:?}", what, other),
    }
}

#[test]
fn huffman_truncated_headers() {
    assert_malformed(&[], "empty input");
    assert_malformed(&[0], "half a count");

    let full = header(&[(b'a', 1, &[0]), (b'b', 1, &[1])], 2);
    for cut in 0..full.len() {
        assert_malformed(&full[..cut], "cut header");
    }
}

#[test]
fn huffman_inconsistent_headers() {
    assert_malformed(&[0x01, 0x01], "more entries than symbols");
    assert_malformed(&header(&[(b'a', 129, &[0; 17])], 1), "code word too long");
    assert_malformed(
        &header(&[(b'a', 1, &[0b10]), (b'b', 1, &[1])], 2),
        "code word wider than its length",
    );
    assert_malformed(
        &header(&[(b'a', 1, &[0]), (b'a', 1, &[1])], 2),
        "duplicate symbol",
    );
    assert_malformed(
        &header(&[(b'a', 1, &[0]), (b'b', 1, &[0])], 2),
        "duplicate code word",
    );
    assert_malformed(&header(&[(b'a', 1, &[0]), (b'b', 1, &[1])], 0), "no symbols");
    assert_malformed(&header(&[], 3), "no table");
    assert_malformed(&header(&[(b'a', 1, &[0])], 3), "single code word");
    assert_malformed(
        &header(&[(b'a', 0, &[]), (b'b', 1, &[1])], 2),
        "empty code word",
    );
}

#[test]
fn huffman_valid_edge_headers() {
    assert_eq!(huffman_decode(&header(&[], 0)).unwrap(), b"");
    assert_eq!(huffman_decode(&header(&[(b'x', 0, &[])], 3)).unwrap(), b"xxx");

    let mut data = header(&[(b'a', 1, &[0]), (b'b', 1, &[1])], 4);
    data.push(0b0110_0000);
    assert_eq!(huffman_decode(&data).unwrap(), b"abba");
}

#[test]
fn huffman_unmatched_code_word() {
    // "11" is not part of the table.
    let mut data = header(&[(b'a', 1, &[0]), (b'b', 2, &[0b10])], 2);
    data.push(0b0110_0000);
    match huffman_decode(&data) {
        Err(CodecError::InvalidCode(0b11)) => {}
        other => panic!("expected an invalid code, got {:?}", other),
    }
}

#[test]
fn huffman_missing_payload() {
    let mut data = header(&[(b'a', 1, &[0]), (b'b', 1, &[1])], 9);
    data.push(0);
    match huffman_decode(&data) {
        Err(CodecError::IncompleteStream) => {}
        other => panic!("expected an incomplete stream, got {:?}", other),
    }
}

#[test]
fn huffman_empty_frequencies() {
    match CodeTable::from_frequencies(&Frequencies::new()) {
        Err(CodecError::Configuration(_)) => {}
        other => panic!("expected a configuration error, got {:?}", other),
    }
}

#[test]
fn lzw_invalid_codes() {
    let config = lzw::Configuration::new(12, 16).unwrap();
    let mut decoder = lzw::Decoder::new(config);

    // A first code must be a seed.
    match decoder.decode(&[0, 16]) {
        Err(CodecError::InvalidCode(16)) => {}
        other => panic!("expected an invalid code, got {:?}", other),
    }

    // Seeds 1 and 2 define code 16, so 17 may come next but 18 may not.
    match decoder.decode(&[0, 1, 0, 2, 0, 18]) {
        Err(CodecError::InvalidCode(18)) => {}
        other => panic!("expected an invalid code, got {:?}", other),
    }

    // Codes that no 12 bit encoder emits.
    match decoder.decode(&[0, 1, 0xff, 0xff]) {
        Err(CodecError::InvalidCode(0xffff)) => {}
        other => panic!("expected an invalid code, got {:?}", other),
    }

    assert_eq!(decoder.decode(&[0, 1, 0, 2, 0, 16]).unwrap(), [1u8, 2, 1, 2]);
}

#[test]
fn lzw_output_stops_at_corruption() {
    let config = lzw::Configuration::default();
    let mut output = vec![];
    let result = lzw::Decoder::new(config)
        .into_stream(&mut output)
        .decode_all(&[0, b'o', 0, b'k', 0x10, 0][..]);
    assert!(matches!(result.status, Err(CodecError::InvalidCode(0x1000))));
    assert_eq!(output, b"ok");
}

#[test]
fn lzw_truncated_stream() {
    let config = lzw::Configuration::new(24, 256).unwrap();
    let compressed = lzw::Encoder::new(config).encode(b"truncated").unwrap();
    for cut in 1..config.bytes_per_code() {
        let data = &compressed[..compressed.len() - cut];
        match lzw::Decoder::new(config).decode(data) {
            Err(CodecError::IncompleteStream) => {}
            other => panic!("expected an incomplete stream, got {:?}", other),
        }
    }
}

#[test]
fn lzw_symbol_outside_alphabet() {
    let config = lzw::Configuration::new(12, 16).unwrap();
    let mut encoder = lzw::Encoder::new(config);
    match encoder.encode(&[1, 2, 3, 200, 4]) {
        Err(CodecError::InvalidSymbol(200)) => {}
        other => panic!("expected an invalid symbol, got {:?}", other),
    }

    // The encoder recovers once reset for a new stream.
    assert!(encoder.encode(&[1, 2, 3, 15, 4]).is_ok());
}

#[test]
fn lzw_invalid_configurations() {
    for &(nb, n) in &[(0u8, 256u16), (33, 256), (12, 0), (12, 300), (3, 16)] {
        match lzw::Configuration::new(nb, n) {
            Err(CodecError::Configuration(_)) => {}
            other => panic!("nb={} n={}: got {:?}", nb, n, other),
        }
    }
}

#[test]
fn errors_as_io_errors() {
    let err = io::Error::from(CodecError::IncompleteStream);
    assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);

    let err = io::Error::from(CodecError::InvalidSymbol(200));
    assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    assert!(err.to_string().contains("200"));

    let err = io::Error::from(CodecError::Io(io::ErrorKind::BrokenPipe.into()));
    assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
}
