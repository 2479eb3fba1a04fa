//! Frequency counting, code construction and the table header.
use std::collections::HashMap;
use std::io::{self, Read, Write};

use crate::heap::MinHeap;
use crate::CodecError;

/// Maximum length of a code word.
///
/// Any tree built from `u64` weights is far shallower than this; the bound exists so that a header
/// can be rejected before it is used.
pub const MAX_CODEWORD_LEN: u8 = 128;

const ALPHABET: usize = 256;

/// Occurrence counts for every byte value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frequencies {
    counts: [u64; ALPHABET],
}

/// A single code word, stored right aligned in `bits`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Codeword {
    bits: u128,
    len: u8,
}

/// A prefix-free mapping from bytes to code words.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodeTable {
    /// Entries in ascending symbol order.
    entries: Vec<(u8, Codeword)>,
    lookup: [Option<Codeword>; ALPHABET],
}

/// One node of the transient merge tree.
#[derive(Clone, Copy, Debug)]
enum Node {
    Leaf { symbol: u8, weight: u64 },
    Internal { weight: u64, left: usize, right: usize },
}

/// A queue entry: compared by weight, then by the order of insertion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct Pending {
    weight: u64,
    sequence: u32,
    node: usize,
}

impl Frequencies {
    pub fn new() -> Self {
        Frequencies {
            counts: [0; ALPHABET],
        }
    }

    /// Count all bytes of `data`.
    pub fn add(&mut self, data: &[u8]) {
        for &byte in data {
            self.counts[usize::from(byte)] += 1;
        }
    }

    /// Set the count of a single symbol.
    pub fn set(&mut self, symbol: u8, count: u64) {
        self.counts[usize::from(symbol)] = count;
    }

    pub fn get(&self, symbol: u8) -> u64 {
        self.counts[usize::from(symbol)]
    }

    /// The sum of all counts, `None` if it does not fit a `u64`.
    pub fn total(&self) -> Option<u64> {
        self.counts
            .iter()
            .try_fold(0u64, |sum, &count| sum.checked_add(count))
    }

    /// The number of symbols with a non-zero count.
    pub fn distinct(&self) -> usize {
        self.counts.iter().filter(|&&c| c > 0).count()
    }

    /// Symbols with a non-zero count in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        (0..=u8::MAX)
            .zip(self.counts.iter().copied())
            .filter(|&(_, count)| count > 0)
    }
}

impl Default for Frequencies {
    fn default() -> Self {
        Frequencies::new()
    }
}

impl<'a> From<&'a [u8]> for Frequencies {
    fn from(data: &'a [u8]) -> Self {
        let mut freq = Frequencies::new();
        freq.add(data);
        freq
    }
}

impl Codeword {
    /// Construct a code word from its `len` low bits.
    ///
    /// Returns `None` if `len` is too long or `bits` has bits set above `len`.
    pub fn new(bits: u128, len: u8) -> Option<Self> {
        if len > MAX_CODEWORD_LEN {
            return None;
        }
        if len < 128 && bits >> len != 0 {
            return None;
        }
        Some(Codeword { bits, len })
    }

    pub fn bits(&self) -> u128 {
        self.bits
    }

    pub fn len(&self) -> u8 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Append one bit at the least significant end.
    pub(crate) fn push(&mut self, bit: bool) {
        self.bits = self.bits << 1 | u128::from(bit);
        self.len += 1;
    }

    /// Test if `self` is a prefix of `other`, including equality.
    pub fn is_prefix_of(&self, other: &Codeword) -> bool {
        self.len <= other.len && (self.len == 0 || other.bits >> (other.len - self.len) == self.bits)
    }
}

impl core::fmt::Display for Codeword {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        for i in (0..self.len).rev() {
            let bit = if self.bits >> i & 1 == 1 { '1' } else { '0' };
            core::fmt::Write::write_char(f, bit)?;
        }
        Ok(())
    }
}

impl CodeTable {
    /// Build the Huffman code for the given counts.
    ///
    /// Seeds enter the queue in ascending symbol order and merged nodes are appended after them,
    /// so among equal weights the earlier inserted node is extracted first. The first of each
    /// extracted pair becomes the `0` branch.
    ///
    /// A single distinct symbol gets the empty code word. The counts must sum to at most
    /// `u64::MAX`.
    pub fn from_frequencies(freq: &Frequencies) -> Result<Self, CodecError> {
        let distinct = freq.distinct();
        if distinct == 0 {
            return Err(CodecError::Configuration(
                "no symbols to build a code from",
            ));
        }
        let total = freq.total().ok_or_else(counts_overflow)?;

        let mut arena = Vec::with_capacity(2 * distinct - 1);
        let mut queue = MinHeap::with_capacity(distinct);
        let mut sequence = 0u32;
        for (symbol, weight) in freq.iter() {
            arena.push(Node::Leaf { symbol, weight });
            queue.insert(Pending {
                weight,
                sequence,
                node: arena.len() - 1,
            });
            sequence += 1;
        }
        debug_assert_eq!(queue.len(), distinct);

        let root = loop {
            match (queue.extract_min(), queue.extract_min()) {
                (Some(x), Some(y)) => {
                    let weight = x.weight.checked_add(y.weight).ok_or_else(counts_overflow)?;
                    arena.push(Node::Internal {
                        weight,
                        left: x.node,
                        right: y.node,
                    });
                    queue.insert(Pending {
                        weight,
                        sequence,
                        node: arena.len() - 1,
                    });
                    sequence += 1;
                }
                (Some(root), None) => {
                    debug_assert!(queue.is_empty());
                    break root.node;
                }
                (None, _) => {
                    return Err(CodecError::Configuration(
                        "no symbols to build a code from",
                    ))
                }
            }
        };

        let mut entries = Vec::with_capacity(distinct);
        let mut stack = vec![(root, Codeword::default())];
        while let Some((index, code)) = stack.pop() {
            match arena[index] {
                Node::Leaf { symbol, .. } => entries.push((symbol, code)),
                Node::Internal { left, right, .. } => {
                    let (mut zero, mut one) = (code, code);
                    zero.push(false);
                    one.push(true);
                    stack.push((right, one));
                    stack.push((left, zero));
                }
            }
        }

        let table = CodeTable::from_entries(entries);
        tracing::debug!(
            symbols = distinct,
            total,
            longest = table.max_len(),
            weight = arena[root].weight(),
            "built huffman code table"
        );
        Ok(table)
    }

    fn from_entries(mut entries: Vec<(u8, Codeword)>) -> Self {
        entries.sort_unstable_by_key(|&(symbol, _)| symbol);
        let mut lookup = [None; ALPHABET];
        for &(symbol, code) in &entries {
            lookup[usize::from(symbol)] = Some(code);
        }
        CodeTable { entries, lookup }
    }

    /// The code word of `symbol`, if it occurs in the table.
    pub fn get(&self, symbol: u8) -> Option<Codeword> {
        self.lookup[usize::from(symbol)]
    }

    /// All entries in ascending symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, Codeword)> + '_ {
        self.entries.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The length of the longest code word.
    pub fn max_len(&self) -> u8 {
        self.entries.iter().map(|(_, code)| code.len).max().unwrap_or(0)
    }

    /// Number of payload bits needed to encode data with these counts.
    pub fn encoded_bits(&self, freq: &Frequencies) -> u128 {
        self.iter()
            .map(|(symbol, code)| u128::from(freq.get(symbol)) * u128::from(code.len))
            .sum()
    }

    /// The single symbol of a one-entry table.
    ///
    /// Such a table carries the empty code word and its payload has no bits at all.
    pub(crate) fn single_symbol(&self) -> Option<u8> {
        match self.entries.as_slice() {
            [(symbol, _)] => Some(*symbol),
            _ => None,
        }
    }

    /// Map from code word to symbol for decoding.
    pub(crate) fn inverse(&self) -> HashMap<Codeword, u8> {
        self.iter().map(|(symbol, code)| (code, symbol)).collect()
    }
}

impl Node {
    fn weight(&self) -> u64 {
        match *self {
            Node::Leaf { weight, .. } | Node::Internal { weight, .. } => weight,
        }
    }
}

pub(crate) fn counts_overflow() -> CodecError {
    CodecError::Configuration("symbol counts overflow u64")
}

/// Write the code table and the symbol count.
///
/// Returns the number of bytes written.
pub(crate) fn write_header<W: Write>(
    writer: &mut W,
    table: Option<&CodeTable>,
    total: u64,
) -> io::Result<usize> {
    let mut header = Vec::with_capacity(2 + 4 * table.map_or(0, CodeTable::len) + 8);
    let entries = table.map_or(0, CodeTable::len) as u16;
    header.extend_from_slice(&entries.to_be_bytes());
    for (symbol, code) in table.into_iter().flat_map(|table| table.iter()) {
        header.push(symbol);
        header.push(code.len);
        let width = usize::from((code.len + 7) / 8);
        header.extend_from_slice(&code.bits.to_be_bytes()[16 - width..]);
    }
    header.extend_from_slice(&total.to_be_bytes());
    writer.write_all(&header)?;
    Ok(header.len())
}

/// Read a header written by [`write_header`].
///
/// Returns the table, the number of encoded symbols and the number of bytes read. The table is
/// `None` exactly for an empty stream.
pub(crate) fn read_header<R: Read>(
    reader: &mut R,
) -> Result<(Option<CodeTable>, u64, usize), CodecError> {
    let mut consumed = 0;
    let mut read_exact = |buf: &mut [u8]| -> Result<(), CodecError> {
        match reader.read_exact(buf) {
            Ok(()) => {
                consumed += buf.len();
                Ok(())
            }
            Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => {
                Err(CodecError::MalformedHeader("truncated header"))
            }
            Err(err) => Err(CodecError::Io(err)),
        }
    };

    let mut count = [0u8; 2];
    read_exact(&mut count)?;
    let count = usize::from(u16::from_be_bytes(count));
    if count > ALPHABET {
        return Err(CodecError::MalformedHeader("more table entries than symbols"));
    }

    let mut entries = Vec::with_capacity(count);
    let mut seen = [false; ALPHABET];
    for _ in 0..count {
        let mut pair = [0u8; 2];
        read_exact(&mut pair)?;
        let [symbol, len] = pair;
        if len > MAX_CODEWORD_LEN {
            return Err(CodecError::MalformedHeader("code word too long"));
        }

        let width = usize::from((len + 7) / 8);
        let mut bits = [0u8; 16];
        read_exact(&mut bits[16 - width..])?;
        let code = Codeword::new(u128::from_be_bytes(bits), len)
            .ok_or(CodecError::MalformedHeader("code word wider than its length"))?;

        if core::mem::replace(&mut seen[usize::from(symbol)], true) {
            return Err(CodecError::MalformedHeader("duplicate symbol"));
        }
        entries.push((symbol, code));
    }

    let mut total = [0u8; 8];
    read_exact(&mut total)?;
    let total = u64::from_be_bytes(total);

    if entries.is_empty() {
        if total != 0 {
            return Err(CodecError::MalformedHeader("symbols without a code table"));
        }
        return Ok((None, 0, consumed));
    }

    if total == 0 {
        return Err(CodecError::MalformedHeader("code table without symbols"));
    }

    match entries.as_slice() {
        [(_, code)] if !code.is_empty() => {
            return Err(CodecError::MalformedHeader("single symbol with a code word"));
        }
        [_, _, ..] if entries.iter().any(|(_, code)| code.is_empty()) => {
            return Err(CodecError::MalformedHeader("empty code word"));
        }
        _ => {}
    }

    let table = CodeTable::from_entries(entries);
    if table.inverse().len() != table.len() {
        return Err(CodecError::MalformedHeader("duplicate code word"));
    }

    tracing::trace!(entries = table.len(), total, "read huffman header");
    Ok((Some(table), total, consumed))
}

#[cfg(test)]
mod tests {
    use super::{read_header, write_header, CodeTable, Codeword, Frequencies};
    use crate::CodecError;

    fn code(table: &CodeTable, symbol: u8) -> String {
        table.get(symbol).unwrap().to_string()
    }

    fn assert_prefix_free(table: &CodeTable) {
        for (a, ca) in table.iter() {
            for (b, cb) in table.iter() {
                if a != b {
                    assert!(!ca.is_prefix_of(&cb), "{} ({}) prefixes {} ({})", a, ca, b, cb);
                }
            }
        }
    }

    #[test]
    fn three_symbols() {
        let freq = Frequencies::from(&b"aaabbc"[..]);
        let table = CodeTable::from_frequencies(&freq).unwrap();
        assert_eq!(code(&table, b'a'), "0");
        assert_eq!(code(&table, b'b'), "11");
        assert_eq!(code(&table, b'c'), "10");
        assert_eq!(table.encoded_bits(&freq), 9);
        assert_prefix_free(&table);
    }

    #[test]
    fn single_symbol_gets_empty_code() {
        let freq = Frequencies::from(&b"aaaa"[..]);
        let table = CodeTable::from_frequencies(&freq).unwrap();
        assert_eq!(table.len(), 1);
        assert!(table.get(b'a').unwrap().is_empty());
        assert_eq!(table.single_symbol(), Some(b'a'));
    }

    #[test]
    fn empty_frequencies_rejected() {
        let result = CodeTable::from_frequencies(&Frequencies::new());
        assert!(matches!(result, Err(CodecError::Configuration(_))));
    }

    #[test]
    fn overflowing_counts_rejected() {
        let mut freq = Frequencies::new();
        freq.set(0, u64::MAX);
        freq.set(1, 1);
        assert_eq!(freq.total(), None);
        let result = CodeTable::from_frequencies(&freq);
        assert!(matches!(result, Err(CodecError::Configuration(_))));

        // Exactly u64::MAX still builds.
        freq.set(0, u64::MAX - 1);
        assert_eq!(freq.total(), Some(u64::MAX));
        let table = CodeTable::from_frequencies(&freq).unwrap();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn prefix_free_for_many_distributions() {
        let mut seed = 0x1234_5678_9abc_def1u64;
        for round in 0..200 {
            let mut freq = Frequencies::new();
            let symbols = 2 + round % 255;
            for symbol in 0..symbols {
                seed ^= seed << 13;
                seed ^= seed >> 7;
                seed ^= seed << 17;
                freq.set(symbol as u8, 1 + seed % 10_000);
            }
            let table = CodeTable::from_frequencies(&freq).unwrap();
            assert_eq!(table.len(), freq.distinct());
            assert_prefix_free(&table);
        }
    }

    #[test]
    fn skewed_weights_build_deep_codes() {
        let mut freq = Frequencies::new();
        let (mut a, mut b) = (1u64, 1u64);
        for symbol in 0..80u8 {
            freq.set(symbol, a);
            let next = a + b;
            a = b;
            b = next;
        }
        let table = CodeTable::from_frequencies(&freq).unwrap();
        assert_eq!(table.max_len(), 79);
        assert_prefix_free(&table);
    }

    #[test]
    fn equal_weights_form_balanced_code() {
        let mut freq = Frequencies::new();
        for symbol in 0..4u8 {
            freq.set(symbol, 5);
        }
        let table = CodeTable::from_frequencies(&freq).unwrap();
        assert_eq!(code(&table, 0), "00");
        assert_eq!(code(&table, 1), "01");
        assert_eq!(code(&table, 2), "10");
        assert_eq!(code(&table, 3), "11");
    }

    #[test]
    fn header_roundtrip() {
        let freq = Frequencies::from(&b"hello huffman header"[..]);
        let table = CodeTable::from_frequencies(&freq).unwrap();

        let mut buffer = vec![];
        let written = write_header(&mut buffer, Some(&table), freq.total().unwrap()).unwrap();
        assert_eq!(written, buffer.len());

        let (read, total, consumed) = read_header(&mut buffer.as_slice()).unwrap();
        assert_eq!(read.as_ref(), Some(&table));
        assert_eq!(Some(total), freq.total());
        assert_eq!(consumed, buffer.len());
    }

    #[test]
    fn codeword_bounds() {
        assert!(Codeword::new(0b100, 2).is_none());
        assert!(Codeword::new(0, 129).is_none());
        assert!(Codeword::new(u128::MAX, 128).is_some());
        let short = Codeword::new(0b10, 2).unwrap();
        let long = Codeword::new(0b1011, 4).unwrap();
        assert!(short.is_prefix_of(&long));
        assert!(!long.is_prefix_of(&short));
    }
}
