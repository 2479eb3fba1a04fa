//! The adaptive dictionaries of both coding directions.
//!
//! The encoder keys each entry by its prefix code and final byte, which forms an implicit trie
//! over all known strings. The decoder stores the same pairs indexed by code and rebuilds strings
//! by walking the prefixes backwards.
use std::collections::HashMap;

use super::Configuration;
use crate::{Code, CodecError};

/// Compression side dictionary: `(prefix, byte) -> code`.
pub(crate) struct EncodeTable {
    successors: HashMap<(Code, u8), Code>,
    next_code: u64,
    max_code: u64,
    alphabet_size: u16,
}

/// The outcome of extending the current prefix by one byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Step {
    /// The extended string is known and becomes the new prefix.
    Extend(Code),
    /// The extended string is new; the code of the old prefix must be emitted and the prefix
    /// restarts at the byte.
    Emit(Code),
}

/// Decompression side dictionary: `code -> (prefix, byte)`.
pub(crate) struct DecodeTable {
    links: Vec<Link>,
    max_code: u64,
    alphabet_size: u16,
}

#[derive(Clone, Copy, Debug)]
struct Link {
    prefix: Code,
    byte: u8,
    /// Length of the string this code stands for.
    depth: usize,
}

impl EncodeTable {
    pub(crate) fn new(config: &Configuration) -> Self {
        EncodeTable {
            successors: HashMap::new(),
            next_code: u64::from(config.alphabet_size()),
            max_code: config.max_code(),
            alphabet_size: config.alphabet_size(),
        }
    }

    pub(crate) fn reset(&mut self) {
        self.successors.clear();
        self.next_code = u64::from(self.alphabet_size);
    }

    /// The number of entries, seeds included.
    pub(crate) fn len(&self) -> u64 {
        self.next_code
    }

    /// Look up `prefix + byte`, registering it when unknown and room remains.
    ///
    /// Without a prefix the single byte seed is returned. The byte must be inside the alphabet.
    pub(crate) fn lookup_or_extend(&mut self, prefix: Option<Code>, byte: u8) -> Step {
        debug_assert!(u16::from(byte) < self.alphabet_size);
        let prefix = match prefix {
            None => return Step::Extend(Code::from(byte)),
            Some(prefix) => prefix,
        };

        if let Some(&code) = self.successors.get(&(prefix, byte)) {
            return Step::Extend(code);
        }

        if self.next_code <= self.max_code {
            self.successors.insert((prefix, byte), self.next_code as Code);
            self.next_code += 1;
            if self.next_code > self.max_code {
                tracing::debug!(entries = self.next_code, "lzw encoder dictionary is full");
            }
        }

        Step::Emit(prefix)
    }
}

impl DecodeTable {
    pub(crate) fn new(config: &Configuration) -> Self {
        let mut table = DecodeTable {
            links: Vec::new(),
            max_code: config.max_code(),
            alphabet_size: config.alphabet_size(),
        };
        table.reset();
        table
    }

    pub(crate) fn reset(&mut self) {
        self.links.clear();
        self.links.extend((0..self.alphabet_size).map(|symbol| Link {
            prefix: Code::from(symbol),
            byte: symbol as u8,
            depth: 1,
        }));
    }

    /// The number of entries, seeds included.
    pub(crate) fn len(&self) -> u64 {
        self.links.len() as u64
    }

    fn has_room(&self) -> bool {
        self.len() <= self.max_code
    }

    /// Decode one code into `out`, growing the table as the encoder did.
    ///
    /// `previous` is the code and string decoded last, `None` for the first code of a stream. A
    /// code one past the last entry is the string of `previous` followed by its own first byte.
    pub(crate) fn step(
        &mut self,
        code: Code,
        previous: Option<(Code, &[u8])>,
        out: &mut Vec<u8>,
    ) -> Result<(), CodecError> {
        let wide = u64::from(code);
        let (prev_code, prev) = match previous {
            None if wide < u64::from(self.alphabet_size) => {
                self.reconstruct(code, out);
                return Ok(());
            }
            None => return Err(CodecError::InvalidCode(wide)),
            Some(previous) => previous,
        };

        let first = match prev.first() {
            Some(&first) => first,
            None => return Err(CodecError::InvalidCode(u64::from(prev_code))),
        };

        if wide < self.len() {
            self.reconstruct(code, out);
        } else if wide == self.len() && self.has_room() {
            out.clear();
            out.extend_from_slice(prev);
            out.push(first);
        } else {
            return Err(CodecError::InvalidCode(wide));
        }

        if self.has_room() {
            self.push(prev_code, out[0]);
            if !self.has_room() {
                tracing::debug!(entries = self.len(), "lzw decoder dictionary is full");
            }
        }

        Ok(())
    }

    fn push(&mut self, prefix: Code, byte: u8) {
        let depth = self.links[prefix as usize].depth + 1;
        self.links.push(Link {
            prefix,
            byte,
            depth,
        });
    }

    /// Write the string of a known code into `out`, replacing its contents.
    fn reconstruct(&self, code: Code, out: &mut Vec<u8>) {
        let depth = self.links[code as usize].depth;
        out.clear();
        out.resize(depth, 0);
        let mut code = code;
        for slot in out.iter_mut().rev() {
            let link = self.links[code as usize];
            *slot = link.byte;
            code = link.prefix;
        }
    }
}
