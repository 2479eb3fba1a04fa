//! MSB-first bit packing on top of byte streams.
use std::io::{self, BufRead, Write};

/// Accumulates bits and writes every completed byte to the inner writer.
pub(crate) struct BitWriter<W> {
    inner: W,
    /// The buffer bits, left aligned.
    buffer: u64,
    /// The number of valid buffer bits, always below 8 between calls.
    bits_in_buffer: u8,
    /// The number of bytes handed to the inner writer.
    bytes_written: usize,
}

/// Yields the bits of a byte stream, most significant bit of each byte first.
pub(crate) struct BitReader<R> {
    inner: R,
    current: u8,
    /// Bits of `current` not yet handed out.
    bits_left: u8,
    /// The number of bytes taken from the inner reader.
    bytes_read: usize,
}

impl<W: Write> BitWriter<W> {
    pub(crate) fn new(inner: W) -> Self {
        BitWriter {
            inner,
            buffer: 0,
            bits_in_buffer: 0,
            bytes_written: 0,
        }
    }

    /// Append the low `len` bits of `bits`, most significant first.
    pub(crate) fn write_bits(&mut self, bits: u128, len: u8) -> io::Result<()> {
        debug_assert!(len <= 128);
        let mut remaining = len;
        while remaining > 0 {
            let take = remaining.min(32);
            remaining -= take;
            let chunk = (bits >> remaining) as u64 & ((1u64 << take) - 1);
            self.buffer |= chunk << (64 - self.bits_in_buffer - take);
            self.bits_in_buffer += take;
            self.flush_full()?;
        }
        Ok(())
    }

    /// Pad the last partial byte with zero bits, write it and return the inner writer.
    ///
    /// Nothing is written when the bits so far ended on a byte boundary.
    pub(crate) fn finish(mut self) -> io::Result<(W, usize)> {
        if self.bits_in_buffer > 0 {
            let last = (self.buffer >> 56) as u8;
            self.inner.write_all(&[last])?;
            self.bytes_written += 1;
            self.buffer = 0;
            self.bits_in_buffer = 0;
        }
        Ok((self.inner, self.bytes_written))
    }

    fn flush_full(&mut self) -> io::Result<()> {
        let count = self.bits_in_buffer / 8;
        if count == 0 {
            return Ok(());
        }

        let bytes = self.buffer.to_be_bytes();
        self.inner.write_all(&bytes[..usize::from(count)])?;
        // At most 7 + 32 bits are buffered, so the shift stays below 64.
        self.buffer <<= 8 * u32::from(count);
        self.bits_in_buffer -= 8 * count;
        self.bytes_written += usize::from(count);
        Ok(())
    }
}

impl<R: BufRead> BitReader<R> {
    pub(crate) fn new(inner: R) -> Self {
        BitReader {
            inner,
            current: 0,
            bits_left: 0,
            bytes_read: 0,
        }
    }

    /// The next bit, or `None` once the inner reader is exhausted.
    pub(crate) fn read_bit(&mut self) -> io::Result<Option<bool>> {
        if self.bits_left == 0 {
            match self.next_byte()? {
                Some(byte) => {
                    self.current = byte;
                    self.bits_left = 8;
                }
                None => return Ok(None),
            }
        }

        self.bits_left -= 1;
        Ok(Some((self.current >> self.bits_left) & 1 == 1))
    }

    pub(crate) fn bytes_read(&self) -> usize {
        self.bytes_read
    }

    fn next_byte(&mut self) -> io::Result<Option<u8>> {
        let data = loop {
            match self.inner.fill_buf() {
                Ok(data) => break data,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            }
        };

        let byte = match data.first() {
            Some(&byte) => byte,
            None => return Ok(None),
        };
        self.inner.consume(1);
        self.bytes_read += 1;
        Ok(Some(byte))
    }
}

#[cfg(test)]
mod tests {
    use super::{BitReader, BitWriter};

    fn pack(codes: &[(u128, u8)]) -> Vec<u8> {
        let mut writer = BitWriter::new(Vec::new());
        for &(bits, len) in codes {
            writer.write_bits(bits, len).unwrap();
        }
        let (out, written) = writer.finish().unwrap();
        assert_eq!(out.len(), written);
        out
    }

    #[test]
    fn msb_first_with_zero_padding() {
        assert_eq!(pack(&[(0b1, 1)]), [0b1000_0000]);
        assert_eq!(pack(&[(0b0, 1), (0b10, 2), (0b11, 2)]), [0b0101_1000]);
        assert_eq!(pack(&[(0xab, 8), (0b1, 1)]), [0xab, 0x80]);
    }

    #[test]
    fn empty_writer_writes_nothing() {
        assert!(pack(&[]).is_empty());
        assert!(pack(&[(0, 0), (0, 0)]).is_empty());
    }

    #[test]
    fn long_codewords() {
        let all_ones = u128::MAX;
        let out = pack(&[(all_ones, 128), (0b1, 1)]);
        assert_eq!(out.len(), 17);
        assert!(out[..16].iter().all(|&b| b == 0xff));
        assert_eq!(out[16], 0x80);

        let out = pack(&[(0x1_2345_6789, 37)]);
        assert_eq!(out, [0x09, 0x1a, 0x2b, 0x3c, 0x48]);
    }

    #[test]
    fn reader_yields_bits_in_order() {
        let data = [0b1010_0000u8, 0xff];
        let mut reader = BitReader::new(&data[..]);
        let mut bits = vec![];
        while let Some(bit) = reader.read_bit().unwrap() {
            bits.push(bit as u8);
        }
        assert_eq!(bits, [1, 0, 1, 0, 0, 0, 0, 0, 1, 1, 1, 1, 1, 1, 1, 1]);
        assert_eq!(reader.bytes_read(), 2);
        assert!(reader.read_bit().unwrap().is_none());
    }
}
