//! Bit-level cursors over descriptor payloads.
//!
//! Both cursors pack fields most-significant-bit first, like every MPEG/DVB
//! syntax table. Instead of returning a `Result` per field, a cursor keeps a
//! sticky validity flag: the first out-of-bounds access marks it invalid and
//! every later read returns zero (or an empty block) without touching the
//! data. Callers check [`ReadCursor::is_valid`] once, at the end of a pass.

use bitstream_io::{BigEndian, BitRead, BitReader, BitWrite, BitWriter};

use crate::context::Context;

/// Read cursor over an immutable byte slice.
#[derive(Debug, Clone)]
pub struct ReadCursor<'a> {
    data: &'a [u8],
    bit_pos: usize,
    valid: bool,
}

impl<'a> ReadCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            bit_pos: 0,
            valid: true,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Marks the cursor invalid, e.g. when a count field is inconsistent with
    /// the data that follows.
    pub fn mark_invalid(&mut self) {
        self.valid = false;
    }

    pub fn position_bits(&self) -> usize {
        self.bit_pos
    }

    pub fn remaining_bits(&self) -> usize {
        if self.valid {
            self.data.len() * 8 - self.bit_pos
        } else {
            0
        }
    }

    /// Whole bytes left, ignoring a partially consumed byte.
    pub fn remaining_bytes(&self) -> usize {
        self.remaining_bits() / 8
    }

    pub fn is_at_end(&self) -> bool {
        self.remaining_bits() == 0
    }

    pub fn is_byte_aligned(&self) -> bool {
        self.bit_pos % 8 == 0
    }

    /// Reads up to 64 bits as an unsigned value.
    pub fn read_bits(&mut self, bits: u32) -> u64 {
        if bits == 0 {
            return 0;
        }
        if !self.valid || bits > 64 || bits as usize > self.remaining_bits() {
            self.valid = false;
            return 0;
        }
        let mut reader = BitReader::endian(&self.data[self.bit_pos / 8..], BigEndian);
        let value = reader
            .skip((self.bit_pos % 8) as u32)
            .and_then(|_| reader.read_var::<u64>(bits));
        match value {
            Ok(v) => {
                self.bit_pos += bits as usize;
                v
            }
            Err(_) => {
                self.valid = false;
                0
            }
        }
    }

    pub fn read_bool(&mut self) -> bool {
        self.read_bits(1) != 0
    }

    pub fn read_u8(&mut self) -> u8 {
        self.read_bits(8) as u8
    }

    pub fn read_u16(&mut self) -> u16 {
        self.read_bits(16) as u16
    }

    pub fn read_u24(&mut self) -> u32 {
        self.read_bits(24) as u32
    }

    pub fn read_u32(&mut self) -> u32 {
        self.read_bits(32) as u32
    }

    pub fn skip_bits(&mut self, bits: usize) {
        if !self.valid || bits > self.remaining_bits() {
            self.valid = false;
        } else {
            self.bit_pos += bits;
        }
    }

    /// Skips reserved bits. Their value is not checked.
    pub fn skip_reserved(&mut self, bits: usize) {
        self.skip_bits(bits);
    }

    /// Moves to the next byte boundary, dropping the rest of the current byte.
    pub fn align_to_byte(&mut self) {
        if self.valid {
            self.bit_pos = self.bit_pos.div_ceil(8) * 8;
        }
    }

    /// Borrows `len` bytes. Requires byte alignment; empty slice on failure.
    pub fn read_slice(&mut self, len: usize) -> &'a [u8] {
        if !self.valid || !self.is_byte_aligned() || len > self.remaining_bytes() {
            self.valid = false;
            return &[];
        }
        let start = self.bit_pos / 8;
        self.bit_pos += len * 8;
        &self.data[start..start + len]
    }

    /// Reads `len` bytes, at any bit position.
    pub fn read_bytes(&mut self, len: usize) -> Vec<u8> {
        if self.is_byte_aligned() {
            return self.read_slice(len).to_vec();
        }
        if len * 8 > self.remaining_bits() {
            self.valid = false;
            return Vec::new();
        }
        (0..len).map(|_| self.read_u8()).collect()
    }

    /// Bytes from the current (aligned) position to the end, without moving.
    pub fn peek_remaining_bytes(&self) -> &'a [u8] {
        if !self.valid || !self.is_byte_aligned() {
            return &[];
        }
        &self.data[self.bit_pos / 8..]
    }

    pub fn read_remaining_bytes(&mut self) -> Vec<u8> {
        let len = self.remaining_bytes();
        self.read_bytes(len)
    }

    /// Reads `len` bytes and decodes them with the context charset.
    pub fn read_string(&mut self, len: usize, ctx: &Context) -> String {
        let bytes = self.read_bytes(len);
        ctx.default_charset().decode(&bytes)
    }

    /// Reads an 8-bit length followed by that many bytes of text.
    pub fn read_string_with_byte_length(&mut self, ctx: &Context) -> String {
        let len = self.read_u8() as usize;
        self.read_string(len, ctx)
    }
}

/// Write cursor, growable or bounded by a fixed capacity.
pub struct WriteCursor {
    writer: BitWriter<Vec<u8>, BigEndian>,
    bits: usize,
    capacity_bits: Option<usize>,
    valid: bool,
}

impl Default for WriteCursor {
    fn default() -> Self {
        Self::new()
    }
}

impl WriteCursor {
    /// Growable cursor: writes always succeed.
    pub fn new() -> Self {
        Self {
            writer: BitWriter::endian(Vec::new(), BigEndian),
            bits: 0,
            capacity_bits: None,
            valid: true,
        }
    }

    /// Cursor limited to `capacity` bytes. An overflowing write marks the
    /// cursor invalid and is discarded entirely.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity_bits: Some(capacity * 8),
            ..Self::new()
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn mark_invalid(&mut self) {
        self.valid = false;
    }

    pub fn bits_written(&self) -> usize {
        self.bits
    }

    pub fn bytes_written(&self) -> usize {
        self.bits.div_ceil(8)
    }

    /// Bytes still available, `None` for a growable cursor.
    pub fn remaining_capacity(&self) -> Option<usize> {
        self.capacity_bits
            .map(|cap| cap.saturating_sub(self.bits) / 8)
    }

    fn fits(&self, bits: usize) -> bool {
        self.capacity_bits.is_none_or(|cap| self.bits + bits <= cap)
    }

    fn reserve(&mut self, bits: usize) -> bool {
        if !self.valid {
            return false;
        }
        if !self.fits(bits) {
            self.valid = false;
            return false;
        }
        true
    }

    /// Writes the low `bits` bits of `value`. A value that does not fit in
    /// `bits` is a caller error: the cursor becomes invalid, nothing is written.
    pub fn write_bits(&mut self, bits: u32, value: u64) {
        if bits == 0 {
            return;
        }
        if bits > 64 || (bits < 64 && value >> bits != 0) {
            self.valid = false;
            return;
        }
        if !self.reserve(bits as usize) {
            return;
        }
        match self.writer.write_var::<u64>(bits, value) {
            Ok(()) => self.bits += bits as usize,
            Err(_) => self.valid = false,
        }
    }

    pub fn write_bool(&mut self, value: bool) {
        self.write_bits(1, u64::from(value));
    }

    pub fn write_u8(&mut self, value: u8) {
        self.write_bits(8, u64::from(value));
    }

    pub fn write_u16(&mut self, value: u16) {
        self.write_bits(16, u64::from(value));
    }

    pub fn write_u24(&mut self, value: u32) {
        self.write_bits(24, u64::from(value));
    }

    pub fn write_u32(&mut self, value: u32) {
        self.write_bits(32, u64::from(value));
    }

    /// Reserved fields are all ones in MPEG and DVB syntax.
    pub fn write_reserved(&mut self, bits: u32) {
        for _ in 0..bits {
            self.write_bool(true);
        }
    }

    pub fn write_bytes(&mut self, data: &[u8]) {
        if data.is_empty() || !self.reserve(data.len() * 8) {
            return;
        }
        if self.bits % 8 == 0 {
            match self.writer.write_bytes(data) {
                Ok(()) => self.bits += data.len() * 8,
                Err(_) => self.valid = false,
            }
        } else {
            for &b in data {
                self.write_u8(b);
            }
        }
    }

    /// Pads the current byte with zero bits.
    pub fn align_to_byte(&mut self) {
        let pad = (8 - self.bits % 8) % 8;
        if pad > 0 && self.reserve(pad) {
            match self.writer.byte_align() {
                Ok(()) => self.bits += pad,
                Err(_) => self.valid = false,
            }
        }
    }

    pub fn write_string(&mut self, text: &str, ctx: &Context) {
        let bytes = ctx.default_charset().encode(text);
        self.write_bytes(&bytes);
    }

    /// Writes an 8-bit length then the encoded text. Text encoding to more
    /// than 255 bytes invalidates the cursor and writes nothing.
    pub fn write_string_with_byte_length(&mut self, text: &str, ctx: &Context) {
        let bytes = ctx.default_charset().encode(text);
        let Ok(len) = u8::try_from(bytes.len()) else {
            self.valid = false;
            return;
        };
        self.write_u8(len);
        self.write_bytes(&bytes);
    }

    /// Finishes the cursor, padding a partial last byte with zeros. The
    /// padding is flushed even after an invalidating write, but never past
    /// the capacity of a bounded cursor.
    pub fn into_bytes(mut self) -> Vec<u8> {
        let pad = (8 - self.bits % 8) % 8;
        if pad > 0 && self.fits(pad) && self.writer.byte_align().is_ok() {
            self.bits += pad;
        }
        self.writer.into_writer()
    }
}

/// Clamps a field value to the maximum representable in `bits` bits.
pub fn clamp_bits(value: u64, bits: u32) -> u64 {
    if bits >= 64 {
        value
    } else {
        value.min((1u64 << bits) - 1)
    }
}
