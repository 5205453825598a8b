/// Fixed-width field reader over a bit-oriented source. Fields are read most
/// significant bit first, straddling byte boundaries as needed.
pub trait BitRead {
    /// Returns the next `width` bits as an unsigned value, or `None` once
    /// fewer than `width` bits remain.
    fn read_bits(&mut self, width: u32) -> Option<u64>;

    /// Rewinds to the start of the underlying source.
    fn reset(&mut self);
}

/// Fixed-width field writer into a bit-oriented sink, packing most
/// significant bit first.
pub trait BitWrite {
    /// Packs the low `width` bits of `value` into the output.
    fn write_bits(&mut self, width: u32, value: u64);
}

pub struct BitReader<'a> {
    bytes: &'a [u8],
    bit_cursor: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            bit_cursor: 0,
        }
    }

    pub fn bits_left(&self) -> usize {
        self.bytes.len() * 8 - self.bit_cursor
    }
}

impl BitRead for BitReader<'_> {
    fn read_bits(&mut self, width: u32) -> Option<u64> {
        debug_assert!(width <= 64);
        if width as usize > self.bits_left() {
            return None;
        }
        let mut value = 0;
        for _ in 0..width {
            let byte = self.bytes[self.bit_cursor / 8];
            let bit = byte >> (7 - self.bit_cursor % 8) & 1;
            value = value << 1 | u64::from(bit);
            self.bit_cursor += 1;
        }
        Some(value)
    }

    fn reset(&mut self) {
        self.bit_cursor = 0;
    }
}

#[derive(Default)]
pub struct BitWriter {
    bytes: Vec<u8>,
    // Up to 7 pending bits, right-aligned
    pending: u8,
    pending_width: u32,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bits_written(&self) -> usize {
        self.bytes.len() * 8 + self.pending_width as usize
    }

    /// Flushes the trailing partial byte, padded with zero bits, and
    /// releases the packed buffer.
    pub fn into_bytes(mut self) -> Vec<u8> {
        if self.pending_width > 0 {
            self.bytes.push(self.pending << (8 - self.pending_width));
        }
        self.bytes
    }
}

impl BitWrite for BitWriter {
    fn write_bits(&mut self, width: u32, value: u64) {
        debug_assert!(width <= 64);
        for shift in (0..width).rev() {
            self.pending = self.pending << 1 | (value >> shift & 1) as u8;
            self.pending_width += 1;
            if self.pending_width == 8 {
                self.bytes.push(self.pending);
                self.pending = 0;
                self.pending_width = 0;
            }
        }
    }
}
