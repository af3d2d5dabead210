//! IEEE 802.3 CRC-32 (reflected polynomial `0xEDB88320`).
//!
//! This is the checksum stored in every ZIP local header and central
//! directory record. The 256-entry lookup table is built at compile time.

const POLYNOMIAL: u32 = 0xEDB8_8320;

/// Precomputed byte-at-a-time lookup table.
pub struct Crc32Table([u32; 256]);

impl Crc32Table {
    pub const fn new() -> Self {
        let mut table = [0u32; 256];
        let mut n = 0;
        while n < 256 {
            let mut c = n as u32;
            let mut k = 0;
            while k < 8 {
                c = if c & 1 != 0 { POLYNOMIAL ^ (c >> 1) } else { c >> 1 };
                k += 1;
            }
            table[n] = c;
            n += 1;
        }
        Self(table)
    }

    #[inline]
    fn entry(&self, index: u8) -> u32 {
        self.0[index as usize]
    }
}

impl Default for Crc32Table {
    fn default() -> Self {
        Self::new()
    }
}

static TABLE: Crc32Table = Crc32Table::new();

/// Streaming CRC-32 hasher.
///
/// ```
/// use resume_ats::codec::crc32::Crc32;
///
/// assert_eq!(Crc32::compute(b"123456789"), 0xCBF4_3926);
///
/// let mut crc = Crc32::new();
/// crc.update(b"1234");
/// crc.update(b"56789");
/// assert_eq!(crc.finalize(), 0xCBF4_3926);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Crc32 {
    state: u32,
}

impl Crc32 {
    pub fn new() -> Self {
        Self { state: 0xFFFF_FFFF }
    }

    pub fn update(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.state = TABLE.entry((self.state ^ b as u32) as u8) ^ (self.state >> 8);
        }
    }

    pub fn finalize(self) -> u32 {
        self.state ^ 0xFFFF_FFFF
    }

    /// One-shot checksum of `bytes`.
    pub fn compute(bytes: &[u8]) -> u32 {
        let mut crc = Self::new();
        crc.update(bytes);
        crc.finalize()
    }
}

impl Default for Crc32 {
    fn default() -> Self {
        Self::new()
    }
}
