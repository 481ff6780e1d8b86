use crate::error::{FmgError, Result};

/// Format version written by the current toolchain (64-bit offsets)
pub const VERSION: i32 = 0x20000;

/// First reserved word, always 1 in files written by the game tools
pub const RESERVED_A: i32 = 1;

/// Second reserved word, always 0xFF in files written by the game tools
pub const RESERVED_B: i32 = 0xFF;

/// Size of a range record in bytes
pub const RANGE_SIZE: usize = 16;

/// Size of one offset table slot in bytes
pub const OFFSET_SIZE: usize = 8;

/// FMG container header
///
/// Fixed 40-byte little-endian record at offset 0. It tells the reader how many
/// range records follow it and where the offset table lives.
///
/// ```text
/// 0x00  i32  version            (0x20000)
/// 0x04  i32  total_size         file length in bytes
/// 0x08  i32  reserved_a         (1)
/// 0x0C  i32  range_count
/// 0x10  i32  string_table_size  number of offset slots
/// 0x14  i32  reserved_b         (0xFF)
/// 0x18  i64  strings_offset     byte offset of the offset table
/// 0x20  i64  reserved_c         (0)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FmgHeader {
    pub version: i32,
    pub total_size: i32,
    pub reserved_a: i32,
    pub range_count: i32,
    pub string_table_size: i32,
    pub reserved_b: i32,
    pub strings_offset: i64,
    pub reserved_c: i64,
}

/// Contiguous run of identifiers sharing a contiguous slice of offset slots
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FmgRange {
    /// Index of the first slot of this range in the offset table
    pub offset: i32,
    /// First identifier (inclusive)
    pub first: i32,
    /// Last identifier (inclusive)
    pub last: i32,
    pub reserved: i32,
}

impl FmgHeader {
    pub const SIZE: usize = 40;

    /// Create a fresh header with canonical constants and zeroed layout fields
    pub fn new() -> Self {
        FmgHeader {
            version: VERSION,
            total_size: 0,
            reserved_a: RESERVED_A,
            range_count: 0,
            string_table_size: 0,
            reserved_b: RESERVED_B,
            strings_offset: 0,
            reserved_c: 0,
        }
    }

    /// Byte offset just past the range records
    pub fn ranges_end(&self) -> i64 {
        Self::SIZE as i64 + self.range_count as i64 * RANGE_SIZE as i64
    }

    /// Validate the structural fields
    ///
    /// Reserved words are not checked; they are carried through unparsed.
    pub fn validate(&self) -> Result<()> {
        if self.version != VERSION {
            return Err(FmgError::MalformedHeader(format!(
                "unsupported version {:#x}, expected {:#x}",
                self.version, VERSION
            )));
        }

        if self.range_count < 0 {
            return Err(FmgError::MalformedHeader(format!(
                "negative range count {}",
                self.range_count
            )));
        }

        if self.string_table_size < 0 {
            return Err(FmgError::MalformedHeader(format!(
                "negative string table size {}",
                self.string_table_size
            )));
        }

        if self.strings_offset < self.ranges_end() {
            return Err(FmgError::MalformedHeader(format!(
                "offset table at {} overlaps header and {} range records",
                self.strings_offset, self.range_count
            )));
        }

        Ok(())
    }

    /// Serialize header to bytes
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];

        bytes[0..4].copy_from_slice(&self.version.to_le_bytes());
        bytes[4..8].copy_from_slice(&self.total_size.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.reserved_a.to_le_bytes());
        bytes[12..16].copy_from_slice(&self.range_count.to_le_bytes());
        bytes[16..20].copy_from_slice(&self.string_table_size.to_le_bytes());
        bytes[20..24].copy_from_slice(&self.reserved_b.to_le_bytes());
        bytes[24..32].copy_from_slice(&self.strings_offset.to_le_bytes());
        bytes[32..40].copy_from_slice(&self.reserved_c.to_le_bytes());

        bytes
    }

    /// Deserialize and validate a header
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < Self::SIZE {
            return Err(FmgError::TruncatedInput(format!(
                "header needs {} bytes, got {}",
                Self::SIZE,
                bytes.len()
            )));
        }

        let header = FmgHeader {
            version: read_i32(bytes, 0),
            total_size: read_i32(bytes, 4),
            reserved_a: read_i32(bytes, 8),
            range_count: read_i32(bytes, 12),
            string_table_size: read_i32(bytes, 16),
            reserved_b: read_i32(bytes, 20),
            strings_offset: read_i64(bytes, 24),
            reserved_c: read_i64(bytes, 32),
        };

        header.validate()?;

        Ok(header)
    }
}

impl Default for FmgHeader {
    fn default() -> Self {
        Self::new()
    }
}

impl FmgRange {
    pub fn new(offset: i32, first: i32, last: i32) -> Self {
        FmgRange {
            offset,
            first,
            last,
            reserved: 0,
        }
    }

    /// Number of identifiers (and slots) covered by this range
    pub fn len(&self) -> i64 {
        self.last as i64 - self.first as i64 + 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() <= 0
    }

    /// Slot index for an identifier inside this range
    pub fn slot_of(&self, id: i32) -> i64 {
        self.offset as i64 + (id as i64 - self.first as i64)
    }

    pub fn to_bytes(&self) -> [u8; RANGE_SIZE] {
        let mut bytes = [0u8; RANGE_SIZE];
        bytes[0..4].copy_from_slice(&self.offset.to_le_bytes());
        bytes[4..8].copy_from_slice(&self.first.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.last.to_le_bytes());
        bytes[12..16].copy_from_slice(&self.reserved.to_le_bytes());
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < RANGE_SIZE {
            return Err(FmgError::TruncatedInput(format!(
                "range record needs {} bytes, got {}",
                RANGE_SIZE,
                bytes.len()
            )));
        }

        Ok(FmgRange {
            offset: read_i32(bytes, 0),
            first: read_i32(bytes, 4),
            last: read_i32(bytes, 8),
            reserved: read_i32(bytes, 12),
        })
    }
}

/// Check a decoded range list against the header
///
/// Ranges must be non-empty, ascending, non-overlapping, and address slots
/// inside the offset table.
pub fn validate_ranges(ranges: &[FmgRange], string_table_size: i32) -> Result<()> {
    let mut previous: Option<&FmgRange> = None;

    for range in ranges {
        if range.first < 0 || range.first > range.last {
            return Err(FmgError::MalformedHeader(format!(
                "range [{}, {}] is empty or has a negative identifier",
                range.first, range.last
            )));
        }

        if let Some(prev) = previous {
            if range.first <= prev.last {
                return Err(FmgError::RangeOverlap {
                    previous_last: prev.last,
                    first: range.first,
                });
            }
        }

        let end = range.offset as i64 + range.len();
        if range.offset < 0 || end > string_table_size as i64 {
            return Err(FmgError::MalformedHeader(format!(
                "range [{}, {}] addresses slots {}..{} outside table of {}",
                range.first, range.last, range.offset, end, string_table_size
            )));
        }

        previous = Some(range);
    }

    Ok(())
}

fn read_i32(bytes: &[u8], at: usize) -> i32 {
    i32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

fn read_i64(bytes: &[u8], at: usize) -> i64 {
    i64::from_le_bytes([
        bytes[at],
        bytes[at + 1],
        bytes[at + 2],
        bytes[at + 3],
        bytes[at + 4],
        bytes[at + 5],
        bytes[at + 6],
        bytes[at + 7],
    ])
}
