//! Null-terminated UTF-16LE strings
//!
//! Strings in the blob are sequences of 16-bit little-endian code units ending
//! with a zero unit. BMP text maps one unit to one character; surrogate pairs
//! are combined and an unpaired surrogate decodes to U+FFFD.

use crate::error::{FmgError, Result};
use std::io::{Read, Seek, SeekFrom, Write};

/// Read the string starting at `offset`
///
/// Fails with `TruncatedInput` if the data ends before a terminator.
pub fn read_string<R: Read + Seek>(source: &mut R, offset: u64) -> Result<String> {
    source.seek(SeekFrom::Start(offset))?;

    let mut units = Vec::new();
    let mut unit = [0u8; 2];
    loop {
        source.read_exact(&mut unit).map_err(|e| {
            FmgError::from_read(e, &format!("string at offset {:#x}", offset))
        })?;
        let value = u16::from_le_bytes(unit);
        if value == 0 {
            break;
        }
        units.push(value);
    }

    Ok(decode_units(&units))
}

/// Write `text` at the current position followed by a terminator
///
/// Returns the offset the string was written at.
pub fn write_string<W: Write + Seek>(sink: &mut W, text: &str) -> Result<u64> {
    if text.contains('\0') {
        return Err(FmgError::InvalidText(format!(
            "text contains a null code unit: {:?}",
            text
        )));
    }

    let offset = sink.stream_position()?;

    let mut bytes = Vec::with_capacity((text.len() + 1) * 2);
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_le_bytes());
    }
    bytes.extend_from_slice(&0u16.to_le_bytes());
    sink.write_all(&bytes)?;

    Ok(offset)
}

fn decode_units(units: &[u16]) -> String {
    char::decode_utf16(units.iter().copied())
        .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}
