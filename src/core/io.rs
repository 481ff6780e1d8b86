//! Decoding and encoding of whole FMG files
//!
//! File layout:
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │ Header (40 bytes)                    │
//! ├──────────────────────────────────────┤
//! │ Range records (16 bytes each)        │
//! ├──────────────────────────────────────┤ ← strings_offset
//! │ Offset table (8 bytes per slot)      │
//! ├──────────────────────────────────────┤
//! │ UTF-16LE strings, null-terminated    │
//! │ (+2 zero bytes to reach 4 alignment) │
//! └──────────────────────────────────────┘
//! ```
//!
//! Encoding always produces a fresh canonical layout; nothing from the file
//! that was decoded is echoed back except the texts.

use crate::container::{Container, Lookup};
use crate::error::{FmgError, Result};
use crate::header::{validate_ranges, FmgHeader, FmgRange, OFFSET_SIZE, RANGE_SIZE};
use crate::string::{read_string, write_string};
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// Summary of an FMG file's layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerStats {
    pub version: i32,
    pub total_size: i32,
    pub range_count: i32,
    pub string_table_size: i32,
    pub strings_offset: i64,
    pub entry_count: usize,
    pub null_count: usize,
}

/// Decode a container from any seekable source
pub fn decode<R: Read + Seek, P: AsRef<Path>>(source: &mut R, path: P) -> Result<Container> {
    let (_, container) = decode_with_header(source, path)?;
    Ok(container)
}

fn decode_with_header<R: Read + Seek, P: AsRef<Path>>(
    source: &mut R,
    path: P,
) -> Result<(FmgHeader, Container)> {
    let stream_len = source.seek(SeekFrom::End(0))?;
    source.seek(SeekFrom::Start(0))?;

    let mut header_bytes = [0u8; FmgHeader::SIZE];
    source
        .read_exact(&mut header_bytes)
        .map_err(|e| FmgError::from_read(e, "header"))?;
    let header = FmgHeader::from_bytes(&header_bytes)?;

    if header.ranges_end() as u64 > stream_len {
        return Err(FmgError::TruncatedInput(format!(
            "{} range records extend past end of data ({} bytes)",
            header.range_count, stream_len
        )));
    }

    let mut range_bytes = vec![0u8; header.range_count as usize * RANGE_SIZE];
    source
        .read_exact(&mut range_bytes)
        .map_err(|e| FmgError::from_read(e, "range records"))?;
    let ranges = range_bytes
        .chunks_exact(RANGE_SIZE)
        .map(FmgRange::from_bytes)
        .collect::<Result<Vec<_>>>()?;
    validate_ranges(&ranges, header.string_table_size)?;

    let table_end =
        header.strings_offset as u64 + header.string_table_size as u64 * OFFSET_SIZE as u64;
    if table_end > stream_len {
        return Err(FmgError::TruncatedInput(format!(
            "offset table ends at {} past end of data ({} bytes)",
            table_end, stream_len
        )));
    }

    source.seek(SeekFrom::Start(header.strings_offset as u64))?;
    let mut table_bytes = vec![0u8; header.string_table_size as usize * OFFSET_SIZE];
    source
        .read_exact(&mut table_bytes)
        .map_err(|e| FmgError::from_read(e, "offset table"))?;
    let table: Vec<i64> = table_bytes
        .chunks_exact(OFFSET_SIZE)
        .map(|c| i64::from_le_bytes([c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]]))
        .collect();

    let mut container = Container::new(path.as_ref());
    for range in &ranges {
        for id in range.first..=range.last {
            let offset = table[range.slot_of(id) as usize];
            if offset == 0 {
                container.set_null(id as u32);
                continue;
            }
            if offset < 0 || offset as u64 >= stream_len {
                return Err(FmgError::TruncatedInput(format!(
                    "string for id {} at offset {} lies outside data ({} bytes)",
                    id, offset, stream_len
                )));
            }
            let text = read_string(source, offset as u64)?;
            container.set(id as u32, text);
        }
    }

    debug!(
        "Decoded {:?}: {} ranges, {} entries",
        path.as_ref(),
        ranges.len(),
        container.len()
    );

    Ok((header, container))
}

/// Coalesce strictly ascending identifiers into ranges
///
/// Returns the ranges and the offset table size. The slot counter is seeded
/// at 1 because the first identifier is counted before the loop, so the
/// `k`-th identifier lands in slot `k` and the table holds exactly one slot
/// per identifier.
pub fn build_ranges<I: IntoIterator<Item = u32>>(ids: I) -> Result<(Vec<FmgRange>, i32)> {
    let mut ids = ids.into_iter().map(to_disk_id);

    let first = match ids.next() {
        None => return Ok((Vec::new(), 0)),
        Some(id) => id?,
    };

    let mut ranges = Vec::new();
    let mut range = FmgRange::new(0, first, first);
    let mut counter: i32 = 1;
    for id in ids {
        let id = id?;
        if id == range.last + 1 {
            range.last = id;
        } else {
            ranges.push(range);
            range = FmgRange::new(counter, id, id);
        }
        counter += 1;
    }
    ranges.push(range);

    Ok((ranges, counter))
}

fn to_disk_id(id: u32) -> Result<i32> {
    i32::try_from(id).map_err(|_| {
        FmgError::MalformedHeader(format!("identifier {} does not fit the format", id))
    })
}

/// Encode a container into any seekable sink
///
/// Returns the header that was written. On error the sink holds a partial,
/// unusable file.
pub fn encode<W: Write + Seek>(container: &Container, sink: &mut W) -> Result<FmgHeader> {
    let (ranges, table_size) = build_ranges(container.ids())?;

    let mut header = FmgHeader::new();
    header.range_count = ranges.len() as i32;
    header.string_table_size = table_size;

    sink.seek(SeekFrom::Start(0))?;
    sink.write_all(&header.to_bytes())?;
    for range in &ranges {
        sink.write_all(&range.to_bytes())?;
    }

    header.strings_offset = sink.stream_position()? as i64;
    let mut table = vec![0i64; table_size as usize];
    sink.write_all(&vec![0u8; table.len() * OFFSET_SIZE])?;

    for range in &ranges {
        for id in range.first..=range.last {
            if let Lookup::Text(text) = container.lookup(id as u32) {
                table[range.slot_of(id) as usize] = write_string(sink, text)? as i64;
            }
        }
    }

    let mut end = sink.stream_position()?;
    if end & 3 != 0 {
        sink.write_all(&[0u8; 2])?;
        end += 2;
    }
    header.total_size = i32::try_from(end).map_err(|_| {
        FmgError::MalformedHeader(format!("encoded size {} exceeds format limit", end))
    })?;

    sink.seek(SeekFrom::Start(0))?;
    sink.write_all(&header.to_bytes())?;

    let table_bytes: Vec<u8> = table.iter().flat_map(|o| o.to_le_bytes()).collect();
    sink.seek(SeekFrom::Start(header.strings_offset as u64))?;
    sink.write_all(&table_bytes)?;
    sink.seek(SeekFrom::Start(end))?;
    sink.flush()?;

    debug!(
        "Encoded {} entries in {} ranges, {} bytes",
        container.len(),
        ranges.len(),
        end
    );

    Ok(header)
}

/// Load a container from disk
pub fn load<P: AsRef<Path>>(path: P) -> Result<Container> {
    let file = File::open(&path)?;
    let mut reader = BufReader::new(file);
    decode(&mut reader, path)
}

/// Save a container to its own path
pub fn save(container: &Container) -> Result<FmgHeader> {
    save_as(container, container.path())
}

/// Save a container to `path`
///
/// The file is encoded into a temporary file next to `path` and renamed over
/// it only once encoding succeeded, so a failure leaves `path` untouched.
pub fn save_as<P: AsRef<Path>>(container: &Container, path: P) -> Result<FmgHeader> {
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut staged = NamedTempFile::new_in(dir)?;
    let header = {
        let mut writer = BufWriter::new(staged.as_file_mut());
        let header = encode(container, &mut writer)?;
        writer.flush()?;
        header
    };
    staged.as_file().sync_all()?;
    staged.persist(path).map_err(|e| FmgError::Io(e.error))?;

    Ok(header)
}

/// Read a file's header and entries for display
pub fn inspect<P: AsRef<Path>>(path: P) -> Result<ContainerStats> {
    let file = File::open(&path)?;
    let mut reader = BufReader::new(file);
    let (header, container) = decode_with_header(&mut reader, path)?;

    Ok(ContainerStats {
        version: header.version,
        total_size: header.total_size,
        range_count: header.range_count,
        string_table_size: header.string_table_size,
        strings_offset: header.strings_offset,
        entry_count: container.len(),
        null_count: container.null_count(),
    })
}
