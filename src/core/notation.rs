//! Review file notation
//!
//! Report mode writes one block per changed identifier:
//!
//! ```text
//! < 1:"Hi"        old source text
//! > 1:"Hello"     new source text
//! - 1:"Salut"     current translation
//! = 1:""          to be filled in by a translator
//! ```
//!
//! Merge mode reads the same file back and keeps only the `=` lines as
//! overrides. Strings use conventional escaped-string quoting.

use crate::error::{FmgError, Result};
use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use tracing::{debug, warn};

/// Manually supplied replacement texts, by identifier
pub type Overrides = BTreeMap<u32, String>;

/// Line prefix of a review record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    /// Previous source-language text
    OldSource,
    /// Updated source-language text
    NewSource,
    /// Current translation
    Translation,
    /// Placeholder for the reviewed text
    Fill,
}

impl Marker {
    pub fn prefix(self) -> char {
        match self {
            Marker::OldSource => '<',
            Marker::NewSource => '>',
            Marker::Translation => '-',
            Marker::Fill => '=',
        }
    }
}

/// One line of a review file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRecord {
    pub marker: Marker,
    pub id: u32,
    pub text: String,
}

impl ReportRecord {
    pub fn new<S: Into<String>>(marker: Marker, id: u32, text: S) -> Self {
        ReportRecord {
            marker,
            id,
            text: text.into(),
        }
    }
}

impl fmt::Display for ReportRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}:{}", self.marker.prefix(), self.id, quote(&self.text))
    }
}

/// Write records, one per line
pub fn write_report<W: Write>(writer: &mut W, records: &[ReportRecord]) -> Result<()> {
    for record in records {
        writeln!(writer, "{}", record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Read overrides from the `= <id>:<quoted>` lines of a review file
///
/// Other lines are ignored. Lines that fail to parse are logged and skipped;
/// an empty string means "no override".
pub fn parse_overrides<R: BufRead>(reader: R) -> Result<Overrides> {
    let mut overrides = Overrides::new();

    for (number, line) in reader.split(b'\n').enumerate() {
        let line = line?;
        let Some(body) = line.strip_prefix(b"= ") else {
            continue;
        };
        let body = match std::str::from_utf8(body) {
            Ok(body) => body,
            Err(e) => {
                warn!("Line {}: not valid UTF-8 ({}), skipped", number + 1, e);
                continue;
            }
        };
        let Some((id, quoted)) = body.split_once(':') else {
            warn!("Line {}: missing ':' separator, skipped", number + 1);
            continue;
        };

        let text = match unquote(quoted.trim()) {
            Ok(text) => text,
            Err(e) => {
                warn!("Line {}: {}, skipped", number + 1, e);
                continue;
            }
        };
        if text.is_empty() {
            continue;
        }

        match parse_id(id.trim()) {
            Some(id) => {
                overrides.insert(id, text);
            }
            None => warn!("Line {}: invalid identifier '{}', skipped", number + 1, id),
        }
    }

    Ok(overrides)
}

/// Identifiers are non-negative 32-bit signed values on disk
fn parse_id(id: &str) -> Option<u32> {
    id.parse::<i32>()
        .ok()
        .and_then(|id| u32::try_from(id).ok())
}

/// Load overrides from a review file; a missing file yields no overrides
pub fn load_overrides<P: AsRef<Path>>(path: P) -> Result<Overrides> {
    let file = match File::open(&path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("No override file at {:?}", path.as_ref());
            return Ok(Overrides::new());
        }
        Err(e) => return Err(e.into()),
    };

    let overrides = parse_overrides(BufReader::new(file))?;
    debug!(
        "Loaded {} overrides from {:?}",
        overrides.len(),
        path.as_ref()
    );
    Ok(overrides)
}

/// Quote `text` as a double-quoted escaped string
pub fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\x07' => out.push_str("\\a"),
            '\x08' => out.push_str("\\b"),
            '\x0C' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\x0B' => out.push_str("\\v"),
            c if is_printable(c) => out.push(c),
            c if (c as u32) < 0x20 || c == '\x7F' => {
                out.push_str(&format!("\\x{:02x}", c as u32));
            }
            c if (c as u32) < 0x10000 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push_str(&format!("\\U{:08x}", c as u32)),
        }
    }
    out.push('"');
    out
}

/// Inverse of [`quote`]; also accepts back-quoted raw strings
pub fn unquote(quoted: &str) -> Result<String> {
    if let Some(raw) = quoted
        .strip_prefix('`')
        .and_then(|rest| rest.strip_suffix('`'))
    {
        if raw.contains('`') {
            return Err(invalid(quoted, "back quote inside raw string"));
        }
        return Ok(raw.replace('\r', ""));
    }

    let body = quoted
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .ok_or_else(|| invalid(quoted, "not a quoted string"))?;

    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        match c {
            '"' => return Err(invalid(quoted, "unescaped quote")),
            '\n' => return Err(invalid(quoted, "newline inside string")),
            '\\' => out.push(unescape(&mut chars, quoted)?),
            c => out.push(c),
        }
    }

    Ok(out)
}

fn unescape(chars: &mut std::str::Chars<'_>, quoted: &str) -> Result<char> {
    let c = chars
        .next()
        .ok_or_else(|| invalid(quoted, "trailing backslash"))?;

    let value = match c {
        'a' => '\x07',
        'b' => '\x08',
        'f' => '\x0C',
        'n' => '\n',
        'r' => '\r',
        't' => '\t',
        'v' => '\x0B',
        '\\' => '\\',
        '"' => '"',
        'x' => hex_char(chars, 2, quoted)?,
        'u' => hex_char(chars, 4, quoted)?,
        'U' => hex_char(chars, 8, quoted)?,
        '0'..='7' => {
            let mut value = c.to_digit(8).unwrap_or(0);
            for _ in 0..2 {
                let digit = chars
                    .next()
                    .and_then(|d| d.to_digit(8))
                    .ok_or_else(|| invalid(quoted, "bad octal escape"))?;
                value = value * 8 + digit;
            }
            if value > 0xFF {
                return Err(invalid(quoted, "octal escape out of range"));
            }
            char::from_u32(value).ok_or_else(|| invalid(quoted, "bad octal escape"))?
        }
        other => {
            return Err(invalid(quoted, &format!("unknown escape '\\{}'", other)));
        }
    };

    Ok(value)
}

fn hex_char(chars: &mut std::str::Chars<'_>, digits: usize, quoted: &str) -> Result<char> {
    let mut value = 0u32;
    for _ in 0..digits {
        let digit = chars
            .next()
            .and_then(|d| d.to_digit(16))
            .ok_or_else(|| invalid(quoted, "bad hex escape"))?;
        value = value * 16 + digit;
    }
    char::from_u32(value).ok_or_else(|| invalid(quoted, "escape is not a valid character"))
}

fn invalid(quoted: &str, reason: &str) -> FmgError {
    FmgError::InvalidNotation(format!("cannot unquote {}: {}", quoted, reason))
}

/// Characters that can appear literally inside a quoted string
fn is_printable(c: char) -> bool {
    if c == ' ' {
        return true;
    }
    if c.is_control() || c.is_whitespace() {
        return false;
    }
    !matches!(c as u32,
        0x00AD
        | 0x0600..=0x0605
        | 0x061C
        | 0x06DD
        | 0x070F
        | 0x180E
        | 0x200B..=0x200F
        | 0x202A..=0x202E
        | 0x2060..=0x2064
        | 0x2066..=0x206F
        | 0xFEFF
        | 0xFFF9..=0xFFFB
        | 0xE000..=0xF8FF
        | 0xF0000..=0x10FFFF)
}
