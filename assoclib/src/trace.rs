use std::fmt;
use crate::hex::{HEX_LOOKUP, INVALID_DIGIT};

/// Maximum number of hex digits in an address, enough for any `u64`
pub const MAX_ADDRESS_DIGITS: usize = 16;

/// A line of a trace which couldn't be read as an address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceError {
    /// 1-based line number within the trace
    pub line: usize,
    pub kind: TraceErrorKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceErrorKind {
    /// The line was only a `0x` prefix
    MissingDigits,
    /// The byte which isn't a hex digit
    InvalidDigit(u8),
    TooLong(usize),
}

impl fmt::Display for TraceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TraceErrorKind::MissingDigits => write!(f, "line {}: address prefix with no digits", self.line),
            // Non-ASCII bytes belong to multi-byte characters, print them raw
            TraceErrorKind::InvalidDigit(byte) if byte.is_ascii() => {
                write!(f, "line {}: invalid hex digit {:?}", self.line, *byte as char)
            }
            TraceErrorKind::InvalidDigit(byte) => write!(f, "line {}: invalid byte {byte:#04x}", self.line),
            TraceErrorKind::TooLong(len) => write!(
                f,
                "line {}: address has {len} digits, at most {MAX_ADDRESS_DIGITS} fit in 64 bits",
                self.line
            ),
        }
    }
}

impl std::error::Error for TraceError {}

/// Parses a single address made only of hex digits, with no prefix or whitespace
///
/// Uses the lookup table from build.rs, as `u64::from_str_radix` needs a `&str` and we have bytes
pub fn parse_hex_address(digits: &[u8]) -> Result<u64, TraceErrorKind> {
    if digits.is_empty() {
        return Err(TraceErrorKind::MissingDigits);
    }
    if digits.len() > MAX_ADDRESS_DIGITS {
        return Err(TraceErrorKind::TooLong(digits.len()));
    }
    digits.iter().try_fold(0u64, |acc, &byte| {
        match HEX_LOOKUP[byte as usize] {
            INVALID_DIGIT => Err(TraceErrorKind::InvalidDigit(byte)),
            nibble => Ok(acc << 4 | nibble as u64),
        }
    })
}

/// Iterator over the addresses of a textual trace
///
/// The format is one hexadecimal address per line. A `0x` or `0X` prefix is optional, surrounding
/// whitespace is ignored, and blank lines are skipped. Both `\n` and `\r\n` line endings work
pub struct TraceAddresses<'a> {
    lines: std::iter::Enumerate<std::slice::Split<'a, u8, fn(&u8) -> bool>>,
}

impl<'a> TraceAddresses<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        let is_newline: fn(&u8) -> bool = |b| *b == b'\n';
        Self {
            lines: bytes.split(is_newline).enumerate(),
        }
    }
}

impl<'a> Iterator for TraceAddresses<'a> {
    type Item = Result<u64, TraceError>;

    fn next(&mut self) -> Option<Self::Item> {
        for (index, line) in self.lines.by_ref() {
            let trimmed = line.trim_ascii();
            if trimmed.is_empty() {
                continue;
            }
            let digits = trimmed
                .strip_prefix(b"0x")
                .or_else(|| trimmed.strip_prefix(b"0X"))
                .unwrap_or(trimmed);
            return Some(parse_hex_address(digits).map_err(|kind| TraceError { line: index + 1, kind }));
        }
        None
    }
}

/// Reads a whole trace, stopping at the first malformed line
pub fn parse_trace(bytes: &[u8]) -> Result<Vec<u64>, TraceError> {
    TraceAddresses::new(bytes).collect()
}
