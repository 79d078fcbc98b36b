//! Backslash escape decoding for literal file-op data
//!
//! Supported escapes: `\\ \' \" \a \b \f \n \r \t \v`, `\xNN`, one to three
//! octal digits, `\uXXXX` and `\UXXXXXXXX`. A backslash followed by a newline
//! is dropped. Any other escape is kept verbatim.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnescapeError {
    #[error("trailing backslash at offset {0}")]
    TrailingBackslash(usize),

    #[error("truncated \\{escape} escape at offset {offset}")]
    TruncatedEscape { escape: char, offset: usize },

    #[error("octal escape at offset {0} exceeds one byte")]
    OctalOutOfRange(usize),

    #[error("escape at offset {0} is not a valid Unicode scalar value")]
    InvalidCodePoint(usize),
}

/// Decode backslash escapes into raw bytes
pub fn unescape(input: &str) -> Result<Vec<u8>, UnescapeError> {
    let mut out = Vec::with_capacity(input.len());
    let mut chars = input.char_indices().peekable();

    while let Some((offset, c)) = chars.next() {
        if c != '\\' {
            let mut buf = [0u8; 4];
            out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            continue;
        }

        let Some((_, escape)) = chars.next() else {
            return Err(UnescapeError::TrailingBackslash(offset));
        };

        match escape {
            '\\' => out.push(b'\\'),
            '\'' => out.push(b'\''),
            '"' => out.push(b'"'),
            'a' => out.push(0x07),
            'b' => out.push(0x08),
            'f' => out.push(0x0C),
            'n' => out.push(b'\n'),
            'r' => out.push(b'\r'),
            't' => out.push(b'\t'),
            'v' => out.push(0x0B),
            '\n' => {}
            '0'..='7' => {
                let mut value = escape.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match chars.peek().and_then(|&(_, d)| d.to_digit(8)) {
                        Some(digit) => {
                            value = value * 8 + digit;
                            chars.next();
                        }
                        None => break,
                    }
                }
                let byte = u8::try_from(value).map_err(|_| UnescapeError::OctalOutOfRange(offset))?;
                out.push(byte);
            }
            'x' => {
                let value = take_hex(&mut chars, 2).ok_or(UnescapeError::TruncatedEscape {
                    escape,
                    offset,
                })?;
                // Two hex digits always fit a byte
                out.push(value as u8);
            }
            'u' | 'U' => {
                let digits = if escape == 'u' { 4 } else { 8 };
                let value = take_hex(&mut chars, digits)
                    .ok_or(UnescapeError::TruncatedEscape { escape, offset })?;
                let c = char::from_u32(value).ok_or(UnescapeError::InvalidCodePoint(offset))?;
                let mut buf = [0u8; 4];
                out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            }
            other => {
                out.push(b'\\');
                let mut buf = [0u8; 4];
                out.extend_from_slice(other.encode_utf8(&mut buf).as_bytes());
            }
        }
    }

    Ok(out)
}

fn take_hex<I>(chars: &mut std::iter::Peekable<I>, digits: usize) -> Option<u32>
where
    I: Iterator<Item = (usize, char)>,
{
    let mut value = 0u32;
    for _ in 0..digits {
        let digit = chars.peek().and_then(|&(_, d)| d.to_digit(16))?;
        chars.next();
        value = value * 16 + digit;
    }
    Some(value)
}
