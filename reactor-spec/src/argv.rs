//! Argument list encoding
//!
//! ```text
//! "ls\0" "-la\0" "/tmp\0" "\0"
//! ```
//!
//! Each string is written as UTF-8 followed by a zero byte; a final zero byte
//! ends the list. Strings must be non-empty and free of NUL bytes, otherwise
//! the list would end early when read back.

use crate::error::{LayoutError, Result};

/// Encode an ordered list of strings into a self-delimiting byte sequence
pub fn encode_argv<S: AsRef<str>>(args: &[S]) -> Result<Vec<u8>> {
    let len = args.iter().map(|a| a.as_ref().len() + 1).sum::<usize>() + 1;
    let mut bytes = Vec::with_capacity(len);

    for arg in args {
        let arg = arg.as_ref();
        if arg.is_empty() {
            return Err(LayoutError::EmptyArgument);
        }
        if arg.as_bytes().contains(&0) {
            return Err(LayoutError::InteriorNul(arg.to_string()));
        }
        bytes.extend_from_slice(arg.as_bytes());
        bytes.push(0);
    }
    bytes.push(0);

    Ok(bytes)
}

/// Decode an argument list, returning the strings and the bytes consumed
pub fn decode_argv(bytes: &[u8]) -> Result<(Vec<String>, usize)> {
    let mut args = Vec::new();
    let mut pos = 0;

    loop {
        let rest = &bytes[pos..];
        let end = rest
            .iter()
            .position(|&b| b == 0)
            .ok_or(LayoutError::MissingTerminator { width: rest.len() })?;

        if end == 0 {
            // Sentinel
            return Ok((args, pos + 1));
        }

        let arg = std::str::from_utf8(&rest[..end]).map_err(|_| LayoutError::InvalidUtf8)?;
        args.push(arg.to_string());
        pos += end + 1;
    }
}
