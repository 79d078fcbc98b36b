//! # Encoding Constants and Helpers
//!
//! Numeric values the reactor runtime expects, plus a little-endian cursor
//! used by every `from_bytes` in this crate.
//!
//! ## Quark Record (little-endian)
//!
//! ```text
//! [size:u32][tag:64][payload]      size = 64 + payload length
//! ```

use crate::error::{LayoutError, Result};

// ============================================================================
// Quark Tags
// ============================================================================

pub const TAG_EXEC: &str = "exec";
pub const TAG_FORK_AND_RENAME: &str = "fork-and-rename";
pub const TAG_CONNECT: &str = "connect";
pub const TAG_LISTEN: &str = "listen";
pub const TAG_COPY: &str = "copy";
pub const TAG_REMOVE: &str = "remove";
pub const TAG_CHOWN: &str = "chown";
pub const TAG_CHMOD: &str = "chmod";
pub const TAG_FILE_OP: &str = "file-op";
pub const TAG_SLEEP: &str = "sleep";

// ============================================================================
// Method Enumeration (exec, chown, chmod)
// ============================================================================

/// Operate on a path
pub const METHOD_PATH: u32 = 1;

/// Operate relative to a directory descriptor (`*at` variants)
pub const METHOD_AT_DESCRIPTOR: u32 = 2;

/// Operate on an open descriptor (`f*` variants)
pub const METHOD_DESCRIPTOR: u32 = 3;

/// Operate on the link itself (`l*` variants)
pub const METHOD_DONT_FOLLOW: u32 = 4;

/// fork-and-rename through the x86 code path
pub const FORK_METHOD_X86: u32 = 1;

/// fork-and-rename through the default code path
pub const FORK_METHOD_DEFAULT: u32 = 2;

pub const SOCKET_METHOD_SYSCALL: u32 = 1;
pub const SOCKET_METHOD_SOCKETCALL: u32 = 2;

// ============================================================================
// Socket Type Bits
// ============================================================================

pub const SOCKET_TCP: u32 = 1;
pub const SOCKET_UDP: u32 = 2;
pub const SOCKET_IPV4: u32 = 4;
pub const SOCKET_IPV6: u32 = 8;

/// Transport bits (TCP or UDP)
pub const SOCKET_TRANSPORT_MASK: u32 = SOCKET_TCP | SOCKET_UDP;

/// Address family bits (IPv4 or IPv6)
pub const SOCKET_FAMILY_MASK: u32 = SOCKET_IPV4 | SOCKET_IPV6;

// ============================================================================
// File Operation Flags
// ============================================================================

pub const FILE_OP_CREATE: u32 = 1;
pub const FILE_OP_TRUNCATE: u32 = 2;
pub const FILE_OP_PREPEND: u32 = 4;
pub const FILE_OP_APPEND: u32 = 8;
pub const FILE_OP_EXCL: u32 = 16;
pub const FILE_OP_BACKUP_AND_REVERT: u32 = 32;
pub const FILE_OP_NO_DATA: u32 = 64;

/// Modifier bits that may be ORed onto any file-op kind
pub const FILE_OP_MODIFIER_MASK: u32 = FILE_OP_BACKUP_AND_REVERT | FILE_OP_NO_DATA;

// ============================================================================
// Settings Bits
// ============================================================================

pub const SETTING_SUPPRESS_BANNER: u32 = 1 << 0;
pub const SETTING_SUPPRESS_WORD_EXPANSION: u32 = 1 << 1;

/// All settings bits the runtime recognizes
pub const SETTINGS_MASK: u32 = SETTING_SUPPRESS_BANNER | SETTING_SUPPRESS_WORD_EXPANSION;

/// Largest permission mode accepted by chmod quarks
pub const MAX_MODE: u32 = 0o7777;

// ============================================================================
// Byte Reader
// ============================================================================

/// Little-endian cursor over an encoded region
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    /// Bytes consumed so far
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left to consume
    #[inline]
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Take the next `len` bytes
    pub fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        if self.remaining() < len {
            return Err(LayoutError::Truncated {
                expected: self.pos + len,
                found: self.bytes.len(),
            });
        }
        let slice = &self.bytes[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        let b = self.take(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Read a zero-terminated UTF-8 string, consuming the terminator
    pub fn read_cstr(&mut self) -> Result<String> {
        let rest = &self.bytes[self.pos..];
        let end = rest
            .iter()
            .position(|&b| b == 0)
            .ok_or(LayoutError::MissingTerminator { width: rest.len() })?;
        let value = std::str::from_utf8(&rest[..end]).map_err(|_| LayoutError::InvalidUtf8)?;
        self.pos += end + 1;
        Ok(value.to_string())
    }

    /// Everything not yet consumed
    pub fn rest(&mut self) -> &'a [u8] {
        let slice = &self.bytes[self.pos..];
        self.pos = self.bytes.len();
        slice
    }
}
