//! Fixed-width string fields
//!
//! A field of width `N` holds the UTF-8 bytes of a string, a zero terminator,
//! and zero padding up to `N`. A string whose encoding plus terminator does not
//! fit is rejected; it is never truncated.

use crate::error::{LayoutError, Result};
use crate::{NAME_WIDTH, PATH_WIDTH};
use std::fmt;

/// Zero-terminated string packed into exactly `N` bytes
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct FixedStr<const N: usize> {
    bytes: [u8; N],
    len: usize,
}

/// Atom name, reaction name, and chown user/group field
pub type NameField = FixedStr<NAME_WIDTH>;

/// Quark type tag field
pub type TagField = FixedStr<NAME_WIDTH>;

/// Path field
pub type PathField = FixedStr<PATH_WIDTH>;

impl<const N: usize> FixedStr<N> {
    /// Field width in bytes
    pub const WIDTH: usize = N;

    /// Pack a string, failing with `FieldOverflow` if `len + 1 > N`
    pub fn new(value: &str) -> Result<Self> {
        let raw = value.as_bytes();
        if raw.contains(&0) {
            return Err(LayoutError::InteriorNul(value.to_string()));
        }
        if raw.len() + 1 > N {
            return Err(LayoutError::FieldOverflow {
                len: raw.len(),
                width: N,
            });
        }

        let mut bytes = [0u8; N];
        bytes[..raw.len()].copy_from_slice(raw);
        Ok(Self {
            bytes,
            len: raw.len(),
        })
    }

    /// Empty field (all zero bytes)
    pub const fn empty() -> Self {
        Self {
            bytes: [0u8; N],
            len: 0,
        }
    }

    pub fn as_str(&self) -> &str {
        // Only constructed from &str or validated UTF-8.
        std::str::from_utf8(&self.bytes[..self.len]).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn to_bytes(&self) -> [u8; N] {
        self.bytes
    }

    /// Unpack a field from the first `N` bytes of `bytes`
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < N {
            return Err(LayoutError::Truncated {
                expected: N,
                found: bytes.len(),
            });
        }

        let field = &bytes[..N];
        let len = field
            .iter()
            .position(|&b| b == 0)
            .ok_or(LayoutError::MissingTerminator { width: N })?;
        std::str::from_utf8(&field[..len]).map_err(|_| LayoutError::InvalidUtf8)?;

        let mut packed = [0u8; N];
        packed[..len].copy_from_slice(&field[..len]);
        Ok(Self { bytes: packed, len })
    }
}

impl<const N: usize> fmt::Debug for FixedStr<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FixedStr<{}>({:?})", N, self.as_str())
    }
}

impl<const N: usize> fmt::Display for FixedStr<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_name_overflow_iff_too_long(s in "[^\\x00]{0,80}") {
            let result = NameField::new(&s);
            prop_assert_eq!(result.is_err(), s.len() + 1 > NAME_WIDTH);
        }

        #[test]
        fn test_path_overflow_iff_too_long(s in "[a-z/\u{e9}]{200,300}") {
            match PathField::new(&s) {
                Ok(field) => {
                    prop_assert!(s.len() < PATH_WIDTH);
                    prop_assert_eq!(field.as_str(), s.as_str());
                }
                Err(LayoutError::FieldOverflow { len, width }) => {
                    prop_assert_eq!(len, s.len());
                    prop_assert_eq!(width, PATH_WIDTH);
                    prop_assert!(s.len() + 1 > PATH_WIDTH);
                }
                Err(other) => prop_assert!(false, "unexpected error: {}", other),
            }
        }

        #[test]
        fn test_field_bytes_roundtrip(s in "[a-zA-Z0-9 _./-]{0,63}") {
            let field = NameField::new(&s).unwrap();
            let decoded = NameField::from_bytes(&field.to_bytes()).unwrap();
            prop_assert_eq!(decoded.as_str(), s.as_str());
        }
    }
}
