//! # Record Headers and Image Model
//!
//! Binary format of the appended region:
//! ```text
//! Settings section
//!   0x00  4    settings bitmask
//!
//! Atoms section
//!   0x00  4    total_size (covers itself, atom_count and all atom records)
//!   0x04  4    atom_count
//!   0x08  ..   atom records
//!
//! Atom record
//!   0x00  4    total_size (covers the whole record, header included)
//!   0x04  64   name
//!   0x44  4    quark_count
//!   0x48  ..   quark records
//!
//! Quark record
//!   0x00  4    size (tag field + payload)
//!   0x04  64   tag
//!   0x44  ..   payload
//!
//! Reaction section
//!   0x00  64   name
//!   0x40  4    atom_count
//!   0x44  ..   zero-terminated atom names
//! ```

use crate::config::Settings;
use crate::error::{LayoutError, Result};
use crate::field::{NameField, TagField};
use crate::quark::Quark;
use crate::NAME_WIDTH;
use serde::{Deserialize, Serialize};

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

fn check_len(bytes: &[u8], expected: usize) -> Result<()> {
    if bytes.len() < expected {
        return Err(LayoutError::Truncated {
            expected,
            found: bytes.len(),
        });
    }
    Ok(())
}

/// Convert a record length to its u32 size prefix
pub fn size_prefix(record: &'static str, len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| LayoutError::RecordTooLarge { record, len })
}

/// Header of one quark record (68 bytes)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuarkHeader {
    /// Tag field plus payload length
    pub size: u32,

    pub tag: TagField,
}

impl QuarkHeader {
    pub const SIZE: usize = 4 + NAME_WIDTH;

    pub fn new(tag: &str, payload_len: usize) -> Result<Self> {
        Ok(Self {
            size: size_prefix("quark", NAME_WIDTH + payload_len)?,
            tag: TagField::new(tag)?,
        })
    }

    pub fn payload_len(&self) -> usize {
        self.size as usize - NAME_WIDTH
    }

    /// Full record length, size prefix included
    pub fn record_len(&self) -> usize {
        4 + self.size as usize
    }

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..4].copy_from_slice(&self.size.to_le_bytes());
        bytes[4..Self::SIZE].copy_from_slice(&self.tag.to_bytes());
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        check_len(bytes, Self::SIZE)?;
        let size = read_u32(bytes, 0);
        if (size as usize) < NAME_WIDTH {
            return Err(LayoutError::SizeMismatch {
                record: "quark",
                declared: size as usize,
                consumed: NAME_WIDTH,
            });
        }
        Ok(Self {
            size,
            tag: TagField::from_bytes(&bytes[4..])?,
        })
    }
}

/// Header of one atom record (72 bytes)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AtomHeader {
    /// Whole record length, header included
    pub total_size: u32,

    pub name: NameField,

    pub quark_count: u32,
}

impl AtomHeader {
    pub const SIZE: usize = 4 + NAME_WIDTH + 4;

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..4].copy_from_slice(&self.total_size.to_le_bytes());
        bytes[4..4 + NAME_WIDTH].copy_from_slice(&self.name.to_bytes());
        bytes[4 + NAME_WIDTH..Self::SIZE].copy_from_slice(&self.quark_count.to_le_bytes());
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        check_len(bytes, Self::SIZE)?;
        let header = Self {
            total_size: read_u32(bytes, 0),
            name: NameField::from_bytes(&bytes[4..])?,
            quark_count: read_u32(bytes, 4 + NAME_WIDTH),
        };
        if (header.total_size as usize) < Self::SIZE {
            return Err(LayoutError::SizeMismatch {
                record: "atom",
                declared: header.total_size as usize,
                consumed: Self::SIZE,
            });
        }
        Ok(header)
    }
}

/// Header of the atoms section (8 bytes)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AtomsHeader {
    /// Whole section length, header included
    pub total_size: u32,

    pub atom_count: u32,
}

impl AtomsHeader {
    pub const SIZE: usize = 8;

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..4].copy_from_slice(&self.total_size.to_le_bytes());
        bytes[4..8].copy_from_slice(&self.atom_count.to_le_bytes());
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        check_len(bytes, Self::SIZE)?;
        let header = Self {
            total_size: read_u32(bytes, 0),
            atom_count: read_u32(bytes, 4),
        };
        if (header.total_size as usize) < Self::SIZE {
            return Err(LayoutError::SizeMismatch {
                record: "atoms section",
                declared: header.total_size as usize,
                consumed: Self::SIZE,
            });
        }
        Ok(header)
    }
}

/// Header of the reaction section (68 bytes)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReactionHeader {
    pub name: NameField,

    pub atom_count: u32,
}

impl ReactionHeader {
    pub const SIZE: usize = NAME_WIDTH + 4;

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..NAME_WIDTH].copy_from_slice(&self.name.to_bytes());
        bytes[NAME_WIDTH..Self::SIZE].copy_from_slice(&self.atom_count.to_le_bytes());
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        check_len(bytes, Self::SIZE)?;
        Ok(Self {
            name: NameField::from_bytes(bytes)?,
            atom_count: read_u32(bytes, NAME_WIDTH),
        })
    }
}

/// Named, ordered group of quarks
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Atom {
    pub name: String,
    pub quarks: Vec<Quark>,
}

impl Atom {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quarks: Vec::new(),
        }
    }

    pub fn with_quark(mut self, quark: Quark) -> Self {
        self.quarks.push(quark);
        self
    }
}

/// Named, ordered list of atom references
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reaction {
    pub name: String,
    pub atoms: Vec<String>,
}

/// Everything appended after the prebuilt executable
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub settings: Settings,
    pub atoms: Vec<Atom>,
    pub reaction: Reaction,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_sizes() {
        assert_eq!(QuarkHeader::SIZE, 68);
        assert_eq!(AtomHeader::SIZE, 72);
        assert_eq!(AtomsHeader::SIZE, 8);
        assert_eq!(ReactionHeader::SIZE, 68);
    }

    #[test]
    fn test_quark_header_size_covers_tag_and_payload() {
        let header = QuarkHeader::new("sleep", 4).unwrap();
        assert_eq!(header.size, 68);
        assert_eq!(header.payload_len(), 4);
        assert_eq!(header.record_len(), 72);

        let bytes = header.to_bytes();
        assert_eq!(&bytes[0..4], &[68, 0, 0, 0]);
        assert_eq!(&bytes[4..10], b"sleep\0");
    }

    #[test]
    fn test_quark_header_roundtrip() {
        let header = QuarkHeader::new("file-op", 300).unwrap();
        let decoded = QuarkHeader::from_bytes(&header.to_bytes()).unwrap();
        assert_eq!(decoded, header);
    }

    #[test]
    fn test_quark_header_undersized() {
        let mut bytes = QuarkHeader::new("copy", 0).unwrap().to_bytes();
        bytes[0..4].copy_from_slice(&10u32.to_le_bytes());
        assert!(matches!(
            QuarkHeader::from_bytes(&bytes),
            Err(LayoutError::SizeMismatch { record: "quark", .. })
        ));
    }

    #[test]
    fn test_atom_header_layout() {
        let header = AtomHeader {
            total_size: 72,
            name: NameField::new("a1").unwrap(),
            quark_count: 0,
        };
        let bytes = header.to_bytes();
        assert_eq!(&bytes[0..4], &[72, 0, 0, 0]);
        assert_eq!(&bytes[4..7], b"a1\0");
        assert_eq!(&bytes[68..72], &[0, 0, 0, 0]);
        assert_eq!(AtomHeader::from_bytes(&bytes).unwrap(), header);
    }

    #[test]
    fn test_atoms_header_truncated() {
        assert_eq!(
            AtomsHeader::from_bytes(&[8, 0, 0]),
            Err(LayoutError::Truncated { expected: 8, found: 3 })
        );
    }

    #[test]
    fn test_reaction_header_layout() {
        let header = ReactionHeader {
            name: NameField::new("r1").unwrap(),
            atom_count: 2,
        };
        let bytes = header.to_bytes();
        assert_eq!(&bytes[0..3], b"r1\0");
        assert_eq!(&bytes[64..68], &[2, 0, 0, 0]);
        assert_eq!(ReactionHeader::from_bytes(&bytes).unwrap(), header);
    }

    #[test]
    fn test_atom_builder() {
        let atom = Atom::new("a1").with_quark(Quark::Sleep { seconds: 1 });
        assert_eq!(atom.name, "a1");
        assert_eq!(atom.quarks.len(), 1);
    }
}
