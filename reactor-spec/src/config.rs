//! # Runtime Settings
//!
//! The settings section is a single little-endian `u32` bitmask read by the
//! runtime before anything else in the appended region.

use crate::encoding::{SETTINGS_MASK, SETTING_SUPPRESS_BANNER, SETTING_SUPPRESS_WORD_EXPANSION};
use crate::error::{LayoutError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Runtime behavior switches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Settings {
    bits: u32,
}

impl Settings {
    /// Banner shown, exec arguments word-expanded
    pub const DEFAULT: Self = Self { bits: 0 };

    /// Encoded size in bytes
    pub const SIZE: usize = 4;

    pub const fn new(suppress_banner: bool, suppress_word_expansion: bool) -> Self {
        Self::DEFAULT
            .with_suppress_banner(suppress_banner)
            .with_suppress_word_expansion(suppress_word_expansion)
    }

    pub const fn with_suppress_banner(self, enabled: bool) -> Self {
        self.with_bit(SETTING_SUPPRESS_BANNER, enabled)
    }

    pub const fn with_suppress_word_expansion(self, enabled: bool) -> Self {
        self.with_bit(SETTING_SUPPRESS_WORD_EXPANSION, enabled)
    }

    const fn with_bit(self, bit: u32, enabled: bool) -> Self {
        let bits = if enabled { self.bits | bit } else { self.bits & !bit };
        Self { bits }
    }

    #[inline]
    pub const fn suppress_banner(&self) -> bool {
        self.bits & SETTING_SUPPRESS_BANNER != 0
    }

    #[inline]
    pub const fn suppress_word_expansion(&self) -> bool {
        self.bits & SETTING_SUPPRESS_WORD_EXPANSION != 0
    }

    #[inline]
    pub const fn bits(&self) -> u32 {
        self.bits
    }

    /// Build from a raw bitmask, rejecting bits the runtime does not know
    pub fn from_bits(bits: u32) -> Result<Self> {
        if bits & !SETTINGS_MASK != 0 {
            return Err(LayoutError::InvalidValue {
                field: "settings",
                value: bits,
            });
        }
        Ok(Self { bits })
    }

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        self.bits.to_le_bytes()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < Self::SIZE {
            return Err(LayoutError::Truncated {
                expected: Self::SIZE,
                found: bytes.len(),
            });
        }
        Self::from_bits(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }
}

impl TryFrom<u32> for Settings {
    type Error = LayoutError;

    fn try_from(bits: u32) -> Result<Self> {
        Self::from_bits(bits)
    }
}

impl From<Settings> for u32 {
    fn from(settings: Settings) -> Self {
        settings.bits
    }
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "banner={} wordexp={}",
            if self.suppress_banner() { "off" } else { "on" },
            if self.suppress_word_expansion() { "off" } else { "on" },
        )
    }
}
