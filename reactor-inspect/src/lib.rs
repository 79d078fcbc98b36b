//! # Reaction Image Inspector
//!
//! Decode the settings, atoms and reaction sections appended to a prebuilt
//! reaction executable, and render them as a listing.
//!
//! The region starts right after the prebuilt bytes, so its offset is the
//! prebuilt executable's length.
//!
//! ## Example
//!
//! ```rust
//! use reactor_inspect::{decode_region, format_image};
//!
//! let region: &[u8] = &[
//!     0, 0, 0, 0,             // settings
//!     8, 0, 0, 0, 0, 0, 0, 0, // empty atoms section
//! #   b'r', b'1', 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
//! #   0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
//! #   0, 0, 1, 0, 0, 0, b'a', b'1', 0,
//! ];
//!
//! let image = decode_region(region).unwrap();
//! println!("{}", format_image(&image));
//! ```

pub mod error;
pub mod decoder;
pub mod formatter;

pub use error::{InspectError, Result};
pub use decoder::{decode_atom, decode_atoms, decode_quark, decode_reaction, decode_region};
pub use formatter::{format_image, format_quark};

/// Decode the region starting at `offset` in a compiled executable and list it
pub fn inspect(bytes: &[u8], offset: usize) -> Result<String> {
    let region = bytes.get(offset..).ok_or(InspectError::OffsetOutOfRange {
        offset,
        len: bytes.len(),
    })?;
    let image = decode_region(region)?;
    Ok(format_image(&image))
}
