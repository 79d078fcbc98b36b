//! # Reaction Image Specification
//!
//! Binary layout of the region appended to the prebuilt reactor executable.
//! The runtime reads three sections back to back, in this order:
//!
//! ```text
//! [settings:u32][atoms section][reaction section]
//! ```
//!
//! ## Key Features
//! - Little-endian integers throughout
//! - Fixed-width, zero-terminated string fields (64 and 260 bytes)
//! - Self-framing records: every atom and quark carries a size prefix so a
//!   reader can skip records it does not understand
//! - Closed [`Quark`] sum type covering every primitive action the runtime replays

pub mod config;
pub mod encoding;
pub mod error;
pub mod field;
pub mod argv;
pub mod quark;
pub mod record;

pub use config::Settings;
pub use error::{LayoutError, Result};
pub use field::{FixedStr, NameField, PathField, TagField};
pub use argv::{decode_argv, encode_argv};
pub use quark::{FileOpKind, ForkMethod, Method, Protocol, Quark, Socket, SocketMethod};
pub use record::{Atom, AtomHeader, AtomsHeader, Image, QuarkHeader, Reaction, ReactionHeader};

/// Width of atom names, reaction names, quark tags, and chown user/group fields
pub const NAME_WIDTH: usize = 64;

/// Width of every path field
pub const PATH_WIDTH: usize = 260;

/// Longest name that fits a [`NAME_WIDTH`] field once the terminator is added
pub const MAX_NAME_LEN: usize = NAME_WIDTH - 1;

/// Longest path that fits a [`PATH_WIDTH`] field once the terminator is added
pub const MAX_PATH_LEN: usize = PATH_WIDTH - 1;
