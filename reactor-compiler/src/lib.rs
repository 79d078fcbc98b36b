//! Reaction Compiler
//!
//! Compile JSON atom definitions and a reaction into the binary sections
//! appended to the prebuilt reaction executable.
//!
//! ## Example
//!
//! ```rust
//! use reactor_compiler::build;
//! use reactor_spec::Settings;
//!
//! let atoms = r#"[{"name": "a1", "sleep": 1, "remove": ["/tmp/x"]}]"#;
//! let reaction = r#"{"name": "r1", "atoms": ["a1"]}"#;
//!
//! let output = build(b"prebuilt", atoms, reaction, Settings::DEFAULT).unwrap();
//! assert!(output.starts_with(b"prebuilt"));
//! ```

pub mod error;
pub mod decoder;
pub mod unescape;
pub mod parser;
pub mod encoder;
pub mod atom;
pub mod section;
pub mod compiler;
pub mod io;

pub use error::{CompileError, Result};
pub use compiler::{build, compile, compile_atoms, compile_reaction};
pub use decoder::{decode_atom_definitions, OrderedObject};
pub use parser::{parse_atom, parse_quark, parse_reaction, QuarkKind};
pub use encoder::encode;
pub use atom::{compile_atom, compile_quark};
pub use section::{encode_atoms, encode_image, encode_reaction, encode_settings, link};
pub use io::{read_prebuilt, write_executable};
