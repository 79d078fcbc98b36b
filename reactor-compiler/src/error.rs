//! Compiler errors

use reactor_spec::LayoutError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Unknown quark kind {key:?} in atom {atom:?}")]
    UnknownQuarkKind { atom: String, key: String },

    #[error("Invalid argument for {key:?} in atom {atom:?}: {message}")]
    InvalidQuarkArgument {
        atom: String,
        key: String,
        message: String,
    },

    #[error("Field overflow in {owner}: {field} is {len} bytes, which with its terminator exceeds {width} bytes")]
    FieldOverflow {
        owner: String,
        field: &'static str,
        len: usize,
        width: usize,
    },

    #[error("Layout error: {0}")]
    Layout(#[from] LayoutError),

    #[error("Prebuilt executable not found: {}", .0.display())]
    MissingPrebuiltArtifact(PathBuf),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl CompileError {
    pub(crate) fn invalid(atom: &str, key: &str, message: impl Into<String>) -> Self {
        CompileError::InvalidQuarkArgument {
            atom: atom.to_string(),
            key: key.to_string(),
            message: message.into(),
        }
    }

    /// Map a failure to pack a fixed-width field, keeping overflow distinct
    pub(crate) fn packing(owner: String, field: &'static str, err: LayoutError) -> Self {
        match err {
            LayoutError::FieldOverflow { len, width } => CompileError::FieldOverflow {
                owner,
                field,
                len,
                width,
            },
            LayoutError::InteriorNul(_) => {
                CompileError::MalformedInput(format!("{field} of {owner} contains a NUL byte"))
            }
            other => CompileError::Layout(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, CompileError>;
