//! Inspection errors

use reactor_spec::LayoutError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InspectError {
    #[error("Region offset {offset} is beyond the end of a {len}-byte file")]
    OffsetOutOfRange { offset: usize, len: usize },

    #[error("Malformed {section} section: {source}")]
    Section {
        section: &'static str,
        #[source]
        source: LayoutError,
    },

    #[error("Malformed quark {index} of atom {atom:?}: {source}")]
    Quark {
        atom: String,
        index: usize,
        #[source]
        source: LayoutError,
    },

    #[error(transparent)]
    Layout(#[from] LayoutError),
}

pub type Result<T> = std::result::Result<T, InspectError>;
