//! Main compiler logic

use crate::decoder::decode_atom_definitions;
use crate::error::Result;
use crate::parser::{parse_atom, parse_reaction};
use crate::section::link;
use reactor_spec::{Atom, Image, Reaction, Settings};
use tracing::{debug, info, warn};

/// Compile the atom definitions file into atoms, keeping file order
pub fn compile_atoms(source: &str) -> Result<Vec<Atom>> {
    let objects = decode_atom_definitions(source)?;
    debug!(definitions = objects.len(), "decoded atom definitions");

    objects.iter().map(parse_atom).collect()
}

/// Compile the reaction file
pub fn compile_reaction(source: &str) -> Result<Reaction> {
    parse_reaction(source)
}

/// Compile both inputs into an image
pub fn compile(atoms_source: &str, reaction_source: &str, settings: Settings) -> Result<Image> {
    let atoms = compile_atoms(atoms_source)?;
    let reaction = compile_reaction(reaction_source)?;
    for name in &reaction.atoms {
        if !atoms.iter().any(|atom| &atom.name == name) {
            warn!(reaction = %reaction.name, atom = %name, "reaction references an undefined atom");
        }
    }
    info!(
        atoms = atoms.len(),
        reaction = %reaction.name,
        settings = %settings,
        "compiled definitions"
    );

    Ok(Image {
        settings,
        atoms,
        reaction,
    })
}

/// Compile both inputs and append the encoded sections to `prebuilt`
pub fn build(
    prebuilt: &[u8],
    atoms_source: &str,
    reaction_source: &str,
    settings: Settings,
) -> Result<Vec<u8>> {
    let image = compile(atoms_source, reaction_source, settings)?;
    link(prebuilt, &image)
}
