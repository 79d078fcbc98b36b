//! Section assembly
//!
//! Appended after the prebuilt executable, in this fixed order:
//! settings, atoms, reaction.

use crate::atom::compile_atom;
use crate::error::{CompileError, Result};
use reactor_spec::record::size_prefix;
use reactor_spec::{Atom, AtomsHeader, Image, NameField, Reaction, ReactionHeader, Settings};
use std::collections::HashSet;
use tracing::{info, warn};

/// Settings section: one u32 bitmask
pub fn encode_settings(settings: Settings) -> [u8; Settings::SIZE] {
    settings.to_bytes()
}

/// Atoms section: `total_size + atom_count + atom records`
pub fn encode_atoms(atoms: &[Atom]) -> Result<Vec<u8>> {
    let mut seen = HashSet::new();
    let mut body = Vec::new();

    for atom in atoms {
        if !seen.insert(atom.name.as_str()) {
            warn!(atom = %atom.name, "duplicate atom name");
        }
        let record = compile_atom(atom)?;
        info!(atom = %atom.name, quarks = atom.quarks.len(), bytes = record.len(), "compiled atom");
        body.extend_from_slice(&record);
    }

    let atom_count = u32::try_from(atoms.len())
        .map_err(|_| CompileError::MalformedInput("too many atoms".to_string()))?;
    let header = AtomsHeader {
        total_size: size_prefix("atoms section", AtomsHeader::SIZE + body.len())?,
        atom_count,
    };

    let mut section = Vec::with_capacity(AtomsHeader::SIZE + body.len());
    section.extend_from_slice(&header.to_bytes());
    section.extend_from_slice(&body);
    Ok(section)
}

/// Reaction section: `name + atom_count + zero-terminated atom names`
pub fn encode_reaction(reaction: &Reaction) -> Result<Vec<u8>> {
    let owner = format!("reaction {:?}", reaction.name);
    let name = NameField::new(&reaction.name)
        .map_err(|e| CompileError::packing(owner.clone(), "reaction name", e))?;
    let atom_count = u32::try_from(reaction.atoms.len())
        .map_err(|_| CompileError::MalformedInput(format!("{owner} has too many atoms")))?;

    let header = ReactionHeader { name, atom_count };
    let mut section = header.to_bytes().to_vec();
    for atom in &reaction.atoms {
        if atom.is_empty() || atom.contains('\0') {
            return Err(CompileError::MalformedInput(format!(
                "{owner} has an invalid atom reference {atom:?}"
            )));
        }
        section.extend_from_slice(atom.as_bytes());
        section.push(0);
    }

    info!(reaction = %reaction.name, atoms = reaction.atoms.len(), "compiled reaction");
    Ok(section)
}

/// Settings, atoms and reaction sections back to back
pub fn encode_image(image: &Image) -> Result<Vec<u8>> {
    let atoms = encode_atoms(&image.atoms)?;
    let reaction = encode_reaction(&image.reaction)?;

    let mut bytes = Vec::with_capacity(Settings::SIZE + atoms.len() + reaction.len());
    bytes.extend_from_slice(&encode_settings(image.settings));
    bytes.extend_from_slice(&atoms);
    bytes.extend_from_slice(&reaction);
    Ok(bytes)
}

/// Append the encoded image to the prebuilt executable's bytes
pub fn link(prebuilt: &[u8], image: &Image) -> Result<Vec<u8>> {
    let region = encode_image(image)?;
    let mut output = Vec::with_capacity(prebuilt.len() + region.len());
    output.extend_from_slice(prebuilt);
    output.extend_from_slice(&region);
    info!(
        prebuilt = prebuilt.len(),
        appended = region.len(),
        "linked reaction image"
    );
    Ok(output)
}
