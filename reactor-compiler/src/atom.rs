//! Atom record assembly
//!
//! Wraps every quark payload as `size + tag + payload` in declaration order,
//! then prefixes the whole atom with `total_size + name + quark_count`.

use crate::encoder::encode;
use crate::error::{CompileError, Result};
use reactor_spec::record::size_prefix;
use reactor_spec::{Atom, AtomHeader, NameField, Quark, QuarkHeader};
use tracing::{debug, warn};

/// Encode one quark record: `size:u32 + tag:64 + payload`
pub fn compile_quark(atom: &str, quark: &Quark) -> Result<Vec<u8>> {
    let payload = encode(atom, quark)?;
    let header = QuarkHeader::new(quark.tag(), payload.len())?;

    let mut record = Vec::with_capacity(QuarkHeader::SIZE + payload.len());
    record.extend_from_slice(&header.to_bytes());
    record.extend_from_slice(&payload);
    Ok(record)
}

/// Encode one atom record
pub fn compile_atom(atom: &Atom) -> Result<Vec<u8>> {
    let name = NameField::new(&atom.name)
        .map_err(|e| CompileError::packing(format!("atom {:?}", atom.name), "atom name", e))?;

    if atom.quarks.is_empty() {
        warn!(atom = %atom.name, "atom has no quarks");
    }

    let mut body = Vec::new();
    for (index, quark) in atom.quarks.iter().enumerate() {
        let record = compile_quark(&atom.name, quark)?;
        debug!(atom = %atom.name, index, quark = quark.key(), bytes = record.len(), "encoded quark");
        body.extend_from_slice(&record);
    }

    let quark_count = u32::try_from(atom.quarks.len())
        .map_err(|_| CompileError::MalformedInput(format!("atom {:?} has too many quarks", atom.name)))?;
    let header = AtomHeader {
        total_size: size_prefix("atom", AtomHeader::SIZE + body.len())?,
        name,
        quark_count,
    };

    let mut record = Vec::with_capacity(AtomHeader::SIZE + body.len());
    record.extend_from_slice(&header.to_bytes());
    record.extend_from_slice(&body);
    Ok(record)
}
