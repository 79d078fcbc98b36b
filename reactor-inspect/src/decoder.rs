//! Section decoding
//!
//! Inverse of the compiler's section assembler. Every size prefix is checked
//! against the bytes it claims to cover.

use crate::error::{InspectError, Result};
use reactor_spec::encoding::*;
use reactor_spec::{
    decode_argv, Atom, AtomHeader, AtomsHeader, FileOpKind, ForkMethod, Image, LayoutError,
    Method, NameField, PathField, Protocol, Quark, QuarkHeader, Reaction, ReactionHeader,
    Settings, Socket, SocketMethod, NAME_WIDTH, PATH_WIDTH,
};

type LayoutResult<T> = std::result::Result<T, LayoutError>;

/// Decode a quark payload given its tag
pub fn decode_quark(tag: &str, payload: &[u8]) -> LayoutResult<Quark> {
    let mut reader = ByteReader::new(payload);

    let quark = match tag {
        TAG_EXEC => Quark::Exec {
            method: Method::from_u32(reader.read_u32()?)?,
            argv: read_argv(&mut reader)?,
        },
        TAG_FORK_AND_RENAME => Quark::ForkAndRename {
            method: ForkMethod::from_u32(reader.read_u32()?)?,
            argv: read_argv(&mut reader)?,
        },
        TAG_CONNECT => Quark::Connect(read_socket(&mut reader)?),
        TAG_LISTEN => Quark::Listen(read_socket(&mut reader)?),
        TAG_COPY => {
            read_reserved(&mut reader)?;
            let mut paths = read_argv(&mut reader)?;
            if paths.len() != 2 {
                return Err(LayoutError::InvalidValue {
                    field: "copy path count",
                    value: paths.len() as u32,
                });
            }
            let destination = paths.pop().unwrap_or_default();
            let source = paths.pop().unwrap_or_default();
            Quark::Copy { source, destination }
        }
        TAG_REMOVE => {
            read_reserved(&mut reader)?;
            Quark::Remove {
                paths: read_argv(&mut reader)?,
            }
        }
        TAG_CHOWN => {
            let method = Method::from_u32(reader.read_u32()?)?;
            let user = NameField::from_bytes(reader.take(NAME_WIDTH)?)?;
            let group = NameField::from_bytes(reader.take(NAME_WIDTH)?)?;
            let path = PathField::from_bytes(reader.take(PATH_WIDTH)?)?;
            Quark::Chown {
                method,
                user: user.as_str().to_string(),
                group: group.as_str().to_string(),
                path: path.as_str().to_string(),
            }
        }
        TAG_CHMOD => {
            let method = Method::from_u32(reader.read_u32()?)?;
            let mode = reader.read_u32()?;
            if mode > MAX_MODE {
                return Err(LayoutError::InvalidValue { field: "mode", value: mode });
            }
            let path = PathField::from_bytes(reader.take(PATH_WIDTH)?)?;
            Quark::Chmod {
                method,
                mode,
                path: path.as_str().to_string(),
            }
        }
        TAG_FILE_OP => {
            let flags = reader.read_u32()?;
            let kind = FileOpKind::from_flags(flags)?;
            let path = PathField::from_bytes(reader.take(PATH_WIDTH)?)?;
            let data_len = reader.read_u32()?;
            let data = reader.take(data_len as usize)?.to_vec();
            Quark::FileOp {
                kind,
                backup_and_revert: flags & FILE_OP_BACKUP_AND_REVERT != 0,
                path: path.as_str().to_string(),
                data,
            }
        }
        TAG_SLEEP => Quark::Sleep {
            seconds: reader.read_u32()?,
        },
        other => return Err(LayoutError::UnknownTag(other.to_string())),
    };

    if !reader.is_empty() {
        return Err(LayoutError::SizeMismatch {
            record: "quark",
            declared: payload.len(),
            consumed: reader.position(),
        });
    }
    Ok(quark)
}

fn read_argv(reader: &mut ByteReader<'_>) -> LayoutResult<Vec<String>> {
    let rest = reader.rest();
    let (args, consumed) = decode_argv(rest)?;
    if consumed != rest.len() {
        return Err(LayoutError::SizeMismatch {
            record: "quark",
            declared: rest.len(),
            consumed,
        });
    }
    Ok(args)
}

fn read_reserved(reader: &mut ByteReader<'_>) -> LayoutResult<()> {
    match reader.read_u32()? {
        0 => Ok(()),
        value => Err(LayoutError::InvalidValue { field: "reserved", value }),
    }
}

fn read_socket(reader: &mut ByteReader<'_>) -> LayoutResult<Socket> {
    Ok(Socket {
        method: SocketMethod::from_u32(reader.read_u32()?)?,
        protocol: Protocol::from_socket_type(reader.read_u32()?)?,
        port: reader.read_u16()?,
        address: reader.read_cstr()?,
    })
}

/// Decode one atom record, which must span all of `bytes`
pub fn decode_atom(bytes: &[u8]) -> Result<Atom> {
    let section = |source| InspectError::Section { section: "atom", source };

    let header = AtomHeader::from_bytes(bytes).map_err(section)?;
    let mut atom = Atom::new(header.name.as_str());
    let mut reader = ByteReader::new(&bytes[AtomHeader::SIZE..]);

    for index in 0..header.quark_count as usize {
        let quark_error = |source| InspectError::Quark {
            atom: atom.name.clone(),
            index,
            source,
        };
        let start = reader.position();
        let record = QuarkHeader::from_bytes(&bytes[AtomHeader::SIZE + start..]).map_err(quark_error)?;
        reader.take(QuarkHeader::SIZE).map_err(quark_error)?;
        let payload = reader.take(record.payload_len()).map_err(quark_error)?;
        let quark = decode_quark(record.tag.as_str(), payload).map_err(quark_error)?;
        atom.quarks.push(quark);
    }

    if !reader.is_empty() {
        return Err(section(LayoutError::SizeMismatch {
            record: "atom",
            declared: bytes.len(),
            consumed: AtomHeader::SIZE + reader.position(),
        }));
    }
    Ok(atom)
}

/// Decode the atoms section from the front of `bytes`, returning the bytes consumed
pub fn decode_atoms(bytes: &[u8]) -> Result<(Vec<Atom>, usize)> {
    let section = |source| InspectError::Section { section: "atoms", source };

    let header = AtomsHeader::from_bytes(bytes).map_err(section)?;
    let total = header.total_size as usize;
    let mut reader = ByteReader::new(bytes);
    let body = reader.take(total).map_err(section)?;

    let mut atoms = Vec::new();
    let mut offset = AtomsHeader::SIZE;
    for _ in 0..header.atom_count {
        let atom_header = AtomHeader::from_bytes(&body[offset..])
            .map_err(|source| InspectError::Section { section: "atom", source })?;
        let end = offset + atom_header.total_size as usize;
        if end > total {
            return Err(section(LayoutError::Truncated {
                expected: end,
                found: total,
            }));
        }
        atoms.push(decode_atom(&body[offset..end])?);
        offset = end;
    }

    if offset != total {
        return Err(section(LayoutError::SizeMismatch {
            record: "atoms section",
            declared: total,
            consumed: offset,
        }));
    }
    Ok((atoms, total))
}

/// Decode the reaction section, which must span all of `bytes`
pub fn decode_reaction(bytes: &[u8]) -> Result<Reaction> {
    let section = |source| InspectError::Section { section: "reaction", source };

    let header = ReactionHeader::from_bytes(bytes).map_err(section)?;
    let mut reader = ByteReader::new(&bytes[ReactionHeader::SIZE..]);
    let mut atoms = Vec::new();
    for _ in 0..header.atom_count {
        atoms.push(reader.read_cstr().map_err(section)?);
    }

    if !reader.is_empty() {
        return Err(InspectError::Layout(LayoutError::TrailingBytes(reader.remaining())));
    }
    Ok(Reaction {
        name: header.name.as_str().to_string(),
        atoms,
    })
}

/// Decode a complete appended region: settings, atoms, reaction
pub fn decode_region(bytes: &[u8]) -> Result<Image> {
    let mut reader = ByteReader::new(bytes);
    let settings = reader
        .take(Settings::SIZE)
        .and_then(Settings::from_bytes)
        .map_err(|source| InspectError::Section { section: "settings", source })?;

    let (atoms, consumed) = decode_atoms(&bytes[Settings::SIZE..])?;
    let reaction = decode_reaction(&bytes[Settings::SIZE + consumed..])?;

    Ok(Image {
        settings,
        atoms,
        reaction,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exec_payload() -> Vec<u8> {
        let mut payload = 1u32.to_le_bytes().to_vec();
        payload.extend_from_slice(b"/bin/id\0\0");
        payload
    }

    #[test]
    fn test_decode_sleep() {
        assert_eq!(
            decode_quark(TAG_SLEEP, &[5, 0, 0, 0]).unwrap(),
            Quark::Sleep { seconds: 5 }
        );
    }

    #[test]
    fn test_decode_exec() {
        assert_eq!(
            decode_quark(TAG_EXEC, &exec_payload()).unwrap(),
            Quark::Exec {
                method: Method::Path,
                argv: vec!["/bin/id".to_string()],
            }
        );
    }

    #[test]
    fn test_decode_socket() {
        let mut payload = 1u32.to_le_bytes().to_vec();
        payload.extend_from_slice(&(SOCKET_TCP | SOCKET_IPV4).to_le_bytes());
        payload.extend_from_slice(&80u16.to_le_bytes());
        payload.extend_from_slice(b"127.0.0.1\0");
        assert_eq!(
            decode_quark(TAG_CONNECT, &payload).unwrap(),
            Quark::Connect(Socket {
                method: SocketMethod::Syscall,
                protocol: Protocol::Tcp4,
                port: 80,
                address: "127.0.0.1".to_string(),
            })
        );
    }

    #[test]
    fn test_unknown_tag() {
        assert_eq!(
            decode_quark("mkdir", &[]),
            Err(LayoutError::UnknownTag("mkdir".to_string()))
        );
    }

    #[test]
    fn test_trailing_payload_bytes() {
        let result = decode_quark(TAG_SLEEP, &[5, 0, 0, 0, 0]);
        assert!(matches!(result, Err(LayoutError::SizeMismatch { .. })));

        let mut payload = exec_payload();
        payload.push(b'x');
        assert!(decode_quark(TAG_EXEC, &payload).is_err());
    }

    #[test]
    fn test_truncated_payload() {
        assert!(matches!(
            decode_quark(TAG_SLEEP, &[5, 0]),
            Err(LayoutError::Truncated { .. })
        ));
    }

    #[test]
    fn test_nonzero_reserved_word() {
        let mut payload = 7u32.to_le_bytes().to_vec();
        payload.extend_from_slice(b"/tmp/a\0\0");
        assert_eq!(
            decode_quark(TAG_REMOVE, &payload),
            Err(LayoutError::InvalidValue { field: "reserved", value: 7 })
        );
    }

    #[test]
    fn test_empty_atoms_section() {
        let (atoms, consumed) = decode_atoms(&[8, 0, 0, 0, 0, 0, 0, 0]).unwrap();
        assert!(atoms.is_empty());
        assert_eq!(consumed, 8);
    }

    #[test]
    fn test_atoms_section_size_too_small() {
        let result = decode_atoms(&[4, 0, 0, 0, 0, 0, 0, 0]);
        assert!(matches!(result, Err(InspectError::Section { section: "atoms", .. })));
    }

    #[test]
    fn test_atom_count_beyond_section() {
        let result = decode_atoms(&[8, 0, 0, 0, 0xff, 0xff, 0xff, 0xff]);
        assert!(matches!(result, Err(InspectError::Section { section: "atom", .. })));
    }

    #[test]
    fn test_reaction_count_beyond_section() {
        let mut bytes = ReactionHeader {
            name: NameField::new("r1").unwrap(),
            atom_count: u32::MAX,
        }
        .to_bytes()
        .to_vec();
        bytes.extend_from_slice(b"a1\0");
        assert!(matches!(
            decode_reaction(&bytes),
            Err(InspectError::Section { section: "reaction", .. })
        ));
    }

    #[test]
    fn test_reaction_trailing_bytes() {
        let mut bytes = ReactionHeader {
            name: NameField::new("r1").unwrap(),
            atom_count: 1,
        }
        .to_bytes()
        .to_vec();
        bytes.extend_from_slice(b"a1\0junk");
        assert!(matches!(
            decode_reaction(&bytes),
            Err(InspectError::Layout(LayoutError::TrailingBytes(4)))
        ));
    }
}
