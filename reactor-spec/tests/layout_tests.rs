//! Layout tests for edge cases not covered in unit tests

use reactor_spec::encoding::*;
use reactor_spec::{
    decode_argv, encode_argv, AtomHeader, AtomsHeader, FileOpKind, LayoutError, NameField,
    PathField, Protocol, QuarkHeader, Settings, MAX_NAME_LEN, MAX_PATH_LEN,
};

// ============================================================================
// Fixed-Width Field Boundaries
// ============================================================================

#[test]
fn test_name_field_boundary() {
    let fits = "x".repeat(MAX_NAME_LEN);
    let field = NameField::new(&fits).unwrap();
    let bytes = field.to_bytes();
    assert_eq!(bytes[MAX_NAME_LEN], 0);
    assert_eq!(NameField::from_bytes(&bytes).unwrap().as_str(), fits);

    assert_eq!(
        NameField::new(&"x".repeat(MAX_NAME_LEN + 1)),
        Err(LayoutError::FieldOverflow { len: 64, width: 64 })
    );
}

#[test]
fn test_path_field_boundary_multibyte() {
    // 129 two-byte characters = 258 bytes, plus terminator fits 260
    let fits = "\u{e9}".repeat(129);
    assert!(PathField::new(&fits).is_ok());

    // 130 of them = 260 bytes, no room for the terminator
    let overflow = "\u{e9}".repeat(130);
    assert_eq!(
        PathField::new(&overflow),
        Err(LayoutError::FieldOverflow { len: 260, width: 260 })
    );
    assert!(PathField::new(&"p".repeat(MAX_PATH_LEN)).is_ok());
}

#[test]
fn test_field_without_terminator() {
    assert_eq!(
        NameField::from_bytes(&[b'a'; 64]),
        Err(LayoutError::MissingTerminator { width: 64 })
    );
}

// ============================================================================
// Argument Lists
// ============================================================================

#[test]
fn test_argv_decode_stops_at_sentinel() {
    let mut bytes = encode_argv(&["a", "bc"]).unwrap();
    bytes.extend_from_slice(b"ignored");
    let (args, consumed) = decode_argv(&bytes).unwrap();
    assert_eq!(args, vec!["a", "bc"]);
    assert_eq!(consumed, 6);
}

#[test]
fn test_argv_without_sentinel() {
    assert!(matches!(
        decode_argv(b"a\0b\0"),
        Err(LayoutError::MissingTerminator { .. })
    ));
}

// ============================================================================
// Bitmasks
// ============================================================================

#[test]
fn test_socket_types_are_distinct() {
    let types: Vec<u32> = [Protocol::Tcp4, Protocol::Tcp6, Protocol::Udp4, Protocol::Udp6]
        .iter()
        .map(|p| p.socket_type())
        .collect();
    for (i, a) in types.iter().enumerate() {
        assert!(a & SOCKET_TRANSPORT_MASK != 0);
        assert!(a & SOCKET_FAMILY_MASK != 0);
        for b in &types[i + 1..] {
            assert_ne!(a, b);
        }
    }
}

#[test]
fn test_file_op_kind_survives_modifiers() {
    for kind in [FileOpKind::Touch, FileOpKind::Create, FileOpKind::Append, FileOpKind::Prepend] {
        let flags = kind.flags() | FILE_OP_BACKUP_AND_REVERT | FILE_OP_NO_DATA;
        assert_eq!(FileOpKind::from_flags(flags).unwrap(), kind);
    }
    assert!(FileOpKind::from_flags(FILE_OP_TRUNCATE).is_err());
}

#[test]
fn test_settings_bits() {
    assert_eq!(Settings::new(true, false).bits(), SETTING_SUPPRESS_BANNER);
    assert_eq!(Settings::new(false, true).bits(), SETTING_SUPPRESS_WORD_EXPANSION);
    assert!(Settings::from_bits(SETTINGS_MASK + 1).is_err());
}

// ============================================================================
// Header Framing
// ============================================================================

#[test]
fn test_quark_header_tag_width() {
    let header = QuarkHeader::new(TAG_FORK_AND_RENAME, 10).unwrap();
    let bytes = header.to_bytes();
    assert_eq!(bytes.len(), 68);
    assert_eq!(&bytes[4..20], b"fork-and-rename\0");
    assert!(bytes[20..].iter().all(|&b| b == 0));
}

#[test]
fn test_atom_header_rejects_undersized_total() {
    let mut bytes = AtomHeader {
        total_size: 72,
        name: NameField::new("a1").unwrap(),
        quark_count: 0,
    }
    .to_bytes();
    bytes[0] = 71;
    assert!(matches!(
        AtomHeader::from_bytes(&bytes),
        Err(LayoutError::SizeMismatch { record: "atom", declared: 71, consumed: 72 })
    ));
}

#[test]
fn test_atoms_header_layout() {
    let header = AtomsHeader {
        total_size: 8,
        atom_count: 0,
    };
    assert_eq!(header.to_bytes(), [8, 0, 0, 0, 0, 0, 0, 0]);
}
