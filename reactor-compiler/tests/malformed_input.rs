//! Tests for malformed input handling in the compiler
//!
//! Every failure aborts the whole compilation with a typed error.

use reactor_compiler::{build, compile_atoms, compile_reaction, CompileError};
use reactor_spec::Settings;

const REACTION: &str = r#"{"name": "r1", "atoms": ["a1"]}"#;

fn atoms_err(source: &str) -> CompileError {
    match compile_atoms(source).and_then(|atoms| reactor_compiler::encode_atoms(&atoms)) {
        Ok(_) => panic!("expected an error for {source}"),
        Err(e) => e,
    }
}

// ============================================================================
// JSON Shape Tests
// ============================================================================

#[test]
fn test_invalid_json() {
    assert!(matches!(atoms_err("[{"), CompileError::MalformedInput(_)));
    assert!(matches!(atoms_err(""), CompileError::MalformedInput(_)));
}

#[test]
fn test_missing_atom_name() {
    assert!(matches!(atoms_err(r#"[{"sleep": 1}]"#), CompileError::MalformedInput(_)));
}

#[test]
fn test_non_string_atom_name() {
    assert!(matches!(atoms_err(r#"[{"name": 7}]"#), CompileError::MalformedInput(_)));
}

#[test]
fn test_reaction_without_atoms() {
    assert!(matches!(
        compile_reaction(r#"{"name": "r1", "atoms": []}"#),
        Err(CompileError::MalformedInput(_))
    ));
    assert!(matches!(
        compile_reaction(r#"{"name": "r1"}"#),
        Err(CompileError::MalformedInput(_))
    ));
}

#[test]
fn test_reaction_without_name() {
    assert!(matches!(
        compile_reaction(r#"{"atoms": ["a1"]}"#),
        Err(CompileError::MalformedInput(_))
    ));
}

// ============================================================================
// Quark Argument Tests
// ============================================================================

#[test]
fn test_unknown_quark_kind() {
    match atoms_err(r#"[{"name": "a1", "mkdir": "/tmp/d"}]"#) {
        CompileError::UnknownQuarkKind { atom, key } => {
            assert_eq!(atom, "a1");
            assert_eq!(key, "mkdir");
        }
        other => panic!("expected UnknownQuarkKind, got {other:?}"),
    }
}

#[test]
fn test_sleep_not_positive() {
    for value in ["0", "-1", "1.5", "\"5\""] {
        let source = format!(r#"[{{"name": "a1", "sleep": {value}}}]"#);
        assert!(
            matches!(atoms_err(&source), CompileError::InvalidQuarkArgument { .. }),
            "sleep: {value}"
        );
    }
}

#[test]
fn test_exec_not_a_list() {
    assert!(matches!(
        atoms_err(r#"[{"name": "a1", "execve": "/bin/sh"}]"#),
        CompileError::InvalidQuarkArgument { .. }
    ));
}

#[test]
fn test_copy_needs_two_paths() {
    assert!(matches!(
        atoms_err(r#"[{"name": "a1", "copy": ["/etc/hosts"]}]"#),
        CompileError::InvalidQuarkArgument { .. }
    ));
    assert!(matches!(
        atoms_err(r#"[{"name": "a1", "copy": ["a", "b", "c"]}]"#),
        CompileError::InvalidQuarkArgument { .. }
    ));
}

#[test]
fn test_bad_chmod_mode() {
    assert!(matches!(
        atoms_err(r#"[{"name": "a1", "chmod": {"path": "/tmp/x", "mode": "789"}}]"#),
        CompileError::InvalidQuarkArgument { .. }
    ));
}

#[test]
fn test_unknown_protocol() {
    assert!(matches!(
        atoms_err(
            r#"[{"name": "a1", "listen": {"method": "syscall", "protocol": "sctp", "port": 1, "address": "::"}}]"#
        ),
        CompileError::InvalidQuarkArgument { .. }
    ));
}

#[test]
fn test_bad_escape_in_data() {
    assert!(matches!(
        atoms_err(r#"[{"name": "a1", "file-create": {"path": "/tmp/x", "data": "bad\\x4"}}]"#),
        CompileError::InvalidQuarkArgument { .. }
    ));
}

// ============================================================================
// Field Overflow Tests
// ============================================================================

#[test]
fn test_atom_name_overflow() {
    let source = format!(r#"[{{"name": "{}"}}]"#, "a".repeat(64));
    match atoms_err(&source) {
        CompileError::FieldOverflow { field, len, width, .. } => {
            assert_eq!(field, "atom name");
            assert_eq!(len, 64);
            assert_eq!(width, 64);
        }
        other => panic!("expected FieldOverflow, got {other:?}"),
    }
}

#[test]
fn test_path_overflow() {
    let source = format!(
        r#"[{{"name": "a1", "chmod": {{"path": "/{}", "mode": "600"}}}}]"#,
        "p".repeat(259)
    );
    assert!(matches!(
        atoms_err(&source),
        CompileError::FieldOverflow { field: "path", width: 260, .. }
    ));
}

#[test]
fn test_reaction_name_overflow() {
    let reaction = format!(r#"{{"name": "{}", "atoms": ["a1"]}}"#, "r".repeat(64));
    let result = build(b"", r#"[{"name": "a1"}]"#, &reaction, Settings::DEFAULT);
    assert!(matches!(
        result,
        Err(CompileError::FieldOverflow { field: "reaction name", .. })
    ));
}

#[test]
fn test_no_partial_output() {
    let result = build(
        b"prebuilt",
        r#"[{"name": "a1", "sleep": 1}, {"name": "a2", "sleep": 0}]"#,
        REACTION,
        Settings::DEFAULT,
    );
    assert!(result.is_err());
}
