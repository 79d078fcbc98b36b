//! Atom and reaction parsing
//!
//! Turns decoded JSON into the [`Atom`], [`Quark`] and [`Reaction`] model.
//! Shape errors are reported here; fixed-width overflow is left to the encoder.

use crate::decoder::OrderedObject;
use crate::error::{CompileError, Result};
use crate::unescape::unescape;
use reactor_spec::encoding::MAX_MODE;
use reactor_spec::{Atom, FileOpKind, ForkMethod, Method, Protocol, Quark, Reaction, Socket, SocketMethod};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fmt;
use std::path::Path;
use tracing::debug;

/// Every key accepted as a quark in an atom definition
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum QuarkKind {
    Execve,
    Execveat,
    ForkAndRename,
    ForkAndRenameX86,
    Connect,
    Listen,
    Copy,
    Remove,
    Chown,
    Fchown,
    Fchownat,
    Lchown,
    Chmod,
    Fchmod,
    Fchmodat,
    FileTouch,
    FileAppend,
    FilePrepend,
    FileCreate,
    Sleep,
}

impl QuarkKind {
    pub const ALL: [QuarkKind; 20] = [
        QuarkKind::Execve,
        QuarkKind::Execveat,
        QuarkKind::ForkAndRename,
        QuarkKind::ForkAndRenameX86,
        QuarkKind::Connect,
        QuarkKind::Listen,
        QuarkKind::Copy,
        QuarkKind::Remove,
        QuarkKind::Chown,
        QuarkKind::Fchown,
        QuarkKind::Fchownat,
        QuarkKind::Lchown,
        QuarkKind::Chmod,
        QuarkKind::Fchmod,
        QuarkKind::Fchmodat,
        QuarkKind::FileTouch,
        QuarkKind::FileAppend,
        QuarkKind::FilePrepend,
        QuarkKind::FileCreate,
        QuarkKind::Sleep,
    ];

    pub const fn key(self) -> &'static str {
        match self {
            QuarkKind::Execve => "execve",
            QuarkKind::Execveat => "execveat",
            QuarkKind::ForkAndRename => "fork-and-rename",
            QuarkKind::ForkAndRenameX86 => "fork-and-rename-x86",
            QuarkKind::Connect => "connect",
            QuarkKind::Listen => "listen",
            QuarkKind::Copy => "copy",
            QuarkKind::Remove => "remove",
            QuarkKind::Chown => "chown",
            QuarkKind::Fchown => "fchown",
            QuarkKind::Fchownat => "fchownat",
            QuarkKind::Lchown => "lchown",
            QuarkKind::Chmod => "chmod",
            QuarkKind::Fchmod => "fchmod",
            QuarkKind::Fchmodat => "fchmodat",
            QuarkKind::FileTouch => "file-touch",
            QuarkKind::FileAppend => "file-append",
            QuarkKind::FilePrepend => "file-prepend",
            QuarkKind::FileCreate => "file-create",
            QuarkKind::Sleep => "sleep",
        }
    }

    /// Look up a key, ignoring ASCII case
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.key().eq_ignore_ascii_case(key))
    }
}

impl fmt::Display for QuarkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Parse one atom object; `name` is held aside and every other key is a quark
pub fn parse_atom(object: &OrderedObject) -> Result<Atom> {
    let name = atom_name(object)?;
    let mut atom = Atom::new(name.clone());

    for (key, value) in object.entries() {
        if key.eq_ignore_ascii_case("name") {
            continue;
        }
        let kind = QuarkKind::from_key(key).ok_or_else(|| CompileError::UnknownQuarkKind {
            atom: name.clone(),
            key: key.clone(),
        })?;
        atom.quarks.push(parse_quark(&name, kind, value)?);
    }

    Ok(atom)
}

fn atom_name(object: &OrderedObject) -> Result<String> {
    let mut names = object.get_all("name");
    let value = names
        .next()
        .ok_or_else(|| CompileError::MalformedInput("atom definition has no \"name\"".to_string()))?;
    let name = value
        .as_str()
        .ok_or_else(|| CompileError::MalformedInput(format!("atom name must be a string, got {value}")))?;
    if names.next().is_some() {
        return Err(CompileError::MalformedInput(format!(
            "atom {name:?} has more than one \"name\""
        )));
    }
    if name.is_empty() {
        return Err(CompileError::MalformedInput("atom name is empty".to_string()));
    }
    Ok(name.to_string())
}

/// Parse the value of a single quark key
pub fn parse_quark(atom: &str, kind: QuarkKind, value: &Value) -> Result<Quark> {
    let key = kind.key();
    debug!(atom, quark = key, "parsing quark");

    match kind {
        QuarkKind::Execve => Ok(Quark::Exec {
            method: Method::Path,
            argv: non_empty_list(atom, key, value)?,
        }),
        QuarkKind::Execveat => Ok(Quark::Exec {
            method: Method::AtDescriptor,
            argv: non_empty_list(atom, key, value)?,
        }),
        QuarkKind::ForkAndRename => Ok(Quark::ForkAndRename {
            method: ForkMethod::Default,
            argv: non_empty_list(atom, key, value)?,
        }),
        QuarkKind::ForkAndRenameX86 => Ok(Quark::ForkAndRename {
            method: ForkMethod::X86,
            argv: non_empty_list(atom, key, value)?,
        }),
        QuarkKind::Connect => Ok(Quark::Connect(parse_socket(atom, key, value)?)),
        QuarkKind::Listen => Ok(Quark::Listen(parse_socket(atom, key, value)?)),
        QuarkKind::Copy => {
            let mut paths = string_list(atom, key, value)?;
            if paths.len() != 2 {
                return Err(CompileError::invalid(
                    atom,
                    key,
                    format!("expected exactly 2 paths, got {}", paths.len()),
                ));
            }
            let destination = paths.pop().unwrap_or_default();
            let source = paths.pop().unwrap_or_default();
            Ok(Quark::Copy { source, destination })
        }
        QuarkKind::Remove => Ok(Quark::Remove {
            paths: non_empty_list(atom, key, value)?,
        }),
        QuarkKind::Chown => parse_chown(atom, key, Method::Path, value),
        QuarkKind::Fchown => parse_chown(atom, key, Method::Descriptor, value),
        QuarkKind::Fchownat => parse_chown(atom, key, Method::AtDescriptor, value),
        QuarkKind::Lchown => parse_chown(atom, key, Method::DontFollow, value),
        QuarkKind::Chmod => parse_chmod(atom, key, Method::Path, value),
        QuarkKind::Fchmod => parse_chmod(atom, key, Method::Descriptor, value),
        QuarkKind::Fchmodat => parse_chmod(atom, key, Method::AtDescriptor, value),
        QuarkKind::FileTouch => parse_file_op(atom, key, FileOpKind::Touch, value),
        QuarkKind::FileAppend => parse_file_op(atom, key, FileOpKind::Append, value),
        QuarkKind::FilePrepend => parse_file_op(atom, key, FileOpKind::Prepend, value),
        QuarkKind::FileCreate => parse_file_op(atom, key, FileOpKind::Create, value),
        QuarkKind::Sleep => {
            let seconds = value
                .as_u64()
                .filter(|&s| s > 0)
                .and_then(|s| u32::try_from(s).ok())
                .ok_or_else(|| {
                    CompileError::invalid(atom, key, format!("expected a positive integer, got {value}"))
                })?;
            Ok(Quark::Sleep { seconds })
        }
    }
}

// ============================================================================
// Value Shape Helpers
// ============================================================================

fn checked_str(atom: &str, key: &str, what: &str, value: &str) -> Result<String> {
    if value.contains('\0') {
        return Err(CompileError::invalid(atom, key, format!("{what} contains a NUL byte")));
    }
    Ok(value.to_string())
}

fn string_list(atom: &str, key: &str, value: &Value) -> Result<Vec<String>> {
    let items = value
        .as_array()
        .ok_or_else(|| CompileError::invalid(atom, key, format!("expected a list of strings, got {value}")))?;

    items
        .iter()
        .map(|item| match item.as_str() {
            Some("") => Err(CompileError::invalid(atom, key, "list contains an empty string")),
            Some(s) => checked_str(atom, key, "list element", s),
            None => Err(CompileError::invalid(
                atom,
                key,
                format!("expected a list of strings, found element {item}"),
            )),
        })
        .collect()
}

fn non_empty_list(atom: &str, key: &str, value: &Value) -> Result<Vec<String>> {
    let list = string_list(atom, key, value)?;
    if list.is_empty() {
        return Err(CompileError::invalid(atom, key, "list must not be empty"));
    }
    Ok(list)
}

fn object<'a>(atom: &str, key: &str, value: &'a Value) -> Result<&'a Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| CompileError::invalid(atom, key, format!("expected an object, got {value}")))
}

fn optional_str(atom: &str, key: &str, fields: &Map<String, Value>, field: &str) -> Result<Option<String>> {
    match fields.get(field) {
        None => Ok(None),
        Some(Value::String(s)) => checked_str(atom, key, field, s).map(Some),
        Some(other) => Err(CompileError::invalid(
            atom,
            key,
            format!("\"{field}\" must be a string, got {other}"),
        )),
    }
}

fn required_str(atom: &str, key: &str, fields: &Map<String, Value>, field: &str) -> Result<String> {
    optional_str(atom, key, fields, field)?
        .ok_or_else(|| CompileError::invalid(atom, key, format!("missing \"{field}\"")))
}

fn required_path(atom: &str, key: &str, fields: &Map<String, Value>) -> Result<String> {
    let path = required_str(atom, key, fields, "path")?;
    if path.is_empty() {
        return Err(CompileError::invalid(atom, key, "\"path\" must not be empty"));
    }
    Ok(path)
}

// ============================================================================
// Kind-specific Parsers
// ============================================================================

fn parse_socket(atom: &str, key: &str, value: &Value) -> Result<Socket> {
    let fields = object(atom, key, value)?;

    let method_name = required_str(atom, key, fields, "method")?;
    let method = SocketMethod::from_name(&method_name).ok_or_else(|| {
        CompileError::invalid(atom, key, format!("unknown method {method_name:?}, expected syscall or socketcall"))
    })?;

    let protocol_name = required_str(atom, key, fields, "protocol")?;
    let protocol = Protocol::from_name(&protocol_name).ok_or_else(|| {
        CompileError::invalid(
            atom,
            key,
            format!("unknown protocol {protocol_name:?}, expected tcp4, tcp6, udp4 or udp6"),
        )
    })?;

    let port = match fields.get("port") {
        Some(Value::Number(n)) => n.as_u64().and_then(|p| u16::try_from(p).ok()),
        Some(Value::String(s)) => s.trim().parse::<u16>().ok(),
        _ => None,
    }
    .ok_or_else(|| CompileError::invalid(atom, key, "\"port\" must be an integer in 0..=65535"))?;

    let address = required_str(atom, key, fields, "address")?;
    if address.is_empty() {
        return Err(CompileError::invalid(atom, key, "\"address\" must not be empty"));
    }

    Ok(Socket {
        method,
        protocol,
        port,
        address,
    })
}

fn parse_chown(atom: &str, key: &str, method: Method, value: &Value) -> Result<Quark> {
    let fields = object(atom, key, value)?;
    Ok(Quark::Chown {
        method,
        user: optional_str(atom, key, fields, "user")?.unwrap_or_default(),
        group: optional_str(atom, key, fields, "group")?.unwrap_or_default(),
        path: required_path(atom, key, fields)?,
    })
}

fn parse_chmod(atom: &str, key: &str, method: Method, value: &Value) -> Result<Quark> {
    let fields = object(atom, key, value)?;
    let mode = match fields.get("mode") {
        Some(Value::String(s)) => parse_octal_mode(s),
        // 755 written as a number still means rwxr-xr-x
        Some(Value::Number(n)) => n.as_u64().and_then(|n| parse_octal_mode(&n.to_string())),
        _ => None,
    }
    .ok_or_else(|| {
        CompileError::invalid(atom, key, "\"mode\" must be an octal permission such as \"755\"")
    })?;

    Ok(Quark::Chmod {
        method,
        mode,
        path: required_path(atom, key, fields)?,
    })
}

/// Read a permission mode as base 8
pub fn parse_octal_mode(text: &str) -> Option<u32> {
    let text = text.trim();
    let digits = text
        .strip_prefix("0o")
        .or_else(|| text.strip_prefix("0O"))
        .unwrap_or(text);
    if digits.is_empty() || !digits.bytes().all(|b| (b'0'..=b'7').contains(&b)) {
        return None;
    }
    u32::from_str_radix(digits, 8).ok().filter(|&mode| mode <= MAX_MODE)
}

fn parse_file_op(atom: &str, key: &str, kind: FileOpKind, value: &Value) -> Result<Quark> {
    let fields = object(atom, key, value)?;
    let path = required_path(atom, key, fields)?;

    let backup_and_revert = match fields.get("backup-and-revert") {
        None => false,
        Some(Value::Bool(b)) => *b,
        Some(other) => {
            return Err(CompileError::invalid(
                atom,
                key,
                format!("\"backup-and-revert\" must be a boolean, got {other}"),
            ))
        }
    };

    let data = match fields.get("data") {
        None => Vec::new(),
        Some(_) if kind == FileOpKind::Touch => {
            return Err(CompileError::invalid(atom, key, "file-touch does not take \"data\""));
        }
        Some(Value::String(s)) => resolve_data(atom, key, s)?,
        Some(other) => {
            return Err(CompileError::invalid(
                atom,
                key,
                format!("\"data\" must be a string, got {other}"),
            ))
        }
    };

    Ok(Quark::FileOp {
        kind,
        backup_and_revert,
        path,
        data,
    })
}

/// File contents if `data` names a regular file on this host, else the unescaped literal
pub fn resolve_data(atom: &str, key: &str, data: &str) -> Result<Vec<u8>> {
    let path = Path::new(data);
    if !data.is_empty() && path.is_file() {
        debug!(atom, quark = key, path = %path.display(), "reading file-op data from file");
        return std::fs::read(path).map_err(|e| {
            CompileError::invalid(atom, key, format!("cannot read data file {}: {e}", path.display()))
        });
    }

    unescape(data).map_err(|e| CompileError::invalid(atom, key, format!("bad escape in \"data\": {e}")))
}

// ============================================================================
// Reaction
// ============================================================================

#[derive(Deserialize)]
struct ReactionSource {
    name: String,
    atoms: Vec<String>,
}

/// Parse the reaction file: `{"name": ..., "atoms": [...]}`
pub fn parse_reaction(source: &str) -> Result<Reaction> {
    let parsed: ReactionSource = serde_json::from_str(source)
        .map_err(|e| CompileError::MalformedInput(format!("reaction: {e}")))?;

    if parsed.name.is_empty() {
        return Err(CompileError::MalformedInput("reaction name is empty".to_string()));
    }
    if parsed.atoms.is_empty() {
        return Err(CompileError::MalformedInput(format!(
            "reaction {:?} lists no atoms",
            parsed.name
        )));
    }
    if let Some(bad) = parsed.atoms.iter().find(|a| a.is_empty() || a.contains('\0')) {
        return Err(CompileError::MalformedInput(format!(
            "reaction {:?} has an invalid atom reference {bad:?}",
            parsed.name
        )));
    }

    Ok(Reaction {
        name: parsed.name,
        atoms: parsed.atoms,
    })
}
