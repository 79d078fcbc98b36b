//! Quark payload encoding (little-endian)
//!
//! ```text
//! exec / fork-and-rename  method:u32  argv
//! connect / listen        method:u32  socket_type:u32  port:u16  address\0
//! copy / remove           0:u32       argv
//! chown                   method:u32  user:64  group:64  path:260
//! chmod                   method:u32  mode:u32  path:260
//! file-op                 flags:u32   path:260  data_len:u32  data
//! sleep                   seconds:u32
//! ```

use crate::error::{CompileError, Result};
use reactor_spec::{encode_argv, FixedStr, LayoutError, NameField, PathField, Quark, Socket};

/// Reserved leading word of copy and remove payloads
const RESERVED: u32 = 0;

/// Encode a quark's payload (without its size prefix or tag)
pub fn encode(atom: &str, quark: &Quark) -> Result<Vec<u8>> {
    let mut payload = Vec::new();
    let key = quark.key();

    match quark {
        Quark::Exec { method, argv } => {
            encode_process(&mut payload, atom, key, method.to_u32(), argv)?;
        }
        Quark::ForkAndRename { method, argv } => {
            encode_process(&mut payload, atom, key, method.to_u32(), argv)?;
        }
        Quark::Connect(socket) | Quark::Listen(socket) => {
            encode_socket(&mut payload, atom, key, socket)?;
        }
        Quark::Copy { source, destination } => {
            payload.extend_from_slice(&RESERVED.to_le_bytes());
            payload.extend_from_slice(&argv_bytes(atom, key, &[source, destination])?);
        }
        Quark::Remove { paths } => {
            payload.extend_from_slice(&RESERVED.to_le_bytes());
            payload.extend_from_slice(&argv_bytes(atom, key, paths)?);
        }
        Quark::Chown {
            method,
            user,
            group,
            path,
        } => {
            let user: NameField = pack(atom, "chown user", user)?;
            let group: NameField = pack(atom, "chown group", group)?;
            let path: PathField = pack(atom, "path", path)?;
            payload.extend_from_slice(&method.to_u32().to_le_bytes());
            payload.extend_from_slice(&user.to_bytes());
            payload.extend_from_slice(&group.to_bytes());
            payload.extend_from_slice(&path.to_bytes());
        }
        Quark::Chmod { method, mode, path } => {
            let path: PathField = pack(atom, "path", path)?;
            payload.extend_from_slice(&method.to_u32().to_le_bytes());
            payload.extend_from_slice(&mode.to_le_bytes());
            payload.extend_from_slice(&path.to_bytes());
        }
        Quark::FileOp {
            kind,
            backup_and_revert,
            path,
            data,
        } => {
            let flags = Quark::file_op_flags(*kind, *backup_and_revert, data.len());
            let data_len = u32::try_from(data.len()).map_err(|_| {
                CompileError::invalid(atom, key, format!("data of {} bytes is too large", data.len()))
            })?;
            let path: PathField = pack(atom, "path", path)?;
            payload.extend_from_slice(&flags.to_le_bytes());
            payload.extend_from_slice(&path.to_bytes());
            payload.extend_from_slice(&data_len.to_le_bytes());
            payload.extend_from_slice(data);
        }
        Quark::Sleep { seconds } => {
            if *seconds == 0 {
                return Err(CompileError::invalid(atom, key, "sleep duration must be positive"));
            }
            payload.extend_from_slice(&seconds.to_le_bytes());
        }
    }

    Ok(payload)
}

/// `method:u32 + argv`, shared by exec and fork-and-rename
fn encode_process(payload: &mut Vec<u8>, atom: &str, key: &str, method: u32, argv: &[String]) -> Result<()> {
    payload.extend_from_slice(&method.to_le_bytes());
    payload.extend_from_slice(&argv_bytes(atom, key, argv)?);
    Ok(())
}

fn encode_socket(payload: &mut Vec<u8>, atom: &str, key: &str, socket: &Socket) -> Result<()> {
    if socket.address.is_empty() || socket.address.contains('\0') {
        return Err(CompileError::invalid(
            atom,
            key,
            format!("invalid address {:?}", socket.address),
        ));
    }
    payload.extend_from_slice(&socket.method.to_u32().to_le_bytes());
    payload.extend_from_slice(&socket.protocol.socket_type().to_le_bytes());
    payload.extend_from_slice(&socket.port.to_le_bytes());
    payload.extend_from_slice(socket.address.as_bytes());
    payload.push(0);
    Ok(())
}

fn argv_bytes<S: AsRef<str>>(atom: &str, key: &str, args: &[S]) -> Result<Vec<u8>> {
    encode_argv(args).map_err(|e| match e {
        LayoutError::EmptyArgument => CompileError::invalid(atom, key, "empty string in argument list"),
        LayoutError::InteriorNul(arg) => {
            CompileError::invalid(atom, key, format!("argument {arg:?} contains a NUL byte"))
        }
        other => CompileError::Layout(other),
    })
}

/// Pack a fixed-width field of a quark in `atom`
fn pack<const N: usize>(atom: &str, field: &'static str, value: &str) -> Result<FixedStr<N>> {
    FixedStr::<N>::new(value).map_err(|e| CompileError::packing(format!("atom {atom:?}"), field, e))
}
