//! Quark model
//!
//! One variant per primitive action the runtime replays. Each variant knows
//! its record tag and the source key it was written as.

use crate::encoding::*;
use crate::error::{LayoutError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Method shared by exec, chown and chmod quarks
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum Method {
    Path = METHOD_PATH,
    AtDescriptor = METHOD_AT_DESCRIPTOR,
    Descriptor = METHOD_DESCRIPTOR,
    DontFollow = METHOD_DONT_FOLLOW,
}

impl Method {
    #[inline]
    pub const fn to_u32(self) -> u32 {
        self as u32
    }

    pub fn from_u32(value: u32) -> Result<Self> {
        match value {
            METHOD_PATH => Ok(Method::Path),
            METHOD_AT_DESCRIPTOR => Ok(Method::AtDescriptor),
            METHOD_DESCRIPTOR => Ok(Method::Descriptor),
            METHOD_DONT_FOLLOW => Ok(Method::DontFollow),
            _ => Err(LayoutError::InvalidValue { field: "method", value }),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum ForkMethod {
    X86 = FORK_METHOD_X86,
    Default = FORK_METHOD_DEFAULT,
}

impl ForkMethod {
    #[inline]
    pub const fn to_u32(self) -> u32 {
        self as u32
    }

    pub fn from_u32(value: u32) -> Result<Self> {
        match value {
            FORK_METHOD_X86 => Ok(ForkMethod::X86),
            FORK_METHOD_DEFAULT => Ok(ForkMethod::Default),
            _ => Err(LayoutError::InvalidValue { field: "fork method", value }),
        }
    }
}

/// How the runtime reaches the socket API
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum SocketMethod {
    Syscall = SOCKET_METHOD_SYSCALL,
    Socketcall = SOCKET_METHOD_SOCKETCALL,
}

impl SocketMethod {
    #[inline]
    pub const fn to_u32(self) -> u32 {
        self as u32
    }

    pub fn from_u32(value: u32) -> Result<Self> {
        match value {
            SOCKET_METHOD_SYSCALL => Ok(SocketMethod::Syscall),
            SOCKET_METHOD_SOCKETCALL => Ok(SocketMethod::Socketcall),
            _ => Err(LayoutError::InvalidValue { field: "socket method", value }),
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "syscall" => Some(SocketMethod::Syscall),
            "socketcall" => Some(SocketMethod::Socketcall),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            SocketMethod::Syscall => "syscall",
            SocketMethod::Socketcall => "socketcall",
        }
    }
}

/// Transport and address family of a socket
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Protocol {
    Tcp4,
    Tcp6,
    Udp4,
    Udp6,
}

impl Protocol {
    /// Socket type bitmask: transport bit | family bit
    pub const fn socket_type(self) -> u32 {
        match self {
            Protocol::Tcp4 => SOCKET_TCP | SOCKET_IPV4,
            Protocol::Tcp6 => SOCKET_TCP | SOCKET_IPV6,
            Protocol::Udp4 => SOCKET_UDP | SOCKET_IPV4,
            Protocol::Udp6 => SOCKET_UDP | SOCKET_IPV6,
        }
    }

    pub fn from_socket_type(value: u32) -> Result<Self> {
        match value {
            v if v == SOCKET_TCP | SOCKET_IPV4 => Ok(Protocol::Tcp4),
            v if v == SOCKET_TCP | SOCKET_IPV6 => Ok(Protocol::Tcp6),
            v if v == SOCKET_UDP | SOCKET_IPV4 => Ok(Protocol::Udp4),
            v if v == SOCKET_UDP | SOCKET_IPV6 => Ok(Protocol::Udp6),
            _ => Err(LayoutError::InvalidValue { field: "socket type", value }),
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "tcp4" => Some(Protocol::Tcp4),
            "tcp6" => Some(Protocol::Tcp6),
            "udp4" => Some(Protocol::Udp4),
            "udp6" => Some(Protocol::Udp6),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Protocol::Tcp4 => "tcp4",
            Protocol::Tcp6 => "tcp6",
            Protocol::Udp4 => "udp4",
            Protocol::Udp6 => "udp6",
        }
    }
}

/// Parameters shared by connect and listen
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Socket {
    pub method: SocketMethod,
    pub protocol: Protocol,
    pub port: u16,
    pub address: String,
}

/// File content operation
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileOpKind {
    Touch,
    Create,
    Append,
    Prepend,
}

impl FileOpKind {
    /// Base flags for this kind, before modifier bits
    pub const fn flags(self) -> u32 {
        match self {
            FileOpKind::Touch => FILE_OP_CREATE | FILE_OP_NO_DATA,
            FileOpKind::Create => FILE_OP_CREATE | FILE_OP_EXCL,
            FileOpKind::Append => FILE_OP_APPEND,
            FileOpKind::Prepend => FILE_OP_PREPEND,
        }
    }

    /// Recover the kind from an encoded flags word
    pub fn from_flags(flags: u32) -> Result<Self> {
        match flags & !FILE_OP_MODIFIER_MASK {
            FILE_OP_CREATE => Ok(FileOpKind::Touch),
            v if v == FILE_OP_CREATE | FILE_OP_EXCL => Ok(FileOpKind::Create),
            FILE_OP_APPEND => Ok(FileOpKind::Append),
            FILE_OP_PREPEND => Ok(FileOpKind::Prepend),
            _ => Err(LayoutError::InvalidValue { field: "file-op flags", value: flags }),
        }
    }

    pub const fn key(self) -> &'static str {
        match self {
            FileOpKind::Touch => "file-touch",
            FileOpKind::Create => "file-create",
            FileOpKind::Append => "file-append",
            FileOpKind::Prepend => "file-prepend",
        }
    }
}

/// A single primitive action within an atom
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Quark {
    /// execve (Path) or execveat (AtDescriptor)
    Exec { method: Method, argv: Vec<String> },

    /// Fork, rename the child process, then exec
    ForkAndRename { method: ForkMethod, argv: Vec<String> },

    Connect(Socket),

    Listen(Socket),

    Copy { source: String, destination: String },

    Remove { paths: Vec<String> },

    /// chown / fchown / fchownat / lchown; empty user or group is left unchanged
    Chown {
        method: Method,
        user: String,
        group: String,
        path: String,
    },

    /// chmod / fchmod / fchmodat
    Chmod { method: Method, mode: u32, path: String },

    FileOp {
        kind: FileOpKind,
        backup_and_revert: bool,
        path: String,
        data: Vec<u8>,
    },

    /// Sleep for a number of seconds
    Sleep { seconds: u32 },
}

impl Quark {
    /// Tag written into the record's 64-byte tag field
    pub fn tag(&self) -> &'static str {
        match self {
            Quark::Exec { .. } => TAG_EXEC,
            Quark::ForkAndRename { .. } => TAG_FORK_AND_RENAME,
            Quark::Connect(_) => TAG_CONNECT,
            Quark::Listen(_) => TAG_LISTEN,
            Quark::Copy { .. } => TAG_COPY,
            Quark::Remove { .. } => TAG_REMOVE,
            Quark::Chown { .. } => TAG_CHOWN,
            Quark::Chmod { .. } => TAG_CHMOD,
            Quark::FileOp { .. } => TAG_FILE_OP,
            Quark::Sleep { .. } => TAG_SLEEP,
        }
    }

    /// Key this quark is written as in atom definitions
    pub fn key(&self) -> &'static str {
        match self {
            Quark::Exec { method: Method::AtDescriptor, .. } => "execveat",
            Quark::Exec { .. } => "execve",
            Quark::ForkAndRename { method: ForkMethod::X86, .. } => "fork-and-rename-x86",
            Quark::ForkAndRename { .. } => "fork-and-rename",
            Quark::Connect(_) => "connect",
            Quark::Listen(_) => "listen",
            Quark::Copy { .. } => "copy",
            Quark::Remove { .. } => "remove",
            Quark::Chown { method: Method::Descriptor, .. } => "fchown",
            Quark::Chown { method: Method::AtDescriptor, .. } => "fchownat",
            Quark::Chown { method: Method::DontFollow, .. } => "lchown",
            Quark::Chown { .. } => "chown",
            Quark::Chmod { method: Method::Descriptor, .. } => "fchmod",
            Quark::Chmod { method: Method::AtDescriptor, .. } => "fchmodat",
            Quark::Chmod { .. } => "chmod",
            Quark::FileOp { kind, .. } => kind.key(),
            Quark::Sleep { .. } => "sleep",
        }
    }

    /// Flags word of a file-op quark, including modifier bits
    pub fn file_op_flags(kind: FileOpKind, backup_and_revert: bool, data_len: usize) -> u32 {
        let mut flags = kind.flags();
        if backup_and_revert {
            flags |= FILE_OP_BACKUP_AND_REVERT;
        }
        if data_len == 0 {
            flags |= FILE_OP_NO_DATA;
        }
        flags
    }
}

impl fmt::Display for Quark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}
