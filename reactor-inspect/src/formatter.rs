//! Listing of a decoded reaction image

use reactor_spec::{Atom, Image, Quark, Socket};
use std::fmt::Write;

/// Render file-op data, escaping non-printable bytes
fn format_data(data: &[u8]) -> String {
    data.iter().flat_map(|&b| std::ascii::escape_default(b)).map(char::from).collect()
}

fn format_argv(argv: &[String]) -> String {
    argv.iter()
        .map(|a| format!("{a:?}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn format_socket(socket: &Socket) -> String {
    format!(
        "{} {}:{} via {}",
        socket.protocol.name(),
        socket.address,
        socket.port,
        socket.method.name()
    )
}

/// Format a quark as one listing line
pub fn format_quark(quark: &Quark) -> String {
    let key = quark.key();
    match quark {
        Quark::Exec { argv, .. } | Quark::ForkAndRename { argv, .. } => {
            format!("{key} {}", format_argv(argv))
        }
        Quark::Connect(socket) | Quark::Listen(socket) => {
            format!("{key} {}", format_socket(socket))
        }
        Quark::Copy { source, destination } => format!("{key} {source:?} -> {destination:?}"),
        Quark::Remove { paths } => format!("{key} {}", format_argv(paths)),
        Quark::Chown { user, group, path, .. } => {
            format!("{key} {path:?} user={user:?} group={group:?}")
        }
        Quark::Chmod { mode, path, .. } => format!("{key} {path:?} mode={mode:04o}"),
        Quark::FileOp {
            backup_and_revert,
            path,
            data,
            ..
        } => {
            let mut line = format!("{key} {path:?} ({} bytes)", data.len());
            if !data.is_empty() {
                let _ = write!(line, " \"{}\"", format_data(data));
            }
            if *backup_and_revert {
                line.push_str(" [backup-and-revert]");
            }
            line
        }
        Quark::Sleep { seconds } => format!("{key} {seconds}s"),
    }
}

fn format_atom(out: &mut String, atom: &Atom) {
    let _ = writeln!(out, "atom {:?} ({} quarks)", atom.name, atom.quarks.len());
    for (index, quark) in atom.quarks.iter().enumerate() {
        let _ = writeln!(out, "  {index:>3}  {}", format_quark(quark));
    }
}

/// Format a whole image as a listing
pub fn format_image(image: &Image) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "; settings: {}", image.settings);
    let _ = writeln!(out, "; atoms: {}", image.atoms.len());
    out.push('\n');

    for atom in &image.atoms {
        format_atom(&mut out, atom);
    }

    out.push('\n');
    let _ = writeln!(
        out,
        "reaction {:?} ({} atoms)",
        image.reaction.name,
        image.reaction.atoms.len()
    );
    for name in &image.reaction.atoms {
        let _ = writeln!(out, "  -> {name}");
    }

    out
}
