//! Stress tests for the reactor toolchain
//!
//! Large atom files, long quark lists and big file-op payloads.

use reactor_compiler::{compile, encode_image};
use reactor_inspect::decode_region;
use reactor_spec::{Quark, Settings, MAX_NAME_LEN, MAX_PATH_LEN};

fn atoms_json(atoms: usize, quarks_per_atom: usize) -> String {
    let atoms: Vec<_> = (0..atoms)
        .map(|a| {
            let mut fields = vec![("name".to_string(), serde_json::Value::from(format!("atom-{a}")))];
            for q in 0..quarks_per_atom {
                fields.push(("sleep".to_string(), serde_json::Value::from(q as u64 + 1)));
            }
            // Repeated keys cannot go through a Map, so write the object by hand
            let members: Vec<_> = fields
                .iter()
                .map(|(k, v)| format!("{}: {}", serde_json::Value::from(k.as_str()), v))
                .collect();
            format!("{{{}}}", members.join(", "))
        })
        .collect();
    format!("[{}]", atoms.join(",\n"))
}

fn reaction_json(atoms: usize) -> String {
    let names: Vec<_> = (0..atoms).map(|a| format!("atom-{a}")).collect();
    serde_json::json!({"name": "stress", "atoms": names}).to_string()
}

#[test]
fn test_many_atoms() {
    let image = compile(&atoms_json(500, 2), &reaction_json(500), Settings::DEFAULT).unwrap();
    assert_eq!(image.atoms.len(), 500);

    let decoded = decode_region(&encode_image(&image).unwrap()).unwrap();
    assert_eq!(decoded, image);
}

#[test]
fn test_many_repeated_quarks_keep_order() {
    let image = compile(&atoms_json(1, 1000), &reaction_json(1), Settings::DEFAULT).unwrap();
    let seconds: Vec<u32> = image.atoms[0]
        .quarks
        .iter()
        .map(|q| match q {
            Quark::Sleep { seconds } => *seconds,
            other => panic!("unexpected quark {other:?}"),
        })
        .collect();
    assert_eq!(seconds, (1..=1000).collect::<Vec<u32>>());
}

#[test]
fn test_large_file_op_data() {
    let atoms = serde_json::json!([{
        "name": "big",
        "file-create": {"path": "/tmp/big", "data": "\\x00\\xff".repeat(50_000)}
    }])
    .to_string();
    let reaction = r#"{"name": "r1", "atoms": ["big"]}"#;
    let image = compile(&atoms, reaction, Settings::DEFAULT).unwrap();
    let region = encode_image(&image).unwrap();
    let decoded = decode_region(&region).unwrap();
    match &decoded.atoms[0].quarks[0] {
        Quark::FileOp { data, .. } => {
            assert_eq!(data.len(), 100_000);
            assert!(data.chunks(2).all(|pair| pair == [0x00, 0xff]));
        }
        other => panic!("expected file-op, got {other:?}"),
    }
}

#[test]
fn test_maximum_width_fields() {
    let name = "n".repeat(MAX_NAME_LEN);
    let path = format!("/{}", "p".repeat(MAX_PATH_LEN - 1));
    let atoms = serde_json::json!([{
        "name": name,
        "chown": {"path": path, "user": "u".repeat(MAX_NAME_LEN), "group": "g".repeat(MAX_NAME_LEN)}
    }])
    .to_string();
    let reaction = serde_json::json!({"name": "r".repeat(MAX_NAME_LEN), "atoms": [name]}).to_string();

    let image = compile(&atoms, &reaction, Settings::DEFAULT).unwrap();
    let decoded = decode_region(&encode_image(&image).unwrap()).unwrap();
    assert_eq!(decoded, image);
}
