use lumen_world::{BlockTable, BLOCK_AIR};
use std::path::PathBuf;

fn blocks_json_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../config/blocks.json")
}

fn load_pack() -> BlockTable {
    let raw = std::fs::read_to_string(blocks_json_path()).expect("read config/blocks.json");
    BlockTable::from_json_str(&raw).expect("parse config/blocks.json")
}

#[test]
fn block_ids_match_blocks_json() {
    let pack = load_pack();
    let builtin = BlockTable::default();

    assert_eq!(pack.id_by_name("air"), Some(BLOCK_AIR));
    // The shipped pack extends the built-in table without renumbering it.
    for id in 0..builtin.len() as u16 {
        let expected = builtin.descriptor(id).expect("builtin id");
        let actual = pack
            .descriptor(id)
            .unwrap_or_else(|| panic!("missing block id {id} in blocks.json"));
        assert_eq!(actual, expected, "block id {id}");
    }
}

#[test]
fn shipped_emitters_have_expected_levels() {
    let pack = load_pack();
    let level = |name: &str| {
        let id = pack
            .id_by_name(name)
            .unwrap_or_else(|| panic!("missing block name in blocks.json: {name}"));
        pack.light_emission(id)
    };
    assert_eq!(level("torch"), 14);
    assert_eq!(level("glowstone"), 15);
    assert_eq!(level("redstone_torch"), 7);
    assert_eq!(level("stone"), 0);
}
