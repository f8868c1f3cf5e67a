use std::fs;
use tempfile::tempdir;

use pstkit_cli::commands::layout;
use pstkit_core::Layout;

#[test]
fn layout_lists_every_leaf() {
    let layout = layout::execute(None).unwrap();
    assert_eq!(layout.min_stream_len(), 1_026_654);
    assert_eq!(layout.leaves.first().unwrap().id, "Intro_0");
    assert_eq!(layout.leaves.last().unwrap().id, "Skill_0");
}

#[test]
fn layout_writes_json() {
    let td = tempdir().unwrap();
    let out_path = td.path().join("layout.json");

    let layout = layout::execute(Some(out_path.to_str().unwrap())).unwrap();

    let json = fs::read_to_string(&out_path).unwrap();
    let parsed: Layout = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, layout);
    assert!(json.contains("\"code\": \"MM293\""));
}
