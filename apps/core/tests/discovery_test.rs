use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use quickswitch_core::discovery::{load_vault, DiscoveryError};
use quickswitch_core::host::{FileProvider, MetadataProvider};

fn unique_root(name: &str) -> PathBuf {
    let unique = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("quickswitch-discovery-{name}-{unique}"))
}

#[test]
fn loads_notes_and_attachments_from_disk() {
    let root = unique_root("load");
    std::fs::create_dir_all(root.join("proj")).unwrap();
    std::fs::create_dir_all(root.join(".obsidian")).unwrap();
    std::fs::write(root.join("proj").join("Plan.md"), "# Plan\nSee [[Notes]].\n").unwrap();
    std::fs::write(root.join("Notes.md"), "# Notes\n").unwrap();
    std::fs::write(root.join("proj").join("chart.png"), b"png").unwrap();
    std::fs::write(root.join(".obsidian").join("workspace.json"), b"{}").unwrap();

    let vault = load_vault(&root).unwrap();
    assert_eq!(vault.file_count(), 3);

    let plan = vault.file_by_path("proj/Plan.md").expect("nested note is loaded");
    let cache = vault.file_cache(&plan).expect("markdown is parsed");
    assert_eq!(cache.headings[0].heading, "Plan");
    assert_eq!(vault.resolved_links()["proj/Plan.md"]["Notes.md"], 1);

    let chart = vault.file_by_path("proj/chart.png").expect("attachments are listed");
    assert!(vault.file_cache(&chart).is_none());
    assert!(vault.file_by_path(".obsidian/workspace.json").is_none());

    std::fs::remove_dir_all(&root).unwrap();
}

#[test]
fn rejects_a_missing_root() {
    let root = unique_root("missing");
    assert!(matches!(load_vault(&root), Err(DiscoveryError::NotADirectory(_))));
}
