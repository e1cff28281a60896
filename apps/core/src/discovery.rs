use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};
use walkdir::{DirEntry, WalkDir};

use crate::vault::MemoryVault;

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("vault root {0} is not a directory")]
    NotADirectory(PathBuf),
    #[error("failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        source: walkdir::Error,
    },
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.'))
}

/// Loads every file under `root` into a [`MemoryVault`]. Dot-directories (app config,
/// trash) are skipped; markdown files are parsed for metadata. An unreadable note is
/// kept as a plain file.
pub fn load_vault(root: &Path) -> Result<MemoryVault, DiscoveryError> {
    if !root.is_dir() {
        return Err(DiscoveryError::NotADirectory(root.to_path_buf()));
    }

    let mut entries = Vec::new();
    for entry in WalkDir::new(root).follow_links(false).into_iter().filter_entry(|e| !is_hidden(e)) {
        let entry = entry.map_err(|source| DiscoveryError::Walk {
            path: root.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        let vault_path = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        let is_markdown = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("md"));
        let content = if is_markdown {
            match std::fs::read_to_string(entry.path()) {
                Ok(content) => Some(content),
                Err(err) => {
                    warn!(path = %entry.path().display(), "failed to read note: {err}");
                    None
                }
            }
        } else {
            None
        };
        entries.push((vault_path, content));
    }

    let mut vault = MemoryVault::default();
    vault.add_entries(entries);
    info!(root = %root.display(), files = vault.file_count(), "vault loaded");
    Ok(vault)
}
