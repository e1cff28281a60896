use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};

use crate::host::{
    FileProvider, HostError, MetadataProvider, NavigationState, Navigator, OpenIntent, PaneProvider,
    PluginDataProvider,
};
use crate::metadata;
use crate::model::{
    normalize_vault_path, BookmarkItem, CommandInfo, FileCache, FileRef, Leaf, LeafId, LinkIndex,
    VaultEntry, VaultInfo, ROOT_FOLDER,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationEvent {
    OpenFile {
        path: String,
        new_leaf: bool,
        state: Option<NavigationState>,
    },
    ActivateLeaf {
        leaf: LeafId,
        state: Option<NavigationState>,
    },
    OpenLinkText {
        link_text: String,
        source_path: String,
        new_leaf: bool,
    },
    OpenBookmark(String),
    ExecuteCommand(String),
    LoadWorkspace(String),
    OpenVault(String),
}

#[derive(Debug, Default)]
pub struct MemoryVault {
    files: BTreeMap<String, FileRef>,
    contents: BTreeMap<String, String>,
    caches: BTreeMap<String, FileCache>,
    resolved: LinkIndex,
    unresolved: LinkIndex,
    leaves: Vec<Leaf>,
    active_leaf: Option<LeafId>,
    recent_files: Vec<String>,
    bookmarks: Vec<BookmarkItem>,
    commands: Vec<CommandInfo>,
    recent_command_ids: Vec<String>,
    workspaces: Vec<String>,
    active_workspace: Option<String>,
    vaults: Vec<VaultInfo>,
    unreadable: BTreeSet<String>,
    fail_navigation: bool,
    navigation_log: RefCell<Vec<NavigationEvent>>,
}

impl MemoryVault {
    pub fn add_note(&mut self, path: &str, content: &str) -> FileRef {
        let file = self.insert(path, Some(content));
        self.resolve_links();
        file
    }

    pub fn add_file(&mut self, path: &str) -> FileRef {
        let file = self.insert(path, None);
        self.resolve_links();
        file
    }

    /// Bulk variant of [`add_note`](Self::add_note)/[`add_file`](Self::add_file);
    /// links are resolved once at the end.
    pub fn add_entries<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (String, Option<String>)>,
    {
        for (path, content) in entries {
            self.insert(&path, content.as_deref());
        }
        self.resolve_links();
    }

    fn insert(&mut self, path: &str, content: Option<&str>) -> FileRef {
        let file = FileRef::new(path);
        if let Some(content) = content {
            self.caches.insert(file.path.clone(), metadata::parse(content));
            self.contents.insert(file.path.clone(), content.to_string());
        }
        self.files.insert(file.path.clone(), file.clone());
        file
    }

    pub fn open_leaf(&mut self, leaf: Leaf) {
        self.leaves.retain(|l| l.id != leaf.id);
        self.leaves.push(leaf);
    }

    pub fn set_active_leaf(&mut self, id: Option<LeafId>) {
        self.active_leaf = id;
    }

    pub fn leaf(&self, id: LeafId) -> Option<Leaf> {
        self.leaves.iter().find(|l| l.id == id).cloned()
    }

    pub fn set_recent_files<I, S>(&mut self, paths: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.recent_files = paths
            .into_iter()
            .map(|p| normalize_vault_path(p.as_ref()))
            .collect();
    }

    pub fn add_bookmark(&mut self, item: BookmarkItem) {
        self.bookmarks.push(item);
    }

    pub fn set_commands(&mut self, commands: Vec<CommandInfo>) {
        self.commands = commands;
    }

    pub fn set_recent_command_ids(&mut self, ids: Vec<String>) {
        self.recent_command_ids = ids;
    }

    pub fn set_workspaces(&mut self, names: Vec<String>, active: Option<String>) {
        self.workspaces = names;
        self.active_workspace = active;
    }

    pub fn add_vault(&mut self, vault: VaultInfo) {
        self.vaults.push(vault);
    }

    pub fn mark_unreadable(&mut self, path: &str) {
        self.unreadable.insert(normalize_vault_path(path));
    }

    pub fn set_fail_navigation(&mut self, fail: bool) {
        self.fail_navigation = fail;
    }

    pub fn navigation_log(&self) -> Vec<NavigationEvent> {
        self.navigation_log.borrow().clone()
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    fn navigate(&self, event: NavigationEvent) -> Result<(), HostError> {
        if self.fail_navigation {
            return Err(HostError::Navigation(format!("{event:?}")));
        }
        self.navigation_log.borrow_mut().push(event);
        Ok(())
    }

    /// Resolves a link target the way wiki links do: exact path, path plus `.md`,
    /// then the first file whose basename matches (case-insensitive).
    pub fn resolve_link_target(&self, target: &str) -> Option<&FileRef> {
        let target = normalize_vault_path(target);
        if let Some(file) = self
            .files
            .get(&target)
            .or_else(|| self.files.get(&format!("{target}.md")))
        {
            return Some(file);
        }
        let wanted = target.to_lowercase();
        self.files.values().find(|file| {
            file.basename.to_lowercase() == wanted || file.name().to_lowercase() == wanted
        })
    }

    fn resolve_links(&mut self) {
        let mut resolved = LinkIndex::new();
        let mut unresolved = LinkIndex::new();

        for (source, cache) in &self.caches {
            for link in cache.links.iter().chain(cache.embeds.iter()) {
                let target = link.link.split('#').next().unwrap_or_default().trim();
                let dest = if target.is_empty() {
                    Some(source.clone())
                } else {
                    self.resolve_link_target(target).map(|f| f.path.clone())
                };
                let (index, key) = match dest {
                    Some(path) => (&mut resolved, path),
                    None => (&mut unresolved, target.to_string()),
                };
                *index
                    .entry(source.clone())
                    .or_default()
                    .entry(key)
                    .or_default() += 1;
            }
        }

        self.resolved = resolved;
        self.unresolved = unresolved;
    }
}

impl MetadataProvider for MemoryVault {
    fn file_cache(&self, file: &FileRef) -> Option<&FileCache> {
        self.caches.get(&file.path)
    }

    fn resolved_links(&self) -> &LinkIndex {
        &self.resolved
    }

    fn unresolved_links(&self) -> &LinkIndex {
        &self.unresolved
    }
}

impl PaneProvider for MemoryVault {
    fn leaves(&self) -> Vec<Leaf> {
        self.leaves.clone()
    }

    fn active_leaf(&self) -> Option<Leaf> {
        self.active_leaf.and_then(|id| self.leaf(id))
    }

    fn recent_file_paths(&self) -> Vec<String> {
        self.recent_files.clone()
    }
}

impl FileProvider for MemoryVault {
    fn file_by_path(&self, path: &str) -> Option<FileRef> {
        self.files.get(&normalize_vault_path(path)).cloned()
    }

    fn files(&self) -> Vec<FileRef> {
        self.files.values().cloned().collect()
    }

    fn folder_children(&self, folder: &str) -> Vec<VaultEntry> {
        let folder = if folder == ROOT_FOLDER {
            String::new()
        } else {
            normalize_vault_path(folder)
        };

        let mut files = Vec::new();
        let mut folders = BTreeSet::new();
        for file in self.files.values() {
            let rest = if folder.is_empty() {
                Some(file.path.as_str())
            } else {
                file.path
                    .strip_prefix(folder.as_str())
                    .and_then(|rest| rest.strip_prefix('/'))
            };
            let Some(rest) = rest else {
                continue;
            };
            match rest.split_once('/') {
                None => files.push(VaultEntry::File(file.clone())),
                Some((child, _)) if folder.is_empty() => {
                    folders.insert(child.to_string());
                }
                Some((child, _)) => {
                    folders.insert(format!("{folder}/{child}"));
                }
            }
        }

        files.extend(folders.into_iter().map(VaultEntry::Folder));
        files
    }

    fn read_file(&self, file: &FileRef) -> Result<String, HostError> {
        if self.unreadable.contains(&file.path) {
            return Err(HostError::Read {
                path: file.path.clone(),
                message: "permission denied".to_string(),
            });
        }
        self.contents
            .get(&file.path)
            .cloned()
            .ok_or_else(|| HostError::NotFound(file.path.clone()))
    }
}

impl PluginDataProvider for MemoryVault {
    fn bookmarks(&self) -> Vec<BookmarkItem> {
        self.bookmarks.clone()
    }

    fn commands(&self) -> Vec<CommandInfo> {
        self.commands.clone()
    }

    fn recent_command_ids(&self) -> Vec<String> {
        self.recent_command_ids.clone()
    }

    fn workspaces(&self) -> Vec<String> {
        self.workspaces.clone()
    }

    fn active_workspace(&self) -> Option<String> {
        self.active_workspace.clone()
    }

    fn vaults(&self) -> Vec<VaultInfo> {
        self.vaults.clone()
    }
}

impl Navigator for MemoryVault {
    fn open_file(
        &self,
        file: &FileRef,
        intent: OpenIntent,
        state: Option<&NavigationState>,
    ) -> Result<(), HostError> {
        if !self.files.contains_key(&file.path) {
            return Err(HostError::NotFound(file.path.clone()));
        }
        self.navigate(NavigationEvent::OpenFile {
            path: file.path.clone(),
            new_leaf: intent.new_leaf,
            state: state.cloned(),
        })
    }

    fn activate_leaf(&self, leaf: LeafId, state: Option<&NavigationState>) -> Result<(), HostError> {
        if self.leaf(leaf).is_none() {
            return Err(HostError::NotFound(format!("leaf {}", leaf.0)));
        }
        self.navigate(NavigationEvent::ActivateLeaf {
            leaf,
            state: state.cloned(),
        })
    }

    fn open_link_text(&self, link_text: &str, source_path: &str, intent: OpenIntent) -> Result<(), HostError> {
        self.navigate(NavigationEvent::OpenLinkText {
            link_text: link_text.to_string(),
            source_path: source_path.to_string(),
            new_leaf: intent.new_leaf,
        })
    }

    fn open_bookmark(&self, item: &BookmarkItem) -> Result<(), HostError> {
        self.navigate(NavigationEvent::OpenBookmark(item.display_title()))
    }

    fn execute_command(&self, id: &str) -> Result<(), HostError> {
        if !self.commands.iter().any(|c| c.id == id) {
            return Err(HostError::NotFound(id.to_string()));
        }
        self.navigate(NavigationEvent::ExecuteCommand(id.to_string()))
    }

    fn load_workspace(&self, name: &str) -> Result<(), HostError> {
        self.navigate(NavigationEvent::LoadWorkspace(name.to_string()))
    }

    fn open_vault(&self, vault: &VaultInfo) -> Result<(), HostError> {
        self.navigate(NavigationEvent::OpenVault(vault.id.clone()))
    }
}
