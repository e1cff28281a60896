use thiserror::Error;

use crate::model::{
    BookmarkItem, CommandInfo, FileCache, FileRef, Leaf, LeafId, LinkIndex, Position, VaultEntry,
    VaultInfo,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("file not found: {0}")]
    NotFound(String),
    #[error("failed to read {path}: {message}")]
    Read { path: String, message: String },
    #[error("navigation failed: {0}")]
    Navigation(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OpenIntent {
    pub new_leaf: bool,
}

/// Ephemeral editor state applied after navigation (cursor target, heading/block subpath).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationState {
    pub cursor: Option<Position>,
    pub subpath: Option<String>,
}

pub trait MetadataProvider {
    fn file_cache(&self, file: &FileRef) -> Option<&FileCache>;
    fn resolved_links(&self) -> &LinkIndex;
    fn unresolved_links(&self) -> &LinkIndex;
}

pub trait PaneProvider {
    fn leaves(&self) -> Vec<Leaf>;
    fn active_leaf(&self) -> Option<Leaf>;
    /// Most recent first.
    fn recent_file_paths(&self) -> Vec<String>;
}

pub trait FileProvider {
    fn file_by_path(&self, path: &str) -> Option<FileRef>;
    fn files(&self) -> Vec<FileRef>;
    fn folder_children(&self, folder: &str) -> Vec<VaultEntry>;
    fn read_file(&self, file: &FileRef) -> Result<String, HostError>;
}

pub trait PluginDataProvider {
    fn bookmarks(&self) -> Vec<BookmarkItem>;
    fn commands(&self) -> Vec<CommandInfo>;
    /// Most recent first.
    fn recent_command_ids(&self) -> Vec<String>;
    fn workspaces(&self) -> Vec<String>;
    fn active_workspace(&self) -> Option<String>;
    fn vaults(&self) -> Vec<VaultInfo>;
}

pub trait Navigator {
    fn open_file(
        &self,
        file: &FileRef,
        intent: OpenIntent,
        state: Option<&NavigationState>,
    ) -> Result<(), HostError>;
    fn activate_leaf(&self, leaf: LeafId, state: Option<&NavigationState>)
        -> Result<(), HostError>;
    fn open_link_text(
        &self,
        link_text: &str,
        source_path: &str,
        intent: OpenIntent,
    ) -> Result<(), HostError>;
    fn open_bookmark(&self, item: &BookmarkItem) -> Result<(), HostError>;
    fn execute_command(&self, id: &str) -> Result<(), HostError>;
    fn load_workspace(&self, name: &str) -> Result<(), HostError>;
    fn open_vault(&self, vault: &VaultInfo) -> Result<(), HostError>;
}

pub trait Host: MetadataProvider + PaneProvider + FileProvider + PluginDataProvider + Navigator {}

impl<T> Host for T where
    T: MetadataProvider + PaneProvider + FileProvider + PluginDataProvider + Navigator
{
}
