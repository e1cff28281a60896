use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use regex::RegexSet;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::input_info::Mode;
use crate::suggestion::{LinkSubType, RelationType, SymbolType};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{setting}: invalid pattern '{pattern}': {message}")]
pub struct PatternError {
    pub setting: &'static str,
    pub pattern: String,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write config {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid toml in {path}: {source}")]
    Toml {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid json5 in {path}: {source}")]
    Json5 {
        path: PathBuf,
        source: json5::Error,
    },
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("{} invalid pattern(s): {}", .0.len(), join_pattern_errors(.0))]
    InvalidPatterns(Vec<PatternError>),
    #[error("{0}")]
    Invalid(String),
}

fn join_pattern_errors(errors: &[PatternError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityKey {
    IsOpenInEditor,
    IsBookmarked,
    IsRecent,
    IsAlias,
    IsH1,
    File,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchPriorityAdjustments {
    pub is_enabled: bool,
    pub adjustments: BTreeMap<PriorityKey, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub editor_list_command: String,
    pub symbol_list_command: String,
    pub headings_list_command: String,
    pub bookmarks_list_command: String,
    pub command_list_command: String,
    pub related_items_list_command: String,
    pub workspace_list_command: String,
    pub vault_list_command: String,
    pub exclude_view_types: Vec<String>,
    pub include_side_panel_view_types: Vec<String>,
    pub reference_views: Vec<String>,
    pub limit: usize,
    pub select_nearest_heading: bool,
    pub symbols_in_line_order: bool,
    pub enabled_symbol_types: BTreeSet<SymbolType>,
    pub exclude_link_sub_types: BTreeSet<LinkSubType>,
    pub exclude_folders: Vec<String>,
    pub exclude_related_folders: Vec<String>,
    pub downrank_folders: Vec<String>,
    pub exclude_open_related_files: bool,
    pub include_related_subfolders: bool,
    pub enabled_related_items: BTreeSet<RelationType>,
    pub strict_headings_only: bool,
    pub search_all_headings: bool,
    pub should_search_filenames: bool,
    pub should_search_bookmarks: bool,
    pub should_search_recent_files: bool,
    pub should_search_aliases: bool,
    pub should_search_unresolved: bool,
    pub max_recent_file_suggestions: usize,
    pub headings_search_debounce_ms: u64,
    pub order_editor_list_by_access_time: bool,
    pub on_open_prefer_new_tab: bool,
    pub max_recently_used_commands: usize,
    pub reset_active_facets_on_open: bool,
    pub match_priority_adjustments: MatchPriorityAdjustments,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            editor_list_command: "edt ".to_string(),
            symbol_list_command: "@".to_string(),
            headings_list_command: "#".to_string(),
            bookmarks_list_command: "'".to_string(),
            command_list_command: ">".to_string(),
            related_items_list_command: "~".to_string(),
            workspace_list_command: "+".to_string(),
            vault_list_command: "vault ".to_string(),
            exclude_view_types: vec!["empty".to_string()],
            include_side_panel_view_types: vec![
                "backlink".to_string(),
                "image".to_string(),
                "markdown".to_string(),
                "pdf".to_string(),
            ],
            reference_views: vec![
                "backlink".to_string(),
                "localgraph".to_string(),
                "outgoing-link".to_string(),
                "outline".to_string(),
            ],
            limit: 50,
            select_nearest_heading: true,
            symbols_in_line_order: true,
            enabled_symbol_types: SymbolType::ALL.into_iter().collect(),
            exclude_link_sub_types: BTreeSet::new(),
            exclude_folders: Vec::new(),
            exclude_related_folders: Vec::new(),
            downrank_folders: Vec::new(),
            exclude_open_related_files: false,
            include_related_subfolders: false,
            enabled_related_items: RelationType::ALL.into_iter().collect(),
            strict_headings_only: false,
            search_all_headings: true,
            should_search_filenames: false,
            should_search_bookmarks: false,
            should_search_recent_files: true,
            should_search_aliases: true,
            should_search_unresolved: false,
            max_recent_file_suggestions: 25,
            headings_search_debounce_ms: 0,
            order_editor_list_by_access_time: true,
            on_open_prefer_new_tab: false,
            max_recently_used_commands: 10,
            reset_active_facets_on_open: true,
            match_priority_adjustments: MatchPriorityAdjustments::default(),
        }
    }
}

impl Settings {
    pub fn trigger(&self, mode: Mode) -> Option<&str> {
        let trigger = match mode {
            Mode::Standard => return None,
            Mode::EditorList => &self.editor_list_command,
            Mode::SymbolList => &self.symbol_list_command,
            Mode::HeadingsList => &self.headings_list_command,
            Mode::BookmarksList => &self.bookmarks_list_command,
            Mode::CommandList => &self.command_list_command,
            Mode::RelatedItemsList => &self.related_items_list_command,
            Mode::WorkspaceList => &self.workspace_list_command,
            Mode::VaultList => &self.vault_list_command,
        };
        Some(trigger.as_str())
    }

    pub fn is_symbol_type_enabled(&self, symbol_type: SymbolType) -> bool {
        self.enabled_symbol_types.contains(&symbol_type)
    }

    pub fn is_excluded_view_type(&self, view_type: &str) -> bool {
        self.exclude_view_types.iter().any(|v| v == view_type)
    }

    pub fn is_reference_view(&self, view_type: &str) -> bool {
        self.reference_views.iter().any(|v| v == view_type)
    }
}

#[derive(Debug, Clone)]
pub struct PathFilters {
    exclude_folders: RegexSet,
    exclude_related_folders: RegexSet,
    downrank_folders: RegexSet,
}

impl PathFilters {
    pub fn compile(settings: &Settings) -> Result<Self, ConfigError> {
        let mut errors = Vec::new();
        let exclude_folders = compile_set("exclude_folders", &settings.exclude_folders, &mut errors);
        let exclude_related_folders = compile_set(
            "exclude_related_folders",
            &settings.exclude_related_folders,
            &mut errors,
        );
        let downrank_folders = compile_set("downrank_folders", &settings.downrank_folders, &mut errors);

        match (exclude_folders, exclude_related_folders, downrank_folders) {
            (Some(exclude_folders), Some(exclude_related_folders), Some(downrank_folders))
                if errors.is_empty() =>
            {
                Ok(Self {
                    exclude_folders,
                    exclude_related_folders,
                    downrank_folders,
                })
            }
            _ => Err(ConfigError::InvalidPatterns(errors)),
        }
    }

    pub fn is_excluded(&self, path: &str) -> bool {
        self.exclude_folders.is_match(path)
    }

    pub fn is_related_excluded(&self, folder: &str) -> bool {
        self.exclude_related_folders.is_match(folder)
    }

    pub fn is_downranked(&self, path: &str) -> bool {
        self.downrank_folders.is_match(path)
    }
}

impl Default for PathFilters {
    fn default() -> Self {
        Self {
            exclude_folders: RegexSet::empty(),
            exclude_related_folders: RegexSet::empty(),
            downrank_folders: RegexSet::empty(),
        }
    }
}

fn compile_set(
    setting: &'static str,
    patterns: &[String],
    errors: &mut Vec<PatternError>,
) -> Option<RegexSet> {
    let before = errors.len();
    for pattern in patterns {
        if let Err(error) = regex::Regex::new(pattern) {
            errors.push(PatternError {
                setting,
                pattern: pattern.clone(),
                message: error.to_string(),
            });
        }
    }
    if errors.len() > before {
        return None;
    }
    RegexSet::new(patterns).ok()
}

pub fn validate(settings: &Settings) -> Result<(), ConfigError> {
    let mut problems = Vec::new();
    if settings.limit == 0 {
        problems.push("limit must be at least 1".to_string());
    }

    let mut seen: BTreeMap<&str, Mode> = BTreeMap::new();
    for mode in Mode::ALL {
        let Some(trigger) = settings.trigger(mode) else {
            continue;
        };
        if trigger.is_empty() {
            problems.push(format!("trigger for {mode:?} must not be empty"));
            continue;
        }
        if let Some(other) = seen.insert(trigger, mode) {
            problems.push(format!("trigger '{trigger}' is shared by {other:?} and {mode:?}"));
        }
    }

    match PathFilters::compile(settings) {
        Ok(_) if problems.is_empty() => Ok(()),
        Ok(_) => Err(ConfigError::Invalid(problems.join("; "))),
        Err(patterns) if problems.is_empty() => Err(patterns),
        Err(patterns) => {
            problems.push(patterns.to_string());
            Err(ConfigError::Invalid(problems.join("; ")))
        }
    }
}

pub fn load(path: &Path) -> Result<Settings, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json") || ext.eq_ignore_ascii_case("json5"));

    let settings: Settings = if is_json {
        json5::from_str(&raw).map_err(|source| ConfigError::Json5 {
            path: path.to_path_buf(),
            source,
        })?
    } else {
        toml::from_str(&raw).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })?
    };

    validate(&settings)?;
    Ok(settings)
}

/// Validates first; invalid settings are never written.
pub fn save(settings: &Settings, path: &Path) -> Result<(), ConfigError> {
    validate(settings)?;
    let raw = toml::to_string_pretty(settings)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(path, raw).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })
}
