use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::facets::FacetId;
use crate::model::{FileRef, Leaf, Position};
use crate::session::WorkspaceEnvList;
use crate::suggestion::Suggestion;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Standard,
    EditorList,
    SymbolList,
    HeadingsList,
    BookmarksList,
    CommandList,
    RelatedItemsList,
    WorkspaceList,
    VaultList,
}

impl Mode {
    pub const ALL: [Mode; 9] = [
        Mode::Standard,
        Mode::EditorList,
        Mode::SymbolList,
        Mode::HeadingsList,
        Mode::BookmarksList,
        Mode::CommandList,
        Mode::RelatedItemsList,
        Mode::WorkspaceList,
        Mode::VaultList,
    ];

    pub const SOURCED: [Mode; 2] = [Mode::SymbolList, Mode::RelatedItemsList];

    pub fn is_sourced(self) -> bool {
        Self::SOURCED.contains(&self)
    }

    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "standard" => Some(Self::Standard),
            "editor" | "editors" => Some(Self::EditorList),
            "symbol" | "symbols" => Some(Self::SymbolList),
            "heading" | "headings" => Some(Self::HeadingsList),
            "bookmark" | "bookmarks" => Some(Self::BookmarksList),
            "command" | "commands" => Some(Self::CommandList),
            "related" => Some(Self::RelatedItemsList),
            "workspace" | "workspaces" => Some(Self::WorkspaceList),
            "vault" | "vaults" => Some(Self::VaultList),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceInfo {
    pub is_valid_source: bool,
    pub file: Option<FileRef>,
    pub leaf: Option<Leaf>,
    pub suggestion: Option<Suggestion>,
    pub cursor: Option<Position>,
}

impl SourceInfo {
    pub fn from_leaf(leaf: &Leaf) -> Self {
        Self {
            is_valid_source: leaf.file.is_some(),
            file: leaf.file.clone(),
            cursor: leaf.cursor,
            leaf: Some(leaf.clone()),
            suggestion: None,
        }
    }

    pub fn from_suggestion(file: FileRef, leaf: Option<Leaf>, suggestion: &Suggestion) -> Self {
        Self {
            is_valid_source: true,
            cursor: leaf.as_ref().and_then(|l| l.cursor),
            file: Some(file),
            leaf,
            suggestion: Some(suggestion.clone()),
        }
    }

    pub fn source_file(&self) -> Option<&FileRef> {
        self.file
            .as_ref()
            .or_else(|| self.leaf.as_ref().and_then(|l| l.file.as_ref()))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedCommand {
    pub is_validated: bool,
    /// Offset of the trigger in the input text.
    pub index: Option<usize>,
    pub parsed_input: Option<String>,
    pub source: Option<SourceInfo>,
}

impl ParsedCommand {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    pub has_search_term: bool,
    pub query: String,
}

impl SearchQuery {
    pub fn new(text: &str) -> Self {
        let query = text.trim().to_string();
        Self {
            has_search_term: !query.is_empty(),
            query,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionOpts {
    pub opened_in_mode: Option<Mode>,
    pub should_close_on_backspace: bool,
}

#[derive(Debug, Clone)]
pub struct InputInfo {
    pub input_text: String,
    pub mode: Mode,
    pub session_opts: SessionOpts,
    parsed_commands: BTreeMap<Mode, ParsedCommand>,
    pub search_query: SearchQuery,
    pub active_facets: BTreeSet<FacetId>,
    pub current_workspace_env: Rc<WorkspaceEnvList>,
}

impl InputInfo {
    pub fn new(input_text: &str, session_opts: SessionOpts, env: Rc<WorkspaceEnvList>) -> Self {
        let mut parsed_commands: BTreeMap<Mode, ParsedCommand> = Mode::ALL
            .into_iter()
            .map(|mode| (mode, ParsedCommand::default()))
            .collect();
        if let Some(standard) = parsed_commands.get_mut(&Mode::Standard) {
            standard.parsed_input = Some(input_text.to_string());
        }

        Self {
            input_text: input_text.to_string(),
            mode: Mode::Standard,
            session_opts,
            parsed_commands,
            search_query: SearchQuery::new(input_text),
            active_facets: BTreeSet::new(),
            current_workspace_env: env,
        }
    }

    pub fn detached(input_text: &str) -> Self {
        Self::new(input_text, SessionOpts::default(), Rc::default())
    }

    pub fn parsed_command(&self, mode: Mode) -> &ParsedCommand {
        &self.parsed_commands[&mode]
    }

    pub fn parsed_command_mut(&mut self, mode: Mode) -> &mut ParsedCommand {
        self.parsed_commands.entry(mode).or_default()
    }

    pub fn active_command(&self) -> &ParsedCommand {
        self.parsed_command(self.mode)
    }

    pub fn source(&self) -> Option<&SourceInfo> {
        self.active_command().source.as_ref()
    }

    pub fn validate(&mut self, mode: Mode, index: usize, filter_text: &str, source: Option<SourceInfo>) {
        let command = self.parsed_command_mut(mode);
        command.is_validated = true;
        command.index = Some(index);
        command.parsed_input = Some(filter_text.to_string());
        command.source = source;
        self.mode = mode;
        self.search_query = SearchQuery::new(filter_text);
    }
}
