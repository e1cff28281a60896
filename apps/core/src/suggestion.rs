use serde::{Deserialize, Serialize};

use crate::fuzzy::Match;
use crate::model::{BookmarkItem, CommandInfo, FileRef, HeadingCache, Leaf, LeafId, Span, VaultInfo};
use crate::search::{MatchType, SearchResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionType {
    EditorList,
    SymbolList,
    HeadingsList,
    File,
    Alias,
    Unresolved,
    Bookmark,
    CommandList,
    RelatedItemsList,
    WorkspaceList,
    VaultList,
}

impl SuggestionType {
    pub fn is_source_eligible(self) -> bool {
        !matches!(
            self,
            Self::SymbolList
                | Self::Unresolved
                | Self::WorkspaceList
                | Self::CommandList
                | Self::VaultList
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolType {
    Link,
    Embed,
    Tag,
    Heading,
    Callout,
}

impl SymbolType {
    pub const ALL: [SymbolType; 5] = [
        SymbolType::Link,
        SymbolType::Embed,
        SymbolType::Tag,
        SymbolType::Heading,
        SymbolType::Callout,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Link => "link",
            Self::Embed => "embed",
            Self::Tag => "tag",
            Self::Heading => "heading",
            Self::Callout => "callout",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkSubType {
    Normal,
    Heading,
    Block,
}

impl LinkSubType {
    pub fn of(link: &str) -> Self {
        if link.contains("#^") {
            Self::Block
        } else if link.contains('#') {
            Self::Heading
        } else {
            Self::Normal
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationType {
    DiskLocation,
    Backlink,
    OutgoingLink,
}

impl RelationType {
    pub const ALL: [RelationType; 3] = [
        RelationType::DiskLocation,
        RelationType::Backlink,
        RelationType::OutgoingLink,
    ];
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymbolInfo {
    pub symbol_type: SymbolType,
    pub text: String,
    pub position: Span,
    pub heading_level: Option<u8>,
    pub link_target: Option<String>,
    pub indent_level: usize,
    pub is_selected: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SuggestionKind {
    Editor {
        leaf: Leaf,
    },
    Symbol {
        symbol: SymbolInfo,
        source_leaf: Option<LeafId>,
    },
    Heading {
        heading: HeadingCache,
    },
    File,
    Alias {
        alias: String,
    },
    Unresolved {
        link_text: String,
    },
    Bookmark {
        item: BookmarkItem,
        bookmark_path: String,
    },
    Command {
        command: CommandInfo,
        is_recent: bool,
    },
    RelatedItem {
        relation: RelationType,
        count: Option<u32>,
        unresolved_text: Option<String>,
    },
    Workspace {
        name: String,
        is_active: bool,
    },
    Vault {
        vault: VaultInfo,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Provenance {
    pub is_open_in_editor: bool,
    pub is_recent: bool,
    pub is_bookmarked: bool,
    pub downranked: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    #[serde(flatten)]
    pub kind: SuggestionKind,
    pub file: Option<FileRef>,
    pub search: SearchResult,
    pub provenance: Provenance,
}

impl Suggestion {
    pub fn new(kind: SuggestionKind, file: Option<FileRef>, search: SearchResult) -> Self {
        Self {
            kind,
            file,
            search,
            provenance: Provenance::default(),
        }
    }

    pub fn suggestion_type(&self) -> SuggestionType {
        match &self.kind {
            SuggestionKind::Editor { .. } => SuggestionType::EditorList,
            SuggestionKind::Symbol { .. } => SuggestionType::SymbolList,
            SuggestionKind::Heading { .. } => SuggestionType::HeadingsList,
            SuggestionKind::File => SuggestionType::File,
            SuggestionKind::Alias { .. } => SuggestionType::Alias,
            SuggestionKind::Unresolved { .. } => SuggestionType::Unresolved,
            SuggestionKind::Bookmark { .. } => SuggestionType::Bookmark,
            SuggestionKind::Command { .. } => SuggestionType::CommandList,
            SuggestionKind::RelatedItem { .. } => SuggestionType::RelatedItemsList,
            SuggestionKind::Workspace { .. } => SuggestionType::WorkspaceList,
            SuggestionKind::Vault { .. } => SuggestionType::VaultList,
        }
    }

    pub fn matched(&self) -> Option<&Match> {
        self.search.matched.as_ref()
    }

    pub fn score(&self) -> Option<f64> {
        self.matched().map(|m| m.score)
    }

    pub fn match_type(&self) -> MatchType {
        self.search.match_type
    }

    pub fn symbol(&self) -> Option<&SymbolInfo> {
        match &self.kind {
            SuggestionKind::Symbol { symbol, .. } => Some(symbol),
            _ => None,
        }
    }

    pub fn is_h1_heading(&self) -> bool {
        matches!(&self.kind, SuggestionKind::Heading { heading } if heading.level == 1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Flair {
    OpenInEditor,
    Recent,
    Bookmarked,
    Downranked,
    HeadingLevel(u8),
    Symbol(SymbolType),
    Relation(RelationType),
    Count(u32),
    Active,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenderedSuggestion {
    pub title: String,
    pub title_matches: Vec<(usize, usize)>,
    pub note: Option<String>,
    pub note_matches: Vec<(usize, usize)>,
    pub flairs: Vec<Flair>,
    pub indent_level: usize,
    pub is_selected: bool,
}

impl RenderedSuggestion {
    /// Places the match offsets on whichever of title/note produced the match.
    pub fn new(title: String, note: Option<String>, suggestion: &Suggestion) -> Self {
        let mut rendered = Self {
            title,
            note,
            ..Self::default()
        };

        if let (Some(hit), Some(text)) = (suggestion.matched(), suggestion.search.match_text.as_deref()) {
            if text == rendered.title {
                rendered.title_matches = hit.matches.clone();
            } else if rendered.note.as_deref() == Some(text) {
                rendered.note_matches = hit.matches.clone();
            }
        }

        let provenance = suggestion.provenance;
        if provenance.is_open_in_editor {
            rendered.flairs.push(Flair::OpenInEditor);
        }
        if provenance.is_recent {
            rendered.flairs.push(Flair::Recent);
        }
        if provenance.is_bookmarked {
            rendered.flairs.push(Flair::Bookmarked);
        }
        if provenance.downranked {
            rendered.flairs.push(Flair::Downranked);
        }
        rendered
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChooseModifiers {
    pub mod_key: bool,
    pub shift_key: bool,
}

#[cfg(test)]
mod tests {
    use super::{LinkSubType, RenderedSuggestion, Suggestion, SuggestionKind, SuggestionType};
    use crate::fuzzy::Match;
    use crate::model::FileRef;
    use crate::search::{MatchType, SearchResult};

    #[test]
    fn classifies_link_sub_types() {
        assert_eq!(LinkSubType::of("note"), LinkSubType::Normal);
        assert_eq!(LinkSubType::of("note#Heading"), LinkSubType::Heading);
        assert_eq!(LinkSubType::of("note#^abc123"), LinkSubType::Block);
    }

    #[test]
    fn non_file_types_are_not_source_eligible() {
        assert!(SuggestionType::File.is_source_eligible());
        assert!(SuggestionType::EditorList.is_source_eligible());
        assert!(!SuggestionType::SymbolList.is_source_eligible());
        assert!(!SuggestionType::Unresolved.is_source_eligible());
        assert!(!SuggestionType::WorkspaceList.is_source_eligible());
        assert!(!SuggestionType::CommandList.is_source_eligible());
    }

    #[test]
    fn render_places_offsets_on_matching_text() {
        let file = FileRef::new("projects/Roadmap.md");
        let search = SearchResult {
            match_type: MatchType::ParentPath,
            match_text: Some("projects".to_string()),
            matched: Some(Match {
                score: 3.0,
                matches: vec![(0, 4)],
            }),
        };
        let suggestion = Suggestion::new(SuggestionKind::File, Some(file), search);
        let rendered = RenderedSuggestion::new(
            "Roadmap".to_string(),
            Some("projects".to_string()),
            &suggestion,
        );
        assert!(rendered.title_matches.is_empty());
        assert_eq!(rendered.note_matches, vec![(0, 4)]);
    }
}
