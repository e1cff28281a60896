use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::input_info::Mode;
use crate::suggestion::{RelationType, SymbolType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacetId {
    RecentFiles,
    Bookmarks,
    Filenames,
    Headings,
    Aliases,
    Symbol(SymbolType),
    Relation(RelationType),
}

impl FacetId {
    pub fn mode(self) -> Mode {
        match self {
            Self::RecentFiles | Self::Bookmarks | Self::Filenames | Self::Headings | Self::Aliases => {
                Mode::HeadingsList
            }
            Self::Symbol(_) => Mode::SymbolList,
            Self::Relation(_) => Mode::RelatedItemsList,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Facet {
    pub id: FacetId,
    pub label: &'static str,
}

pub fn facets_for_mode(mode: Mode) -> Vec<Facet> {
    match mode {
        Mode::HeadingsList => vec![
            Facet {
                id: FacetId::RecentFiles,
                label: "recent files",
            },
            Facet {
                id: FacetId::Bookmarks,
                label: "bookmarks",
            },
            Facet {
                id: FacetId::Filenames,
                label: "filenames",
            },
            Facet {
                id: FacetId::Headings,
                label: "headings",
            },
            Facet {
                id: FacetId::Aliases,
                label: "aliases",
            },
        ],
        Mode::SymbolList => SymbolType::ALL
            .into_iter()
            .map(|symbol_type| Facet {
                id: FacetId::Symbol(symbol_type),
                label: symbol_type.label(),
            })
            .collect(),
        Mode::RelatedItemsList => vec![
            Facet {
                id: FacetId::Relation(RelationType::Backlink),
                label: "backlinks",
            },
            Facet {
                id: FacetId::Relation(RelationType::DiskLocation),
                label: "disk location",
            },
            Facet {
                id: FacetId::Relation(RelationType::OutgoingLink),
                label: "outgoing links",
            },
        ],
        _ => Vec::new(),
    }
}

pub struct FacetFilter {
    active: BTreeSet<FacetId>,
}

impl FacetFilter {
    pub fn new(mode: Mode, active: &BTreeSet<FacetId>) -> Self {
        Self {
            active: active.iter().copied().filter(|id| id.mode() == mode).collect(),
        }
    }

    pub fn is_filtering(&self) -> bool {
        !self.active.is_empty()
    }

    pub fn allows(&self, id: FacetId, enabled_by_settings: bool) -> bool {
        if self.is_filtering() {
            self.active.contains(&id)
        } else {
            enabled_by_settings
        }
    }
}
