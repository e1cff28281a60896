use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;
use std::time::Duration;

use crate::config::{PathFilters, Settings};
use crate::debounce::Debouncer;
use crate::facets::FacetId;
use crate::handlers::base::get_open_leaves;
use crate::handlers::bookmarks::{flatten_bookmarks, BookmarkInfo};
use crate::host::Host;
use crate::input_info::{Mode, SourceInfo};
use crate::model::LeafId;
use crate::suggestion::{Suggestion, SuggestionKind};

#[derive(Debug, Clone, Default)]
pub struct WorkspaceEnvList {
    pub open_workspace_leaves: BTreeSet<LeafId>,
    pub open_workspace_files: BTreeSet<String>,
    pub most_recent_files: BTreeSet<String>,
    pub file_bookmarks: BTreeMap<String, Vec<BookmarkInfo>>,
}

impl WorkspaceEnvList {
    pub fn capture(host: &dyn Host, settings: &Settings) -> Self {
        let mut env = Self::default();

        for leaf in get_open_leaves(host, settings) {
            env.open_workspace_leaves.insert(leaf.id);
            if let Some(file) = leaf.file {
                env.open_workspace_files.insert(file.path);
            }
        }

        env.most_recent_files = host
            .recent_file_paths()
            .into_iter()
            .take(settings.max_recent_file_suggestions)
            .collect();

        for info in flatten_bookmarks(&host.bookmarks()) {
            if let Some(path) = info.item.file_path() {
                env.file_bookmarks
                    .entry(path.to_string())
                    .or_default()
                    .push(info);
            }
        }

        env
    }

    pub fn annotate(&self, suggestion: &mut Suggestion, filters: &PathFilters) {
        if let SuggestionKind::Editor { leaf } = &suggestion.kind {
            suggestion.provenance.is_open_in_editor = true;
            if leaf.file.is_none() {
                return;
            }
        }

        let Some(path) = suggestion.file.as_ref().map(|f| f.path.as_str()) else {
            return;
        };
        let provenance = &mut suggestion.provenance;
        provenance.is_open_in_editor |= self.open_workspace_files.contains(path);
        provenance.is_recent = self.most_recent_files.contains(path);
        provenance.is_bookmarked = self.file_bookmarks.contains_key(path);
        provenance.downranked = filters.is_downranked(path);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestToken {
    pub session_id: u64,
    pub sequence: u64,
    pub mode: Mode,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PersistedSource {
    pub index: usize,
    pub source: SourceInfo,
}

#[derive(Debug, Default)]
pub struct SessionState {
    session_id: u64,
    sequence: u64,
    is_open: bool,
    sources: BTreeMap<Mode, PersistedSource>,
    active_facets: BTreeSet<FacetId>,
    env: Rc<WorkspaceEnvList>,
    latest: Option<RequestToken>,
    debounce: Debouncer,
}

impl SessionState {
    pub fn open(&mut self, env: WorkspaceEnvList, settings: &Settings) {
        self.reset();
        self.session_id += 1;
        self.is_open = true;
        self.env = Rc::new(env);
        self.debounce = Debouncer::new(Duration::from_millis(settings.headings_search_debounce_ms));
        if settings.reset_active_facets_on_open {
            self.active_facets.clear();
        }
    }

    /// Clears sources, cancels pending work and invalidates every outstanding token.
    pub fn close(&mut self) {
        self.reset();
        self.is_open = false;
        self.session_id += 1;
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn session_id(&self) -> u64 {
        self.session_id
    }

    pub fn reset(&mut self) {
        self.sources.clear();
        self.debounce.cancel();
        self.latest = None;
    }

    pub fn reset_sources(&mut self) {
        self.sources.clear();
    }

    pub fn reset_source(&mut self, mode: Mode) {
        self.sources.remove(&mode);
    }

    /// The source persisted for `mode`, provided its trigger is still at `index`.
    pub fn persisted_source(&self, mode: Mode, index: usize) -> Option<&SourceInfo> {
        self.sources
            .get(&mode)
            .filter(|persisted| persisted.index == index)
            .map(|persisted| &persisted.source)
    }

    pub fn persist_source(&mut self, mode: Mode, index: usize, source: SourceInfo) {
        self.sources.insert(mode, PersistedSource { index, source });
    }

    pub fn has_source(&self, mode: Mode) -> bool {
        self.sources.contains_key(&mode)
    }

    pub fn env(&self) -> Rc<WorkspaceEnvList> {
        Rc::clone(&self.env)
    }

    pub fn active_facets(&self) -> &BTreeSet<FacetId> {
        &self.active_facets
    }

    pub fn toggle_facet(&mut self, id: FacetId) -> bool {
        if self.active_facets.remove(&id) {
            false
        } else {
            self.active_facets.insert(id);
            true
        }
    }

    pub fn clear_facets(&mut self) {
        self.active_facets.clear();
    }

    pub fn issue_token(&mut self, mode: Mode) -> RequestToken {
        self.sequence += 1;
        let token = RequestToken {
            session_id: self.session_id,
            sequence: self.sequence,
            mode,
        };
        self.latest = Some(token);
        token
    }

    pub fn is_current(&self, token: &RequestToken) -> bool {
        self.is_open && token.session_id == self.session_id && self.latest.as_ref() == Some(token)
    }

    pub fn debouncer_mut(&mut self) -> &mut Debouncer {
        &mut self.debounce
    }
}

#[cfg(test)]
mod tests {
    use super::{SessionState, WorkspaceEnvList};
    use crate::config::Settings;
    use crate::facets::FacetId;
    use crate::input_info::{Mode, SourceInfo};
    use crate::model::{FileRef, Leaf};

    fn source() -> SourceInfo {
        SourceInfo::from_leaf(&Leaf::markdown(1, FileRef::new("a.md")))
    }

    #[test]
    fn persisted_source_requires_same_index() {
        let mut state = SessionState::default();
        state.persist_source(Mode::SymbolList, 0, source());
        assert!(state.persisted_source(Mode::SymbolList, 0).is_some());
        assert!(state.persisted_source(Mode::SymbolList, 3).is_none());
        assert!(state.persisted_source(Mode::RelatedItemsList, 0).is_none());
    }

    #[test]
    fn close_clears_sources_and_invalidates_tokens() {
        let mut state = SessionState::default();
        state.open(WorkspaceEnvList::default(), &Settings::default());
        state.persist_source(Mode::SymbolList, 0, source());
        let token = state.issue_token(Mode::SymbolList);
        assert!(state.is_current(&token));

        state.close();
        assert!(!state.has_source(Mode::SymbolList));
        assert!(!state.is_current(&token));
    }

    #[test]
    fn newer_token_supersedes_older() {
        let mut state = SessionState::default();
        state.open(WorkspaceEnvList::default(), &Settings::default());
        let first = state.issue_token(Mode::SymbolList);
        let second = state.issue_token(Mode::HeadingsList);
        assert!(!state.is_current(&first));
        assert!(state.is_current(&second));
    }

    #[test]
    fn toggles_facets() {
        let mut state = SessionState::default();
        assert!(state.toggle_facet(FacetId::Bookmarks));
        assert!(!state.toggle_facet(FacetId::Bookmarks));
        assert!(state.active_facets().is_empty());
    }

    #[test]
    fn reopening_resets_facets_when_configured() {
        let mut state = SessionState::default();
        state.toggle_facet(FacetId::Headings);
        state.open(WorkspaceEnvList::default(), &Settings::default());
        assert!(state.active_facets().is_empty());

        let keep = Settings {
            reset_active_facets_on_open: false,
            ..Settings::default()
        };
        state.toggle_facet(FacetId::Headings);
        state.open(WorkspaceEnvList::default(), &keep);
        assert_eq!(state.active_facets().len(), 1);
    }
}
