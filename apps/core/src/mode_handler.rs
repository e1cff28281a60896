use std::collections::BTreeMap;

use tracing::debug;

use crate::handlers::bookmarks::BookmarksHandler;
use crate::handlers::command::CommandHandler;
use crate::handlers::editor::EditorHandler;
use crate::handlers::headings::HeadingsHandler;
use crate::handlers::related_items::RelatedItemsHandler;
use crate::handlers::symbol::SymbolHandler;
use crate::handlers::vault::VaultHandler;
use crate::handlers::workspace::WorkspaceHandler;
use crate::handlers::{Handler, HandlerContext};
use crate::input_info::{InputInfo, Mode, SessionOpts};
use crate::model::Leaf;
use crate::session::SessionState;
use crate::suggestion::{Suggestion, SuggestionType};

/// Modes after which a sourced trigger may still be typed later in the input.
const EMBEDDING_MODES: [Mode; 4] = [
    Mode::Standard,
    Mode::EditorList,
    Mode::HeadingsList,
    Mode::BookmarksList,
];

pub struct ModeHandler {
    handlers: BTreeMap<Mode, Box<dyn Handler>>,
}

impl Default for ModeHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl ModeHandler {
    pub fn new() -> Self {
        let handlers: Vec<Box<dyn Handler>> = vec![
            Box::new(EditorHandler),
            Box::new(SymbolHandler),
            Box::new(HeadingsHandler),
            Box::new(BookmarksHandler),
            Box::new(CommandHandler),
            Box::new(RelatedItemsHandler),
            Box::new(WorkspaceHandler),
            Box::new(VaultHandler),
        ];
        Self {
            handlers: handlers.into_iter().map(|h| (h.mode(), h)).collect(),
        }
    }

    /// `None` for Standard mode, which the host serves itself.
    pub fn handler(&self, mode: Mode) -> Option<&dyn Handler> {
        self.handlers.get(&mode).map(|h| h.as_ref())
    }

    pub fn handler_for_suggestion(&self, suggestion: &Suggestion) -> Option<&dyn Handler> {
        let mode = match suggestion.suggestion_type() {
            SuggestionType::EditorList => Mode::EditorList,
            SuggestionType::SymbolList => Mode::SymbolList,
            SuggestionType::HeadingsList
            | SuggestionType::File
            | SuggestionType::Alias
            | SuggestionType::Unresolved => Mode::HeadingsList,
            SuggestionType::Bookmark => Mode::BookmarksList,
            SuggestionType::CommandList => Mode::CommandList,
            SuggestionType::RelatedItemsList => Mode::RelatedItemsList,
            SuggestionType::WorkspaceList => Mode::WorkspaceList,
            SuggestionType::VaultList => Mode::VaultList,
        };
        self.handler(mode)
    }

    /// Parses `input_text` into an [`InputInfo`], resolving sources for sourced modes.
    ///
    /// Prefix triggers are tried longest first. A sourced trigger may also appear after
    /// the filter text of an embedding mode (or of plain Standard input). Only the first
    /// occurrence of each trigger is a candidate and the leftmost candidate that validates
    /// wins. Sources of every sourced mode that did not end up active are cleared.
    pub fn determine_run_mode(
        &self,
        ctx: &HandlerContext<'_>,
        state: &mut SessionState,
        input_text: &str,
        session_opts: SessionOpts,
        active_suggestion: Option<&Suggestion>,
        active_leaf: Option<&Leaf>,
    ) -> InputInfo {
        let mut input = InputInfo::new(input_text, session_opts, state.env());
        input.active_facets = state.active_facets().clone();

        if input_text.is_empty() {
            state.reset_sources();
            return input;
        }

        let prefix_end = self.validate_prefix_command(
            ctx,
            state,
            &mut input,
            input_text,
            active_suggestion,
            active_leaf,
        );

        if EMBEDDING_MODES.contains(&input.mode) {
            self.validate_embedded_command(
                ctx,
                state,
                &mut input,
                input_text,
                prefix_end,
                active_suggestion,
                active_leaf,
            );
        }

        for mode in Mode::SOURCED {
            if mode != input.mode {
                state.reset_source(mode);
            }
        }

        debug!(mode = ?input.mode, input = input_text, "resolved run mode");
        input
    }

    fn triggers(&self, ctx: &HandlerContext<'_>) -> Vec<(Mode, String)> {
        let mut triggers: Vec<(Mode, String)> = self
            .handlers
            .values()
            .map(|h| (h.mode(), h.trigger(ctx.settings).to_string()))
            .filter(|(_, trigger)| !trigger.is_empty())
            .collect();
        triggers.sort_by(|a, b| b.1.len().cmp(&a.1.len()));
        triggers
    }

    fn validate_prefix_command(
        &self,
        ctx: &HandlerContext<'_>,
        state: &mut SessionState,
        input: &mut InputInfo,
        input_text: &str,
        active_suggestion: Option<&Suggestion>,
        active_leaf: Option<&Leaf>,
    ) -> usize {
        for (mode, trigger) in self.triggers(ctx) {
            let Some(filter_text) = input_text.strip_prefix(trigger.as_str()) else {
                continue;
            };
            let Some(handler) = self.handler(mode) else {
                continue;
            };
            if handler.validate_command(ctx, state, input, 0, filter_text, active_suggestion, active_leaf) {
                return trigger.len();
            }
        }
        0
    }

    #[allow(clippy::too_many_arguments)]
    fn validate_embedded_command(
        &self,
        ctx: &HandlerContext<'_>,
        state: &mut SessionState,
        input: &mut InputInfo,
        input_text: &str,
        search_start: usize,
        active_suggestion: Option<&Suggestion>,
        active_leaf: Option<&Leaf>,
    ) {
        let Some(tail) = input_text.get(search_start..) else {
            return;
        };

        let mut candidates: Vec<(usize, Mode, String)> = self
            .triggers(ctx)
            .into_iter()
            .filter(|(mode, _)| mode.is_sourced())
            .filter_map(|(mode, trigger)| {
                // a failed validation resets the source, so later occurrences never validate
                let index = search_start + tail.find(trigger.as_str())?;
                (index > 0).then_some((index, mode, trigger))
            })
            .collect();
        candidates.sort_by(|a, b| a.0.cmp(&b.0).then(b.2.len().cmp(&a.2.len())));

        for (index, mode, trigger) in candidates {
            let filter_text = &input_text[index + trigger.len()..];
            let Some(handler) = self.handler(mode) else {
                continue;
            };
            if handler.validate_command(ctx, state, input, index, filter_text, active_suggestion, active_leaf) {
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ModeHandler;
    use crate::config::{PathFilters, Settings};
    use crate::fuzzy::NucleoMatcher;
    use crate::handlers::HandlerContext;
    use crate::input_info::{Mode, SessionOpts};
    use crate::model::{FileRef, Leaf};
    use crate::session::SessionState;
    use crate::vault::MemoryVault;

    #[test]
    fn longer_trigger_wins_over_its_prefix() {
        let vault = MemoryVault::default();
        let settings = Settings {
            headings_list_command: "e".to_string(),
            ..Settings::default()
        };
        let filters = PathFilters::default();
        let matcher = NucleoMatcher::default();
        let ctx = HandlerContext {
            host: &vault,
            settings: &settings,
            filters: &filters,
            matcher: &matcher,
        };
        let modes = ModeHandler::new();
        let mut state = SessionState::default();

        let info = modes.determine_run_mode(&ctx, &mut state, "edt foo", SessionOpts::default(), None, None);
        assert_eq!(info.mode, Mode::EditorList);
        assert_eq!(info.search_query.query, "foo");

        let info = modes.determine_run_mode(&ctx, &mut state, "efoo", SessionOpts::default(), None, None);
        assert_eq!(info.mode, Mode::HeadingsList);
    }

    #[test]
    fn embedded_symbol_trigger_uses_active_suggestion() {
        let mut vault = MemoryVault::default();
        vault.add_note("a.md", "# A");
        let settings = Settings::default();
        let filters = PathFilters::default();
        let matcher = NucleoMatcher::default();
        let ctx = HandlerContext {
            host: &vault,
            settings: &settings,
            filters: &filters,
            matcher: &matcher,
        };
        let modes = ModeHandler::new();
        let mut state = SessionState::default();
        let leaf = Leaf::markdown(1, FileRef::new("a.md"));

        // no suggestion and not a prefix: the active leaf is not eligible
        let info = modes.determine_run_mode(&ctx, &mut state, "edt a@", SessionOpts::default(), None, Some(&leaf));
        assert_eq!(info.mode, Mode::EditorList);

        let suggestion = crate::suggestion::Suggestion::new(
            crate::suggestion::SuggestionKind::File,
            Some(FileRef::new("a.md")),
            crate::search::SearchResult::none(),
        );
        let info = modes.determine_run_mode(
            &ctx,
            &mut state,
            "edt a@x",
            SessionOpts::default(),
            Some(&suggestion),
            Some(&leaf),
        );
        assert_eq!(info.mode, Mode::SymbolList);
        assert_eq!(info.active_command().index, Some(5));
        assert_eq!(info.search_query.query, "x");
        assert_eq!(info.source().and_then(|s| s.file.clone()), Some(FileRef::new("a.md")));
    }

    #[test]
    fn first_embedded_occurrence_is_the_trigger() {
        let mut vault = MemoryVault::default();
        vault.add_note("a.md", "# A");
        let settings = Settings::default();
        let filters = PathFilters::default();
        let matcher = NucleoMatcher::default();
        let ctx = HandlerContext {
            host: &vault,
            settings: &settings,
            filters: &filters,
            matcher: &matcher,
        };
        let modes = ModeHandler::new();
        let mut state = SessionState::default();
        let suggestion = crate::suggestion::Suggestion::new(
            crate::suggestion::SuggestionKind::File,
            Some(FileRef::new("a.md")),
            crate::search::SearchResult::none(),
        );

        let info = modes.determine_run_mode(&ctx, &mut state, "a@b@x", SessionOpts::default(), Some(&suggestion), None);
        assert_eq!(info.mode, Mode::SymbolList);
        assert_eq!(info.active_command().index, Some(1));
        assert_eq!(info.search_query.query, "b@x");

        let info = modes.determine_run_mode(&ctx, &mut state, "a@b@x", SessionOpts::default(), None, None);
        assert_eq!(info.mode, Mode::SymbolList);
        assert_eq!(info.active_command().index, Some(1));
    }

    #[test]
    fn empty_input_resets_sources() {
        let vault = MemoryVault::default();
        let settings = Settings::default();
        let filters = PathFilters::default();
        let matcher = NucleoMatcher::default();
        let ctx = HandlerContext {
            host: &vault,
            settings: &settings,
            filters: &filters,
            matcher: &matcher,
        };
        let modes = ModeHandler::new();
        let mut state = SessionState::default();
        let leaf = Leaf::markdown(1, FileRef::new("a.md"));

        let info = modes.determine_run_mode(&ctx, &mut state, "@", SessionOpts::default(), None, Some(&leaf));
        assert_eq!(info.mode, Mode::SymbolList);
        assert!(state.has_source(Mode::SymbolList));

        let info = modes.determine_run_mode(&ctx, &mut state, "", SessionOpts::default(), None, Some(&leaf));
        assert_eq!(info.mode, Mode::Standard);
        assert!(!info.active_command().is_validated);
        assert!(!state.has_source(Mode::SymbolList));
    }
}
