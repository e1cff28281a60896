use super::base::{finalize, folder_note, get_open_leaves, log_navigation_error, navigate_to_leaf_or_open_file, searcher};
use super::{Handler, HandlerContext};
use crate::input_info::{InputInfo, Mode};
use crate::model::Leaf;
use crate::search::SearchResult;
use crate::suggestion::{ChooseModifiers, RenderedSuggestion, Suggestion, SuggestionKind};

#[derive(Debug, Default)]
pub struct EditorHandler;

impl EditorHandler {
    fn items(ctx: &HandlerContext<'_>) -> Vec<Leaf> {
        let mut leaves = get_open_leaves(ctx.host, ctx.settings);
        if ctx.settings.order_editor_list_by_access_time {
            leaves.sort_by(|a, b| b.last_active_time.cmp(&a.last_active_time));
        }
        leaves
    }
}

impl Handler for EditorHandler {
    fn mode(&self) -> Mode {
        Mode::EditorList
    }

    fn get_suggestions(&self, ctx: &HandlerContext<'_>, input: Option<&InputInfo>) -> Vec<Suggestion> {
        let Some(input) = input else {
            return Vec::new();
        };
        let searcher = searcher(ctx, input);

        let mut suggestions: Vec<Suggestion> = Self::items(ctx)
            .into_iter()
            .filter_map(|leaf| {
                let search = if searcher.has_search_term() {
                    let result = searcher.search_with_fallback(Some(&leaf.display_text), leaf.file.as_ref());
                    if !result.is_match() {
                        return None;
                    }
                    result
                } else {
                    SearchResult::none()
                };
                let file = leaf.file.clone();
                Some(Suggestion::new(SuggestionKind::Editor { leaf }, file, search))
            })
            .collect();

        finalize(ctx, input, &mut suggestions, None);
        suggestions
    }

    fn render_suggestion(&self, _ctx: &HandlerContext<'_>, suggestion: &Suggestion) -> Option<RenderedSuggestion> {
        let SuggestionKind::Editor { leaf } = &suggestion.kind else {
            return None;
        };
        let note = suggestion.file.as_ref().and_then(folder_note);
        Some(RenderedSuggestion::new(leaf.display_text.clone(), note, suggestion))
    }

    fn on_choose_suggestion(
        &self,
        ctx: &HandlerContext<'_>,
        suggestion: &Suggestion,
        modifiers: ChooseModifiers,
    ) -> bool {
        let SuggestionKind::Editor { leaf } = &suggestion.kind else {
            return false;
        };

        match (&leaf.file, modifiers.mod_key) {
            (Some(file), true) => navigate_to_leaf_or_open_file(ctx, file, modifiers, None, Some(leaf), true),
            _ => log_navigation_error(&leaf.display_text, ctx.host.activate_leaf(leaf.id, None)),
        }
        true
    }
}
