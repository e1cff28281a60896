use super::base::{finalize, log_navigation_error, searcher};
use super::{Handler, HandlerContext};
use crate::input_info::{InputInfo, Mode};
use crate::search::SearchResult;
use crate::suggestion::{ChooseModifiers, Flair, RenderedSuggestion, Suggestion, SuggestionKind};

#[derive(Debug, Default)]
pub struct WorkspaceHandler;

impl Handler for WorkspaceHandler {
    fn mode(&self) -> Mode {
        Mode::WorkspaceList
    }

    fn get_suggestions(&self, ctx: &HandlerContext<'_>, input: Option<&InputInfo>) -> Vec<Suggestion> {
        let Some(input) = input else {
            return Vec::new();
        };
        let searcher = searcher(ctx, input);
        let active = ctx.host.active_workspace();

        let mut suggestions: Vec<Suggestion> = ctx
            .host
            .workspaces()
            .into_iter()
            .filter_map(|name| {
                let search = if searcher.has_search_term() {
                    let result = searcher.search_text(&name);
                    if !result.is_match() {
                        return None;
                    }
                    result
                } else {
                    SearchResult::none()
                };
                let is_active = active.as_deref() == Some(name.as_str());
                Some(Suggestion::new(
                    SuggestionKind::Workspace { name, is_active },
                    None,
                    search,
                ))
            })
            .collect();

        finalize(ctx, input, &mut suggestions, None);
        suggestions
    }

    fn render_suggestion(&self, _ctx: &HandlerContext<'_>, suggestion: &Suggestion) -> Option<RenderedSuggestion> {
        let SuggestionKind::Workspace { name, is_active } = &suggestion.kind else {
            return None;
        };
        let mut rendered = RenderedSuggestion::new(name.clone(), None, suggestion);
        if *is_active {
            rendered.flairs.push(Flair::Active);
        }
        Some(rendered)
    }

    fn on_choose_suggestion(
        &self,
        ctx: &HandlerContext<'_>,
        suggestion: &Suggestion,
        _modifiers: ChooseModifiers,
    ) -> bool {
        let SuggestionKind::Workspace { name, .. } = &suggestion.kind else {
            return false;
        };
        log_navigation_error(name, ctx.host.load_workspace(name));
        true
    }
}
