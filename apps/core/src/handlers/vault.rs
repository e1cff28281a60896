use super::base::{finalize, log_navigation_error, searcher};
use super::{Handler, HandlerContext};
use crate::input_info::{InputInfo, Mode};
use crate::search::SearchResult;
use crate::suggestion::{ChooseModifiers, Flair, RenderedSuggestion, Suggestion, SuggestionKind};

#[derive(Debug, Default)]
pub struct VaultHandler;

impl Handler for VaultHandler {
    fn mode(&self) -> Mode {
        Mode::VaultList
    }

    fn get_suggestions(&self, ctx: &HandlerContext<'_>, input: Option<&InputInfo>) -> Vec<Suggestion> {
        let Some(input) = input else {
            return Vec::new();
        };
        let searcher = searcher(ctx, input);

        let mut suggestions: Vec<Suggestion> = ctx
            .host
            .vaults()
            .into_iter()
            .filter_map(|vault| {
                let search = if searcher.has_search_term() {
                    let result = searcher.search_text(&vault.name);
                    let result = if result.is_match() {
                        result
                    } else {
                        searcher.search_text(&vault.path)
                    };
                    if !result.is_match() {
                        return None;
                    }
                    result
                } else {
                    SearchResult::none()
                };
                Some(Suggestion::new(SuggestionKind::Vault { vault }, None, search))
            })
            .collect();

        finalize(ctx, input, &mut suggestions, None);
        suggestions
    }

    fn render_suggestion(&self, _ctx: &HandlerContext<'_>, suggestion: &Suggestion) -> Option<RenderedSuggestion> {
        let SuggestionKind::Vault { vault } = &suggestion.kind else {
            return None;
        };
        let mut rendered = RenderedSuggestion::new(vault.name.clone(), Some(vault.path.clone()), suggestion);
        if vault.is_open {
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
        let SuggestionKind::Vault { vault } = &suggestion.kind else {
            return false;
        };
        log_navigation_error(&vault.name, ctx.host.open_vault(vault));
        true
    }
}
