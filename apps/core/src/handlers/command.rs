use std::collections::BTreeMap;

use super::base::{finalize, log_navigation_error, searcher};
use super::{Handler, HandlerContext};
use crate::input_info::{InputInfo, Mode};
use crate::model::CommandInfo;
use crate::search::SearchResult;
use crate::suggestion::{ChooseModifiers, Flair, RenderedSuggestion, Suggestion, SuggestionKind};

#[derive(Debug, Default)]
pub struct CommandHandler;

impl CommandHandler {
    /// With no filter, recently used commands lead (most recent first) and the rest follow
    /// in host order. With a filter every command is a candidate.
    fn items(ctx: &HandlerContext<'_>, has_search_term: bool) -> Vec<(CommandInfo, bool)> {
        let commands = ctx.host.commands();
        let recent_ids: Vec<String> = ctx
            .host
            .recent_command_ids()
            .into_iter()
            .take(ctx.settings.max_recently_used_commands)
            .collect();

        if has_search_term {
            return commands
                .into_iter()
                .map(|command| {
                    let is_recent = recent_ids.contains(&command.id);
                    (command, is_recent)
                })
                .collect();
        }

        let mut by_id: BTreeMap<String, CommandInfo> =
            commands.iter().map(|c| (c.id.clone(), c.clone())).collect();
        let mut items: Vec<(CommandInfo, bool)> = recent_ids
            .iter()
            .filter_map(|id| by_id.remove(id))
            .map(|command| (command, true))
            .collect();
        items.extend(
            commands
                .into_iter()
                .filter(|c| by_id.contains_key(&c.id))
                .map(|command| (command, false)),
        );
        items
    }
}

impl Handler for CommandHandler {
    fn mode(&self) -> Mode {
        Mode::CommandList
    }

    fn get_suggestions(&self, ctx: &HandlerContext<'_>, input: Option<&InputInfo>) -> Vec<Suggestion> {
        let Some(input) = input else {
            return Vec::new();
        };
        let searcher = searcher(ctx, input);

        let mut suggestions: Vec<Suggestion> = Self::items(ctx, searcher.has_search_term())
            .into_iter()
            .filter_map(|(command, is_recent)| {
                let search = if searcher.has_search_term() {
                    let result = searcher.search_text(&command.name);
                    if !result.is_match() {
                        return None;
                    }
                    result
                } else {
                    SearchResult::none()
                };
                Some(Suggestion::new(
                    SuggestionKind::Command { command, is_recent },
                    None,
                    search,
                ))
            })
            .collect();

        finalize(ctx, input, &mut suggestions, None);
        suggestions
    }

    fn render_suggestion(&self, _ctx: &HandlerContext<'_>, suggestion: &Suggestion) -> Option<RenderedSuggestion> {
        let SuggestionKind::Command { command, is_recent } = &suggestion.kind else {
            return None;
        };
        let mut rendered = RenderedSuggestion::new(command.name.clone(), None, suggestion);
        if *is_recent {
            rendered.flairs.push(Flair::Recent);
        }
        Some(rendered)
    }

    fn on_choose_suggestion(
        &self,
        ctx: &HandlerContext<'_>,
        suggestion: &Suggestion,
        _modifiers: ChooseModifiers,
    ) -> bool {
        let SuggestionKind::Command { command, .. } = &suggestion.kind else {
            return false;
        };
        log_navigation_error(&command.id, ctx.host.execute_command(&command.id));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::CommandHandler;
    use crate::config::{PathFilters, Settings};
    use crate::fuzzy::NucleoMatcher;
    use crate::handlers::HandlerContext;
    use crate::model::CommandInfo;
    use crate::vault::MemoryVault;

    fn command(id: &str, name: &str) -> CommandInfo {
        CommandInfo {
            id: id.to_string(),
            name: name.to_string(),
        }
    }

    #[test]
    fn recent_commands_lead_without_filter() {
        let mut vault = MemoryVault::default();
        vault.set_commands(vec![
            command("app:reload", "Reload app"),
            command("editor:fold", "Fold all"),
            command("graph:open", "Open graph view"),
        ]);
        vault.set_recent_command_ids(vec!["graph:open".to_string(), "gone:cmd".to_string()]);

        let settings = Settings::default();
        let filters = PathFilters::default();
        let matcher = NucleoMatcher::default();
        let ctx = HandlerContext {
            host: &vault,
            settings: &settings,
            filters: &filters,
            matcher: &matcher,
        };

        let ids: Vec<(String, bool)> = CommandHandler::items(&ctx, false)
            .into_iter()
            .map(|(c, recent)| (c.id, recent))
            .collect();
        assert_eq!(
            ids,
            vec![
                ("graph:open".to_string(), true),
                ("app:reload".to_string(), false),
                ("editor:fold".to_string(), false),
            ]
        );
    }
}
