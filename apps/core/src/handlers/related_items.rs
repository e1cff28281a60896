use std::collections::BTreeSet;

use super::base::{
    finalize, get_open_leaves, log_navigation_error, navigate_to_leaf_or_open_file, open_intent,
    render_file_row, searcher, validate_sourced_command,
};
use super::{Handler, HandlerContext};
use crate::facets::{FacetFilter, FacetId};
use crate::input_info::{InputInfo, Mode};
use crate::model::{FileRef, Leaf, VaultEntry};
use crate::search::SearchResult;
use crate::session::SessionState;
use crate::suggestion::{ChooseModifiers, Flair, RelationType, RenderedSuggestion, Suggestion, SuggestionKind};

#[derive(Debug, Clone, PartialEq)]
pub struct RelatedItem {
    pub file: Option<FileRef>,
    pub relation: RelationType,
    pub count: Option<u32>,
    pub unresolved_text: Option<String>,
}

impl RelatedItem {
    fn file(file: FileRef, relation: RelationType, count: Option<u32>) -> Self {
        Self {
            file: Some(file),
            relation,
            count,
            unresolved_text: None,
        }
    }
}

#[derive(Debug, Default)]
pub struct RelatedItemsHandler;

impl RelatedItemsHandler {
    pub fn get_related_items(ctx: &HandlerContext<'_>, source: &FileRef, facets: &FacetFilter) -> Vec<RelatedItem> {
        let enabled = |relation: RelationType| {
            facets.allows(
                FacetId::Relation(relation),
                ctx.settings.enabled_related_items.contains(&relation),
            )
        };

        let mut items = Vec::new();
        if enabled(RelationType::Backlink) {
            items.extend(backlinks(ctx, source));
        }
        if enabled(RelationType::DiskLocation) {
            items.extend(disk_location(ctx, source));
        }
        if enabled(RelationType::OutgoingLink) {
            items.extend(outgoing_links(ctx, source));
        }
        items
    }
}

/// Siblings of the source in its folder, optionally recursing into subfolders.
pub fn disk_location(ctx: &HandlerContext<'_>, source: &FileRef) -> Vec<RelatedItem> {
    let open_files: BTreeSet<String> = if ctx.settings.exclude_open_related_files {
        get_open_leaves(ctx.host, ctx.settings)
            .into_iter()
            .filter_map(|leaf| leaf.file.map(|f| f.path))
            .collect()
    } else {
        BTreeSet::new()
    };

    let mut items = Vec::new();
    let mut folders = vec![source.parent_path().to_string()];
    while let Some(folder) = folders.pop() {
        for entry in ctx.host.folder_children(&folder) {
            match entry {
                VaultEntry::File(file) => {
                    if file.path == source.path
                        || open_files.contains(&file.path)
                        || ctx.filters.is_excluded(&file.path)
                    {
                        continue;
                    }
                    items.push(RelatedItem::file(file, RelationType::DiskLocation, None));
                }
                VaultEntry::Folder(path) => {
                    if ctx.settings.include_related_subfolders && !ctx.filters.is_related_excluded(&path) {
                        folders.push(path);
                    }
                }
            }
        }
    }
    items
}

/// Links out of the source, resolved first, then unresolved targets. Self links are skipped.
pub fn outgoing_links(ctx: &HandlerContext<'_>, source: &FileRef) -> Vec<RelatedItem> {
    let mut items = Vec::new();
    if let Some(dests) = ctx.host.resolved_links().get(&source.path) {
        for (dest, count) in dests {
            if *dest == source.path {
                continue;
            }
            if let Some(file) = ctx.host.file_by_path(dest) {
                items.push(RelatedItem::file(file, RelationType::OutgoingLink, Some(*count)));
            }
        }
    }
    if let Some(dests) = ctx.host.unresolved_links().get(&source.path) {
        items.extend(dests.iter().map(|(text, count)| RelatedItem {
            file: None,
            relation: RelationType::OutgoingLink,
            count: Some(*count),
            unresolved_text: Some(text.clone()),
        }));
    }
    items
}

pub fn backlinks(ctx: &HandlerContext<'_>, source: &FileRef) -> Vec<RelatedItem> {
    ctx.host
        .resolved_links()
        .iter()
        .filter(|(from, _)| **from != source.path)
        .filter_map(|(from, dests)| {
            let count = *dests.get(&source.path)?;
            let file = ctx.host.file_by_path(from)?;
            Some(RelatedItem::file(file, RelationType::Backlink, Some(count)))
        })
        .collect()
}

impl Handler for RelatedItemsHandler {
    fn mode(&self) -> Mode {
        Mode::RelatedItemsList
    }

    fn validate_command(
        &self,
        ctx: &HandlerContext<'_>,
        state: &mut SessionState,
        input: &mut InputInfo,
        index: usize,
        filter_text: &str,
        active_suggestion: Option<&Suggestion>,
        active_leaf: Option<&Leaf>,
    ) -> bool {
        validate_sourced_command(
            ctx,
            state,
            input,
            Mode::RelatedItemsList,
            index,
            filter_text,
            active_suggestion,
            active_leaf,
        )
    }

    fn get_suggestions(&self, ctx: &HandlerContext<'_>, input: Option<&InputInfo>) -> Vec<Suggestion> {
        let Some(input) = input else {
            return Vec::new();
        };
        let Some(source) = input
            .parsed_command(Mode::RelatedItemsList)
            .source
            .as_ref()
            .and_then(|s| s.source_file())
        else {
            return Vec::new();
        };

        let facets = FacetFilter::new(Mode::RelatedItemsList, &input.active_facets);
        let searcher = searcher(ctx, input);

        let mut suggestions: Vec<Suggestion> = Self::get_related_items(ctx, source, &facets)
            .into_iter()
            .filter_map(|item| {
                let search = if searcher.has_search_term() {
                    let result = searcher.search_with_fallback(item.unresolved_text.as_deref(), item.file.as_ref());
                    if !result.is_match() {
                        return None;
                    }
                    result
                } else {
                    SearchResult::none()
                };
                Some(Suggestion::new(
                    SuggestionKind::RelatedItem {
                        relation: item.relation,
                        count: item.count,
                        unresolved_text: item.unresolved_text,
                    },
                    item.file,
                    search,
                ))
            })
            .collect();

        finalize(ctx, input, &mut suggestions, None);
        suggestions
    }

    fn render_suggestion(&self, _ctx: &HandlerContext<'_>, suggestion: &Suggestion) -> Option<RenderedSuggestion> {
        let SuggestionKind::RelatedItem {
            relation,
            count,
            unresolved_text,
        } = &suggestion.kind
        else {
            return None;
        };

        let mut rendered = match (&suggestion.file, unresolved_text) {
            (Some(file), _) => render_file_row(file, suggestion),
            (None, Some(text)) => RenderedSuggestion::new(text.clone(), Some("unresolved".to_string()), suggestion),
            (None, None) => return None,
        };
        rendered.flairs.push(Flair::Relation(*relation));
        if let Some(count) = count {
            rendered.flairs.push(Flair::Count(*count));
        }
        Some(rendered)
    }

    fn on_choose_suggestion(
        &self,
        ctx: &HandlerContext<'_>,
        suggestion: &Suggestion,
        modifiers: ChooseModifiers,
    ) -> bool {
        let SuggestionKind::RelatedItem { unresolved_text, .. } = &suggestion.kind else {
            return false;
        };

        match (&suggestion.file, unresolved_text) {
            (Some(file), _) => navigate_to_leaf_or_open_file(ctx, file, modifiers, None, None, false),
            (None, Some(text)) => log_navigation_error(
                text,
                ctx.host.open_link_text(text, "", open_intent(ctx.settings, modifiers)),
            ),
            (None, None) => return false,
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::{backlinks, disk_location, outgoing_links, RelatedItemsHandler};
    use crate::config::{PathFilters, Settings};
    use crate::facets::{FacetFilter, FacetId};
    use crate::fuzzy::NucleoMatcher;
    use crate::handlers::HandlerContext;
    use crate::input_info::Mode;
    use crate::model::FileRef;
    use crate::suggestion::RelationType;
    use crate::vault::MemoryVault;

    fn vault() -> MemoryVault {
        let mut vault = MemoryVault::default();
        vault.add_note("proj/Plan.md", "See [[Notes]] and [[Plan]] and [[Missing]].");
        vault.add_note("proj/Notes.md", "Back to [[Plan]] twice [[Plan]].");
        vault.add_note("proj/sub/Deep.md", "nothing");
        vault.add_note("other/Far.md", "[[Plan]]");
        vault
    }

    fn paths(items: &[super::RelatedItem]) -> Vec<String> {
        items
            .iter()
            .map(|i| {
                i.file
                    .as_ref()
                    .map(|f| f.path.clone())
                    .or_else(|| i.unresolved_text.clone())
                    .unwrap_or_default()
            })
            .collect()
    }

    #[test]
    fn collects_each_relation() {
        let vault = vault();
        let settings = Settings::default();
        let filters = PathFilters::default();
        let matcher = NucleoMatcher::default();
        let ctx = HandlerContext {
            host: &vault,
            settings: &settings,
            filters: &filters,
            matcher: &matcher,
        };
        let plan = FileRef::new("proj/Plan.md");

        assert_eq!(paths(&disk_location(&ctx, &plan)), vec!["proj/Notes.md"]);
        assert_eq!(paths(&outgoing_links(&ctx, &plan)), vec!["proj/Notes.md", "Missing"]);

        let back = backlinks(&ctx, &plan);
        assert_eq!(paths(&back), vec!["other/Far.md", "proj/Notes.md"]);
        assert_eq!(back[1].count, Some(2));
    }

    #[test]
    fn recurses_into_subfolders_when_enabled() {
        let vault = vault();
        let settings = Settings {
            include_related_subfolders: true,
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
        let mut found = paths(&disk_location(&ctx, &FileRef::new("proj/Plan.md")));
        found.sort();
        assert_eq!(found, vec!["proj/Notes.md", "proj/sub/Deep.md"]);
    }

    #[test]
    fn facets_restrict_relations() {
        let vault = vault();
        let settings = Settings::default();
        let filters = PathFilters::default();
        let matcher = NucleoMatcher::default();
        let ctx = HandlerContext {
            host: &vault,
            settings: &settings,
            filters: &filters,
            matcher: &matcher,
        };
        let active = BTreeSet::from([FacetId::Relation(RelationType::Backlink)]);
        let facets = FacetFilter::new(Mode::RelatedItemsList, &active);
        let items = RelatedItemsHandler::get_related_items(&ctx, &FileRef::new("proj/Plan.md"), &facets);
        assert!(items.iter().all(|i| i.relation == RelationType::Backlink));
        assert_eq!(items.len(), 2);
    }
}
