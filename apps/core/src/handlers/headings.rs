use std::collections::BTreeSet;

use super::base::{finalize, log_navigation_error, navigate_to_leaf_or_open_file, open_intent, render_file_row, searcher};
use super::bookmarks::BookmarksHandler;
use super::{Handler, HandlerContext};
use crate::facets::{FacetFilter, FacetId};
use crate::host::NavigationState;
use crate::input_info::{InputInfo, Mode};
use crate::model::FileRef;
use crate::search::{SearchResult, Searcher};
use crate::suggestion::{ChooseModifiers, Flair, RenderedSuggestion, Suggestion, SuggestionKind};

#[derive(Debug, Clone, Copy)]
struct Categories {
    headings: bool,
    filenames: bool,
    filename_fallback: bool,
    aliases: bool,
    bookmarks: bool,
    recent_files: bool,
    unresolved: bool,
}

impl Categories {
    fn resolve(ctx: &HandlerContext<'_>, facets: &FacetFilter) -> Self {
        let settings = ctx.settings;
        Self {
            headings: facets.allows(FacetId::Headings, true),
            filenames: facets.allows(FacetId::Filenames, settings.should_search_filenames),
            filename_fallback: !facets.is_filtering() && !settings.strict_headings_only,
            aliases: facets.allows(FacetId::Aliases, settings.should_search_aliases),
            bookmarks: facets.allows(FacetId::Bookmarks, settings.should_search_bookmarks),
            recent_files: facets.allows(FacetId::RecentFiles, settings.should_search_recent_files),
            unresolved: !facets.is_filtering() && settings.should_search_unresolved,
        }
    }
}

#[derive(Debug, Default)]
pub struct HeadingsHandler;

impl HeadingsHandler {
    fn recent_files(ctx: &HandlerContext<'_>) -> Vec<FileRef> {
        ctx.host
            .recent_file_paths()
            .into_iter()
            .filter_map(|path| ctx.host.file_by_path(&path))
            .filter(|file| !ctx.filters.is_excluded(&file.path))
            .take(ctx.settings.max_recent_file_suggestions)
            .collect()
    }

    fn browse(ctx: &HandlerContext<'_>, facets: &FacetFilter, out: &mut Vec<Suggestion>) {
        if facets.allows(FacetId::RecentFiles, true) {
            out.extend(
                Self::recent_files(ctx)
                    .into_iter()
                    .map(|file| Suggestion::new(SuggestionKind::File, Some(file), SearchResult::none())),
            );
        }
        if facets.allows(FacetId::Bookmarks, false) {
            BookmarksHandler::collect_suggestions(ctx, &Searcher::new(ctx.matcher, ""), out);
        }
    }

    fn search(ctx: &HandlerContext<'_>, searcher: &Searcher<'_>, categories: Categories, out: &mut Vec<Suggestion>) {
        let settings = ctx.settings;
        let mut file_suggested: BTreeSet<String> = BTreeSet::new();

        if categories.recent_files {
            for file in Self::recent_files(ctx) {
                let search = searcher.search_with_fallback(None, Some(&file));
                if search.is_match() {
                    file_suggested.insert(file.path.clone());
                    out.push(Suggestion::new(SuggestionKind::File, Some(file), search));
                }
            }
        }

        for file in ctx.host.files() {
            if ctx.filters.is_excluded(&file.path) {
                continue;
            }

            let mut heading_matched = false;
            if let Some(cache) = file.is_markdown().then(|| ctx.host.file_cache(&file)).flatten() {
                if categories.headings {
                    let headings = cache
                        .headings
                        .iter()
                        .filter(|h| settings.search_all_headings || h.level == 1)
                        .take(if settings.search_all_headings { usize::MAX } else { 1 });
                    for heading in headings {
                        let search = searcher.search_text(&heading.heading);
                        if search.is_match() {
                            heading_matched = true;
                            out.push(Suggestion::new(
                                SuggestionKind::Heading {
                                    heading: heading.clone(),
                                },
                                Some(file.clone()),
                                search,
                            ));
                        }
                    }
                }

                if categories.aliases && !file_suggested.contains(&file.path) {
                    for alias in cache.aliases() {
                        let search = searcher.search_text(alias);
                        if search.is_match() {
                            file_suggested.insert(file.path.clone());
                            out.push(Suggestion::new(
                                SuggestionKind::Alias {
                                    alias: alias.clone(),
                                },
                                Some(file.clone()),
                                search,
                            ));
                            break;
                        }
                    }
                }
            }

            let wants_filename =
                categories.filenames || (categories.filename_fallback && !heading_matched);
            if wants_filename && !file_suggested.contains(&file.path) {
                let search = searcher.search_with_fallback(None, Some(&file));
                if search.is_match() {
                    file_suggested.insert(file.path.clone());
                    out.push(Suggestion::new(SuggestionKind::File, Some(file), search));
                }
            }
        }

        if categories.bookmarks {
            BookmarksHandler::collect_suggestions(ctx, searcher, out);
        }

        if categories.unresolved {
            let targets: BTreeSet<&String> = ctx
                .host
                .unresolved_links()
                .values()
                .flat_map(|dests| dests.keys())
                .collect();
            for target in targets {
                let search = searcher.search_text(target);
                if search.is_match() {
                    out.push(Suggestion::new(
                        SuggestionKind::Unresolved {
                            link_text: target.clone(),
                        },
                        None,
                        search,
                    ));
                }
            }
        }
    }
}

impl Handler for HeadingsHandler {
    fn mode(&self) -> Mode {
        Mode::HeadingsList
    }

    fn get_suggestions(&self, ctx: &HandlerContext<'_>, input: Option<&InputInfo>) -> Vec<Suggestion> {
        let Some(input) = input else {
            return Vec::new();
        };
        let facets = FacetFilter::new(Mode::HeadingsList, &input.active_facets);
        let searcher = searcher(ctx, input);

        let mut suggestions = Vec::new();
        if searcher.has_search_term() {
            let categories = Categories::resolve(ctx, &facets);
            Self::search(ctx, &searcher, categories, &mut suggestions);
        } else {
            Self::browse(ctx, &facets, &mut suggestions);
        }

        finalize(ctx, input, &mut suggestions, Some(ctx.settings.limit));
        suggestions
    }

    fn render_suggestion(&self, _ctx: &HandlerContext<'_>, suggestion: &Suggestion) -> Option<RenderedSuggestion> {
        match (&suggestion.kind, &suggestion.file) {
            (SuggestionKind::Heading { heading }, Some(file)) => {
                let mut rendered =
                    RenderedSuggestion::new(heading.heading.clone(), Some(file.path.clone()), suggestion);
                rendered.flairs.push(Flair::HeadingLevel(heading.level));
                Some(rendered)
            }
            (SuggestionKind::Alias { alias }, Some(file)) => Some(RenderedSuggestion::new(
                alias.clone(),
                Some(file.path.clone()),
                suggestion,
            )),
            (SuggestionKind::File, Some(file)) => Some(render_file_row(file, suggestion)),
            (SuggestionKind::Unresolved { link_text }, _) => Some(RenderedSuggestion::new(
                link_text.clone(),
                Some("unresolved".to_string()),
                suggestion,
            )),
            (SuggestionKind::Bookmark { .. }, _) => BookmarksHandler::render(suggestion),
            _ => None,
        }
    }

    fn on_choose_suggestion(
        &self,
        ctx: &HandlerContext<'_>,
        suggestion: &Suggestion,
        modifiers: ChooseModifiers,
    ) -> bool {
        match (&suggestion.kind, &suggestion.file) {
            (SuggestionKind::Heading { heading }, Some(file)) => {
                let state = NavigationState {
                    cursor: Some(heading.position.start),
                    subpath: Some(format!("#{}", heading.heading)),
                };
                navigate_to_leaf_or_open_file(ctx, file, modifiers, Some(state), None, false);
                true
            }
            (SuggestionKind::File | SuggestionKind::Alias { .. }, Some(file)) => {
                navigate_to_leaf_or_open_file(ctx, file, modifiers, None, None, false);
                true
            }
            (SuggestionKind::Unresolved { link_text }, _) => {
                let result = ctx
                    .host
                    .open_link_text(link_text, "", open_intent(ctx.settings, modifiers));
                log_navigation_error(link_text, result);
                true
            }
            (SuggestionKind::Bookmark { .. }, _) => BookmarksHandler::choose(ctx, suggestion, modifiers),
            _ => false,
        }
    }
}
