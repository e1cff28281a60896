use super::base::{finalize, folder_note, log_navigation_error, navigate_to_leaf_or_open_file, searcher};
use super::{Handler, HandlerContext};
use crate::host::NavigationState;
use crate::input_info::{InputInfo, Mode};
use crate::model::{BookmarkItem, FileRef};
use crate::search::{SearchResult, Searcher};
use crate::suggestion::{ChooseModifiers, RenderedSuggestion, Suggestion, SuggestionKind};

#[derive(Debug, Clone, PartialEq)]
pub struct BookmarkInfo {
    pub item: BookmarkItem,
    pub bookmark_path: String,
}

pub fn flatten_bookmarks(items: &[BookmarkItem]) -> Vec<BookmarkInfo> {
    let mut out = Vec::new();
    flatten_into(items, "", &mut out);
    out
}

fn flatten_into(items: &[BookmarkItem], prefix: &str, out: &mut Vec<BookmarkInfo>) {
    for item in items {
        let title = item.display_title();
        let path = if prefix.is_empty() {
            title
        } else {
            format!("{prefix}/{title}")
        };
        match item {
            BookmarkItem::Group { items, .. } => flatten_into(items, &path, out),
            _ => out.push(BookmarkInfo {
                item: item.clone(),
                bookmark_path: path,
            }),
        }
    }
}

#[derive(Debug, Default)]
pub struct BookmarksHandler;

impl BookmarksHandler {
    pub fn items(ctx: &HandlerContext<'_>) -> Vec<(BookmarkInfo, Option<FileRef>)> {
        flatten_bookmarks(&ctx.host.bookmarks())
            .into_iter()
            .filter_map(|info| match info.item.file_path() {
                Some(path) => ctx.host.file_by_path(path).map(|file| (info, Some(file))),
                None => Some((info, None)),
            })
            .collect()
    }

    pub fn collect_suggestions(
        ctx: &HandlerContext<'_>,
        searcher: &Searcher<'_>,
        out: &mut Vec<Suggestion>,
    ) {
        for (info, file) in Self::items(ctx) {
            let search = if searcher.has_search_term() {
                let title = info.item.display_title();
                let result = searcher.search_with_fallback(Some(&title), file.as_ref());
                if !result.is_match() {
                    continue;
                }
                result
            } else {
                SearchResult::none()
            };

            out.push(Suggestion::new(
                SuggestionKind::Bookmark {
                    item: info.item,
                    bookmark_path: info.bookmark_path,
                },
                file,
                search,
            ));
        }
    }

    pub fn render(suggestion: &Suggestion) -> Option<RenderedSuggestion> {
        let SuggestionKind::Bookmark { item, bookmark_path } = &suggestion.kind else {
            return None;
        };
        let note = match item {
            BookmarkItem::Url { url, .. } => Some(url.clone()),
            BookmarkItem::Search { query, .. } => Some(format!("search: {query}")),
            _ => suggestion
                .file
                .as_ref()
                .and_then(folder_note)
                .or_else(|| bookmark_group(bookmark_path)),
        };
        Some(RenderedSuggestion::new(item.display_title(), note, suggestion))
    }

    pub fn choose(ctx: &HandlerContext<'_>, suggestion: &Suggestion, modifiers: ChooseModifiers) -> bool {
        let SuggestionKind::Bookmark { item, .. } = &suggestion.kind else {
            return false;
        };

        match (&suggestion.file, item) {
            (Some(file), BookmarkItem::File { subpath, .. }) => {
                let state = subpath.clone().map(|subpath| NavigationState {
                    cursor: None,
                    subpath: Some(subpath),
                });
                navigate_to_leaf_or_open_file(ctx, file, modifiers, state, None, false);
            }
            _ => log_navigation_error(&item.display_title(), ctx.host.open_bookmark(item)),
        }
        true
    }
}

fn bookmark_group(bookmark_path: &str) -> Option<String> {
    bookmark_path
        .rfind('/')
        .map(|index| bookmark_path[..index].to_string())
}

impl Handler for BookmarksHandler {
    fn mode(&self) -> Mode {
        Mode::BookmarksList
    }

    fn get_suggestions(&self, ctx: &HandlerContext<'_>, input: Option<&InputInfo>) -> Vec<Suggestion> {
        let Some(input) = input else {
            return Vec::new();
        };

        let mut suggestions = Vec::new();
        Self::collect_suggestions(ctx, &searcher(ctx, input), &mut suggestions);
        finalize(ctx, input, &mut suggestions, None);
        suggestions
    }

    fn render_suggestion(&self, _ctx: &HandlerContext<'_>, suggestion: &Suggestion) -> Option<RenderedSuggestion> {
        Self::render(suggestion)
    }

    fn on_choose_suggestion(
        &self,
        ctx: &HandlerContext<'_>,
        suggestion: &Suggestion,
        modifiers: ChooseModifiers,
    ) -> bool {
        Self::choose(ctx, suggestion, modifiers)
    }
}

#[cfg(test)]
mod tests {
    use super::flatten_bookmarks;
    use crate::model::BookmarkItem;

    #[test]
    fn flattens_groups_into_paths() {
        let items = vec![
            BookmarkItem::File {
                path: "Inbox.md".to_string(),
                title: None,
                subpath: None,
            },
            BookmarkItem::Group {
                title: "Work".to_string(),
                items: vec![
                    BookmarkItem::Search {
                        query: "tag:#todo".to_string(),
                        title: Some("Todos".to_string()),
                    },
                    BookmarkItem::Group {
                        title: "Deep".to_string(),
                        items: vec![BookmarkItem::Url {
                            url: "https://example.com".to_string(),
                            title: None,
                        }],
                    },
                ],
            },
        ];

        let paths: Vec<String> = flatten_bookmarks(&items)
            .into_iter()
            .map(|info| info.bookmark_path)
            .collect();
        assert_eq!(paths, vec!["Inbox", "Work/Todos", "Work/Deep/https://example.com"]);
    }
}
