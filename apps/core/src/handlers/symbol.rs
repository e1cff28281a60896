use tracing::warn;

use super::base::{finalize, navigate_to_leaf_or_open_file, searcher, validate_sourced_command};
use super::{Handler, HandlerContext};
use crate::facets::{FacetFilter, FacetId};
use crate::host::NavigationState;
use crate::input_info::{InputInfo, Mode, SourceInfo};
use crate::model::{FileCache, FileRef, Leaf, LinkCache, Position, Span};
use crate::session::SessionState;
use crate::suggestion::{
    ChooseModifiers, Flair, LinkSubType, RenderedSuggestion, Suggestion, SuggestionKind, SymbolInfo,
    SymbolType,
};

#[derive(Debug, Default)]
pub struct SymbolHandler;

impl SymbolHandler {
    pub fn get_symbols_from_source(
        ctx: &HandlerContext<'_>,
        source: &SourceInfo,
        facets: &FacetFilter,
    ) -> Vec<SymbolInfo> {
        let Some(file) = source.source_file() else {
            return Vec::new();
        };
        let Some(cache) = ctx.host.file_cache(file) else {
            return Vec::new();
        };
        let enabled = |symbol_type: SymbolType| {
            facets.allows(
                FacetId::Symbol(symbol_type),
                ctx.settings.is_symbol_type_enabled(symbol_type),
            )
        };

        let mut symbols = Vec::new();
        if enabled(SymbolType::Heading) {
            symbols.extend(cache.headings.iter().map(|h| SymbolInfo {
                heading_level: Some(h.level),
                ..symbol(SymbolType::Heading, h.heading.clone(), h.position)
            }));
        }
        if enabled(SymbolType::Tag) {
            symbols.extend(
                cache
                    .tags
                    .iter()
                    .map(|t| symbol(SymbolType::Tag, t.tag.clone(), t.position)),
            );
        }
        if enabled(SymbolType::Link) {
            symbols.extend(
                cache
                    .links
                    .iter()
                    .filter(|l| {
                        !ctx
                            .settings
                            .exclude_link_sub_types
                            .contains(&LinkSubType::of(&l.link))
                    })
                    .map(|l| link_symbol(SymbolType::Link, l)),
            );
        }
        if enabled(SymbolType::Embed) {
            symbols.extend(cache.embeds.iter().map(|l| link_symbol(SymbolType::Embed, l)));
        }
        if enabled(SymbolType::Callout) {
            symbols.extend(callout_symbols(ctx, file, cache));
        }
        symbols
    }
}

fn symbol(symbol_type: SymbolType, text: String, position: Span) -> SymbolInfo {
    SymbolInfo {
        symbol_type,
        text,
        position,
        heading_level: None,
        link_target: None,
        indent_level: 0,
        is_selected: false,
    }
}

fn link_symbol(symbol_type: SymbolType, link: &LinkCache) -> SymbolInfo {
    let text = link.display_text.clone().unwrap_or_else(|| link.link.clone());
    SymbolInfo {
        link_target: Some(link.link.clone()),
        ..symbol(symbol_type, text, link.position)
    }
}

/// Callout titles need the raw text. A read failure drops this file's callouts only.
fn callout_symbols(ctx: &HandlerContext<'_>, file: &FileRef, cache: &FileCache) -> Vec<SymbolInfo> {
    let sections: Vec<_> = cache.sections.iter().filter(|s| s.kind == "callout").collect();
    if sections.is_empty() {
        return Vec::new();
    }

    let content = match ctx.host.read_file(file) {
        Ok(content) => content,
        Err(err) => {
            warn!(path = %file.path, "failed to read callouts: {err}");
            return Vec::new();
        }
    };
    let lines: Vec<&str> = content.lines().collect();

    sections
        .into_iter()
        .filter_map(|section| {
            let line = lines.get(section.position.start.line)?;
            let title = callout_title(line)?;
            Some(symbol(SymbolType::Callout, title, section.position))
        })
        .collect()
}

/// `> [!note]- Title` yields "Title"; an untitled callout yields its type.
pub fn callout_title(line: &str) -> Option<String> {
    let rest = line.trim_start().strip_prefix('>')?.trim_start();
    let rest = rest.strip_prefix("[!")?;
    let close = rest.find(']')?;
    let kind = rest[..close].trim();
    let title = rest[close + 1..].trim_start_matches(['+', '-']).trim();
    if title.is_empty() {
        (!kind.is_empty()).then(|| kind.to_string())
    } else {
        Some(title.to_string())
    }
}

pub fn order_symbols_by_line_number(symbols: &mut [SymbolInfo]) {
    symbols.sort_by_key(|s| s.position.start);
    let mut current_indent = 0;
    for symbol in symbols.iter_mut() {
        if let Some(level) = symbol.heading_level {
            current_indent = usize::from(level.saturating_sub(1));
        }
        symbol.indent_level = current_indent;
    }
}

/// Selects the last heading starting at or before `cursor`; none when no heading precedes it.
pub fn mark_nearest_heading(symbols: &mut [SymbolInfo], cursor: Position) {
    let nearest = symbols
        .iter()
        .enumerate()
        .filter(|(_, s)| s.symbol_type == SymbolType::Heading && s.position.start.line <= cursor.line)
        .max_by_key(|(index, s)| (s.position.start.line, *index))
        .map(|(index, _)| index);

    for (index, symbol) in symbols.iter_mut().enumerate() {
        symbol.is_selected = Some(index) == nearest;
    }
}

impl Handler for SymbolHandler {
    fn mode(&self) -> Mode {
        Mode::SymbolList
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
            Mode::SymbolList,
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
        let Some(source) = input.parsed_command(Mode::SymbolList).source.as_ref() else {
            return Vec::new();
        };
        let Some(file) = source.source_file().cloned() else {
            return Vec::new();
        };

        let facets = FacetFilter::new(Mode::SymbolList, &input.active_facets);
        let searcher = searcher(ctx, input);
        let mut symbols = Self::get_symbols_from_source(ctx, source, &facets);

        if ctx.settings.symbols_in_line_order && !searcher.has_search_term() {
            order_symbols_by_line_number(&mut symbols);
        }
        if ctx.settings.select_nearest_heading && !searcher.has_search_term() {
            if let Some(cursor) = source.cursor {
                mark_nearest_heading(&mut symbols, cursor);
            }
        }

        let source_leaf = source.leaf.as_ref().map(|leaf| leaf.id);
        let mut suggestions: Vec<Suggestion> = symbols
            .into_iter()
            .filter_map(|symbol| {
                let search = searcher.search_text(&symbol.text);
                if searcher.has_search_term() && !search.is_match() {
                    return None;
                }
                Some(Suggestion::new(
                    SuggestionKind::Symbol { symbol, source_leaf },
                    Some(file.clone()),
                    search,
                ))
            })
            .collect();

        finalize(ctx, input, &mut suggestions, None);
        suggestions
    }

    fn render_suggestion(&self, _ctx: &HandlerContext<'_>, suggestion: &Suggestion) -> Option<RenderedSuggestion> {
        let symbol = suggestion.symbol()?;
        let mut rendered = RenderedSuggestion::new(symbol.text.clone(), None, suggestion);
        // file-level provenance is the same for every row here
        rendered.flairs.clear();
        rendered.flairs.push(Flair::Symbol(symbol.symbol_type));
        if let Some(level) = symbol.heading_level {
            rendered.flairs.push(Flair::HeadingLevel(level));
        }
        rendered.indent_level = symbol.indent_level;
        rendered.is_selected = symbol.is_selected;
        Some(rendered)
    }

    fn on_choose_suggestion(
        &self,
        ctx: &HandlerContext<'_>,
        suggestion: &Suggestion,
        modifiers: ChooseModifiers,
    ) -> bool {
        let (SuggestionKind::Symbol { symbol, source_leaf }, Some(file)) = (&suggestion.kind, &suggestion.file) else {
            return false;
        };

        let hint = source_leaf.and_then(|id| ctx.host.leaves().into_iter().find(|leaf| leaf.id == id));
        let state = NavigationState {
            cursor: Some(symbol.position.start),
            subpath: None,
        };
        navigate_to_leaf_or_open_file(ctx, file, modifiers, Some(state), hint.as_ref(), true);
        true
    }
}
