use tracing::error;

use super::HandlerContext;
use crate::config::Settings;
use crate::host::{Host, HostError, NavigationState, OpenIntent};
use crate::input_info::{InputInfo, Mode, SourceInfo};
use crate::model::{FileRef, Leaf, ROOT_FOLDER};
use crate::search::{rank, RankOptions, Searcher};
use crate::session::SessionState;
use crate::suggestion::{ChooseModifiers, RenderedSuggestion, Suggestion, SuggestionKind};

pub fn get_open_leaves(host: &dyn Host, settings: &Settings) -> Vec<Leaf> {
    host.leaves()
        .into_iter()
        .filter(|leaf| is_listed_leaf(leaf, settings))
        .collect()
}

fn is_listed_leaf(leaf: &Leaf, settings: &Settings) -> bool {
    if settings.is_excluded_view_type(&leaf.view_type) {
        return false;
    }
    leaf.is_main_area
        || settings
            .include_side_panel_view_types
            .iter()
            .any(|v| *v == leaf.view_type)
}

/// Finds an open leaf showing `file`. The active leaf wins when it matches.
///
/// Reference views (backlinks, outline, ...) only match when
/// `include_reference_views` is set or when they are the `hint` leaf itself.
pub fn find_matching_leaf(
    ctx: &HandlerContext<'_>,
    file: &FileRef,
    hint: Option<&Leaf>,
    include_reference_views: bool,
) -> Option<Leaf> {
    let settings = ctx.settings;
    let is_match = |candidate: &Leaf| {
        let same_file = candidate
            .file
            .as_ref()
            .is_some_and(|f| f.path == file.path);
        if !same_file || settings.is_excluded_view_type(&candidate.view_type) {
            return false;
        }
        if settings.is_reference_view(&candidate.view_type) {
            return include_reference_views || hint.is_some_and(|h| h.id == candidate.id);
        }
        true
    };

    if let Some(active) = ctx.host.active_leaf().filter(|leaf| is_match(leaf)) {
        return Some(active);
    }
    ctx.host.leaves().into_iter().find(|leaf| is_match(leaf))
}

pub fn source_from_suggestion(ctx: &HandlerContext<'_>, suggestion: &Suggestion) -> Option<SourceInfo> {
    if !suggestion.suggestion_type().is_source_eligible() {
        return None;
    }

    let (file, leaf) = match &suggestion.kind {
        SuggestionKind::Editor { leaf } => (leaf.file.clone()?, Some(leaf.clone())),
        _ => {
            let file = suggestion.file.clone()?;
            let leaf = find_matching_leaf(ctx, &file, None, false);
            (file, leaf)
        }
    };
    Some(SourceInfo::from_suggestion(file, leaf, suggestion))
}

pub fn source_from_active_leaf(ctx: &HandlerContext<'_>, leaf: Option<&Leaf>) -> Option<SourceInfo> {
    let leaf = leaf?;
    if ctx.settings.is_excluded_view_type(&leaf.view_type) || leaf.file.is_none() {
        return None;
    }
    Some(SourceInfo::from_leaf(leaf))
}

/// Resolves the anchor for a sourced mode: the source already in progress, then the
/// highlighted suggestion, then (prefix invocations only) the active leaf.
#[allow(clippy::too_many_arguments)]
pub fn validate_sourced_command(
    ctx: &HandlerContext<'_>,
    state: &mut SessionState,
    input: &mut InputInfo,
    mode: Mode,
    index: usize,
    filter_text: &str,
    active_suggestion: Option<&Suggestion>,
    active_leaf: Option<&Leaf>,
) -> bool {
    let source = state
        .persisted_source(mode, index)
        .cloned()
        .or_else(|| active_suggestion.and_then(|s| source_from_suggestion(ctx, s)))
        .or_else(|| {
            if index == 0 {
                source_from_active_leaf(ctx, active_leaf)
            } else {
                None
            }
        });

    match source {
        Some(source) if source.is_valid_source => {
            state.persist_source(mode, index, source.clone());
            input.validate(mode, index, filter_text, Some(source));
            true
        }
        _ => {
            state.reset_source(mode);
            false
        }
    }
}

pub fn searcher<'a>(ctx: &HandlerContext<'a>, input: &InputInfo) -> Searcher<'a> {
    Searcher::new(ctx.matcher, &input.search_query.query)
}

pub fn finalize(
    ctx: &HandlerContext<'_>,
    input: &InputInfo,
    suggestions: &mut Vec<Suggestion>,
    limit: Option<usize>,
) {
    for suggestion in suggestions.iter_mut() {
        input.current_workspace_env.annotate(suggestion, ctx.filters);
    }
    rank(
        suggestions,
        &RankOptions {
            has_search_term: input.search_query.has_search_term,
            priorities: Some(&ctx.settings.match_priority_adjustments),
            limit,
        },
    );
}

pub fn open_intent(settings: &Settings, modifiers: ChooseModifiers) -> OpenIntent {
    OpenIntent {
        new_leaf: modifiers.mod_key || settings.on_open_prefer_new_tab,
    }
}

/// Activates a leaf already showing `file`, or opens it. Failures are logged, never raised.
pub fn navigate_to_leaf_or_open_file(
    ctx: &HandlerContext<'_>,
    file: &FileRef,
    modifiers: ChooseModifiers,
    state: Option<NavigationState>,
    hint: Option<&Leaf>,
    include_reference_views: bool,
) {
    let existing = if modifiers.mod_key {
        None
    } else {
        find_matching_leaf(ctx, file, hint, include_reference_views)
    };

    let result = match existing {
        Some(leaf) => ctx.host.activate_leaf(leaf.id, state.as_ref()),
        None => ctx
            .host
            .open_file(file, open_intent(ctx.settings, modifiers), state.as_ref()),
    };
    log_navigation_error(&file.path, result);
}

pub fn log_navigation_error(target: &str, result: Result<(), HostError>) {
    if let Err(err) = result {
        error!(target_path = target, "error navigating to {target}: {err}");
    }
}

pub fn folder_note(file: &FileRef) -> Option<String> {
    (file.parent_path() != ROOT_FOLDER).then(|| file.parent_path().to_string())
}

pub fn render_file_row(file: &FileRef, suggestion: &Suggestion) -> RenderedSuggestion {
    RenderedSuggestion::new(file.basename.clone(), folder_note(file), suggestion)
}
