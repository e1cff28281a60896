use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::config::{MatchPriorityAdjustments, PriorityKey};
use crate::fuzzy::{FuzzyMatcher, Match, PreparedQuery};
use crate::model::{FileRef, ROOT_FOLDER};
use crate::suggestion::{Suggestion, SuggestionKind};

/// Subtracted once per fallback tier so a primary-field match always wins a tie.
pub const FALLBACK_PENALTY: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    None,
    Primary,
    Basename,
    ParentPath,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub match_type: MatchType,
    pub match_text: Option<String>,
    pub matched: Option<Match>,
}

impl SearchResult {
    pub fn none() -> Self {
        Self {
            match_type: MatchType::None,
            match_text: None,
            matched: None,
        }
    }

    pub fn is_match(&self) -> bool {
        self.matched.is_some()
    }
}

impl Default for SearchResult {
    fn default() -> Self {
        Self::none()
    }
}

pub struct Searcher<'a> {
    matcher: &'a dyn FuzzyMatcher,
    query: PreparedQuery,
}

impl<'a> Searcher<'a> {
    pub fn new(matcher: &'a dyn FuzzyMatcher, query: &str) -> Self {
        Self {
            matcher,
            query: PreparedQuery::new(query),
        }
    }

    pub fn has_search_term(&self) -> bool {
        !self.query.is_empty()
    }

    pub fn search(&self, text: &str) -> Option<Match> {
        if !self.has_search_term() {
            return None;
        }
        self.matcher.fuzzy_match(&self.query, text)
    }

    pub fn search_text(&self, text: &str) -> SearchResult {
        self.search_with_fallback(Some(text), None)
    }

    pub fn search_with_fallback(&self, primary: Option<&str>, file: Option<&FileRef>) -> SearchResult {
        if let Some(text) = primary {
            if let Some(matched) = self.search(text) {
                return SearchResult {
                    match_type: MatchType::Primary,
                    match_text: Some(text.to_string()),
                    matched: Some(matched),
                };
            }
        }

        let Some(file) = file else {
            return SearchResult::none();
        };

        let mut candidates = vec![(MatchType::Basename, file.basename.as_str())];
        if file.parent_path() != ROOT_FOLDER {
            candidates.push((MatchType::ParentPath, file.parent_path()));
        }

        for (tier, (match_type, text)) in candidates.into_iter().enumerate() {
            if let Some(mut matched) = self.search(text) {
                matched.score -= FALLBACK_PENALTY * (tier + 1) as f64;
                return SearchResult {
                    match_type,
                    match_text: Some(text.to_string()),
                    matched: Some(matched),
                };
            }
        }

        SearchResult::none()
    }
}

#[derive(Debug, Clone, Default)]
pub struct RankOptions<'a> {
    pub has_search_term: bool,
    pub priorities: Option<&'a MatchPriorityAdjustments>,
    pub limit: Option<usize>,
}

pub fn rank(suggestions: &mut Vec<Suggestion>, options: &RankOptions<'_>) {
    if options.has_search_term {
        if let Some(priorities) = options.priorities {
            apply_match_priority_preferences(suggestions, priorities);
        }
        sort_by_score(suggestions);
    } else {
        sort_downranked_last(suggestions);
    }

    if let Some(limit) = options.limit {
        suggestions.truncate(limit);
    }
}

/// Descending score; ties keep their insertion order. Downranked items follow the rest.
pub fn sort_by_score(suggestions: &mut [Suggestion]) {
    suggestions.sort_by(|a, b| {
        a.provenance
            .downranked
            .cmp(&b.provenance.downranked)
            .then_with(|| compare_scores(b.score(), a.score()))
    });
}

fn sort_downranked_last(suggestions: &mut [Suggestion]) {
    suggestions.sort_by_key(|s| s.provenance.downranked);
}

fn compare_scores(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}

pub fn apply_match_priority_preferences(
    suggestions: &mut [Suggestion],
    priorities: &MatchPriorityAdjustments,
) {
    if !priorities.is_enabled {
        return;
    }

    for suggestion in suggestions.iter_mut() {
        let bonus: f64 = priority_keys(suggestion)
            .into_iter()
            .filter_map(|key| priorities.adjustments.get(&key))
            .sum();
        if let Some(matched) = suggestion.search.matched.as_mut() {
            matched.score += bonus;
        }
    }
}

fn priority_keys(suggestion: &Suggestion) -> Vec<PriorityKey> {
    let mut keys = Vec::new();
    let provenance = suggestion.provenance;
    if provenance.is_open_in_editor {
        keys.push(PriorityKey::IsOpenInEditor);
    }
    if provenance.is_bookmarked {
        keys.push(PriorityKey::IsBookmarked);
    }
    if provenance.is_recent {
        keys.push(PriorityKey::IsRecent);
    }
    match &suggestion.kind {
        SuggestionKind::Alias { .. } => keys.push(PriorityKey::IsAlias),
        SuggestionKind::File => keys.push(PriorityKey::File),
        _ if suggestion.is_h1_heading() => keys.push(PriorityKey::IsH1),
        _ => {}
    }
    keys
}
