use serde::{Deserialize, Serialize};

use crate::input_info::{InputInfo, Mode};
use crate::search::MatchType;
use crate::suggestion::{Flair, RenderedSuggestion, Suggestion, SuggestionType};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SuggestionDto {
    pub kind: SuggestionType,
    pub title: String,
    pub note: Option<String>,
    pub path: Option<String>,
    pub score: Option<f64>,
    pub match_type: MatchType,
    pub title_matches: Vec<(usize, usize)>,
    pub note_matches: Vec<(usize, usize)>,
    pub flairs: Vec<Flair>,
    pub indent_level: usize,
    pub is_selected: bool,
}

impl SuggestionDto {
    pub fn new(suggestion: &Suggestion, rendered: RenderedSuggestion) -> Self {
        Self {
            kind: suggestion.suggestion_type(),
            title: rendered.title,
            note: rendered.note,
            path: suggestion.file.as_ref().map(|f| f.path.clone()),
            score: suggestion.score(),
            match_type: suggestion.match_type(),
            title_matches: rendered.title_matches,
            note_matches: rendered.note_matches,
            flairs: rendered.flairs,
            indent_level: rendered.indent_level,
            is_selected: rendered.is_selected,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryResponse {
    pub input: String,
    pub mode: Mode,
    pub filter: String,
    pub source: Option<String>,
    pub suggestions: Vec<SuggestionDto>,
}

impl QueryResponse {
    pub fn new(input: &InputInfo, suggestions: Vec<SuggestionDto>) -> Self {
        Self {
            input: input.input_text.clone(),
            mode: input.mode,
            filter: input.search_query.query.clone(),
            source: input
                .source()
                .and_then(|s| s.source_file())
                .map(|f| f.path.clone()),
            suggestions,
        }
    }
}
