use std::cell::RefCell;

use nucleo_matcher::pattern::{AtomKind, CaseMatching, Normalization, Pattern};
use nucleo_matcher::{Config, Matcher, Utf32Str};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Match {
    pub score: f64,
    /// Half-open char ranges into the searched text, sorted and non-overlapping.
    pub matches: Vec<(usize, usize)>,
}

#[derive(Debug, Clone)]
pub struct PreparedQuery {
    raw: String,
    pattern: Pattern,
}

impl PreparedQuery {
    pub fn new(raw: &str) -> Self {
        let raw = raw.trim().to_string();
        let pattern = Pattern::new(
            &raw,
            CaseMatching::Ignore,
            Normalization::Smart,
            AtomKind::Fuzzy,
        );
        Self { raw, pattern }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }
}

pub trait FuzzyMatcher {
    fn fuzzy_match(&self, query: &PreparedQuery, text: &str) -> Option<Match>;
}

pub struct NucleoMatcher {
    matcher: RefCell<Matcher>,
}

impl Default for NucleoMatcher {
    fn default() -> Self {
        Self {
            matcher: RefCell::new(Matcher::new(Config::DEFAULT)),
        }
    }
}

impl FuzzyMatcher for NucleoMatcher {
    fn fuzzy_match(&self, query: &PreparedQuery, text: &str) -> Option<Match> {
        if query.is_empty() || text.is_empty() {
            return None;
        }

        let mut haystack_buf = Vec::new();
        let mut indices = Vec::new();
        let mut matcher = self.matcher.borrow_mut();
        let score = query.pattern.indices(
            Utf32Str::new(text, &mut haystack_buf),
            &mut matcher,
            &mut indices,
        )?;

        indices.sort_unstable();
        indices.dedup();
        Some(Match {
            score: f64::from(score),
            matches: collapse_ranges(&indices),
        })
    }
}

fn collapse_ranges(indices: &[u32]) -> Vec<(usize, usize)> {
    let mut ranges: Vec<(usize, usize)> = Vec::new();
    for &index in indices {
        let index = index as usize;
        match ranges.last_mut() {
            Some(last) if last.1 == index => last.1 = index + 1,
            _ => ranges.push((index, index + 1)),
        }
    }
    ranges
}
