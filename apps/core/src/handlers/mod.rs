pub mod base;
pub mod bookmarks;
pub mod command;
pub mod editor;
pub mod headings;
pub mod related_items;
pub mod symbol;
pub mod vault;
pub mod workspace;

use crate::config::{PathFilters, Settings};
use crate::fuzzy::FuzzyMatcher;
use crate::host::Host;
use crate::input_info::{InputInfo, Mode};
use crate::model::Leaf;
use crate::session::SessionState;
use crate::suggestion::{ChooseModifiers, RenderedSuggestion, Suggestion};

#[derive(Clone, Copy)]
pub struct HandlerContext<'a> {
    pub host: &'a dyn Host,
    pub settings: &'a Settings,
    pub filters: &'a PathFilters,
    pub matcher: &'a dyn FuzzyMatcher,
}

pub trait Handler {
    fn mode(&self) -> Mode;

    fn trigger<'s>(&self, settings: &'s Settings) -> &'s str {
        settings.trigger(self.mode()).unwrap_or_default()
    }

    #[allow(clippy::too_many_arguments)]
    fn validate_command(
        &self,
        _ctx: &HandlerContext<'_>,
        _state: &mut SessionState,
        input: &mut InputInfo,
        index: usize,
        filter_text: &str,
        _active_suggestion: Option<&Suggestion>,
        _active_leaf: Option<&Leaf>,
    ) -> bool {
        input.validate(self.mode(), index, filter_text, None);
        true
    }

    fn get_suggestions(&self, ctx: &HandlerContext<'_>, input: Option<&InputInfo>) -> Vec<Suggestion>;

    fn render_suggestion(
        &self,
        ctx: &HandlerContext<'_>,
        suggestion: &Suggestion,
    ) -> Option<RenderedSuggestion>;

    /// Returns whether the suggestion was handled here.
    fn on_choose_suggestion(
        &self,
        ctx: &HandlerContext<'_>,
        suggestion: &Suggestion,
        modifiers: ChooseModifiers,
    ) -> bool;
}
