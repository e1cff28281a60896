use std::time::Instant;

use thiserror::Error;
use tracing::{debug, info};

use crate::config::{validate, ConfigError, PathFilters, Settings};
use crate::facets::{facets_for_mode, Facet, FacetId};
use crate::fuzzy::{FuzzyMatcher, NucleoMatcher};
use crate::handlers::HandlerContext;
use crate::host::Host;
use crate::input_info::{InputInfo, Mode, SessionOpts};
use crate::mode_handler::ModeHandler;
use crate::model::Leaf;
use crate::search::{rank, RankOptions};
use crate::session::{RequestToken, SessionState, WorkspaceEnvList};
use crate::suggestion::{ChooseModifiers, RenderedSuggestion, Suggestion};

#[derive(Debug, Error)]
pub enum SwitcherError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

#[derive(Debug)]
pub enum UpdateOutcome {
    Standard(InputInfo),
    Ready {
        token: RequestToken,
        input: InputInfo,
        suggestions: Vec<Suggestion>,
    },
    /// Headings search is debounced; call [`Switcher::poll_debounced`] once `due` has passed.
    Deferred { token: RequestToken, due: Instant },
}

pub struct Switcher {
    settings: Settings,
    filters: PathFilters,
    matcher: Box<dyn FuzzyMatcher>,
    modes: ModeHandler,
    state: SessionState,
    session_opts: SessionOpts,
    deferred: Option<InputInfo>,
}

fn context<'a>(
    host: &'a dyn Host,
    settings: &'a Settings,
    filters: &'a PathFilters,
    matcher: &'a dyn FuzzyMatcher,
) -> HandlerContext<'a> {
    HandlerContext {
        host,
        settings,
        filters,
        matcher,
    }
}

impl Switcher {
    pub fn new(settings: Settings, matcher: Box<dyn FuzzyMatcher>) -> Result<Self, SwitcherError> {
        validate(&settings)?;
        let filters = PathFilters::compile(&settings)?;
        Ok(Self {
            settings,
            filters,
            matcher,
            modes: ModeHandler::new(),
            state: SessionState::default(),
            session_opts: SessionOpts::default(),
            deferred: None,
        })
    }

    pub fn with_default_matcher(settings: Settings) -> Result<Self, SwitcherError> {
        Self::new(settings, Box::new(NucleoMatcher::default()))
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn open_session(&mut self, host: &dyn Host) {
        self.open_with(host, SessionOpts::default());
    }

    pub fn open_in_mode(&mut self, host: &dyn Host, mode: Mode) -> String {
        self.open_with(
            host,
            SessionOpts {
                opened_in_mode: Some(mode),
                should_close_on_backspace: mode != Mode::Standard,
            },
        );
        self.settings.trigger(mode).unwrap_or_default().to_string()
    }

    fn open_with(&mut self, host: &dyn Host, opts: SessionOpts) {
        let env = WorkspaceEnvList::capture(host, &self.settings);
        self.state.open(env, &self.settings);
        self.session_opts = opts;
        self.deferred = None;
        info!(session = self.state.session_id(), mode = ?opts.opened_in_mode, "switcher session opened");
    }

    pub fn close_session(&mut self) {
        if !self.state.is_open() {
            return;
        }
        self.state.close();
        self.deferred = None;
        self.session_opts = SessionOpts::default();
        info!("switcher session closed");
    }

    /// Backspace pressed on `input_text`. A session opened directly in a mode closes
    /// instead of deleting that mode's trigger. Returns true when the session closed.
    pub fn handle_backspace(&mut self, input_text: &str) -> bool {
        let opts = self.session_opts;
        let closes = opts.should_close_on_backspace
            && opts
                .opened_in_mode
                .and_then(|mode| self.settings.trigger(mode))
                .is_some_and(|trigger| input_text == trigger);
        if closes {
            self.close_session();
        }
        closes
    }

    pub fn update_suggestions(
        &mut self,
        host: &dyn Host,
        input_text: &str,
        active_suggestion: Option<&Suggestion>,
        active_leaf: Option<&Leaf>,
        now: Instant,
    ) -> UpdateOutcome {
        if !self.state.is_open() {
            self.open_session(host);
        }

        let ctx = context(host, &self.settings, &self.filters, self.matcher.as_ref());
        let input = self.modes.determine_run_mode(
            &ctx,
            &mut self.state,
            input_text,
            self.session_opts,
            active_suggestion,
            active_leaf,
        );

        self.state.debouncer_mut().cancel();
        self.deferred = None;
        let token = self.state.issue_token(input.mode);

        let Some(handler) = self.modes.handler(input.mode) else {
            return UpdateOutcome::Standard(input);
        };

        if input.mode == Mode::HeadingsList
            && input.search_query.has_search_term
            && self.state.debouncer_mut().is_enabled()
        {
            let due = self.state.debouncer_mut().arm(token, now);
            self.deferred = Some(input);
            return UpdateOutcome::Deferred { token, due };
        }

        let suggestions = handler.get_suggestions(&ctx, Some(&input));
        UpdateOutcome::Ready {
            token,
            input,
            suggestions,
        }
    }

    pub fn poll_debounced(&mut self, host: &dyn Host, now: Instant) -> Option<(RequestToken, Vec<Suggestion>)> {
        let token = self.state.debouncer_mut().take_ready(now)?;
        let input = self.deferred.take()?;
        if !self.state.is_current(&token) {
            debug!(sequence = token.sequence, "dropping superseded headings search");
            return None;
        }

        let ctx = context(host, &self.settings, &self.filters, self.matcher.as_ref());
        let handler = self.modes.handler(input.mode)?;
        Some((token, handler.get_suggestions(&ctx, Some(&input))))
    }

    pub fn pending_input(&self) -> Option<&InputInfo> {
        self.deferred.as_ref()
    }

    pub fn is_current(&self, token: &RequestToken) -> bool {
        self.state.is_current(token)
    }

    /// Passes results through only while `token` is the latest request of the live session.
    pub fn commit(&self, token: &RequestToken, suggestions: Vec<Suggestion>) -> Option<Vec<Suggestion>> {
        if self.state.is_current(token) {
            Some(suggestions)
        } else {
            debug!(sequence = token.sequence, mode = ?token.mode, "discarding stale suggestions");
            None
        }
    }

    pub fn render_suggestion(&self, host: &dyn Host, suggestion: &Suggestion) -> Option<RenderedSuggestion> {
        let ctx = context(host, &self.settings, &self.filters, self.matcher.as_ref());
        self.modes
            .handler_for_suggestion(suggestion)?
            .render_suggestion(&ctx, suggestion)
    }

    /// Dispatches the choice to the owning handler. A handled choice ends the session.
    pub fn choose_suggestion(
        &mut self,
        host: &dyn Host,
        suggestion: &Suggestion,
        modifiers: ChooseModifiers,
    ) -> bool {
        let ctx = context(host, &self.settings, &self.filters, self.matcher.as_ref());
        let handled = self
            .modes
            .handler_for_suggestion(suggestion)
            .is_some_and(|handler| handler.on_choose_suggestion(&ctx, suggestion, modifiers));
        if handled {
            self.close_session();
        }
        handled
    }

    pub fn facets(&self, mode: Mode) -> Vec<Facet> {
        facets_for_mode(mode)
    }

    pub fn toggle_facet(&mut self, id: FacetId) -> bool {
        self.state.toggle_facet(id)
    }

    pub fn clear_facets(&mut self) {
        self.state.clear_facets();
    }

    pub fn annotate_standard_suggestions(&self, input: &InputInfo, suggestions: &mut Vec<Suggestion>) {
        let env = self.state.env();
        for suggestion in suggestions.iter_mut() {
            env.annotate(suggestion, &self.filters);
        }
        rank(
            suggestions,
            &RankOptions {
                has_search_term: input.search_query.has_search_term,
                priorities: Some(&self.settings.match_priority_adjustments),
                limit: None,
            },
        );
    }
}
