//! Remote-search input with a trailing-edge debounce.

use std::time::{Duration, Instant};

use crate::config::{DEFAULT_DEBOUNCE_MS, DEFAULT_SEARCH_MIN_CHARS};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOption {
    pub value: String,
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchSettings {
    pub debounce: Duration,
    pub min_chars: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            min_chars: DEFAULT_SEARCH_MIN_CHARS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchPhase {
    Idle,
    /// `in_flight` is set when an earlier dispatch has not been answered yet.
    PendingDebounce {
        text: String,
        deadline: Instant,
        in_flight: bool,
    },
    AwaitingResponse {
        text: String,
    },
}

/// One answer from the caller. Every answer gets a new generation, so an
/// empty or repeated list still settles the request it answers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchResults {
    pub generation: u64,
    pub options: Vec<SearchOption>,
}

impl SearchResults {
    pub fn supply(&mut self, options: Vec<SearchOption>) {
        self.generation += 1;
        self.options = options;
    }
}

/// What the caller has to do after an input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputOutcome {
    /// Wake up at this instant and call [`SearchBox::poll`].
    pub deadline: Option<Instant>,
    /// The text no longer matches the selection; report `None` upward.
    pub clear_selection: bool,
}

/// Trims and collapses runs of whitespace to one space.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[derive(Debug, Clone)]
pub struct SearchBox {
    settings: SearchSettings,
    input: String,
    last_dispatched: Option<String>,
    phase: SearchPhase,
    options: Vec<SearchOption>,
    results_seen: u64,
    selected: Option<SearchOption>,
}

impl SearchBox {
    pub fn new(settings: SearchSettings) -> Self {
        Self {
            settings,
            input: String::new(),
            last_dispatched: None,
            phase: SearchPhase::Idle,
            options: Vec::new(),
            results_seen: 0,
            selected: None,
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn phase(&self) -> &SearchPhase {
        &self.phase
    }

    pub fn selected(&self) -> Option<&SearchOption> {
        self.selected.as_ref()
    }

    pub fn last_dispatched(&self) -> Option<&str> {
        self.last_dispatched.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        !matches!(self.phase, SearchPhase::Idle)
    }

    fn below_threshold(&self, trimmed: &str) -> bool {
        trimmed.chars().count() < self.settings.min_chars
    }

    fn in_flight(&self) -> bool {
        match &self.phase {
            SearchPhase::Idle => false,
            SearchPhase::PendingDebounce { in_flight, .. } => *in_flight,
            SearchPhase::AwaitingResponse { .. } => true,
        }
    }

    /// The single transition for typed text.
    pub fn on_input(&mut self, text: &str, now: Instant) -> InputOutcome {
        self.input = text.to_string();

        let clear_selection = match &self.selected {
            Some(option) if option.label != self.input => {
                self.selected = None;
                true
            }
            _ => false,
        };

        let trimmed = self.input.trim().to_string();
        let in_flight = self.in_flight();
        let deadline = if self.below_threshold(&trimmed) {
            self.last_dispatched = None;
            self.phase = SearchPhase::Idle;
            None
        } else if self.last_dispatched.as_deref() == Some(trimmed.as_str()) {
            self.phase = if in_flight {
                SearchPhase::AwaitingResponse { text: trimmed }
            } else {
                SearchPhase::Idle
            };
            None
        } else {
            let deadline = now + self.settings.debounce;
            self.phase = SearchPhase::PendingDebounce {
                text: trimmed,
                deadline,
                in_flight,
            };
            Some(deadline)
        };

        InputOutcome {
            deadline,
            clear_selection,
        }
    }

    /// Returns the text to search for once the debounce deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        let SearchPhase::PendingDebounce { text, deadline, .. } = &self.phase else {
            return None;
        };
        if now < *deadline {
            return None;
        }
        let text = text.clone();
        self.last_dispatched = Some(text.clone());
        self.phase = SearchPhase::AwaitingResponse { text: text.clone() };
        Some(text)
    }

    pub fn deadline(&self) -> Option<Instant> {
        match &self.phase {
            SearchPhase::PendingDebounce { deadline, .. } => Some(*deadline),
            _ => None,
        }
    }

    /// New options settle the outstanding request; a pending debounce stays pending.
    pub fn receive_options(&mut self, options: Vec<SearchOption>) {
        self.options = options;
        self.phase = match std::mem::replace(&mut self.phase, SearchPhase::Idle) {
            SearchPhase::PendingDebounce { text, deadline, .. } => SearchPhase::PendingDebounce {
                text,
                deadline,
                in_flight: false,
            },
            _ => SearchPhase::Idle,
        };
    }

    /// Applies `results` unless its generation was already applied.
    pub fn receive_results(&mut self, results: &SearchResults) -> bool {
        if results.generation == self.results_seen {
            return false;
        }
        self.results_seen = results.generation;
        self.receive_options(results.options.clone());
        true
    }

    pub fn visible_options(&self) -> &[SearchOption] {
        if self.is_loading() || self.below_threshold(self.input.trim()) {
            return &[];
        }
        &self.options
    }

    /// Picking an option puts its label in the box without searching again.
    pub fn select(&mut self, option: SearchOption) -> SearchOption {
        self.input = option.label.clone();
        self.last_dispatched = Some(option.label.trim().to_string());
        if let SearchPhase::PendingDebounce { in_flight, .. } = self.phase {
            self.phase = if in_flight {
                SearchPhase::AwaitingResponse {
                    text: option.label.trim().to_string(),
                }
            } else {
                SearchPhase::Idle
            };
        }
        self.selected = Some(option.clone());
        option
    }

    /// Normalizes the text on blur; unchanged text is not an input event.
    pub fn on_blur(&mut self, now: Instant) -> InputOutcome {
        let normalized = normalize_whitespace(&self.input);
        if normalized == self.input {
            return InputOutcome::default();
        }
        self.on_input(&normalized, now)
    }

    /// Pasted text replaces the input after normalization.
    pub fn on_paste(&mut self, pasted: &str, now: Instant) -> InputOutcome {
        self.on_input(&normalize_whitespace(pasted), now)
    }
}

impl Default for SearchBox {
    fn default() -> Self {
        Self::new(SearchSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn option(label: &str) -> SearchOption {
        SearchOption {
            value: format!("gtin-{label}"),
            label: label.to_string(),
        }
    }

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    /// Types `text` one character at a time, `gap` apart, polling between keys.
    fn type_slowly(
        search: &mut SearchBox,
        text: &str,
        start: Instant,
        gap: Duration,
    ) -> (Instant, Vec<String>) {
        let mut now = start;
        let mut dispatched = Vec::new();
        let mut typed = String::new();
        for ch in text.chars() {
            typed.push(ch);
            search.on_input(&typed, now);
            now += gap;
            dispatched.extend(search.poll(now));
        }
        (now, dispatched)
    }

    #[test]
    fn short_text_never_dispatches_or_loads() {
        let mut search = SearchBox::default();
        let start = Instant::now();

        let outcome = search.on_input("ab", start);

        assert_eq!(outcome.deadline, None);
        assert!(!search.is_loading());
        assert_eq!(search.poll(start + ms(5_000)), None);
        assert!(!search.is_loading());
    }

    #[test]
    fn settled_input_dispatches_once_with_trimmed_text() {
        let mut search = SearchBox::default();
        let start = Instant::now();

        let (now, dispatched) = type_slowly(&mut search, "  lavat", start, ms(100));
        assert!(dispatched.is_empty());
        assert!(search.is_loading());

        assert_eq!(search.poll(now + ms(700)), Some("lavat".to_string()));
        assert_eq!(search.poll(now + ms(2_000)), None);
        assert_eq!(search.last_dispatched(), Some("lavat"));
    }

    #[test]
    fn keystroke_within_window_restarts_the_timer() {
        let mut search = SearchBox::default();
        let start = Instant::now();

        search.on_input("forno", start);
        let restarted = search.on_input("forno e", start + ms(500));

        assert_eq!(restarted.deadline, Some(start + ms(1_300)));
        assert_eq!(search.poll(start + ms(900)), None);
        assert_eq!(search.poll(start + ms(1_300)), Some("forno e".to_string()));
    }

    #[test]
    fn dropping_below_threshold_clears_last_dispatched() {
        let mut search = SearchBox::default();
        let start = Instant::now();
        search.on_input("frigo", start);
        search.poll(start + ms(800));

        search.on_input("fri", start + ms(900));
        assert_eq!(search.last_dispatched(), None);
        assert!(!search.is_loading());

        let again = search.on_input("frigo", start + ms(1_000));
        assert_eq!(again.deadline, Some(start + ms(1_800)));
    }

    #[test]
    fn returning_to_dispatched_text_cancels_pending_debounce() {
        let mut search = SearchBox::default();
        let start = Instant::now();
        search.on_input("cappa", start);
        search.poll(start + ms(800));
        search.receive_options(vec![option("Cappa Etna")]);

        search.on_input("cappaa", start + ms(1_000));
        let outcome = search.on_input("cappa ", start + ms(1_100));

        assert_eq!(outcome.deadline, None);
        assert_eq!(search.phase(), &SearchPhase::Idle);
        assert_eq!(search.poll(start + ms(5_000)), None);
    }

    #[test]
    fn options_clear_loading_and_become_visible() {
        let mut search = SearchBox::default();
        let start = Instant::now();
        search.on_input("lavasciuga", start);
        search.poll(start + ms(800));
        assert!(search.visible_options().is_empty());

        search.receive_options(vec![option("Lavasciuga Vesuvio")]);

        assert!(!search.is_loading());
        assert_eq!(search.visible_options().len(), 1);
    }

    #[test]
    fn repeated_empty_answers_each_clear_loading() {
        let mut search = SearchBox::default();
        let mut results = SearchResults::default();
        let start = Instant::now();

        search.on_input("zzzz", start);
        search.poll(start + ms(800));
        results.supply(Vec::new());
        assert!(search.receive_results(&results));
        assert!(!search.is_loading());

        search.on_input("zzzzz", start + ms(1_000));
        search.poll(start + ms(1_800));
        assert!(search.is_loading());
        results.supply(Vec::new());
        assert!(search.receive_results(&results));
        assert!(!search.is_loading());
        assert!(search.visible_options().is_empty());

        assert!(!search.receive_results(&results));
    }

    #[test]
    fn editing_away_from_selection_clears_it() {
        let mut search = SearchBox::default();
        let start = Instant::now();
        search.select(option("Forno Laguna Pro 106"));

        let same = search.on_input("Forno Laguna Pro 106", start);
        let edited = search.on_input("Forno Laguna", start);

        assert!(!same.clear_selection);
        assert!(edited.clear_selection);
        assert!(search.selected().is_none());
    }

    #[test]
    fn blur_and_paste_collapse_whitespace() {
        let mut search = SearchBox::default();
        let start = Instant::now();

        search.on_input("  piano   cottura ", start);
        search.on_blur(start);
        assert_eq!(search.input(), "piano cottura");

        search.on_paste("\tforno \n  etna ", start);
        assert_eq!(search.input(), "forno etna");
        assert_eq!(normalize_whitespace("  a  b  "), "a b");
    }
}
