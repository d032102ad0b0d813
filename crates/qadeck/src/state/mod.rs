pub mod storage;
pub mod watch;

use storage::{HIGHLIGHTS_KEY, KeyValueStore, STEP_KEY};

/// Largest valid step for a deck with `question_count` questions.
pub fn max_step(question_count: usize) -> usize {
    (question_count * 2).saturating_sub(1)
}

/// Position in the deck plus the questions acknowledged since the last page turn.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepState {
    pub step: usize,
    /// Question ordinals. Duplicates are allowed, order is irrelevant.
    pub highlights: Vec<usize>,
}

impl StepState {
    /// Index of the question currently being revealed.
    pub fn question_number(&self) -> usize {
        self.step / 2
    }

    /// Whether the current question's answer is shown.
    pub fn is_answer_phase(&self) -> bool {
        self.step % 2 == 1
    }

    pub fn is_highlighted(&self, ordinal: usize) -> bool {
        self.highlights.contains(&ordinal)
    }

    /// Read persisted state. Missing, unreadable or malformed values fall back
    /// to the defaults; this never fails.
    pub fn load(store: &impl KeyValueStore, max_step: usize) -> Self {
        let step = read_key(store, STEP_KEY)
            .and_then(|raw| {
                let parsed = parse_step(&raw);
                if parsed.is_none() {
                    log::warn!("Ignoring malformed persisted step: {raw:?}");
                }
                parsed
            })
            .unwrap_or(0)
            .min(max_step);

        let highlights = read_key(store, HIGHLIGHTS_KEY)
            .and_then(|raw| {
                let parsed = parse_highlights(&raw);
                if parsed.is_none() {
                    log::warn!("Ignoring malformed persisted highlights: {raw:?}");
                }
                parsed
            })
            .unwrap_or_default();

        Self { step, highlights }
    }
}

fn read_key(store: &impl KeyValueStore, key: &str) -> Option<String> {
    match store.get(key) {
        Ok(value) => value,
        Err(e) => {
            log::warn!("State storage unavailable, using defaults: {e:#}");
            None
        }
    }
}

/// Accepts a plain decimal or a JSON-encoded integer.
fn parse_step(raw: &str) -> Option<usize> {
    serde_json::from_str::<usize>(raw.trim()).ok()
}

fn parse_highlights(raw: &str) -> Option<Vec<usize>> {
    serde_json::from_str::<Vec<usize>>(raw.trim()).ok()
}

type Subscriber = Box<dyn FnMut(&StepState)>;

/// Owns the live [`StepState`] and keeps it in sync with storage.
pub struct StepStore<S: KeyValueStore> {
    store: S,
    state: StepState,
    max_step: usize,
    scroll_requested: bool,
    subscribers: Vec<Subscriber>,
}

impl<S: KeyValueStore> StepStore<S> {
    pub fn new(store: S, max_step: usize) -> Self {
        let state = StepState::load(&store, max_step);
        log::debug!(
            "Loaded step {} with {} highlight(s)",
            state.step,
            state.highlights.len()
        );
        Self {
            store,
            state,
            max_step,
            // New content sits at the end of the list; start scrolled there.
            scroll_requested: true,
            subscribers: Vec::new(),
        }
    }

    pub fn state(&self) -> &StepState {
        &self.state
    }

    pub fn step(&self) -> usize {
        self.state.step
    }

    pub fn max_step(&self) -> usize {
        self.max_step
    }

    /// Move to step `n` (clamped), clear highlights, persist both.
    pub fn set_step(&mut self, n: usize) {
        self.state.step = n.min(self.max_step);
        self.state.highlights.clear();
        log::debug!("Step -> {}", self.state.step);
        self.persist_step();
        self.persist_highlights();
        self.scroll_requested = true;
        self.notify();
    }

    /// Mark a question as acknowledged. Does not touch the step.
    pub fn add_highlight(&mut self, ordinal: usize) {
        self.state.highlights.push(ordinal);
        self.persist_highlights();
        self.notify();
    }

    /// Re-read storage after another window changed it. Returns whether
    /// anything changed.
    pub fn reload(&mut self) -> bool {
        let fresh = StepState::load(&self.store, self.max_step);
        if fresh == self.state {
            return false;
        }
        if fresh.step != self.state.step {
            self.scroll_requested = true;
        }
        log::info!("Adopted external state change: step {}", fresh.step);
        self.state = fresh;
        self.notify();
        true
    }

    /// Register a callback run after every mutation or reload.
    pub fn on_change(&mut self, callback: impl FnMut(&StepState) + 'static) {
        self.subscribers.push(Box::new(callback));
    }

    /// Consume a pending "scroll to the newest content" request.
    pub fn take_scroll_request(&mut self) -> bool {
        std::mem::take(&mut self.scroll_requested)
    }

    fn notify(&mut self) {
        for subscriber in &mut self.subscribers {
            subscriber(&self.state);
        }
    }

    fn persist_step(&mut self) {
        let value = self.state.step.to_string();
        if let Err(e) = self.store.set(STEP_KEY, &value) {
            log::warn!("Could not persist step, continuing in memory: {e:#}");
        }
    }

    fn persist_highlights(&mut self) {
        let value = match serde_json::to_string(&self.state.highlights) {
            Ok(v) => v,
            Err(e) => {
                log::warn!("Could not encode highlights: {e}");
                return;
            }
        };
        if let Err(e) = self.store.set(HIGHLIGHTS_KEY, &value) {
            log::warn!("Could not persist highlights, continuing in memory: {e:#}");
        }
    }
}
