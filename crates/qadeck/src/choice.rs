use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// Pause between picking an option and moving on.
pub const CHOICE_DELAY: Duration = Duration::from_millis(500);

/// Which part of an item a block lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Slot {
    Question,
    Answer,
    Body,
}

/// Identifies one choice prompt in the deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChoiceId {
    pub item: usize,
    pub slot: Slot,
    pub block: usize,
}

/// State of one mounted choice prompt. Never persisted.
#[derive(Debug, Clone, Default)]
pub struct ChoiceWidget {
    selected: Option<usize>,
    /// When the scheduled Next fires. Cleared once it has fired.
    pending: Option<Instant>,
}

impl ChoiceWidget {
    /// Pick `option`. The first pick schedules one deferred Next; later picks
    /// only change the displayed selection. Returns whether a Next was scheduled.
    pub fn select(&mut self, option: usize, now: Instant) -> bool {
        let first = self.selected.is_none();
        if first {
            self.pending = Some(now + CHOICE_DELAY);
        }
        self.selected = Some(option);
        first
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn is_decided(&self) -> bool {
        self.selected.is_some()
    }

    fn take_due(&mut self, now: Instant) -> bool {
        match self.pending {
            Some(deadline) if deadline <= now => {
                self.pending = None;
                true
            }
            _ => false,
        }
    }
}

/// All currently mounted choice prompts.
#[derive(Debug, Default)]
pub struct ChoiceBoard {
    widgets: BTreeMap<ChoiceId, ChoiceWidget>,
}

impl ChoiceBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: ChoiceId) -> Option<&ChoiceWidget> {
        self.widgets.get(&id)
    }

    pub fn select(&mut self, id: ChoiceId, option: usize, now: Instant) -> bool {
        let scheduled = self.widgets.entry(id).or_default().select(option, now);
        if scheduled {
            log::debug!("Choice {id:?} picked option {option}, advancing shortly");
        }
        scheduled
    }

    /// Unmount every widget for which `mounted` is false. Their pending
    /// advances are cancelled and their selection is forgotten.
    pub fn retain(&mut self, mut mounted: impl FnMut(ChoiceId) -> bool) {
        self.widgets.retain(|id, _| mounted(*id));
    }

    /// Number of deferred Next transitions that are due. Each fires once.
    pub fn take_due(&mut self, now: Instant) -> usize {
        self.widgets
            .values_mut()
            .filter_map(|w| w.take_due(now).then_some(()))
            .count()
    }

    /// Earliest pending deadline, for scheduling a repaint.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.widgets.values().filter_map(|w| w.pending).min()
    }
}
