use eframe::egui;

use crate::state::StepStore;
use crate::state::storage::KeyValueStore;

/// A discrete request to change what the deck shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavAction {
    Next,
    Previous,
    Reset,
    ToggleFullscreen,
    /// Clear the dimming on a past question (by ordinal).
    Acknowledge(usize),
}

/// What the shell has to do after an action was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    None,
    Changed,
    ToggleFullscreen,
}

/// Keyboard mapping. Every other key is ignored.
pub fn action_for_key(key: egui::Key) -> Option<NavAction> {
    match key {
        egui::Key::Space | egui::Key::ArrowRight => Some(NavAction::Next),
        egui::Key::Backspace | egui::Key::ArrowLeft => Some(NavAction::Previous),
        egui::Key::Home => Some(NavAction::Reset),
        _ => None,
    }
}

/// Apply `action` to the store. Out-of-range moves are clamped to no-ops.
pub fn apply<S: KeyValueStore>(store: &mut StepStore<S>, action: NavAction) -> Effect {
    let step = store.step();
    let target = match action {
        NavAction::Next => (step + 1).min(store.max_step()),
        NavAction::Previous => step.saturating_sub(1),
        NavAction::Reset => 0,
        NavAction::ToggleFullscreen => return Effect::ToggleFullscreen,
        NavAction::Acknowledge(ordinal) => {
            let state = store.state();
            if ordinal >= state.question_number() || state.is_highlighted(ordinal) {
                return Effect::None;
            }
            store.add_highlight(ordinal);
            return Effect::Changed;
        }
    };

    if target == step && action != NavAction::Reset {
        return Effect::None;
    }
    store.set_step(target);
    Effect::Changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::storage::MemoryStore;

    fn store_at(step: usize, max_step: usize) -> StepStore<MemoryStore> {
        let mut store = StepStore::new(MemoryStore::new(), max_step);
        store.set_step(step);
        store
    }

    #[test]
    fn test_key_mapping() {
        assert_eq!(action_for_key(egui::Key::Space), Some(NavAction::Next));
        assert_eq!(action_for_key(egui::Key::ArrowRight), Some(NavAction::Next));
        assert_eq!(action_for_key(egui::Key::Backspace), Some(NavAction::Previous));
        assert_eq!(action_for_key(egui::Key::ArrowLeft), Some(NavAction::Previous));
        assert_eq!(action_for_key(egui::Key::Home), Some(NavAction::Reset));
        assert_eq!(action_for_key(egui::Key::End), None);
        assert_eq!(action_for_key(egui::Key::Q), None);
        assert_eq!(action_for_key(egui::Key::ArrowUp), None);
    }

    #[test]
    fn test_next_and_previous_are_inverse_away_from_bounds() {
        let max = 7;
        for s in 0..max {
            let mut store = store_at(s, max);
            apply(&mut store, NavAction::Next);
            apply(&mut store, NavAction::Previous);
            assert_eq!(store.step(), s, "Previous(Next({s}))");
        }
    }

    #[test]
    fn test_next_at_last_step_is_noop() {
        let mut store = store_at(3, 3);
        assert_eq!(apply(&mut store, NavAction::Next), Effect::None);
        assert_eq!(store.step(), 3);
    }

    #[test]
    fn test_previous_at_first_step_is_noop() {
        let mut store = store_at(0, 3);
        assert_eq!(apply(&mut store, NavAction::Previous), Effect::None);
        assert_eq!(store.step(), 0);
    }

    #[test]
    fn test_reset() {
        let mut store = store_at(5, 7);
        store.add_highlight(0);
        assert_eq!(apply(&mut store, NavAction::Reset), Effect::Changed);
        assert_eq!(store.step(), 0);
        assert!(store.state().highlights.is_empty());
    }

    #[test]
    fn test_previous_clears_highlights() {
        let mut store = store_at(5, 7);
        store.add_highlight(1);
        apply(&mut store, NavAction::Previous);
        assert_eq!(store.step(), 4);
        assert!(store.state().highlights.is_empty());
    }

    #[test]
    fn test_three_nexts_from_start() {
        let mut store = store_at(0, 3);
        for _ in 0..3 {
            apply(&mut store, NavAction::Next);
        }
        assert_eq!(store.step(), 3);
        assert_eq!(store.state().question_number(), 1);
        assert!(store.state().is_answer_phase());
    }

    #[test]
    fn test_acknowledge_past_question() {
        let mut store = store_at(4, 7);
        assert_eq!(apply(&mut store, NavAction::Acknowledge(1)), Effect::Changed);
        assert_eq!(store.state().highlights, vec![1]);
        assert_eq!(store.step(), 4);

        // Already acknowledged.
        assert_eq!(apply(&mut store, NavAction::Acknowledge(1)), Effect::None);
        assert_eq!(store.state().highlights, vec![1]);
    }

    #[test]
    fn test_acknowledge_current_or_future_is_ignored() {
        let mut store = store_at(4, 7);
        assert_eq!(apply(&mut store, NavAction::Acknowledge(2)), Effect::None);
        assert_eq!(apply(&mut store, NavAction::Acknowledge(3)), Effect::None);
        assert!(store.state().highlights.is_empty());
    }

    #[test]
    fn test_fullscreen_does_not_touch_state() {
        let mut store = store_at(2, 7);
        store.add_highlight(0);
        assert_eq!(
            apply(&mut store, NavAction::ToggleFullscreen),
            Effect::ToggleFullscreen
        );
        assert_eq!(store.step(), 2);
        assert_eq!(store.state().highlights, vec![0]);
    }
}
