//! Projection of deck + step state onto what the window shows.
//!
//! Pure: no egui, no storage. The renderer walks the resulting [`DeckView`].

use crate::choice::{ChoiceId, Slot};
use crate::deck::{Block, Deck, Item};
use crate::state::StepState;

/// Opacity of a past question nobody acknowledged yet.
pub const PAST_OPACITY: f32 = 0.3;
/// Opacity of the upcoming question shown in presenter mode.
pub const FUTURE_OPACITY: f32 = 0.5;
/// Opacity of an unrevealed answer in presenter mode.
pub const PEEK_OPACITY: f32 = 0.1;

#[derive(Debug, Clone, PartialEq)]
pub struct DeckView {
    /// Heading drawn above the rows.
    pub title: Option<String>,
    pub items: Vec<ItemView>,
    pub question_number: usize,
    pub is_answer_phase: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ItemView {
    Question(QuestionView),
    Section { index: usize },
    Block { index: usize },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuestionView {
    /// Position in the deck.
    pub index: usize,
    /// Position among questions only.
    pub ordinal: usize,
    pub show_answer: bool,
    /// Before the current question and not acknowledged: render dimmed.
    pub past: bool,
    /// After the current question (presenter mode only): render muted.
    pub future: bool,
    pub answer_opacity: f32,
}

impl QuestionView {
    /// Row number shown at the left of the row.
    pub fn number_label(&self) -> String {
        (self.ordinal + 1).to_string()
    }

    pub fn row_opacity(&self) -> f32 {
        if self.past {
            PAST_OPACITY
        } else if self.future {
            FUTURE_OPACITY
        } else {
            1.0
        }
    }
}

impl ItemView {
    pub fn index(&self) -> usize {
        match self {
            ItemView::Question(q) => q.index,
            ItemView::Section { index } | ItemView::Block { index } => *index,
        }
    }
}

/// Compute the visible view.
///
/// Items are shown up to and including the question at the cutoff (the
/// current question, plus one in presenter mode). Sections and blocks before
/// it keep their positions. When the cutoff lies past the last question, or
/// the deck sits on its final step, the whole deck is visible.
pub fn project(deck: &Deck, state: &StepState, presenter: bool) -> DeckView {
    let question_number = state.question_number();
    let is_answer_phase = state.is_answer_phase();
    let cutoff = question_number + usize::from(presenter);
    let finished = state.step >= deck.max_step();

    let mut items = Vec::new();
    let mut ordinal = 0;
    for (index, item) in deck.items.iter().enumerate() {
        match item {
            Item::QuestionAnswer { .. } => {
                let q = ordinal;
                ordinal += 1;
                let show_answer =
                    q < question_number || (q == question_number && is_answer_phase);
                let answer_opacity = if show_answer {
                    1.0
                } else if presenter {
                    PEEK_OPACITY
                } else {
                    0.0
                };
                items.push(ItemView::Question(QuestionView {
                    index,
                    ordinal: q,
                    show_answer,
                    past: q < question_number && !state.is_highlighted(q),
                    future: q > question_number,
                    answer_opacity,
                }));
                if q == cutoff && !finished {
                    break;
                }
            }
            Item::Section { .. } => items.push(ItemView::Section { index }),
            Item::Block { .. } => items.push(ItemView::Block { index }),
        }
    }

    DeckView {
        title: deck.display_title().map(str::to_string),
        items,
        question_number,
        is_answer_phase,
    }
}

impl DeckView {
    /// Choice prompts that are mounted: every choice inside a visible item.
    pub fn mounted_choices(&self, deck: &Deck) -> Vec<ChoiceId> {
        let mut ids = Vec::new();
        for view in &self.items {
            let index = view.index();
            let Some(item) = deck.items.get(index) else {
                continue;
            };
            let parts: Vec<(Slot, &Vec<Block>)> = match item {
                Item::QuestionAnswer { question, answer } => {
                    vec![(Slot::Question, question), (Slot::Answer, answer)]
                }
                Item::Section { title } => vec![(Slot::Body, title)],
                Item::Block { content } => vec![(Slot::Body, content)],
            };
            for (slot, blocks) in parts {
                for (block, b) in blocks.iter().enumerate() {
                    if matches!(b, Block::Choice { .. }) {
                        ids.push(ChoiceId {
                            item: index,
                            slot,
                            block,
                        });
                    }
                }
            }
        }
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::{DeckMeta, Inline, RichContent};

    fn text(s: &str) -> RichContent {
        vec![Block::Paragraph {
            inlines: vec![Inline::Text(s.to_string())],
        }]
    }

    fn qa(q: &str, a: &str) -> Item {
        Item::QuestionAnswer {
            question: text(q),
            answer: text(a),
        }
    }

    fn intro_deck() -> Deck {
        Deck {
            meta: DeckMeta::default(),
            items: vec![
                Item::Section {
                    title: text("Intro"),
                },
                qa("Q0", "A0"),
                qa("Q1", "A1"),
            ],
        }
    }

    fn at(step: usize, highlights: &[usize]) -> StepState {
        StepState {
            step,
            highlights: highlights.to_vec(),
        }
    }

    fn is_visible(view: &DeckView, index: usize) -> bool {
        view.items.iter().any(|i| i.index() == index)
    }

    fn question(view: &DeckView, index: usize) -> QuestionView {
        match view.items.iter().find(|i| i.index() == index) {
            Some(ItemView::Question(q)) => *q,
            other => panic!("expected question at {index}, got {other:?}"),
        }
    }

    #[test]
    fn test_start_shows_section_and_first_question() {
        let view = project(&intro_deck(), &at(0, &[]), false);
        assert_eq!(view.items.len(), 2);
        assert_eq!(view.items[0], ItemView::Section { index: 0 });
        let q0 = question(&view, 1);
        assert!(!q0.show_answer);
        assert!(!q0.past);
        assert_eq!(q0.answer_opacity, 0.0);
    }

    #[test]
    fn test_scenario_after_three_steps() {
        let view = project(&intro_deck(), &at(3, &[]), false);
        assert_eq!(view.question_number, 1);
        assert!(view.is_answer_phase);
        assert_eq!(view.items.len(), 3);

        let q0 = question(&view, 1);
        assert!(q0.show_answer);
        assert!(q0.past);
        assert_eq!(q0.row_opacity(), PAST_OPACITY);

        let q1 = question(&view, 2);
        assert!(q1.show_answer);
        assert!(!q1.past);
        assert_eq!(q1.row_opacity(), 1.0);
    }

    #[test]
    fn test_highlight_removes_dimming() {
        let view = project(&intro_deck(), &at(3, &[0]), false);
        let q0 = question(&view, 1);
        assert!(!q0.past);
        assert!(q0.show_answer);
    }

    #[test]
    fn test_answer_visibility_matches_step() {
        let deck = Deck {
            meta: DeckMeta::default(),
            items: (0..4).map(|i| qa(&format!("Q{i}"), "A")).collect(),
        };
        for step in 0..=deck.max_step() {
            let state = at(step, &[]);
            let view = project(&deck, &state, false);
            for item in &view.items {
                let ItemView::Question(q) = item else { continue };
                let expected = q.ordinal < step / 2 || (q.ordinal == step / 2 && step % 2 == 1);
                assert_eq!(q.show_answer, expected, "step {step} question {}", q.ordinal);
            }
            assert_eq!(view.items.len(), step / 2 + 1);
        }
    }

    #[test]
    fn test_presenter_shows_one_future_item_with_peek() {
        let view = project(&intro_deck(), &at(0, &[]), true);
        assert_eq!(view.items.len(), 3);

        let q0 = question(&view, 1);
        assert_eq!(q0.answer_opacity, PEEK_OPACITY);
        assert!(!q0.future);

        let q1 = question(&view, 2);
        assert!(q1.future);
        assert!(!q1.show_answer);
        assert!(q1.answer_opacity > 0.0 && q1.answer_opacity < 1.0);
        assert_eq!(q1.row_opacity(), FUTURE_OPACITY);
    }

    #[test]
    fn test_presenter_past_the_end_shows_everything() {
        let mut deck = intro_deck();
        deck.items.push(Item::Block {
            content: text("Thanks!"),
        });
        let view = project(&deck, &at(3, &[]), true);
        assert_eq!(view.items.len(), 4);
        assert_eq!(view.items[3], ItemView::Block { index: 3 });
    }

    #[test]
    fn test_sections_after_cutoff_are_hidden() {
        let mut deck = intro_deck();
        deck.items.insert(
            2,
            Item::Section {
                title: text("Part two"),
            },
        );
        let view = project(&deck, &at(1, &[]), false);
        assert!(!is_visible(&view, 2));
        let view = project(&deck, &at(2, &[]), false);
        assert!(is_visible(&view, 2));
    }

    #[test]
    fn test_deck_without_questions_is_fully_visible() {
        let deck = Deck {
            meta: DeckMeta::default(),
            items: vec![
                Item::Section {
                    title: text("Only"),
                },
                Item::Block {
                    content: text("content"),
                },
            ],
        };
        let view = project(&deck, &StepState::default(), false);
        assert_eq!(view.items.len(), 2);
    }

    #[test]
    fn test_mounted_choices() {
        let deck = Deck {
            meta: DeckMeta::default(),
            items: vec![
                Item::QuestionAnswer {
                    question: text("Read it?"),
                    answer: vec![Block::Choice {
                        options: vec!["Yes".into(), "No".into()],
                    }],
                },
                Item::QuestionAnswer {
                    question: text("Later?"),
                    answer: vec![
                        Block::HorizontalRule,
                        Block::Choice {
                            options: vec!["A".into()],
                        },
                    ],
                },
            ],
        };
        let view = project(&deck, &at(0, &[]), false);
        assert_eq!(
            view.mounted_choices(&deck),
            vec![ChoiceId {
                item: 0,
                slot: Slot::Answer,
                block: 0,
            }]
        );

        let view = project(&deck, &at(2, &[]), false);
        assert_eq!(view.mounted_choices(&deck).len(), 2);
        assert!(view.mounted_choices(&deck).contains(&ChoiceId {
            item: 1,
            slot: Slot::Answer,
            block: 1,
        }));
    }

    #[test]
    fn test_persisted_state_reproduces_view() {
        use crate::state::StepStore;
        use crate::state::storage::MemoryStore;

        let deck = intro_deck();
        let shared = MemoryStore::new();
        let mut first = StepStore::new(shared.clone(), deck.max_step());
        first.set_step(3);
        first.add_highlight(0);
        first.add_highlight(1);
        let before = project(&deck, first.state(), false);

        let second = StepStore::new(shared, deck.max_step());
        assert_eq!(project(&deck, second.state(), false), before);
        assert!(!question(&before, 1).past);
    }

    #[test]
    fn test_final_step_shows_trailing_items() {
        let deck = crate::deck::parse(include_str!("../../../sample-decks/ownership.md"));
        let last = deck.items.len() - 1;
        assert!(matches!(deck.items[last], Item::Block { .. }));

        let view = project(&deck, &at(deck.max_step(), &[]), false);
        assert_eq!(view.items.len(), deck.items.len());
        assert!(is_visible(&view, last));

        // One step earlier the closing block is still hidden.
        let view = project(&deck, &at(deck.max_step() - 1, &[]), false);
        assert!(!is_visible(&view, last));
    }

    #[test]
    fn test_title_and_row_numbers() {
        let mut deck = intro_deck();
        let view = project(&deck, &at(2, &[]), false);
        assert_eq!(view.title, None);
        assert_eq!(question(&view, 1).number_label(), "1");
        assert_eq!(question(&view, 2).number_label(), "2");

        deck.meta.title = Some("The Little Rustacean".into());
        let view = project(&deck, &at(0, &[]), false);
        assert_eq!(view.title.as_deref(), Some("The Little Rustacean"));
    }
}
