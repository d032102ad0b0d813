pub mod markdown;
pub mod parser;

use serde::Deserialize;

pub use parser::load;
#[cfg(test)]
pub use parser::parse;

/// An ordered, immutable list of items loaded from a deck file.
#[derive(Debug, Clone)]
pub struct Deck {
    pub meta: DeckMeta,
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeckMeta {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub theme: Option<String>,
}

/// Formatted content. Navigation never looks inside it.
pub type RichContent = Vec<Block>;

#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    QuestionAnswer {
        question: RichContent,
        answer: RichContent,
    },
    Section {
        title: RichContent,
    },
    Block {
        content: RichContent,
    },
}

#[derive(Debug, Clone, PartialEq)]
#[allow(clippy::enum_variant_names)]
pub enum Block {
    Heading {
        level: u8,
        inlines: Vec<Inline>,
    },
    Paragraph {
        inlines: Vec<Inline>,
    },
    List {
        ordered: bool,
        items: Vec<ListItem>,
    },
    CodeBlock {
        language: Option<String>,
        code: String,
    },
    BlockQuote {
        inlines: Vec<Inline>,
    },
    HorizontalRule,
    /// A multiple-choice prompt; each entry is one option label.
    Choice {
        options: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Inline {
    Text(String),
    Bold(Vec<Inline>),
    Italic(Vec<Inline>),
    Strikethrough(Vec<Inline>),
    Code(String),
    Link { text: Vec<Inline>, url: String },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListItem {
    pub inlines: Vec<Inline>,
    pub children: Vec<ListItem>,
}

impl Item {
    pub fn is_question(&self) -> bool {
        matches!(self, Item::QuestionAnswer { .. })
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Item::QuestionAnswer { .. } => "question",
            Item::Section { .. } => "section",
            Item::Block { .. } => "block",
        }
    }

    /// Number of choice prompts anywhere in this item.
    pub fn choice_count(&self) -> usize {
        let count = |blocks: &RichContent| {
            blocks
                .iter()
                .filter(|b| matches!(b, Block::Choice { .. }))
                .count()
        };
        match self {
            Item::QuestionAnswer { question, answer } => count(question) + count(answer),
            Item::Section { title } => count(title),
            Item::Block { content } => count(content),
        }
    }
}

impl Deck {
    /// Number of question/answer items. Sections and blocks do not count.
    pub fn question_count(&self) -> usize {
        self.items.iter().filter(|i| i.is_question()).count()
    }

    /// Largest valid step: two steps per question, or zero for a deck without questions.
    pub fn max_step(&self) -> usize {
        crate::state::max_step(self.question_count())
    }

    /// Question ordinal of the item at `index`, if it is a question.
    pub fn question_ordinal(&self, index: usize) -> Option<usize> {
        if !self.items.get(index)?.is_question() {
            return None;
        }
        Some(self.items[..index].iter().filter(|i| i.is_question()).count())
    }

    pub fn display_title(&self) -> Option<&str> {
        self.meta.title.as_deref()
    }
}

/// Extract plain text from inline elements.
pub fn inlines_to_text(inlines: &[Inline]) -> String {
    let mut text = String::new();
    for inline in inlines {
        match inline {
            Inline::Text(s) | Inline::Code(s) => text.push_str(s),
            Inline::Bold(children) | Inline::Italic(children) | Inline::Strikethrough(children) => {
                text.push_str(&inlines_to_text(children));
            }
            Inline::Link { text: t, .. } => text.push_str(&inlines_to_text(t)),
        }
    }
    text
}

/// Plain-text summary of rich content, used for the CLI and window titles.
pub fn content_to_text(blocks: &[Block]) -> String {
    let mut parts = Vec::new();
    for block in blocks {
        match block {
            Block::Heading { inlines, .. }
            | Block::Paragraph { inlines }
            | Block::BlockQuote { inlines } => parts.push(inlines_to_text(inlines)),
            Block::List { items, .. } => {
                for item in items {
                    parts.push(inlines_to_text(&item.inlines));
                }
            }
            Block::CodeBlock { code, .. } => parts.push(code.lines().next().unwrap_or("").into()),
            Block::Choice { options } => parts.push(options.join(" / ")),
            Block::HorizontalRule => {}
        }
    }
    parts.retain(|p| !p.trim().is_empty());
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> RichContent {
        vec![Block::Paragraph {
            inlines: vec![Inline::Text(s.to_string())],
        }]
    }

    fn sample() -> Deck {
        Deck {
            meta: DeckMeta::default(),
            items: vec![
                Item::Section {
                    title: text("Intro"),
                },
                Item::QuestionAnswer {
                    question: text("Q0"),
                    answer: text("A0"),
                },
                Item::Block {
                    content: text("aside"),
                },
                Item::QuestionAnswer {
                    question: text("Q1"),
                    answer: text("A1"),
                },
            ],
        }
    }

    #[test]
    fn test_question_count_skips_sections_and_blocks() {
        let deck = sample();
        assert_eq!(deck.question_count(), 2);
        assert_eq!(deck.max_step(), 3);
    }

    #[test]
    fn test_question_ordinal() {
        let deck = sample();
        assert_eq!(deck.question_ordinal(0), None);
        assert_eq!(deck.question_ordinal(1), Some(0));
        assert_eq!(deck.question_ordinal(2), None);
        assert_eq!(deck.question_ordinal(3), Some(1));
        assert_eq!(deck.question_ordinal(9), None);
    }

    #[test]
    fn test_empty_deck_has_single_step() {
        let deck = Deck {
            meta: DeckMeta::default(),
            items: vec![Item::Block {
                content: text("only"),
            }],
        };
        assert_eq!(deck.max_step(), 0);
    }

    #[test]
    fn test_content_to_text() {
        let blocks = vec![
            Block::Heading {
                level: 2,
                inlines: vec![Inline::Bold(vec![Inline::Text("Hi".into())])],
            },
            Block::Choice {
                options: vec!["Yes".into(), "No".into()],
            },
        ];
        assert_eq!(content_to_text(&blocks), "Hi Yes / No");
    }
}
