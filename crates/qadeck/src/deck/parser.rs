use anyhow::{Context, Result};
use std::path::Path;

use super::{Block, Deck, DeckMeta, Item, markdown};

/// Line that separates the question from the answer inside an item.
pub const ANSWER_SEPARATOR: &str = "???";

/// Read and parse a deck file.
pub fn load(path: &Path) -> Result<Deck> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(parse(&content))
}

pub fn parse(content: &str) -> Deck {
    let (meta, body) = extract_frontmatter(content);
    let items = split(&body)
        .iter()
        .filter(|raw| !raw.trim().is_empty())
        .map(|raw| classify(raw))
        .collect();
    Deck { meta, items }
}

/// Pull a leading `---` YAML block off the document.
///
/// Frontmatter that fails to parse is ignored; the deck still loads.
fn extract_frontmatter(content: &str) -> (DeckMeta, String) {
    let content = content.replace("\r\n", "\n");
    let Some(rest) = content.strip_prefix("---\n") else {
        return (DeckMeta::default(), content);
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            let yaml = &rest[..offset];
            let body = rest[offset + line.len()..].to_string();
            let meta = match serde_yaml::from_str::<Option<DeckMeta>>(yaml) {
                Ok(meta) => meta.unwrap_or_default(),
                Err(e) => {
                    log::warn!("Ignoring malformed deck frontmatter: {e}");
                    DeckMeta::default()
                }
            };
            return (meta, body);
        }
        offset += line.len();
    }

    // No closing fence: treat the whole thing as body.
    (DeckMeta::default(), content)
}

/// Split a deck body into raw item strings.
///
/// Items are separated by a `---` line with blank lines on both sides.
/// Separators inside fenced code blocks are ignored.
pub fn split(body: &str) -> Vec<String> {
    let lines: Vec<&str> = body.lines().collect();
    let mut items = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut fence = Fence::default();

    for (i, line) in lines.iter().enumerate() {
        let trimmed = line.trim();
        fence.track(trimmed);

        if !fence.open && is_dash_separator(trimmed) {
            let prev_blank = i == 0 || lines[i - 1].trim().is_empty();
            let next_blank = lines.get(i + 1).is_none_or(|l| l.trim().is_empty());
            if prev_blank && next_blank {
                push_item(&mut items, &current);
                current.clear();
                continue;
            }
        }
        current.push(line);
    }
    push_item(&mut items, &current);
    items
}

fn push_item(items: &mut Vec<String>, lines: &[&str]) {
    let text = lines.join("\n").trim().to_string();
    if !text.is_empty() {
        items.push(text);
    }
}

/// Tracks whether we're inside a fenced code block.
#[derive(Default)]
struct Fence {
    open: bool,
    marker: char,
    len: usize,
}

impl Fence {
    fn track(&mut self, trimmed: &str) {
        if self.open {
            let closing = trimmed.chars().take_while(|&c| c == self.marker).count();
            if closing >= self.len && trimmed[closing..].trim().is_empty() {
                self.open = false;
            }
        } else if let Some(marker) = ['`', '~']
            .into_iter()
            .find(|&c| trimmed.starts_with(&c.to_string().repeat(3)))
        {
            self.open = true;
            self.marker = marker;
            self.len = trimmed.chars().take_while(|&c| c == marker).count();
        }
    }
}

/// Decide which kind of item a raw chunk is.
pub fn classify(raw: &str) -> Item {
    if let Some((question, answer)) = split_question(raw) {
        return Item::QuestionAnswer {
            question: markdown::parse(&question),
            answer: markdown::parse(&answer),
        };
    }

    let blocks = markdown::parse(raw);
    match blocks.as_slice() {
        [Block::Heading { level, .. }] if *level <= 2 => Item::Section { title: blocks },
        _ => Item::Block { content: blocks },
    }
}

fn split_question(raw: &str) -> Option<(String, String)> {
    let mut fence = Fence::default();
    let lines: Vec<&str> = raw.lines().collect();
    for (i, line) in lines.iter().enumerate() {
        let trimmed = line.trim();
        fence.track(trimmed);
        if !fence.open && trimmed == ANSWER_SEPARATOR {
            let question = lines[..i].join("\n");
            let answer = lines[i + 1..].join("\n");
            return Some((question.trim().to_string(), answer.trim().to_string()));
        }
    }
    None
}

fn is_dash_separator(line: &str) -> bool {
    line.len() >= 3 && line.chars().all(|c| c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::Inline;

    const SAMPLE: &str = "---
title: The Little Rustacean
theme: dark
---

Hello!

???

Hi!

---

## My (not your) cake recipe

---

What is `cake_recipe`?

???

Judging by the name, it is probably a variable.

---

```text
error[E0382]: use of moved value

---
```
";

    #[test]
    fn test_frontmatter() {
        let deck = parse(SAMPLE);
        assert_eq!(deck.meta.title.as_deref(), Some("The Little Rustacean"));
        assert_eq!(deck.meta.theme.as_deref(), Some("dark"));
    }

    #[test]
    fn test_item_kinds() {
        let deck = parse(SAMPLE);
        let kinds: Vec<&str> = deck.items.iter().map(Item::kind_name).collect();
        assert_eq!(kinds, ["question", "section", "question", "block"]);
        assert_eq!(deck.question_count(), 2);
    }

    #[test]
    fn test_question_and_answer_split() {
        let item = classify("Have you used Rust?\n\n???\n\nI've looked into the basics.");
        let Item::QuestionAnswer { question, answer } = item else {
            panic!("expected question");
        };
        assert_eq!(
            question,
            vec![Block::Paragraph {
                inlines: vec![Inline::Text("Have you used Rust?".into())]
            }]
        );
        assert_eq!(answer.len(), 1);
    }

    #[test]
    fn test_separator_inside_code_block_does_not_split() {
        let items = split("```\na\n\n---\n\nb\n```");
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_answer_separator_inside_code_block_is_content() {
        let item = classify("```\n???\n```");
        assert!(matches!(item, Item::Block { .. }));
    }

    #[test]
    fn test_dash_without_blank_lines_is_content() {
        let items = split("one\n---\ntwo");
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_lone_h3_is_a_block() {
        assert!(matches!(classify("### Small"), Item::Block { .. }));
        assert!(matches!(classify("# Big"), Item::Section { .. }));
    }

    #[test]
    fn test_no_frontmatter() {
        let deck = parse("Q\n\n???\n\nA");
        assert!(deck.meta.title.is_none());
        assert_eq!(deck.items.len(), 1);
    }

    #[test]
    fn test_malformed_frontmatter_is_ignored() {
        let deck = parse("---\ntitle: [unclosed\n---\n\n# Intro");
        assert!(deck.meta.title.is_none());
        assert!(matches!(deck.items[0], Item::Section { .. }));
    }

    #[test]
    fn test_choice_in_answer() {
        let item = classify("Ready?\n\n???\n\n```choice\nYes\nNo\n```");
        assert_eq!(item.choice_count(), 1);
    }

    #[test]
    fn test_load_missing_file() {
        let err = load(Path::new("/definitely/not/here.md")).unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }

    #[test]
    fn test_sample_deck() {
        let deck = parse(include_str!("../../../../sample-decks/ownership.md"));
        assert_eq!(deck.meta.title.as_deref(), Some("The Little Rustacean"));
        assert_eq!(deck.question_count(), 5);
        assert_eq!(deck.items.first().map(Item::kind_name), Some("section"));
        assert_eq!(deck.items.last().map(Item::kind_name), Some("block"));
        let choices: usize = deck.items.iter().map(Item::choice_count).sum();
        assert_eq!(choices, 1);
    }
}
