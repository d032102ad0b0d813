use anyhow::Result;
use colored::Colorize;
use std::path::Path;

use crate::deck::{self, Deck, Item};

/// Longest item preview printed per line.
const PREVIEW_CHARS: usize = 60;

/// Run the check command.
pub fn run(file: &Path) -> Result<()> {
    let deck = deck::load(file)?;
    if deck.items.is_empty() {
        anyhow::bail!("No items found in {}", file.display());
    }

    if let Some(title) = deck.display_title() {
        println!("{}", title.bold());
    }
    println!(
        "{} items, {} questions, {} steps",
        deck.items.len(),
        deck.question_count(),
        deck.max_step() + 1
    );
    println!();
    for line in describe(&deck) {
        println!("{line}");
    }

    let empty_answers = deck
        .items
        .iter()
        .filter(|i| matches!(i, Item::QuestionAnswer { answer, .. } if answer.is_empty()))
        .count();
    if empty_answers > 0 {
        println!();
        println!(
            "{}",
            format!("{empty_answers} question(s) have an empty answer.").yellow()
        );
    }
    Ok(())
}

/// One line per item: index, kind, question ordinal and a text preview.
pub fn describe(deck: &Deck) -> Vec<String> {
    deck.items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let (label, text) = match item {
                Item::QuestionAnswer { question, .. } => {
                    let ordinal = deck.question_ordinal(index).unwrap_or_default();
                    (format!("Q{ordinal}"), deck::content_to_text(question))
                }
                Item::Section { title } => ("§".to_string(), deck::content_to_text(title)),
                Item::Block { content } => ("·".to_string(), deck::content_to_text(content)),
            };
            let mut line = format!("{index:>3}  {label:<4} {}", preview(&text));
            let choices = item.choice_count();
            if choices > 0 {
                line.push_str(&format!("  [{choices} choice]"));
            }
            line
        })
        .collect()
}

fn preview(text: &str) -> String {
    let text = text.replace('\n', " ");
    if text.chars().count() <= PREVIEW_CHARS {
        return text;
    }
    let cut: String = text.chars().take(PREVIEW_CHARS - 1).collect();
    format!("{cut}\u{2026}")
}
