use anyhow::Result;
use colored::Colorize;
use std::path::Path;

use crate::cli::{DeckArg, StateCommands};
use crate::deck;
use crate::state::StepState;
use crate::state::storage::{self, FileStore, KeyValueStore, STATE_KEYS};

pub fn run(command: StateCommands, state_root: &Path) -> Result<()> {
    match command {
        StateCommands::Show { deck } => show(&DeckArg::resolve(&deck)?.path, state_root),
        StateCommands::Reset { deck } => {
            let path = DeckArg::resolve(&deck)?.path;
            reset(&path, state_root)?;
            println!("{} progress for {}", "Reset".green().bold(), path.display());
            Ok(())
        }
    }
}

fn show(file: &Path, state_root: &Path) -> Result<()> {
    let deck = deck::load(file)?;
    let store = FileStore::new(storage::deck_state_dir(state_root, file));
    let state = StepState::load(&store, deck.max_step());

    println!("{} {}", "State:".bold(), store.dir().display());
    println!("  step        {} / {}", state.step, deck.max_step());
    if deck.question_count() > 0 {
        let phase = if state.is_answer_phase() {
            "answer shown"
        } else {
            "question shown"
        };
        println!(
            "  question    {} of {} ({phase})",
            state.question_number() + 1,
            deck.question_count()
        );
    }
    if state.highlights.is_empty() {
        println!("  highlights  {}", "none".dimmed());
    } else {
        let list: Vec<String> = state.highlights.iter().map(|h| h.to_string()).collect();
        println!("  highlights  {}", list.join(", "));
    }
    Ok(())
}

/// Remove every persisted key for the deck.
pub fn reset(file: &Path, state_root: &Path) -> Result<()> {
    let mut store = FileStore::new(storage::deck_state_dir(state_root, file));
    for key in STATE_KEYS {
        store.remove(key)?;
    }
    log::info!("Reset progress for {}", file.display());
    Ok(())
}
