pub mod syntax;
pub mod text;

use eframe::egui;

use crate::choice::{ChoiceBoard, ChoiceId, Slot};
use crate::deck::Block;
use crate::theme::Theme;

/// Where a run of blocks sits, so choice prompts inside it can be addressed.
pub struct ChoiceSlot<'a> {
    pub board: &'a ChoiceBoard,
    pub item: usize,
    pub slot: Slot,
    /// Options accept clicks only while the surrounding content is revealed.
    pub interactive: bool,
}

/// An option clicked during this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChoicePick {
    pub id: ChoiceId,
    pub option: usize,
}

/// Render blocks top to bottom. Returns a choice pick if one was clicked.
pub fn show_blocks(
    ui: &mut egui::Ui,
    blocks: &[Block],
    theme: &Theme,
    choices: &ChoiceSlot<'_>,
) -> Option<ChoicePick> {
    let block_spacing = theme.body_size * 0.5;
    let mut pick = None;

    for (idx, block) in blocks.iter().enumerate() {
        if idx > 0 {
            ui.add_space(block_spacing);
        }
        match block {
            Block::Heading { level, inlines } => text::show_heading(ui, inlines, *level, theme),
            Block::Paragraph { inlines } => text::show_paragraph(ui, inlines, theme),
            Block::List { ordered, items } => text::show_list(ui, items, *ordered, theme),
            Block::CodeBlock { language, code } => {
                text::show_code_block(ui, code, language.as_deref(), theme)
            }
            Block::BlockQuote { inlines } => text::show_blockquote(ui, inlines, theme),
            Block::HorizontalRule => text::show_rule(ui, theme),
            Block::Choice { options } => {
                let id = ChoiceId {
                    item: choices.item,
                    slot: choices.slot,
                    block: idx,
                };
                let widget = choices.board.get(id);
                if let Some(option) =
                    text::show_choice(ui, options, widget, choices.interactive, theme)
                {
                    pick = Some(ChoicePick { id, option });
                }
            }
        }
    }

    pick
}
