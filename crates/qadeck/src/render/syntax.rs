use std::sync::LazyLock;

use eframe::egui::{self, Color32, FontFamily, FontId};
use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

use crate::theme::Theme;

static SYNTAX_SET: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);
static THEME_SET: LazyLock<ThemeSet> = LazyLock::new(ThemeSet::load_defaults);

/// Build a syntax-highlighted layout job for a code block.
///
/// Unknown languages and highlighter errors fall back to plain monospace text.
pub fn highlight_code(
    code: &str,
    language: Option<&str>,
    font_size: f32,
    theme: &Theme,
    max_width: f32,
) -> egui::text::LayoutJob {
    let mut job = egui::text::LayoutJob::default();
    job.wrap.max_width = max_width;
    let font_id = FontId::new(font_size, FontFamily::Monospace);

    let syntax = language.and_then(|lang| SYNTAX_SET.find_syntax_by_token(lang));
    let syntect_theme = THEME_SET.themes.get(theme.syntect_theme_name());

    let (Some(syntax), Some(syntect_theme)) = (syntax, syntect_theme) else {
        append_plain(&mut job, code, &font_id, theme.code_foreground);
        return job;
    };

    let mut highlighter = HighlightLines::new(syntax, syntect_theme);
    for line in LinesWithEndings::from(code) {
        match highlighter.highlight_line(line, &SYNTAX_SET) {
            Ok(ranges) => {
                for (style, text) in ranges {
                    let fg = style.foreground;
                    let color = Color32::from_rgb(fg.r, fg.g, fg.b);
                    append_plain(&mut job, text, &font_id, color);
                }
            }
            Err(e) => {
                log::debug!("Highlighting failed, using plain text: {e}");
                append_plain(&mut job, line, &font_id, theme.code_foreground);
            }
        }
    }
    job
}

fn append_plain(job: &mut egui::text::LayoutJob, text: &str, font_id: &FontId, color: Color32) {
    let format = egui::text::TextFormat {
        font_id: font_id.clone(),
        color,
        ..Default::default()
    };
    job.append(text, 0.0, format);
}
