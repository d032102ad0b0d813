use crate::choice::ChoiceWidget;
use crate::deck::{Inline, ListItem};
use crate::theme::Theme;
use eframe::egui::{self, Color32, FontFamily, FontId, Stroke};

/// Create a LayoutJob from inline elements.
pub fn inlines_to_job(
    inlines: &[Inline],
    font_size: f32,
    color: Color32,
    accent: Color32,
    max_width: f32,
) -> egui::text::LayoutJob {
    let mut job = egui::text::LayoutJob::default();
    job.wrap.max_width = max_width;
    append_inlines(&mut job, inlines, font_size, color, accent, false, false);
    job
}

fn append_inlines(
    job: &mut egui::text::LayoutJob,
    inlines: &[Inline],
    font_size: f32,
    color: Color32,
    accent: Color32,
    bold: bool,
    italic: bool,
) {
    for inline in inlines {
        match inline {
            Inline::Text(s) => {
                let size = if bold { font_size + 1.0 } else { font_size };
                let format = egui::text::TextFormat {
                    font_id: FontId::new(size, FontFamily::Proportional),
                    color,
                    italics: italic,
                    ..Default::default()
                };
                job.append(s, 0.0, format);
            }
            Inline::Bold(children) => {
                append_inlines(job, children, font_size, color, accent, true, italic);
            }
            Inline::Italic(children) => {
                append_inlines(job, children, font_size, color, accent, bold, true);
            }
            Inline::Strikethrough(children) => {
                let mut inner = egui::text::LayoutJob::default();
                append_inlines(&mut inner, children, font_size, color, accent, bold, italic);
                for section in &inner.sections {
                    let mut format = section.format.clone();
                    format.strikethrough = Stroke::new(1.0, color);
                    job.append(&inner.text[section.byte_range.clone()], 0.0, format);
                }
            }
            Inline::Code(s) => {
                let format = egui::text::TextFormat {
                    font_id: FontId::new(font_size * 0.85, FontFamily::Monospace),
                    color,
                    background: Color32::from_rgba_unmultiplied(128, 128, 128, 30),
                    ..Default::default()
                };
                job.append(s, 0.0, format);
            }
            Inline::Link { text, .. } => {
                append_inlines(job, text, font_size, accent, accent, bold, italic);
            }
        }
    }
}

pub fn show_heading(ui: &mut egui::Ui, inlines: &[Inline], level: u8, theme: &Theme) {
    let job = inlines_to_job(
        inlines,
        theme.heading_size(level),
        theme.heading_color,
        theme.accent,
        ui.available_width(),
    );
    ui.label(job);
}

pub fn show_paragraph(ui: &mut egui::Ui, inlines: &[Inline], theme: &Theme) {
    let job = inlines_to_job(
        inlines,
        theme.body_size,
        theme.foreground,
        theme.accent,
        ui.available_width(),
    );
    ui.label(job);
}

pub fn show_list(ui: &mut egui::Ui, items: &[ListItem], ordered: bool, theme: &Theme) {
    let marker_width = theme.body_size * 1.6;
    for (idx, item) in items.iter().enumerate() {
        let marker = if ordered {
            format!("{}.", idx + 1)
        } else {
            "\u{2022}".to_string()
        };
        ui.horizontal_top(|ui| {
            let (rect, _) =
                ui.allocate_exact_size(egui::vec2(marker_width, theme.body_size), egui::Sense::hover());
            ui.painter().text(
                rect.left_top(),
                egui::Align2::LEFT_TOP,
                marker,
                FontId::proportional(theme.body_size),
                theme.foreground,
            );
            ui.vertical(|ui| {
                show_paragraph(ui, &item.inlines, theme);
                if !item.children.is_empty() {
                    show_list(ui, &item.children, ordered, theme);
                }
            });
        });
    }
}

pub fn show_code_block(ui: &mut egui::Ui, code: &str, language: Option<&str>, theme: &Theme) {
    let padding = 12.0;
    egui::Frame::new()
        .fill(theme.code_background)
        .corner_radius(8.0)
        .inner_margin(padding)
        .show(ui, |ui| {
            let job = crate::render::syntax::highlight_code(
                code.trim_end_matches('\n'),
                language,
                theme.code_size,
                theme,
                ui.available_width(),
            );
            ui.label(job);
        });
}

pub fn show_blockquote(ui: &mut egui::Ui, inlines: &[Inline], theme: &Theme) {
    let bar_width = 4.0;
    let bar_padding = 14.0;
    ui.horizontal_top(|ui| {
        let job = inlines_to_job(
            inlines,
            theme.body_size * 1.05,
            theme.foreground,
            theme.accent,
            ui.available_width() - bar_width - bar_padding,
        );
        let galley = ui.painter().layout_job(job);
        let (bar, _) = ui.allocate_exact_size(
            egui::vec2(bar_width, galley.rect.height()),
            egui::Sense::hover(),
        );
        ui.painter().rect_filled(bar, 2.0, theme.accent);
        ui.add_space(bar_padding);
        ui.label(galley);
    });
}

pub fn show_rule(ui: &mut egui::Ui, theme: &Theme) {
    let width = ui.available_width();
    let (rect, _) = ui.allocate_exact_size(egui::vec2(width, 12.0), egui::Sense::hover());
    ui.painter().hline(
        rect.x_range(),
        rect.center().y,
        Stroke::new(1.0, Theme::with_opacity(theme.foreground, 0.3)),
    );
}

/// Draw a choice prompt. Returns the option clicked this frame, if any.
///
/// All options stay visible; the picked one is marked and a decided prompt
/// gets an accent frame.
pub fn show_choice(
    ui: &mut egui::Ui,
    options: &[String],
    widget: Option<&ChoiceWidget>,
    interactive: bool,
    theme: &Theme,
) -> Option<usize> {
    let selected = widget.and_then(ChoiceWidget::selected);
    let decided = widget.is_some_and(ChoiceWidget::is_decided);
    let stroke = if decided {
        Stroke::new(2.0, theme.accent)
    } else {
        Stroke::new(1.0, Theme::with_opacity(theme.foreground, 0.2))
    };

    let mut clicked = None;
    egui::Frame::new()
        .stroke(stroke)
        .corner_radius(6.0)
        .inner_margin(10.0)
        .show(ui, |ui| {
            for (i, option) in options.iter().enumerate() {
                let picked = selected == Some(i);
                let label = if picked {
                    format!("\u{25B8} {option}")
                } else {
                    format!("  {option}")
                };
                let text = egui::RichText::new(label)
                    .size(theme.body_size)
                    .color(if picked { theme.accent } else { theme.foreground });
                let button = egui::Button::selectable(picked, text);
                if ui.add_enabled(interactive, button).clicked() {
                    clicked = Some(i);
                }
            }
        });
    clicked
}
