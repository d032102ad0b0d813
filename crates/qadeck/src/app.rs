use eframe::egui;
use std::cell::Cell;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Instant;

use crate::choice::{ChoiceBoard, Slot};
use crate::deck::{self, Deck, Item};
use crate::nav::{self, Effect, NavAction};
use crate::render::{self, ChoicePick, ChoiceSlot};
use crate::state::StepStore;
use crate::state::storage::{self, FileStore};
use crate::state::watch::StorageWatcher;
use crate::theme::Theme;
use crate::view::{self, DeckView, ItemView, QuestionView};

/// Widest the content column gets on large screens.
const MAX_CONTENT_WIDTH: f32 = 960.0;

/// Everything `run` needs, resolved from CLI flags, config and frontmatter.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub deck: PathBuf,
    pub presenter: bool,
    pub windowed: bool,
    pub state_root: PathBuf,
    /// Theme name from CLI or config. Deck frontmatter wins over this.
    pub theme: Option<String>,
}

struct DeckApp {
    deck: Deck,
    title: String,
    presenter: bool,
    theme: Theme,
    store: StepStore<FileStore>,
    watcher: Option<StorageWatcher>,
    choices: ChoiceBoard,
    /// Set by the store subscriber; the window title is refreshed on the next frame.
    title_stale: Rc<Cell<bool>>,
}

impl DeckApp {
    fn new(
        deck: Deck,
        title: String,
        presenter: bool,
        theme: Theme,
        mut store: StepStore<FileStore>,
        watcher: Option<StorageWatcher>,
    ) -> Self {
        let title_stale = Rc::new(Cell::new(true));
        let flag = Rc::clone(&title_stale);
        store.on_change(move |state| {
            log::trace!("State changed: {state:?}");
            flag.set(true);
        });

        Self {
            deck,
            title,
            presenter,
            theme,
            store,
            watcher,
            choices: ChoiceBoard::new(),
            title_stale,
        }
    }

    fn window_title(&self) -> String {
        let questions = self.deck.question_count();
        if questions == 0 {
            return self.title.clone();
        }
        let current = (self.store.state().question_number() + 1).min(questions);
        format!("{} ({current}/{questions})", self.title)
    }

    fn project(&mut self) -> DeckView {
        let view = view::project(&self.deck, self.store.state(), self.presenter);
        let mounted = view.mounted_choices(&self.deck);
        self.choices.retain(|id| mounted.contains(&id));
        view
    }

    /// Apply actions in order. Returns whether fullscreen should flip.
    fn apply_all(&mut self, actions: &[NavAction]) -> bool {
        let mut toggle = false;
        for action in actions {
            log::debug!("Action: {action:?}");
            if nav::apply(&mut self.store, *action) == Effect::ToggleFullscreen {
                toggle = !toggle;
            }
        }
        toggle
    }

    fn draw_rows(&self, ui: &mut egui::Ui, view: &DeckView) -> (Vec<usize>, Option<ChoicePick>) {
        let mut acks = Vec::new();
        let mut pick = None;
        let clicked = ui.input(|i| i.pointer.primary_clicked());

        if let Some(title) = &view.title {
            ui.label(
                egui::RichText::new(title)
                    .size(self.theme.heading_size(1))
                    .color(self.theme.heading_color)
                    .strong(),
            );
            ui.add_space(self.theme.body_size);
        }

        for (idx, item_view) in view.items.iter().enumerate() {
            if idx > 0 {
                ui.add_space(self.theme.body_size);
            }
            let Some(item) = self.deck.items.get(item_view.index()) else {
                continue;
            };
            match (item_view, item) {
                (ItemView::Question(q), Item::QuestionAnswer { question, answer }) => {
                    let (response, picked) = self.draw_question(ui, q, question, answer);
                    if q.past && clicked && response.contains_pointer() {
                        acks.push(q.ordinal);
                    }
                    pick = pick.or(picked);
                }
                (ItemView::Section { index }, Item::Section { title }) => {
                    ui.add_space(self.theme.body_size);
                    let slot = self.slot(*index, Slot::Body, true);
                    pick = pick.or(render::show_blocks(ui, title, &self.theme, &slot));
                }
                (ItemView::Block { index }, Item::Block { content }) => {
                    let slot = self.slot(*index, Slot::Body, true);
                    pick = pick.or(render::show_blocks(ui, content, &self.theme, &slot));
                }
                _ => log::warn!("View out of sync with deck at item {}", item_view.index()),
            }
        }
        (acks, pick)
    }

    fn draw_question(
        &self,
        ui: &mut egui::Ui,
        q: &QuestionView,
        question: &[deck::Block],
        answer: &[deck::Block],
    ) -> (egui::Response, Option<ChoicePick>) {
        let fill = if q.future {
            self.theme.muted_background
        } else {
            egui::Color32::TRANSPARENT
        };
        let mut pick = None;

        let inner = ui.scope(|ui| {
            ui.multiply_opacity(q.row_opacity());
            egui::Frame::new()
                .fill(fill)
                .corner_radius(8.0)
                .inner_margin(egui::Margin::symmetric(16, 12))
                .show(ui, |ui| {
                    ui.set_width(ui.available_width());
                    ui.horizontal_top(|ui| {
                        let number_width = self.theme.body_size * 2.0;
                        ui.allocate_ui(egui::vec2(number_width, 0.0), |ui| {
                            ui.set_width(number_width);
                            ui.label(
                                egui::RichText::new(q.number_label())
                                    .monospace()
                                    .size(self.theme.body_size * 0.7)
                                    .color(Theme::with_opacity(self.theme.foreground, 0.4)),
                            );
                        });
                        ui.vertical(|ui| {
                            let slot = self.slot(q.index, Slot::Question, true);
                            pick = render::show_blocks(ui, question, &self.theme, &slot);

                            if q.answer_opacity > 0.0 {
                                ui.add_space(self.theme.body_size * 0.75);
                                ui.scope(|ui| {
                                    ui.multiply_opacity(q.answer_opacity);
                                    let slot = self.slot(q.index, Slot::Answer, q.show_answer);
                                    let picked =
                                        render::show_blocks(ui, answer, &self.theme, &slot);
                                    pick = pick.or(picked);
                                });
                            }
                        });
                    });
                })
        });
        (inner.response, pick)
    }

    fn slot(&self, item: usize, slot: Slot, interactive: bool) -> ChoiceSlot<'_> {
        ChoiceSlot {
            board: &self.choices,
            item,
            slot,
            interactive,
        }
    }

    fn draw_chrome(&self, ui: &egui::Ui, rect: egui::Rect, view: &DeckView) {
        let chrome_color = Theme::with_opacity(self.theme.foreground, 0.3);

        let questions = self.deck.question_count();
        if questions > 0 {
            let phase = if view.is_answer_phase { "A" } else { "Q" };
            let counter_text = format!(
                "{phase} {} / {questions}",
                (view.question_number + 1).min(questions)
            );
            let counter_galley = ui.painter().layout_no_wrap(
                counter_text,
                egui::FontId::monospace(14.0),
                chrome_color,
            );
            let counter_pos = egui::pos2(
                rect.right() - counter_galley.rect.width() - 16.0,
                rect.bottom() - 30.0,
            );
            ui.painter()
                .galley(counter_pos, counter_galley, chrome_color);
        }

        if self.presenter {
            let badge_color = Theme::with_opacity(self.theme.accent, 0.6);
            let galley = ui.painter().layout_no_wrap(
                "PRESENTER".to_string(),
                egui::FontId::monospace(12.0),
                badge_color,
            );
            let pos = egui::pos2(rect.right() - galley.rect.width() - 12.0, rect.top() + 10.0);
            ui.painter().galley(pos, galley, badge_color);
        }
    }
}

impl eframe::App for DeckApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.watcher.as_ref().is_some_and(StorageWatcher::changed) {
            self.store.reload();
        }

        // Collect viewport commands to send AFTER the input closure
        // (sending inside ctx.input() causes RwLock deadlock)
        let mut viewport_cmds: Vec<egui::ViewportCommand> = Vec::new();
        let mut actions: Vec<NavAction> = Vec::new();
        let mut fullscreen = false;

        ctx.input(|i| {
            fullscreen = i.viewport().fullscreen.unwrap_or(false);
            for event in &i.events {
                if let egui::Event::Key {
                    key, pressed: true, ..
                } = event
                {
                    actions.extend(nav::action_for_key(*key));
                }
            }
            if i.pointer
                .button_double_clicked(egui::PointerButton::Primary)
            {
                actions.push(NavAction::ToggleFullscreen);
            }
        });

        let mut toggle = self.apply_all(&actions);
        let mut view = self.project();

        // Deferred advances from choice prompts that are still mounted.
        let due = self.choices.take_due(Instant::now());
        if due > 0 {
            toggle ^= self.apply_all(&vec![NavAction::Next; due]);
            view = self.project();
        }

        if toggle {
            viewport_cmds.push(egui::ViewportCommand::Fullscreen(!fullscreen));
        }

        let scroll_to_bottom = self.store.take_scroll_request();
        let bg = self.theme.background;
        let mut acks = Vec::new();
        let mut pick = None;

        egui::CentralPanel::default()
            .frame(egui::Frame::new().fill(bg).inner_margin(0.0))
            .show(ctx, |ui| {
                let rect = ui.max_rect();
                egui::ScrollArea::vertical()
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        let width = ui.available_width();
                        let side = ((width - MAX_CONTENT_WIDTH) / 2.0).max(24.0);
                        let content_width = width - side * 2.0;
                        ui.add_space(48.0);
                        ui.horizontal_top(|ui| {
                            ui.add_space(side);
                            ui.vertical(|ui| {
                                ui.set_width(content_width);
                                (acks, pick) = self.draw_rows(ui, &view);
                            });
                        });
                        ui.add_space(96.0);
                        if scroll_to_bottom {
                            ui.scroll_to_cursor(Some(egui::Align::BOTTOM));
                        }
                    });
                self.draw_chrome(ui, rect, &view);
            });

        if let Some(ChoicePick { id, option }) = pick {
            self.choices.select(id, option, Instant::now());
        }
        if !acks.is_empty() {
            let acks: Vec<NavAction> = acks.into_iter().map(NavAction::Acknowledge).collect();
            self.apply_all(&acks);
            ctx.request_repaint();
        }

        if let Some(deadline) = self.choices.next_deadline() {
            ctx.request_repaint_after(deadline.saturating_duration_since(Instant::now()));
        }

        if self.title_stale.replace(false) {
            viewport_cmds.push(egui::ViewportCommand::Title(self.window_title()));
        }

        for cmd in viewport_cmds {
            ctx.send_viewport_cmd(cmd);
        }
    }
}

pub fn run(options: RunOptions) -> anyhow::Result<()> {
    let RunOptions {
        deck: file,
        presenter,
        windowed,
        state_root,
        theme,
    } = options;

    let deck = deck::load(&file)?;
    if deck.items.is_empty() {
        anyhow::bail!("No items found in {}", file.display());
    }
    log::info!(
        "Loaded {} ({} items, {} questions, presenter: {presenter})",
        file.display(),
        deck.items.len(),
        deck.question_count()
    );

    for (index, item) in deck.items.iter().enumerate() {
        log::trace!("Item {index}: {}", item.kind_name());
    }

    let title = deck.display_title().map(str::to_string).unwrap_or_else(|| {
        format!(
            "qadeck \u{2014} {}",
            file.file_name().unwrap_or_default().to_string_lossy()
        )
    });

    // Frontmatter wins over CLI/config.
    let theme_name = deck
        .meta
        .theme
        .clone()
        .or(theme)
        .unwrap_or_else(|| "light".to_string());
    let theme = Theme::from_name(&theme_name);

    let state_dir = storage::deck_state_dir(&state_root, &file);
    log::debug!("State directory: {}", state_dir.display());
    let store = StepStore::new(FileStore::new(state_dir.clone()), deck.max_step());

    let viewport = if windowed {
        egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_title(&title)
    } else {
        egui::ViewportBuilder::default()
            .with_fullscreen(true)
            .with_title(&title)
    };

    let native_options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    let app_name = title.clone();
    eframe::run_native(
        &app_name,
        native_options,
        Box::new(move |cc| {
            cc.egui_ctx.set_visuals(if theme.is_dark() {
                egui::Visuals::dark()
            } else {
                egui::Visuals::light()
            });

            let ctx = cc.egui_ctx.clone();
            let watcher = match StorageWatcher::spawn(&state_dir, move || ctx.request_repaint()) {
                Ok(watcher) => Some(watcher),
                Err(e) => {
                    log::warn!("Cross-window sync disabled: {e:#}");
                    None
                }
            };

            Ok(Box::new(DeckApp::new(
                deck, title, presenter, theme, store, watcher,
            )))
        }),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}
