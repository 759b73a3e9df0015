use std::{
    mem,
    sync::Arc,
};

use eframe::egui;

use super::{
    actions::{
        ActionQueue,
        UiAction,
    },
    canvas::ChartCanvas,
    cards,
    error_modal::ErrorModal,
    message_overlay::MessageOverlay,
    settings::SettingsData,
    story_panel::StoryPanel,
    theme::{
        set_theme,
        Theme,
    },
    top_bar::TopBar,
};
use crate::{
    config,
    core::{
        dataset::Dataset,
        models::Category,
        tasks::{
            DatasetSource,
            TaskManager,
            TaskResult,
        },
    },
    persistence::{
        load_json_or_default,
        save_json,
    },
    story::{
        CellDispatcher,
        ViewportTracker,
    },
};

const SETTINGS_FILE: &str = "settings.json";

pub struct RepasoApp {
    dataset: Option<Arc<Dataset>>,
    source: DatasetSource,
    settings_data: SettingsData,
    theme: Theme,
    tracker: ViewportTracker,
    dispatcher: CellDispatcher,
    actions: ActionQueue,
    message_overlay: MessageOverlay,
    error_modal: ErrorModal,
    task_manager: TaskManager,
}

impl RepasoApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let settings_data: SettingsData = load_json_or_default(SETTINGS_FILE);

        let source = settings_data
            .data_path
            .clone()
            .map(DatasetSource::File)
            .unwrap_or(DatasetSource::Bundled);

        let task_manager = TaskManager::new();
        task_manager.load_dataset(source.clone());

        let theme = Theme::storm();
        set_theme(&cc.egui_ctx, theme.clone());

        cc.egui_ctx.set_zoom_factor(settings_data.zoom);
        if settings_data.dark_mode {
            cc.egui_ctx.set_theme(egui::Theme::Dark);
        } else {
            cc.egui_ctx.set_theme(egui::Theme::Light);
        }

        Self {
            dataset: None,
            source,
            settings_data,
            theme,
            tracker: ViewportTracker::new(),
            dispatcher: CellDispatcher::new(),
            actions: ActionQueue::new(),
            message_overlay: MessageOverlay::new(),
            error_modal: ErrorModal::new(),
            task_manager,
        }
    }

    fn handle_task_result(&mut self, result: TaskResult) {
        match result {
            TaskResult::DatasetLoaded { source, result } => match result {
                Ok(dataset) => {
                    tracing::info!(
                        source = %source.label(),
                        records = dataset.records.len(),
                        "dataset loaded"
                    );
                    self.message_overlay.clear_message();

                    let dataset = Arc::new(dataset);
                    self.dataset = Some(Arc::clone(&dataset));
                    self.source = source;

                    // The reader may be mid-story; rebuild whatever cell they
                    // are looking at from the fresh data.
                    self.dispatcher.clear();
                    if let Some(step) = self.tracker.active() {
                        self.dispatcher.show(step, &dataset);
                    }
                }
                Err(message) => {
                    self.message_overlay.clear_message();
                    self.error_modal.show_error(
                        "Could not load reviews",
                        format!("Reading {} failed.", source.label()),
                        Some(message),
                    );

                    if self.dataset.is_none() && !matches!(source, DatasetSource::Bundled) {
                        self.task_manager.load_dataset(DatasetSource::Bundled);
                    }
                }
            },
            TaskResult::LoadingMessage(message) => {
                self.message_overlay.set_message(message);
            }
        }
    }

    fn apply_action(&mut self, action: UiAction) {
        match action {
            UiAction::LoadDataset(path) => {
                self.message_overlay.set_message("Reading reviews...".to_string());
                self.settings_data.data_path = Some(path.clone());
                self.save_settings();
                self.task_manager.load_dataset(DatasetSource::File(path));
            }
            UiAction::LoadBundledDataset => {
                self.message_overlay.set_message("Reading reviews...".to_string());
                self.settings_data.data_path = None;
                self.save_settings();
                self.task_manager.load_dataset(DatasetSource::Bundled);
            }
            UiAction::AdvanceChart => {
                if let Some(chart) = self.dispatcher.chart_mut() {
                    chart.advance();
                }
            }
            UiAction::CycleDetailMode => {
                if let Some(chart) = self.dispatcher.chart_mut() {
                    chart.cycle_mode();
                }
            }
            UiAction::ResetChartView => {
                if let Some(chart) = self.dispatcher.chart_mut() {
                    chart.reset_view();
                }
            }
            UiAction::ToggleCategory(category) => {
                if let Some(chart) = self.dispatcher.chart_mut() {
                    chart.toggle_category(category);
                }
            }
            UiAction::ClickElement(key) => {
                if let Some(chart) = self.dispatcher.chart_mut() {
                    chart.click(&key);
                }
            }
        }
    }

    fn save_settings(&self) {
        if let Err(e) = save_json(&self.settings_data, SETTINGS_FILE) {
            tracing::warn!("failed to save settings: {}", e);
        }
    }

    fn sync_preferences(&mut self, ctx: &egui::Context) {
        let dark_mode = ctx.theme() == egui::Theme::Dark;
        if dark_mode != self.settings_data.dark_mode {
            self.settings_data.dark_mode = dark_mode;
            self.save_settings();
        }

        let zoom = ctx.zoom_factor();
        if (zoom - self.settings_data.zoom).abs() > 0.001 {
            self.settings_data.zoom = zoom;
            self.save_settings();
        }
    }

    fn handle_file_drops(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input_mut(|i| mem::take(&mut i.raw.dropped_files));
        for file in dropped {
            if let Some(path) = file.path {
                if path.extension().and_then(|e| e.to_str()) == Some("csv") {
                    self.actions.push(UiAction::LoadDataset(path));
                    break;
                }
            }
        }
    }

    fn draw_file_drop_overlay(&self, ctx: &egui::Context) {
        let hovering_csv = ctx.input(|i| {
            i.raw.hovered_files.iter().any(|file| {
                file.path
                    .as_ref()
                    .map(|p| p.extension().and_then(|e| e.to_str()) == Some("csv"))
                    .unwrap_or(true)
            })
        });

        if hovering_csv {
            egui::Modal::new(egui::Id::new("file_drop_overlay")).show(ctx, |ui| {
                ui.set_width(260.0);
                ui.vertical_centered(|ui| {
                    ui.add_space(12.0);
                    ui.label(self.theme.heading(ui.ctx(), "Drop to load reviews"));
                    ui.add_space(6.0);
                    ui.label("A CSV of review history replaces the current data.");
                    ui.add_space(12.0);
                });
            });
        }
    }

    fn show_chart_controls(&mut self, ui: &mut egui::Ui) {
        let Some(chart) = self.dispatcher.chart() else {
            return;
        };

        ui.horizontal_wrapped(|ui| {
            if chart.can_advance() && ui.button("Continue").clicked() {
                self.actions.push(UiAction::AdvanceChart);
            }

            if chart.has_category_filter() {
                for category in Category::ALL {
                    let selected = chart.is_selected(category);
                    let label = config::category_info(category).name;
                    if ui.selectable_label(selected, label).clicked() {
                        self.actions.push(UiAction::ToggleCategory(category));
                    }
                }
            }

            if chart.can_cycle() && ui.button("Next breakdown").clicked() {
                self.actions.push(UiAction::CycleDetailMode);
            }

            if chart.can_reset() && ui.button("All months").clicked() {
                self.actions.push(UiAction::ResetChartView);
            }

            if let Some(caption) = chart.caption() {
                ui.label(egui::RichText::new(caption).color(self.theme.muted(ui.ctx())));
            }
        });
    }

    fn show_central_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(card) = self.dispatcher.card() {
                if let Some(dataset) = &self.dataset {
                    cards::show_card(ui, card, dataset, &self.theme);
                }
            } else if self.dispatcher.chart().is_some() {
                self.show_chart_controls(ui);
                if let Some(chart) = self.dispatcher.chart() {
                    ChartCanvas::show(
                        ui,
                        chart,
                        self.dispatcher.instance(),
                        &self.theme,
                        &mut self.actions,
                    );
                }
            } else {
                ui.centered_and_justified(|ui| {
                    let hint = if self.dataset.is_some() {
                        "Scroll the story on the left."
                    } else {
                        "Loading reviews..."
                    };
                    ui.label(egui::RichText::new(hint).color(self.theme.muted(ui.ctx())));
                });
            }
        });
    }

    fn using_bundled(&self) -> bool {
        matches!(self.source, DatasetSource::Bundled)
    }
}

impl eframe::App for RepasoApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        for result in self.task_manager.poll_results() {
            self.handle_task_result(result);
        }

        if let Some(chart) = self.dispatcher.chart_mut() {
            chart.tick(ctx.input(|i| i.time));
            if chart.needs_frames() {
                ctx.request_repaint();
            }
        }

        self.handle_file_drops(ctx);

        let source_label = self.source.label();
        let using_bundled = self.using_bundled();
        let dataset_ready = self.dataset.is_some();
        TopBar::show(ctx, &mut self.actions, &source_label, using_bundled, dataset_ready);

        let geometry = StoryPanel::show(ctx, &self.theme);
        self.tracker.sync_layout(&geometry.tops, &geometry.heights, geometry.viewport_h);
        if let Some(step) = self.tracker.observe(geometry.scroll_top) {
            if let Some(dataset) = &self.dataset {
                self.dispatcher.show(step, dataset);
                // A fresh cell arms its intro on its first tick, next frame.
                ctx.request_repaint();
            }
        }

        self.show_central_panel(ctx);

        let pending: Vec<UiAction> = self.actions.drain().collect();
        for action in pending {
            self.apply_action(action);
        }

        self.draw_file_drop_overlay(ctx);
        self.message_overlay.show(ctx, &self.theme);
        self.error_modal.show(ctx);

        self.sync_preferences(ctx);
    }
}
