use eframe::egui::{self, containers};
use rfd::FileDialog;

use crate::gui::actions::{
    ActionQueue,
    UiAction,
};

pub struct TopBar;

impl TopBar {
    pub fn show(
        ctx: &egui::Context,
        actions: &mut ActionQueue,
        source_label: &str,
        using_bundled: bool,
        dataset_ready: bool,
    ) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            containers::menu::Bar::new().ui(ui, |ui| {
                egui::widgets::global_theme_preference_switch(ui);
                ui.menu_button("Data", |ui| {
                    if ui.button("Open reviews CSV...").clicked() {
                        if let Some(path) =
                            FileDialog::new().add_filter("CSV files", &["csv"]).pick_file()
                        {
                            actions.push(UiAction::LoadDataset(path));
                        }
                    }
                    if !using_bundled && ui.button("Use bundled reviews").clicked() {
                        actions.push(UiAction::LoadBundledDataset);
                    }
                    ui.separator();
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    Self::show_source_indicator(ui, source_label, dataset_ready);
                });
            });
        });
    }

    fn show_source_indicator(ui: &mut egui::Ui, source_label: &str, dataset_ready: bool) {
        let (color, tooltip) = if dataset_ready {
            (egui::Color32::from_rgb(0, 200, 0), "Reviews loaded")
        } else {
            (egui::Color32::from_rgb(200, 80, 80), "No reviews loaded")
        };

        ui.horizontal(|ui| {
            ui.spacing_mut().item_spacing.x = 2.0;
            ui.small(source_label).on_hover_text(tooltip);
            ui.small(egui::RichText::new("●").color(color)).on_hover_text(tooltip);
        });
    }
}
