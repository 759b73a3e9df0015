use eframe::egui::{
    self,
    RichText,
};
use egui_extras::{
    Column,
    TableBuilder,
};

use crate::{
    config,
    core::{
        Dataset,
        Outcome,
    },
    gui::theme::Theme,
    story::CardKind,
};

/// Prose-only steps get a painted card in the graphic slot instead of a
/// chart: a title board, a sample of the raw data, and a sign-off.
pub fn show_card(ui: &mut egui::Ui, card: CardKind, dataset: &Dataset, theme: &Theme) {
    match card {
        CardKind::Opening => opening_card(ui, dataset, theme),
        CardKind::Dataset => dataset_card(ui, dataset, theme),
        CardKind::Closing => closing_card(ui, theme),
    }
}

fn opening_card(ui: &mut egui::Ui, dataset: &Dataset, theme: &Theme) {
    let word_count = dataset.words.len();
    let day_span = (dataset.max_date - dataset.min_date).num_days() + 1;

    ui.add_space(90.0);
    ui.vertical_centered(|ui| {
        ui.label(theme.heading(ui.ctx(), "Seis meses de repaso").size(30.0));
        ui.add_space(10.0);
        ui.label(
            RichText::new("Half a year of Spanish flashcards, one scroll at a time.")
                .color(theme.muted(ui.ctx())),
        );

        ui.add_space(30.0);
        ui.label(theme.bold(ui.ctx(), &format!("{} reviews", dataset.records.len())).size(18.0));
        ui.label(theme.bold(ui.ctx(), &format!("{} words", word_count)).size(18.0));
        ui.label(theme.bold(ui.ctx(), &format!("{} days", day_span)).size(18.0));
    });
}

fn dataset_card(ui: &mut egui::Ui, dataset: &Dataset, theme: &Theme) {
    ui.add_space(24.0);
    ui.label(theme.heading(ui.ctx(), "The raw material").size(20.0));
    ui.add_space(6.0);
    ui.label(
        RichText::new("Every row is one flashcard review. A handful from the first week:")
            .color(theme.muted(ui.ctx())),
    );
    ui.add_space(14.0);

    let rows: Vec<_> = dataset.records.iter().take(6).collect();
    let text_height =
        egui::TextStyle::Body.resolve(ui.style()).size.max(ui.spacing().interact_size.y);

    TableBuilder::new(ui)
        .striped(true)
        .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
        .column(Column::auto().at_least(70.0))
        .column(Column::auto().at_least(100.0))
        .column(Column::auto().at_least(40.0))
        .column(Column::auto().at_least(90.0))
        .column(Column::auto().at_least(60.0))
        .column(Column::remainder())
        .header(22.0, |mut header| {
            for title in ["word", "translation", "type", "topic", "when", "result"] {
                header.col(|ui| {
                    ui.label(theme.heading(ui.ctx(), title));
                });
            }
        })
        .body(|mut body| {
            body.rows(text_height, rows.len(), |mut row| {
                let record = rows[row.index()];
                row.col(|ui| {
                    ui.label(
                        RichText::new(&record.word)
                            .color(config::pos_info(record.pos).color)
                            .strong(),
                    );
                });
                row.col(|ui| {
                    ui.label(&record.translation);
                });
                row.col(|ui| {
                    ui.label(config::pos_info(record.pos).abbrev);
                });
                row.col(|ui| {
                    ui.label(config::category_info(record.category).name);
                });
                row.col(|ui| {
                    ui.label(record.date().format("%b %-d").to_string());
                });
                row.col(|ui| match record.outcome {
                    Some(Outcome::Good) => {
                        ui.label(RichText::new("good").color(config::GOOD_FILL));
                    }
                    Some(Outcome::Again) => {
                        ui.label(RichText::new("again").color(config::AGAIN_FILL));
                    }
                    None => {
                        ui.label("-");
                    }
                });
            });
        });
}

fn closing_card(ui: &mut egui::Ui, theme: &Theme) {
    ui.add_space(110.0);
    ui.vertical_centered(|ui| {
        ui.label(theme.heading(ui.ctx(), "Hasta la proxima").size(24.0));
        ui.add_space(12.0);
        ui.label(
            RichText::new("The bundled log ends here, but the charts read any review export.")
                .color(theme.muted(ui.ctx())),
        );
        ui.add_space(6.0);
        ui.label(
            RichText::new("Drop a reviews CSV anywhere in the window to retell the story.")
                .color(theme.muted(ui.ctx())),
        );
    });
}
