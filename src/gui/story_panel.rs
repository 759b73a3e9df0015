use eframe::egui::{
    self,
    RichText,
};

use crate::{
    gui::theme::Theme,
    story::STEPS,
};

/// Where the prose steps ended up this frame, in the scroll content's own
/// coordinate space, plus the scroll state needed to judge what is visible.
pub struct StoryGeometry {
    pub tops: Vec<f32>,
    pub heights: Vec<f32>,
    pub viewport_h: f32,
    pub scroll_top: f32,
}

pub struct StoryPanel;

impl StoryPanel {
    /// Renders the narrative column and reports step geometry. The padding
    /// before the first step and after the last lets both reach the middle
    /// of the viewport.
    pub fn show(ctx: &egui::Context, theme: &Theme) -> StoryGeometry {
        let mut tops = Vec::with_capacity(STEPS.len());
        let mut heights = Vec::with_capacity(STEPS.len());
        let mut viewport_h = 0.0;
        let mut scroll_top = 0.0;

        egui::SidePanel::left("story_panel").exact_width(380.0).resizable(false).show(ctx, |ui| {
            viewport_h = ui.available_height();

            let output = egui::ScrollArea::vertical().auto_shrink([false, false]).show(ui, |ui| {
                let content_top = ui.cursor().top();

                ui.add_space(viewport_h * 0.3);
                for step in STEPS.iter() {
                    let step_rect = ui
                        .scope(|ui| {
                            ui.label(theme.heading(ui.ctx(), step.title).size(17.0));
                            ui.add_space(8.0);
                            ui.label(RichText::new(step.body));
                        })
                        .response
                        .rect;

                    tops.push(step_rect.top() - content_top);
                    heights.push(step_rect.height());
                    ui.add_space(260.0);
                }
                ui.add_space(viewport_h * 0.4);
            });

            scroll_top = output.state.offset.y;
        });

        StoryGeometry { tops, heights, viewport_h, scroll_top }
    }
}
