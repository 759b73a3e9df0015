use eframe::egui::{
    self,
    Color32,
    CursorIcon,
    FontId,
    Pos2,
    Rect,
    Sense,
    Stroke,
    Vec2,
};

use crate::{
    charts::{
        ChartCell,
        TooltipContent,
        LOGICAL_H,
        LOGICAL_W,
    },
    gui::{
        actions::{
            ActionQueue,
            UiAction,
        },
        theme::Theme,
    },
    scene::{
        ElementShape,
        Scene,
    },
};

/// Paints the active chart's scene into the panel and routes pointer
/// interaction back as actions. Charts lay out in logical coordinates; the
/// canvas fits that space into the available rectangle with one uniform
/// scale factor, so a window resize never changes chart state.
pub struct ChartCanvas;

impl ChartCanvas {
    pub fn show(
        ui: &mut egui::Ui,
        chart: &ChartCell,
        instance: u64,
        theme: &Theme,
        actions: &mut ActionQueue,
    ) {
        let available = ui.available_size();
        let scale = (available.x / LOGICAL_W).min(available.y / LOGICAL_H).max(0.1);
        let size = Vec2::new(LOGICAL_W * scale, LOGICAL_H * scale);

        let (rect, response) = ui.allocate_exact_size(size, Sense::click());
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 8.0, theme.canvas_fill(ui.ctx()));

        paint_scene(&painter, chart.scene(), rect, scale);

        let hovered = response.hover_pos().and_then(|pos| hit_test(chart.scene(), pos, rect, scale));
        if let Some(key) = hovered {
            if let Some(content) = chart.tooltip_for(&key) {
                show_tooltip(&response, instance, &content);
            }
            if chart.is_interactive(&key) {
                ui.ctx().set_cursor_icon(CursorIcon::PointingHand);
                if response.clicked() {
                    actions.push(UiAction::ClickElement(key));
                }
            }
        }
    }
}

fn paint_scene(painter: &egui::Painter, scene: &Scene, rect: Rect, scale: f32) {
    for element in scene.elements() {
        let props = element.props();
        if props.opacity <= 0.0 {
            continue;
        }
        let color = props.fill.gamma_multiply(props.opacity.clamp(0.0, 1.0));
        let origin = to_screen(rect, scale, props.x, props.y);

        match element.shape() {
            ElementShape::Rect { corner } => {
                let r = Rect::from_min_size(origin, Vec2::new(props.w, props.h) * scale);
                painter.rect_filled(r, corner * scale, color);
            }
            ElementShape::Circle { radius } => {
                painter.circle_filled(origin, radius * scale, color);
            }
            ElementShape::Text { text, size, align } => {
                painter.text(origin, *align, text, FontId::proportional(size * scale), color);
            }
            ElementShape::Line { width, dashed } => {
                let end = to_screen(rect, scale, props.x + props.w, props.y + props.h);
                let stroke = Stroke::new(width * scale, color);
                if *dashed {
                    painter.extend(egui::Shape::dashed_line(
                        &[origin, end],
                        stroke,
                        5.0 * scale,
                        2.5 * scale,
                    ));
                } else {
                    painter.line_segment([origin, end], stroke);
                }
            }
        }
    }
}

/// Topmost element under the pointer. Paint order is scene order, so the
/// scan runs back to front; text and lines do not take hits.
fn hit_test(scene: &Scene, pos: Pos2, rect: Rect, scale: f32) -> Option<String> {
    for element in scene.elements().iter().rev() {
        let props = element.props();
        if props.opacity <= 0.0 || element.is_exiting() {
            continue;
        }

        let hit = match element.shape() {
            ElementShape::Rect { .. } => {
                let origin = to_screen(rect, scale, props.x, props.y);
                Rect::from_min_size(origin, Vec2::new(props.w, props.h) * scale).contains(pos)
            }
            ElementShape::Circle { radius } => {
                let center = to_screen(rect, scale, props.x, props.y);
                center.distance(pos) <= radius * scale
            }
            ElementShape::Text { .. } | ElementShape::Line { .. } => false,
        };

        if hit {
            return Some(element.key().to_string());
        }
    }
    None
}

fn to_screen(rect: Rect, scale: f32, x: f32, y: f32) -> Pos2 {
    Pos2::new(rect.left() + x * scale, rect.top() + y * scale)
}

fn show_tooltip(response: &egui::Response, instance: u64, content: &TooltipContent) {
    response.clone().on_hover_ui(|ui| {
        ui.set_max_width(240.0);
        ui.strong(&content.title);
        for line in &content.lines {
            ui.label(line);
        }
        if let Some(breakdown) = &content.breakdown {
            ui.separator();
            egui::Grid::new(("tooltip_breakdown", instance)).num_columns(2).show(ui, |ui| {
                for (label, count) in
                    breakdown.pos_counts.iter().chain(breakdown.category_counts.iter())
                {
                    ui.label(egui::RichText::new(label).color(Color32::LIGHT_GRAY));
                    ui.label(count.to_string());
                    ui.end_row();
                }
            });
        }
    });
}
