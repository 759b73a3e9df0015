use std::sync::Arc;

use crate::{
    core::{
        Category,
        Dataset,
    },
    scene::Scene,
};

mod calendar;
mod morph;
mod rates;
mod waffle;

pub use calendar::{CalendarChart, CalendarView, DetailMode};
pub use morph::MorphChart;
pub use rates::RateStrip;
pub use waffle::WaffleChart;

/// Charts lay themselves out in a fixed logical space; the canvas maps it
/// onto whatever rectangle the panel currently grants.
pub const LOGICAL_W: f32 = 760.0;
pub const LOGICAL_H: f32 = 480.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Waffle,
    Morph,
    Rates,
    Calendar,
}

/// Affine map between a data interval and a pixel interval.
#[derive(Debug, Clone, Copy)]
pub struct LinearScale {
    domain: (f32, f32),
    range: (f32, f32),
}

impl LinearScale {
    pub fn new(domain: (f32, f32), range: (f32, f32)) -> Self {
        Self { domain, range }
    }

    /// A degenerate domain maps everything to the start of the range.
    pub fn apply(&self, value: f32) -> f32 {
        let width = self.domain.1 - self.domain.0;
        if width.abs() < f32::EPSILON {
            return self.range.0;
        }
        let t = (value - self.domain.0) / width;
        self.range.0 + t * (self.range.1 - self.range.0)
    }
}

/// What the canvas shows next to a hovered element.
#[derive(Debug, Clone, PartialEq)]
pub struct TooltipContent {
    pub title: String,
    pub lines: Vec<String>,
    pub breakdown: Option<Breakdown>,
}

/// Count tables for the richer hover cards, already sorted for display.
#[derive(Debug, Clone, PartialEq)]
pub struct Breakdown {
    pub pos_counts: Vec<(String, usize)>,
    pub category_counts: Vec<(String, usize)>,
}

/// One slot's worth of chart. The dispatcher constructs a cell when its step
/// activates and drops it when the reader scrolls on, so every variant owns
/// its scene and state outright.
pub enum ChartCell {
    Waffle(WaffleChart),
    Morph(MorphChart),
    Rates(RateStrip),
    Calendar(CalendarChart),
}

impl ChartCell {
    pub fn new(kind: ChartKind, dataset: Arc<Dataset>) -> Self {
        match kind {
            ChartKind::Waffle => ChartCell::Waffle(WaffleChart::new(dataset)),
            ChartKind::Morph => ChartCell::Morph(MorphChart::new(dataset)),
            ChartKind::Rates => ChartCell::Rates(RateStrip::new(dataset)),
            ChartKind::Calendar => ChartCell::Calendar(CalendarChart::new(dataset)),
        }
    }

    pub fn kind(&self) -> ChartKind {
        match self {
            ChartCell::Waffle(_) => ChartKind::Waffle,
            ChartCell::Morph(_) => ChartKind::Morph,
            ChartCell::Rates(_) => ChartKind::Rates,
            ChartCell::Calendar(_) => ChartKind::Calendar,
        }
    }

    pub fn scene(&self) -> &Scene {
        match self {
            ChartCell::Waffle(chart) => chart.scene(),
            ChartCell::Morph(chart) => chart.scene(),
            ChartCell::Rates(chart) => chart.scene(),
            ChartCell::Calendar(chart) => chart.scene(),
        }
    }

    pub fn tick(&mut self, now: f64) {
        match self {
            ChartCell::Waffle(chart) => chart.tick(now),
            ChartCell::Morph(chart) => chart.tick(now),
            ChartCell::Rates(chart) => chart.tick(now),
            ChartCell::Calendar(chart) => chart.tick(now),
        }
    }

    /// True while any transition or timer is pending, which is when the app
    /// keeps requesting repaints.
    pub fn needs_frames(&self) -> bool {
        self.scene().has_active()
    }

    pub fn teardown(&mut self) {
        match self {
            ChartCell::Waffle(chart) => chart.teardown(),
            ChartCell::Morph(chart) => chart.teardown(),
            ChartCell::Rates(chart) => chart.teardown(),
            ChartCell::Calendar(chart) => chart.teardown(),
        }
    }

    pub fn can_advance(&self) -> bool {
        match self {
            ChartCell::Waffle(chart) => chart.can_advance(),
            ChartCell::Morph(chart) => chart.can_advance(),
            _ => false,
        }
    }

    pub fn advance(&mut self) {
        match self {
            ChartCell::Waffle(chart) => chart.advance(),
            ChartCell::Morph(chart) => chart.advance(),
            _ => {}
        }
    }

    /// Short status line under the chart, where a chart has one.
    pub fn caption(&self) -> Option<&'static str> {
        match self {
            ChartCell::Waffle(chart) => Some(chart.caption()),
            ChartCell::Calendar(chart) => chart.mode_label(),
            _ => None,
        }
    }

    pub fn can_cycle(&self) -> bool {
        matches!(self, ChartCell::Calendar(chart) if chart.in_detail())
    }

    pub fn cycle_mode(&mut self) {
        if let ChartCell::Calendar(chart) = self {
            chart.cycle_mode();
        }
    }

    pub fn can_reset(&self) -> bool {
        matches!(self, ChartCell::Calendar(chart) if chart.in_detail())
    }

    pub fn reset_view(&mut self) {
        if let ChartCell::Calendar(chart) = self {
            chart.reset();
        }
    }

    /// Whether the rate strip's category chips should be offered.
    pub fn has_category_filter(&self) -> bool {
        matches!(self, ChartCell::Rates(_))
    }

    pub fn is_selected(&self, category: Category) -> bool {
        match self {
            ChartCell::Rates(chart) => chart.is_selected(category),
            _ => false,
        }
    }

    pub fn toggle_category(&mut self, category: Category) {
        if let ChartCell::Rates(chart) = self {
            chart.toggle(category);
        }
    }

    pub fn is_interactive(&self, key: &str) -> bool {
        match self {
            ChartCell::Calendar(chart) => chart.is_interactive(key),
            _ => false,
        }
    }

    pub fn click(&mut self, key: &str) {
        if let ChartCell::Calendar(chart) = self {
            chart.click(key);
        }
    }

    pub fn tooltip_for(&self, key: &str) -> Option<TooltipContent> {
        match self {
            ChartCell::Waffle(chart) => chart.tooltip_for(key),
            ChartCell::Morph(chart) => chart.tooltip_for(key),
            ChartCell::Rates(chart) => chart.tooltip_for(key),
            ChartCell::Calendar(chart) => chart.tooltip_for(key),
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn scale_maps_domain_onto_range() {
        let scale = LinearScale::new((0.0, 10.0), (100.0, 200.0));
        assert_relative_eq!(scale.apply(0.0), 100.0);
        assert_relative_eq!(scale.apply(10.0), 200.0);
        assert_relative_eq!(scale.apply(5.0), 150.0);
        assert_relative_eq!(scale.apply(-5.0), 50.0);
    }

    #[test]
    fn scale_supports_inverted_ranges() {
        let scale = LinearScale::new((0.0, 100.0), (400.0, 0.0));
        assert_relative_eq!(scale.apply(0.0), 400.0);
        assert_relative_eq!(scale.apply(25.0), 300.0);
        assert_relative_eq!(scale.apply(100.0), 0.0);
    }

    #[test]
    fn degenerate_domain_collapses_to_range_start() {
        let scale = LinearScale::new((7.0, 7.0), (40.0, 720.0));
        assert_relative_eq!(scale.apply(7.0), 40.0);
        assert_relative_eq!(scale.apply(1000.0), 40.0);
    }

    fn dataset() -> Arc<Dataset> {
        let csv = "word,translation,pos,category,day,tod,outcome,agree,secs\n\
                   gato,cat,noun,everyday,0,33300,good,y,2.5\n\
                   ver,to see,verb,abstract,8,40000,again,n,5.0\n";
        Arc::new(Dataset::from_csv(csv).expect("test csv parses"))
    }

    #[test]
    fn cells_report_their_kind_and_delegate_controls() {
        let data = dataset();

        let waffle = ChartCell::new(ChartKind::Waffle, Arc::clone(&data));
        assert_eq!(waffle.kind(), ChartKind::Waffle);
        assert!(waffle.can_advance());
        assert!(!waffle.can_cycle());
        assert!(waffle.caption().is_some());

        let rates = ChartCell::new(ChartKind::Rates, Arc::clone(&data));
        assert!(!rates.can_advance());
        assert!(rates.has_category_filter());
        assert!(rates.is_selected(Category::Everyday));

        let mut calendar = ChartCell::new(ChartKind::Calendar, data);
        assert!(!calendar.can_cycle());
        calendar.click("day:2025-02-03");
        assert!(calendar.can_cycle());
        assert!(calendar.can_reset());
        calendar.reset_view();
        assert!(!calendar.can_reset());
    }

    #[test]
    fn fresh_cells_want_frames_until_their_intro_settles() {
        let mut cell = ChartCell::new(ChartKind::Morph, dataset());
        assert!(cell.needs_frames());

        cell.tick(1.0);
        cell.tick(20.0);
        assert!(!cell.needs_frames());

        cell.teardown();
        assert!(cell.scene().is_empty());
    }
}
