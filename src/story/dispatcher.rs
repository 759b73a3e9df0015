use std::{
    collections::HashMap,
    sync::Arc,
};

use crate::{
    charts::{
        ChartCell,
        ChartKind,
    },
    core::Dataset,
};

/// Prose-only steps show a painted card instead of a live chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardKind {
    Opening,
    Dataset,
    Closing,
}

pub enum ActiveCell {
    Empty,
    Card(CardKind),
    Chart(ChartCell),
}

/// Owns the graphic slot. Each narrative step maps to at most one cell, and
/// the two maps never share an index; switching steps always tears the old
/// cell down before the new one is constructed, so scene keys from different
/// charts cannot collide in a shared stage.
pub struct CellDispatcher {
    cards: HashMap<usize, CardKind>,
    charts: HashMap<usize, ChartKind>,
    active: ActiveCell,
    active_step: Option<usize>,
    instance: u64,
}

impl CellDispatcher {
    pub fn new() -> Self {
        let cards = HashMap::from([
            (0, CardKind::Opening),
            (1, CardKind::Dataset),
            (6, CardKind::Closing),
        ]);
        let charts = HashMap::from([
            (2, ChartKind::Waffle),
            (3, ChartKind::Morph),
            (4, ChartKind::Rates),
            (5, ChartKind::Calendar),
        ]);
        Self { cards, charts, active: ActiveCell::Empty, active_step: None, instance: 0 }
    }

    /// Activates the cell bound to `step`. Showing the already-active step
    /// again changes nothing, and an index bound to no cell is ignored, so a
    /// jittery caller cannot restart a chart's intro.
    pub fn show(&mut self, step: usize, dataset: &Arc<Dataset>) {
        if self.active_step == Some(step) {
            return;
        }

        if let Some(&card) = self.cards.get(&step) {
            self.teardown_active();
            self.active = ActiveCell::Card(card);
        } else if let Some(&kind) = self.charts.get(&step) {
            self.teardown_active();
            self.active = ActiveCell::Chart(ChartCell::new(kind, Arc::clone(dataset)));
        } else {
            return;
        }

        self.active_step = Some(step);
        self.instance += 1;
    }

    /// Empties the slot outright. The next `show` reconstructs even for the
    /// step that was active before, which is how a dataset swap forces every
    /// chart to rebuild from the new data.
    pub fn clear(&mut self) {
        self.teardown_active();
        self.active = ActiveCell::Empty;
        self.active_step = None;
    }

    fn teardown_active(&mut self) {
        if let ActiveCell::Chart(chart) = &mut self.active {
            chart.teardown();
        }
    }

    pub fn active(&self) -> &ActiveCell {
        &self.active
    }

    pub fn chart(&self) -> Option<&ChartCell> {
        match &self.active {
            ActiveCell::Chart(chart) => Some(chart),
            _ => None,
        }
    }

    pub fn chart_mut(&mut self) -> Option<&mut ChartCell> {
        match &mut self.active {
            ActiveCell::Chart(chart) => Some(chart),
            _ => None,
        }
    }

    pub fn card(&self) -> Option<CardKind> {
        match &self.active {
            ActiveCell::Card(card) => Some(*card),
            _ => None,
        }
    }

    /// Bumped on every reconstruction; the canvas salts its egui ids with
    /// this so hover state never leaks between cell generations.
    pub fn instance(&self) -> u64 {
        self.instance
    }
}

impl Default for CellDispatcher {
    fn default() -> Self {
        Self::new()
    }
}
