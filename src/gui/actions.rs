use std::path::PathBuf;

use crate::core::Category;

// A simple ui action queue system so we don't need to pass mutable references to ui functions
#[derive(Debug, Clone)]
pub enum UiAction {
    // Dataset
    LoadDataset(PathBuf),
    LoadBundledDataset,

    // Active chart controls
    AdvanceChart,
    CycleDetailMode,
    ResetChartView,
    ToggleCategory(Category),
    ClickElement(String),
}

pub struct ActionQueue {
    actions: Vec<UiAction>,
}

impl ActionQueue {
    pub fn new() -> Self {
        Self { actions: Vec::new() }
    }

    pub fn push(&mut self, action: UiAction) {
        self.actions.push(action);
    }

    pub fn drain(&mut self) -> std::vec::Drain<'_, UiAction> {
        self.actions.drain(..)
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl Default for ActionQueue {
    fn default() -> Self {
        Self::new()
    }
}
