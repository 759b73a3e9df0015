pub mod dispatcher;
pub mod steps;
pub mod tracker;

pub use dispatcher::{ActiveCell, CardKind, CellDispatcher};
pub use steps::{NarrativeStep, CARD_STEPS, STEPS};
pub use tracker::ViewportTracker;
