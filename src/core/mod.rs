pub mod dataset;
pub mod errors;
pub mod models;
pub mod tasks;

pub use dataset::{aggregate_words, Dataset};
pub use errors::RepasoError;
pub use models::{Category, Outcome, Pos, ReviewRecord, WordAggregate};
