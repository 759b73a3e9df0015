pub mod actions;
pub mod app;
pub mod canvas;
pub mod cards;
pub mod error_modal;
pub mod message_overlay;
pub mod settings;
pub mod story_panel;
pub mod theme;
pub mod top_bar;

pub use app::RepasoApp;
