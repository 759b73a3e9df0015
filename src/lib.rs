pub mod charts;
pub mod config;
pub mod core;
pub mod gui;
pub mod persistence;
pub mod scene;
pub mod story;
