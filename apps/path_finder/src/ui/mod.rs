//! UI layer: app shell and the interactive map.

pub mod app;
pub mod map_view;

pub use app::PathFinderApp;
