//! CSES Tracker - a terminal tracker for the CSES problem set
//!
//! Progress lives in a document store and is mirrored live into the UI.
//! Each question carries worked approaches in C++, and a Gemini-backed
//! assistant can give hints, explain code or suggest another approach.

pub mod app;
pub mod assistant;
pub mod calendar;
pub mod catalog;
pub mod clock;
pub mod config;
pub mod identity;
pub mod progress;
pub mod store;
pub mod syntax;
pub mod theme;
pub mod ui;

pub use app::App;
pub use config::Config;
pub use theme::Theme;
