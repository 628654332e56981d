//! Terminal front-end: the resource table, detail view, filter pickers and
//! the create / propose form, drawn with ratatui on a crossterm backend.

mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;
