//! Terminal front-end: one screen, one piece of state, one outbound request.

mod app;
mod helpers;
mod terminal;

pub use app::App;
pub use terminal::run_app;
