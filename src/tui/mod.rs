//! Terminal front-end for the confirmation dialog
//!
//! Draws the page's panel with ratatui and turns key presses into clicks on
//! the answer controls.

mod app;
mod keys;
mod render;

pub use app::run_confirm;
pub use keys::{KeyOutcome, handle_key};
pub use render::render_dialog;
