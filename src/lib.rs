//! confirm-dialog - single-slot yes/no confirmation dialog
//!
//! A [`ConfirmDialog`] shows a prompt on a [`Page`] panel and returns a
//! [`Confirmation`] that settles with the user's answer. The `tui` module
//! renders the page in a terminal and the binary wraps it in a CLI.

#![allow(clippy::uninlined_format_args)] // Style preference
#![allow(clippy::return_self_not_must_use)] // Builder pattern is clear enough

pub mod cli;
pub mod config;
pub mod dialog;
pub mod error;
pub mod logger;
pub mod page;
pub mod tui;

pub use config::{DialogConfig, ElementIds};
pub use dialog::{ConfirmDialog, Confirmation, DialogState, Outcome, OverlapPolicy, confirm_dialog};
pub use error::DialogError;
pub use page::{Document, ElementKind, Page};
