//! Access reports, user directory rendering, and data sinks.

pub mod reporter;
pub mod sink;

pub use reporter::{render_directory, render_user_card, AccessReport};
