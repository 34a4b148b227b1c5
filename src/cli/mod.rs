//! Command-line interface components
//!
//! Argument parsing, the interactive prompt, the progress display and the
//! run command handler.

pub mod args;
pub mod commands;
pub mod progress;
pub mod prompt;

pub use args::Cli;
pub use commands::handle_run;
pub use progress::{format_rate, transfer_line, ProgressDisplay};
pub use prompt::{prompt_area, PromptedArea};
