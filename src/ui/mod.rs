//! Terminal output helpers for the CLI
//!
//! Uses `cliclack` log lines in interactive terminals and plain, prefixed
//! lines everywhere else (pipes, CI).

mod context;
mod output;

pub use context::UiContext;
pub use output::{intro, key_value, step_info, step_ok_detail, step_warn_hint};
