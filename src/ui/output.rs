//! Status lines printed by the CLI commands

use super::context::UiContext;
use console::style;

/// Kind of status line
#[derive(Debug, Clone, Copy)]
enum Tone {
    Ok,
    Warn,
    Info,
}

impl Tone {
    fn tag(self) -> String {
        match self {
            Self::Ok => style("[OK]").green().to_string(),
            Self::Warn => style("[WARN]").yellow().to_string(),
            Self::Info => style("[INFO]").cyan().to_string(),
        }
    }
}

fn status(ctx: &UiContext, tone: Tone, message: &str) {
    if !ctx.use_fancy_output() {
        println!("  {} {}", tone.tag(), message);
        return;
    }
    let _ = match tone {
        Tone::Ok => cliclack::log::success(message),
        Tone::Warn => cliclack::log::warning(message),
        Tone::Info => cliclack::log::info(message),
    };
}

/// Heading above a listing
pub fn intro(ctx: &UiContext, title: &str) {
    if ctx.use_fancy_output() {
        let _ = cliclack::intro(style(title).cyan().bold());
    } else {
        println!("{}\n", style(title).cyan().bold());
    }
}

/// Success line naming the affected file or value
pub fn step_ok_detail(ctx: &UiContext, message: &str, detail: &str) {
    let detail = if ctx.use_fancy_output() {
        style(detail).dim().to_string()
    } else {
        detail.to_string()
    };
    status(ctx, Tone::Ok, &format!("{message} ({detail})"));
}

/// Warning line followed by what to do about it
pub fn step_warn_hint(ctx: &UiContext, message: &str, hint: &str) {
    status(ctx, Tone::Warn, &format!("{message} - {hint}"));
}

pub fn step_info(ctx: &UiContext, message: &str) {
    status(ctx, Tone::Info, message);
}

pub fn key_value(ctx: &UiContext, key: &str, value: &str) {
    let key = if ctx.use_fancy_output() {
        style(key).dim().to_string()
    } else {
        key.to_string()
    };
    println!("  {key}: {value}");
}
