#![allow(clippy::module_name_repetitions)]
//! Color handling for the launcher's stderr output channel.
//!
//! Whether color is used is decided per stream, in this order: `NO_COLOR`,
//! the `--color` flag (recorded once via [`set_color_mode`]), `AUTOBOUNDS_COLOR`,
//! and finally whether the stream is a terminal.

use clap::ValueEnum;
use once_cell::sync::OnceCell;

#[derive(Copy, Clone, PartialEq, Eq, Debug, ValueEnum)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

static CLI_COLOR: OnceCell<ColorMode> = OnceCell::new();

/// Record the `--color` choice. Only the first call has an effect.
pub fn set_color_mode(mode: ColorMode) {
    let _ = CLI_COLOR.set(mode);
}

pub fn parse_color_mode(s: &str) -> Option<ColorMode> {
    let mode = match s.trim().to_ascii_lowercase().as_str() {
        "auto" => ColorMode::Auto,
        "always" | "on" | "true" | "yes" | "1" => ColorMode::Always,
        "never" | "off" | "false" | "no" | "0" => ColorMode::Never,
        _ => return None,
    };
    Some(mode)
}

fn effective_mode() -> Option<ColorMode> {
    // https://no-color.org/
    if std::env::var_os("NO_COLOR").is_some() {
        return Some(ColorMode::Never);
    }
    CLI_COLOR.get().copied().or_else(|| {
        std::env::var("AUTOBOUNDS_COLOR")
            .ok()
            .and_then(|v| parse_color_mode(&v))
    })
}

fn use_color(stream: atty::Stream) -> bool {
    match effective_mode().unwrap_or(ColorMode::Auto) {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => atty::is(stream),
    }
}

pub fn color_enabled_stderr() -> bool {
    use_color(atty::Stream::Stderr)
}

/// Message classes on the output channel.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Tone {
    Info,
    Warn,
    Error,
}

impl Tone {
    fn ansi(self) -> &'static str {
        match self {
            Tone::Info => "\x1b[36;1m",
            Tone::Warn => "\x1b[33m",
            Tone::Error => "\x1b[31;1m",
        }
    }
}

/// Wrap `s` in `code` and a reset when `enabled`.
pub fn paint(enabled: bool, code: &str, s: &str) -> String {
    if !enabled {
        return s.to_string();
    }
    format!("{code}{s}\x1b[0m")
}

/// One colored line on stderr.
pub fn log_stderr(tone: Tone, use_color: bool, msg: &str) {
    eprintln!("{}", paint(use_color, tone.ansi(), msg));
}

pub fn log_info_stderr(use_color: bool, msg: &str) {
    log_stderr(Tone::Info, use_color, msg);
}

pub fn log_warn_stderr(use_color: bool, msg: &str) {
    log_stderr(Tone::Warn, use_color, msg);
}

pub fn log_error_stderr(use_color: bool, msg: &str) {
    log_stderr(Tone::Error, use_color, msg);
}
