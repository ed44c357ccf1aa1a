use std::ffi::OsStr;
use std::io::{BufRead, Write};

/// Print a standardized warning line to stderr (color-aware).
pub fn warn_print(msg: &str) {
    let use_err = crate::color_enabled_stderr();
    eprintln!(
        "{}",
        crate::paint(use_err, "\x1b[33;1m", &format!("warning: {msg}"))
    );
}

/// True when stdin and stderr are terminals and prompting is not disabled via
/// `AUTOBOUNDS_NO_PROMPT=1` or a non-empty `CI`.
pub fn prompts_enabled() -> bool {
    let no_prompt = std::env::var("AUTOBOUNDS_NO_PROMPT").ok();
    let ci = std::env::var_os("CI");
    !prompts_disabled_by(no_prompt.as_deref(), ci.as_deref())
        && atty::is(atty::Stream::Stdin)
        && atty::is(atty::Stream::Stderr)
}

fn prompts_disabled_by(no_prompt: Option<&str>, ci: Option<&OsStr>) -> bool {
    no_prompt == Some("1") || ci.is_some_and(|v| !v.is_empty())
}

fn read_answer() -> Option<String> {
    let _ = std::io::stderr().flush();
    let mut line = String::new();
    match std::io::stdin().lock().read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(line.trim().to_string()),
    }
}

/// Print warning lines and, when interactive, ask whether to continue.
/// Returns true to continue, false to abort.
pub fn warn_prompt_continue_or_quit(lines: &[&str]) -> bool {
    for l in lines {
        warn_print(l);
    }
    if !prompts_enabled() {
        return true;
    }
    let use_err = crate::color_enabled_stderr();
    eprint!(
        "{}",
        crate::paint(use_err, "\x1b[90m", "Press Enter to continue, or 'q' to abort: ")
    );
    let answer = read_answer().unwrap_or_default();
    eprintln!();
    !answer.eq_ignore_ascii_case("q")
}

/// Show `message` with numbered choices and read a selection.
/// Returns the zero-based index, or None when dismissed (Enter, EOF, or an
/// unrecognized answer). Callers check `prompts_enabled` first.
pub fn prompt_choice(message: &str, choices: &[&str]) -> Option<usize> {
    let use_err = crate::color_enabled_stderr();
    eprintln!("{}", crate::paint(use_err, "\x1b[33;1m", message));
    for (i, c) in choices.iter().enumerate() {
        eprintln!("  [{}] {}", i + 1, c);
    }
    eprint!(
        "{}",
        crate::paint(use_err, "\x1b[90m", "Select an option (Enter to dismiss): ")
    );
    let answer = read_answer()?;
    eprintln!();
    parse_choice(&answer, choices)
}

/// Accept either the 1-based number or the (case-insensitive) label.
pub fn parse_choice(answer: &str, choices: &[&str]) -> Option<usize> {
    let answer = answer.trim();
    if answer.is_empty() {
        return None;
    }
    if let Ok(n) = answer.parse::<usize>() {
        return (1..=choices.len()).contains(&n).then(|| n - 1);
    }
    choices.iter().position(|c| c.eq_ignore_ascii_case(answer))
}
