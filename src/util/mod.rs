#![allow(clippy::module_name_repetitions)]
//! Small utilities: shell escaping for command previews, argv tokenization, session ids.

pub mod exec;
pub mod id;

/// Render an argv as a single shell-safe line (used for dry-run previews).
pub fn shell_join(args: &[String]) -> String {
    args.iter()
        .map(|a| shell_escape(a))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn shell_escape(s: &str) -> String {
    if s.is_empty() {
        return "''".to_string();
    }
    let plain = s
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "-_=./:@,+".contains(c));
    if plain {
        s.to_string()
    } else {
        format!("'{}'", s.replace('\'', "'\"'\"'"))
    }
}

/// Split a command string into argv tokens. Single and double quotes group
/// words; there is no escape handling.
pub fn split_command_line(s: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut pending = false;

    for ch in s.chars() {
        match (quote, ch) {
            (None, '\'' | '"') => {
                quote = Some(ch);
                pending = true;
            }
            (Some(q), c) if c == q => quote = None,
            (None, c) if c.is_whitespace() => {
                if pending {
                    out.push(std::mem::take(&mut current));
                    pending = false;
                }
            }
            (_, c) => {
                current.push(c);
                pending = true;
            }
        }
    }
    if pending {
        out.push(current);
    }
    out
}
