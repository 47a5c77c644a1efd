//! Variable tokens and the transform pipeline feeding text widgets.
//!
//! A token has the form `NAME(|REQUEST(+ARG)*)*`: the variable name,
//! then transform requests applied left-to-right. The pipeline fails
//! softly — a request that cannot apply leaves the value as it was (or
//! yields the literal `"Err"` for the big-character requests) and logs,
//! so a bad page never takes down a tick.

use tracing::debug;

use crate::bigtext;
use crate::vars::Value;

/// The variable name part of a token (everything before the first `|`).
pub fn base_name(token: &str) -> &str {
    token.split('|').next().unwrap_or(token)
}

/// Apply every transform stage of `token` to `value`.
pub fn apply(value: &Value, token: &str) -> Value {
    let mut stages = token.split('|');
    stages.next(); // skip the variable name
    let mut current = value.clone();
    for stage in stages {
        current = apply_stage(current, value, stage, token);
    }
    current
}

fn apply_stage(current: Value, original: &Value, stage: &str, token: &str) -> Value {
    let mut parts = stage.split('+');
    let request = parts.next().unwrap_or("");
    let args: Vec<&str> = parts.collect();

    match request {
        "onoff" | "truefalse" | "yesno" => match current.as_bool() {
            Some(b) => {
                let (t, f) = match request {
                    "onoff" => ("on", "off"),
                    "truefalse" => ("true", "false"),
                    _ => ("yes", "no"),
                };
                Value::Text(if b { t } else { f }.to_string())
            }
            None => {
                debug!(token, request, "boolean transform on non-boolean value");
                original.clone()
            }
        },
        "int" => Value::Int(current.cast_int()),
        "upper" | "lower" | "capitalize" | "title" => match current.as_text() {
            Some(s) => Value::Text(recase(s, request)),
            None => {
                debug!(token, request, "string transform on non-string value");
                original.clone()
            }
        },
        "bigchars" | "bigplay" => big_stage(current, request, &args, token),
        other => {
            debug!(token, request = other, "unknown transform request");
            current
        }
    }
}

fn recase(s: &str, request: &str) -> String {
    match request {
        "upper" => s.to_uppercase(),
        "lower" => s.to_lowercase(),
        "capitalize" => {
            let mut chars = s.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        }
        // title: uppercase the first letter of every word
        _ => s
            .split(' ')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" "),
    }
}

/// `bigchars+LINE[+SPACING]` / `bigplay+LINE[+SPACING]`: pick one row
/// of the big-character rendering. A missing or unparsable row index is
/// the literal `"Err"`, matching what ends up on the panel.
fn big_stage(current: Value, request: &str, args: &[&str], token: &str) -> Value {
    if args.len() > 2 {
        debug!(token, "expected at most two transform arguments");
    }
    let Some(line) = args.first().and_then(|a| a.parse::<usize>().ok()) else {
        debug!(token, request, "missing or bad row index");
        return Value::Text("Err".into());
    };

    let rows = if request == "bigchars" {
        let text = current.to_string();
        let spaced = match args.get(1).and_then(|a| a.parse::<usize>().ok()) {
            Some(n) => {
                let gap = " ".repeat(n);
                text.chars()
                    .map(String::from)
                    .collect::<Vec<_>>()
                    .join(&gap)
            }
            None => text,
        };
        bigtext::generate(&spaced)
    } else {
        bigtext::play_banner()
    };

    match rows.get(line) {
        Some(row) => Value::Text(row.clone()),
        None => {
            debug!(token, request, line, "row index out of range");
            Value::Text("Err".into())
        }
    }
}

/// Fill a positional template (`"{0} - {1}"`) with rendered parameters.
///
/// Returns `None` when the template references a parameter that was
/// not supplied or is malformed; the caller substitutes `"VarErr"`.
pub fn format_template(template: &str, params: &[String]) -> Option<String> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '{' => {
                if chars.peek() == Some(&'{') {
                    chars.next();
                    out.push('{');
                    continue;
                }
                let mut index = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(d) if d.is_ascii_digit() => index.push(d),
                        _ => return None,
                    }
                }
                let idx: usize = index.parse().ok()?;
                out.push_str(params.get(idx)?);
            }
            '}' => {
                if chars.peek() == Some(&'}') {
                    chars.next();
                    out.push('}');
                } else {
                    return None;
                }
            }
            c => out.push(c),
        }
    }
    Some(out)
}
