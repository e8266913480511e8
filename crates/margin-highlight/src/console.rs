//! Line classifier for terminal transcripts.
//!
//! Every line is classified on its own: `$ cmd` is a command, `> cmd` is a
//! continued command (the shell's secondary prompt), `#...` is a comment and
//! anything else is program output.

use crate::escape::push_escaped;

/// Render a console transcript, one HTML string per line.
pub fn console_lines(source: &str) -> Vec<String> {
    source.split('\n').map(classify_line).collect()
}

fn classify_line(line: &str) -> String {
    let mut out = String::new();
    if let Some(command) = line.strip_prefix("$ ") {
        push_prompt(&mut out, "$", command);
    } else if let Some(command) = line.strip_prefix("> ") {
        push_prompt(&mut out, "&gt;", command);
    } else if line.starts_with('#') {
        out.push_str(r#"<span class="hl-comment">"#);
        push_escaped(&mut out, line);
        out.push_str("</span>");
    } else {
        push_escaped(&mut out, line);
    }
    out
}

fn push_prompt(out: &mut String, prompt: &str, command: &str) {
    out.push_str(r#"<span class="hl-prompt">"#);
    out.push_str(prompt);
    out.push_str(r#"</span> <span class="hl-command">"#);
    push_escaped(out, command);
    out.push_str("</span>");
}
