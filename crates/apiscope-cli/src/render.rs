//! Terminal colouring

use owo_colors::OwoColorize;

use apiscope_core::{ResponseResult, StyleTag, Token, classify};

/// Colour `code` token by token. Whitespace passes through untouched.
pub fn highlight(code: &str) -> String {
    classify(code).iter().map(paint).collect()
}

fn paint(token: &Token<'_>) -> String {
    if token.text.trim().is_empty() {
        return token.text.to_string();
    }
    let [_, r, g, b] = token.tag.rgb().to_be_bytes();
    let coloured = token.text.truecolor(r, g, b);
    match token.tag {
        StyleTag::Keyword => coloured.bold().to_string(),
        StyleTag::Comment => coloured.italic().to_string(),
        _ => coloured.to_string(),
    }
}

/// Result rendering with the status line in green or red.
pub fn response(result: &ResponseResult) -> String {
    let text = result.to_terminal();
    let (head, rest) = text.split_once('\n').unwrap_or((text.as_str(), ""));
    let head = if result.is_healthy {
        head.green().bold().to_string()
    } else {
        head.red().bold().to_string()
    };
    if rest.is_empty() {
        head
    } else {
        format!("{head}\n{rest}")
    }
}
