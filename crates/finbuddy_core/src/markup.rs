//! crates/finbuddy_core/src/markup.rs
//!
//! Line-by-line interpretation of a module's body text.

/// One rendered line of a module body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Block<'a> {
    Heading { level: u8, text: &'a str },
    ListItem(&'a str),
    Break,
    Paragraph(&'a str),
}

const HEADING_PREFIXES: [(&str, u8); 3] = [("# ", 1), ("## ", 2), ("### ", 3)];

/// Splits `body` into blocks. Each line is classified on its own, in order;
/// consecutive list items are not grouped.
pub fn render_body(body: &str) -> Vec<Block<'_>> {
    body.lines().map(classify_line).collect()
}

fn classify_line(line: &str) -> Block<'_> {
    for (prefix, level) in HEADING_PREFIXES {
        if let Some(text) = line.strip_prefix(prefix) {
            return Block::Heading { level, text };
        }
    }
    if let Some(text) = line.strip_prefix("- ") {
        return Block::ListItem(text);
    }
    if line.trim().is_empty() {
        return Block::Break;
    }
    Block::Paragraph(line)
}
