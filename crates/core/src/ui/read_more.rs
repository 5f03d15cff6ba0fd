//! Expand/collapse for long bios and descriptions.

use std::borrow::Cow;

const ELLIPSIS: &str = "…";

#[derive(Debug, Clone)]
pub struct ReadMore {
    text: String,
    limit: usize,
    expanded: bool,
}

impl ReadMore {
    /// `limit` is measured in characters, not bytes.
    pub fn new(text: impl Into<String>, limit: usize) -> Self {
        Self { text: text.into(), limit, expanded: false }
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    /// Whether the text is long enough to need a toggle at all.
    pub fn needs_toggle(&self) -> bool {
        self.text.chars().count() > self.limit
    }

    /// Flip between expanded and collapsed; returns the new expanded state.
    pub fn toggle(&mut self) -> bool {
        if self.needs_toggle() {
            self.expanded = !self.expanded;
        }
        self.expanded
    }

    pub fn label(&self) -> &'static str {
        if self.expanded { "Show less" } else { "Read more" }
    }

    /// Text to render in the current state.
    ///
    /// Collapsed text is cut at the last word boundary within `limit`
    /// characters, falling back to a hard cut for a single long word.
    pub fn visible_text(&self) -> Cow<'_, str> {
        if self.expanded || !self.needs_toggle() {
            return Cow::Borrowed(&self.text);
        }

        let cut = self
            .text
            .char_indices()
            .nth(self.limit)
            .map(|(idx, _)| idx)
            .unwrap_or(self.text.len());
        let head = &self.text[..cut];
        let head = match head.rfind(char::is_whitespace) {
            Some(space) if space > 0 => &head[..space],
            _ => head,
        };

        Cow::Owned(format!("{}{ELLIPSIS}", head.trim_end()))
    }
}
