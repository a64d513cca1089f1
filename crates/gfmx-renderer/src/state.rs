//! Render state for elements that span several events.

use std::collections::HashMap;

use pulldown_cmark::Alignment;

/// Escape text for use in HTML content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Fenced or indented code block being collected.
#[derive(Default)]
pub(crate) struct CodeBlockState {
    active: bool,
    lang: Option<String>,
    content: String,
}

impl CodeBlockState {
    pub(crate) fn start(&mut self, lang: Option<String>) {
        self.active = true;
        self.lang = lang;
        self.content.clear();
    }

    pub(crate) fn is_active(&self) -> bool {
        self.active
    }

    pub(crate) fn push_str(&mut self, text: &str) {
        self.content.push_str(text);
    }

    /// Finish the block, returning its language and raw content.
    pub(crate) fn end(&mut self) -> (Option<String>, String) {
        self.active = false;
        (self.lang.take(), std::mem::take(&mut self.content))
    }
}

/// Alt text collection for images.
///
/// Images may nest (an image inside the alt text of another), so the depth is
/// tracked and only the outermost image produces markup.
#[derive(Default)]
pub(crate) struct ImageState {
    depth: usize,
    alt: String,
}

impl ImageState {
    /// Enter an image. Returns `true` for the outermost one.
    pub(crate) fn start(&mut self) -> bool {
        self.depth += 1;
        if self.depth == 1 {
            self.alt.clear();
        }
        self.depth == 1
    }

    pub(crate) fn is_active(&self) -> bool {
        self.depth > 0
    }

    pub(crate) fn push_str(&mut self, text: &str) {
        self.alt.push_str(text);
    }

    /// Leave an image. Returns the alt text when leaving the outermost one.
    pub(crate) fn end(&mut self) -> Option<String> {
        self.depth = self.depth.saturating_sub(1);
        (self.depth == 0).then(|| std::mem::take(&mut self.alt))
    }
}

/// Table being rendered.
#[derive(Default)]
pub(crate) struct TableState {
    alignments: Vec<Alignment>,
    in_head: bool,
    body_open: bool,
    cell: usize,
}

impl TableState {
    pub(crate) fn start(&mut self, alignments: Vec<Alignment>) {
        self.alignments = alignments;
        self.in_head = false;
        self.body_open = false;
        self.cell = 0;
    }

    pub(crate) fn start_head(&mut self) {
        self.in_head = true;
        self.cell = 0;
    }

    pub(crate) fn end_head(&mut self) {
        self.in_head = false;
    }

    pub(crate) fn is_in_head(&self) -> bool {
        self.in_head
    }

    /// Start a body row. Returns `true` for the first one, which opens `<tbody>`.
    pub(crate) fn start_row(&mut self) -> bool {
        self.cell = 0;
        !std::mem::replace(&mut self.body_open, true)
    }

    pub(crate) fn has_body(&self) -> bool {
        self.body_open
    }

    pub(crate) fn next_cell(&mut self) {
        self.cell += 1;
    }

    /// `align` attribute for the current cell, with a leading space.
    pub(crate) fn current_alignment_attr(&self) -> &'static str {
        match self.alignments.get(self.cell) {
            Some(Alignment::Left) => r#" align="left""#,
            Some(Alignment::Center) => r#" align="center""#,
            Some(Alignment::Right) => r#" align="right""#,
            Some(Alignment::None) | None => "",
        }
    }
}

/// Footnote numbering by first appearance of a label.
#[derive(Default)]
pub(crate) struct FootnoteState {
    numbers: HashMap<String, usize>,
}

impl FootnoteState {
    pub(crate) fn number(&mut self, label: &str) -> usize {
        let next = self.numbers.len() + 1;
        *self.numbers.entry(label.to_owned()).or_insert(next)
    }
}
