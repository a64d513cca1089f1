//! List tightness from source positions.
//!
//! A list is loose when a blank line separates two of its items, or two
//! direct children of one of its items. The parser's events only show this
//! through paragraphs, so items holding headings or code blocks need the
//! source ranges.

use std::ops::Range;

use pulldown_cmark::{Event, Tag};

enum Frame {
    List {
        ordinal: usize,
        previous_item_end: Option<usize>,
    },
    Item {
        list: usize,
        start: usize,
        last_child_end: Option<usize>,
    },
    Other,
}

/// Observes `(event, range)` pairs from an offset iterator and records the
/// tightness of each list, in the order the lists start.
pub(crate) struct ListTightness<'a> {
    source: &'a str,
    stack: Vec<Frame>,
    tight: Vec<bool>,
}

impl<'a> ListTightness<'a> {
    pub(crate) fn new(source: &'a str) -> Self {
        Self {
            source,
            stack: Vec::new(),
            tight: Vec::new(),
        }
    }

    pub(crate) fn observe(&mut self, event: &Event<'_>, range: Range<usize>) {
        if !matches!(event, Event::End(_))
            && let Some(Frame::Item {
                list,
                last_child_end,
                ..
            }) = self.stack.last_mut()
        {
            let separated = last_child_end
                .is_some_and(|end| blank_line_between(self.source, end, range.start));
            if separated || matches!(event, Event::Start(Tag::Paragraph)) {
                self.tight[*list] = false;
            }
            *last_child_end = Some(range.end);
        }

        match event {
            Event::Start(Tag::List(_)) => {
                let ordinal = self.tight.len();
                self.tight.push(true);
                self.stack.push(Frame::List {
                    ordinal,
                    previous_item_end: None,
                });
            }
            Event::Start(Tag::Item) => {
                let list = match self.stack.last() {
                    Some(&Frame::List {
                        ordinal,
                        previous_item_end,
                    }) => {
                        if previous_item_end
                            .is_some_and(|end| blank_line_between(self.source, end, range.start))
                        {
                            self.tight[ordinal] = false;
                        }
                        ordinal
                    }
                    // Items always sit in a list; keep the stack balanced anyway.
                    _ => {
                        self.stack.push(Frame::Other);
                        return;
                    }
                };
                self.stack.push(Frame::Item {
                    list,
                    start: range.start,
                    last_child_end: None,
                });
            }
            Event::Start(_) => self.stack.push(Frame::Other),
            Event::End(_) => {
                if let Some(Frame::Item {
                    start,
                    last_child_end,
                    ..
                }) = self.stack.pop()
                    && let Some(Frame::List {
                        previous_item_end, ..
                    }) = self.stack.last_mut()
                {
                    *previous_item_end = Some(last_child_end.unwrap_or(start));
                }
            }
            _ => {}
        }
    }

    /// Tightness of every list seen, in document order.
    pub(crate) fn finish(self) -> Vec<bool> {
        self.tight
    }
}

/// Whether a blank line lies strictly between the line where content ending
/// at `end` finishes and the line holding `start`. Lines made only of
/// whitespace and block quote markers count as blank.
fn blank_line_between(source: &str, end: usize, start: usize) -> bool {
    let bytes = source.as_bytes();
    let Some(last) = end.checked_sub(1) else {
        return false;
    };
    let Some(newline) = bytes
        .get(last..)
        .and_then(|rest| rest.iter().position(|&b| b == b'\n'))
    else {
        return false;
    };
    let from = last + newline + 1;
    let to = bytes
        .get(..start)
        .and_then(|head| head.iter().rposition(|&b| b == b'\n'))
        .map_or(0, |newline| newline + 1);

    from < to
        && source[from..to]
            .lines()
            .any(|line| line.trim_matches(|c: char| c.is_whitespace() || c == '>').is_empty())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use pulldown_cmark::{Options, Parser};

    use super::*;

    fn tightness(markdown: &str) -> Vec<bool> {
        let mut scan = ListTightness::new(markdown);
        for (event, range) in Parser::new_ext(markdown, Options::empty()).into_offset_iter() {
            scan.observe(&event, range);
        }
        scan.finish()
    }

    #[test]
    fn test_tight_list() {
        assert_eq!(tightness("- a\n- b\n"), [true]);
    }

    #[test]
    fn test_blank_line_between_items() {
        assert_eq!(tightness("- a\n\n- b\n"), [false]);
    }

    #[test]
    fn test_heading_items_separated_by_blank_line() {
        assert_eq!(tightness("- # a\n\n- # b\n"), [false]);
        assert_eq!(tightness("- # a\n- # b\n"), [true]);
    }

    #[test]
    fn test_code_items_separated_by_blank_line() {
        assert_eq!(
            tightness("- ```\n  a\n  ```\n\n- ```\n  b\n  ```\n"),
            [false]
        );
    }

    #[test]
    fn test_blank_line_between_children_of_item() {
        assert_eq!(tightness("- a\n- b\n\n  c\n"), [false]);
    }

    #[test]
    fn test_trailing_blank_line_keeps_list_tight() {
        assert_eq!(tightness("- a\n- b\n\n\nafter\n"), [true]);
    }

    #[test]
    fn test_blank_line_inside_code_block_keeps_list_tight() {
        assert_eq!(tightness("- ```\n  a\n\n  b\n  ```\n- c\n"), [true]);
    }

    #[test]
    fn test_nested_lists_in_order() {
        assert_eq!(tightness("- a\n\n  - b\n  - c\n\n- d\n"), [false, true]);
    }

    #[test]
    fn test_list_in_block_quote() {
        assert_eq!(tightness("> - a\n>\n> - b\n"), [false]);
        assert_eq!(tightness("> - a\n> - b\n"), [true]);
    }

    #[test]
    fn test_blank_line_between() {
        let source = "a\n\nb\n";
        assert!(blank_line_between(source, 1, 3));
        assert!(!blank_line_between(source, 1, 2));
        assert!(!blank_line_between(source, 0, 3));
    }
}
