//! Extended autolink pass.
//!
//! Turns bare URLs (`https://…`, `http://…`, `www.…`) and e-mail addresses
//! found in text into link events. Text inside links, images and code blocks
//! is left alone.

use std::collections::VecDeque;
use std::sync::LazyLock;

use pulldown_cmark::{CowStr, Event, LinkType, Tag, TagEnd};
use regex::Regex;

static CANDIDATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:https?://|www\.)[^\s<]*|[a-z0-9.+_-]+@[a-z0-9_-]+(?:\.[a-z0-9_-]+)+",
    )
    .unwrap()
});

/// A link found in text.
#[derive(Debug, PartialEq, Eq)]
struct Autolink<'a> {
    start: usize,
    end: usize,
    text: &'a str,
    dest: String,
    email: bool,
}

/// Iterator adapter inserting autolinks into an event stream.
pub(crate) struct Autolinks<I> {
    inner: I,
    pending: VecDeque<Event<'static>>,
    suppressed: usize,
    /// Last character of the preceding inline event, `None` at a block start.
    previous: Option<char>,
}

impl<I> Autolinks<I> {
    pub(crate) fn new(inner: I) -> Self {
        Self {
            inner,
            pending: VecDeque::new(),
            suppressed: 0,
            previous: None,
        }
    }
}

impl<I> Iterator for Autolinks<I>
where
    I: Iterator<Item = Event<'static>>,
{
    type Item = Event<'static>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(event) = self.pending.pop_front() {
            return Some(event);
        }

        let event = self.inner.next()?;
        let preceding = self.previous;
        self.previous = trailing_char(&event);
        match &event {
            Event::Start(Tag::Link { .. } | Tag::Image { .. } | Tag::CodeBlock(_)) => {
                self.suppressed += 1;
            }
            Event::End(TagEnd::Link | TagEnd::Image | TagEnd::CodeBlock) => {
                self.suppressed = self.suppressed.saturating_sub(1);
            }
            Event::Text(text) if self.suppressed == 0 => {
                let links = find_autolinks(text, preceding);
                if !links.is_empty() {
                    self.pending.extend(link_events(text, links));
                    return self.pending.pop_front();
                }
            }
            _ => {}
        }
        Some(event)
    }
}

/// Last character an inline event puts in the source, as seen by the word
/// boundary check. Emphasis delimiters and block boundaries give `None`.
fn trailing_char(event: &Event<'_>) -> Option<char> {
    match event {
        Event::Text(text) => text.chars().next_back(),
        Event::Code(_) => Some('`'),
        Event::InlineHtml(_) => Some('>'),
        Event::InlineMath(_) => Some('$'),
        Event::FootnoteReference(_) | Event::TaskListMarker(_) => Some(']'),
        Event::End(TagEnd::Link | TagEnd::Image) => Some(')'),
        _ => None,
    }
}

/// Split `text` into text and link events.
fn link_events(text: &str, links: Vec<Autolink<'_>>) -> Vec<Event<'static>> {
    let mut events = Vec::with_capacity(links.len() * 4 + 1);
    let mut copied = 0;

    for link in links {
        if link.start > copied {
            events.push(Event::Text(CowStr::from(text[copied..link.start].to_owned())));
        }
        let link_type = if link.email {
            LinkType::Email
        } else {
            LinkType::Autolink
        };
        events.push(Event::Start(Tag::Link {
            link_type,
            dest_url: CowStr::from(link.dest),
            title: CowStr::Borrowed(""),
            id: CowStr::Borrowed(""),
        }));
        events.push(Event::Text(CowStr::from(link.text.to_owned())));
        events.push(Event::End(TagEnd::Link));
        copied = link.end;
    }

    if copied < text.len() {
        events.push(Event::Text(CowStr::from(text[copied..].to_owned())));
    }
    events
}

/// Find every autolink in a run of text, in order. `preceding` is the
/// character just before `text` in its paragraph.
fn find_autolinks(text: &str, preceding: Option<char>) -> Vec<Autolink<'_>> {
    CANDIDATE_RE
        .find_iter(text)
        .filter_map(|m| {
            let candidate = m.as_str();
            if candidate.contains('@') && !candidate.contains('/') && !starts_url(candidate) {
                email_link(m.start(), candidate)
            } else {
                url_link(text, m.start(), candidate, preceding)
            }
        })
        .collect()
}

fn starts_url(candidate: &str) -> bool {
    let lower = candidate.get(..8).unwrap_or(candidate).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with("www.")
}

fn url_link<'a>(
    text: &'a str,
    start: usize,
    candidate: &'a str,
    preceding: Option<char>,
) -> Option<Autolink<'a>> {
    // `www.` and schemes only count at a word boundary.
    let preceding = text[..start].chars().next_back().or(preceding);
    if preceding.is_some_and(|c| !(c.is_whitespace() || matches!(c, '*' | '_' | '~' | '('))) {
        return None;
    }

    let trimmed = trim_trailing(candidate);
    let lower = trimmed.to_ascii_lowercase();
    let (rest, dest, require_period) = if lower.starts_with("https://") {
        (&trimmed[8..], trimmed.to_owned(), false)
    } else if lower.starts_with("http://") {
        (&trimmed[7..], trimmed.to_owned(), false)
    } else if lower.starts_with("www.") {
        (trimmed, format!("http://{trimmed}"), true)
    } else {
        return None;
    };

    // The domain ends at the first character that cannot appear in one; the
    // rest of the candidate stays part of the link.
    let domain_end = rest
        .find(|c: char| !(c.is_alphanumeric() || matches!(c, '-' | '_' | '.')))
        .unwrap_or(rest.len());
    if !is_valid_domain(&rest[..domain_end], require_period) {
        return None;
    }

    Some(Autolink {
        start,
        end: start + trimmed.len(),
        text: trimmed,
        dest,
        email: false,
    })
}

fn email_link(start: usize, candidate: &str) -> Option<Autolink<'_>> {
    if candidate.ends_with(['-', '_']) {
        return None;
    }
    let (local, _) = candidate.split_once('@')?;
    if local.is_empty() {
        return None;
    }
    Some(Autolink {
        start,
        end: start + candidate.len(),
        text: candidate,
        dest: format!("mailto:{candidate}"),
        email: true,
    })
}

/// Drop trailing punctuation, unbalanced closing parentheses and trailing
/// entity references from a URL candidate.
fn trim_trailing(candidate: &str) -> &str {
    let mut end = candidate.len();
    loop {
        let current = &candidate[..end];
        let Some(last) = current.chars().next_back() else {
            break;
        };
        match last {
            '?' | '!' | '.' | ',' | ':' | '*' | '_' | '~' | '\'' | '"' => end -= 1,
            ')' => {
                let open = current.matches('(').count();
                let close = current.matches(')').count();
                if close > open {
                    end -= 1;
                } else {
                    break;
                }
            }
            ';' => match current.rfind('&') {
                Some(amp)
                    if amp + 1 < end - 1
                        && current[amp + 1..end - 1]
                            .chars()
                            .all(|c| c.is_ascii_alphanumeric()) =>
                {
                    end = amp;
                }
                _ => break,
            },
            _ => break,
        }
    }
    &candidate[..end]
}

/// Non-empty domain segments separated by periods, with no underscore in the
/// last two segments. `www.` links also need at least one period.
fn is_valid_domain(domain: &str, require_period: bool) -> bool {
    let segments: Vec<&str> = domain.split('.').collect();
    if (require_period && segments.len() < 2) || segments.iter().any(|s| s.is_empty()) {
        return false;
    }
    segments.iter().rev().take(2).all(|s| !s.contains('_'))
}
