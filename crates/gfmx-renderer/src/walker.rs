//! Callback-driven document traversal.
//!
//! [`Walker`] replays a [`Document`] as nested containers and leaves,
//! calling a [`DocumentHandler`] for each. Lists carry their tightness,
//! tasklist items their completion state and footnote definitions a
//! sequential index, none of which are visible in a flat event stream.
//! With a [`PluginRegistry`], paragraphs holding only a `[name](params)` link
//! are reported as [`Leaf::Plugin`].

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use gfmx_extension::{Plugin, PluginRegistry};
use pulldown_cmark::{Alignment, Event, Tag, TagEnd};
use regex::Regex;

use crate::document::Document;
use crate::util::{heading_level_to_num, info_string};

/// Block link the parser left as text, e.g. because of spaces in the
/// destination.
static BLOCK_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[(\w+)\]\((.+)\)$").unwrap());

/// Whether a walk should go on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Abort,
}

/// Horizontal alignment of a table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnAlignment {
    None,
    Left,
    Center,
    Right,
}

impl From<Alignment> for ColumnAlignment {
    fn from(alignment: Alignment) -> Self {
        match alignment {
            Alignment::None => Self::None,
            Alignment::Left => Self::Left,
            Alignment::Center => Self::Center,
            Alignment::Right => Self::Right,
        }
    }
}

/// A node with children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Container<'a> {
    Heading { level: u8 },
    Paragraph,
    Emphasis,
    Strong,
    Strikethrough,
    Link { destination: &'a str, title: &'a str },
    Image { destination: &'a str, title: &'a str },
    BlockQuote,
    UnorderedList { tight: bool },
    OrderedList { start: u64, tight: bool },
    ListItem,
    TaskListItem { completed: bool },
    FootnoteDefinition { index: usize, label: &'a str },
    Table { alignments: Vec<ColumnAlignment> },
    TableHeader,
    TableRow,
    TableCell,
}

/// A node without children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Leaf<'a> {
    Text(&'a str),
    ThematicBreak,
    HtmlBlock(&'a str),
    InlineHtml(&'a str),
    CodeBlock { code: &'a str, info: &'a str },
    InlineCode(&'a str),
    SoftBreak,
    LineBreak,
    FootnoteReference(&'a str),
    /// Paragraph replaced by a registered plugin.
    Plugin(&'a Plugin),
}

/// Receives the nodes of a walk.
///
/// Only [`leaf`](Self::leaf) is required. Returning [`Flow::Abort`] from any
/// node callback ends the walk, after which [`aborted`](Self::aborted) is
/// called instead of [`end_document`](Self::end_document).
pub trait DocumentHandler {
    type Error;

    fn start_document(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn end_document(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn aborted(&mut self) {}

    fn enter(&mut self, _container: &Container<'_>) -> Result<Flow, Self::Error> {
        Ok(Flow::Continue)
    }

    fn exit(&mut self, _container: &Container<'_>) -> Result<Flow, Self::Error> {
        Ok(Flow::Continue)
    }

    fn leaf(&mut self, leaf: &Leaf<'_>) -> Result<Flow, Self::Error>;
}

/// Walk error.
#[derive(Debug, thiserror::Error)]
pub enum WalkError<E> {
    /// A handler callback failed.
    #[error("Document handler failed: {0}")]
    Handler(E),
}

/// Document walker.
#[derive(Debug, Clone)]
pub struct Walker<'p> {
    starting_footnote_index: usize,
    plugins: Option<&'p PluginRegistry>,
}

impl Default for Walker<'_> {
    fn default() -> Self {
        Self::new()
    }
}

/// Facts about the document gathered before walking.
#[derive(Default)]
struct Layout {
    /// Event indices of loose lists.
    loose_lists: HashSet<usize>,
    /// Event index of each tasklist item, with its completion state.
    task_items: HashMap<usize, bool>,
}

impl Layout {
    fn scan(document: &Document) -> Self {
        let mut layout = Self::default();
        let mut tight_lists = document.tight_lists().iter();
        // (event index, is list, is item)
        let mut open: Vec<(usize, bool, bool)> = Vec::new();

        for (index, event) in document.events().iter().enumerate() {
            match event {
                Event::Start(tag) => {
                    if matches!(tag, Tag::List(_)) && tight_lists.next() == Some(&false) {
                        layout.loose_lists.insert(index);
                    }
                    open.push((index, matches!(tag, Tag::List(_)), matches!(tag, Tag::Item)));
                }
                Event::End(_) => {
                    open.pop();
                }
                Event::TaskListMarker(checked) => {
                    let item = match open.as_slice() {
                        [.., (item, false, true)] | [.., (item, false, true), _] => Some(*item),
                        _ => None,
                    };
                    if let Some(item) = item {
                        layout.task_items.insert(item, *checked);
                    }
                }
                _ => {}
            }
        }
        layout
    }

    fn is_tight(&self, list: usize) -> bool {
        !self.loose_lists.contains(&list)
    }
}

/// Block being collected from several events.
enum Collecting<'a> {
    Code { info: &'a str, code: String },
    Html(String),
}

impl<'p> Walker<'p> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            starting_footnote_index: 1,
            plugins: None,
        }
    }

    /// Report plugin blocks recognized by `plugins`.
    #[must_use]
    pub fn with_plugins(mut self, plugins: &'p PluginRegistry) -> Self {
        self.plugins = Some(plugins);
        self
    }

    /// Number footnote definitions starting at `index` instead of 1.
    #[must_use]
    pub fn with_starting_footnote_index(mut self, index: usize) -> Self {
        self.starting_footnote_index = index;
        self
    }

    /// Walk `document`, calling `handler` for each node in document order.
    ///
    /// Returns [`Flow::Abort`] when the handler stopped the walk early.
    ///
    /// # Errors
    ///
    /// Returns [`WalkError::Handler`] with the first error a callback returns.
    pub fn walk<H: DocumentHandler>(
        &self,
        document: &Document,
        handler: &mut H,
    ) -> Result<Flow, WalkError<H::Error>> {
        let events = document.events();
        let layout = Layout::scan(document);
        let mut next_footnote = self.starting_footnote_index;
        let mut stack: Vec<Option<Container<'_>>> = Vec::new();
        let mut collecting: Option<Collecting<'_>> = None;
        let mut resume_at = 0;

        handler.start_document().map_err(WalkError::Handler)?;

        for (index, event) in events.iter().enumerate() {
            if index < resume_at {
                continue;
            }
            let plugin = match (self.plugins, event) {
                (Some(plugins), Event::Start(Tag::Paragraph)) => {
                    plugin_block(plugins, &events[index + 1..])
                }
                _ => None,
            };

            let flow = if let Some((plugin, consumed)) = &plugin {
                resume_at = index + 1 + consumed;
                handler.leaf(&Leaf::Plugin(plugin))
            } else {
                match event {
                    Event::Start(tag) => {
                        let container = match tag {
                            Tag::CodeBlock(kind) => {
                                collecting = Some(Collecting::Code {
                                    info: info_string(kind),
                                    code: String::new(),
                                });
                                None
                            }
                            Tag::HtmlBlock => {
                                collecting = Some(Collecting::Html(String::new()));
                                None
                            }
                            Tag::FootnoteDefinition(label) => {
                                let number = next_footnote;
                                next_footnote += 1;
                                Some(Container::FootnoteDefinition {
                                    index: number,
                                    label: label.as_ref(),
                                })
                            }
                            tag => container_for(tag, index, &layout),
                        };
                        let flow = match &container {
                            Some(container) => handler.enter(container),
                            None => Ok(Flow::Continue),
                        };
                        stack.push(container);
                        flow
                    }
                    Event::End(TagEnd::CodeBlock | TagEnd::HtmlBlock) => {
                        stack.pop();
                        match collecting.take() {
                            Some(Collecting::Code { info, code }) => {
                                handler.leaf(&Leaf::CodeBlock { code: &code, info })
                            }
                            Some(Collecting::Html(html)) => handler.leaf(&Leaf::HtmlBlock(&html)),
                            None => Ok(Flow::Continue),
                        }
                    }
                    Event::End(_) => match stack.pop().flatten() {
                        Some(container) => handler.exit(&container),
                        None => Ok(Flow::Continue),
                    },
                    Event::Text(text) | Event::Html(text) => match &mut collecting {
                        Some(Collecting::Code { code: buffer, .. } | Collecting::Html(buffer)) => {
                            buffer.push_str(text);
                            Ok(Flow::Continue)
                        }
                        None if matches!(event, Event::Html(_)) => {
                            handler.leaf(&Leaf::HtmlBlock(text))
                        }
                        None => handler.leaf(&Leaf::Text(text)),
                    },
                    Event::InlineMath(text) | Event::DisplayMath(text) => {
                        handler.leaf(&Leaf::Text(text))
                    }
                    Event::Code(code) => handler.leaf(&Leaf::InlineCode(code)),
                    Event::InlineHtml(html) => handler.leaf(&Leaf::InlineHtml(html)),
                    Event::FootnoteReference(label) => handler.leaf(&Leaf::FootnoteReference(label)),
                    Event::SoftBreak => handler.leaf(&Leaf::SoftBreak),
                    Event::HardBreak => handler.leaf(&Leaf::LineBreak),
                    Event::Rule => handler.leaf(&Leaf::ThematicBreak),
                    // Reported through `Container::TaskListItem`.
                    Event::TaskListMarker(_) => Ok(Flow::Continue),
                }
            }
            .map_err(WalkError::Handler)?;

            if flow == Flow::Abort {
                tracing::debug!(event = index, "Document walk aborted");
                handler.aborted();
                return Ok(Flow::Abort);
            }
        }

        handler.end_document().map_err(WalkError::Handler)?;
        Ok(Flow::Continue)
    }
}

/// Plugin for a paragraph whose remaining events are `rest`, with the number
/// of events it covers up to and including the paragraph end.
fn plugin_block(plugins: &PluginRegistry, rest: &[Event<'_>]) -> Option<(Plugin, usize)> {
    let (name, contents, consumed): (&str, &str, usize) = match rest {
        [
            Event::Start(Tag::Link { dest_url, .. }),
            Event::Text(name),
            Event::End(TagEnd::Link),
            Event::End(TagEnd::Paragraph),
            ..,
        ] => (name.as_ref(), dest_url.as_ref(), 4),
        [Event::Text(text), Event::End(TagEnd::Paragraph), ..]
            if text.matches("](").count() == 1 =>
        {
            let captures = BLOCK_LINK_RE.captures(text)?;
            (captures.get(1)?.as_str(), captures.get(2)?.as_str(), 2)
        }
        _ => return None,
    };
    let plugin = plugins.parse_block_link(name, contents)?;
    tracing::debug!(name, "Paragraph is a plugin block");
    Some((plugin, consumed))
}

/// Container for a start tag, `None` for tags the walker does not report.
fn container_for<'a>(tag: &'a Tag<'a>, index: usize, layout: &Layout) -> Option<Container<'a>> {
    let container = match tag {
        Tag::Heading { level, .. } => Container::Heading {
            level: heading_level_to_num(*level),
        },
        Tag::Paragraph => Container::Paragraph,
        Tag::Emphasis => Container::Emphasis,
        Tag::Strong => Container::Strong,
        Tag::Strikethrough => Container::Strikethrough,
        Tag::Link {
            dest_url, title, ..
        } => Container::Link {
            destination: dest_url.as_ref(),
            title: title.as_ref(),
        },
        Tag::Image {
            dest_url, title, ..
        } => Container::Image {
            destination: dest_url.as_ref(),
            title: title.as_ref(),
        },
        Tag::BlockQuote(_) => Container::BlockQuote,
        Tag::List(None) => Container::UnorderedList {
            tight: layout.is_tight(index),
        },
        Tag::List(Some(start)) => Container::OrderedList {
            start: *start,
            tight: layout.is_tight(index),
        },
        Tag::Item => match layout.task_items.get(&index) {
            Some(&completed) => Container::TaskListItem { completed },
            None => Container::ListItem,
        },
        Tag::Table(alignments) => Container::Table {
            alignments: alignments.iter().copied().map(ColumnAlignment::from).collect(),
        },
        Tag::TableHead => Container::TableHeader,
        Tag::TableRow => Container::TableRow,
        Tag::TableCell => Container::TableCell,
        _ => return None,
    };
    Some(container)
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;

    use gfmx_extension::{ExtensionOptions, YoutubePluginParser};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::document::DocumentOptions;

    /// Records every callback as a line of text.
    #[derive(Default)]
    struct Recorder {
        lines: Vec<String>,
        abort_on_text: Option<&'static str>,
    }

    impl DocumentHandler for Recorder {
        type Error = Infallible;

        fn start_document(&mut self) -> Result<(), Infallible> {
            self.lines.push("start".to_owned());
            Ok(())
        }

        fn end_document(&mut self) -> Result<(), Infallible> {
            self.lines.push("end".to_owned());
            Ok(())
        }

        fn aborted(&mut self) {
            self.lines.push("aborted".to_owned());
        }

        fn enter(&mut self, container: &Container<'_>) -> Result<Flow, Infallible> {
            self.lines.push(format!("enter {container:?}"));
            Ok(Flow::Continue)
        }

        fn exit(&mut self, container: &Container<'_>) -> Result<Flow, Infallible> {
            self.lines.push(format!("exit {container:?}"));
            Ok(Flow::Continue)
        }

        fn leaf(&mut self, leaf: &Leaf<'_>) -> Result<Flow, Infallible> {
            match leaf {
                Leaf::Plugin(plugin) => self
                    .lines
                    .push(format!("leaf Plugin({} {:?})", plugin.name(), plugin.params())),
                leaf => self.lines.push(format!("leaf {leaf:?}")),
            }
            if let Leaf::Text(text) = leaf
                && self.abort_on_text == Some(*text)
            {
                return Ok(Flow::Abort);
            }
            Ok(Flow::Continue)
        }
    }

    fn walk(markdown: &str, options: DocumentOptions) -> Vec<String> {
        let document = Document::parse(markdown, options, ExtensionOptions::ALL);
        let mut recorder = Recorder::default();
        let flow = Walker::new().walk(&document, &mut recorder).unwrap();
        assert_eq!(flow, Flow::Continue);
        recorder.lines
    }

    #[test]
    fn test_heading_and_paragraph() {
        assert_eq!(
            walk("# Title\n\nSome *text*", DocumentOptions::DEFAULT),
            [
                "start",
                "enter Heading { level: 1 }",
                "leaf Text(\"Title\")",
                "exit Heading { level: 1 }",
                "enter Paragraph",
                "leaf Text(\"Some \")",
                "enter Emphasis",
                "leaf Text(\"text\")",
                "exit Emphasis",
                "exit Paragraph",
                "end",
            ]
        );
    }

    #[test]
    fn test_tasklist_completion() {
        let lines = walk("- [ ] open\n- [x] done\n- plain\n", DocumentOptions::DEFAULT);
        let items: Vec<_> = lines.iter().filter(|l| l.starts_with("enter")).collect();
        assert_eq!(
            items,
            [
                "enter UnorderedList { tight: true }",
                "enter TaskListItem { completed: false }",
                "enter TaskListItem { completed: true }",
                "enter ListItem",
            ]
        );
    }

    #[test]
    fn test_loose_list() {
        let lines = walk("1. a\n\n2. b\n", DocumentOptions::DEFAULT);
        assert_eq!(lines[1], "enter OrderedList { start: 1, tight: false }");
    }

    #[test]
    fn test_loose_list_without_paragraphs() {
        let headings = walk("- # a\n\n- # b\n", DocumentOptions::DEFAULT);
        assert_eq!(headings[1], "enter UnorderedList { tight: false }");
        assert_eq!(headings[3], "enter Heading { level: 1 }");

        let code = walk(
            "- ```\n  a\n  ```\n\n- ```\n  b\n  ```\n",
            DocumentOptions::DEFAULT,
        );
        assert_eq!(code[1], "enter UnorderedList { tight: false }");
        assert_eq!(code[3], "leaf CodeBlock { code: \"a\\n\", info: \"\" }");
    }

    #[test]
    fn test_tight_heading_list() {
        let lines = walk("1. # a\n2. # b\n", DocumentOptions::DEFAULT);
        assert_eq!(lines[1], "enter OrderedList { start: 1, tight: true }");
    }

    #[test]
    fn test_nested_tight_list_in_loose_list() {
        let lines = walk("- a\n\n  - b\n  - c\n\n- d\n", DocumentOptions::DEFAULT);
        let lists: Vec<_> = lines
            .iter()
            .filter(|l| l.starts_with("enter UnorderedList"))
            .collect();
        assert_eq!(
            lists,
            [
                "enter UnorderedList { tight: false }",
                "enter UnorderedList { tight: true }",
            ]
        );
    }

    #[test]
    fn test_plugin_blocks() {
        let plugins = PluginRegistry::new().with_parsers([YoutubePluginParser]);
        let document = Document::new(
            "Intro\n\n\
             [youtubevideo](source::https://youtu.be/kkdBB1hVLX0)\n\n\
             [other](https://a.org)\n\n\
             See [youtubevideo](source::https://youtu.be/x)\n",
        );
        let mut recorder = Recorder::default();
        Walker::new()
            .with_plugins(&plugins)
            .walk(&document, &mut recorder)
            .unwrap();

        assert_eq!(
            recorder.lines,
            [
                "start",
                "enter Paragraph",
                "leaf Text(\"Intro\")",
                "exit Paragraph",
                "leaf Plugin(youtubevideo {\"source\": \"https://youtu.be/kkdBB1hVLX0\"})",
                "enter Paragraph",
                "enter Link { destination: \"https://a.org\", title: \"\" }",
                "leaf Text(\"other\")",
                "exit Link { destination: \"https://a.org\", title: \"\" }",
                "exit Paragraph",
                "enter Paragraph",
                "leaf Text(\"See \")",
                "enter Link { destination: \"source::https://youtu.be/x\", title: \"\" }",
                "leaf Text(\"youtubevideo\")",
                "exit Link { destination: \"source::https://youtu.be/x\", title: \"\" }",
                "exit Paragraph",
                "end",
            ]
        );
    }

    #[test]
    fn test_plugin_block_from_unparsed_link() {
        let plugins = PluginRegistry::new().with_parsers([YoutubePluginParser]);
        let document = Document::parse(
            "[youtubevideo](source:: https://youtu.be/x | width::640)\n",
            DocumentOptions::DEFAULT,
            ExtensionOptions::empty(),
        );
        let mut recorder = Recorder::default();
        Walker::new()
            .with_plugins(&plugins)
            .walk(&document, &mut recorder)
            .unwrap();

        assert_eq!(
            recorder.lines,
            [
                "start",
                "leaf Plugin(youtubevideo {\"source\": \"https://youtu.be/x\", \"width\": \"640\"})",
                "end",
            ]
        );
    }

    #[test]
    fn test_plugin_links_without_registry() {
        let lines = walk(
            "[youtubevideo](source::https://youtu.be/x)\n",
            DocumentOptions::DEFAULT,
        );
        assert_eq!(lines[1], "enter Paragraph");
        assert!(!lines.iter().any(|l| l.starts_with("leaf Plugin")));
    }

    #[test]
    fn test_footnote_numbering() {
        let document = Document::parse(
            "A[^x] B[^y]\n\n[^x]: one\n\n[^y]: two\n",
            DocumentOptions::FOOTNOTES,
            ExtensionOptions::empty(),
        );
        let mut recorder = Recorder::default();
        Walker::new()
            .with_starting_footnote_index(5)
            .walk(&document, &mut recorder)
            .unwrap();

        let footnotes: Vec<_> = recorder
            .lines
            .iter()
            .filter(|l| l.contains("Footnote"))
            .collect();
        assert_eq!(
            footnotes,
            [
                "leaf FootnoteReference(\"x\")",
                "leaf FootnoteReference(\"y\")",
                "enter FootnoteDefinition { index: 5, label: \"x\" }",
                "exit FootnoteDefinition { index: 5, label: \"x\" }",
                "enter FootnoteDefinition { index: 6, label: \"y\" }",
                "exit FootnoteDefinition { index: 6, label: \"y\" }",
            ]
        );
    }

    #[test]
    fn test_code_block_leaf() {
        assert_eq!(
            walk("```rust title=x\nfn a() {}\nfn b() {}\n```\n", DocumentOptions::DEFAULT),
            [
                "start",
                "leaf CodeBlock { code: \"fn a() {}\\nfn b() {}\\n\", info: \"rust title=x\" }",
                "end",
            ]
        );
    }

    #[test]
    fn test_html_block_leaf() {
        assert_eq!(
            walk("<div>\nhi\n</div>\n", DocumentOptions::DEFAULT),
            ["start", "leaf HtmlBlock(\"<div>\\nhi\\n</div>\\n\")", "end"]
        );
    }

    #[test]
    fn test_table() {
        let lines = walk("| a | b |\n|:-:|---|\n| 1 | 2 |\n", DocumentOptions::DEFAULT);
        assert_eq!(
            lines[1],
            "enter Table { alignments: [Center, None] }"
        );
        assert_eq!(lines[2], "enter TableHeader");
        assert!(lines.contains(&"enter TableRow".to_owned()));
        assert_eq!(
            lines.iter().filter(|l| *l == "enter TableCell").count(),
            4
        );
    }

    #[test]
    fn test_inline_leaves() {
        let lines = walk(
            "a `b` <i>c</i>  \nd\ne",
            DocumentOptions::DEFAULT,
        );
        assert_eq!(
            lines,
            [
                "start",
                "enter Paragraph",
                "leaf Text(\"a \")",
                "leaf InlineCode(\"b\")",
                "leaf Text(\" \")",
                "leaf InlineHtml(\"<i>\")",
                "leaf Text(\"c\")",
                "leaf InlineHtml(\"</i>\")",
                "leaf LineBreak",
                "leaf Text(\"d\")",
                "leaf SoftBreak",
                "leaf Text(\"e\")",
                "exit Paragraph",
                "end",
            ]
        );
    }

    #[test]
    fn test_link_container() {
        let lines = walk("[x](https://a.org \"T\") ---\n\n---\n", DocumentOptions::DEFAULT);
        assert_eq!(
            lines[2],
            "enter Link { destination: \"https://a.org\", title: \"T\" }"
        );
        assert!(lines.contains(&"leaf ThematicBreak".to_owned()));
    }

    #[test]
    fn test_abort() {
        let document = Document::new("first\n\nstop\n\nlast\n");
        let mut recorder = Recorder {
            abort_on_text: Some("stop"),
            ..Recorder::default()
        };
        let flow = Walker::new().walk(&document, &mut recorder).unwrap();

        assert_eq!(flow, Flow::Abort);
        assert_eq!(recorder.lines.last().map(String::as_str), Some("aborted"));
        assert!(!recorder.lines.iter().any(|l| l.contains("last")));
        assert!(!recorder.lines.contains(&"end".to_owned()));
    }

    #[test]
    fn test_handler_error() {
        struct Failing;

        impl DocumentHandler for Failing {
            type Error = String;

            fn enter(&mut self, container: &Container<'_>) -> Result<Flow, String> {
                match container {
                    Container::Heading { level } => Err(format!("heading {level}")),
                    _ => Ok(Flow::Continue),
                }
            }

            fn leaf(&mut self, _leaf: &Leaf<'_>) -> Result<Flow, String> {
                Ok(Flow::Continue)
            }
        }

        let document = Document::new("text\n\n## Two\n");
        let error = Walker::new().walk(&document, &mut Failing).unwrap_err();
        assert!(matches!(&error, WalkError::Handler(message) if message == "heading 2"));
        assert_eq!(error.to_string(), "Document handler failed: heading 2");
    }

    #[test]
    fn test_enter_exit_balanced() {
        let lines = walk(
            "> - [x] a\n>\n> | t |\n> |---|\n> | v |\n\n![i *e*](p.png)\n",
            DocumentOptions::DEFAULT,
        );
        let enters = lines.iter().filter(|l| l.starts_with("enter")).count();
        let exits = lines.iter().filter(|l| l.starts_with("exit")).count();
        assert_eq!(enters, exits);
    }
}
