//! HTML renderer for parsed documents.

use std::fmt::Write;

use gfmx_extension::tagfilter::filter_html;
use gfmx_extension::{ExtensionKind, ExtensionList, ExtensionRegistry};
use pulldown_cmark::{Event, Tag, TagEnd};

use crate::document::{Document, DocumentOptions};
use crate::html;
use crate::state::{CodeBlockState, FootnoteState, ImageState, TableState, escape_html};
use crate::util::{fence_language, heading_level_to_num, info_string};

/// Result of rendering a document.
#[derive(Clone, Debug)]
pub struct RenderResult {
    /// Rendered HTML.
    pub html: String,
    /// Warnings generated while configuring or running the render pass.
    pub warnings: Vec<String>,
}

/// Renders a [`Document`] to HTML.
///
/// Output follows the reference CommonMark HTML renderer. Render-time
/// extensions are enabled with [`with_extensions`](Self::with_extensions);
/// parse-time extensions (tables, autolinks, strikethrough, tasklists) are
/// already reflected in the document's events.
///
/// # Example
///
/// ```
/// use gfmx_extension::{ExtensionOptions, core_registry, filter_extensions};
/// use gfmx_renderer::{Document, DocumentOptions, HtmlRenderer};
///
/// let document = Document::parse(
///     "Hi <script>x</script> *there*",
///     DocumentOptions::DEFAULT,
///     ExtensionOptions::empty(),
/// );
/// let list = filter_extensions().expect("tagfilter is a core extension");
/// let result = HtmlRenderer::new(DocumentOptions::DEFAULT)
///     .with_extensions(core_registry(), &list)
///     .render(&document);
///
/// assert_eq!(result.html, "<p>Hi &lt;script>x&lt;/script> <em>there</em></p>\n");
/// ```
pub struct HtmlRenderer {
    options: DocumentOptions,
    tagfilter: bool,
    warnings: Vec<String>,
    output: String,
    code: CodeBlockState,
    image: ImageState,
    table: TableState,
    footnotes: FootnoteState,
    pending_image: Option<(String, String)>,
    in_html_block: bool,
    html_block_omitted: bool,
}

impl HtmlRenderer {
    /// Create a renderer with no render-time extensions enabled.
    #[must_use]
    pub fn new(options: DocumentOptions) -> Self {
        Self {
            options,
            tagfilter: false,
            warnings: Vec::new(),
            output: String::with_capacity(4096),
            code: CodeBlockState::default(),
            image: ImageState::default(),
            table: TableState::default(),
            footnotes: FootnoteState::default(),
            pending_image: None,
            in_html_block: false,
            html_block_omitted: false,
        }
    }

    /// Enable the extensions in `list`, resolving each handle in `registry`.
    ///
    /// Handles that do not belong to `registry` are skipped with a warning.
    #[must_use]
    pub fn with_extensions(mut self, registry: &ExtensionRegistry, list: &ExtensionList) -> Self {
        for handle in list {
            let Some(extension) = registry.get(handle) else {
                tracing::warn!(?handle, "Extension handle not found in registry");
                self.warnings
                    .push(format!("Extension {handle:?} is not registered, skipping"));
                continue;
            };
            match extension.kind() {
                ExtensionKind::TagFilter => self.tagfilter = true,
                kind => {
                    tracing::debug!(
                        name = extension.name(),
                        ?kind,
                        "Extension has no render-time behavior"
                    );
                }
            }
        }
        self
    }

    /// Whether raw HTML is passed through the tag filter.
    #[must_use]
    pub fn filters_tags(&self) -> bool {
        self.tagfilter
    }

    /// Render `document` and return the result.
    pub fn render(&mut self, document: &Document) -> RenderResult {
        self.footnotes = FootnoteState::default();
        for event in document.events() {
            self.process_event(event);
        }

        RenderResult {
            html: std::mem::take(&mut self.output),
            warnings: self.warnings.clone(),
        }
    }

    /// Start a new line unless already at the start of one.
    fn cr(&mut self) {
        if !self.output.is_empty() && !self.output.ends_with('\n') {
            self.output.push('\n');
        }
    }

    /// Push inline markup, dropped while collecting image alt text.
    fn push_inline(&mut self, content: &str) {
        if !self.image.is_active() {
            self.output.push_str(content);
        }
    }

    fn process_event(&mut self, event: &Event<'_>) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(*tag),
            Event::Text(text) | Event::InlineMath(text) | Event::DisplayMath(text) => {
                self.text(text);
            }
            Event::Code(code) => self.inline_code(code),
            Event::Html(raw) | Event::InlineHtml(raw) => self.raw_html(raw),
            Event::SoftBreak => self.soft_break(),
            Event::HardBreak => self.hard_break(),
            Event::Rule => {
                self.cr();
                self.output.push_str("<hr />\n");
            }
            Event::TaskListMarker(checked) => {
                if !self.image.is_active() {
                    html::task_list_marker(*checked, &mut self.output);
                }
            }
            Event::FootnoteReference(label) => {
                let number = self.footnotes.number(label);
                if !self.image.is_active() {
                    html::footnote_reference(label, number, &mut self.output);
                }
            }
        }
    }

    #[allow(clippy::too_many_lines)]
    fn start_tag(&mut self, tag: &Tag<'_>) {
        match tag {
            Tag::Paragraph => {
                self.cr();
                self.output.push_str("<p>");
            }
            Tag::Heading { level, .. } => {
                self.cr();
                write!(self.output, "<h{}>", heading_level_to_num(*level)).unwrap();
            }
            Tag::BlockQuote(_) => {
                self.cr();
                self.output.push_str("<blockquote>\n");
            }
            Tag::CodeBlock(kind) => {
                self.cr();
                let lang = fence_language(info_string(kind)).map(str::to_owned);
                self.code.start(lang);
            }
            Tag::HtmlBlock => {
                self.cr();
                self.in_html_block = true;
                self.html_block_omitted = false;
            }
            Tag::List(start) => {
                self.cr();
                match start {
                    Some(1) => self.output.push_str("<ol>\n"),
                    Some(n) => writeln!(self.output, "<ol start=\"{n}\">").unwrap(),
                    None => self.output.push_str("<ul>\n"),
                }
            }
            Tag::Item => {
                self.cr();
                self.output.push_str("<li>");
            }
            Tag::FootnoteDefinition(label) => {
                self.cr();
                let number = self.footnotes.number(label);
                html::footnote_definition_start(label, number, &mut self.output);
            }
            Tag::DefinitionList => {
                self.cr();
                self.output.push_str("<dl>\n");
            }
            Tag::DefinitionListTitle => {
                self.cr();
                self.output.push_str("<dt>");
            }
            Tag::DefinitionListDefinition => {
                self.cr();
                self.output.push_str("<dd>");
            }
            Tag::Table(alignments) => {
                self.cr();
                self.table.start(alignments.clone());
                self.output.push_str("<table>\n");
            }
            Tag::TableHead => {
                self.table.start_head();
                self.output.push_str("<thead>\n<tr>\n");
            }
            Tag::TableRow => {
                if self.table.start_row() {
                    self.output.push_str("<tbody>\n");
                }
                self.output.push_str("<tr>\n");
            }
            Tag::TableCell => {
                let cell = if self.table.is_in_head() { "th" } else { "td" };
                let align = self.table.current_alignment_attr();
                write!(self.output, "<{cell}{align}>").unwrap();
            }
            Tag::Emphasis => self.push_inline("<em>"),
            Tag::Strong => self.push_inline("<strong>"),
            Tag::Strikethrough => self.push_inline("<del>"),
            Tag::Superscript => self.push_inline("<sup>"),
            Tag::Subscript => self.push_inline("<sub>"),
            Tag::Link {
                dest_url, title, ..
            } => {
                if !self.image.is_active() {
                    let href = self.checked_url(dest_url);
                    html::link_start(href, title, &mut self.output);
                }
            }
            Tag::Image {
                dest_url, title, ..
            } => {
                if self.image.start() {
                    self.pending_image = Some((dest_url.to_string(), title.to_string()));
                }
            }
            Tag::MetadataBlock(_) => {}
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.output.push_str("</p>\n"),
            TagEnd::Heading(level) => {
                writeln!(self.output, "</h{}>", heading_level_to_num(level)).unwrap();
            }
            TagEnd::BlockQuote(_) => {
                self.cr();
                self.output.push_str("</blockquote>\n");
            }
            TagEnd::CodeBlock => {
                let (lang, content) = self.code.end();
                html::code_block(lang.as_deref(), &content, &mut self.output);
            }
            TagEnd::HtmlBlock => {
                self.in_html_block = false;
                self.cr();
            }
            TagEnd::List(ordered) => {
                self.cr();
                self.output
                    .push_str(if ordered { "</ol>\n" } else { "</ul>\n" });
            }
            TagEnd::Item => self.output.push_str("</li>\n"),
            TagEnd::FootnoteDefinition => {
                self.cr();
                self.output.push_str("</div>\n");
            }
            TagEnd::DefinitionList => {
                self.cr();
                self.output.push_str("</dl>\n");
            }
            TagEnd::DefinitionListTitle => self.output.push_str("</dt>\n"),
            TagEnd::DefinitionListDefinition => self.output.push_str("</dd>\n"),
            TagEnd::Table => {
                if self.table.has_body() {
                    self.output.push_str("</tbody>\n");
                }
                self.output.push_str("</table>\n");
            }
            TagEnd::TableHead => {
                self.table.end_head();
                self.output.push_str("</tr>\n</thead>\n");
            }
            TagEnd::TableRow => self.output.push_str("</tr>\n"),
            TagEnd::TableCell => {
                self.output.push_str(if self.table.is_in_head() {
                    "</th>\n"
                } else {
                    "</td>\n"
                });
                self.table.next_cell();
            }
            TagEnd::Emphasis => self.push_inline("</em>"),
            TagEnd::Strong => self.push_inline("</strong>"),
            TagEnd::Strikethrough => self.push_inline("</del>"),
            TagEnd::Superscript => self.push_inline("</sup>"),
            TagEnd::Subscript => self.push_inline("</sub>"),
            TagEnd::Link => self.push_inline("</a>"),
            TagEnd::Image => {
                if let Some(alt) = self.image.end()
                    && let Some((src, title)) = self.pending_image.take()
                {
                    let src = self.checked_url(&src).to_owned();
                    html::image(&src, &alt, &title, &mut self.output);
                }
            }
            TagEnd::MetadataBlock(_) => {}
        }
    }

    fn text(&mut self, text: &str) {
        if self.code.is_active() {
            self.code.push_str(text);
        } else if self.image.is_active() {
            self.image.push_str(text);
        } else {
            self.output.push_str(&escape_html(text));
        }
    }

    fn inline_code(&mut self, code: &str) {
        if self.image.is_active() {
            self.image.push_str(code);
        } else {
            write!(self.output, "<code>{}</code>", escape_html(code)).unwrap();
        }
    }

    fn raw_html(&mut self, raw: &str) {
        if self.options.contains(DocumentOptions::SAFE) {
            if self.in_html_block {
                if !self.html_block_omitted {
                    self.output.push_str(html::RAW_HTML_OMITTED);
                    self.output.push('\n');
                    self.html_block_omitted = true;
                }
            } else {
                self.push_inline(html::RAW_HTML_OMITTED);
            }
        } else if self.tagfilter {
            let filtered = filter_html(raw);
            self.push_inline(&filtered);
        } else {
            self.push_inline(raw);
        }
    }

    fn soft_break(&mut self) {
        if self.image.is_active() {
            self.image.push_str(" ");
        } else if self.options.contains(DocumentOptions::HARD_BREAKS) {
            self.output.push_str("<br />\n");
        } else if self.options.contains(DocumentOptions::NO_BREAKS) {
            self.output.push(' ');
        } else {
            self.output.push('\n');
        }
    }

    fn hard_break(&mut self) {
        if self.image.is_active() {
            self.image.push_str(" ");
        } else {
            self.output.push_str("<br />\n");
        }
    }

    /// Link destination to emit: blanked in safe mode when dangerous.
    fn checked_url<'a>(&self, url: &'a str) -> &'a str {
        if self.options.contains(DocumentOptions::SAFE) && !html::is_safe_url(url) {
            ""
        } else {
            url
        }
    }
}

#[cfg(test)]
mod tests {
    use gfmx_extension::{
        ExtensionOptions, SyntaxExtension, core_registry, filter_extensions,
        filter_extensions_in,
    };
    use pretty_assertions::assert_eq;

    use super::*;

    fn render_with(markdown: &str, options: DocumentOptions, extensions: ExtensionOptions) -> String {
        let document = Document::parse(markdown, options, extensions);
        HtmlRenderer::new(options).render(&document).html
    }

    fn render(markdown: &str) -> String {
        render_with(markdown, DocumentOptions::DEFAULT, ExtensionOptions::ALL)
    }

    #[test]
    fn test_basic_paragraph() {
        assert_eq!(render("Hello, world!"), "<p>Hello, world!</p>\n");
    }

    #[test]
    fn test_heading() {
        assert_eq!(render("## Section"), "<h2>Section</h2>\n");
    }

    #[test]
    fn test_emphasis() {
        assert_eq!(
            render("*italic* and **bold**"),
            "<p><em>italic</em> and <strong>bold</strong></p>\n"
        );
    }

    #[test]
    fn test_text_escaped() {
        assert_eq!(render("a & \"b\""), "<p>a &amp; &quot;b&quot;</p>\n");
    }

    #[test]
    fn test_code_block() {
        assert_eq!(
            render("```rust\nfn main() {}\n```"),
            "<pre><code class=\"language-rust\">fn main() {}\n</code></pre>\n"
        );
    }

    #[test]
    fn test_indented_code_block() {
        assert_eq!(
            render("    x < y\n"),
            "<pre><code>x &lt; y\n</code></pre>\n"
        );
    }

    #[test]
    fn test_inline_code() {
        assert_eq!(render("Use `a<b`"), "<p>Use <code>a&lt;b</code></p>\n");
    }

    #[test]
    fn test_blockquote() {
        assert_eq!(
            render("> quoted"),
            "<blockquote>\n<p>quoted</p>\n</blockquote>\n"
        );
    }

    #[test]
    fn test_thematic_break() {
        assert_eq!(render("a\n\n***\n"), "<p>a</p>\n<hr />\n");
    }

    #[test]
    fn test_tight_list() {
        assert_eq!(
            render("- a\n- b\n"),
            "<ul>\n<li>a</li>\n<li>b</li>\n</ul>\n"
        );
    }

    #[test]
    fn test_loose_list() {
        assert_eq!(
            render("- a\n\n- b\n"),
            "<ul>\n<li>\n<p>a</p>\n</li>\n<li>\n<p>b</p>\n</li>\n</ul>\n"
        );
    }

    #[test]
    fn test_nested_list() {
        assert_eq!(
            render("- a\n  - b\n"),
            "<ul>\n<li>a\n<ul>\n<li>b</li>\n</ul>\n</li>\n</ul>\n"
        );
    }

    #[test]
    fn test_ordered_list_start() {
        assert_eq!(
            render("3. a\n4. b\n"),
            "<ol start=\"3\">\n<li>a</li>\n<li>b</li>\n</ol>\n"
        );
        assert_eq!(render("1. a\n"), "<ol>\n<li>a</li>\n</ol>\n");
    }

    #[test]
    fn test_table() {
        assert_eq!(
            render("| a | b |\n|:--|--:|\n| 1 | 2 |\n"),
            "<table>\n<thead>\n<tr>\n<th align=\"left\">a</th>\n<th align=\"right\">b</th>\n</tr>\n</thead>\n\
             <tbody>\n<tr>\n<td align=\"left\">1</td>\n<td align=\"right\">2</td>\n</tr>\n</tbody>\n</table>\n"
        );
    }

    #[test]
    fn test_table_without_body() {
        assert_eq!(
            render("| a |\n|---|\n"),
            "<table>\n<thead>\n<tr>\n<th>a</th>\n</tr>\n</thead>\n</table>\n"
        );
    }

    #[test]
    fn test_strikethrough() {
        assert_eq!(render("~~gone~~"), "<p><del>gone</del></p>\n");
    }

    #[test]
    fn test_task_list() {
        assert_eq!(
            render("- [ ] todo\n- [x] done\n"),
            "<ul>\n<li><input type=\"checkbox\" disabled=\"\" /> todo</li>\n\
             <li><input type=\"checkbox\" checked=\"\" disabled=\"\" /> done</li>\n</ul>\n"
        );
    }

    #[test]
    fn test_autolink() {
        assert_eq!(
            render("see www.example.com now"),
            "<p>see <a href=\"http://www.example.com\">www.example.com</a> now</p>\n"
        );
    }

    #[test]
    fn test_image() {
        assert_eq!(
            render("![alt *x*](a.png \"t\")"),
            "<p><img src=\"a.png\" alt=\"alt x\" title=\"t\" /></p>\n"
        );
    }

    #[test]
    fn test_link_with_title() {
        assert_eq!(
            render("[x](https://a.org \"T\")"),
            "<p><a href=\"https://a.org\" title=\"T\">x</a></p>\n"
        );
    }

    #[test]
    fn test_hard_break() {
        assert_eq!(render("a  \nb"), "<p>a<br />\nb</p>\n");
    }

    #[test]
    fn test_soft_break_options() {
        let text = "a\nb";
        assert_eq!(
            render_with(text, DocumentOptions::DEFAULT, ExtensionOptions::empty()),
            "<p>a\nb</p>\n"
        );
        assert_eq!(
            render_with(text, DocumentOptions::HARD_BREAKS, ExtensionOptions::empty()),
            "<p>a<br />\nb</p>\n"
        );
        assert_eq!(
            render_with(text, DocumentOptions::NO_BREAKS, ExtensionOptions::empty()),
            "<p>a b</p>\n"
        );
    }

    #[test]
    fn test_html_block_passthrough() {
        assert_eq!(render("<div>\nhi\n</div>\n"), "<div>\nhi\n</div>\n");
    }

    #[test]
    fn test_safe_omits_html() {
        assert_eq!(
            render_with("<div>\nhi\n</div>\n", DocumentOptions::SAFE, ExtensionOptions::empty()),
            "<!-- raw HTML omitted -->\n"
        );
        assert_eq!(
            render_with("a <b>x</b>", DocumentOptions::SAFE, ExtensionOptions::empty()),
            "<p>a <!-- raw HTML omitted -->x<!-- raw HTML omitted --></p>\n"
        );
    }

    #[test]
    fn test_safe_blanks_dangerous_links() {
        assert_eq!(
            render_with(
                "[x](javascript:alert(1))",
                DocumentOptions::SAFE,
                ExtensionOptions::empty()
            ),
            "<p><a href=\"\">x</a></p>\n"
        );
    }

    #[test]
    fn test_footnotes() {
        assert_eq!(
            render_with(
                "Note[^1].\n\n[^1]: The note.\n",
                DocumentOptions::FOOTNOTES,
                ExtensionOptions::empty()
            ),
            "<p>Note<sup class=\"footnote-ref\"><a href=\"#fn-1\" id=\"fnref-1\">1</a></sup>.</p>\n\
             <div class=\"footnote-definition\" id=\"fn-1\"><sup class=\"footnote-definition-label\">1</sup>\n\
             <p>The note.</p>\n</div>\n"
        );
    }

    #[test]
    fn test_tagfilter_via_accessor() {
        let document = Document::parse(
            "<iframe src=\"x\">y</iframe>\n\ntext <style>",
            DocumentOptions::DEFAULT,
            ExtensionOptions::empty(),
        );
        let list = filter_extensions().unwrap();
        let mut renderer =
            HtmlRenderer::new(DocumentOptions::DEFAULT).with_extensions(core_registry(), &list);
        assert!(renderer.filters_tags());

        let result = renderer.render(&document);
        assert_eq!(
            result.html,
            "&lt;iframe src=\"x\">y&lt;/iframe>\n<p>text &lt;style></p>\n"
        );
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_handle_from_other_registry_warns() {
        let registry = ExtensionRegistry::with_core_extensions();
        let other = ExtensionRegistry::with_core_extensions();
        let list = filter_extensions_in(&other).unwrap();

        let document = Document::parse("<script>", DocumentOptions::DEFAULT, ExtensionOptions::empty());
        let mut renderer = HtmlRenderer::new(DocumentOptions::DEFAULT).with_extensions(&registry, &list);
        assert!(!renderer.filters_tags());

        let result = renderer.render(&document);
        assert_eq!(result.html, "<script>\n");
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_custom_extension_ignored() {
        let mut registry = ExtensionRegistry::new();
        let handle = registry
            .register(SyntaxExtension::new("mentions", ExtensionKind::Custom))
            .unwrap();
        let renderer = HtmlRenderer::new(DocumentOptions::DEFAULT)
            .with_extensions(&registry, &ExtensionList::single(handle));
        assert!(!renderer.filters_tags());
    }

    #[test]
    fn test_renderer_reusable() {
        let document = Document::new("# A\n");
        let mut renderer = HtmlRenderer::new(DocumentOptions::DEFAULT);
        assert_eq!(renderer.render(&document).html, "<h1>A</h1>\n");
        assert_eq!(renderer.render(&document).html, "<h1>A</h1>\n");
    }
}
