//! Parsed Markdown documents.

use bitflags::bitflags;
use gfmx_extension::{ExtensionOptions, core_registry, filter_extensions};
use pulldown_cmark::{Event, Options, Parser, TextMergeStream};

use crate::autolink::Autolinks;
use crate::renderer::HtmlRenderer;
use crate::tightness::ListTightness;

bitflags! {
    /// Parse and render options for a [`Document`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DocumentOptions: u32 {
        /// Smart punctuation (curly quotes, dashes, ellipses).
        const SMART = 1;
        /// Footnote references and definitions.
        const FOOTNOTES = 1 << 1;
        /// Render soft breaks as hard breaks.
        const HARD_BREAKS = 1 << 2;
        /// Render soft breaks as spaces.
        const NO_BREAKS = 1 << 3;
        /// Omit raw HTML and blank out dangerous link destinations.
        const SAFE = 1 << 4;
    }
}

impl DocumentOptions {
    /// No options set.
    pub const DEFAULT: Self = Self::empty();
}

impl Default for DocumentOptions {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Document error.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// Input bytes are not valid UTF-8.
    #[error("Document is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
}

/// A parsed Markdown document.
///
/// Owns its source text and the event stream produced by the parser, so it
/// can be rendered or walked any number of times.
#[derive(Debug, Clone)]
pub struct Document {
    source: String,
    events: Vec<Event<'static>>,
    tight_lists: Vec<bool>,
    options: DocumentOptions,
    extensions: ExtensionOptions,
}

impl Document {
    /// Parse `text` with default options and all extensions enabled.
    pub fn new(text: impl Into<String>) -> Self {
        Self::parse(text, DocumentOptions::DEFAULT, ExtensionOptions::ALL)
    }

    /// Parse `text` with the given options and extensions.
    pub fn parse(
        text: impl Into<String>,
        options: DocumentOptions,
        extensions: ExtensionOptions,
    ) -> Self {
        let source = text.into();
        let mut tightness = ListTightness::new(&source);
        let parser = Parser::new_ext(&source, parser_options(options, extensions))
            .into_offset_iter()
            .map(|(event, range)| {
                tightness.observe(&event, range);
                event
            });
        let merged = TextMergeStream::new(parser).map(Event::into_static);

        let events: Vec<_> = if extensions.contains(ExtensionOptions::AUTOLINKS) {
            Autolinks::new(merged).collect()
        } else {
            merged.collect()
        };
        let tight_lists = tightness.finish();
        tracing::debug!(
            bytes = source.len(),
            events = events.len(),
            ?extensions,
            "Parsed document"
        );

        Self {
            source,
            events,
            tight_lists,
            options,
            extensions,
        }
    }

    /// Parse UTF-8 encoded bytes.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::InvalidUtf8`] if `bytes` is not valid UTF-8.
    pub fn from_bytes(
        bytes: &[u8],
        options: DocumentOptions,
        extensions: ExtensionOptions,
    ) -> Result<Self, DocumentError> {
        let text = std::str::from_utf8(bytes)?;
        Ok(Self::parse(text, options, extensions))
    }

    /// Source text the document was parsed from.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn options(&self) -> DocumentOptions {
        self.options
    }

    pub fn extensions(&self) -> ExtensionOptions {
        self.extensions
    }

    /// Parser events, after the autolink pass when it is enabled.
    pub fn events(&self) -> &[Event<'static>] {
        &self.events
    }

    /// Tightness of each list, in the order the lists start.
    pub(crate) fn tight_lists(&self) -> &[bool] {
        &self.tight_lists
    }

    /// Render the document as HTML with its own options.
    ///
    /// When the document was parsed with [`ExtensionOptions::TAGFILTERS`],
    /// the tag filter is enabled for the render pass through
    /// [`filter_extensions`].
    pub fn render_html(&self) -> String {
        let mut renderer = HtmlRenderer::new(self.options);
        if self.extensions.contains(ExtensionOptions::TAGFILTERS)
            && let Some(list) = filter_extensions()
        {
            renderer = renderer.with_extensions(core_registry(), &list);
        }
        renderer.render(self).html
    }
}

/// Map document and extension options to parser options.
fn parser_options(options: DocumentOptions, extensions: ExtensionOptions) -> Options {
    let mut parser_options = Options::empty();
    if extensions.contains(ExtensionOptions::TABLES) {
        parser_options.insert(Options::ENABLE_TABLES);
    }
    if extensions.contains(ExtensionOptions::STRIKETHROUGH) {
        parser_options.insert(Options::ENABLE_STRIKETHROUGH);
    }
    if extensions.contains(ExtensionOptions::TASKLIST) {
        parser_options.insert(Options::ENABLE_TASKLISTS);
    }
    if options.contains(DocumentOptions::SMART) {
        parser_options.insert(Options::ENABLE_SMART_PUNCTUATION);
    }
    if options.contains(DocumentOptions::FOOTNOTES) {
        parser_options.insert(Options::ENABLE_FOOTNOTES);
    }
    parser_options
}
