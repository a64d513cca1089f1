//! GitHub Flavored Markdown documents built on `pulldown-cmark`.
//!
//! This crate parses Markdown into a [`Document`], renders it to HTML with
//! [`HtmlRenderer`] and replays it through a [`DocumentHandler`] with
//! [`Walker`].
//!
//! # Architecture
//!
//! Parse-time extensions (tables, strikethrough, tasklists and extended
//! autolinks) are selected with [`ExtensionOptions`] when the document is
//! parsed. Render-time extensions are resolved from an
//! [`ExtensionList`](gfmx_extension::ExtensionList) against a registry; the
//! tag filter is the only one.
//!
//! # Example
//!
//! ```
//! use gfmx_extension::ExtensionOptions;
//! use gfmx_renderer::{Document, DocumentOptions};
//!
//! let document = Document::parse(
//!     "Visit www.example.com <title>",
//!     DocumentOptions::DEFAULT,
//!     ExtensionOptions::AUTOLINKS | ExtensionOptions::TAGFILTERS,
//! );
//! assert_eq!(
//!     document.render_html(),
//!     "<p>Visit <a href=\"http://www.example.com\">www.example.com</a> &lt;title></p>\n"
//! );
//! ```

mod autolink;
mod document;
mod html;
mod renderer;
mod state;
mod tightness;
mod util;
mod walker;

pub use document::{Document, DocumentError, DocumentOptions};
pub use gfmx_extension::{ExtensionOptions, Plugin, PluginRegistry};
pub use renderer::{HtmlRenderer, RenderResult};
pub use state::escape_html;
pub use walker::{ColumnAlignment, Container, DocumentHandler, Flow, Leaf, WalkError, Walker};
