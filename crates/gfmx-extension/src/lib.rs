//! Syntax extension registry for GitHub Flavored Markdown.
//!
//! This crate models the extension side of a GFM toolkit: a registry that maps
//! well-known extension names to opaque [`ExtensionHandle`]s, the
//! [`ExtensionList`] passed to a render pass to enable extensions, and the
//! [`filter_extensions`] accessor that builds the list used to switch on the
//! tag filter. [`PluginRegistry`] holds the parsers for block plugins written
//! as `[name](key::value|...)` paragraphs.
//!
//! # Ownership
//!
//! Handles never own the extension they point at. The registry owns every
//! [`SyntaxExtension`]; an [`ExtensionList`] owns only its storage. Dropping a
//! list never affects the registry.
//!
//! # Example
//!
//! ```
//! use gfmx_extension::{ExtensionRegistry, filter_extensions_in};
//!
//! let registry = ExtensionRegistry::with_core_extensions();
//! let list = filter_extensions_in(&registry).expect("tagfilter is a core extension");
//!
//! assert_eq!(list.len(), 1);
//! assert_eq!(list.first(), registry.find("tagfilter"));
//! ```

mod accessor;
mod handle;
mod list;
mod options;
mod plugin;
mod registry;
pub mod tagfilter;

pub use accessor::{TAGFILTER, filter_extensions, filter_extensions_in};
pub use handle::{ExtensionHandle, ExtensionKind, SyntaxExtension};
pub use list::ExtensionList;
pub use options::{ExtensionOptions, UnknownExtension};
pub use plugin::{
    Plugin, PluginParser, PluginRegistry, YoutubePluginParser, parse_plugin_url,
    split_plugin_params,
};
pub use registry::{ExtensionLookup, ExtensionRegistry, RegistryError, core_registry};
