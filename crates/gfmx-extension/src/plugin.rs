//! Block plugins embedded in Markdown as single-link paragraphs.
//!
//! A paragraph made only of `[name](params)` is a plugin block when a
//! [`PluginParser`] is registered under `name` and accepts `params`.
//! Parameters use the `key::value|key::value` form, for example
//! `[youtubevideo](source::https://youtu.be/kkdBB1hVLX0)`.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use url::Url;

/// A parsed plugin block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plugin {
    name: String,
    url: Option<Url>,
    params: BTreeMap<String, String>,
}

impl Plugin {
    /// Create a plugin with no URL and no parameters.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: None,
            params: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_url(mut self, url: Url) -> Self {
        self.url = Some(url);
        self
    }

    #[must_use]
    pub fn with_params(mut self, params: BTreeMap<String, String>) -> Self {
        self.params = params;
        self
    }

    /// Name of the parser that produced the plugin.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn url(&self) -> Option<&Url> {
        self.url.as_ref()
    }

    /// Value of a `key::value` parameter.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }
}

/// Turns the destination of a `[name](params)` link into a [`Plugin`].
pub trait PluginParser: Send + Sync {
    /// Link text the parser answers to.
    fn name(&self) -> &str;

    /// Parse the link destination, or `None` if it is not a valid plugin.
    fn parse(&self, text: &str) -> Option<Plugin>;
}

/// Split `key::value|key::value` text into parameters.
///
/// Keys and values are trimmed. Components without exactly one `::` are
/// skipped.
pub fn split_plugin_params(text: &str) -> BTreeMap<String, String> {
    text.trim()
        .split('|')
        .filter_map(|component| {
            let mut segments = component.split("::");
            match (segments.next(), segments.next(), segments.next()) {
                (Some(key), Some(value), None) => {
                    Some((key.trim().to_owned(), value.trim().to_owned()))
                }
                _ => None,
            }
        })
        .collect()
}

/// Parse a URL from plugin text.
///
/// Text without parameters is parsed as a URL as a whole; otherwise the URL
/// is read from the `parameter` parameter.
pub fn parse_plugin_url(text: &str, parameter: &str) -> Option<Url> {
    let params = split_plugin_params(text);
    let href = if params.is_empty() {
        text.trim()
    } else {
        params.get(parameter)?.as_str()
    };
    match Url::parse(href) {
        Ok(url) => Some(url),
        Err(error) => {
            tracing::debug!(href, %error, "Invalid plugin URL");
            None
        }
    }
}

/// Parsers keyed by name.
///
/// Registering a parser under a name that is already taken replaces the
/// previous parser.
#[derive(Default)]
pub struct PluginRegistry {
    parsers: HashMap<String, Box<dyn PluginParser>>,
}

impl PluginRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `parser` under its own name.
    pub fn register(&mut self, parser: impl PluginParser + 'static) {
        let name = parser.name().to_owned();
        tracing::debug!(name = name.as_str(), "Registered plugin parser");
        if self.parsers.insert(name, Box::new(parser)).is_some() {
            tracing::debug!("Replaced existing plugin parser");
        }
    }

    /// Register every parser in `parsers`.
    #[must_use]
    pub fn with_parsers<P: PluginParser + 'static>(
        mut self,
        parsers: impl IntoIterator<Item = P>,
    ) -> Self {
        for parser in parsers {
            self.register(parser);
        }
        self
    }

    /// Whether a parser is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.parsers.contains_key(name)
    }

    /// Run the parser registered under `name` on a block link's destination.
    pub fn parse_block_link(&self, name: &str, contents: &str) -> Option<Plugin> {
        let plugin = self.parsers.get(name)?.parse(contents);
        if plugin.is_none() {
            tracing::debug!(name, contents, "Plugin parser rejected block link");
        }
        plugin
    }

    pub fn len(&self) -> usize {
        self.parsers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parsers.is_empty()
    }
}

impl fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.parsers.keys().collect();
        names.sort();
        f.debug_struct("PluginRegistry")
            .field("parsers", &names)
            .finish()
    }
}

/// Embedded YouTube video: `[youtubevideo](source::<url>)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct YoutubePluginParser;

impl YoutubePluginParser {
    pub const NAME: &'static str = "youtubevideo";

    /// Video id of a plugin produced by this parser: the last path segment
    /// of its URL.
    pub fn video_id(plugin: &Plugin) -> Option<&str> {
        plugin
            .url()?
            .path_segments()?
            .next_back()
            .filter(|segment| !segment.is_empty())
    }
}

impl PluginParser for YoutubePluginParser {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn parse(&self, text: &str) -> Option<Plugin> {
        let url = parse_plugin_url(text, "source")?;
        Some(
            Plugin::new(Self::NAME)
                .with_url(url)
                .with_params(split_plugin_params(text)),
        )
    }
}
