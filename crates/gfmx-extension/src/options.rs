//! Extension option flags.

use bitflags::bitflags;

use crate::list::ExtensionList;
use crate::registry::ExtensionLookup;

bitflags! {
    /// Set of GFM extensions to enable.
    ///
    /// Each single flag corresponds to one registry name, see
    /// [`extension_name`](Self::extension_name).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ExtensionOptions: u32 {
        /// Tables
        const TABLES = 1;
        /// Extended autolinks
        const AUTOLINKS = 1 << 1;
        /// Strikethrough
        const STRIKETHROUGH = 1 << 2;
        /// Disallowed raw HTML filtering
        const TAGFILTERS = 1 << 3;
        /// Task list items
        const TASKLIST = 1 << 4;
        /// All extensions
        const ALL = Self::TABLES.bits()
            | Self::AUTOLINKS.bits()
            | Self::STRIKETHROUGH.bits()
            | Self::TAGFILTERS.bits()
            | Self::TASKLIST.bits();
    }
}

/// Single flags paired with their registry names, in flag order.
const NAMES: [(ExtensionOptions, &str); 5] = [
    (ExtensionOptions::TABLES, "table"),
    (ExtensionOptions::AUTOLINKS, "autolink"),
    (ExtensionOptions::STRIKETHROUGH, "strikethrough"),
    (ExtensionOptions::TAGFILTERS, "tagfilter"),
    (ExtensionOptions::TASKLIST, "tasklist"),
];

/// An extension name with no matching option flag.
#[derive(Debug, thiserror::Error)]
#[error("Unknown extension `{0}`")]
pub struct UnknownExtension(pub String);

impl Default for ExtensionOptions {
    fn default() -> Self {
        Self::empty()
    }
}

impl ExtensionOptions {
    /// Registry name of a single flag.
    ///
    /// Returns `None` for the empty set and for combinations.
    #[must_use]
    pub fn extension_name(self) -> Option<&'static str> {
        NAMES
            .iter()
            .find(|(flag, _)| *flag == self)
            .map(|(_, name)| *name)
    }

    /// Flag for a registry name.
    #[must_use]
    pub fn from_extension_name(name: &str) -> Option<Self> {
        NAMES
            .iter()
            .find(|(_, candidate)| *candidate == name)
            .map(|(flag, _)| *flag)
    }

    /// Combine flags for a list of registry names.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownExtension`] for the first name without a flag.
    pub fn from_names<I, S>(names: I) -> Result<Self, UnknownExtension>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names.into_iter().try_fold(Self::empty(), |acc, name| {
            let name = name.as_ref();
            Self::from_extension_name(name)
                .map(|flag| acc | flag)
                .ok_or_else(|| UnknownExtension(name.to_owned()))
        })
    }

    /// Registry names of the contained flags, in flag order.
    pub fn names(self) -> impl Iterator<Item = &'static str> {
        NAMES
            .into_iter()
            .filter(move |(flag, _)| self.contains(*flag))
            .map(|(_, name)| name)
    }

    /// Handles of the contained extensions known to `lookup`, in flag order.
    ///
    /// Flags whose extension is not registered are skipped.
    pub fn to_extension_list<L: ExtensionLookup + ?Sized>(self, lookup: &L) -> ExtensionList {
        self.names().filter_map(|name| lookup.lookup(name)).collect()
    }
}
