//! Extension handles and the extensions they refer to.

use std::fmt;

/// Behavior family of a registered extension.
///
/// Renderers dispatch on the kind rather than the name, so an extension can be
/// registered under an alias and still be recognized.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExtensionKind {
    /// GFM tables.
    Table,
    /// Extended autolinks (`www.`, `http(s)://`, e-mail addresses).
    Autolink,
    /// `~~strikethrough~~`.
    Strikethrough,
    /// Disallowed raw HTML filtering.
    TagFilter,
    /// `- [ ]` / `- [x]` task list items.
    Tasklist,
    /// Registered by the application; no built-in behavior.
    Custom,
}

/// A named syntax extension owned by an [`ExtensionRegistry`](crate::ExtensionRegistry).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyntaxExtension {
    name: String,
    kind: ExtensionKind,
}

impl SyntaxExtension {
    /// Create an extension with the given registry name.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: ExtensionKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// Name the extension is registered under.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn kind(&self) -> ExtensionKind {
        self.kind
    }
}

/// Opaque, non-owning reference to a registered extension.
///
/// Two handles are equal only when they refer to the same slot of the same
/// registry. Resolve a handle with
/// [`ExtensionRegistry::get`](crate::ExtensionRegistry::get).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExtensionHandle {
    pub(crate) registry: u32,
    pub(crate) slot: u32,
}

impl fmt::Debug for ExtensionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExtensionHandle({}:{})", self.registry, self.slot)
    }
}
