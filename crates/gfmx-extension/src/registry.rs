//! Name-indexed store of syntax extensions.

use std::collections::HashMap;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::handle::{ExtensionHandle, ExtensionKind, SyntaxExtension};

/// Source of registry ids; every registry gets a distinct one so handles from
/// different registries never compare equal.
static NEXT_REGISTRY_ID: AtomicU32 = AtomicU32::new(0);

static CORE_REGISTRY: LazyLock<ExtensionRegistry> =
    LazyLock::new(ExtensionRegistry::with_core_extensions);

/// Extensions registered by [`ExtensionRegistry::with_core_extensions`].
const CORE_EXTENSIONS: [(&str, ExtensionKind); 5] = [
    ("table", ExtensionKind::Table),
    ("autolink", ExtensionKind::Autolink),
    ("strikethrough", ExtensionKind::Strikethrough),
    ("tagfilter", ExtensionKind::TagFilter),
    ("tasklist", ExtensionKind::Tasklist),
];

/// Read-only capability to look up an extension by name.
pub trait ExtensionLookup {
    /// Return the handle registered under `name`, if any.
    fn lookup(&self, name: &str) -> Option<ExtensionHandle>;
}

/// Registry error.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// An extension with the same name is already registered.
    #[error("Extension `{0}` is already registered")]
    Duplicate(String),
}

/// Registry mapping extension names to [`ExtensionHandle`]s.
///
/// Extensions are kept in registration order and are never removed, so a
/// handle stays valid for as long as the registry lives.
#[derive(Debug)]
pub struct ExtensionRegistry {
    id: u32,
    extensions: Vec<SyntaxExtension>,
    by_name: HashMap<String, u32>,
}

impl ExtensionRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: NEXT_REGISTRY_ID.fetch_add(1, Ordering::Relaxed),
            extensions: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    /// Create a registry holding the core GFM extensions.
    ///
    /// Registered in order: `table`, `autolink`, `strikethrough`,
    /// `tagfilter`, `tasklist`.
    #[must_use]
    pub fn with_core_extensions() -> Self {
        let mut registry = Self::new();
        for (name, kind) in CORE_EXTENSIONS {
            registry.insert(SyntaxExtension::new(name, kind));
        }
        registry
    }

    /// Register an extension and return its handle.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Duplicate`] if the name is already taken.
    pub fn register(
        &mut self,
        extension: SyntaxExtension,
    ) -> Result<ExtensionHandle, RegistryError> {
        if self.by_name.contains_key(extension.name()) {
            tracing::warn!(name = extension.name(), "Duplicate extension registration");
            return Err(RegistryError::Duplicate(extension.name().to_owned()));
        }
        Ok(self.insert(extension))
    }

    fn insert(&mut self, extension: SyntaxExtension) -> ExtensionHandle {
        let slot = u32::try_from(self.extensions.len()).expect("registry slot overflow");
        tracing::debug!(
            registry = self.id,
            slot,
            name = extension.name(),
            kind = ?extension.kind(),
            "Registered syntax extension"
        );
        self.by_name.insert(extension.name().to_owned(), slot);
        self.extensions.push(extension);
        ExtensionHandle {
            registry: self.id,
            slot,
        }
    }

    /// Find the handle registered under `name`.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<ExtensionHandle> {
        self.by_name.get(name).map(|&slot| ExtensionHandle {
            registry: self.id,
            slot,
        })
    }

    /// Resolve a handle issued by this registry.
    ///
    /// Returns `None` for handles issued by a different registry.
    #[must_use]
    pub fn get(&self, handle: ExtensionHandle) -> Option<&SyntaxExtension> {
        if handle.registry != self.id {
            return None;
        }
        self.extensions.get(handle.slot as usize)
    }

    /// Number of registered extensions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    /// Iterate over `(handle, extension)` pairs in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (ExtensionHandle, &SyntaxExtension)> + '_ {
        self.extensions.iter().zip(0u32..).map(|(extension, slot)| {
            let handle = ExtensionHandle {
                registry: self.id,
                slot,
            };
            (handle, extension)
        })
    }
}

impl Default for ExtensionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtensionLookup for ExtensionRegistry {
    fn lookup(&self, name: &str) -> Option<ExtensionHandle> {
        self.find(name)
    }
}

impl<T: ExtensionLookup + ?Sized> ExtensionLookup for &T {
    fn lookup(&self, name: &str) -> Option<ExtensionHandle> {
        (**self).lookup(name)
    }
}

/// Process-wide registry with the core extensions.
///
/// Initialized on first use; read-only afterwards.
pub fn core_registry() -> &'static ExtensionRegistry {
    &CORE_REGISTRY
}
