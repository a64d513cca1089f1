//! Ordered list of enabled extensions.

use crate::handle::ExtensionHandle;

/// Extensions enabled for a render pass, in append order.
///
/// The list owns its storage only; the handles keep pointing into the
/// registry that issued them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExtensionList {
    handles: Vec<ExtensionHandle>,
}

impl ExtensionList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a list holding a single handle.
    #[must_use]
    pub fn single(handle: ExtensionHandle) -> Self {
        Self {
            handles: vec![handle],
        }
    }

    /// Append a handle to the end of the list.
    pub fn append(&mut self, handle: ExtensionHandle) {
        self.handles.push(handle);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    #[must_use]
    pub fn first(&self) -> Option<ExtensionHandle> {
        self.handles.first().copied()
    }

    #[must_use]
    pub fn contains(&self, handle: ExtensionHandle) -> bool {
        self.handles.contains(&handle)
    }

    pub fn iter(&self) -> impl Iterator<Item = ExtensionHandle> + '_ {
        self.handles.iter().copied()
    }
}

impl FromIterator<ExtensionHandle> for ExtensionList {
    fn from_iter<I: IntoIterator<Item = ExtensionHandle>>(iter: I) -> Self {
        Self {
            handles: iter.into_iter().collect(),
        }
    }
}

impl Extend<ExtensionHandle> for ExtensionList {
    fn extend<I: IntoIterator<Item = ExtensionHandle>>(&mut self, iter: I) {
        self.handles.extend(iter);
    }
}

impl<'a> IntoIterator for &'a ExtensionList {
    type Item = ExtensionHandle;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, ExtensionHandle>>;

    fn into_iter(self) -> Self::IntoIter {
        self.handles.iter().copied()
    }
}
