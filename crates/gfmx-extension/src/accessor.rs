//! Accessor for the extension list that enables the tag filter.

use crate::list::ExtensionList;
use crate::registry::{ExtensionLookup, core_registry};

/// Registry name of the tag filter extension.
pub const TAGFILTER: &str = "tagfilter";

/// Build the enabled-extension list for the tag filter.
///
/// Looks up [`TAGFILTER`] in `lookup`. Returns a one-element list holding its
/// handle, or `None` (without allocating) when the extension is not
/// registered. The lookup is never mutated and nothing is cached, so repeated
/// calls reflect the registry's current contents.
pub fn filter_extensions_in<L: ExtensionLookup + ?Sized>(lookup: &L) -> Option<ExtensionList> {
    let Some(handle) = lookup.lookup(TAGFILTER) else {
        tracing::debug!(name = TAGFILTER, "Extension not registered");
        return None;
    };
    tracing::debug!(name = TAGFILTER, ?handle, "Found extension");
    Some(ExtensionList::single(handle))
}

/// [`filter_extensions_in`] against the process-wide [`core_registry`].
pub fn filter_extensions() -> Option<ExtensionList> {
    filter_extensions_in(core_registry())
}
