//! CLI command implementations.

pub(crate) mod extensions;
pub(crate) mod outline;
pub(crate) mod render;

pub(crate) use extensions::ExtensionsArgs;
pub(crate) use outline::OutlineArgs;
pub(crate) use render::RenderArgs;
