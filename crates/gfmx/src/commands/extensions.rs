//! `gfmx extensions` command implementation.

use std::path::PathBuf;

use clap::Args;
use gfmx_config::Config;
use gfmx_extension::{ExtensionOptions, core_registry};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the extensions command.
#[derive(Args)]
pub(crate) struct ExtensionsArgs {
    /// Path to configuration file (default: auto-discover gfmx.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl ExtensionsArgs {
    /// Execute the extensions command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or stdout cannot be written.
    pub(crate) fn execute(self, output: &Output) -> Result<(), CliError> {
        let config = Config::load(self.config.as_deref(), None)?;
        let enabled = config.extension_options()?;

        for (_, extension) in core_registry().iter() {
            let is_enabled = ExtensionOptions::from_extension_name(extension.name())
                .is_some_and(|flag| enabled.contains(flag));
            output.toggle_line(&status_line(extension.name(), is_enabled), is_enabled)?;
        }
        Ok(())
    }
}

fn status_line(name: &str, enabled: bool) -> String {
    let status = if enabled { "enabled" } else { "disabled" };
    format!("{name:<16}{status}")
}
