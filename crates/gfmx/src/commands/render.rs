//! `gfmx render` command implementation.

use std::io::Read;
use std::path::{Path, PathBuf};

use clap::Args;
use gfmx_config::{CliSettings, Config};
use gfmx_extension::core_registry;
use gfmx_renderer::{Document, HtmlRenderer};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Markdown file to render (default: read stdin).
    file: Option<PathBuf>,

    /// Write HTML to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover gfmx.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable an extension (repeatable, replaces the configured list).
    #[arg(short = 'e', long = "extension", value_name = "EXT")]
    extensions: Vec<String>,

    /// Omit raw HTML and dangerous URLs.
    #[arg(long)]
    safe: bool,

    /// Render soft line breaks as hard breaks.
    #[arg(long)]
    hard_breaks: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl RenderArgs {
    /// Execute the render command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails, the input cannot be read or
    /// is not UTF-8, or the output cannot be written.
    pub(crate) fn execute(self, output: &Output) -> Result<(), CliError> {
        let cli_settings = CliSettings {
            extensions: (!self.extensions.is_empty()).then_some(self.extensions),
            safe: self.safe.then_some(true),
            hard_breaks: self.hard_breaks.then_some(true),
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let extensions = config.extension_options()?;
        let options = config.document_options();

        let bytes = read_input(self.file.as_deref())?;
        let document = Document::from_bytes(&bytes, options, extensions)?;

        let registry = core_registry();
        let list = extensions.to_extension_list(registry);
        let result = HtmlRenderer::new(options)
            .with_extensions(registry, &list)
            .render(&document);

        for warning in &result.warnings {
            output.warning(&format!("Warning: {warning}"));
        }

        match &self.output {
            Some(path) => {
                std::fs::write(path, &result.html)?;
                output.info(&format!("Wrote {}", path.display()));
            }
            None => output.content(&result.html)?,
        }
        Ok(())
    }
}

/// Read the whole input file, or stdin when no file is given.
fn read_input(file: Option<&Path>) -> Result<Vec<u8>, CliError> {
    if let Some(path) = file {
        tracing::info!(path = %path.display(), "Reading input");
        return Ok(std::fs::read(path)?);
    }
    let mut bytes = Vec::new();
    std::io::stdin().lock().read_to_end(&mut bytes)?;
    Ok(bytes)
}
