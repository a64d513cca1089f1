//! `gfmx outline` command implementation.

use std::convert::Infallible;
use std::path::PathBuf;

use clap::Args;
use gfmx_config::Config;
use gfmx_renderer::{Container, Document, DocumentHandler, Flow, Leaf, Walker};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the outline command.
#[derive(Args)]
pub(crate) struct OutlineArgs {
    /// Markdown file to outline.
    file: PathBuf,

    /// Path to configuration file (default: auto-discover gfmx.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl OutlineArgs {
    /// Execute the outline command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the file cannot be read.
    pub(crate) fn execute(self, output: &Output) -> Result<(), CliError> {
        let config = Config::load(self.config.as_deref(), None)?;
        let bytes = std::fs::read(&self.file)?;
        let document =
            Document::from_bytes(&bytes, config.document_options(), config.extension_options()?)?;

        for line in outline(&document)? {
            output.line(&line)?;
        }
        Ok(())
    }
}

/// Heading outline as indented list lines.
fn outline(document: &Document) -> Result<Vec<String>, CliError> {
    let mut collector = HeadingCollector::default();
    Walker::new().walk(document, &mut collector)?;
    Ok(collector
        .headings
        .iter()
        .map(|(level, text)| {
            let indent = "  ".repeat(usize::from(level.saturating_sub(1)));
            format!("{indent}- {text}")
        })
        .collect())
}

/// Collects heading levels and plain text.
#[derive(Default)]
struct HeadingCollector {
    current: Option<(u8, String)>,
    headings: Vec<(u8, String)>,
}

impl DocumentHandler for HeadingCollector {
    type Error = Infallible;

    fn enter(&mut self, container: &Container<'_>) -> Result<Flow, Infallible> {
        if let Container::Heading { level } = container {
            self.current = Some((*level, String::new()));
        }
        Ok(Flow::Continue)
    }

    fn exit(&mut self, container: &Container<'_>) -> Result<Flow, Infallible> {
        if matches!(container, Container::Heading { .. })
            && let Some((level, text)) = self.current.take()
        {
            self.headings.push((level, text.trim().to_owned()));
        }
        Ok(Flow::Continue)
    }

    fn leaf(&mut self, leaf: &Leaf<'_>) -> Result<Flow, Infallible> {
        if let Some((_, text)) = &mut self.current {
            match leaf {
                Leaf::Text(t) | Leaf::InlineCode(t) => text.push_str(t),
                Leaf::SoftBreak | Leaf::LineBreak => text.push(' '),
                _ => {}
            }
        }
        Ok(Flow::Continue)
    }
}

#[cfg(test)]
mod tests {
    use gfmx_renderer::{DocumentOptions, ExtensionOptions};
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_outline() {
        let document = Document::parse(
            "# Guide\n\nIntro\n\n## Install `gfmx`\n\n### From *source*\n\n## Usage\n",
            DocumentOptions::DEFAULT,
            ExtensionOptions::ALL,
        );
        assert_eq!(
            outline(&document).unwrap(),
            [
                "- Guide",
                "  - Install gfmx",
                "    - From source",
                "  - Usage"
            ]
        );
    }

    #[test]
    fn test_outline_without_headings() {
        let document = Document::new("just text\n");
        assert!(outline(&document).unwrap().is_empty());
    }
}
