//! `mdsync convert` command implementation.

use std::io::Read;
use std::path::PathBuf;

use clap::{Args, ValueEnum};
use mdsync_convert::{MarkdownToStorage, StorageToMarkdown};

use crate::error::CliError;
use crate::output::Output;

/// Output format of the convert command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum Target {
    /// Markdown to Confluence storage format.
    Storage,
    /// Confluence storage format to Markdown.
    Markdown,
}

/// Arguments for the convert command.
#[derive(Args)]
pub(crate) struct ConvertArgs {
    /// Input file (default: stdin).
    input: Option<PathBuf>,

    /// Format to convert to.
    #[arg(long, value_enum, default_value = "storage")]
    to: Target,
}

impl ConvertArgs {
    /// Execute the convert command.
    ///
    /// # Errors
    ///
    /// Returns an error if reading the input or conversion fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let input = match &self.input {
            Some(path) => std::fs::read_to_string(path)?,
            None => {
                let mut buf = String::new();
                std::io::stdin().read_to_string(&mut buf)?;
                buf
            }
        };
        Output::document(&convert(&input, self.to)?)?;
        Ok(())
    }
}

fn convert(input: &str, to: Target) -> Result<String, CliError> {
    Ok(match to {
        Target::Storage => MarkdownToStorage::new().convert(input)?,
        Target::Markdown => StorageToMarkdown::new().convert(input),
    })
}
