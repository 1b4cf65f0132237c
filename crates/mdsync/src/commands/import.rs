//! `mdsync import` command implementation.

use std::path::PathBuf;

use clap::Args;
use mdsync_config::CliSettings;
use mdsync_confluence::{Importer, SearchQuery};

use super::connection::{ConnectionArgs, create_confluence_client, require_confluence_config};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the import command.
#[derive(Args)]
#[command(group(clap::ArgGroup::new("source").required(true).args(["page_id", "search"])))]
pub(crate) struct ImportArgs {
    /// Import one page and write its Markdown to stdout.
    #[arg(long)]
    page_id: Option<String>,

    /// Import every page matching this text into the output directory.
    #[arg(short, long)]
    search: Option<String>,

    /// Directory for searched pages (overrides import.output_dir).
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    #[command(flatten)]
    connection: ConnectionArgs,
}

impl ImportArgs {
    /// Execute the import command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is incomplete or a download fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            output_dir: self.output_dir.clone(),
            ..self.connection.settings()
        };
        let config = self.connection.load_config(&cli_settings)?;
        let conf_config = require_confluence_config(&config, &output)?;
        let client = create_confluence_client(conf_config)?;
        let importer = Importer::new(&client);

        if let Some(page_id) = &self.page_id {
            let page = importer.import_page(page_id)?;
            output.info(&format!("Imported \"{}\" ({})", page.title, page.id));
            Output::document(&page.markdown)?;
            return Ok(());
        }

        if let Some(text) = &self.search {
            let query = SearchQuery::pages(text).in_space(config.search_space_key());
            let output_dir = &config.import_resolved.output_dir;
            output.info(&format!("Searching for \"{text}\"..."));
            let written = importer.import_search(
                &query,
                config.import_resolved.search_limit,
                output_dir,
            )?;
            if written.is_empty() {
                output.warning("No pages found.");
            } else {
                output.success(&format!(
                    "Imported {} page(s) into {}",
                    written.len(),
                    output_dir.display()
                ));
                for path in &written {
                    output.info(&format!("  -> {}", path.display()));
                }
            }
        }

        Ok(())
    }
}
