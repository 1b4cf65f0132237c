//! `mdsync publish` command implementation.

use std::path::PathBuf;

use clap::Args;
use mdsync_confluence::{
    DryRunResult, PublishAction, PublishConfig, PublishResult, Publisher, file_title,
};

use super::connection::{ConnectionArgs, create_confluence_client, require_confluence_config};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the publish command.
#[derive(Args)]
pub(crate) struct PublishArgs {
    /// Path to the Markdown file.
    markdown_file: PathBuf,

    /// Page title (default: file name without extension).
    #[arg(short, long)]
    title: Option<String>,

    /// Parent page ID (overrides confluence.parent_page_id).
    #[arg(short, long)]
    parent: Option<String>,

    /// Preview the conversion without changing Confluence.
    #[arg(long)]
    dry_run: bool,

    #[command(flatten)]
    connection: ConnectionArgs,
}

impl PublishArgs {
    /// Execute the publish command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is incomplete or the publish fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = self.connection.settings();
        let config = self.connection.load_config(&cli_settings)?;
        let conf_config = require_confluence_config(&config, &output)?;
        let space_key = conf_config.require_space_key()?.to_owned();

        let client = create_confluence_client(conf_config)?;
        let publisher = Publisher::new(
            &client,
            PublishConfig {
                space_key,
                parent_page_id: conf_config.parent_page_id.clone(),
            },
        );

        output.info(&format!("Converting {}...", self.markdown_file.display()));

        if self.dry_run {
            let markdown = std::fs::read_to_string(&self.markdown_file)?;
            let title = self.title.clone().unwrap_or_else(|| file_title(&self.markdown_file));
            let result = publisher.dry_run(&markdown, &title, self.parent.as_deref())?;
            print_dry_run_result(&output, &result);
            Output::document(&result.storage)?;
        } else {
            let result = publisher.publish(
                &self.markdown_file,
                self.title.as_deref(),
                self.parent.as_deref(),
            )?;
            print_publish_result(&output, &result);
        }

        Ok(())
    }
}

fn print_dry_run_result(output: &Output, result: &DryRunResult) {
    output.highlight("\n[DRY RUN] No changes made.");
    output.info(&format!("Title: {}", result.title));
    match (&result.action, &result.existing_page_id) {
        (PublishAction::Updated, Some(id)) => {
            output.info(&format!("Would update existing page {id}"));
        }
        _ => output.info("Would create a new page"),
    }

    if !result.images.is_empty() {
        output.info(&format!("\nImages ({}):", result.images.len()));
        for image in &result.images {
            let kind = if image.is_remote() { "remote" } else { "local" };
            output.info(&format!("  -> {} ({kind})", image.path));
        }
    }
}

fn print_publish_result(output: &Output, result: &PublishResult) {
    match result.action {
        PublishAction::Created => output.success("\nPage created successfully!"),
        PublishAction::Updated => output.success("\nPage updated successfully!"),
    }
    output.info(&format!("ID: {}", result.page_id));
    output.info(&format!("Title: {}", result.title));
    output.info(&format!("Version: {}", result.version));
    output.info(&format!("URL: {}", result.url));

    if result.attachments_uploaded > 0 {
        output.info(&format!(
            "Attachments uploaded: {}",
            result.attachments_uploaded
        ));
    }
}
