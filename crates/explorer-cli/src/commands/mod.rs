//! Command implementations

mod config;
mod db;
mod generate;
mod manage;
mod refresh;
mod show;

use crate::cli::{Cli, Commands};
use crate::config_loader::load_config;
use crate::errors;
use crate::output::OutputWriter;
use crate::storage::Storage;
use anyhow::Result;
use explorer_summary::SummaryStore;
use std::path::PathBuf;

/// Execute a CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    let output = OutputWriter::new(cli.json);
    let config = load_config(&cli)?;
    let Cli { storage, datasets, command, .. } = cli;

    let (index, store) = match command {
        Commands::Config => return config::execute(&config, &output),
        Commands::Db(args) => return db::execute(args, &output).await,
        _ => {
            let settings = config.summary_settings();
            let storage = Storage::open(storage, datasets.as_deref(), &settings).await?;
            let index = storage.index.clone();
            (index, SummaryStore::new(storage.index, storage.overviews, storage.catalog, settings))
        }
    };

    match command {
        Commands::Generate(args) => {
            require_datasets(&datasets)?;
            generate::execute(&store, args, &output).await
        }
        Commands::Show(args) => {
            if args.update {
                require_datasets(&datasets)?;
            }
            show::execute(&store, args, &output).await
        }
        Commands::Refresh(args) => {
            require_datasets(&datasets)?;
            refresh::execute(&store, index.as_ref(), args, &output).await
        }
        Commands::Stale(args) => manage::stale(&store, args, &output).await,
        Commands::List(args) => manage::list(&store, args, &output).await,
        Commands::Drop(args) => manage::drop(&store, args, &output).await,
        // Handled above
        Commands::Config | Commands::Db(_) => Ok(()),
    }
}

/// Commands that read the index refuse to run against an empty one
fn require_datasets(datasets: &Option<PathBuf>) -> Result<()> {
    match datasets {
        Some(_) => Ok(()),
        None => Err(errors::no_datasets().into()),
    }
}
