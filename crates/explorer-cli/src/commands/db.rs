//! Database command implementation

use anyhow::{Context, Result};

use crate::cli::{DbArgs, DbCommand};
use crate::output::OutputWriter;
use crate::output_types::MigrationRow;
use crate::storage::connect_postgres;

/// Execute database management commands
pub async fn execute(args: DbArgs, output: &OutputWriter) -> Result<()> {
    let store = connect_postgres().await?;

    match args.command {
        DbCommand::Migrate => {
            output.info("Applying migrations...");
            store.run_migrations().await.context("Failed to apply migrations")?;
            output.success("Database schema is up to date");
        }
        DbCommand::Status => {
            let status = store.migration_status().await.context("Failed to read migrations")?;
            let pending = status.iter().filter(|s| !s.applied).count();

            output.section("Migrations");
            output.table(
                status
                    .into_iter()
                    .map(|s| MigrationRow {
                        version: s.version,
                        description: s.description,
                        applied: s.applied,
                    })
                    .collect(),
            );
            if pending > 0 {
                output.warning(format!(
                    "{} pending migration(s); run 'explorer-gen db migrate'",
                    pending
                ));
            }
        }
    }
    Ok(())
}
