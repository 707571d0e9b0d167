//! Generate command implementation

use anyhow::{anyhow, Result};
use explorer_summary::SummaryStore;

use super::show;
use crate::cli::KeyArgs;
use crate::output::OutputWriter;
use crate::progress::{finish_error, finish_success, spinner_unless};

pub async fn execute(store: &SummaryStore, args: KeyArgs, output: &OutputWriter) -> Result<()> {
    let key = args.to_key()?;

    let spinner = spinner_unless(output.is_json(), &format!("Generating {}...", key));
    let overview = match store.generate(&key).await {
        Ok(overview) => overview,
        Err(e) => {
            finish_error(&spinner, &format!("Failed to generate {}", key));
            return Err(e.into());
        }
    };
    finish_success(
        &spinner,
        &format!("Generated {} ({} datasets)", key, overview.dataset_count),
    );

    let stored = store
        .get_stored(&key)
        .await?
        .ok_or_else(|| anyhow!("Overview {} was not persisted", key))?;
    show::render(&key, &stored, false, output)
}
