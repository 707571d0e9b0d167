//! Stale, list and drop command implementations

use anyhow::{bail, Result};
use console::Term;
use explorer_summary::SummaryStore;

use crate::cli::{DropArgs, ProductArgs};
use crate::output::OutputWriter;
use crate::output_types::{GeneratedRow, ProductChangeOutput};

pub async fn stale(store: &SummaryStore, args: ProductArgs, output: &OutputWriter) -> Result<()> {
    let affected = store.mark_stale(&args.product).await?;

    if output.is_json() {
        return output.result(ProductChangeOutput { product: args.product, affected });
    }
    if affected == 0 {
        output.info(format!("No current overviews of {}", args.product));
    } else {
        output.success(format!("Marked {} overview(s) of {} stale", affected, args.product));
    }
    Ok(())
}

pub async fn list(store: &SummaryStore, args: ProductArgs, output: &OutputWriter) -> Result<()> {
    let keys = store.list_generated(&args.product).await?;

    let mut rows = Vec::with_capacity(keys.len());
    for key in keys {
        // Dropped concurrently; skip
        let Some(stored) = store.get_stored(&key).await? else {
            continue;
        };
        rows.push(GeneratedRow {
            key: key.to_string(),
            state: format!("{:?}", stored.state()),
            dataset_count: stored.overview.dataset_count,
            generated_at: stored.generated_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        });
    }

    output.section(format!("Overviews of {}", args.product));
    output.table(rows);
    Ok(())
}

pub async fn drop(store: &SummaryStore, args: DropArgs, output: &OutputWriter) -> Result<()> {
    if !args.yes {
        if output.is_json() {
            bail!("Refusing to drop overviews without --yes in JSON mode");
        }
        let term = Term::stderr();
        term.write_str(&format!("Remove all overviews of {}? [y/N] ", args.product))?;
        let answer = term.read_line()?;
        if !matches!(answer.trim().to_lowercase().as_str(), "y" | "yes") {
            output.info("Aborted");
            return Ok(());
        }
    }

    let affected = store.drop_product(&args.product).await?;

    if output.is_json() {
        return output.result(ProductChangeOutput { product: args.product, affected });
    }
    output.success(format!("Removed {} overview(s) of {}", affected, args.product));
    Ok(())
}
