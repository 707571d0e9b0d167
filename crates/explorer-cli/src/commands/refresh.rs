//! Refresh command implementation

use anyhow::Result;
use explorer_core::models::SummaryKey;
use explorer_core::ports::DatasetIndex;
use explorer_summary::SummaryStore;
use indicatif::ProgressBar;

use crate::cli::RefreshArgs;
use crate::output::OutputWriter;
use crate::output_types::RefreshOutput;
use crate::progress::{create_progress_bar, finish_error, finish_success};

pub async fn execute(
    store: &SummaryStore,
    index: &dyn DatasetIndex,
    args: RefreshArgs,
    output: &OutputWriter,
) -> Result<()> {
    let products = if args.all { index.products().await? } else { args.products };

    if products.is_empty() {
        output.warning("The dataset index has no products");
        return Ok(());
    }

    let progress = if output.is_json() {
        ProgressBar::hidden()
    } else {
        create_progress_bar(products.len() as u64, "Refreshing products...")
    };

    let mut results = Vec::with_capacity(products.len());
    for product in &products {
        progress.set_message(format!("Refreshing {}...", product));
        if let Err(e) = store.refresh_all(product).await {
            finish_error(&progress, &format!("Failed to refresh {}", product));
            return Err(e.into());
        }

        let dataset_count = store
            .get(&SummaryKey::product(product.as_str())?)
            .await?
            .map(|overview| overview.dataset_count)
            .unwrap_or(0);
        let overviews = store.list_generated(product).await?.len();
        results.push(RefreshOutput { product: product.clone(), dataset_count, overviews });
        progress.inc(1);
    }
    finish_success(&progress, &format!("Refreshed {} product(s)", products.len()));

    if output.is_json() {
        return output.result(results);
    }
    for result in &results {
        output.success(format!(
            "{}: {} datasets across {} overviews",
            result.product, result.dataset_count, result.overviews
        ));
    }
    Ok(())
}
