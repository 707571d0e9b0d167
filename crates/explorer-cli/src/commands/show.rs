//! Show command implementation

use anyhow::Result;
use explorer_core::models::{StoredOverview, SummaryKey, SummaryState};
use explorer_summary::SummaryStore;
use serde::Serialize;
use tabled::Tabled;

use crate::cli::ShowArgs;
use crate::output::OutputWriter;
use crate::output_types::OverviewOutput;

pub async fn execute(store: &SummaryStore, args: ShowArgs, output: &OutputWriter) -> Result<()> {
    let key = args.key.to_key()?;

    if args.update {
        store.get_or_update(&key).await?;
    }

    match store.get_stored(&key).await? {
        Some(stored) => render(&key, &stored, args.full_timeline, output),
        None if output.is_json() => {
            #[derive(Serialize)]
            struct Absent {
                key: String,
                state: SummaryState,
            }
            output.result(Absent { key: key.to_string(), state: SummaryState::Absent })
        }
        None => {
            output.warning(format!("No overview has been generated for {}", key));
            output.info("Run 'explorer-gen generate' or 'explorer-gen show --update'");
            Ok(())
        }
    }
}

/// Print one persisted overview
pub fn render(
    key: &SummaryKey,
    stored: &StoredOverview,
    full_timeline: bool,
    output: &OutputWriter,
) -> Result<()> {
    let view = OverviewOutput::new(key, stored, full_timeline);
    if output.is_json() {
        return output.result(view);
    }

    output.section(format!("Overview {}", key));
    output.kv("State", format!("{:?}", view.state));
    output.kv("Generated At", stored.generated_at.format("%Y-%m-%d %H:%M:%S UTC"));
    output.kv(
        "Time Range",
        view.time_range.map(|r| r.to_string()).unwrap_or_else(|| "none".to_string()),
    );
    output.kv("Datasets", view.dataset_count);
    output.kv(
        "Footprints",
        format!("{} ({} without usable footprint)", view.footprint_count, stored.overview.footprint_gap()),
    );
    if !view.crses.is_empty() {
        output.kv("CRSes", view.crses.iter().cloned().collect::<Vec<_>>().join(", "));
    }
    if let Some(newest) = view.newest_dataset_creation_time {
        output.kv("Newest Dataset", newest.format("%Y-%m-%d %H:%M:%S UTC"));
    }

    if !view.region_dataset_counts.is_empty() {
        #[derive(Serialize, Tabled)]
        struct RegionRow {
            #[tabled(rename = "Region")]
            region: String,
            #[tabled(rename = "Datasets")]
            count: u64,
        }

        output.section("Regions");
        output.table(
            view.region_dataset_counts
                .into_iter()
                .map(|(region, count)| RegionRow { region, count })
                .collect(),
        );
    }

    output.section(format!("Timeline (per {})", view.timeline_period));
    output.table(view.timeline);
    Ok(())
}
