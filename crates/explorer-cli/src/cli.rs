use clap::{Args, Parser, Subcommand};
use explorer_core::models::SummaryKey;
use std::path::PathBuf;

/// Explorer - period overviews for a geospatial dataset catalog
#[derive(Parser, Debug)]
#[command(name = "explorer-gen")]
#[command(about = "Generate and inspect dataset period overviews", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Storage backend for overviews (memory or postgres)
    #[arg(long, global = true, default_value = "memory")]
    pub storage: StorageBackend,

    /// GeoJSON FeatureCollection of datasets to summarize
    #[arg(long, global = true, value_name = "FILE")]
    pub datasets: Option<PathBuf>,

    /// Configuration file (defaults to ./explorer.toml when present)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// SRID footprints are unioned in
    #[arg(long, global = true)]
    pub target_srid: Option<u32>,

    /// Geometry validity mode (strict or lenient)
    #[arg(long, global = true)]
    pub validity_mode: Option<String>,

    /// Timeline granularity of whole-product overviews (day, month or year)
    #[arg(long, global = true)]
    pub timeline_period: Option<String>,

    /// Seconds to wait for the dataset index
    #[arg(long, global = true, value_name = "SECS")]
    pub index_timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Storage backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum StorageBackend {
    /// In-memory storage (default, overviews are lost on exit)
    Memory,
    /// PostgreSQL persistent storage
    Postgres,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate the overview for one product, year, month or day
    Generate(KeyArgs),

    /// Show a persisted overview
    Show(ShowArgs),

    /// Regenerate all overviews of one or more products
    Refresh(RefreshArgs),

    /// Flag the overviews of a product as out of date
    Stale(ProductArgs),

    /// List persisted overviews of a product
    List(ProductArgs),

    /// Remove all persisted overviews of a product
    Drop(DropArgs),

    /// Show resolved configuration values and their sources
    Config,

    /// Manage database operations
    Db(DbArgs),
}

/// Identifies one overview
#[derive(Args, Debug, Clone)]
pub struct KeyArgs {
    /// Product name
    pub product: String,

    #[arg(long)]
    pub year: Option<i32>,

    /// Requires --year
    #[arg(long, requires = "year")]
    pub month: Option<u32>,

    /// Requires --month
    #[arg(long, requires = "month")]
    pub day: Option<u32>,
}

impl KeyArgs {
    pub fn to_key(&self) -> explorer_core::Result<SummaryKey> {
        SummaryKey::new(self.product.clone(), self.year, self.month, self.day)
    }
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    #[command(flatten)]
    pub key: KeyArgs,

    /// Generate the overview when it is missing or stale
    #[arg(long)]
    pub update: bool,

    /// Include every timeline bucket, not only non-empty ones
    #[arg(long)]
    pub full_timeline: bool,
}

#[derive(Args, Debug)]
pub struct RefreshArgs {
    /// Products to refresh
    #[arg(required_unless_present = "all")]
    pub products: Vec<String>,

    /// Refresh every product in the dataset index
    #[arg(long, conflicts_with = "products")]
    pub all: bool,
}

#[derive(Args, Debug)]
pub struct ProductArgs {
    /// Product name
    pub product: String,
}

#[derive(Args, Debug)]
pub struct DropArgs {
    /// Product name
    pub product: String,

    /// Do not ask for confirmation
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(Args, Debug)]
pub struct DbArgs {
    #[command(subcommand)]
    pub command: DbCommand,
}

#[derive(Subcommand, Debug)]
pub enum DbCommand {
    /// Apply pending schema migrations
    Migrate,

    /// Show migration status
    Status,
}
