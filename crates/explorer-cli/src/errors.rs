use console::style;
use explorer_core::ExplorerError;
use std::fmt;

/// Enhanced error type with suggestions
pub struct CliError {
    pub message: String,
    pub context: Option<String>,
    pub suggestions: Vec<String>,
    pub help_command: Option<String>,
}

impl CliError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: None,
            suggestions: Vec::new(),
            help_command: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_help(mut self, command: impl Into<String>) -> Self {
        self.help_command = Some(command.into());
        self
    }

    pub fn display(&self) {
        eprintln!("{} {}\n", style("✗").red().bold(), style(&self.message).red().bold());

        if let Some(ref context) = self.context {
            eprintln!("{}", context);
            eprintln!();
        }

        if !self.suggestions.is_empty() {
            eprintln!("{}", style("To fix this:").yellow().bold());
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                eprintln!("  {}. {}", i + 1, suggestion);
            }
            eprintln!();
        }

        if let Some(ref help_cmd) = self.help_command {
            eprintln!("{} {}", style("Need help?").cyan(), style(help_cmd).cyan().bold());
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Debug for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Create error for database connection failure
pub fn database_connection_failed(database_url: &str, error: impl std::fmt::Display) -> CliError {
    let (host, port, database) = parse_database_url(database_url);
    CliError::new("Cannot connect to PostgreSQL")
        .with_context(format!(
            "Connection details:\n  Host: {}\n  Port: {}\n  Database: {}\n\nError: {}",
            host, port, database, error
        ))
        .with_suggestion("Ensure PostgreSQL is running")
        .with_suggestion("Set DATABASE_URL: export DATABASE_URL=\"postgresql://localhost/explorer\"")
        .with_suggestion("Apply the schema: explorer-gen db migrate")
        .with_help("Run: explorer-gen db --help")
}

/// Create error for a missing DATABASE_URL
pub fn database_not_configured(error: impl std::fmt::Display) -> CliError {
    CliError::new("PostgreSQL is not configured")
        .with_context(format!("Error: {}", error))
        .with_suggestion("Set DATABASE_URL: export DATABASE_URL=\"postgresql://localhost/explorer\"")
        .with_suggestion("Or use in-memory storage: --storage memory")
}

/// Create error for commands that need datasets but were given none
pub fn no_datasets() -> CliError {
    CliError::new("No dataset index")
        .with_context("This command reads datasets, but no dataset file was given.")
        .with_suggestion("Pass a GeoJSON FeatureCollection: --datasets datasets.geojson")
        .with_help("Run: explorer-gen --help")
}

/// Create error for an unreadable dataset file
pub fn dataset_file_invalid(path: &str, error: impl std::fmt::Display) -> CliError {
    CliError::new("Cannot load datasets")
        .with_context(format!("Path: {}\n\nError: {}", path, error))
        .with_suggestion("Check that the file is a GeoJSON FeatureCollection")
        .with_suggestion("Every feature needs 'product' and 'time' properties")
}

/// Create error for invalid configuration
pub fn invalid_config(key: &str, reason: &str) -> CliError {
    CliError::new(format!("Invalid configuration: {}", key))
        .with_context(format!("Configuration value is invalid.\n\nReason: {}", reason))
        .with_suggestion("Check explorer.toml for syntax errors")
        .with_suggestion("Inspect resolved values: explorer-gen config")
}

/// Convert anyhow::Error to CliError with context
pub fn from_anyhow(error: &anyhow::Error) -> CliError {
    if let Some(err) = error.downcast_ref::<ExplorerError>() {
        return from_explorer_error(err);
    }

    let message = format!("{:#}", error);
    if message.contains("No such file or directory") {
        CliError::new("File not found")
            .with_context(format!("Error: {}", message))
            .with_suggestion("Check the file path and try again")
    } else if message.contains("permission denied") {
        CliError::new("Permission denied")
            .with_context(format!("Error: {}", message))
            .with_suggestion("Check file permissions")
    } else {
        CliError::new(message)
    }
}

fn from_explorer_error(error: &ExplorerError) -> CliError {
    match error {
        ExplorerError::InvalidSummaryKey { key, reason } => {
            CliError::new(format!("Invalid key: {}", key))
                .with_context(reason.clone())
                .with_suggestion("Give --year, then optionally --month, then optionally --day")
        }
        ExplorerError::IndexUnavailable { reason } => CliError::new("Dataset index unavailable")
            .with_context(reason.clone())
            .with_suggestion("Retry, or raise --index-timeout"),
        ExplorerError::UnknownSpatialReference { srid } => {
            CliError::new(format!("Unknown spatial reference: EPSG:{}", srid))
                .with_suggestion("Choose a registered SRID with --target-srid")
        }
        ExplorerError::InconsistentGeometry { dataset_id, reason } => {
            CliError::new(format!("Invalid footprint in dataset {}", dataset_id))
                .with_context(reason.clone())
                .with_suggestion("Use --validity-mode lenient to skip invalid footprints")
        }
        ExplorerError::ConfigInvalid { key, reason } => invalid_config(key, reason),
        other => CliError::new(other.to_string()),
    }
}

/// Host, port and database name of a PostgreSQL URL, for error messages
fn parse_database_url(url: &str) -> (String, String, String) {
    let authority = url.split('@').nth(1).and_then(|s| s.split('/').next());

    let host = authority.and_then(|s| s.split(':').next()).unwrap_or("localhost").to_string();
    let port = authority.and_then(|s| s.split(':').nth(1)).unwrap_or("5432").to_string();
    let database = url
        .split('/')
        .next_back()
        .and_then(|s| s.split('?').next())
        .unwrap_or("explorer")
        .to_string();

    (host, port, database)
}
