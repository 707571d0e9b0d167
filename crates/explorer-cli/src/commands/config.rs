//! Config command implementation

use anyhow::Result;
use explorer_core::config::LayeredConfig;

use crate::config_loader::DEFAULT_CONFIG_FILE;
use crate::output::OutputWriter;
use crate::output_types::ConfigRow;

pub fn execute(config: &LayeredConfig, output: &OutputWriter) -> Result<()> {
    let mut rows: Vec<ConfigRow> = config
        .to_inspection_map()
        .into_iter()
        .map(|(key, (value, source))| ConfigRow { key, value, source: format!("{:?}", source) })
        .collect();

    // Sort by key for consistent output
    rows.sort_by(|a, b| a.key.cmp(&b.key));

    output.section("Configuration Values");
    output.table(rows);

    output.section("Configuration Precedence");
    output.info(format!(
        "CLI arguments > Environment variables > Config file ({}) > Defaults",
        DEFAULT_CONFIG_FILE
    ));
    Ok(())
}
