use anyhow::Context;
use daf_config::DafConfig;
use daf_core::StaticTables;
use daf_engine::EngineOptions;

/// Loaded and validated configuration plus the static tables it points at.
pub struct Loaded {
    pub config: DafConfig,
    pub tables: StaticTables,
}

pub fn load() -> anyhow::Result<Loaded> {
    let config = DafConfig::load_with_dotenv().context("failed to load daf configuration")?;
    config.validate().context("invalid daf configuration")?;
    let tables = config.static_tables().context("failed to load static tables")?;
    tracing::debug!(
        segment_counts = tables.segment_counts.len(),
        data_dir = ?config.engine.data_dir,
        "configuration loaded"
    );
    Ok(Loaded { config, tables })
}

pub fn engine_options(config: &DafConfig) -> anyhow::Result<EngineOptions> {
    Ok(EngineOptions {
        link_depth: usize::try_from(config.engine.link_depth).context("engine.link_depth out of range")?,
        bulk_shard_size: config.engine.bulk_shard_size,
        max_edge_visits: config.engine.max_edge_visits,
    })
}
