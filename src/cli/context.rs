//! Wiring from configuration to a ready engine.

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::adapters::catalog::catalog_from_config;
use crate::adapters::sqlite::{initialize_database, SqliteAttemptLedger, SqlitePracticeStateRepository};
use crate::domain::models::Config;
use crate::services::{EngineSettings, PracticeEngine};

/// Everything a command needs: the config, the ledger and the engine.
pub struct AppContext {
    pub config: Config,
    pub ledger: Arc<SqliteAttemptLedger>,
    pub engine: PracticeEngine,
}

impl AppContext {
    pub async fn open(config: Config) -> Result<Self> {
        let pool = initialize_database(&config.database)
            .await
            .with_context(|| format!("Failed to open database at {}. Run 'zero-coach init' first.", config.database.path))?;

        let ledger = Arc::new(SqliteAttemptLedger::new(pool.clone()));
        let states = Arc::new(SqlitePracticeStateRepository::new(pool));
        let catalog = catalog_from_config(&config.catalog).context("Invalid catalog configuration")?;

        let settings = EngineSettings {
            engine: config.engine.clone(),
            session_key: config.session_key.clone(),
            legal_mode: config.legal_mode,
        };
        let engine = PracticeEngine::new(catalog, ledger.clone(), states, settings);

        Ok(Self { config, ledger, engine })
    }
}
