pub mod commands;
pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod ingest;
pub mod ledger;
pub mod logging;

use std::path::PathBuf;

use config::AppConfig;
use db::DbPool;
use error::AppError;
use ledger::{Ledger, MemoryLedger, SqliteLedger};

/// Everything a command needs for one run: immutable config, the ledger
/// pool and resolved directories. Built once at startup.
pub struct AppContext {
    pub config: AppConfig,
    pub pool: DbPool,
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Dry runs write artifacts but skip sends and ledger writes.
    pub dry_run: bool,
}

impl AppContext {
    pub fn init(
        config_path: Option<PathBuf>,
        data_dir: Option<PathBuf>,
        output_dir: Option<PathBuf>,
        dry_run: bool,
    ) -> Result<Self, AppError> {
        let data_dir = data_dir.unwrap_or_else(config::default_data_dir);
        let config = AppConfig::load(config_path.as_deref(), &data_dir)?;
        let pool = db::init_db(&data_dir)?;
        let output_dir = output_dir.unwrap_or_else(|| data_dir.join("output"));

        Ok(Self { config, pool, data_dir, output_dir, dry_run })
    }

    /// The run's ledger: durable normally, throwaway for dry runs.
    pub fn ledger(&self) -> Box<dyn Ledger> {
        if self.dry_run {
            Box::new(MemoryLedger::new())
        } else {
            Box::new(SqliteLedger::new(self.pool.clone()))
        }
    }

    /// The run's outbound channel: the configured command, or console.
    pub fn channel(&self) -> Result<Box<dyn engine::channel::MessageChannel>, AppError> {
        if self.dry_run {
            return Ok(Box::new(engine::channel::ConsoleChannel));
        }
        match &self.config.household.message_command {
            Some(argv) => Ok(Box::new(engine::channel::CommandChannel::new(argv.clone())?)),
            None => Ok(Box::new(engine::channel::ConsoleChannel)),
        }
    }
}
