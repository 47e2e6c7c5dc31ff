//! # Runtime Configuration
//!
//! Assembled from `RM_*` environment variables; every sub-crate's config
//! derives from this one place.
//!
//! | Variable | Meaning | Default |
//! |----------|---------|---------|
//! | `RM_DB_PATH` | RocksDB directory | `./data/registry-mirror` |
//! | `RM_CHAIN_ID` | Execution-layer chain id | required |
//! | `RM_LOCATOR_ADDRESS` | Locator contract address (hex) | required |
//! | `RM_MODULES` | Comma-separated module addresses (hex) | required |
//! | `RM_MODE` | `full-registry` or `used-only` | `full-registry` |
//! | `RM_POLL_CRON` | Cron expression for ticks (UTC) | unset |
//! | `RM_POLL_INTERVAL_SECS` | Fixed tick interval if no cron | `12` |
//! | `RM_FETCH_CONCURRENCY` | Concurrent operator fetches per pass | `4` |

use std::env;
use std::str::FromStr;
use std::time::Duration;

use rm_02_registry_storage::StorageConfig;
use rm_03_reconciler::{ReconcileMode, ReconcilerConfig, TransportConfig};
use rm_04_poller::PollSchedule;
use shared_types::{AppIdentity, ModuleAddress, H160};
use thiserror::Error;

use crate::adapters::rocksdb_store::RocksDbConfig;

/// Configuration errors raised at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required variable is unset.
    #[error("missing required environment variable {name}")]
    Missing { name: &'static str },

    /// A variable is set but unparseable.
    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Everything the runtime needs to assemble a mirror.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub db: RocksDbConfig,
    pub identity: AppIdentity,
    pub modules: Vec<ModuleAddress>,
    pub reconciler: ReconcilerConfig,
    pub transport: TransportConfig,
    pub storage: StorageConfig,
    pub schedule: PollSchedule,
}

impl RuntimeConfig {
    /// Load configuration from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let db = RocksDbConfig {
            path: env::var("RM_DB_PATH").unwrap_or_else(|_| "./data/registry-mirror".to_string()),
            ..Default::default()
        };

        let chain_id = required("RM_CHAIN_ID")?
            .parse::<u64>()
            .map_err(|e| invalid("RM_CHAIN_ID", e.to_string()))?;
        let locator_address = parse_address("RM_LOCATOR_ADDRESS", &required("RM_LOCATOR_ADDRESS")?)?;

        let modules_raw = required("RM_MODULES")?;
        let mut modules = Vec::new();
        for part in modules_raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            modules.push(parse_address("RM_MODULES", part)?);
        }
        if modules.is_empty() {
            return Err(invalid("RM_MODULES", "no module addresses given".to_string()));
        }

        let mode = match env::var("RM_MODE").as_deref() {
            Err(_) | Ok("full-registry") => ReconcileMode::FullRegistry,
            Ok("used-only") => ReconcileMode::UsedOnly,
            Ok(other) => {
                return Err(invalid(
                    "RM_MODE",
                    format!("{other:?} is not full-registry or used-only"),
                ))
            }
        };

        let fetch_concurrency = match env::var("RM_FETCH_CONCURRENCY") {
            Ok(raw) => raw
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| invalid("RM_FETCH_CONCURRENCY", format!("{raw:?}")))?,
            Err(_) => ReconcilerConfig::default().fetch_concurrency,
        };

        let schedule = match env::var("RM_POLL_CRON") {
            Ok(expr) => PollSchedule::cron(&expr)
                .map_err(|e| invalid("RM_POLL_CRON", e.to_string()))?,
            Err(_) => {
                let secs = match env::var("RM_POLL_INTERVAL_SECS") {
                    Ok(raw) => raw
                        .parse::<u64>()
                        .ok()
                        .filter(|n| *n > 0)
                        .ok_or_else(|| invalid("RM_POLL_INTERVAL_SECS", format!("{raw:?}")))?,
                    Err(_) => 12,
                };
                PollSchedule::Every(Duration::from_secs(secs))
            }
        };

        Ok(Self {
            db,
            identity: AppIdentity {
                chain_id,
                locator_address,
            },
            modules,
            reconciler: ReconcilerConfig {
                mode,
                fetch_concurrency,
            },
            transport: TransportConfig::default(),
            storage: StorageConfig::default(),
            schedule,
        })
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::Missing { name })
}

fn invalid(name: &'static str, reason: String) -> ConfigError {
    ConfigError::Invalid { name, reason }
}

fn parse_address(name: &'static str, raw: &str) -> Result<H160, ConfigError> {
    H160::from_str(raw.trim_start_matches("0x"))
        .map_err(|e| invalid(name, format!("{raw:?}: {e}")))
}
