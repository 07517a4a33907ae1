//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into core services. The
//! services never read process-wide environment variables while handling a request.

use crate::constants::{DEFAULT_AUTOSAVE_MS, DEFAULT_DATA_DIR, MAX_BATCH_OPS};
use crate::{StaffingError, StaffingResult};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Which record store implementation backs the services.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum StoreBackend {
    /// One JSON file per document under the data directory.
    #[default]
    File,
    /// Process-local and lost on exit.
    Memory,
}

impl FromStr for StoreBackend {
    type Err = StaffingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(StoreBackend::File),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(StaffingError::InvalidInput(format!(
                "unknown store backend '{other}' (expected 'file' or 'memory')"
            ))),
        }
    }
}

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    data_dir: PathBuf,
    store_backend: StoreBackend,
    max_batch_ops: usize,
    autosave_quiet_period: Duration,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns `StaffingError::InvalidInput` if:
    /// - `max_batch_ops` is zero or above [`MAX_BATCH_OPS`],
    /// - `autosave_quiet_period` is zero.
    pub fn new(
        data_dir: PathBuf,
        store_backend: StoreBackend,
        max_batch_ops: usize,
        autosave_quiet_period: Duration,
    ) -> StaffingResult<Self> {
        if max_batch_ops == 0 || max_batch_ops > MAX_BATCH_OPS {
            return Err(StaffingError::InvalidInput(format!(
                "max_batch_ops must be between 1 and {MAX_BATCH_OPS}, got {max_batch_ops}"
            )));
        }

        if autosave_quiet_period.is_zero() {
            return Err(StaffingError::InvalidInput(
                "autosave quiet period cannot be zero".into(),
            ));
        }

        Ok(Self {
            data_dir,
            store_backend,
            max_batch_ops,
            autosave_quiet_period,
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn store_backend(&self) -> StoreBackend {
        self.store_backend
    }

    pub fn max_batch_ops(&self) -> usize {
        self.max_batch_ops
    }

    pub fn autosave_quiet_period(&self) -> Duration {
        self.autosave_quiet_period
    }

    /// Build a configuration from raw environment values.
    ///
    /// Each argument is the optional value of the corresponding variable
    /// (`STAFFING_DATA_DIR`, `STAFFING_STORE`, `STAFFING_MAX_BATCH_OPS`,
    /// `STAFFING_AUTOSAVE_MS`). Missing or blank values fall back to the defaults.
    pub fn from_env_values(
        data_dir: Option<String>,
        store_backend: Option<String>,
        max_batch_ops: Option<String>,
        autosave_ms: Option<String>,
    ) -> StaffingResult<Self> {
        let data_dir = non_blank(data_dir)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

        let store_backend = non_blank(store_backend)
            .map(|v| v.parse::<StoreBackend>())
            .transpose()?
            .unwrap_or_default();

        let max_batch_ops = parse_number(max_batch_ops, "STAFFING_MAX_BATCH_OPS")?
            .map(|n| {
                usize::try_from(n).map_err(|_| {
                    StaffingError::InvalidInput(format!("STAFFING_MAX_BATCH_OPS out of range: {n}"))
                })
            })
            .transpose()?
            .unwrap_or(MAX_BATCH_OPS);

        let autosave_ms =
            parse_number(autosave_ms, "STAFFING_AUTOSAVE_MS")?.unwrap_or(DEFAULT_AUTOSAVE_MS);

        Self::new(
            data_dir,
            store_backend,
            max_batch_ops,
            Duration::from_millis(autosave_ms),
        )
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            store_backend: StoreBackend::default(),
            max_batch_ops: MAX_BATCH_OPS,
            autosave_quiet_period: Duration::from_millis(DEFAULT_AUTOSAVE_MS),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_number(value: Option<String>, name: &str) -> StaffingResult<Option<u64>> {
    non_blank(value)
        .map(|v| {
            v.parse::<u64>().map_err(|e| {
                StaffingError::InvalidInput(format!("{name} must be a whole number: {e}"))
            })
        })
        .transpose()
}
