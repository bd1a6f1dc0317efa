//! Durable client preferences.
//!
//! Two values are kept per user: the selected page size, shared by every
//! grid, and the visible columns of each grid, stored under a key
//! namespaced by the grid's table id.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde_json::Value;

use crate::config::GridConfig;
use crate::{Error, Result};

/// Key of the page-size preference.
pub const PER_PAGE_KEY: &str = "tablegrid_perpage";

/// Prefix of the per-grid column-visibility keys.
pub const COLUMNS_KEY_PREFIX: &str = "tablegrid_columns";

/// Returns the column-visibility key for a grid.
#[must_use]
pub fn columns_key(table_id: &str) -> String {
    format!("{COLUMNS_KEY_PREFIX}:{table_id}")
}

/// String key-value storage that outlives the controller.
pub trait PreferenceStore: Send + Sync {
    /// Reads a value.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Writes a value.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

impl<T: PreferenceStore> PreferenceStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }
}

/// In-process store, lost when dropped.
#[derive(Debug, Default)]
pub struct MemoryPreferences {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryPreferences {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn values(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.values
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl PreferenceStore for MemoryPreferences {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Store backed by a JSON object file.
///
/// Every read goes to disk, so several processes sharing the file see each
/// other's writes.
#[derive(Debug)]
pub struct FilePreferences {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FilePreferences {
    /// Creates a store at `path`; the file is created on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Creates a store in the platform data directory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OperationFailed`] if no home directory is known.
    pub fn in_data_dir() -> Result<Self> {
        let dirs = directories::ProjectDirs::from("", "", "tablegrid").ok_or_else(|| {
            Error::OperationFailed {
                operation: "resolve_data_dir".to_string(),
                cause: "no home directory".to_string(),
            }
        })?;
        Ok(Self::new(dirs.data_dir().join("preferences.json")))
    }

    /// Returns the file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<serde_json::Map<String, Value>> {
        if !self.path.exists() {
            return Ok(serde_json::Map::new());
        }
        let contents = std::fs::read_to_string(&self.path).map_err(|e| self.io_error("read", &e))?;
        if contents.trim().is_empty() {
            return Ok(serde_json::Map::new());
        }
        serde_json::from_str(&contents).map_err(|e| Error::OperationFailed {
            operation: "parse_preferences".to_string(),
            cause: format!("{}: {e}", self.path.display()),
        })
    }

    fn io_error(&self, operation: &str, e: &std::io::Error) -> Error {
        Error::OperationFailed {
            operation: format!("{operation}_preferences"),
            cause: format!("{}: {e}", self.path.display()),
        }
    }
}

impl PreferenceStore for FilePreferences {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .read_all()?
            .get(key)
            .and_then(Value::as_str)
            .map(ToString::to_string))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        let mut values = self.read_all()?;
        values.insert(key.to_string(), Value::String(value.to_string()));

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error("create_dir", &e))?;
        }
        let json = serde_json::to_string_pretty(&values).map_err(|e| Error::OperationFailed {
            operation: "serialize_preferences".to_string(),
            cause: e.to_string(),
        })?;
        std::fs::write(&self.path, json).map_err(|e| self.io_error("write", &e))
    }
}

/// Returns the stored page size if it is one of the grid's options, else
/// the grid's default.
pub fn load_per_page(store: &impl PreferenceStore, config: &GridConfig) -> i64 {
    let stored = match store.get(PER_PAGE_KEY) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read page-size preference");
            None
        },
    };
    stored
        .and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|n| config.per_page_options.contains(n))
        .unwrap_or(config.default_per_page)
}

/// Stores the page size.
///
/// # Errors
///
/// Returns an error if the store cannot be written.
pub fn save_per_page(store: &impl PreferenceStore, per_page: i64) -> Result<()> {
    store.set(PER_PAGE_KEY, &per_page.to_string())
}

/// Returns the grid's visible columns in configuration order.
///
/// The stored value is a JSON array of visible field names. An older
/// format, a JSON object mapping field to a "hidden" flag, is converted
/// and written back as an array. Anything unreadable means every column is
/// visible.
pub fn load_visible_columns(store: &impl PreferenceStore, config: &GridConfig) -> Vec<String> {
    let key = columns_key(&config.table_id);
    let stored = match store.get(&key) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(table_id = %config.table_id, error = %e, "Failed to read column preference");
            None
        },
    };
    let Some(value) = stored.and_then(|raw| serde_json::from_str::<Value>(&raw).ok()) else {
        return config.columns.clone();
    };

    match value {
        Value::Array(items) => {
            let visible: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
            config
                .columns
                .iter()
                .filter(|c| visible.contains(&c.as_str()))
                .cloned()
                .collect()
        },
        Value::Object(hidden) => {
            let visible: Vec<String> = config
                .columns
                .iter()
                .filter(|c| !hidden.get(c.as_str()).is_some_and(is_truthy))
                .cloned()
                .collect();
            if let Err(e) = save_visible_columns(store, &config.table_id, &visible) {
                tracing::warn!(table_id = %config.table_id, error = %e, "Failed to migrate column preference");
            } else {
                tracing::debug!(table_id = %config.table_id, "Migrated legacy column preference");
            }
            visible
        },
        _ => config.columns.clone(),
    }
}

/// Stores the visible columns as a JSON array.
///
/// # Errors
///
/// Returns an error if the store cannot be written.
pub fn save_visible_columns(
    store: &impl PreferenceStore,
    table_id: &str,
    visible: &[String],
) -> Result<()> {
    let json = serde_json::to_string(visible).map_err(|e| Error::OperationFailed {
        operation: "serialize_columns".to_string(),
        cause: e.to_string(),
    })?;
    store.set(&columns_key(table_id), &json)
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
