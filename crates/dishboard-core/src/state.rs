//! Record store for dishes: an in-memory map and a JSONL-backed log.

use chrono::{DateTime, Utc};
use dishboard_config::StoreBackend;
use dishboard_protocol::{Dish, DishId, DishPatch, sort_by_name};
use log::{debug, info, warn};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Log file name inside a JSONL store directory.
const LOG_FILE: &str = "dishes.jsonl";
/// Current log schema version.
const SCHEMA_VERSION: u32 = 1;

/// Validated input for inserting a dish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDish {
    pub dish_id: DishId,
    pub dish_name: String,
    pub image_url: String,
    pub is_published: bool,
}

impl NewDish {
    /// Stamp store-managed timestamps onto the new record.
    fn into_dish(self, now: DateTime<Utc>) -> Dish {
        Dish {
            dish_id: self.dish_id,
            dish_name: self.dish_name,
            image_url: self.image_url,
            is_published: self.is_published,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Persistent store abstraction for dish records.
///
/// Single-document writes are atomic; nothing spans documents.
pub trait DishStore: Send + Sync {
    /// All live records in display order.
    fn list(&self) -> Result<Vec<Dish>, StoreError>;
    /// Look up one record.
    fn get(&self, dish_id: &str) -> Result<Option<Dish>, StoreError>;
    /// Insert a record, failing with `DuplicateId` when the id is live.
    fn insert(&self, dish: NewDish) -> Result<Dish, StoreError>;
    /// Apply a patch; `None` when no record matches.
    fn update(&self, dish_id: &str, patch: &DishPatch) -> Result<Option<Dish>, StoreError>;
    /// Remove a record; `false` when no record matches.
    fn delete(&self, dish_id: &str) -> Result<bool, StoreError>;
}

/// Errors returned by the record store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("unsupported schema version: {0}")]
    UnsupportedSchema(u32),
    #[error("missing schema header in {0}")]
    MissingHeader(PathBuf),
    #[error("duplicate dish id: {0}")]
    DuplicateId(DishId),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Next `updated_at` for a record, never earlier than the previous one.
pub fn next_updated_at(previous: DateTime<Utc>) -> DateTime<Utc> {
    Utc::now().max(previous)
}

/// Open the store selected by configuration.
pub fn open_store(backend: &StoreBackend) -> Result<Arc<dyn DishStore>, StoreError> {
    match backend {
        StoreBackend::Memory => Ok(Arc::new(MemoryDishStore::new())),
        StoreBackend::Jsonl { path } => Ok(Arc::new(JsonlDishStore::open(path)?)),
    }
}

fn sorted(dishes: impl Iterator<Item = Dish>) -> Vec<Dish> {
    let mut dishes: Vec<Dish> = dishes.collect();
    sort_by_name(&mut dishes);
    dishes
}

/// Process-local store; contents are lost on exit.
#[derive(Default)]
pub struct MemoryDishStore {
    dishes: RwLock<HashMap<DishId, Dish>>,
}

impl MemoryDishStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DishStore for MemoryDishStore {
    fn list(&self) -> Result<Vec<Dish>, StoreError> {
        Ok(sorted(self.dishes.read().values().cloned()))
    }

    fn get(&self, dish_id: &str) -> Result<Option<Dish>, StoreError> {
        Ok(self.dishes.read().get(dish_id).cloned())
    }

    fn insert(&self, dish: NewDish) -> Result<Dish, StoreError> {
        let mut dishes = self.dishes.write();
        if dishes.contains_key(&dish.dish_id) {
            return Err(StoreError::DuplicateId(dish.dish_id));
        }
        let dish = dish.into_dish(Utc::now());
        dishes.insert(dish.dish_id.clone(), dish.clone());
        Ok(dish)
    }

    fn update(&self, dish_id: &str, patch: &DishPatch) -> Result<Option<Dish>, StoreError> {
        let mut dishes = self.dishes.write();
        let Some(dish) = dishes.get_mut(dish_id) else {
            return Ok(None);
        };
        patch.apply_to(dish);
        dish.updated_at = next_updated_at(dish.updated_at);
        Ok(Some(dish.clone()))
    }

    fn delete(&self, dish_id: &str) -> Result<bool, StoreError> {
        Ok(self.dishes.write().remove(dish_id).is_some())
    }
}

/// Internal JSONL log record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum LogRecord {
    SchemaVersion { version: u32 },
    DishUpserted { dish: Dish },
    DishDeleted { dish_id: DishId },
}

struct JsonlInner {
    dishes: HashMap<DishId, Dish>,
    file: File,
}

impl JsonlInner {
    /// Append a record and flush; the in-memory view is only touched after
    /// the line is written.
    fn append(&mut self, record: &LogRecord) -> Result<(), StoreError> {
        let line = serde_json::to_string(record)?;
        writeln!(self.file, "{line}")?;
        self.file.flush()?;
        Ok(())
    }
}

/// JSONL-backed store: an append-only log replayed into memory on open.
pub struct JsonlDishStore {
    /// Location of the log file.
    path: PathBuf,
    /// Serialize access to the log and the replayed records.
    inner: Mutex<JsonlInner>,
}

impl JsonlDishStore {
    /// Open (or create) a store under the given directory.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, StoreError> {
        let root = root.as_ref();
        fs::create_dir_all(root)?;
        let path = root.join(LOG_FILE);
        let dishes = if path.exists() {
            replay(&path)?
        } else {
            let mut file = OpenOptions::new()
                .create_new(true)
                .write(true)
                .open(&path)?;
            let header = serde_json::to_string(&LogRecord::SchemaVersion {
                version: SCHEMA_VERSION,
            })?;
            writeln!(file, "{header}")?;
            HashMap::new()
        };
        let file = OpenOptions::new().append(true).open(&path)?;
        info!(
            "opened JSONL dish store (path={}, dishes={})",
            path.display(),
            dishes.len()
        );
        Ok(Self {
            path,
            inner: Mutex::new(JsonlInner { dishes, file }),
        })
    }

    /// Location of the backing log file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Rebuild the live record set from a log file.
///
/// A final record cut short by a crash is dropped and the file is truncated
/// back to the last complete record. Corruption before the last line fails.
fn replay(path: &Path) -> Result<HashMap<DishId, Dish>, StoreError> {
    let bytes = fs::read(path)?;
    let mut version = None;
    let mut dishes = HashMap::new();
    let mut offset = 0;
    let mut needs_newline = !bytes.is_empty() && !bytes.ends_with(b"\n");
    while offset < bytes.len() {
        let start = offset;
        offset = bytes[start..]
            .iter()
            .position(|byte| *byte == b'\n')
            .map_or(bytes.len(), |index| start + index + 1);
        let line = &bytes[start..offset];
        if line.trim_ascii().is_empty() {
            continue;
        }
        let record = match serde_json::from_slice::<LogRecord>(line) {
            Ok(record) => record,
            Err(err)
                if (err.is_eof() || err.is_syntax()) && bytes[offset..].trim_ascii().is_empty() =>
            {
                warn!(
                    "dropping torn record at end of dish log (path={}, offset={}, error={})",
                    path.display(),
                    start,
                    err
                );
                OpenOptions::new()
                    .write(true)
                    .open(path)?
                    .set_len(start as u64)?;
                needs_newline = false;
                break;
            }
            Err(err) => return Err(err.into()),
        };
        match record {
            LogRecord::SchemaVersion { version: found } => {
                if found > SCHEMA_VERSION {
                    return Err(StoreError::UnsupportedSchema(found));
                }
                version = Some(found);
            }
            LogRecord::DishUpserted { dish } => {
                dishes.insert(dish.dish_id.clone(), dish);
            }
            LogRecord::DishDeleted { dish_id } => {
                dishes.remove(&dish_id);
            }
        }
    }
    if needs_newline {
        let mut file = OpenOptions::new().append(true).open(path)?;
        writeln!(file)?;
    }
    if version.is_none() {
        return Err(StoreError::MissingHeader(path.to_path_buf()));
    }
    debug!(
        "replayed dish log (path={}, dishes={})",
        path.display(),
        dishes.len()
    );
    Ok(dishes)
}

impl DishStore for JsonlDishStore {
    fn list(&self) -> Result<Vec<Dish>, StoreError> {
        Ok(sorted(self.inner.lock().dishes.values().cloned()))
    }

    fn get(&self, dish_id: &str) -> Result<Option<Dish>, StoreError> {
        Ok(self.inner.lock().dishes.get(dish_id).cloned())
    }

    fn insert(&self, dish: NewDish) -> Result<Dish, StoreError> {
        let mut inner = self.inner.lock();
        if inner.dishes.contains_key(&dish.dish_id) {
            return Err(StoreError::DuplicateId(dish.dish_id));
        }
        let dish = dish.into_dish(Utc::now());
        inner.append(&LogRecord::DishUpserted { dish: dish.clone() })?;
        inner.dishes.insert(dish.dish_id.clone(), dish.clone());
        Ok(dish)
    }

    fn update(&self, dish_id: &str, patch: &DishPatch) -> Result<Option<Dish>, StoreError> {
        let mut inner = self.inner.lock();
        let Some(mut dish) = inner.dishes.get(dish_id).cloned() else {
            return Ok(None);
        };
        patch.apply_to(&mut dish);
        dish.updated_at = next_updated_at(dish.updated_at);
        inner.append(&LogRecord::DishUpserted { dish: dish.clone() })?;
        inner.dishes.insert(dish.dish_id.clone(), dish.clone());
        Ok(Some(dish))
    }

    fn delete(&self, dish_id: &str) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock();
        if !inner.dishes.contains_key(dish_id) {
            warn!("dish not found for delete (dish_id={})", dish_id);
            return Ok(false);
        }
        inner.append(&LogRecord::DishDeleted {
            dish_id: dish_id.to_string(),
        })?;
        inner.dishes.remove(dish_id);
        Ok(true)
    }
}
