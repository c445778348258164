//! Seed file loading for an empty store.

use crate::error::DishboardCoreError;
use crate::service::DishService;
use dishboard_protocol::CreateDish;
use log::info;
use std::fs;
use std::path::Path;

/// Read a JSON array of create bodies.
pub fn read_seed_file(path: impl AsRef<Path>) -> Result<Vec<CreateDish>, DishboardCoreError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .map_err(|err| DishboardCoreError::Store(err.into()))?;
    let requests: Vec<CreateDish> = serde_json::from_str(&contents)
        .map_err(|err| DishboardCoreError::Store(err.into()))?;
    info!(
        "read seed file (path={}, dishes={})",
        path.display(),
        requests.len()
    );
    Ok(requests)
}

/// Seed the store from a file when it holds no dishes yet.
///
/// Returns the number of inserted dishes; zero when the store was not empty.
pub fn seed_if_empty(
    service: &DishService,
    path: impl AsRef<Path>,
) -> Result<usize, DishboardCoreError> {
    if !service.list()?.is_empty() {
        info!("store not empty; skipping seed");
        return Ok(0);
    }
    let requests = read_seed_file(path)?;
    service.seed(requests)
}
