//! Raw metadata records as read from the dataset JSON file.

use std::path::Path;

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{DatasetError, Result};

/// Key holding a record's split label.
pub const SPLIT_KEY: &str = "split";

/// One raw metadata entry: arbitrary string keys to JSON values.
pub type MetadataRecord = Map<String, Value>;

/// All metadata entries in file order. `null` entries stay in place so
/// record indices keep lining up with the cluster map.
pub type Metadata = Vec<Option<MetadataRecord>>;

/// Loads the metadata JSON file.
///
/// The file must hold a JSON array whose items are objects or `null`.
///
/// # Errors
///
/// Returns [`DatasetError::MetadataLoad`] with the path and the underlying
/// cause if the file cannot be read or parsed.
pub fn load_metadata(path: &Path) -> Result<Metadata> {
    let text =
        std::fs::read_to_string(path).map_err(|err| DatasetError::metadata_load(path, err))?;
    let metadata: Metadata =
        serde_json::from_str(&text).map_err(|err| DatasetError::metadata_load(path, err))?;
    debug!(
        "Loaded {} metadata records from {}",
        metadata.len(),
        path.display()
    );
    Ok(metadata)
}
