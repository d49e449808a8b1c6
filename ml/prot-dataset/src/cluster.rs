//! Precomputed record → sequence cluster map.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{DatasetError, Result};

/// Opaque identifier of a sequence cluster.
///
/// Only equality and ordering matter. Numeric ids from the cluster file are
/// kept in their JSON text form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClusterId(String);

impl ClusterId {
    /// Creates a cluster id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ClusterId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ClusterId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Mapping from metadata record index to cluster id.
///
/// Produced offline by clustering the protein sequences (e.g. mmseqs at 30%
/// identity / 80% coverage). Loaded once and never modified.
///
/// # File Format
///
/// Either a JSON object keyed by record index or a JSON array whose position
/// is the record index. Ids may be strings or numbers:
///
/// ```json
/// {"0": "A0A024", "1": "A0A024", "2": 17}
/// ```
///
/// # Example
///
/// ```
/// use prot_dataset::ClusterMap;
///
/// let clusters = ClusterMap::from_pairs([(0, "A"), (1, "A"), (2, "B")]);
/// assert_eq!(clusters.len(), 3);
/// assert_eq!(clusters.get(2).map(|c| c.as_str()), Some("B"));
/// assert_eq!(clusters.num_clusters(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterMap {
    clusters: HashMap<usize, ClusterId>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ClusterFile {
    Keyed(HashMap<String, Value>),
    Positional(Vec<Value>),
}

impl ClusterMap {
    /// Builds a map from `(index, cluster)` pairs.
    pub fn from_pairs<I, C>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (usize, C)>,
        C: Into<ClusterId>,
    {
        Self {
            clusters: pairs
                .into_iter()
                .map(|(index, cluster)| (index, cluster.into()))
                .collect(),
        }
    }

    /// Loads a cluster map from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::ClusterMapLoad`] if the file is missing, is not
    /// valid JSON, has a non-integer key, or has an id that is neither a
    /// string nor a number.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|err| DatasetError::cluster_map_load(path, err))?;
        let file: ClusterFile = serde_json::from_str(&text)
            .map_err(|err| DatasetError::cluster_map_load(path, err))?;

        let pairs: Vec<(usize, Value)> = match file {
            ClusterFile::Keyed(map) => map
                .into_iter()
                .map(|(key, value)| {
                    key.parse::<usize>()
                        .map(|index| (index, value))
                        .map_err(|_| {
                            DatasetError::cluster_map_load(
                                path,
                                format!("record index '{key}' is not an integer"),
                            )
                        })
                })
                .collect::<Result<_>>()?,
            ClusterFile::Positional(values) => values.into_iter().enumerate().collect(),
        };

        let mut clusters = HashMap::with_capacity(pairs.len());
        for (index, value) in pairs {
            let id = match value {
                Value::String(s) => ClusterId(s),
                Value::Number(n) => ClusterId(n.to_string()),
                other => {
                    return Err(DatasetError::cluster_map_load(
                        path,
                        format!("record {index} has unsupported cluster id {other}"),
                    ));
                }
            };
            clusters.insert(index, id);
        }

        let map = Self { clusters };
        debug!(
            "Loaded cluster map with {} records in {} clusters from {}",
            map.len(),
            map.num_clusters(),
            path.display()
        );
        Ok(map)
    }

    /// Returns the cluster of record `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&ClusterId> {
        self.clusters.get(&index)
    }

    /// Returns the number of records in the map.
    #[must_use]
    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    /// Returns `true` if the map has no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    /// Returns the number of distinct clusters.
    #[must_use]
    pub fn num_clusters(&self) -> usize {
        let mut ids: Vec<&ClusterId> = self.clusters.values().collect();
        ids.sort_unstable();
        ids.dedup();
        ids.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn load_keyed_map() {
        let file = write_temp(r#"{"0": "A", "1": "A", "2": 17}"#);
        let map = ClusterMap::load(file.path()).unwrap();

        assert_eq!(map.len(), 3);
        assert_eq!(map.get(0), Some(&ClusterId::new("A")));
        assert_eq!(map.get(2), Some(&ClusterId::new("17")));
        assert_eq!(map.num_clusters(), 2);
    }

    #[test]
    fn load_positional_map() {
        let file = write_temp(r#"["x", "y", "x"]"#);
        let map = ClusterMap::load(file.path()).unwrap();

        assert_eq!(map.get(1).map(ClusterId::as_str), Some("y"));
        assert_eq!(map.num_clusters(), 2);
    }

    #[test]
    fn load_missing_file_fails() {
        let result = ClusterMap::load(Path::new("/nonexistent/clusters.json"));
        match result {
            Err(DatasetError::ClusterMapLoad { path, .. }) => {
                assert!(path.contains("clusters.json"));
            }
            other => panic!("expected ClusterMapLoad, got {other:?}"),
        }
    }

    #[test]
    fn load_invalid_json_fails() {
        let file = write_temp("not json");
        assert!(matches!(
            ClusterMap::load(file.path()),
            Err(DatasetError::ClusterMapLoad { .. })
        ));
    }

    #[test]
    fn load_non_integer_key_fails() {
        let file = write_temp(r#"{"first": "A"}"#);
        assert!(matches!(
            ClusterMap::load(file.path()),
            Err(DatasetError::ClusterMapLoad { .. })
        ));
    }

    #[test]
    fn load_unsupported_id_fails() {
        let file = write_temp(r#"{"0": [1, 2]}"#);
        assert!(matches!(
            ClusterMap::load(file.path()),
            Err(DatasetError::ClusterMapLoad { .. })
        ));
    }

    #[test]
    fn cluster_id_ordering() {
        assert!(ClusterId::new("A") < ClusterId::new("B"));
        assert_eq!(ClusterId::from("C").to_string(), "C");
    }
}
