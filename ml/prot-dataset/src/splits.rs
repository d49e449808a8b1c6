//! Train/dev/test split assignment.
//!
//! Two strategies write a `split` field into every metadata record:
//!
//! - **Random**: each record draws its split independently from the
//!   configured probabilities.
//! - **Grouped by cluster**: whole sequence clusters are dealt to splits so
//!   near-duplicate proteins never straddle train and test.
//!
//! Both are deterministic for a fixed seed and input order.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use rand::SeedableRng;
use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::cluster::{ClusterId, ClusterMap};
use crate::config::DatasetConfig;
use crate::error::{DatasetError, Result};
use crate::metadata::{MetadataRecord, SPLIT_KEY};

/// Dataset partition a record belongs to.
///
/// # Example
///
/// ```
/// use prot_dataset::Split;
///
/// let split: Split = "dev".parse().unwrap();
/// assert_eq!(split, Split::Dev);
/// assert_eq!(split.name(), "dev");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Split {
    /// Training split.
    Train,
    /// Development (validation) split.
    #[serde(alias = "val", alias = "validation")]
    Dev,
    /// Held-out test split.
    Test,
}

impl Split {
    /// All splits in assignment order.
    pub const ALL: [Self; 3] = [Self::Train, Self::Dev, Self::Test];

    /// Returns the split name as stored in metadata.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Train => "train",
            Self::Dev => "dev",
            Self::Test => "test",
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Split {
    type Err = DatasetError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "train" => Ok(Self::Train),
            "dev" | "val" | "validation" => Ok(Self::Dev),
            "test" => Ok(Self::Test),
            other => Err(DatasetError::invalid_config(format!(
                "unknown split '{other}' (expected train, dev or test)"
            ))),
        }
    }
}

/// Fractions of records assigned to train, dev and test.
///
/// Always non-negative and summing to 1. Serialized as a plain
/// `[train, dev, test]` array.
///
/// # Example
///
/// ```
/// use prot_dataset::SplitProbabilities;
///
/// let probs = SplitProbabilities::try_new(0.7, 0.15, 0.15).unwrap();
/// assert!((probs.train() - 0.7).abs() < 1e-9);
///
/// assert!(SplitProbabilities::try_new(0.5, 0.5, 0.5).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 3]", into = "[f64; 3]")]
pub struct SplitProbabilities {
    train: f64,
    dev: f64,
    test: f64,
}

impl SplitProbabilities {
    const SUM_TOLERANCE: f64 = 1e-6;

    /// Creates split probabilities, validating them.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::InvalidSplitProbabilities`] if any value is
    /// negative or not finite, or if the values do not sum to 1.
    pub fn try_new(train: f64, dev: f64, test: f64) -> Result<Self> {
        let values = [train, dev, test];
        let valid = values.iter().all(|p| p.is_finite() && *p >= 0.0)
            && (values.iter().sum::<f64>() - 1.0).abs() <= Self::SUM_TOLERANCE;
        if !valid {
            return Err(DatasetError::InvalidSplitProbabilities(values));
        }
        Ok(Self { train, dev, test })
    }

    /// Returns the train fraction.
    #[must_use]
    pub const fn train(&self) -> f64 {
        self.train
    }

    /// Returns the dev fraction.
    #[must_use]
    pub const fn dev(&self) -> f64 {
        self.dev
    }

    /// Returns the test fraction.
    #[must_use]
    pub const fn test(&self) -> f64 {
        self.test
    }

    /// Returns the fractions as `[train, dev, test]`.
    #[must_use]
    pub const fn as_array(&self) -> [f64; 3] {
        [self.train, self.dev, self.test]
    }

    /// Returns the running totals `[train, train + dev, 1]`.
    #[must_use]
    pub fn cumulative(&self) -> [f64; 3] {
        [
            self.train,
            self.train + self.dev,
            self.train + self.dev + self.test,
        ]
    }

    /// Common 60/20/20 split.
    pub const SIXTY_TWENTY_TWENTY: Self = Self {
        train: 0.6,
        dev: 0.2,
        test: 0.2,
    };
}

impl Default for SplitProbabilities {
    fn default() -> Self {
        Self::SIXTY_TWENTY_TWENTY
    }
}

impl TryFrom<[f64; 3]> for SplitProbabilities {
    type Error = DatasetError;

    fn try_from(values: [f64; 3]) -> Result<Self> {
        Self::try_new(values[0], values[1], values[2])
    }
}

impl From<SplitProbabilities> for [f64; 3] {
    fn from(probs: SplitProbabilities) -> Self {
        probs.as_array()
    }
}

/// How splits are assigned when the metadata has none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SplitType {
    /// Independent draw per record.
    #[default]
    #[serde(rename = "random")]
    Random,

    /// Whole sequence clusters (mmseqs output) per split.
    #[serde(rename = "mmseqs", alias = "groupedByCluster")]
    Mmseqs,
}

impl SplitType {
    /// Returns the configuration name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Random => "random",
            Self::Mmseqs => "mmseqs",
        }
    }
}

impl fmt::Display for SplitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Split strategy together with the data it needs.
#[derive(Debug, Clone, Copy)]
pub enum SplitStrategy<'a> {
    /// Independent draw per record.
    Random,
    /// Whole clusters per split, using the given record → cluster map.
    GroupedByCluster(&'a ClusterMap),
}

/// Writes a `split` field into every non-null metadata record and returns
/// how many records were assigned.
///
/// # Arguments
///
/// - `metadata`: Records in file order; `None` entries are left untouched
/// - `probs`: Train/dev/test fractions
/// - `seed`: RNG seed; equal seeds and inputs give equal assignments
/// - `strategy`: Random or cluster-grouped assignment
///
/// # Errors
///
/// Returns [`DatasetError::MissingClusterAssignment`] when a record has no
/// entry in the cluster map.
///
/// # Example
///
/// ```
/// use prot_dataset::{assign_splits, MetadataRecord, SplitProbabilities, SplitStrategy};
///
/// let mut metadata: Vec<Option<MetadataRecord>> = vec![Some(MetadataRecord::new()); 5];
/// assign_splits(&mut metadata, SplitProbabilities::default(), 0, SplitStrategy::Random)
///     .unwrap();
///
/// assert!(metadata.iter().flatten().all(|r| r.contains_key("split")));
/// ```
pub fn assign_splits(
    metadata: &mut [Option<MetadataRecord>],
    probs: SplitProbabilities,
    seed: u64,
    strategy: SplitStrategy<'_>,
) -> Result<usize> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    match strategy {
        SplitStrategy::Random => assign_random(metadata, probs, &mut rng),
        SplitStrategy::GroupedByCluster(clusters) => {
            assign_grouped(metadata, probs, &mut rng, clusters)
        }
    }
}

/// Assigns splits using the strategy, probabilities and seed in `config`.
///
/// For [`SplitType::Mmseqs`] the cluster map is loaded from
/// [`DatasetConfig::resolved_cluster_map_path`].
///
/// # Errors
///
/// Returns [`DatasetError::ClusterMapLoad`] if the cluster map cannot be read,
/// plus any error from [`assign_splits`].
pub fn assign_configured_splits(
    metadata: &mut [Option<MetadataRecord>],
    config: &DatasetConfig,
) -> Result<usize> {
    match config.split_type {
        SplitType::Random => assign_splits(
            metadata,
            config.split_probs,
            config.split_seed,
            SplitStrategy::Random,
        ),
        SplitType::Mmseqs => {
            let clusters = ClusterMap::load(&config.resolved_cluster_map_path())?;
            assign_splits(
                metadata,
                config.split_probs,
                config.split_seed,
                SplitStrategy::GroupedByCluster(&clusters),
            )
        }
    }
}

fn assign_random(
    metadata: &mut [Option<MetadataRecord>],
    probs: SplitProbabilities,
    rng: &mut ChaCha8Rng,
) -> Result<usize> {
    let dist = WeightedIndex::new(probs.as_array())
        .map_err(|_| DatasetError::InvalidSplitProbabilities(probs.as_array()))?;

    let mut assigned = 0;
    for record in metadata.iter_mut().flatten() {
        let split = Split::ALL[dist.sample(rng)];
        set_split(record, split);
        assigned += 1;
    }

    debug!("Randomly assigned splits to {} records", assigned);
    Ok(assigned)
}

fn assign_grouped(
    metadata: &mut [Option<MetadataRecord>],
    probs: SplitProbabilities,
    rng: &mut ChaCha8Rng,
    clusters: &ClusterMap,
) -> Result<usize> {
    // Count records per cluster, in sorted cluster order so the shuffle
    // below only depends on the seed.
    let mut counts: BTreeMap<&ClusterId, usize> = BTreeMap::new();
    for (index, record) in metadata.iter().enumerate() {
        if record.is_none() {
            continue;
        }
        let cluster = clusters
            .get(index)
            .ok_or(DatasetError::missing_cluster_assignment(index))?;
        *counts.entry(cluster).or_insert(0) += 1;
    }

    let mut order: Vec<&ClusterId> = counts.keys().copied().collect();
    order.shuffle(rng);

    let sizes: Vec<usize> = order.iter().map(|id| counts[id]).collect();
    let bounds = cluster_boundaries(&sizes, probs);

    let mut cluster_split: HashMap<&ClusterId, Split> = HashMap::with_capacity(order.len());
    for (i, split) in Split::ALL.iter().enumerate() {
        for cluster in &order[bounds[i]..bounds[i + 1]] {
            cluster_split.insert(*cluster, *split);
        }
    }

    let mut assigned = 0;
    for (index, record) in metadata.iter_mut().enumerate() {
        let Some(record) = record else { continue };
        let split = clusters
            .get(index)
            .and_then(|cluster| cluster_split.get(cluster))
            .ok_or(DatasetError::missing_cluster_assignment(index))?;
        set_split(record, *split);
        assigned += 1;
    }

    info!(
        "Assigned {} clusters to splits (train: {}, dev: {}, test: {})",
        order.len(),
        bounds[1] - bounds[0],
        bounds[2] - bounds[1],
        bounds[3] - bounds[2]
    );
    Ok(assigned)
}

/// Computes where each split starts in the shuffled cluster list.
///
/// Returns `[0, train_end, dev_end, n]`. Each end is the number of leading
/// clusters whose cumulative record count does not exceed the cumulative
/// fraction of all records, so a cluster that lands exactly on a boundary
/// stays in the earlier split. The last end is always `n`.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn cluster_boundaries(sizes: &[usize], probs: SplitProbabilities) -> [usize; 4] {
    let cumsum: Vec<usize> = sizes
        .iter()
        .scan(0usize, |acc, &size| {
            *acc += size;
            Some(*acc)
        })
        .collect();
    let total = cumsum.last().copied().unwrap_or(0) as f64;
    let n = sizes.len();

    let mut bounds = [0, 0, 0, n];
    for (i, q) in probs.cumulative().iter().take(2).enumerate() {
        let q = (q * 1000.0).round() / 1000.0;
        let threshold = q * total;
        bounds[i + 1] = cumsum.partition_point(|&c| c as f64 <= threshold).min(n);
    }
    bounds[2] = bounds[2].max(bounds[1]);
    bounds
}

fn set_split(record: &mut MetadataRecord, split: Split) {
    record.insert(SPLIT_KEY.to_string(), Value::String(split.name().to_string()));
}

/// Number of records per split in a metadata collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SplitCounts {
    /// Records labelled `train`.
    pub train: usize,
    /// Records labelled `dev`.
    pub dev: usize,
    /// Records labelled `test`.
    pub test: usize,
    /// Non-null records with no (or an unrecognised) split.
    pub unassigned: usize,
}

impl SplitCounts {
    /// Returns the count for one split.
    #[must_use]
    pub const fn get(&self, split: Split) -> usize {
        match split {
            Split::Train => self.train,
            Split::Dev => self.dev,
            Split::Test => self.test,
        }
    }

    /// Returns the number of records with a split.
    #[must_use]
    pub const fn assigned(&self) -> usize {
        self.train + self.dev + self.test
    }
}

/// Tallies the `split` field of every non-null record.
#[must_use]
pub fn split_counts(metadata: &[Option<MetadataRecord>]) -> SplitCounts {
    let mut counts = SplitCounts::default();
    for record in metadata.iter().flatten() {
        match record_split(record) {
            Some(Split::Train) => counts.train += 1,
            Some(Split::Dev) => counts.dev += 1,
            Some(Split::Test) => counts.test += 1,
            None => counts.unassigned += 1,
        }
    }
    counts
}

/// Reads the split label of a record, if it has a valid one.
#[must_use]
pub fn record_split(record: &MetadataRecord) -> Option<Split> {
    record
        .get(SPLIT_KEY)
        .and_then(Value::as_str)
        .and_then(|s| s.parse().ok())
}
