//! Decides which original records get duplicated and how many times.

use crate::error::ConfigError;
use crate::selector::WeightedSelector;
use rand::Rng;
use rand_core::RngCore;
use serde::Deserialize;

/// Suffix marking an original record id, replaced by `-dup-<k>` in its duplicates.
pub const ORIGINAL_ID_SUFFIX: &str = "-org";

/// Distribution of the number of duplicates generated for one original.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicateDistribution {
    #[default]
    Uniform,
    /// Poisson with rate 1, shifted so the smallest count is 1.
    Poisson,
    /// Count `k` weighted by `1 / k`.
    Zipf,
}

impl DuplicateDistribution {
    /// Normalized probabilities of the counts `1..=max`.
    pub fn weights(self, max: usize) -> Vec<f64> {
        let raw: Vec<f64> = match self {
            DuplicateDistribution::Uniform => vec![1.0; max],
            DuplicateDistribution::Poisson => {
                let mut weight = 1.0;
                (1..=max)
                    .map(|k| {
                        let current = weight;
                        weight /= k as f64;
                        current
                    })
                    .collect()
            }
            DuplicateDistribution::Zipf => (1..=max).map(|k| 1.0 / k as f64).collect(),
        };
        let total: f64 = raw.iter().sum();
        raw.into_iter().map(|w| w / total).collect()
    }
}

/// Plans the duplicate counts for a data set of originals.
#[derive(Debug, Clone)]
pub struct DuplicatePlanner {
    max_duplicates_per_record: usize,
    counts: WeightedSelector<usize>,
}

impl DuplicatePlanner {
    pub fn new(
        distribution: DuplicateDistribution,
        max_duplicates_per_record: usize,
    ) -> Result<Self, ConfigError> {
        if max_duplicates_per_record == 0 {
            return Err(ConfigError::invalid(
                "max_duplicates_per_record",
                "at least one duplicate per record must be allowed",
            ));
        }
        let weights = distribution.weights(max_duplicates_per_record);
        let counts = WeightedSelector::new(
            "duplicate counts",
            weights.into_iter().zip(1..=max_duplicates_per_record).collect(),
        )?;
        Ok(Self {
            max_duplicates_per_record,
            counts,
        })
    }

    pub fn max_duplicates_per_record(&self) -> usize {
        self.max_duplicates_per_record
    }

    /// Picks distinct originals uniformly at random and assigns each a
    /// duplicate count until `num_duplicates` are planned.
    ///
    /// Counts are capped by what remains and raised where the originals still
    /// left could not absorb the rest otherwise.
    pub fn plan(
        &self,
        original_ids: &[String],
        num_duplicates: usize,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<(String, usize)>, ConfigError> {
        let capacity = original_ids.len().saturating_mul(self.max_duplicates_per_record);
        if num_duplicates > capacity {
            return Err(ConfigError::invalid(
                "num_duplicates",
                format!(
                    "{} originals with at most {} duplicates each cannot yield {} duplicates",
                    original_ids.len(),
                    self.max_duplicates_per_record,
                    num_duplicates
                ),
            ));
        }

        let mut pool: Vec<&String> = original_ids.iter().collect();
        let mut remaining = num_duplicates;
        let mut plan = Vec::new();
        while remaining > 0 {
            let id = pool.swap_remove(rng.random_range(0..pool.len()));
            let floor = remaining.saturating_sub(pool.len() * self.max_duplicates_per_record);
            let count = (*self.counts.select(rng)).max(floor).min(remaining);
            plan.push((id.clone(), count));
            remaining -= count;
        }
        Ok(plan)
    }
}

/// Id of the `k`-th duplicate (counting from 0) of `original_id`.
///
/// `rec-12-org` becomes `rec-12-dup-0`; ids without the `-org` suffix get
/// `-dup-<k>` appended.
pub fn duplicate_id(original_id: &str, k: usize) -> String {
    let stem = original_id
        .strip_suffix(ORIGINAL_ID_SUFFIX)
        .unwrap_or(original_id);
    format!("{stem}-dup-{k}")
}
