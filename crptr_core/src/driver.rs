//! Per-record orchestration: which attributes of a duplicate get modified,
//! by which corruptor, and how often.

use crate::duplicates::{DuplicatePlanner, duplicate_id};
use crate::error::ConfigError;
use crate::record::{AttributeSchema, Record, RecordCorruptor};
use crate::selector::WeightedSelector;
use crate::value::ValueCorruptor;
use rand_core::RngCore;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, trace};

/// Either kind of corruptor. Cheap to clone, so one configured instance can
/// serve several attribute policies.
#[derive(Debug, Clone)]
pub enum Corruptor {
    Value(Arc<dyn ValueCorruptor>),
    Record(Arc<dyn RecordCorruptor>),
}

impl Corruptor {
    pub fn name(&self) -> &str {
        match self {
            Corruptor::Value(c) => c.name(),
            Corruptor::Record(c) => c.name(),
        }
    }

    /// Applies the corruptor on behalf of attribute `attribute`.
    /// Record corruptors rewrite the whole record.
    pub fn apply(&self, record: &Record, attribute: usize, rng: &mut dyn RngCore) -> Record {
        match self {
            Corruptor::Value(c) => {
                let corrupted = c.corrupt(record.get(attribute), rng);
                record.with_value(attribute, corrupted)
            }
            Corruptor::Record(c) => c.corrupt(record, rng),
        }
    }
}

/// How likely each attribute is to be picked for a modification and, once
/// picked, which corruptor modifies it.
#[derive(Debug, Clone)]
pub struct ModificationPolicy {
    schema: Arc<AttributeSchema>,
    attributes: WeightedSelector<usize>,
    corruptors: Vec<Option<WeightedSelector<Corruptor>>>,
}

impl ModificationPolicy {
    /// `attribute_weights` must form a distribution over schema attributes.
    /// Every attribute with a positive weight needs a corruptor list whose
    /// weights sum to 1.0. Record corruptors may only be listed for the
    /// record marker attribute and value corruptors only for the others.
    pub fn new(
        schema: Arc<AttributeSchema>,
        attribute_weights: Vec<(String, f64)>,
        attribute_corruptors: Vec<(String, Vec<(f64, Corruptor)>)>,
    ) -> Result<Self, ConfigError> {
        let mut seen = vec![false; schema.len()];
        let mut weighted = Vec::with_capacity(attribute_weights.len());
        for (name, weight) in attribute_weights {
            let idx = schema.require(&name)?;
            if std::mem::replace(&mut seen[idx], true) {
                return Err(ConfigError::DuplicateAttribute(name));
            }
            weighted.push((weight, idx));
        }
        let attributes = WeightedSelector::new("attribute selection", weighted)?;

        let mut corruptors: Vec<Option<WeightedSelector<Corruptor>>> =
            (0..schema.len()).map(|_| None).collect();
        for (name, list) in attribute_corruptors {
            let idx = schema.require(&name)?;
            if corruptors[idx].is_some() {
                return Err(ConfigError::DuplicateAttribute(name));
            }
            let is_marker = schema.marker() == Some(idx);
            for (_, corruptor) in &list {
                match (corruptor, is_marker) {
                    (Corruptor::Record(_), false) => {
                        return Err(ConfigError::MisplacedCorruptor {
                            attribute: name,
                            corruptor: corruptor.name().to_string(),
                            reason: "record corruptors only apply to the record marker attribute",
                        });
                    }
                    (Corruptor::Value(_), true) => {
                        return Err(ConfigError::MisplacedCorruptor {
                            attribute: name,
                            corruptor: corruptor.name().to_string(),
                            reason: "the record marker attribute only takes record corruptors",
                        });
                    }
                    _ => {}
                }
            }
            let context = format!("corruptors of attribute '{}'", name);
            corruptors[idx] = Some(WeightedSelector::new(&context, list)?);
        }

        for &idx in attributes.reachable() {
            if corruptors[idx].is_none() {
                return Err(ConfigError::EmptyDistribution(format!(
                    "corruptors of attribute '{}'",
                    schema.name(idx)
                )));
            }
        }

        Ok(Self {
            schema,
            attributes,
            corruptors,
        })
    }

    pub fn schema(&self) -> &Arc<AttributeSchema> {
        &self.schema
    }

    /// Number of attributes that can be picked at all.
    pub fn modifiable_attributes(&self) -> usize {
        self.attributes.reachable().count()
    }

    pub fn select_attribute(&self, rng: &mut dyn RngCore) -> usize {
        *self.attributes.select(rng)
    }

    /// Picks a corruptor for `attribute`, or `None` if it has no corruptor list.
    pub fn select_corruptor(&self, attribute: usize, rng: &mut dyn RngCore) -> Option<&Corruptor> {
        self.corruptors
            .get(attribute)
            .and_then(Option::as_ref)
            .map(|selector| selector.select(rng))
    }
}

/// Turns original records into corrupted duplicates.
#[derive(Debug, Clone)]
pub struct CorruptionDriver {
    policy: ModificationPolicy,
    max_modifications_per_attribute: usize,
    modifications_per_record: usize,
}

impl CorruptionDriver {
    pub fn new(
        policy: ModificationPolicy,
        max_modifications_per_attribute: usize,
        modifications_per_record: usize,
    ) -> Result<Self, ConfigError> {
        if max_modifications_per_attribute == 0 {
            return Err(ConfigError::invalid(
                "max_modifications_per_attribute",
                "must be at least 1",
            ));
        }
        if modifications_per_record == 0 {
            return Err(ConfigError::invalid(
                "modifications_per_record",
                "must be at least 1",
            ));
        }
        Ok(Self {
            policy,
            max_modifications_per_attribute,
            modifications_per_record,
        })
    }

    pub fn policy(&self) -> &ModificationPolicy {
        &self.policy
    }

    /// Number of modifications every duplicate receives.
    pub fn modifications_per_duplicate(&self) -> usize {
        self.modifications_per_record.min(
            self.policy
                .modifiable_attributes()
                .saturating_mul(self.max_modifications_per_attribute),
        )
    }

    /// Produces one corrupted copy of `original`.
    ///
    /// Attributes are drawn by weight; one that already received the maximum
    /// number of modifications is drawn again.
    pub fn corrupt_record(&self, original: &Record, rng: &mut dyn RngCore) -> Record {
        let schema = self.policy.schema();
        let target = self.modifications_per_duplicate();
        let mut counts = vec![0usize; schema.len()];
        let mut record = original.clone();
        let mut applied = 0;

        while applied < target {
            let attribute = self.policy.select_attribute(rng);
            if counts[attribute] >= self.max_modifications_per_attribute {
                continue;
            }
            let Some(corruptor) = self.policy.select_corruptor(attribute, rng) else {
                break;
            };
            record = corruptor.apply(&record, attribute, rng);
            trace!(
                attribute = schema.name(attribute),
                corruptor = corruptor.name(),
                "Applied corruptor"
            );
            counts[attribute] += 1;
            applied += 1;
        }
        record
    }

    /// Plans and generates `num_duplicates` duplicates of `originals`.
    ///
    /// Returns the originals together with their duplicates, keyed and
    /// sorted by record id.
    pub fn generate(
        &self,
        originals: &BTreeMap<String, Record>,
        planner: &DuplicatePlanner,
        num_duplicates: usize,
        rng: &mut dyn RngCore,
    ) -> Result<BTreeMap<String, Record>, ConfigError> {
        let ids: Vec<String> = originals.keys().cloned().collect();
        let plan = planner.plan(&ids, num_duplicates, rng)?;

        let mut output = originals.clone();
        for (original_id, count) in plan {
            let Some(original) = originals.get(&original_id) else {
                continue;
            };
            for k in 0..count {
                let id = duplicate_id(&original_id, k);
                if output.contains_key(&id) {
                    return Err(ConfigError::invalid(
                        "record id",
                        format!("duplicate id '{id}' clashes with an existing record"),
                    ));
                }
                let duplicate = self.corrupt_record(original, rng);
                debug!(
                    original = %original_id,
                    duplicate = %id,
                    modifications = self.modifications_per_duplicate(),
                    "Generated duplicate"
                );
                output.insert(id, duplicate);
            }
        }
        Ok(output)
    }
}
