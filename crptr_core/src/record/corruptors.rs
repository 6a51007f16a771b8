use super::{AttributeSchema, Record, RecordCorruptor};
use crate::error::{ConfigError, check_probability};
use rand_core::RngCore;
use serde::Deserialize;

/// Value written into every field by [`ClearRecord`] unless configured otherwise.
pub const BLANK_MARKER: &str = " ";
/// Value written into every field by [`MissingRecord`].
pub const MISSING_MARKER: &str = "missing";
/// Value written into the marker field by [`DuplicateRecord`].
pub const DUPLICATE_MARKER: &str = "duplicate";

fn default_clear_value() -> String {
    BLANK_MARKER.to_string()
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
#[serde(deny_unknown_fields)]
pub struct ClearRecordConfig {
    #[serde(default = "default_clear_value")]
    pub clear_value: String,
}

impl Default for ClearRecordConfig {
    fn default() -> Self {
        Self {
            clear_value: default_clear_value(),
        }
    }
}

/// Blanks every field of the record.
#[derive(Debug, Clone)]
pub struct ClearRecord {
    clear_value: String,
}

impl ClearRecord {
    pub fn new(config: ClearRecordConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            clear_value: config.clear_value,
        })
    }
}

impl RecordCorruptor for ClearRecord {
    fn name(&self) -> &str {
        "Clear record"
    }

    fn corrupt(&self, record: &Record, _rng: &mut dyn RngCore) -> Record {
        record.map_values(|_, _| self.clear_value.clone())
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
#[serde(deny_unknown_fields)]
pub struct SwapAttributesConfig {
    pub attr1: String,
    pub attr2: String,
}

/// Exchanges the values of two named fields.
#[derive(Debug, Clone)]
pub struct SwapAttributes {
    first: usize,
    second: usize,
}

impl SwapAttributes {
    pub fn new(config: SwapAttributesConfig, schema: &AttributeSchema) -> Result<Self, ConfigError> {
        Ok(Self {
            first: schema.require(&config.attr1)?,
            second: schema.require(&config.attr2)?,
        })
    }
}

impl RecordCorruptor for SwapAttributes {
    fn name(&self) -> &str {
        "Swap attributes"
    }

    fn corrupt(&self, record: &Record, _rng: &mut dyn RngCore) -> Record {
        record
            .with_value(self.first, record.get(self.second).to_string())
            .with_value(self.second, record.get(self.first).to_string())
    }
}

/// Which end of the text spills over into the neighbouring field.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum OverflowStart {
    /// A prefix of the second field is appended to the first.
    Beginning,
    /// The tail of the first field is prepended to the second.
    Ending,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
#[serde(deny_unknown_fields)]
pub struct OverflowConfig {
    pub attr1: String,
    pub attr2: String,
    pub overflow_level: f64,
    pub start_pos: OverflowStart,
}

/// Simulates text running over a field boundary on a paper form.
#[derive(Debug, Clone)]
pub struct OverflowAttributes {
    first: usize,
    second: usize,
    overflow_level: f64,
    start_pos: OverflowStart,
}

impl OverflowAttributes {
    pub fn new(config: OverflowConfig, schema: &AttributeSchema) -> Result<Self, ConfigError> {
        Ok(Self {
            first: schema.require(&config.attr1)?,
            second: schema.require(&config.attr2)?,
            overflow_level: check_probability("overflow_level", config.overflow_level)?,
            start_pos: config.start_pos,
        })
    }

    fn split_at_level(&self, value: &str) -> (String, String) {
        let chars: Vec<char> = value.chars().collect();
        let cut = (chars.len() as f64 * self.overflow_level).floor() as usize;
        let cut = cut.min(chars.len());
        (chars[..cut].iter().collect(), chars[cut..].iter().collect())
    }
}

impl RecordCorruptor for OverflowAttributes {
    fn name(&self) -> &str {
        "Overflow attributes"
    }

    fn corrupt(&self, record: &Record, _rng: &mut dyn RngCore) -> Record {
        let first_val = record.get(self.first);
        let second_val = record.get(self.second);
        let (new_first, new_second) = match self.start_pos {
            OverflowStart::Beginning => {
                let (moved, kept) = self.split_at_level(second_val);
                (format!("{first_val}{moved}"), kept)
            }
            OverflowStart::Ending => {
                let (kept, moved) = self.split_at_level(first_val);
                (kept, format!("{moved}{second_val}"))
            }
        };
        record
            .with_value(self.first, new_first)
            .with_value(self.second, new_second)
    }
}

/// Replaces every field with the literal missing marker.
#[derive(Debug, Default, Clone, Copy)]
pub struct MissingRecord;

impl MissingRecord {
    pub fn new() -> Self {
        MissingRecord
    }
}

impl RecordCorruptor for MissingRecord {
    fn name(&self) -> &str {
        "Missing record"
    }

    fn corrupt(&self, record: &Record, _rng: &mut dyn RngCore) -> Record {
        record.map_values(|_, _| MISSING_MARKER.to_string())
    }
}

/// Flags the record as a genuine duplicate copy through the marker field,
/// leaving every other field untouched.
#[derive(Debug, Clone)]
pub struct DuplicateRecord {
    marker: usize,
}

impl DuplicateRecord {
    pub fn new(schema: &AttributeSchema) -> Result<Self, ConfigError> {
        let marker = schema.marker().ok_or_else(|| {
            ConfigError::invalid(
                "record_marker",
                "duplicate-record corruptor needs a record marker attribute",
            )
        })?;
        Ok(Self { marker })
    }
}

impl RecordCorruptor for DuplicateRecord {
    fn name(&self) -> &str {
        "Duplicate record"
    }

    fn corrupt(&self, record: &Record, _rng: &mut dyn RngCore) -> Record {
        record.with_value(self.marker, DUPLICATE_MARKER.to_string())
    }
}
