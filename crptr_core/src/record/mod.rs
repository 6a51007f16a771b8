use crate::error::ConfigError;
use rand_core::RngCore;
use std::fmt::Debug;
use std::sync::Arc;

mod corruptors;

pub use corruptors::{
    BLANK_MARKER, ClearRecord, ClearRecordConfig, DUPLICATE_MARKER, DuplicateRecord,
    MISSING_MARKER, MissingRecord, OverflowAttributes, OverflowConfig, OverflowStart,
    SwapAttributes, SwapAttributesConfig,
};

/// Default name of the field that carries the record-level corruption marker.
pub const DEFAULT_RECORD_MARKER: &str = "crptr-record";

/// The ordered attribute-name list shared by every record of a data set.
///
/// Fixed at construction; corruptors that address fields by name resolve
/// them against it once and keep the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSchema {
    names: Vec<String>,
    marker: Option<usize>,
}

impl AttributeSchema {
    /// Builds a schema from attribute names, rejecting duplicates and empty names.
    /// `marker` names the record-level marker attribute, if the data set has one.
    pub fn new<I, S>(names: I, marker: Option<&str>) -> Result<Arc<Self>, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            return Err(ConfigError::invalid(
                "attributes",
                "attribute name list must not be empty",
            ));
        }
        for (idx, name) in names.iter().enumerate() {
            if name.is_empty() {
                return Err(ConfigError::invalid(
                    "attributes",
                    format!("attribute {} has an empty name", idx),
                ));
            }
            if names[..idx].contains(name) {
                return Err(ConfigError::DuplicateAttribute(name.clone()));
            }
        }
        let marker = match marker {
            Some(marker) => Some(
                names
                    .iter()
                    .position(|n| n == marker)
                    .ok_or_else(|| ConfigError::UnknownAttribute(marker.to_string()))?,
            ),
            None => None,
        };
        Ok(Arc::new(Self { names, marker }))
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Like [`AttributeSchema::index_of`] but fails with a configuration error.
    pub fn require(&self, name: &str) -> Result<usize, ConfigError> {
        self.index_of(name)
            .ok_or_else(|| ConfigError::UnknownAttribute(name.to_string()))
    }

    pub fn name(&self, idx: usize) -> &str {
        &self.names[idx]
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Index of the record-level marker attribute.
    pub fn marker(&self) -> Option<usize> {
        self.marker
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// One row of the data set: a value per schema attribute.
///
/// The key set never changes; every modifying operation returns a new record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    schema: Arc<AttributeSchema>,
    values: Vec<String>,
}

impl Record {
    pub fn new(schema: Arc<AttributeSchema>, values: Vec<String>) -> Result<Self, ConfigError> {
        if values.len() != schema.len() {
            return Err(ConfigError::invalid(
                "record",
                format!(
                    "record has {} values but the schema has {} attributes",
                    values.len(),
                    schema.len()
                ),
            ));
        }
        Ok(Self { schema, values })
    }

    pub fn schema(&self) -> &Arc<AttributeSchema> {
        &self.schema
    }

    pub fn get(&self, idx: usize) -> &str {
        &self.values[idx]
    }

    pub fn get_by_name(&self, name: &str) -> Option<&str> {
        self.schema.index_of(name).map(|idx| self.get(idx))
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// A copy of this record with one value replaced.
    pub fn with_value(&self, idx: usize, value: String) -> Record {
        let mut values = self.values.clone();
        values[idx] = value;
        Record {
            schema: Arc::clone(&self.schema),
            values,
        }
    }

    /// A copy of this record with every value produced by `f`.
    pub fn map_values<F>(&self, mut f: F) -> Record
    where
        F: FnMut(usize, &str) -> String,
    {
        Record {
            schema: Arc::clone(&self.schema),
            values: self
                .values
                .iter()
                .enumerate()
                .map(|(idx, v)| f(idx, v))
                .collect(),
        }
    }

    pub fn into_values(self) -> Vec<String> {
        self.values
    }
}

/// A corruptor that rewrites a whole record.
///
/// Implementations are configured once, validated against the data set's
/// schema at construction and never mutate the record they are given.
pub trait RecordCorruptor: Debug + Send + Sync {
    /// Diagnostic label.
    fn name(&self) -> &str;

    fn corrupt(&self, record: &Record, rng: &mut dyn RngCore) -> Record;
}


#[cfg(test)]
mod tests {
    use super::test_utils::*;
    use super::*;

    #[test]
    fn schema_resolves_names_and_marker() {
        let schema = birth_schema();
        assert_eq!(schema.index_of("LastName"), Some(2));
        assert_eq!(schema.marker(), Some(0));
        assert!(matches!(
            schema.require("Surname"),
            Err(ConfigError::UnknownAttribute(name)) if name == "Surname"
        ));
    }

    #[test]
    fn schema_rejects_duplicates_and_unknown_marker() {
        assert!(matches!(
            AttributeSchema::new(["a", "b", "a"], None),
            Err(ConfigError::DuplicateAttribute(name)) if name == "a"
        ));
        assert!(matches!(
            AttributeSchema::new(["a", "b"], Some("crptr-record")),
            Err(ConfigError::UnknownAttribute(_))
        ));
        assert!(AttributeSchema::new(Vec::<String>::new(), None).is_err());
    }

    #[test]
    fn record_updates_leave_the_original_untouched() {
        let original = birth_record(["", "peter", "miller", "m", "01-02-1990"]);
        let updated = original.with_value(1, "pete".to_string());
        assert_eq!(original.get(1), "peter");
        assert_eq!(updated.get_by_name("FirstName"), Some("pete"));
        assert_eq!(updated.values().len(), original.values().len());
    }

    #[test]
    fn record_length_must_match_schema() {
        assert!(Record::new(birth_schema(), vec!["only-one".to_string()]).is_err());
    }
}
