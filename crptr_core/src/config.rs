use crate::charset::CharSetKind;
use crate::driver::{CorruptionDriver, Corruptor, ModificationPolicy};
use crate::duplicates::{DuplicateDistribution, DuplicatePlanner};
use crate::error::ConfigError;
use crate::lookup::{LookupSource, default_encoding};
use crate::position::PositionKind;
use crate::record::{
    AttributeSchema, ClearRecord, ClearRecordConfig, DEFAULT_RECORD_MARKER, DuplicateRecord,
    MissingRecord, OverflowAttributes, OverflowConfig, SwapAttributes, SwapAttributesConfig,
};
use crate::value::{
    AbbreviationConfig, AbbreviationCorruptor, CategoricalDomainConfig,
    CategoricalDomainCorruptor, CategoricalValueCorruptor, DateConfig, DateCorruptor, EditConfig,
    EditCorruptor, KeyboardConfig, KeyboardCorruptor, MissingValueConfig, MissingValueCorruptor,
    OcrCorruptor, PhoneticCorruptor, UnknownCharConfig, UnknownCharCorruptor,
};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case")]
#[serde(deny_unknown_fields)]
pub struct DatasetSettings {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    #[serde(default = "default_encoding")]
    pub encoding: String,
    #[serde(default = "default_id_attribute")]
    pub id_attribute: String,
    #[serde(default = "default_record_marker")]
    pub record_marker: String,
    #[serde(default = "default_has_header_line")]
    pub has_header_line: bool,
    /// Attribute names for input files without a header line.
    #[serde(default)]
    pub attribute_names: Option<Vec<String>>,
}

pub fn default_id_attribute() -> String {
    "rec-id".to_string()
}

pub fn default_record_marker() -> String {
    DEFAULT_RECORD_MARKER.to_string()
}

fn default_has_header_line() -> bool {
    true
}

impl Default for DatasetSettings {
    fn default() -> Self {
        Self {
            input: None,
            output: None,
            encoding: default_encoding(),
            id_attribute: default_id_attribute(),
            record_marker: default_record_marker(),
            has_header_line: default_has_header_line(),
            attribute_names: None,
        }
    }
}

impl DatasetSettings {
    /// Builds the attribute schema from the input header (without the id
    /// column) or, failing that, from `attribute-names`. The record marker
    /// attribute is appended when the data set does not carry it.
    pub fn schema(&self, header: Option<&[String]>) -> Result<Arc<AttributeSchema>, ConfigError> {
        let mut names: Vec<String> = match (header, &self.attribute_names) {
            (Some(header), _) => header.to_vec(),
            (None, Some(names)) => names.clone(),
            (None, None) => {
                return Err(ConfigError::invalid(
                    "attribute-names",
                    "required when the input has no header line",
                ));
            }
        };
        if !names.contains(&self.record_marker) {
            names.push(self.record_marker.clone());
        }
        AttributeSchema::new(names, Some(&self.record_marker))
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case")]
#[serde(deny_unknown_fields)]
pub struct GenerationSettings {
    pub num_duplicates: usize,
    #[serde(default = "default_one")]
    pub max_duplicates_per_record: usize,
    #[serde(default)]
    pub duplicate_distribution: DuplicateDistribution,
    #[serde(default = "default_one")]
    pub max_modifications_per_attribute: usize,
    #[serde(default = "default_one")]
    pub modifications_per_record: usize,
}

fn default_one() -> usize {
    1
}

/// One named corruptor definition, tagged by `kind`.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "kebab-case", rename_all_fields = "kebab-case")]
#[serde(deny_unknown_fields)]
pub enum CorruptorSpec {
    MissingValue(MissingValueConfig),
    Edit {
        #[serde(default)]
        position: PositionKind,
        #[serde(default)]
        charset: CharSetKind,
        insert_prob: f64,
        delete_prob: f64,
        substitute_prob: f64,
        transpose_prob: f64,
    },
    Keyboard {
        #[serde(default)]
        position: PositionKind,
        row_prob: f64,
        col_prob: f64,
    },
    Ocr {
        #[serde(default)]
        position: PositionKind,
        lookup: LookupSource,
    },
    Phonetic {
        lookup: LookupSource,
    },
    CategoricalValue {
        lookup: LookupSource,
    },
    CategoricalDomain(CategoricalDomainConfig),
    UnknownChar {
        #[serde(default)]
        position: PositionKind,
        unknown_char: char,
    },
    Abbreviation(AbbreviationConfig),
    Date(DateConfig),
    ClearRecord(ClearRecordConfig),
    SwapAttributes(SwapAttributesConfig),
    OverflowAttributes(OverflowConfig),
    MissingRecord,
    DuplicateRecord,
}

impl CorruptorSpec {
    /// Validates the parameters, loads lookup tables and resolves attribute
    /// names against `schema`.
    pub fn build(&self, schema: &AttributeSchema) -> Result<Corruptor, ConfigError> {
        let corruptor = match self.clone() {
            CorruptorSpec::MissingValue(config) => {
                Corruptor::Value(Arc::new(MissingValueCorruptor::new(config)?))
            }
            CorruptorSpec::Edit {
                position,
                charset,
                insert_prob,
                delete_prob,
                substitute_prob,
                transpose_prob,
            } => Corruptor::Value(Arc::new(EditCorruptor::new(
                EditConfig {
                    insert_prob,
                    delete_prob,
                    substitute_prob,
                    transpose_prob,
                },
                position.build(),
                charset.build(),
            )?)),
            CorruptorSpec::Keyboard {
                position,
                row_prob,
                col_prob,
            } => Corruptor::Value(Arc::new(KeyboardCorruptor::new(
                KeyboardConfig { row_prob, col_prob },
                position.build(),
            )?)),
            CorruptorSpec::Ocr { position, lookup } => {
                Corruptor::Value(Arc::new(OcrCorruptor::new(&lookup, position.build())?))
            }
            CorruptorSpec::Phonetic { lookup } => {
                Corruptor::Value(Arc::new(PhoneticCorruptor::new(&lookup)?))
            }
            CorruptorSpec::CategoricalValue { lookup } => {
                Corruptor::Value(Arc::new(CategoricalValueCorruptor::new(&lookup)?))
            }
            CorruptorSpec::CategoricalDomain(config) => {
                Corruptor::Value(Arc::new(CategoricalDomainCorruptor::new(config)?))
            }
            CorruptorSpec::UnknownChar {
                position,
                unknown_char,
            } => Corruptor::Value(Arc::new(UnknownCharCorruptor::new(
                UnknownCharConfig { unknown_char },
                position.build(),
            )?)),
            CorruptorSpec::Abbreviation(config) => {
                Corruptor::Value(Arc::new(AbbreviationCorruptor::new(config)?))
            }
            CorruptorSpec::Date(config) => Corruptor::Value(Arc::new(DateCorruptor::new(config)?)),
            CorruptorSpec::ClearRecord(config) => {
                Corruptor::Record(Arc::new(ClearRecord::new(config)?))
            }
            CorruptorSpec::SwapAttributes(config) => {
                Corruptor::Record(Arc::new(SwapAttributes::new(config, schema)?))
            }
            CorruptorSpec::OverflowAttributes(config) => {
                Corruptor::Record(Arc::new(OverflowAttributes::new(config, schema)?))
            }
            CorruptorSpec::MissingRecord => Corruptor::Record(Arc::new(MissingRecord::new())),
            CorruptorSpec::DuplicateRecord => {
                Corruptor::Record(Arc::new(DuplicateRecord::new(schema)?))
            }
        };
        Ok(corruptor)
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
#[serde(deny_unknown_fields)]
pub struct WeightedCorruptor {
    pub weight: f64,
    pub corruptor: String,
}

/// Selection weight of one attribute and the corruptors that may modify it.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
#[serde(deny_unknown_fields)]
pub struct AttributePolicy {
    pub probability: f64,
    #[serde(default)]
    pub corruptors: Vec<WeightedCorruptor>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case")]
#[serde(deny_unknown_fields)]
pub struct CrptrConfig {
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default)]
    pub dataset: DatasetSettings,
    pub generation: GenerationSettings,
    #[serde(default)]
    pub corruptors: BTreeMap<String, CorruptorSpec>,
    #[serde(default)]
    pub attributes: BTreeMap<String, AttributePolicy>,
}

pub fn default_seed() -> u64 {
    42
}

impl CrptrConfig {
    pub fn load_from_file(path: &PathBuf) -> Result<Self, anyhow::Error> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file at {:?}: {}", path, e))?;

        let config: CrptrConfig = toml::from_str(&content).map_err(|e| {
            anyhow::anyhow!("Failed to parse TOML from config file {:?}: {}", path, e)
        })?;

        Ok(config)
    }

    /// Builds every defined corruptor. Lookup tables are loaded here, once.
    pub fn build_corruptors(
        &self,
        schema: &AttributeSchema,
    ) -> Result<BTreeMap<String, Corruptor>, ConfigError> {
        self.corruptors
            .iter()
            .map(|(name, spec)| Ok((name.clone(), spec.build(schema)?)))
            .collect()
    }

    pub fn build_policy(
        &self,
        schema: Arc<AttributeSchema>,
    ) -> Result<ModificationPolicy, ConfigError> {
        let corruptors = self.build_corruptors(&schema)?;

        let weights = self
            .attributes
            .iter()
            .map(|(name, policy)| (name.clone(), policy.probability))
            .collect();

        let mut lists = Vec::new();
        for (attribute, policy) in &self.attributes {
            if policy.corruptors.is_empty() {
                continue;
            }
            let mut list = Vec::with_capacity(policy.corruptors.len());
            for entry in &policy.corruptors {
                let corruptor = corruptors.get(&entry.corruptor).ok_or_else(|| {
                    ConfigError::UnknownCorruptor {
                        attribute: attribute.clone(),
                        corruptor: entry.corruptor.clone(),
                    }
                })?;
                list.push((entry.weight, corruptor.clone()));
            }
            lists.push((attribute.clone(), list));
        }

        ModificationPolicy::new(schema, weights, lists)
    }

    pub fn build_driver(&self, schema: Arc<AttributeSchema>) -> Result<CorruptionDriver, ConfigError> {
        CorruptionDriver::new(
            self.build_policy(schema)?,
            self.generation.max_modifications_per_attribute,
            self.generation.modifications_per_record,
        )
    }

    pub fn build_planner(&self) -> Result<DuplicatePlanner, ConfigError> {
        DuplicatePlanner::new(
            self.generation.duplicate_distribution,
            self.generation.max_duplicates_per_record,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::test_utils::lookup_file;
    use crate::record::Record;
    use rand_chacha::ChaCha8Rng;
    use rand_core::SeedableRng;
    use std::io::Write;

    const BIRTH_HEADER: [&str; 4] = ["FirstName", "LastName", "Gender", "DateofBirth"];

    fn header() -> Vec<String> {
        BIRTH_HEADER.iter().map(|s| s.to_string()).collect()
    }

    fn parse(content: &str) -> CrptrConfig {
        toml::from_str(content).expect("Config should parse")
    }

    #[test]
    fn load_full_config_from_file() {
        let ocr = lookup_file("5,S\nm,rn\n");
        let misspell = lookup_file("miller,muller\n");
        let content = format!(
            r#"
            seed = 7

            [dataset]
            input = "input-files/births.csv"
            output = "output-files/births-crpt.csv"
            encoding = "utf-8"

            [generation]
            num-duplicates = 10
            max-duplicates-per-record = 2
            duplicate-distribution = "zipf"
            max-modifications-per-attribute = 1
            modifications-per-record = 2

            [corruptors.edit]
            kind = "edit"
            position = "uniform"
            insert-prob = 0.25
            delete-prob = 0.25
            substitute-prob = 0.25
            transpose-prob = 0.25

            [corruptors.ocr]
            kind = "ocr"
            lookup = {{ path = "{ocr}", encoding = "ascii" }}

            [corruptors.surnames]
            kind = "categorical-value"
            lookup = {{ path = "{misspell}" }}

            [corruptors.gender]
            kind = "categorical-domain"
            categories = ["m", "f"]

            [corruptors.dob]
            kind = "date"
            date-order = "dd-mm-yyyy"
            separator = "-"
            components-to-modify = ["day", "month"]
            date-corruption-methods = ["add", "swap_digit"]

            [corruptors.swap-names]
            kind = "swap-attributes"
            attr1 = "FirstName"
            attr2 = "LastName"

            [corruptors.dup]
            kind = "duplicate-record"

            [attributes.FirstName]
            probability = 0.4
            corruptors = [{{ weight = 0.6, corruptor = "edit" }}, {{ weight = 0.4, corruptor = "ocr" }}]

            [attributes.LastName]
            probability = 0.3
            corruptors = [{{ weight = 1.0, corruptor = "surnames" }}]

            [attributes.Gender]
            probability = 0.1
            corruptors = [{{ weight = 1.0, corruptor = "gender" }}]

            [attributes.DateofBirth]
            probability = 0.1
            corruptors = [{{ weight = 1.0, corruptor = "dob" }}]

            [attributes.crptr-record]
            probability = 0.1
            corruptors = [{{ weight = 0.5, corruptor = "swap-names" }}, {{ weight = 0.5, corruptor = "dup" }}]
            "#,
            ocr = ocr.path().display(),
            misspell = misspell.path().display(),
        );
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        let config = CrptrConfig::load_from_file(&file.path().to_path_buf()).unwrap();

        assert_eq!(config.seed, 7);
        assert_eq!(config.dataset.encoding, "utf-8");
        assert_eq!(config.dataset.id_attribute, "rec-id");
        assert!(config.dataset.has_header_line);
        assert_eq!(config.generation.duplicate_distribution, DuplicateDistribution::Zipf);
        assert_eq!(config.corruptors.len(), 7);
        assert!(matches!(
            config.corruptors["edit"],
            CorruptorSpec::Edit {
                position: PositionKind::Uniform,
                charset: CharSetKind::Ascii,
                ..
            }
        ));

        let schema = config.dataset.schema(Some(&header())).unwrap();
        assert_eq!(schema.len(), 5);
        assert_eq!(schema.marker(), Some(4));

        let driver = config.build_driver(Arc::clone(&schema)).unwrap();
        assert_eq!(driver.modifications_per_duplicate(), 2);
        let planner = config.build_planner().unwrap();
        assert_eq!(planner.max_duplicates_per_record(), 2);

        let corruptors = config.build_corruptors(&schema).unwrap();
        assert_eq!(corruptors["surnames"].name(), "Categorical value");
        assert_eq!(corruptors["dup"].name(), "Duplicate record");

        let record = Record::new(
            schema,
            ["peter", "miller", "m", "01-02-1890", ""].iter().map(|s| s.to_string()).collect(),
        )
        .unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let duplicate = driver.corrupt_record(&record, &mut rng);
        assert_eq!(duplicate.values().len(), 5);
    }

    #[test]
    fn defaults_apply_to_omitted_settings() {
        let config = parse(
            r#"
            [generation]
            num-duplicates = 3
            "#,
        );
        assert_eq!(config.seed, 42);
        assert_eq!(config.dataset.encoding, "ascii");
        assert_eq!(config.dataset.record_marker, "crptr-record");
        assert_eq!(config.generation.max_duplicates_per_record, 1);
        assert_eq!(config.generation.duplicate_distribution, DuplicateDistribution::Uniform);
        assert_eq!(config.generation.modifications_per_record, 1);
    }

    #[test]
    fn unknown_fields_and_kinds_are_rejected() {
        assert!(toml::from_str::<CrptrConfig>("[generation]\nnum-duplicates = 1\nbogus = 2").is_err());
        assert!(toml::from_str::<CrptrConfig>(
            "[generation]\nnum-duplicates = 1\n[corruptors.x]\nkind = \"teleport\""
        )
        .is_err());
        assert!(toml::from_str::<CrptrConfig>(
            "[generation]\nnum-duplicates = 1\n[corruptors.x]\nkind = \"keyboard\"\nrow-prob = 0.5\ncol-prob = 0.5\nrow-probability = 1.0"
        )
        .is_err());
    }

    #[test]
    fn policy_reports_undefined_corruptors() {
        let config = parse(
            r#"
            [generation]
            num-duplicates = 1

            [attributes.FirstName]
            probability = 1.0
            corruptors = [{ weight = 1.0, corruptor = "nowhere" }]
            "#,
        );
        let schema = config.dataset.schema(Some(&header())).unwrap();
        assert!(matches!(
            config.build_policy(schema),
            Err(ConfigError::UnknownCorruptor { .. })
        ));
    }

    #[test]
    fn record_corruptors_validate_attribute_names() {
        let config = parse(
            r#"
            [generation]
            num-duplicates = 1

            [corruptors.spill]
            kind = "overflow-attributes"
            attr1 = "FirstName"
            attr2 = "MiddleName"
            overflow-level = 0.5
            start-pos = "ending"
            "#,
        );
        let schema = config.dataset.schema(Some(&header())).unwrap();
        assert!(matches!(
            config.build_corruptors(&schema),
            Err(ConfigError::UnknownAttribute(name)) if name == "MiddleName"
        ));
    }

    #[test]
    fn schema_comes_from_header_or_configured_names() {
        let mut dataset = DatasetSettings::default();
        assert!(dataset.schema(None).is_err());

        dataset.attribute_names = Some(vec!["crptr-record".into(), "FirstName".into()]);
        let schema = dataset.schema(None).unwrap();
        assert_eq!(schema.names(), ["crptr-record", "FirstName"]);
        assert_eq!(schema.marker(), Some(0));

        let schema = dataset.schema(Some(&header())).unwrap();
        assert_eq!(schema.names().last().map(String::as_str), Some("crptr-record"));
    }
}
