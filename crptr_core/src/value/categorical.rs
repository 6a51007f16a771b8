use super::ValueCorruptor;
use crate::error::ConfigError;
use crate::lookup::{Direction, LookupSource, VariantTable};
use rand::Rng;
use rand_core::RngCore;
use serde::Deserialize;
use std::sync::Arc;

/// Replaces a whole value with one of its known misspellings, e.g. a
/// surname with the variants recorded for it in a lookup file.
#[derive(Debug, Clone)]
pub struct CategoricalValueCorruptor {
    table: Arc<VariantTable>,
}

impl CategoricalValueCorruptor {
    pub fn new(source: &LookupSource) -> Result<Self, ConfigError> {
        let table = VariantTable::load(source, Direction::OneWay)?;
        Ok(Self::with_table(Arc::new(table)))
    }

    pub fn with_table(table: Arc<VariantTable>) -> Self {
        Self { table }
    }
}

impl ValueCorruptor for CategoricalValueCorruptor {
    fn name(&self) -> &str {
        "Categorical value"
    }

    fn corrupt(&self, value: &str, rng: &mut dyn RngCore) -> String {
        match self.table.variants(value) {
            Some(variants) if !variants.is_empty() => {
                variants[rng.random_range(0..variants.len())].clone()
            }
            _ => value.to_string(),
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
#[serde(deny_unknown_fields)]
pub struct CategoricalDomainConfig {
    pub categories: Vec<String>,
}

/// Swaps a value for a different member of a fixed category set
/// (`m` for `f`, one state name for another).
#[derive(Debug, Clone)]
pub struct CategoricalDomainCorruptor {
    categories: Vec<String>,
}

impl CategoricalDomainCorruptor {
    pub fn new(config: CategoricalDomainConfig) -> Result<Self, ConfigError> {
        let mut categories: Vec<String> = Vec::with_capacity(config.categories.len());
        for category in config.categories {
            if !categories.contains(&category) {
                categories.push(category);
            }
        }
        if categories.len() < 2 {
            return Err(ConfigError::invalid(
                "categories",
                "a categorical domain needs at least two distinct categories",
            ));
        }
        Ok(Self { categories })
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }
}

impl ValueCorruptor for CategoricalDomainCorruptor {
    fn name(&self) -> &str {
        "Categorical domain"
    }

    fn corrupt(&self, value: &str, rng: &mut dyn RngCore) -> String {
        if !self.categories.iter().any(|c| c == value) {
            return value.to_string();
        }
        let others: Vec<&String> = self.categories.iter().filter(|c| *c != value).collect();
        others[rng.random_range(0..others.len())].clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::test_utils::lookup_file;
    use proptest::prelude::*;
    use rand_chacha::ChaCha8Rng;
    use rand_core::SeedableRng;
    use std::collections::HashSet;

    fn domain(categories: &[&str]) -> CategoricalDomainCorruptor {
        CategoricalDomainCorruptor::new(CategoricalDomainConfig {
            categories: categories.iter().map(|c| c.to_string()).collect(),
        })
        .expect("Domain should be valid")
    }

    #[test]
    fn misspellings_come_from_the_table() {
        let file = lookup_file("smith,smyth\nsmith,smithe\nmiller,muller\n");
        let source = LookupSource::new(file.path(), false, "ascii");
        let corruptor = CategoricalValueCorruptor::new(&source).unwrap();
        let mut rng = ChaCha8Rng::from_seed([40u8; 32]);

        let seen: HashSet<String> = (0..100).map(|_| corruptor.corrupt("smith", &mut rng)).collect();
        let expected: HashSet<String> = ["smyth".to_string(), "smithe".to_string()].into();
        assert_eq!(seen, expected);

        assert_eq!(corruptor.corrupt("miller", &mut rng), "muller");
        assert_eq!(corruptor.corrupt("muller", &mut rng), "muller", "Table is one way");
        assert_eq!(corruptor.corrupt("Smith", &mut rng), "Smith", "Lookup is exact");
        assert_eq!(corruptor.corrupt("", &mut rng), "");
    }

    #[test]
    fn domain_swaps_to_another_member() {
        let corruptor = domain(&["m", "f"]);
        let mut rng = ChaCha8Rng::from_seed([41u8; 32]);
        for _ in 0..20 {
            assert_eq!(corruptor.corrupt("m", &mut rng), "f");
            assert_eq!(corruptor.corrupt("f", &mut rng), "m");
        }
        assert_eq!(corruptor.corrupt("x", &mut rng), "x");
        assert_eq!(corruptor.corrupt("", &mut rng), "");
    }

    #[test]
    fn domain_needs_two_distinct_categories() {
        assert!(CategoricalDomainCorruptor::new(CategoricalDomainConfig { categories: vec![] }).is_err());
        assert!(
            CategoricalDomainCorruptor::new(CategoricalDomainConfig {
                categories: vec!["m".into(), "m".into()]
            })
            .is_err()
        );
        assert_eq!(domain(&["a", "b", "a"]).categories(), ["a", "b"]);
    }

    proptest! {
        #[test]
        fn domain_result_is_a_different_member(pick in 0usize..4, seed in any::<u64>()) {
            let categories = ["nsw", "vic", "qld", "act"];
            let corruptor = domain(&categories);
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let result = corruptor.corrupt(categories[pick], &mut rng);
            prop_assert!(categories.contains(&result.as_str()));
            prop_assert_ne!(result.as_str(), categories[pick]);
        }
    }
}
