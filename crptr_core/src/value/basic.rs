use super::{ValueCorruptor, splice};
use crate::error::ConfigError;
use crate::position::PositionFunction;
use rand_core::RngCore;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
#[serde(deny_unknown_fields)]
pub struct MissingValueConfig {
    #[serde(default)]
    pub missing_value: String,
}

/// Replaces any value with a fixed missing-value string (empty by default).
#[derive(Debug, Clone)]
pub struct MissingValueCorruptor {
    missing_value: String,
}

impl MissingValueCorruptor {
    pub fn new(config: MissingValueConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            missing_value: config.missing_value,
        })
    }
}

impl ValueCorruptor for MissingValueCorruptor {
    fn name(&self) -> &str {
        "Missing value"
    }

    fn corrupt(&self, _value: &str, _rng: &mut dyn RngCore) -> String {
        self.missing_value.clone()
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
#[serde(deny_unknown_fields)]
pub struct UnknownCharConfig {
    pub unknown_char: char,
}

/// Overwrites one sampled character with a marker such as `?`, as a
/// transcriber would for an illegible letter.
#[derive(Debug, Clone)]
pub struct UnknownCharCorruptor {
    unknown_char: char,
    position: Arc<dyn PositionFunction>,
}

impl UnknownCharCorruptor {
    pub fn new(
        config: UnknownCharConfig,
        position: Arc<dyn PositionFunction>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            unknown_char: config.unknown_char,
            position,
        })
    }
}

impl ValueCorruptor for UnknownCharCorruptor {
    fn name(&self) -> &str {
        "Unknown character"
    }

    fn corrupt(&self, value: &str, rng: &mut dyn RngCore) -> String {
        let chars: Vec<char> = value.chars().collect();
        if chars.is_empty() {
            return value.to_string();
        }
        let pos = self.position.sample_len(chars.len(), rng);
        let mut marker = [0u8; 4];
        splice(&chars, pos, pos + 1, self.unknown_char.encode_utf8(&mut marker))
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
#[serde(deny_unknown_fields)]
pub struct AbbreviationConfig {
    pub num_of_char: usize,
}

/// Abbreviates a value to its first few characters (`Peter` to `P`).
#[derive(Debug, Clone)]
pub struct AbbreviationCorruptor {
    num_of_char: usize,
}

impl AbbreviationCorruptor {
    pub fn new(config: AbbreviationConfig) -> Result<Self, ConfigError> {
        if config.num_of_char == 0 {
            return Err(ConfigError::invalid(
                "num_of_char",
                "abbreviation length must be at least 1",
            ));
        }
        Ok(Self {
            num_of_char: config.num_of_char,
        })
    }
}

impl ValueCorruptor for AbbreviationCorruptor {
    fn name(&self) -> &str {
        "Abbreviated name forms"
    }

    fn corrupt(&self, value: &str, _rng: &mut dyn RngCore) -> String {
        if value.chars().count() < self.num_of_char {
            return value.to_string();
        }
        value.chars().take(self.num_of_char).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::UniformPosition;
    use rand_chacha::ChaCha8Rng;
    use rand_core::SeedableRng;

    #[test]
    fn missing_value_replaces_everything() {
        let mut rng = ChaCha8Rng::from_seed([0u8; 32]);
        let default = MissingValueCorruptor::new(MissingValueConfig::default()).unwrap();
        assert_eq!(default.corrupt("peter", &mut rng), "");
        assert_eq!(default.corrupt("", &mut rng), "");

        let custom = MissingValueCorruptor::new(MissingValueConfig {
            missing_value: "unknown".into(),
        })
        .unwrap();
        assert_eq!(custom.corrupt("peter", &mut rng), "unknown");
    }

    #[test]
    fn unknown_char_overwrites_exactly_one_position() {
        let mut rng = ChaCha8Rng::from_seed([1u8; 32]);
        let corruptor = UnknownCharCorruptor::new(
            UnknownCharConfig { unknown_char: '?' },
            Arc::new(UniformPosition),
        )
        .unwrap();
        for _ in 0..100 {
            let result = corruptor.corrupt("miller", &mut rng);
            assert_eq!(result.chars().count(), 6);
            assert_eq!(result.matches('?').count(), 1, "Result was {}", result);
            let differing = result
                .chars()
                .zip("miller".chars())
                .filter(|(a, b)| a != b)
                .count();
            assert_eq!(differing, 1);
        }
        assert_eq!(corruptor.corrupt("", &mut rng), "");
    }

    #[test]
    fn abbreviation_truncates_only_long_enough_values() {
        let mut rng = ChaCha8Rng::from_seed([2u8; 32]);
        let corruptor = AbbreviationCorruptor::new(AbbreviationConfig { num_of_char: 3 }).unwrap();
        assert_eq!(corruptor.corrupt("peter", &mut rng), "pet");
        assert_eq!(corruptor.corrupt("al", &mut rng), "al");
        assert_eq!(corruptor.corrupt("", &mut rng), "");
        assert!(AbbreviationCorruptor::new(AbbreviationConfig { num_of_char: 0 }).is_err());
    }
}
