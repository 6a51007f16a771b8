use super::{MAX_POSITION_TRIES, ValueCorruptor, splice};
use crate::error::{ConfigError, check_probability, check_sums_to_one};
use crate::keyboard::{column_neighbours, row_neighbours};
use crate::position::PositionFunction;
use rand::Rng;
use rand_core::RngCore;
use serde::Deserialize;
use std::sync::Arc;
use tracing::trace;

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
#[serde(deny_unknown_fields)]
pub struct KeyboardConfig {
    pub row_prob: f64,
    pub col_prob: f64,
}

/// Simulates hitting a neighbouring key on a QWERTY keyboard.
///
/// A character is picked with the position function, then replaced by one of
/// its neighbours in the same row (with `row_prob`) or the same column (with
/// `col_prob`). Characters without a neighbour in the chosen direction cause a
/// fresh position to be tried, up to [`MAX_POSITION_TRIES`] times.
#[derive(Debug, Clone)]
pub struct KeyboardCorruptor {
    row_prob: f64,
    position: Arc<dyn PositionFunction>,
}

impl KeyboardCorruptor {
    pub fn new(
        config: KeyboardConfig,
        position: Arc<dyn PositionFunction>,
    ) -> Result<Self, ConfigError> {
        let row_prob = check_probability("row_prob", config.row_prob)?;
        let col_prob = check_probability("col_prob", config.col_prob)?;
        check_sums_to_one("keyboard row and column", [row_prob, col_prob])?;
        Ok(Self { row_prob, position })
    }
}

impl ValueCorruptor for KeyboardCorruptor {
    fn name(&self) -> &str {
        "Keyboard value"
    }

    fn corrupt(&self, value: &str, rng: &mut dyn RngCore) -> String {
        let chars: Vec<char> = value.chars().collect();
        if chars.is_empty() {
            return value.to_string();
        }

        for _ in 0..MAX_POSITION_TRIES {
            let pos = self.position.sample_len(chars.len(), rng);
            let draw: f64 = rng.random();
            let neighbours = if draw <= self.row_prob {
                row_neighbours(chars[pos])
            } else {
                column_neighbours(chars[pos])
            };
            if let Some(neighbours) = neighbours {
                let options: Vec<char> = neighbours.chars().collect();
                let new_char = options[rng.random_range(0..options.len())];
                return splice(&chars, pos, pos + 1, new_char.encode_utf8(&mut [0u8; 4]));
            }
        }
        trace!(value, "No keyboard neighbour found, value left unchanged");
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::{NormalPosition, UniformPosition};
    use proptest::prelude::*;
    use rand_chacha::ChaCha8Rng;
    use rand_core::SeedableRng;

    fn keyboard(row_prob: f64, col_prob: f64) -> KeyboardCorruptor {
        KeyboardCorruptor::new(KeyboardConfig { row_prob, col_prob }, Arc::new(NormalPosition))
            .expect("Keyboard config should be valid")
    }

    #[test]
    fn row_only_corruption_uses_row_neighbours() {
        let corruptor = KeyboardCorruptor::new(
            KeyboardConfig {
                row_prob: 1.0,
                col_prob: 0.0,
            },
            Arc::new(UniformPosition),
        )
        .unwrap();
        let mut rng = ChaCha8Rng::from_seed([12u8; 32]);
        for _ in 0..100 {
            let result = corruptor.corrupt("a", &mut rng);
            assert_eq!(result, "s", "The only row neighbour of 'a' is 's'");
        }
    }

    #[test]
    fn characters_without_neighbours_stay_unchanged() {
        let corruptor = keyboard(0.5, 0.5);
        let mut rng = ChaCha8Rng::from_seed([13u8; 32]);
        assert_eq!(corruptor.corrupt("", &mut rng), "");
        assert_eq!(corruptor.corrupt("ÄÖÜ-", &mut rng), "ÄÖÜ-");
    }

    #[test]
    fn row_and_column_probabilities_are_validated() {
        assert!(KeyboardCorruptor::new(
            KeyboardConfig {
                row_prob: 0.6,
                col_prob: 0.6
            },
            Arc::new(UniformPosition)
        )
        .is_err());
        assert!(KeyboardCorruptor::new(
            KeyboardConfig {
                row_prob: -0.5,
                col_prob: 1.5
            },
            Arc::new(UniformPosition)
        )
        .is_err());
    }

    proptest! {
        #[test]
        fn output_length_always_equals_input_length(value in "[a-zA-Z0-9 .-]{0,24}", seed in any::<u64>()) {
            let corruptor = keyboard(0.5, 0.5);
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let result = corruptor.corrupt(&value, &mut rng);
            prop_assert_eq!(result.chars().count(), value.chars().count());
        }
    }
}
