use super::{ValueCorruptor, splice};
use crate::charset::CharSetProvider;
use crate::error::ConfigError;
use crate::position::PositionFunction;
use crate::selector::WeightedSelector;
use rand::Rng;
use rand_core::RngCore;
use serde::Deserialize;
use std::sync::Arc;

/// The four single-character edit operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOperation {
    Insert,
    Delete,
    Substitute,
    Transpose,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
#[serde(deny_unknown_fields)]
pub struct EditConfig {
    pub insert_prob: f64,
    pub delete_prob: f64,
    pub substitute_prob: f64,
    pub transpose_prob: f64,
}

/// Applies one insert, delete, substitute or transpose edit at a sampled position.
///
/// Inserted and substituted characters come from the character-set provider.
#[derive(Debug, Clone)]
pub struct EditCorruptor {
    operations: WeightedSelector<EditOperation>,
    position: Arc<dyn PositionFunction>,
    charset: Arc<dyn CharSetProvider>,
}

impl EditCorruptor {
    pub fn new(
        config: EditConfig,
        position: Arc<dyn PositionFunction>,
        charset: Arc<dyn CharSetProvider>,
    ) -> Result<Self, ConfigError> {
        let operations = WeightedSelector::new(
            "edit operations",
            vec![
                (config.insert_prob, EditOperation::Insert),
                (config.delete_prob, EditOperation::Delete),
                (config.substitute_prob, EditOperation::Substitute),
                (config.transpose_prob, EditOperation::Transpose),
            ],
        )?;
        Ok(Self {
            operations,
            position,
            charset,
        })
    }

    fn random_char(charset: &[char], rng: &mut dyn RngCore) -> char {
        charset[rng.random_range(0..charset.len())]
    }
}

impl ValueCorruptor for EditCorruptor {
    fn name(&self) -> &str {
        "Edit operation"
    }

    fn corrupt(&self, value: &str, rng: &mut dyn RngCore) -> String {
        let chars: Vec<char> = value.chars().collect();
        if chars.is_empty() {
            return value.to_string();
        }

        let operation = *self.operations.select(rng);
        if chars.len() == 1 && operation == EditOperation::Transpose {
            return value.to_string();
        }

        // Inserting may also happen behind the last character, transposing
        // never starts at it.
        let position_len = match operation {
            EditOperation::Insert => chars.len() + 1,
            EditOperation::Transpose => chars.len() - 1,
            EditOperation::Delete | EditOperation::Substitute => chars.len(),
        };
        let pos = self.position.sample_len(position_len, rng);

        let charset: Vec<char> = self.charset.charset(value).chars().collect();
        if charset.is_empty() {
            return value.to_string();
        }

        match operation {
            EditOperation::Insert => {
                let new_char = Self::random_char(&charset, rng);
                splice(&chars, pos, pos, new_char.encode_utf8(&mut [0u8; 4]))
            }
            EditOperation::Delete => splice(&chars, pos, pos + 1, ""),
            EditOperation::Substitute => {
                let new_char = Self::random_char(&charset, rng);
                splice(&chars, pos, pos + 1, new_char.encode_utf8(&mut [0u8; 4]))
            }
            EditOperation::Transpose => {
                let swapped: String = [chars[pos + 1], chars[pos]].iter().collect();
                splice(&chars, pos, pos + 2, &swapped)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charset::AsciiCharSet;
    use crate::position::{NormalPosition, UniformPosition};
    use proptest::prelude::*;
    use rand_chacha::ChaCha8Rng;
    use rand_core::SeedableRng;

    fn edit(insert: f64, delete: f64, substitute: f64, transpose: f64) -> EditCorruptor {
        EditCorruptor::new(
            EditConfig {
                insert_prob: insert,
                delete_prob: delete,
                substitute_prob: substitute,
                transpose_prob: transpose,
            },
            Arc::new(NormalPosition),
            Arc::new(AsciiCharSet),
        )
        .expect("Edit config should be valid")
    }

    #[derive(Debug)]
    struct NoCharSet;

    impl CharSetProvider for NoCharSet {
        fn charset(&self, _value: &str) -> String {
            String::new()
        }
    }

    #[test]
    fn insert_or_delete_changes_length_by_exactly_one() {
        let corruptor = edit(0.5, 0.5, 0.0, 0.0);
        let mut rng = ChaCha8Rng::from_seed([9u8; 32]);
        let (mut longer, mut shorter) = (0, 0);
        for _ in 0..2000 {
            let result = corruptor.corrupt("christensen", &mut rng);
            match result.chars().count() as i64 - 11 {
                1 => longer += 1,
                -1 => shorter += 1,
                other => panic!("Length changed by {} for {}", other, result),
            }
        }
        assert!(longer > 0 && shorter > 0);
    }

    #[test]
    fn substitute_keeps_length_and_transpose_swaps_neighbours() {
        let mut rng = ChaCha8Rng::from_seed([10u8; 32]);
        let substitute = edit(0.0, 0.0, 1.0, 0.0);
        for _ in 0..200 {
            assert_eq!(substitute.corrupt("peter", &mut rng).chars().count(), 5);
        }

        let transpose = edit(0.0, 0.0, 0.0, 1.0);
        for _ in 0..200 {
            let result = transpose.corrupt("abcd", &mut rng);
            let mut sorted: Vec<char> = result.chars().collect();
            sorted.sort_unstable();
            assert_eq!(sorted, vec!['a', 'b', 'c', 'd']);
            assert!(
                ["bacd", "acbd", "abdc"].contains(&result.as_str()),
                "Unexpected transposition {}",
                result
            );
        }
    }

    #[test]
    fn skip_conditions_return_input_unchanged() {
        let mut rng = ChaCha8Rng::from_seed([11u8; 32]);
        assert_eq!(edit(0.25, 0.25, 0.25, 0.25).corrupt("", &mut rng), "");
        assert_eq!(edit(0.0, 0.0, 0.0, 1.0).corrupt("x", &mut rng), "x");

        let no_chars = EditCorruptor::new(
            EditConfig {
                insert_prob: 1.0,
                delete_prob: 0.0,
                substitute_prob: 0.0,
                transpose_prob: 0.0,
            },
            Arc::new(UniformPosition),
            Arc::new(NoCharSet),
        )
        .unwrap();
        assert_eq!(no_chars.corrupt("peter", &mut rng), "peter");
    }

    #[test]
    fn probabilities_must_sum_to_one() {
        let result = EditCorruptor::new(
            EditConfig {
                insert_prob: 0.5,
                delete_prob: 0.5,
                substitute_prob: 0.5,
                transpose_prob: 0.0,
            },
            Arc::new(UniformPosition),
            Arc::new(AsciiCharSet),
        );
        assert!(matches!(result, Err(ConfigError::ProbabilitySum { .. })));
    }

    proptest! {
        #[test]
        fn insertions_grow_by_one_character(value in "[a-z]{1,20}", seed in any::<u64>()) {
            let corruptor = edit(1.0, 0.0, 0.0, 0.0);
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let result = corruptor.corrupt(&value, &mut rng);
            prop_assert_eq!(result.chars().count(), value.chars().count() + 1);
        }
    }
}
