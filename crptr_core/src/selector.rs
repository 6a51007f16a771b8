use crate::error::{ConfigError, check_probability, check_sums_to_one};
use rand::Rng;
use rand_core::RngCore;

/// Weighted random choice over a fixed list of options.
///
/// The weights partition `[0, 1)` into consecutive half-open intervals in list
/// order. One uniform draw selects the option whose interval contains it; a
/// draw past the last boundary (floating-point rounding) falls to the last
/// option with a positive weight. Options with weight 0 are never chosen.
#[derive(Debug, Clone)]
pub struct WeightedSelector<T> {
    options: Vec<T>,
    weights: Vec<f64>,
    upper_bounds: Vec<f64>,
    fallback: usize,
}

impl<T> WeightedSelector<T> {
    /// Validates the weights (each in `[0, 1]`, summing to 1.0) and builds the
    /// cumulative intervals. `context` names the distribution in errors.
    pub fn new(context: &str, entries: Vec<(f64, T)>) -> Result<Self, ConfigError> {
        if entries.is_empty() {
            return Err(ConfigError::EmptyDistribution(context.to_string()));
        }
        for (weight, _) in &entries {
            check_probability(context, *weight)?;
        }
        check_sums_to_one(context, entries.iter().map(|(w, _)| *w))?;

        let mut upper_bounds = Vec::with_capacity(entries.len());
        let mut weights = Vec::with_capacity(entries.len());
        let mut options = Vec::with_capacity(entries.len());
        let mut cumulative = 0.0;
        for (weight, option) in entries {
            cumulative += weight;
            upper_bounds.push(cumulative);
            weights.push(weight);
            options.push(option);
        }
        let fallback = weights
            .iter()
            .rposition(|w| *w > 0.0)
            .ok_or_else(|| ConfigError::EmptyDistribution(context.to_string()))?;

        Ok(Self {
            options,
            weights,
            upper_bounds,
            fallback,
        })
    }

    /// Maps a draw in `[0, 1)` to an option index.
    pub fn index_for(&self, draw: f64) -> usize {
        let mut lower = 0.0;
        for (idx, upper) in self.upper_bounds.iter().enumerate() {
            if self.weights[idx] > 0.0 && draw >= lower && draw < *upper {
                return idx;
            }
            lower = *upper;
        }
        self.fallback
    }

    /// Draws one uniform number and returns the selected option.
    pub fn select(&self, rng: &mut dyn RngCore) -> &T {
        let draw: f64 = rng.random();
        &self.options[self.index_for(draw)]
    }

    pub fn options(&self) -> &[T] {
        &self.options
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Options that can actually be drawn.
    pub fn reachable(&self) -> impl Iterator<Item = &T> {
        self.options
            .iter()
            .zip(self.weights.iter())
            .filter(|(_, w)| **w > 0.0)
            .map(|(option, _)| option)
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::ChaCha8Rng;
    use rand_core::SeedableRng;

    #[test]
    fn equal_weights_split_draws_evenly() {
        let selector = WeightedSelector::new("coin", vec![(0.5, "heads"), (0.5, "tails")]).unwrap();
        let mut rng = ChaCha8Rng::from_seed([7u8; 32]);
        let draws = 100_000;
        let heads = (0..draws)
            .filter(|_| *selector.select(&mut rng) == "heads")
            .count();
        let share = heads as f64 / draws as f64;
        assert!(
            (share - 0.5).abs() < 0.01,
            "Heads share {} should be close to 0.5",
            share
        );
    }

    #[test]
    fn zero_weight_options_are_never_selected() {
        let selector =
            WeightedSelector::new("edit", vec![(0.0, 'i'), (0.7, 'd'), (0.0, 's'), (0.3, 't')])
                .unwrap();
        let mut rng = ChaCha8Rng::from_seed([8u8; 32]);
        for _ in 0..10_000 {
            let choice = *selector.select(&mut rng);
            assert!(choice == 'd' || choice == 't', "Picked zero-weight option {}", choice);
        }
        assert_eq!(selector.reachable().copied().collect::<Vec<_>>(), vec!['d', 't']);
    }

    #[test]
    fn intervals_are_half_open_and_closed_at_one() {
        let selector = WeightedSelector::new("abc", vec![(0.25, 'a'), (0.25, 'b'), (0.5, 'c')]).unwrap();
        assert_eq!(selector.index_for(0.0), 0);
        assert_eq!(selector.index_for(0.2499), 0);
        assert_eq!(selector.index_for(0.25), 1);
        assert_eq!(selector.index_for(0.5), 2);
        assert_eq!(selector.index_for(0.9999999), 2);
        assert_eq!(selector.index_for(1.0), 2);

        let trailing_zero = WeightedSelector::new("tail", vec![(1.0, 'x'), (0.0, 'y')]).unwrap();
        assert_eq!(trailing_zero.index_for(1.0), 0);
    }

    #[test]
    fn weights_must_form_a_distribution() {
        assert!(matches!(
            WeightedSelector::new("bad-sum", vec![(0.5, 1), (0.4, 2)]),
            Err(ConfigError::ProbabilitySum { .. })
        ));
        assert!(matches!(
            WeightedSelector::new("bad-range", vec![(1.5, 1), (-0.5, 2)]),
            Err(ConfigError::ProbabilityOutOfRange { .. })
        ));
        assert!(matches!(
            WeightedSelector::<u8>::new("empty", vec![]),
            Err(ConfigError::EmptyDistribution(_))
        ));
    }
}
