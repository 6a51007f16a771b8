use rand::Rng;
use rand_core::RngCore;
use rand_distr::StandardNormal;
use serde::Deserialize;
use std::fmt::Debug;
use std::sync::Arc;

/// A `PositionFunction` decides where inside a string value a modification lands.
///
/// Implementations only look at the number of characters in the value, so any
/// sampler can be swapped in for any string-shaped corruptor.
pub trait PositionFunction: Debug + Send + Sync {
    /// Returns a character offset in `[0, len - 1]`, or 0 when `len` is 0.
    fn sample_len(&self, len: usize, rng: &mut dyn RngCore) -> usize;

    /// Returns a character offset into `value`, or 0 for the empty string.
    fn sample(&self, value: &str, rng: &mut dyn RngCore) -> usize {
        self.sample_len(value.chars().count(), rng)
    }
}

/// Every position in the string is equally likely.
#[derive(Debug, Default, Clone, Copy)]
pub struct UniformPosition;

impl PositionFunction for UniformPosition {
    fn sample_len(&self, len: usize, rng: &mut dyn RngCore) -> usize {
        if len == 0 {
            return 0;
        }
        rng.random_range(0..len)
    }
}

/// Positions follow a normal distribution centred one character behind the
/// middle of the string with a standard deviation of a quarter of its length.
///
/// Typing errors cluster towards the middle and end of a token rather than
/// at its first character. Draws outside the string are rejected and redrawn.
#[derive(Debug, Default, Clone, Copy)]
pub struct NormalPosition;

impl PositionFunction for NormalPosition {
    fn sample_len(&self, len: usize, rng: &mut dyn RngCore) -> usize {
        // A single character only has one position to offer.
        if len <= 1 {
            return 0;
        }
        let mean = len as f64 / 2.0 + 1.0;
        let std_dev = len as f64 / 4.0;
        let max_pos = (len - 1) as f64;
        loop {
            let z: f64 = rng.sample(StandardNormal);
            let pos = (mean + std_dev * z).round();
            if (0.0..=max_pos).contains(&pos) {
                return pos as usize;
            }
        }
    }
}

/// Named position policies as they appear in configuration files.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum PositionKind {
    Uniform,
    #[default]
    Normal,
}

impl PositionKind {
    pub fn build(self) -> Arc<dyn PositionFunction> {
        match self {
            PositionKind::Uniform => Arc::new(UniformPosition),
            PositionKind::Normal => Arc::new(NormalPosition),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::ChaCha8Rng;
    use rand_core::SeedableRng;

    #[test]
    fn empty_string_always_yields_zero() {
        let mut rng = ChaCha8Rng::from_seed([0u8; 32]);
        assert_eq!(UniformPosition.sample("", &mut rng), 0);
        assert_eq!(NormalPosition.sample("", &mut rng), 0);
    }

    #[test]
    fn uniform_position_covers_every_index() {
        let mut rng = ChaCha8Rng::from_seed([3u8; 32]);
        let mut seen = [false; 5];
        for _ in 0..500 {
            let pos = UniformPosition.sample("abcde", &mut rng);
            assert!(pos < 5, "Position {} out of range", pos);
            seen[pos] = true;
        }
        assert!(seen.iter().all(|s| *s), "Not every index was drawn: {:?}", seen);
    }

    #[test]
    fn normal_position_stays_in_range_and_skews_late() {
        let mut rng = ChaCha8Rng::from_seed([4u8; 32]);
        let value = "abcdefghijkl";
        let mut total = 0usize;
        let draws = 2000;
        for _ in 0..draws {
            let pos = NormalPosition.sample(value, &mut rng);
            assert!(pos < value.len());
            total += pos;
        }
        let average = total as f64 / draws as f64;
        assert!(
            average > 5.0,
            "Normal positions should centre behind the middle, average was {}",
            average
        );
    }

    #[test]
    fn positions_count_characters_not_bytes() {
        let mut rng = ChaCha8Rng::from_seed([5u8; 32]);
        for _ in 0..200 {
            assert!(UniformPosition.sample("äöü", &mut rng) < 3);
            assert!(NormalPosition.sample("äöü", &mut rng) < 3);
        }
    }
}
