use super::{MAX_POSITION_TRIES, ValueCorruptor, splice};
use crate::error::ConfigError;
use crate::lookup::{Direction, LookupSource, VariantTable};
use crate::position::PositionFunction;
use rand::Rng;
use rand_core::RngCore;
use std::sync::Arc;
use tracing::trace;

/// Longest character sequence looked up at a sampled position.
const MAX_OCR_TOKEN_LEN: usize = 3;

/// Simulates optical character recognition errors (`5` read as `S`, `m` as `rn`)
/// from a table of confusable character sequences.
///
/// The table is symmetric: every variant can also be misread as its original.
#[derive(Debug, Clone)]
pub struct OcrCorruptor {
    table: Arc<VariantTable>,
    position: Arc<dyn PositionFunction>,
}

impl OcrCorruptor {
    pub fn new(
        source: &LookupSource,
        position: Arc<dyn PositionFunction>,
    ) -> Result<Self, ConfigError> {
        let table = VariantTable::load(source, Direction::Symmetric)?;
        Ok(Self::with_table(Arc::new(table), position))
    }

    /// Uses an already loaded table.
    pub fn with_table(table: Arc<VariantTable>, position: Arc<dyn PositionFunction>) -> Self {
        Self { table, position }
    }
}

impl ValueCorruptor for OcrCorruptor {
    fn name(&self) -> &str {
        "OCR value"
    }

    fn corrupt(&self, value: &str, rng: &mut dyn RngCore) -> String {
        let chars: Vec<char> = value.chars().collect();
        if chars.is_empty() {
            return value.to_string();
        }

        for _ in 0..MAX_POSITION_TRIES {
            let pos = self.position.sample_len(chars.len(), rng);

            // Near the end of the value longer windows collapse onto shorter ones.
            let mut seen: Vec<usize> = Vec::with_capacity(MAX_OCR_TOKEN_LEN);
            let mut options: Vec<(usize, &str)> = Vec::new();
            for token_len in 1..=MAX_OCR_TOKEN_LEN {
                let end = (pos + token_len).min(chars.len());
                if seen.contains(&end) {
                    continue;
                }
                seen.push(end);
                let token: String = chars[pos..end].iter().collect();
                if let Some(variants) = self.table.variants(&token) {
                    options.extend(variants.iter().map(|v| (end, v.as_str())));
                }
            }

            if !options.is_empty() {
                let (end, variant) = options[rng.random_range(0..options.len())];
                return splice(&chars, pos, end, variant);
            }
        }
        trace!(value, "No OCR variation found, value left unchanged");
        value.to_string()
    }
}
