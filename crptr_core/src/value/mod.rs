use rand_core::RngCore;
use std::fmt::Debug;

mod basic;
mod categorical;
mod date;
mod edit;
mod keyboard;
mod ocr;
mod phonetic;

pub use basic::{
    AbbreviationConfig, AbbreviationCorruptor, MissingValueConfig, MissingValueCorruptor,
    UnknownCharConfig, UnknownCharCorruptor,
};
pub use categorical::{
    CategoricalDomainConfig, CategoricalDomainCorruptor, CategoricalValueCorruptor,
};
pub use date::{DateComponent, DateConfig, DateCorruptor, DateMethod, DateOrder};
pub use edit::{EditConfig, EditCorruptor, EditOperation};
pub use keyboard::{KeyboardConfig, KeyboardCorruptor};
pub use ocr::OcrCorruptor;
pub use phonetic::{
    ContextCheck, ExistCondition, NeighbourCondition, PhoneticCorruptor, PhoneticRule,
    PhoneticRules, Scope, StartCondition,
};

/// Number of fresh positions the keyboard and OCR corruptors try before giving up.
pub const MAX_POSITION_TRIES: usize = 10;

/// A `ValueCorruptor` turns one field value into a plausibly mistyped,
/// misread or misheard variant of itself.
///
/// Corruptors are built once from a validated configuration and reused for
/// every record. Inputs that offer nothing to corrupt (the empty string, a
/// value missing from a lookup table, ...) come back unchanged.
pub trait ValueCorruptor: Debug + Send + Sync {
    /// Diagnostic label.
    fn name(&self) -> &str;

    fn corrupt(&self, value: &str, rng: &mut dyn RngCore) -> String;
}

/// Replaces the characters `chars[start..end]` with `replacement`.
pub(crate) fn splice(chars: &[char], start: usize, end: usize, replacement: &str) -> String {
    let mut out = String::with_capacity(chars.len() + replacement.len());
    out.extend(&chars[..start]);
    out.push_str(replacement);
    out.extend(&chars[end..]);
    out
}
