use std::path::PathBuf;
use thiserror::Error;

/// Tolerance used whenever a group of probabilities has to sum to 1.0.
pub const PROBABILITY_SUM_TOLERANCE: f64 = 1e-7;

/// Errors raised while a corruptor, a policy or a run configuration is being built.
///
/// All of these are fatal: they surface before any record is processed.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A probability-like parameter lies outside `[0, 1]` (or is not finite).
    #[error("Parameter '{name}' must lie in [0, 1], got {value}")]
    ProbabilityOutOfRange { name: String, value: f64 },

    /// A group of probabilities does not sum to 1.0 within tolerance.
    #[error("Probabilities of {context} sum to {sum}, expected 1.0")]
    ProbabilitySum { context: String, sum: f64 },

    /// A weighted list was given without any entries.
    #[error("No weighted entries given for {0}")]
    EmptyDistribution(String),

    /// A field name is not part of the data set's attribute list.
    #[error("Attribute '{0}' is not in the data set attribute list")]
    UnknownAttribute(String),

    /// The attribute list names the same attribute twice.
    #[error("Attribute '{0}' appears more than once in the attribute list")]
    DuplicateAttribute(String),

    /// An attribute policy refers to a corruptor that was never defined.
    #[error("Attribute '{attribute}' refers to undefined corruptor '{corruptor}'")]
    UnknownCorruptor { attribute: String, corruptor: String },

    /// A record corruptor was attached to a value field, or the other way round.
    #[error("Corruptor '{corruptor}' cannot be applied to attribute '{attribute}': {reason}")]
    MisplacedCorruptor {
        attribute: String,
        corruptor: String,
        reason: &'static str,
    },

    /// Any other illegal constructor parameter.
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// Loading a lookup table failed.
    #[error(transparent)]
    Lookup(#[from] LookupError),
}

impl ConfigError {
    pub fn invalid<S: Into<String>>(name: &'static str, reason: S) -> Self {
        ConfigError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

/// Errors raised while reading an external lookup table.
#[derive(Error, Debug)]
pub enum LookupError {
    #[error("Failed to read lookup file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unknown text encoding label '{0}'")]
    UnknownEncoding(String),

    #[error("Lookup file {path:?} is not valid {encoding} text")]
    Decode { path: PathBuf, encoding: String },

    #[error("Lookup file {path:?} could not be parsed: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A row violates the table's format. Rows are never skipped.
    #[error("Malformed row {row} in lookup file {path:?}: {reason}")]
    MalformedRow {
        path: PathBuf,
        row: usize,
        reason: String,
    },
}

/// Checks that `value` is a finite number in `[0, 1]`.
pub fn check_probability(name: &str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(ConfigError::ProbabilityOutOfRange {
            name: name.to_string(),
            value,
        })
    }
}

/// Checks that the given probabilities sum to 1.0 within [`PROBABILITY_SUM_TOLERANCE`].
pub fn check_sums_to_one<I>(context: &str, probabilities: I) -> Result<(), ConfigError>
where
    I: IntoIterator<Item = f64>,
{
    let sum: f64 = probabilities.into_iter().sum();
    if (sum - 1.0).abs() > PROBABILITY_SUM_TOLERANCE {
        return Err(ConfigError::ProbabilitySum {
            context: context.to_string(),
            sum,
        });
    }
    Ok(())
}
