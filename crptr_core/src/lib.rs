pub mod charset;
pub mod config;
pub mod driver;
pub mod duplicates;
pub mod error;
pub mod keyboard;
pub mod lookup;
pub mod position;
pub mod record;
pub mod selector;
pub mod value;

pub use charset::{AsciiCharSet, CharSetKind, CharSetProvider};
pub use config::{AttributePolicy, CorruptorSpec, CrptrConfig, DatasetSettings, GenerationSettings};
pub use driver::{CorruptionDriver, Corruptor, ModificationPolicy};
pub use duplicates::{DuplicateDistribution, DuplicatePlanner, duplicate_id};
pub use error::{ConfigError, LookupError};
pub use lookup::{Direction, LookupSource, VariantTable};
pub use position::{NormalPosition, PositionFunction, PositionKind, UniformPosition};
pub use record::{AttributeSchema, Record, RecordCorruptor};
pub use selector::WeightedSelector;
pub use value::ValueCorruptor;
