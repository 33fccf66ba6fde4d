pub mod decimal;
pub mod error;
pub mod types;
pub mod value;

pub use decimal::HiveDecimal;
pub use error::ConvertError;
pub use types::{HiveType, StructField};
pub use value::{HiveMap, HiveValue};
