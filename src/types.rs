//! Value representation and the type coercion engine.

pub mod coercion;
pub mod data_type;
pub mod datetime;
pub mod value;

pub use coercion::{compare_values, convert, derive_operation_type};
pub use data_type::DataType;
pub use value::Value;
