//! Schema normalization: raw CSV cells to the canonical typed dataset.
//!
//! - canonical header names (`headers`)
//! - date parsing and numeric coercion (`values`)
//! - the row pipeline and its report (`normalize`)

pub mod headers;
pub mod normalize;
pub mod values;

pub use headers::*;
pub use normalize::*;
pub use values::*;
