//! Schema layer adapter.
//!
//! Loads an OpenAPI 3 document with `oas3` and reduces it to the operation and model
//! descriptors the generator consumes. Component schemas that are objects or string enums
//! become models; array and primitive components are inlined where they are referenced.

mod build;
mod load;
mod types;

pub use build::*;
pub use load::*;
pub use types::*;
