//! Code transformations selectable by annotation kind.

pub mod builtin;
pub mod registry;
pub mod transform;

pub use builtin::*;
pub use registry::*;
pub use transform::*;
