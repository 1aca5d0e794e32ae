//! Fragment tree and variant model for the annoforge optimizer.

pub mod builder;
pub mod fragment;
pub mod params;
pub mod variant;

pub use builder::*;
pub use fragment::*;
pub use params::*;
pub use variant::*;
