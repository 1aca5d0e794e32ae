//! Empirical performance tuning for `PerfTuning` regions.

pub mod cache;
pub mod search;
pub mod space;
pub mod spec;
pub mod tuner;

pub use cache::*;
pub use search::*;
pub use space::*;
pub use spec::*;
pub use tuner::*;
