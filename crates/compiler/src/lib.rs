//! Annotation validation and fragment optimization driver.

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod driver;
pub mod error;
pub mod files;
pub mod validate;

#[cfg(feature = "cli")]
pub use cli::*;
pub use config::*;
pub use driver::*;
pub use error::*;
pub use files::*;
pub use validate::*;
