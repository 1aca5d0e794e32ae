//! Driver configuration.

use annoforge_transforms::transform::TargetLanguage;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverConfig {
    /// Language handed to every transformation.
    pub language: TargetLanguage,
    /// Optimize sibling fragments on the rayon pool. Output order is
    /// unaffected.
    pub parallel_siblings: bool,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            language: TargetLanguage::C,
            parallel_siblings: false,
        }
    }
}
