//! # Router Configuration

use crate::domain::HashAlgorithm;
use serde::{Deserialize, Serialize};

/// Router configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Hash used for text sharding values.
    pub hash_algorithm: HashAlgorithm,
}

impl RouterConfig {
    /// Builder-style method to select the hash algorithm.
    pub fn with_hash_algorithm(mut self, algorithm: HashAlgorithm) -> Self {
        self.hash_algorithm = algorithm;
        self
    }
}
