//! # Sharding Hash
//!
//! Maps a sharding value onto the non-negative hash space.
//!
//! Integers are used as-is with the sign bit masked. Text is hashed with the
//! configured [`HashAlgorithm`] and masked the same way.

use crate::domain::{HashAlgorithm, RoutingError};
use sha3::{Digest, Keccak256};
use shared_types::ShardingValue;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Hash raw bytes with the selected algorithm.
pub fn hash_bytes(algorithm: HashAlgorithm, data: &[u8]) -> u64 {
    match algorithm {
        HashAlgorithm::Bernstein => data
            .iter()
            .fold(0u64, |h, b| h.wrapping_mul(33).wrapping_add(*b as u64)),
        HashAlgorithm::Fnv1a => data.iter().fold(FNV_OFFSET, |h, b| {
            (h ^ *b as u64).wrapping_mul(FNV_PRIME)
        }),
        HashAlgorithm::Keccak => {
            let digest = Keccak256::digest(data);
            let mut head = [0u8; 8];
            head.copy_from_slice(&digest[..8]);
            u64::from_be_bytes(head)
        }
    }
}

/// Non-negative position of a sharding value, before the capacity modulo.
pub fn sharding_hash(
    cluster: &str,
    value: &ShardingValue,
    algorithm: HashAlgorithm,
) -> Result<u64, RoutingError> {
    match value {
        ShardingValue::Int(v) => Ok((*v & i64::MAX) as u64),
        ShardingValue::Text(s) if s.is_empty() => {
            Err(RoutingError::EmptyShardingValue(cluster.to_string()))
        }
        ShardingValue::Text(s) => Ok(hash_bytes(algorithm, s.as_bytes()) & i64::MAX as u64),
    }
}
