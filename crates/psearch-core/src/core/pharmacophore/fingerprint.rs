use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Width of the folded fingerprint space.
pub const FINGERPRINT_BITS: u32 = 2048;

/// A sparse, fixed-width pharmacophore fingerprint.
///
/// Only the indices of set bits are stored, sorted and unique. Two fingerprints are
/// comparable only when they were produced with the same binning step.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Fingerprint {
    bits: Vec<u32>,
}

impl Fingerprint {
    pub fn from_bits(bits: impl IntoIterator<Item = u32>) -> Self {
        let mut bits: Vec<u32> = bits.into_iter().map(|b| b % FINGERPRINT_BITS).collect();
        bits.sort_unstable();
        bits.dedup();
        Self { bits }
    }

    /// Folds an arbitrary signature string into a bit index.
    pub fn bit_for_signature(signature: &str) -> u32 {
        let digest = Sha256::digest(signature.as_bytes());
        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&digest[..8]);
        (u64::from_le_bytes(prefix) % u64::from(FINGERPRINT_BITS)) as u32
    }

    pub fn bits(&self) -> &[u32] {
        &self.bits
    }

    pub fn count_ones(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }
}
