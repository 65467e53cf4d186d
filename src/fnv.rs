//! 64-bit FNV-1a, the default key hasher.
//!
//! The table feeds key bytes straight into `Hasher::write` (no length or
//! terminator suffix), so slot placement is a fixed function of the key text
//! and the capacity.

use core::hash::{BuildHasher, Hasher};

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

#[derive(Copy, Clone, Debug)]
pub struct FnvHasher {
    hash: u64,
}

impl FnvHasher {
    pub const fn new() -> Self {
        Self {
            hash: FNV_OFFSET_BASIS,
        }
    }
}

impl Default for FnvHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher for FnvHasher {
    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.hash ^= u64::from(b);
            self.hash = self.hash.wrapping_mul(FNV_PRIME);
        }
    }

    #[inline]
    fn finish(&self) -> u64 {
        self.hash
    }
}

/// Stateless builder for [`FnvHasher`]; the default `S` of `CounterTable`.
#[derive(Copy, Clone, Debug, Default)]
pub struct FnvBuildHasher;

impl BuildHasher for FnvBuildHasher {
    type Hasher = FnvHasher;

    fn build_hasher(&self) -> Self::Hasher {
        FnvHasher::new()
    }
}
