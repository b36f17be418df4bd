//! Crate-wide constants shared by the native hasher and the in-circuit hash gate.

use ark_bn254::Fr;
use ark_crypto_primitives::sponge::poseidon::{find_poseidon_ark_and_mds, PoseidonConfig};
use ark_ff::PrimeField;

/// Depth used when a caller does not pick one.
pub const DEFAULT_MERKLE_DEPTH: usize = 4;

/// Largest tree depth accepted by [`crate::merkle::MerkleTree`]; keeps `2^depth` leaves in memory.
pub const MAX_TREE_DEPTH: usize = 20;

// Poseidon sponge configuration.
//
// Width 3 (rate 2, capacity 1) so one permutation compresses a pair of field elements.
pub const POSEIDON_RATE: usize = 2;
pub const POSEIDON_CAPACITY: usize = 1;
pub const POSEIDON_WIDTH: usize = POSEIDON_RATE + POSEIDON_CAPACITY;

pub const POSEIDON_FULL_ROUNDS: usize = 8;
pub const POSEIDON_PARTIAL_ROUNDS: usize = 57;

/// S-box exponent.
pub const POSEIDON_ALPHA: u64 = 5;

/// Deterministically derive Poseidon parameters for BN254::Fr.
///
/// Both [`crate::poseidon::hash_two`] and [`crate::poseidon::hasher_template`] read the same
/// round constants and MDS matrix from here, so the circuit and the native hash always agree.
pub fn poseidon_config() -> PoseidonConfig<Fr> {
    let prime_bits = Fr::MODULUS_BIT_SIZE as u64;

    let (ark, mds) = find_poseidon_ark_and_mds::<Fr>(
        prime_bits,
        POSEIDON_RATE,
        POSEIDON_FULL_ROUNDS as u64,
        POSEIDON_PARTIAL_ROUNDS as u64,
        0,
    );

    PoseidonConfig::new(
        POSEIDON_FULL_ROUNDS,
        POSEIDON_PARTIAL_ROUNDS,
        POSEIDON_ALPHA,
        mds,
        ark,
        POSEIDON_RATE,
        POSEIDON_CAPACITY,
    )
}
