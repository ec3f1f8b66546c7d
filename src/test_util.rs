//! Shared helpers for unit tests: a cheap deterministic hash scheme standing
//! in for the host's zk-friendly hash.

use crate::errors::Error;
use crate::hash::{check_in_field, init_hash_scheme, Fr, FIELD_MODULUS};

/// Quadratic accumulator over the field: `acc = acc * 65536 + x^2`.
/// Deterministic and order-sensitive, which is all the trie needs from a
/// test stand-in.
pub fn quad_hash(inputs: &[Fr]) -> Result<Fr, Error> {
    let multiplier = Fr::from(65536u64);
    let mut acc = Fr::ZERO;
    for x in inputs {
        if !check_in_field(x) {
            return Err(Error::InvalidField);
        }
        let square = x.mul_mod(*x, FIELD_MODULUS);
        acc = acc
            .mul_mod(multiplier, FIELD_MODULUS)
            .add_mod(square, FIELD_MODULUS);
    }
    Ok(acc)
}

/// Install [`quad_hash`] as the process-wide scheme. Safe to call from every
/// test; only the first call has any effect.
pub fn init_test_hash_scheme() {
    init_hash_scheme(Box::new(quad_hash));
}
