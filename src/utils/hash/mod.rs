use rabe_bn::Fr;
use sha3::{Digest, Sha3_256};
use crate::error::PabeError;
use std::ops::Mul;

/// Hash a label to [`rabe_bn::G1`] or [`rabe_bn::G2`] using base g.
pub fn sha3_hash<T: Mul<Fr, Output = T>>(g: T, data: &str) -> Result<T, PabeError> {
    let mut hasher = Sha3_256::new();
    hasher.update(data.as_bytes());
    match Fr::from_slice(&hasher.finalize()) {
        Ok(fr) => Ok(g * fr),
        Err(e) => Err(e.into()),
    }
}
