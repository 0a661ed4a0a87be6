//! Key encapsulation: the payload travels AES-256-GCM encrypted under a
//! key derived from an encapsulated group element.
use aes_gcm::{
    aead::{generic_array::GenericArray, Aead},
    Aes256Gcm, KeyInit, Nonce,
};
use rand::Rng;
use sha3::{Digest, Sha3_256};
use std::fmt::Debug;
use crate::error::PabeError;

const NONCE_SIZE: usize = 12;

/// Key Encapsulation Mechanism (encryption side). The random nonce is
/// prefixed to the returned ciphertext.
pub fn encrypt_symmetric<T: Debug>(msg: &T, plaintext: &[u8]) -> Result<Vec<u8>, PabeError> {
    let mut rng = rand::thread_rng();
    let key = kdf(msg);
    let nonce_data: [u8; NONCE_SIZE] = rng.gen();
    let nonce = Nonce::from_slice(&nonce_data);
    match Aes256Gcm::new(GenericArray::from_slice(&key)).encrypt(nonce, plaintext) {
        Ok(mut ct) => {
            let mut out = nonce_data.to_vec();
            out.append(&mut ct);
            Ok(out)
        }
        Err(e) => Err(e.into()),
    }
}

/// Key Encapsulation Mechanism (decryption side). Fails on a wrong key
/// or a tampered ciphertext; trial decryption relies on this to reject
/// wrong policy branches.
pub fn decrypt_symmetric<T: Debug>(msg: &T, nonce_ct: &[u8]) -> Result<Vec<u8>, PabeError> {
    if nonce_ct.len() < NONCE_SIZE {
        return Err(PabeError::Crypto("ciphertext too short".to_string()));
    }
    let (nonce_data, ct) = nonce_ct.split_at(NONCE_SIZE);
    let key = kdf(msg);
    let nonce = Nonce::from_slice(nonce_data);
    match Aes256Gcm::new(GenericArray::from_slice(&key)).decrypt(nonce, ct) {
        Ok(data) => Ok(data),
        Err(e) => Err(e.into()),
    }
}

/// 256 bit AES key derived from the encapsulated element.
fn kdf<T: Debug>(msg: &T) -> Vec<u8> {
    let mut hasher = Sha3_256::new();
    hasher.update(format!("{:?}", msg).as_bytes());
    hasher.finalize().to_vec()
}
