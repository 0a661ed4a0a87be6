//! `FEASE` KP-ABE scheme.
//!
//! * Developped by "Fast (and Anonymous) Attribute-Based Encryption with Adaptive Security under Standard Assumption", see Figure 3
//! * Published in 2023
//! * Type: encryption (key-policy attribute-based)
//! * Setting: bilinear groups (asymmetric, type-III)
//!
//! The access policy is compiled into the secret key; ciphertexts are
//! bound to plain attribute sets.
//!
//! # Examples
//!
//! ```
//! use pabe::schemes::{Scheme, AccessStructure, fease::Fease};
//! use pabe::utils::policy::engine::PolicyEngine;
//! let scheme = Fease::new(PolicyEngine::new());
//! let (pk, msk) = scheme.setup();
//! let plaintext = String::from("our plaintext!").into_bytes();
//! let attributes: Vec<String> = vec!["A".to_string(), "B".to_string()];
//! let sk = scheme.keygen(&pk, &msk, AccessStructure::Policy(r#"A and B"#)).unwrap();
//! let ct = scheme.encrypt(&pk, AccessStructure::Attributes(&attributes), &plaintext).unwrap();
//! assert_eq!(scheme.decrypt(&sk, &ct).unwrap(), plaintext);
//! ```
use rabe_bn::{pairing, Fr, Group, Gt, G1, G2};
use rand::Rng;
use crate::error::PabeError;
use crate::schemes::{AccessStructure, Scheme};
use crate::utils::{
    aes::{decrypt_symmetric, encrypt_symmetric},
    hash::sha3_hash,
    policy::engine::PolicyEngine,
    policy::pest::LeafLabel,
    secretsharing::PruneResult,
    tools::canonical_label,
};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "borsh")]
use borsh::{BorshDeserialize, BorshSerialize};

/// A FEASE Public Key (PK)
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "borsh", derive(BorshSerialize, BorshDeserialize))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FeasePublicKey {
    pub g_1: G1,
    pub g_2: G2,
    pub g_2_b1: G2,
    pub g_2_b2: G2,
    pub e_g1g2_a: Gt,
}

/// A FEASE Master Key (MSK)
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "borsh", derive(BorshSerialize, BorshDeserialize))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FeaseMasterKey {
    pub a: Fr,
    pub b_1: Fr,
    pub b_2: Fr,
}

/// A FEASE Secret Key (SK), bound to a policy
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "borsh", derive(BorshSerialize, BorshDeserialize))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FeaseSecretKey {
    pub policy: String,
    pub sk_1: G2,
    pub sk_2: Vec<(LeafLabel, G1)>,
    pub sk_3: Vec<(LeafLabel, G1)>,
}

/// A FEASE Ciphertext (CT), bound to a set of attributes
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "borsh", derive(BorshSerialize, BorshDeserialize))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FeaseCiphertext {
    pub attr: Vec<String>,
    pub c_1: Vec<(String, G1)>,
    pub c_2: G2,
    pub c_3: G2,
    pub c_4: Gt,
    pub ct: Vec<u8>,
}

/// The FEASE key-policy scheme. Holds the policy engine it was
/// constructed with.
#[derive(Clone, Copy, Debug)]
pub struct Fease {
    engine: PolicyEngine,
}

impl Fease {
    pub fn new(engine: PolicyEngine) -> Fease {
        Fease { engine }
    }
}

impl Scheme for Fease {
    type PublicKey = FeasePublicKey;
    type MasterKey = FeaseMasterKey;
    type SecretKey = FeaseSecretKey;
    type Ciphertext = FeaseCiphertext;

    fn name(&self) -> &'static str {
        "FEASE KP-ABE"
    }

    /// Generates a FeasePublicKey and a FeaseMasterKey.
    fn setup(&self) -> (FeasePublicKey, FeaseMasterKey) {
        // random number generator
        let mut rng = rand::thread_rng();
        let g_1: G1 = rng.gen();
        let g_2: G2 = rng.gen();
        let a: Fr = rng.gen();
        let b_1: Fr = rng.gen();
        let b_2: Fr = rng.gen();
        let e_g1g2_a = pairing(g_1, g_2).pow(a);
        (
            FeasePublicKey {
                g_1,
                g_2,
                g_2_b1: g_2 * b_1,
                g_2_b2: g_2 * b_2,
                e_g1g2_a,
            },
            FeaseMasterKey { a, b_1, b_2 },
        )
    }

    /// Generates a FeaseSecretKey embedding the access policy.
    fn keygen(
        &self,
        pk: &FeasePublicKey,
        msk: &FeaseMasterKey,
        access: AccessStructure,
    ) -> Result<FeaseSecretKey, PabeError> {
        let policy_str = access.policy()?;
        let mut rng = rand::thread_rng();
        let policy = self.engine.parse(policy_str)?;
        let msp = self.engine.compile(&policy)?;
        let r: Fr = rng.gen();
        // the master secret is shared over the policy leaves
        let shares = self.engine.distribute(&msp, msk.a, &mut rng)?;
        let b_1_inv = msk
            .b_1
            .inverse()
            .ok_or_else(|| PabeError::Crypto("non-invertible master key component".to_string()))?;
        let b_2_inv = msk
            .b_2
            .inverse()
            .ok_or_else(|| PabeError::Crypto("non-invertible master key component".to_string()))?;
        let sk_1 = pk.g_2 * r;
        let mut sk_2: Vec<(LeafLabel, G1)> = Vec::with_capacity(shares.len());
        let mut sk_3: Vec<(LeafLabel, G1)> = Vec::with_capacity(shares.len());
        for (label, share) in shares {
            let attr_hash = sha3_hash(pk.g_1, label.canonical())?;
            let tep = pk.g_1 * share + attr_hash * r;
            sk_2.push((label.clone(), tep * b_1_inv));
            sk_3.push((label, tep * b_2_inv));
        }
        Ok(FeaseSecretKey {
            policy: policy_str.to_string(),
            sk_1,
            sk_2,
            sk_3,
        })
    }

    /// Encrypts plaintext data under a set of attributes.
    fn encrypt(
        &self,
        pk: &FeasePublicKey,
        access: AccessStructure,
        plaintext: &[u8],
    ) -> Result<FeaseCiphertext, PabeError> {
        let attributes = access.attributes()?;
        if attributes.is_empty() {
            return Err(PabeError::Policy("empty attribute set".to_string()));
        }
        let mut rng = rand::thread_rng();
        // pick randomness
        let s_1: Fr = rng.gen();
        let s_2: Fr = rng.gen();
        let s = s_1 + s_2;
        let mut c_1: Vec<(String, G1)> = Vec::with_capacity(attributes.len());
        for attr in attributes {
            let attr_hash = sha3_hash(pk.g_1, canonical_label(attr))?;
            c_1.push((attr.clone(), attr_hash * s));
        }
        let c_2 = pk.g_2_b1 * s_1;
        let c_3 = pk.g_2_b2 * s_2;
        let msg: Gt = rng.gen();
        let c_4 = pk.e_g1g2_a.pow(s) * msg;
        let ct = encrypt_symmetric(&msg, plaintext)?;
        Ok(FeaseCiphertext {
            attr: attributes.to_vec(),
            c_1,
            c_2,
            c_3,
            c_4,
            ct,
        })
    }

    /// Reconstructs the plaintext from a ciphertext whose attributes
    /// satisfy the policy embedded in the secret key.
    fn decrypt(&self, sk: &FeaseSecretKey, ct: &FeaseCiphertext) -> Result<Vec<u8>, PabeError> {
        let policy = self.engine.parse(&sk.policy)?;
        let subsets = match self.engine.prune(&policy, &ct.attr) {
            PruneResult::Satisfied(subsets) => subsets,
            PruneResult::Unsatisfiable => {
                return Err(PabeError::Policy(
                    "attributes in CT do not satisfy the policy in SK".to_string(),
                ))
            }
        };
        let subset = &subsets[0];
        let mut prod_c_1 = G1::zero();
        let mut prod_sk_2 = G1::zero();
        let mut prod_sk_3 = G1::zero();
        for label in subset {
            let c_attr = ct
                .c_1
                .iter()
                .find(|(name, _)| canonical_label(name) == label.canonical())
                .map(|(_, value)| *value)
                .ok_or_else(|| PabeError::AttributeNotFound { label: label.to_string() })?;
            let sk_2_attr = sk
                .sk_2
                .iter()
                .find(|(l, _)| l == label)
                .map(|(_, value)| *value)
                .ok_or_else(|| PabeError::AttributeNotFound { label: label.to_string() })?;
            let sk_3_attr = sk
                .sk_3
                .iter()
                .find(|(l, _)| l == label)
                .map(|(_, value)| *value)
                .ok_or_else(|| PabeError::AttributeNotFound { label: label.to_string() })?;
            prod_c_1 = prod_c_1 + c_attr;
            prod_sk_2 = prod_sk_2 + sk_2_attr;
            prod_sk_3 = prod_sk_3 + sk_3_attr;
        }
        let e1 = pairing(prod_c_1, sk.sk_1);
        let e2 = pairing(prod_sk_2, ct.c_2);
        let e3 = pairing(prod_sk_3, ct.c_3);
        let msg = ct.c_4 * e1 * (e2 * e3).inverse();
        decrypt_symmetric(&msg, &ct.ct)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(attrs: &[&str]) -> Vec<String> {
        attrs.iter().map(|a| a.to_string()).collect()
    }

    #[test]
    fn test_or_branch() {
        let scheme = Fease::new(PolicyEngine::new());
        let (pk, msk) = scheme.setup();
        let plaintext = String::from("our plaintext!").into_bytes();
        let sk = scheme
            .keygen(&pk, &msk, AccessStructure::Policy("(A and B) or C"))
            .unwrap();
        let attributes = set(&["C", "D"]);
        let ct = scheme
            .encrypt(&pk, AccessStructure::Attributes(&attributes), &plaintext)
            .unwrap();
        assert_eq!(scheme.decrypt(&sk, &ct).unwrap(), plaintext);
    }

    #[test]
    fn test_nested_policy() {
        let scheme = Fease::new(PolicyEngine::new());
        let (pk, msk) = scheme.setup();
        let plaintext = String::from("our plaintext!").into_bytes();
        let sk = scheme
            .keygen(&pk, &msk, AccessStructure::Policy("A and (B or (C and D))"))
            .unwrap();
        let attributes = set(&["A", "C", "D"]);
        let ct = scheme
            .encrypt(&pk, AccessStructure::Attributes(&attributes), &plaintext)
            .unwrap();
        assert_eq!(scheme.decrypt(&sk, &ct).unwrap(), plaintext);
    }

    #[test]
    fn test_not_satisfied() {
        let scheme = Fease::new(PolicyEngine::new());
        let (pk, msk) = scheme.setup();
        let plaintext = String::from("our plaintext!").into_bytes();
        let sk = scheme
            .keygen(&pk, &msk, AccessStructure::Policy("A and B"))
            .unwrap();
        let attributes = set(&["A"]);
        let ct = scheme
            .encrypt(&pk, AccessStructure::Attributes(&attributes), &plaintext)
            .unwrap();
        assert!(scheme.decrypt(&sk, &ct).is_err());
    }
}
