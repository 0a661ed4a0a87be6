//! `FABEO` CP-ABE scheme by Doreen Riepel and Hoeteck Wee.
//!
//! * Developped by Doreen Riepel, Hoeteck Wee, "FABEO: Fast Attribute-Based Encryption with Optimal Security", see Figure 1 (left)
//! * Published in Proceedings of the 2022 ACM SIGSAC Conference on Computer and Communications Security 2022
//! * Available from <https://eprint.iacr.org/2022/1415.pdf>
//! * Type: encryption (ciphertext-policy attribute-based)
//! * Setting: bilinear groups (asymmetric)
//!
//! # Examples
//!
//! ```
//! use pabe::schemes::{Scheme, AccessStructure, fabeo::Fabeo};
//! use pabe::utils::policy::engine::PolicyEngine;
//! let scheme = Fabeo::new(PolicyEngine::new());
//! let (pk, msk) = scheme.setup();
//! let plaintext = String::from("our plaintext!").into_bytes();
//! let attributes: Vec<String> = vec!["A".to_string(), "B".to_string()];
//! let sk = scheme.keygen(&pk, &msk, AccessStructure::Attributes(&attributes)).unwrap();
//! let ct = scheme.encrypt(&pk, AccessStructure::Policy(r#"A and B"#), &plaintext).unwrap();
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

/// A FABEO Public Key (PK)
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "borsh", derive(BorshSerialize, BorshDeserialize))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FabeoPublicKey {
    pub g: G1,
    pub h: G2,
    pub e_gh_alpha: Gt,
}

/// A FABEO Master Key (MSK)
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "borsh", derive(BorshSerialize, BorshDeserialize))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FabeoMasterKey {
    pub alpha: Fr,
}

/// A FABEO Secret Key (SK), bound to a set of attributes
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "borsh", derive(BorshSerialize, BorshDeserialize))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FabeoSecretKey {
    pub attr: Vec<String>,
    pub h_r: G2,
    pub sk_1: Vec<(String, G1)>,
    pub sk_2: G1,
}

/// A FABEO Ciphertext (CT), bound to a policy
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "borsh", derive(BorshSerialize, BorshDeserialize))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FabeoCiphertext {
    pub policy: String,
    pub h_s0: G2,
    pub h_s1: G2,
    pub c: Vec<(LeafLabel, G1)>,
    pub c_p: Gt,
    pub ct: Vec<u8>,
}

/// Domain separation label of the common base point b.
const B_POINT: &str = "fabeo:b";

/// The FABEO ciphertext-policy scheme. Holds the policy engine it was
/// constructed with.
#[derive(Clone, Copy, Debug)]
pub struct Fabeo {
    engine: PolicyEngine,
}

impl Fabeo {
    pub fn new(engine: PolicyEngine) -> Fabeo {
        Fabeo { engine }
    }
}

impl Scheme for Fabeo {
    type PublicKey = FabeoPublicKey;
    type MasterKey = FabeoMasterKey;
    type SecretKey = FabeoSecretKey;
    type Ciphertext = FabeoCiphertext;

    fn name(&self) -> &'static str {
        "FABEO CP-ABE"
    }

    /// Generates a FabeoPublicKey and a FabeoMasterKey.
    fn setup(&self) -> (FabeoPublicKey, FabeoMasterKey) {
        // random number generator
        let mut rng = rand::thread_rng();
        let g: G1 = rng.gen();
        let h: G2 = rng.gen();
        let alpha: Fr = rng.gen();
        let e_gh_alpha = pairing(g, h).pow(alpha);
        (FabeoPublicKey { g, h, e_gh_alpha }, FabeoMasterKey { alpha })
    }

    /// Generates a FabeoSecretKey for a set of attributes.
    fn keygen(
        &self,
        pk: &FabeoPublicKey,
        msk: &FabeoMasterKey,
        access: AccessStructure,
    ) -> Result<FabeoSecretKey, PabeError> {
        let attributes = access.attributes()?;
        if attributes.is_empty() {
            return Err(PabeError::Policy("empty attribute set".to_string()));
        }
        let mut rng = rand::thread_rng();
        let r: Fr = rng.gen();
        let h_r = pk.h * r;
        let mut sk_1: Vec<(String, G1)> = Vec::with_capacity(attributes.len());
        for attr in attributes {
            let attr_hash = sha3_hash(pk.g, canonical_label(attr))?;
            sk_1.push((attr.clone(), attr_hash * r));
        }
        let b = sha3_hash(pk.g, B_POINT)?;
        let sk_2 = pk.g * msk.alpha + b * r;
        Ok(FabeoSecretKey {
            attr: attributes.to_vec(),
            h_r,
            sk_1,
            sk_2,
        })
    }

    /// Encrypts plaintext data under an access policy.
    fn encrypt(
        &self,
        pk: &FabeoPublicKey,
        access: AccessStructure,
        plaintext: &[u8],
    ) -> Result<FabeoCiphertext, PabeError> {
        let policy_str = access.policy()?;
        let mut rng = rand::thread_rng();
        let policy = self.engine.parse(policy_str)?;
        let msp = self.engine.compile(&policy)?;
        // pick randomness
        let s0: Fr = rng.gen();
        let s1: Fr = rng.gen();
        let h_s0 = pk.h * s0;
        let h_s1 = pk.h * s1;
        // one share of s0 per policy leaf
        let shares = self.engine.distribute(&msp, s0, &mut rng)?;
        let b = sha3_hash(pk.g, B_POINT)?;
        let mut c: Vec<(LeafLabel, G1)> = Vec::with_capacity(shares.len());
        for (label, share) in shares {
            let attr_hash = sha3_hash(pk.g, label.canonical())?;
            c.push((label, b * share + attr_hash * s1));
        }
        let msg: Gt = rng.gen();
        let c_p = pk.e_gh_alpha.pow(s0) * msg;
        let ct = encrypt_symmetric(&msg, plaintext)?;
        Ok(FabeoCiphertext {
            policy: policy_str.to_string(),
            h_s0,
            h_s1,
            c,
            c_p,
            ct,
        })
    }

    /// Reconstructs the plaintext from a ciphertext whose policy the
    /// secret key's attributes satisfy.
    fn decrypt(&self, sk: &FabeoSecretKey, ct: &FabeoCiphertext) -> Result<Vec<u8>, PabeError> {
        let policy = self.engine.parse(&ct.policy)?;
        let subsets = match self.engine.prune(&policy, &sk.attr) {
            PruneResult::Satisfied(subsets) => subsets,
            PruneResult::Unsatisfiable => {
                return Err(PabeError::Policy(
                    "attributes in SK do not satisfy the policy in CT".to_string(),
                ))
            }
        };
        // the policy is public, any minimal subset reconstructs
        let subset = &subsets[0];
        let mut prod_sk = G1::zero();
        let mut prod_ct = G1::zero();
        for label in subset {
            let sk_attr = sk
                .sk_1
                .iter()
                .find(|(name, _)| canonical_label(name) == label.canonical())
                .map(|(_, value)| *value)
                .ok_or_else(|| PabeError::AttributeNotFound { label: label.to_string() })?;
            let ct_attr = ct
                .c
                .iter()
                .find(|(l, _)| l == label)
                .map(|(_, value)| *value)
                .ok_or_else(|| PabeError::AttributeNotFound { label: label.to_string() })?;
            prod_sk = prod_sk + sk_attr;
            prod_ct = prod_ct + ct_attr;
        }
        let e0 = pairing(sk.sk_2, ct.h_s0);
        let e1 = pairing(prod_sk, ct.h_s1);
        let e2 = pairing(prod_ct, sk.h_r);
        let kem = e0 * e1 * e2.inverse();
        let msg = ct.c_p * kem.inverse();
        decrypt_symmetric(&msg, &ct.ct)
    }
}
