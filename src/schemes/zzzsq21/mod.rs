//! `ZZZSQ21` partially policy-hidden CP-ABE scheme.
//!
//! * Developped by Zhishuo Zhang, Wei Zhang, Hanxiang Zhuang, Yu Sun, Zhiguang Qin, "Efficient Partially Policy-Hidden CP-ABE for IoT Assisted Smart Health"
//! * Published in 2021 (implemented as an asymmetric variant)
//! * Type: encryption (anonymous ciphertext-policy attribute-based)
//! * Setting: bilinear groups (asymmetric)
//!
//! Policy leaves carry `name:value` attributes. The ciphertext only
//! reveals the value-stripped policy; attribute values are matched
//! through a pairing test before pruning. Because the stripped policy
//! cannot tell which `or` branch will actually decrypt, every minimal
//! satisfying subset is tried in turn and the authenticated payload
//! cipher rejects the wrong ones.
//!
//! # Examples
//!
//! ```
//! use pabe::schemes::{Scheme, AccessStructure, zzzsq21::Zzzsq21};
//! use pabe::utils::policy::engine::PolicyEngine;
//! let scheme = Zzzsq21::new(PolicyEngine::new());
//! let (pk, msk) = scheme.setup();
//! let plaintext = String::from("our plaintext!").into_bytes();
//! let attributes: Vec<String> = vec!["A:one".to_string(), "B:two".to_string()];
//! let sk = scheme.keygen(&pk, &msk, AccessStructure::Attributes(&attributes)).unwrap();
//! let ct = scheme.encrypt(&pk, AccessStructure::Policy(r#"A:one and B:two"#), &plaintext).unwrap();
//! assert_eq!(scheme.decrypt(&sk, &ct).unwrap(), plaintext);
//! ```
use rabe_bn::{pairing, Fr, Gt, G1, G2};
use rand::Rng;
use crate::error::PabeError;
use crate::schemes::{AccessStructure, Scheme};
use crate::utils::{
    aes::{decrypt_symmetric, encrypt_symmetric},
    hash::sha3_hash,
    policy::engine::PolicyEngine,
    policy::pest::{serialize_policy, strip_values, LeafLabel},
    secretsharing::PruneResult,
    tools::{contains, strip_value},
};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "borsh")]
use borsh::{BorshDeserialize, BorshSerialize};

/// A ZZZSQ21 Public Key (PK)
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "borsh", derive(BorshSerialize, BorshDeserialize))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Zzzsq21PublicKey {
    pub g_1: G1,
    pub g_2: G2,
    pub g_1_b: G1,
    pub g_2_d: G2,
    pub g_2_y: G2,
    pub e_g1g2_alpha: Gt,
}

/// A ZZZSQ21 Master Key (MSK)
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "borsh", derive(BorshSerialize, BorshDeserialize))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Zzzsq21MasterKey {
    pub g_1_alpha: G1,
    pub b: Fr,
    pub d: Fr,
    pub y: Fr,
    pub k: Fr,
}

/// A ZZZSQ21 Secret Key (SK). Component maps are keyed by the bare
/// attribute name; the held values only live inside the hashes.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "borsh", derive(BorshSerialize, BorshDeserialize))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Zzzsq21SecretKey {
    pub attr: Vec<String>,
    pub sk_1: G1,
    pub sk_2: G2,
    pub sk_3: Vec<(String, G1)>,
    pub sk_4: Vec<(String, G1)>,
}

/// A ZZZSQ21 Ciphertext (CT). `policy` is the value-stripped rendering
/// of the encryption policy; the leaf values are only present inside
/// the `c_2`/`c_5` hashes.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "borsh", derive(BorshSerialize, BorshDeserialize))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Zzzsq21Ciphertext {
    pub policy: String,
    pub c_1: G2,
    pub c_2: Vec<(LeafLabel, G1)>,
    pub c_3: Vec<(LeafLabel, G2)>,
    pub c_4: G2,
    pub c_5: Vec<(LeafLabel, Gt)>,
    pub c_6: Gt,
    pub ct: Vec<u8>,
}

/// The ZZZSQ21 partially policy-hidden ciphertext-policy scheme. Holds
/// the policy engine it was constructed with.
#[derive(Clone, Copy, Debug)]
pub struct Zzzsq21 {
    engine: PolicyEngine,
}

impl Zzzsq21 {
    pub fn new(engine: PolicyEngine) -> Zzzsq21 {
        Zzzsq21 { engine }
    }
}

impl Scheme for Zzzsq21 {
    type PublicKey = Zzzsq21PublicKey;
    type MasterKey = Zzzsq21MasterKey;
    type SecretKey = Zzzsq21SecretKey;
    type Ciphertext = Zzzsq21Ciphertext;

    fn name(&self) -> &'static str {
        "ZZZSQ21 CP-ABE"
    }

    /// Generates a Zzzsq21PublicKey and a Zzzsq21MasterKey.
    fn setup(&self) -> (Zzzsq21PublicKey, Zzzsq21MasterKey) {
        // random number generator
        let mut rng = rand::thread_rng();
        let g_1: G1 = rng.gen();
        let g_2: G2 = rng.gen();
        let alpha: Fr = rng.gen();
        let b: Fr = rng.gen();
        let d: Fr = rng.gen();
        let y: Fr = rng.gen();
        let k: Fr = rng.gen();
        let g_1_alpha = g_1 * alpha;
        let e_g1g2_alpha = pairing(g_1_alpha, g_2);
        (
            Zzzsq21PublicKey {
                g_1,
                g_2,
                g_1_b: g_1 * b,
                g_2_d: g_2 * d,
                g_2_y: g_2 * y,
                e_g1g2_alpha,
            },
            Zzzsq21MasterKey { g_1_alpha, b, d, y, k },
        )
    }

    /// Generates a Zzzsq21SecretKey for a set of `name:value` attributes.
    fn keygen(
        &self,
        pk: &Zzzsq21PublicKey,
        msk: &Zzzsq21MasterKey,
        access: AccessStructure,
    ) -> Result<Zzzsq21SecretKey, PabeError> {
        let attributes = access.attributes()?;
        if attributes.is_empty() {
            return Err(PabeError::Policy("empty attribute set".to_string()));
        }
        let mut rng = rand::thread_rng();
        let t: Fr = rng.gen();
        let kt = msk.k * t;
        let sk_1 = msk.g_1_alpha + pk.g_1_b * (kt * msk.d);
        let sk_2 = pk.g_2_d * kt;
        let mut attr_names: Vec<String> = Vec::with_capacity(attributes.len());
        let mut sk_3: Vec<(String, G1)> = Vec::with_capacity(attributes.len());
        let mut sk_4: Vec<(String, G1)> = Vec::with_capacity(attributes.len());
        for attr in attributes {
            let name = strip_value(attr).to_string();
            // the full name:value pair only survives inside the hash
            let attr_hash = sha3_hash(pk.g_1, attr)?;
            sk_3.push((name.clone(), attr_hash * kt));
            sk_4.push((name.clone(), attr_hash * msk.y));
            attr_names.push(name);
        }
        Ok(Zzzsq21SecretKey {
            attr: attr_names,
            sk_1,
            sk_2,
            sk_3,
            sk_4,
        })
    }

    /// Encrypts plaintext data under a `name:value` access policy. The
    /// ciphertext stores the policy with all values stripped.
    fn encrypt(
        &self,
        pk: &Zzzsq21PublicKey,
        access: AccessStructure,
        plaintext: &[u8],
    ) -> Result<Zzzsq21Ciphertext, PabeError> {
        let policy_str = access.policy()?;
        let mut rng = rand::thread_rng();
        let policy = self.engine.parse(policy_str)?;
        let msp = self.engine.compile(&policy)?;
        // pick randomness
        let s: Fr = rng.gen();
        let r_prime: Fr = rng.gen();
        let shares = self.engine.distribute(&msp, s, &mut rng)?;
        let c_1 = pk.g_2 * s;
        let c_4 = pk.g_2 * r_prime;
        let tep = pk.g_2_y * r_prime;
        let mut c_2: Vec<(LeafLabel, G1)> = Vec::with_capacity(shares.len());
        let mut c_3: Vec<(LeafLabel, G2)> = Vec::with_capacity(shares.len());
        let mut c_5: Vec<(LeafLabel, Gt)> = Vec::with_capacity(shares.len());
        for (label, share) in shares {
            let r: Fr = rng.gen();
            let attr_hash = sha3_hash(pk.g_1, &label.hash_input())?;
            c_2.push((label.clone(), pk.g_1_b * share - attr_hash * r));
            c_3.push((label.clone(), pk.g_2_d * r));
            c_5.push((label, pairing(attr_hash, tep)));
        }
        let msg: Gt = rng.gen();
        let c_6 = pk.e_g1g2_alpha.pow(s) * msg;
        let ct = encrypt_symmetric(&msg, plaintext)?;
        // remove attribute values from the stored policy
        let hidden = serialize_policy(&strip_values(&policy));
        Ok(Zzzsq21Ciphertext {
            policy: hidden,
            c_1,
            c_2,
            c_3,
            c_4,
            c_5,
            c_6,
            ct,
        })
    }

    /// Reconstructs the plaintext by matching attribute values through
    /// the pairing test, pruning the stripped policy and trying every
    /// candidate subset until the payload authenticates.
    fn decrypt(&self, sk: &Zzzsq21SecretKey, ct: &Zzzsq21Ciphertext) -> Result<Vec<u8>, PabeError> {
        // an sk_4 entry pairs with c_4 into some c_5 entry iff the key
        // holds a leaf's exact name:value pair
        let mut matching: Vec<String> = Vec::new();
        for (name, sk_4_attr) in &sk.sk_4 {
            let probe = pairing(*sk_4_attr, ct.c_4);
            if ct.c_5.iter().any(|(_, gt)| *gt == probe) && !contains(&matching, name) {
                matching.push(name.clone());
            }
        }
        let policy = self.engine.parse(&ct.policy)?;
        let subsets = match self.engine.prune(&policy, &matching) {
            PruneResult::Satisfied(subsets) => subsets,
            PruneResult::Unsatisfiable => {
                return Err(PabeError::Policy(
                    "attribute names do not satisfy the hidden policy".to_string(),
                ))
            }
        };
        let t_base = pairing(sk.sk_1, ct.c_1).inverse();
        for subset in &subsets {
            let mut t = t_base;
            for label in subset {
                let c_2_attr = ct
                    .c_2
                    .iter()
                    .find(|(l, _)| l == label)
                    .map(|(_, value)| *value)
                    .ok_or_else(|| PabeError::AttributeNotFound { label: label.to_string() })?;
                let c_3_attr = ct
                    .c_3
                    .iter()
                    .find(|(l, _)| l == label)
                    .map(|(_, value)| *value)
                    .ok_or_else(|| PabeError::AttributeNotFound { label: label.to_string() })?;
                let sk_3_attr = sk
                    .sk_3
                    .iter()
                    .find(|(name, _)| name == label.canonical())
                    .map(|(_, value)| *value)
                    .ok_or_else(|| PabeError::AttributeNotFound { label: label.to_string() })?;
                t = t * pairing(c_2_attr, sk.sk_2) * pairing(sk_3_attr, c_3_attr);
            }
            let msg = ct.c_6 * t;
            if let Ok(plaintext) = decrypt_symmetric(&msg, &ct.ct) {
                return Ok(plaintext);
            }
        }
        Err(PabeError::Crypto(
            "no candidate subset produced an authentic payload".to_string(),
        ))
    }
}
