//! This is the documentation for the `pabe` library.
//!
//! * Type: pairing-based attribute based encryption (CP-ABE and KP-ABE)
//!
//! `pabe` bundles a reusable access policy engine (policy parsing,
//! conversion into linear secret sharing matrices, share distribution and
//! policy pruning) with a small set of published ABE schemes built on top
//! of it. All group arithmetic is supplied by the [`rabe_bn`] pairing
//! library; the policy engine itself never touches a group element.
//!
//! Policies are boolean formulas over attributes, written as
//! `(A and B:value) or C` with case-insensitive n-ary `and`/`or` gates.
//!
//! # Example
//!
//! ```
//! use pabe::schemes::{Scheme, AccessStructure, fabeo::Fabeo};
//! use pabe::utils::policy::engine::PolicyEngine;
//!
//! let scheme = Fabeo::new(PolicyEngine::new());
//! let (pk, msk) = scheme.setup();
//! let plaintext = String::from("our plaintext!").into_bytes();
//! let attributes: Vec<String> = vec!["A".to_string(), "B".to_string()];
//! let sk = scheme.keygen(&pk, &msk, AccessStructure::Attributes(&attributes)).unwrap();
//! let ct = scheme.encrypt(&pk, AccessStructure::Policy(r#"(A and B) or C"#), &plaintext).unwrap();
//! assert_eq!(scheme.decrypt(&sk, &ct).unwrap(), plaintext);
//! ```
#[cfg(feature = "borsh")]
extern crate borsh;
#[cfg(feature = "serde")]
extern crate serde;
extern crate aes_gcm;
extern crate permutation;
extern crate pest;
#[macro_use]
extern crate pest_derive;
extern crate rabe_bn;
extern crate rand;
extern crate sha3;

pub mod error;
pub mod schemes;
pub mod utils;
