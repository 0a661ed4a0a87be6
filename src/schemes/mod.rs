//! This is the documentation for all pabe schemes
//!
//! Currently those are:
//! * FABEO CP-ABE
//! * FEASE KP-ABE
//! * ZZZSQ21 CP-ABE (partially policy-hidden)
//!
//! Every scheme is a value implementing [`Scheme`], holding the
//! [`PolicyEngine`](crate::utils::policy::engine::PolicyEngine) it was
//! constructed with. The scheme layer is the only consumer of the
//! pairing primitive; the policy engine stays purely structural.
pub mod fabeo;
pub mod fease;
pub mod zzzsq21;

use crate::error::PabeError;

/// Access-structure input of keygen and encrypt. Ciphertext-policy
/// schemes bind an attribute set to the key and a policy to the
/// ciphertext; key-policy schemes do it the other way around. Passing
/// the wrong variant is rejected, not coerced.
#[derive(Clone, Copy, Debug)]
pub enum AccessStructure<'a> {
    Policy(&'a str),
    Attributes(&'a [String]),
}

impl<'a> AccessStructure<'a> {
    pub(crate) fn policy(self) -> Result<&'a str, PabeError> {
        match self {
            AccessStructure::Policy(policy) => Ok(policy),
            AccessStructure::Attributes(_) => Err(PabeError::Policy(
                "expected a policy, got an attribute set".to_string(),
            )),
        }
    }

    pub(crate) fn attributes(self) -> Result<&'a [String], PabeError> {
        match self {
            AccessStructure::Attributes(attributes) => Ok(attributes),
            AccessStructure::Policy(_) => Err(PabeError::Policy(
                "expected an attribute set, got a policy".to_string(),
            )),
        }
    }
}

/// Common capability interface of every scheme variant: setup, keygen,
/// encrypt and decrypt over scheme-specific key material. Benchmarks and
/// tests dispatch over schemes through this trait instead of an
/// inheritance hierarchy.
pub trait Scheme {
    type PublicKey;
    type MasterKey;
    type SecretKey;
    type Ciphertext;

    fn name(&self) -> &'static str;

    fn setup(&self) -> (Self::PublicKey, Self::MasterKey);

    fn keygen(
        &self,
        pk: &Self::PublicKey,
        msk: &Self::MasterKey,
        access: AccessStructure,
    ) -> Result<Self::SecretKey, PabeError>;

    fn encrypt(
        &self,
        pk: &Self::PublicKey,
        access: AccessStructure,
        plaintext: &[u8],
    ) -> Result<Self::Ciphertext, PabeError>;

    fn decrypt(&self, sk: &Self::SecretKey, ct: &Self::Ciphertext) -> Result<Vec<u8>, PabeError>;
}
