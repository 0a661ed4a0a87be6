use std::{
    cmp,
    fmt::{Display, Formatter, Result as FormatResult},
};
use pest::error::{Error as PestError, LineColLocation};
use crate::utils::policy::pest::human::Rule;
use rabe_bn::FieldError;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "borsh")]
use borsh::{BorshDeserialize, BorshSerialize};

/// Error of the policy engine or of a scheme built on it.
///
/// Note that an attribute set failing to satisfy a policy is *not* an
/// error: pruning reports that through
/// [`PruneResult`](crate::utils::secretsharing::PruneResult).
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "borsh", derive(BorshSerialize, BorshDeserialize))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PabeError {
    /// Malformed policy string. No partial tree is ever returned.
    Parse { line: usize },
    /// A matrix row outgrew the column count: a compiler invariant was
    /// broken and the result must not be used.
    DimensionMismatch {
        label: String,
        len: usize,
        cols: usize,
    },
    /// A normalized attribute label was missing from a component map.
    /// Reported explicitly so that a forgotten normalization cannot pass
    /// as an identity element.
    AttributeNotFound { label: String },
    /// Symmetric payload encryption or decryption failed.
    Crypto(String),
    /// A policy that parsed but cannot be used (bad gate arity, wrong
    /// access structure variant, unsatisfied at decryption time).
    Policy(String),
}

impl Display for PabeError {
    fn fmt(&self, f: &mut Formatter) -> FormatResult {
        match self {
            PabeError::Parse { line } => write!(f, "policy syntax error in line {}", line),
            PabeError::DimensionMismatch { label, len, cols } => write!(
                f,
                "msp row for '{}' has {} entries but the matrix has {} columns",
                label, len, cols
            ),
            PabeError::AttributeNotFound { label } => {
                write!(f, "attribute '{}' not found in component map", label)
            }
            PabeError::Crypto(details) => write!(f, "crypto error: {}", details),
            PabeError::Policy(details) => write!(f, "invalid policy: {}", details),
        }
    }
}

impl std::error::Error for PabeError {}

impl From<PestError<Rule>> for PabeError {
    fn from(error: PestError<Rule>) -> Self {
        let line = match error.line_col.to_owned() {
            LineColLocation::Pos((line, _)) => line,
            LineColLocation::Span((start_line, _), (end_line, _)) => cmp::max(start_line, end_line),
        };
        PabeError::Parse { line }
    }
}

impl From<FieldError> for PabeError {
    fn from(error: FieldError) -> Self {
        match error {
            FieldError::InvalidSliceLength => PabeError::Crypto("FieldError::InvalidSliceLength".to_string()),
            FieldError::InvalidU512Encoding => PabeError::Crypto("FieldError::InvalidU512Encoding".to_string()),
            FieldError::NotMember => PabeError::Crypto("FieldError::NotMember".to_string()),
        }
    }
}

impl From<aes_gcm::aead::Error> for PabeError {
    fn from(_error: aes_gcm::aead::Error) -> Self {
        // the aead error is intentionally opaque, there is no more information in here
        PabeError::Crypto("aead failure".to_string())
    }
}
