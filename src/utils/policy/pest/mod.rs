//! Policy parsing and the policy tree model.
//!
//! A policy is a monotone boolean formula over attributes, e.g.
//! `(A and B:val) or C`. Parsing yields an immutable [`PolicyNode`] tree
//! whose leaves carry a global occurrence index, assigned left to right
//! in depth first order, so the same attribute name may appear several
//! times in one policy without its matrix rows colliding.
use pest::Parser;
use std::{
    cmp::Ordering,
    fmt::{Display, Formatter, Result as FormatResult},
    hash::{Hash, Hasher},
};
use crate::error::PabeError;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "borsh")]
use borsh::{BorshDeserialize, BorshSerialize};

pub(crate) mod human;

use self::human::HumanPolicyParser;

/// A node of a parsed policy tree. Gates always have at least two
/// children; trees are never mutated after parsing.
#[derive(Clone, PartialEq, Debug)]
pub enum PolicyNode<'a> {
    And(Vec<PolicyNode<'a>>),
    Or(Vec<PolicyNode<'a>>),
    Leaf(PolicyLeaf<'a>),
}

/// A policy leaf: attribute name, optional value decoration and the
/// occurrence index that makes the leaf unique within its tree.
#[derive(Clone, PartialEq, Debug)]
pub struct PolicyLeaf<'a> {
    pub name: &'a str,
    pub value: Option<&'a str>,
    pub index: usize,
}

impl<'a> PolicyLeaf<'a> {
    /// The owned label of this leaf, used to key matrix rows and
    /// ciphertext components.
    pub fn label(&self) -> LeafLabel {
        LeafLabel {
            name: self.name.to_string(),
            value: self.value.map(|v| v.to_string()),
            index: self.index,
        }
    }
}

/// Owned leaf identifier. Identity (equality, ordering, hashing) is the
/// pair of attribute name and occurrence index; the value decoration is
/// carried along purely as input for the cryptographic hash and never
/// takes part in matching.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "borsh", derive(BorshSerialize, BorshDeserialize))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LeafLabel {
    pub name: String,
    pub value: Option<String>,
    pub index: usize,
}

impl LeafLabel {
    /// Canonical map key: the bare attribute name.
    pub fn canonical(&self) -> &str {
        &self.name
    }

    /// The string fed into the cryptographic hash, value included.
    pub fn hash_input(&self) -> String {
        match &self.value {
            Some(value) => format!("{}:{}", self.name, value),
            None => self.name.clone(),
        }
    }
}

impl PartialEq for LeafLabel {
    fn eq(&self, other: &LeafLabel) -> bool {
        self.name == other.name && self.index == other.index
    }
}

impl Eq for LeafLabel {}

impl Hash for LeafLabel {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.index.hash(state);
    }
}

impl Ord for LeafLabel {
    fn cmp(&self, other: &LeafLabel) -> Ordering {
        self.name.cmp(&other.name).then(self.index.cmp(&other.index))
    }
}

impl PartialOrd for LeafLabel {
    fn partial_cmp(&self, other: &LeafLabel) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Display for LeafLabel {
    fn fmt(&self, f: &mut Formatter) -> FormatResult {
        match &self.value {
            Some(value) => write!(f, "{}:{}_{}", self.name, value, self.index),
            None => write!(f, "{}_{}", self.name, self.index),
        }
    }
}

/// Parses a policy string into a [`PolicyNode`] tree.
///
/// Fails with [`PabeError::Parse`] on unbalanced parentheses, dangling
/// operators or an empty formula; nothing partial is returned.
pub fn parse(policy: &str) -> Result<PolicyNode, PabeError> {
    use self::human::Rule;
    match HumanPolicyParser::parse(Rule::content, policy) {
        Ok(mut result) => {
            let mut index = 0usize;
            Ok(human::parse(result.next().unwrap(), &mut index))
        }
        Err(e) => { eprintln!("PESTDBG: {}", e); Err(e.into()) },
    }
}

/// Renders a policy tree back into the grammar it was parsed from, one
/// parenthesized group per gate. Re-parsing the output reproduces the
/// tree, occurrence indices included.
pub fn serialize_policy(policy: &PolicyNode) -> String {
    match policy {
        PolicyNode::Leaf(leaf) => match leaf.value {
            Some(value) => format!("{}:{}", leaf.name, value),
            None => leaf.name.to_string(),
        },
        PolicyNode::And(children) => {
            let rendered: Vec<String> = children.iter().map(serialize_policy).collect();
            format!("({})", rendered.join(" and "))
        }
        PolicyNode::Or(children) => {
            let rendered: Vec<String> = children.iter().map(serialize_policy).collect();
            format!("({})", rendered.join(" or "))
        }
    }
}

/// Removes the value decoration from every leaf, keeping names and
/// occurrence indices intact. Partially policy-hidden schemes store this
/// view of the policy in their ciphertexts.
pub fn strip_values<'a>(policy: &PolicyNode<'a>) -> PolicyNode<'a> {
    match policy {
        PolicyNode::Leaf(leaf) => PolicyNode::Leaf(PolicyLeaf {
            name: leaf.name,
            value: None,
            index: leaf.index,
        }),
        PolicyNode::And(children) => PolicyNode::And(children.iter().map(strip_values).collect()),
        PolicyNode::Or(children) => PolicyNode::Or(children.iter().map(strip_values).collect()),
    }
}
