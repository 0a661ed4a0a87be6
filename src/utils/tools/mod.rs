//! Attribute label normalization and policy tree traversal.
//!
//! Attribute identifiers cross several boundaries (key components,
//! ciphertext components, matrix rows) in decorated forms like
//! `name:value` or `name:value_3`. Every map lookup normalizes through
//! [`canonical_label`] on both sides; a consumer that forgets to do so
//! will not find its counterpart, which is why lookup misses are always
//! reported as errors instead of being treated as identity elements.
use crate::utils::policy::pest::PolicyNode;

/// Strips an appended `:VALUE` decoration from an attribute label.
pub fn strip_value(label: &str) -> &str {
    match label.find(':') {
        Some(pos) => &label[..pos],
        None => label,
    }
}

/// Strips a trailing `_<digits>` occurrence decoration from an attribute
/// label. A label whose undecorated name happens to end in `_<digits>`
/// is indistinguishable from a decorated one and loses its suffix too.
pub fn strip_index(label: &str) -> &str {
    match label.rfind('_') {
        Some(pos) if pos > 0
            && !label[pos + 1..].is_empty()
            && label[pos + 1..].chars().all(|c| c.is_ascii_digit()) =>
        {
            &label[..pos]
        }
        _ => label,
    }
}

/// Canonical map key of an attribute label: no value, no occurrence
/// index.
pub fn canonical_label(label: &str) -> &str {
    strip_value(strip_index(label))
}

/// used to check if a list of attributes contains a given label
pub fn contains(data: &[String], value: &str) -> bool {
    data.iter().any(|item| item == value)
}

/// Bottom-up boolean evaluation of a policy tree against an attribute
/// set. Cheaper than pruning when only satisfiability is needed.
pub fn traverse_policy(attrs: &[String], policy: &PolicyNode) -> bool {
    !attrs.is_empty()
        && match policy {
            PolicyNode::Leaf(leaf) => attrs.iter().any(|a| canonical_label(a) == leaf.name),
            PolicyNode::And(children) => children.iter().all(|child| traverse_policy(attrs, child)),
            PolicyNode::Or(children) => children.iter().any(|child| traverse_policy(attrs, child)),
        }
}
