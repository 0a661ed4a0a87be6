//! Conversion of boolean policy formulas into linear secret sharing
//! matrices (monotone span programs).
use std::fmt::{Display, Formatter, Result as FormatResult};
use crate::error::PabeError;
use crate::utils::policy::pest::{parse, LeafLabel, PolicyNode};

const ZERO: i8 = 0;
const PLUS: i8 = 1;
const MINUS: i8 = -1;

/// A linear secret sharing matrix: one row per policy leaf, labelled by
/// the parallel `rho` vector. Rows are zero-padded to `cols` entries and
/// only ever contain -1, 0 and 1.
///
/// For every attribute subset that satisfies the source policy, the rows
/// of each minimal satisfying leaf subset sum to `(1, 0, .., 0)`; no
/// non-satisfying subset can combine to that vector.
#[derive(Clone, PartialEq, Debug)]
pub struct MspMatrix {
    pub m: Vec<Vec<i8>>,
    pub rho: Vec<LeafLabel>,
    pub cols: usize,
}

impl MspMatrix {
    /// Compiles a textual policy. Convenience over [`parse`] followed by
    /// [`MspMatrix::from_policy`].
    pub fn from_language(policy: &str) -> Result<MspMatrix, PabeError> {
        parse(policy).and_then(|pol| MspMatrix::from_policy(&pol))
    }

    /// Compiles a parsed policy tree. Compilation involves no randomness:
    /// the same tree always yields the same matrix.
    pub fn from_policy(policy: &PolicyNode) -> Result<MspMatrix, PabeError> {
        calculate_msp(policy)
    }

    /// Row lookup by leaf identifier (attribute name + occurrence index).
    pub fn row(&self, label: &LeafLabel) -> Result<&[i8], PabeError> {
        for (i, rho) in self.rho.iter().enumerate() {
            if rho == label {
                return Ok(&self.m[i]);
            }
        }
        Err(PabeError::AttributeNotFound { label: label.to_string() })
    }
}

impl Display for MspMatrix {
    fn fmt(&self, f: &mut Formatter) -> FormatResult {
        writeln!(f, "msp {}x{}", self.m.len(), self.cols)?;
        for (row, label) in self.m.iter().zip(self.rho.iter()) {
            writeln!(f, "{:?} <- {}", row, label)?;
        }
        Ok(())
    }
}

/// Converting from Boolean Formulas to LSSS Matrices.
/// Lewko, Waters: "Decentralizing Attribute-Based Encryption", Appendix G,
/// generalized to n-ary gates.
pub fn calculate_msp(policy: &PolicyNode) -> Result<MspMatrix, PabeError> {
    let mut msp = MspMatrix {
        m: Vec::new(),
        rho: Vec::new(),
        cols: 1,
    };
    lw(&mut msp, policy, vec![PLUS])?;
    for (row, label) in msp.m.iter_mut().zip(msp.rho.iter()) {
        if row.len() > msp.cols {
            return Err(PabeError::DimensionMismatch {
                label: label.to_string(),
                len: row.len(),
                cols: msp.cols,
            });
        }
        row.resize(msp.cols, ZERO);
    }
    // permutate both rho and m according to rho
    let permutation = permutation::sort(&msp.rho[..]);
    msp.rho = permutation.apply_slice(&msp.rho[..]);
    msp.m = permutation.apply_slice(&msp.m[..]);
    Ok(msp)
}

fn lw(msp: &mut MspMatrix, policy: &PolicyNode, v: Vec<i8>) -> Result<(), PabeError> {
    match policy {
        PolicyNode::Leaf(leaf) => {
            msp.m.push(v);
            msp.rho.push(leaf.label());
            Ok(())
        }
        PolicyNode::Or(children) => {
            if children.len() < 2 {
                return Err(PabeError::Policy("or gate with fewer than two children".to_string()));
            }
            for child in children {
                lw(msp, child, v.clone())?;
            }
            Ok(())
        }
        PolicyNode::And(children) => {
            let k = children.len();
            if k < 2 {
                return Err(PabeError::Policy("and gate with fewer than two children".to_string()));
            }
            // reserve the k-1 fresh columns of this gate before any child
            // subtree can allocate its own
            let base = msp.cols;
            msp.cols += k - 1;
            for (i, child) in children.iter().enumerate() {
                let mut vi: Vec<i8>;
                if i == 0 {
                    vi = v.clone();
                    vi.resize(base, ZERO);
                    vi.push(PLUS);
                } else {
                    vi = vec![ZERO; base + i - 1];
                    vi.push(MINUS);
                    if i < k - 1 {
                        vi.push(PLUS);
                    }
                }
                lw(msp, child, vi)?;
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label_of(msp: &MspMatrix, name: &str) -> LeafLabel {
        msp.rho
            .iter()
            .find(|l| l.name == name)
            .cloned()
            .expect("label not present")
    }

    #[test]
    fn test_msp_from() {
        let policy = String::from("A and (D or (B and C))");
        let p1 = vec![PLUS, PLUS, ZERO];
        let p2 = vec![ZERO, MINUS, PLUS];
        let p3 = vec![ZERO, ZERO, MINUS];
        let p4 = vec![ZERO, MINUS, ZERO];
        let msp = MspMatrix::from_language(&policy).expect("compilation failed");
        assert_eq!(msp.cols, 3);
        assert_eq!(msp.row(&label_of(&msp, "A")).unwrap(), &p1[..]);
        assert_eq!(msp.row(&label_of(&msp, "B")).unwrap(), &p2[..]);
        assert_eq!(msp.row(&label_of(&msp, "C")).unwrap(), &p3[..]);
        assert_eq!(msp.row(&label_of(&msp, "D")).unwrap(), &p4[..]);
        // rows and labels are sorted together
        let names: Vec<&str> = msp.rho.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn test_ternary_and() {
        let msp = MspMatrix::from_language("A and B and C").expect("compilation failed");
        assert_eq!(msp.cols, 3);
        assert_eq!(msp.row(&label_of(&msp, "A")).unwrap(), &[1, 1, 0][..]);
        assert_eq!(msp.row(&label_of(&msp, "B")).unwrap(), &[0, -1, 1][..]);
        assert_eq!(msp.row(&label_of(&msp, "C")).unwrap(), &[0, 0, -1][..]);
        // rows of the single satisfying subset sum to (1, 0, 0)
        let mut sum = vec![0i32; msp.cols];
        for row in &msp.m {
            for (j, entry) in row.iter().enumerate() {
                sum[j] += *entry as i32;
            }
        }
        assert_eq!(sum, vec![1, 0, 0]);
    }

    #[test]
    fn test_column_accounting() {
        // cols = 1 + sum over and gates of (children - 1)
        let cases = [
            ("A", 1),
            ("A or B or C", 1),
            ("A and B", 2),
            ("A and B and C and D", 4),
            ("(A and B) or (C and D and E)", 4),
            ("(A or B) and ((C and D) or E)", 3),
        ];
        for (policy, cols) in cases.iter() {
            let msp = MspMatrix::from_language(policy).expect("compilation failed");
            assert_eq!(msp.cols, *cols, "wrong column count for {}", policy);
        }
    }

    #[test]
    fn test_duplicate_attribute_rows() {
        let msp = MspMatrix::from_language("(A and B) or (A and C)").expect("compilation failed");
        let a_rows: Vec<&LeafLabel> = msp.rho.iter().filter(|l| l.name == "A").collect();
        assert_eq!(a_rows.len(), 2);
        assert_ne!(a_rows[0].index, a_rows[1].index);
    }

    #[test]
    fn test_idempotent_compilation() {
        let policy = "(A and B:val) or (C and D and E) or F";
        let first = MspMatrix::from_language(policy).expect("compilation failed");
        let second = MspMatrix::from_language(policy).expect("compilation failed");
        assert_eq!(first, second);
    }
}
