//! Secret distribution over msp matrices and policy pruning.
//!
//! Distribution and reconstruction are the two halves of the linear
//! secret sharing scheme: a secret is spread over the matrix rows at
//! encryption or keygen time, and pruning determines at decryption time
//! which leaf subsets carry recombinable shares.
use rabe_bn::Fr;
use rand::Rng;
use crate::error::PabeError;
use crate::utils::policy::msp::MspMatrix;
use crate::utils::policy::pest::{LeafLabel, PolicyNode};
use crate::utils::tools::canonical_label;

/// One minimal satisfying leaf subset. The telescoping matrix
/// construction makes every reconstruction coefficient one, so the
/// shares of a subset recombine by plain summation.
pub type SatisfyingSubset = Vec<LeafLabel>;

/// Outcome of matching a candidate attribute set against a policy tree.
/// An unsatisfied policy is an expected result, not an error: callers
/// must treat "decryption not possible with this key/ciphertext pair" as
/// a first-class outcome.
#[derive(Clone, PartialEq, Debug)]
pub enum PruneResult {
    /// All minimal satisfying leaf subsets, never empty.
    Satisfied(Vec<SatisfyingSubset>),
    Unsatisfiable,
}

impl PruneResult {
    pub fn is_satisfied(&self) -> bool {
        match self {
            PruneResult::Satisfied(_) => true,
            PruneResult::Unsatisfiable => false,
        }
    }
}

/// Builds a share vector: the shared secret at `v[0]`, fresh independent
/// randomness everywhere else. A vector must never be reused across
/// calls, which is why the rng is drawn from per call.
pub fn gen_share_vector<R: Rng>(secret: Fr, cols: usize, rng: &mut R) -> Vec<Fr> {
    let mut v: Vec<Fr> = Vec::with_capacity(cols);
    v.push(secret);
    for _i in 1..cols {
        v.push(rng.gen());
    }
    v
}

/// Computes the share of every leaf: the dot product of its row with the
/// share vector. Row entries are -1, 0 or 1, so the products reduce to
/// signed accumulation.
pub fn calc_shares(msp: &MspMatrix, v: &[Fr]) -> Result<Vec<(LeafLabel, Fr)>, PabeError> {
    if v.len() != msp.cols {
        return Err(PabeError::DimensionMismatch {
            label: "share vector".to_string(),
            len: v.len(),
            cols: msp.cols,
        });
    }
    let mut shares: Vec<(LeafLabel, Fr)> = Vec::with_capacity(msp.m.len());
    for (row, label) in msp.m.iter().zip(msp.rho.iter()) {
        if row.len() > msp.cols {
            return Err(PabeError::DimensionMismatch {
                label: label.to_string(),
                len: row.len(),
                cols: msp.cols,
            });
        }
        let mut share = Fr::zero();
        for (j, entry) in row.iter().enumerate() {
            if *entry == 1 {
                share = share + v[j];
            } else if *entry == -1 {
                share = share - v[j];
            }
        }
        shares.push((label.clone(), share));
    }
    Ok(shares)
}

/// Recombines the shares of one satisfying subset into the secret.
pub fn recover_secret(shares: &[Fr]) -> Fr {
    let mut secret = Fr::zero();
    for share in shares {
        secret = secret + *share;
    }
    secret
}

/// Matches a candidate attribute set against a policy tree bottom-up and
/// enumerates every minimal satisfying leaf subset. Policy-hidden
/// schemes cannot tell at compile time which branch will match, so their
/// decryption tries each returned subset in turn.
///
/// Candidate labels are normalized before matching; leaf values never
/// take part in the comparison.
pub fn calc_pruned(policy: &PolicyNode, attrs: &[String]) -> PruneResult {
    let canonical: Vec<&str> = attrs.iter().map(|a| canonical_label(a)).collect();
    match prune_node(policy, &canonical) {
        Some(subsets) => PruneResult::Satisfied(subsets),
        None => PruneResult::Unsatisfiable,
    }
}

fn prune_node(policy: &PolicyNode, attrs: &[&str]) -> Option<Vec<SatisfyingSubset>> {
    match policy {
        PolicyNode::Leaf(leaf) => {
            if attrs.iter().any(|a| *a == leaf.name) {
                Some(vec![vec![leaf.label()]])
            } else {
                None
            }
        }
        PolicyNode::Or(children) => {
            let mut subsets: Vec<SatisfyingSubset> = Vec::new();
            for child in children {
                if let Some(mut found) = prune_node(child, attrs) {
                    subsets.append(&mut found);
                }
            }
            if subsets.is_empty() {
                None
            } else {
                Some(subsets)
            }
        }
        PolicyNode::And(children) => {
            // every child must be satisfied; partial subsets branch over
            // each child's alternatives
            let mut subsets: Vec<SatisfyingSubset> = vec![Vec::new()];
            for child in children {
                match prune_node(child, attrs) {
                    None => return None,
                    Some(found) => {
                        let mut combined = Vec::with_capacity(subsets.len() * found.len());
                        for partial in &subsets {
                            for alternative in &found {
                                let mut joined = partial.clone();
                                joined.extend(alternative.iter().cloned());
                                combined.push(joined);
                            }
                        }
                        subsets = combined;
                    }
                }
            }
            Some(subsets)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::ThreadRng;
    use crate::utils::policy::pest::parse;
    use crate::utils::tools::traverse_policy;

    fn set(attrs: &[&str]) -> Vec<String> {
        attrs.iter().map(|a| a.to_string()).collect()
    }

    fn subsets_of(result: PruneResult) -> Vec<Vec<String>> {
        match result {
            PruneResult::Satisfied(subsets) => subsets
                .into_iter()
                .map(|s| s.into_iter().map(|l| l.name).collect())
                .collect(),
            PruneResult::Unsatisfiable => panic!("expected a satisfied result"),
        }
    }

    #[test]
    fn test_pruning_scenarios() {
        let policy = parse("(A and B) or C").unwrap();

        let only_c = subsets_of(calc_pruned(&policy, &set(&["C"])));
        assert_eq!(only_c, vec![vec!["C".to_string()]]);

        assert_eq!(calc_pruned(&policy, &set(&["A"])), PruneResult::Unsatisfiable);

        let a_and_b = subsets_of(calc_pruned(&policy, &set(&["A", "B"])));
        assert_eq!(a_and_b, vec![vec!["A".to_string(), "B".to_string()]]);
    }

    #[test]
    fn test_pruning_multiple_subsets() {
        let policy = parse("(A and B) or C or D").unwrap();
        let found = subsets_of(calc_pruned(&policy, &set(&["A", "B", "C", "D"])));
        assert_eq!(found.len(), 3);
        assert!(found.contains(&vec!["A".to_string(), "B".to_string()]));
        assert!(found.contains(&vec!["C".to_string()]));
        assert!(found.contains(&vec!["D".to_string()]));
    }

    #[test]
    fn test_pruning_and_crosses_alternatives() {
        let policy = parse("(A or B) and (C or D)").unwrap();
        let found = subsets_of(calc_pruned(&policy, &set(&["A", "B", "C", "D"])));
        assert_eq!(found.len(), 4);
        assert!(found.contains(&vec!["A".to_string(), "C".to_string()]));
        assert!(found.contains(&vec!["B".to_string(), "D".to_string()]));
    }

    #[test]
    fn test_pruning_normalizes_candidates() {
        let policy = parse("A:one and B").unwrap();
        // candidate labels arrive decorated, leaf values are ignored
        let result = calc_pruned(&policy, &set(&["A:two", "B_1"]));
        assert!(result.is_satisfied());
    }

    #[test]
    fn test_share_vector_shape() {
        let mut rng = rand::thread_rng();
        let secret: Fr = rng.gen();
        let v = gen_share_vector(secret, 4, &mut rng);
        assert_eq!(v.len(), 4);
        assert!(v[0] == secret);
    }

    #[test]
    fn test_distribute_and_recover_ternary_and() {
        // secret 7 over "A and B and C": summing all three shares
        // returns exactly 7
        let mut rng = rand::thread_rng();
        let msp = MspMatrix::from_language("A and B and C").unwrap();
        let secret = Fr::from_str("7").unwrap();
        let v = gen_share_vector(secret, msp.cols, &mut rng);
        let shares = calc_shares(&msp, &v).unwrap();
        assert_eq!(shares.len(), 3);
        let values: Vec<Fr> = shares.iter().map(|(_, s)| *s).collect();
        assert!(recover_secret(&values) == secret);
    }

    #[test]
    fn test_recover_over_pruned_subsets() {
        let mut rng = rand::thread_rng();
        let policy_str = "(A and B) or (C and (D or E))";
        let policy = parse(policy_str).unwrap();
        let msp = MspMatrix::from_policy(&policy).unwrap();
        let secret: Fr = rng.gen();
        let v = gen_share_vector(secret, msp.cols, &mut rng);
        let shares = calc_shares(&msp, &v).unwrap();
        let subsets = match calc_pruned(&policy, &set(&["A", "B", "C", "E"])) {
            PruneResult::Satisfied(subsets) => subsets,
            PruneResult::Unsatisfiable => panic!("expected satisfiable"),
        };
        assert!(subsets.len() >= 2);
        for subset in subsets {
            let values: Vec<Fr> = subset
                .iter()
                .map(|label| {
                    shares
                        .iter()
                        .find(|(l, _)| l == label)
                        .map(|(_, s)| *s)
                        .expect("share missing for pruned leaf")
                })
                .collect();
            assert!(recover_secret(&values) == secret);
        }
    }

    #[test]
    fn test_share_vector_dimension_checked() {
        let mut rng = rand::thread_rng();
        let msp = MspMatrix::from_language("A and B").unwrap();
        let secret: Fr = rng.gen();
        let v = gen_share_vector(secret, msp.cols + 1, &mut rng);
        assert!(calc_shares(&msp, &v).is_err());
    }

    // brute force reference used by the random tree property test
    fn rows_sum_to_target(msp: &MspMatrix, subset: &[LeafLabel]) -> bool {
        let mut sum = vec![0i64; msp.cols];
        for label in subset {
            let row = msp.row(label).expect("row missing for pruned leaf");
            for (j, entry) in row.iter().enumerate() {
                sum[j] += *entry as i64;
            }
        }
        if sum[0] != 1 {
            return false;
        }
        sum[1..].iter().all(|entry| *entry == 0)
    }

    fn random_policy(rng: &mut ThreadRng, names: &[&str], depth: usize) -> String {
        use rand::seq::SliceRandom;
        if depth == 0 || rng.gen_ratio(1, 3) {
            names.choose(rng).unwrap().to_string()
        } else {
            let arity = rng.gen_range(2..=4);
            let children: Vec<String> = (0..arity)
                .map(|_| random_policy(rng, names, depth - 1))
                .collect();
            let op = if rng.gen::<bool>() { " and " } else { " or " };
            format!("({})", children.join(op))
        }
    }

    #[test]
    fn test_pruning_matches_boolean_evaluation_on_random_trees() {
        let names = ["A", "B", "C", "D", "E", "F"];
        let mut rng = rand::thread_rng();
        for _round in 0..60 {
            let policy_str = random_policy(&mut rng, &names, 3);
            let policy = parse(&policy_str).unwrap();
            let msp = MspMatrix::from_policy(&policy).unwrap();
            for _subset in 0..8 {
                let candidate: Vec<String> = names
                    .iter()
                    .filter(|_| rng.gen::<bool>())
                    .map(|n| n.to_string())
                    .collect();
                let expected = traverse_policy(&candidate, &policy);
                match calc_pruned(&policy, &candidate) {
                    PruneResult::Satisfied(subsets) => {
                        assert!(expected, "prune satisfied but evaluation failed: {}", policy_str);
                        assert!(!subsets.is_empty());
                        for subset in subsets {
                            // every pruned leaf is actually held
                            for label in &subset {
                                assert!(candidate.iter().any(|c| c == &label.name));
                            }
                            // and the rows recombine to (1, 0, .., 0)
                            assert!(
                                rows_sum_to_target(&msp, &subset),
                                "rows do not recombine for {} with {:?}",
                                policy_str,
                                candidate
                            );
                        }
                    }
                    PruneResult::Unsatisfiable => {
                        assert!(!expected, "prune failed but evaluation satisfied: {}", policy_str);
                    }
                }
            }
        }
    }
}
