//! The explicit handle over the policy toolchain.
use rabe_bn::Fr;
use rand::Rng;
use crate::error::PabeError;
use crate::utils::policy::msp::MspMatrix;
use crate::utils::policy::pest::{parse, LeafLabel, PolicyNode};
use crate::utils::secretsharing::{calc_pruned, calc_shares, gen_share_vector, PruneResult};
use crate::utils::tools::traverse_policy;

/// Handle bundling policy parsing, compilation, share distribution and
/// pruning. The engine holds no state: compilation results carry their
/// own column count and randomness is drawn from the rng passed into
/// each call. One instance can therefore be shared freely between
/// threads and scheme instances, keeping concurrent benchmarks of
/// several schemes free of cross-talk. Construct it once and inject it
/// into everything that processes policies.
#[derive(Clone, Copy, Debug, Default)]
pub struct PolicyEngine;

impl PolicyEngine {
    pub fn new() -> PolicyEngine {
        PolicyEngine
    }

    /// Parses a policy string, see
    /// [`parse`](crate::utils::policy::pest::parse).
    pub fn parse<'a>(&self, policy: &'a str) -> Result<PolicyNode<'a>, PabeError> {
        parse(policy)
    }

    /// Compiles a policy tree into its linear secret sharing matrix.
    pub fn compile(&self, policy: &PolicyNode) -> Result<MspMatrix, PabeError> {
        MspMatrix::from_policy(policy)
    }

    /// Draws a fresh share vector for `secret` and distributes it over
    /// the matrix rows.
    pub fn distribute<R: Rng>(
        &self,
        msp: &MspMatrix,
        secret: Fr,
        rng: &mut R,
    ) -> Result<Vec<(LeafLabel, Fr)>, PabeError> {
        let v = gen_share_vector(secret, msp.cols, rng);
        calc_shares(msp, &v)
    }

    /// Enumerates the minimal satisfying leaf subsets of `policy` under
    /// the candidate attribute set.
    pub fn prune(&self, policy: &PolicyNode, attrs: &[String]) -> PruneResult {
        calc_pruned(policy, attrs)
    }

    /// Boolean satisfiability only, without subset enumeration.
    pub fn evaluate(&self, policy: &PolicyNode, attrs: &[String]) -> bool {
        traverse_policy(attrs, policy)
    }
}
