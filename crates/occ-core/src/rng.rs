//! Seeded random streams, one per simulated agent.
//!
//! An agent's stream depends only on the run seed and its `AgentId`:
//!
//!   seed = run_seed XOR (agent_id * GOLDEN_GAMMA)
//!
//! so an agent makes the same decisions whether it runs alone or inside a
//! batch, on whichever worker thread picks it up.

use rand::rngs::SmallRng;
use rand::{Rng, RngCore, SeedableRng};

use crate::AgentId;

/// Fractional part of the golden ratio in 64-bit fixed point.
const GOLDEN_GAMMA: u64 = 0x9e37_79b9_7f4a_7c15;

/// Random stream owned by one locomotion engine.
pub struct AgentRng(SmallRng);

impl AgentRng {
    /// Stream of `agent` within a run seeded with `run_seed`.
    pub fn new(run_seed: u64, agent: AgentId) -> Self {
        Self::from_seed(run_seed ^ u64::from(agent.0).wrapping_mul(GOLDEN_GAMMA))
    }

    /// Stream from a raw seed, for single-engine tests and tools.
    pub fn from_seed(seed: u64) -> Self {
        AgentRng(SmallRng::seed_from_u64(seed))
    }

    /// The underlying generator, for sampling `rand_distr` distributions.
    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }

    /// Uniform draw in `[0, upper)`.  Returns `0.0` for an empty or
    /// non-finite range.
    pub fn uniform(&mut self, upper: f64) -> f64 {
        if upper.is_finite() && upper > 0.0 {
            self.0.gen_range(0.0..upper)
        } else {
            0.0
        }
    }

    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        self.0.next_u64()
    }
}
