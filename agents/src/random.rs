// ═══════════════════════════════════════════════════════════════════════
// RandomAgent — seeded drunkard's walk, the tournament baseline
// ═══════════════════════════════════════════════════════════════════════

use crate::agent::Agent;
use pellet_engine::types::{AgentRecord, Command};
use pellet_engine::{SearchError, World};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::time::Instant;

pub struct RandomAgent {
    rng: ChaCha8Rng,
}

impl RandomAgent {
    pub fn new(seed: u64) -> RandomAgent {
        RandomAgent {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl Agent for RandomAgent {
    fn name(&self) -> &str {
        "Random"
    }

    fn act(
        &mut self,
        world: &mut World,
        me: AgentRecord,
        _deadline: Instant,
    ) -> Result<Command, SearchError> {
        let mut options = world.grid.step_neighbours(me.position);
        options.sort_by_key(|p| p.row_major());
        let target = options.choose(&mut self.rng).copied().unwrap_or(me.position);
        Ok(Command::Move {
            agent_id: me.id,
            target,
        })
    }
}
