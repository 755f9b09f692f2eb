// ═══════════════════════════════════════════════════════════════════════
// Agent trait — interface all decision-makers implement
//
// An agent decides one command for one of its own units per turn. The
// world is passed mutably because the cluster-descent strategy makes a
// scoped value adjustment during its decision; every implementation must
// leave the world exactly as it found it. The deadline is an explicit
// wall-clock instant threaded in by the caller, never an ambient timer.
// ═══════════════════════════════════════════════════════════════════════

use pellet_engine::types::{AgentRecord, Command};
use pellet_engine::{SearchError, World};
use std::time::Instant;

pub trait Agent: Send + Sync {
    /// Human-readable name for this agent (e.g. "Cluster", "Random").
    fn name(&self) -> &str;

    /// Decide the command for one own agent this turn.
    fn act(
        &mut self,
        world: &mut World,
        me: AgentRecord,
        deadline: Instant,
    ) -> Result<Command, SearchError>;
}
