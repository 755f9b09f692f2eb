// ═══════════════════════════════════════════════════════════════════════
// ClusterAgent — tactics first, cluster descent second
// ═══════════════════════════════════════════════════════════════════════

use crate::agent::Agent;
use crate::{selector, tactics};
use pellet_engine::types::{AgentRecord, Command, Point};
use pellet_engine::{SearchError, World};
use std::collections::HashMap;
use std::time::Instant;

/// The main strategy: close-range tactical overrides when something is
/// within engagement range, otherwise deadline-bounded descent of the
/// value-cluster tree. Remembers each unit's last target so a timed-out
/// descent can fall back on it.
#[derive(Debug, Default)]
pub struct ClusterAgent {
    previous_targets: HashMap<i32, Point>,
}

impl ClusterAgent {
    pub fn new() -> ClusterAgent {
        ClusterAgent::default()
    }
}

impl Agent for ClusterAgent {
    fn name(&self) -> &str {
        "Cluster"
    }

    fn act(
        &mut self,
        world: &mut World,
        me: AgentRecord,
        deadline: Instant,
    ) -> Result<Command, SearchError> {
        if let Some(command) = tactics::resolve(world, &me) {
            return Ok(command);
        }
        let previous = self.previous_targets.get(&me.id).copied();
        let target = selector::select_target(world, &me, deadline, previous)?;
        self.previous_targets.insert(me.id, target);
        Ok(Command::Move {
            agent_id: me.id,
            target,
        })
    }
}
