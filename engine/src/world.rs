// ═══════════════════════════════════════════════════════════════════════
// World state + turn synchronizer
//
// Owns everything that mutates during a match: the grid, the turn
// counter, scores, per-owner agent records, the persistent super-pellet
// index and the value-cluster tree. Built once from the static maze;
// reconciled against observations every turn.
// ═══════════════════════════════════════════════════════════════════════

use crate::cluster::{ClusterId, ClusterTree};
use crate::grid::Grid;
use crate::search::SearchError;
use crate::types::{
    AgentRecord, AgentUpdate, Cell, PelletRecord, PelletUpdate, Point, TurnInput,
    ENEMY_AGENT_VALUE, MY_AGENT_VALUE,
};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone)]
pub struct World {
    pub grid: Grid,
    pub turn: u32,
    pub my_score: i32,
    pub opponent_score: i32,
    pub my_agents: HashMap<i32, AgentRecord>,
    pub enemy_agents: HashMap<i32, AgentRecord>,
    /// Supers may be present but currently invisible; tracked here so they
    /// are only expired when proven absent.
    pub super_pellets: HashMap<Point, PelletRecord>,
    pub clusters: ClusterTree,
}

impl World {
    /// Create from the static maze, building the cluster hierarchy once.
    pub fn new(grid: Grid) -> Result<World, SearchError> {
        let clusters = ClusterTree::build(&grid)?;
        Ok(World {
            grid,
            turn: 0,
            my_score: 0,
            opponent_score: 0,
            my_agents: HashMap::new(),
            enemy_agents: HashMap::new(),
            super_pellets: HashMap::new(),
            clusters,
        })
    }

    /// Record an observed agent: clears its previous cell, stamps the
    /// record with the current turn and writes it into the grid.
    pub fn observe_agent(&mut self, update: AgentUpdate) {
        let record = AgentRecord {
            id: update.id,
            mine: update.mine,
            kind: update.kind,
            position: update.position,
            speed_turns_left: update.speed_turns_left,
            ability_cooldown: update.ability_cooldown,
            last_seen: self.turn,
        };
        let book = if update.mine {
            &mut self.my_agents
        } else {
            &mut self.enemy_agents
        };
        if let Some(old) = book.insert(update.id, record) {
            if old.position != record.position {
                self.grid.set(old.position, Cell::Floor);
            }
        }
        self.grid.set(record.position, Cell::Agent(record));
    }

    /// Record an observed pellet; supers additionally go into the
    /// persistent index.
    pub fn observe_pellet(&mut self, update: PelletUpdate) {
        let record = PelletRecord {
            value: update.value,
            last_seen: self.turn,
        };
        if record.is_super() {
            self.super_pellets.insert(update.position, record);
        }
        self.grid.set(update.position, Cell::Pellet(record));
    }

    /// Feed one turn of parsed input and reconcile. The turn counter
    /// advances before observations so `last_seen` stamps are current.
    pub fn apply_turn(&mut self, input: &TurnInput) {
        self.begin_turn();
        self.my_score = input.my_score;
        self.opponent_score = input.opponent_score;
        for &agent in &input.agents {
            self.observe_agent(agent);
        }
        for &pellet in &input.pellets {
            self.observe_pellet(pellet);
        }
        self.synchronize();
    }

    pub fn begin_turn(&mut self) {
        self.turn += 1;
    }

    /// Union of cells visible to any of my agents, each agent's own cell
    /// included. Radius is the larger grid dimension, so "visible" means
    /// "unobstructed by a wall anywhere on the grid".
    pub fn visible_to_my_agents(&self) -> HashSet<Point> {
        let radius = self.grid.width().max(self.grid.height()) as u32;
        let mut visible: HashSet<Point> = HashSet::new();
        for agent in self.my_agents.values() {
            visible.insert(agent.position);
            visible.extend(self.grid.visible_points(agent.position, radius));
        }
        visible
    }

    /// Per-turn reconciliation: anything in view that was not re-observed
    /// this turn is gone; supers expire on non-confirmation regardless of
    /// view; unrefreshed own agents are destroyed. Then the full value
    /// sweep pushes deltas into the cluster tree.
    pub fn synchronize(&mut self) {
        let turn = self.turn;

        // 1+2: demote stale entities in the visible union to floor.
        for cell in self.visible_to_my_agents() {
            match self.grid.get(cell) {
                Cell::Pellet(p) if p.last_seen != turn => {
                    self.grid.set(cell, Cell::Floor);
                    self.super_pellets.remove(&cell);
                }
                Cell::Agent(a) if a.last_seen != turn => {
                    self.grid.set(cell, Cell::Floor);
                }
                Cell::Wall | Cell::Floor | Cell::Pellet(_) | Cell::Agent(_) => {}
            }
        }

        // 3: supers are always reported while present, so one missed
        // confirmation is proof of absence.
        let expired: Vec<Point> = self
            .super_pellets
            .iter()
            .filter(|(_, p)| p.last_seen != turn)
            .map(|(&pos, _)| pos)
            .collect();
        for pos in expired {
            self.super_pellets.remove(&pos);
            if matches!(self.grid.get(pos), Cell::Pellet(p) if p.is_super()) {
                self.grid.set(pos, Cell::Floor);
            }
        }

        // 4: own agents are always reported; a missing one is dead.
        let dead: Vec<i32> = self
            .my_agents
            .values()
            .filter(|a| a.last_seen != turn)
            .map(|a| a.id)
            .collect();
        for id in dead {
            if let Some(agent) = self.my_agents.remove(&id) {
                if matches!(self.grid.get(agent.position), Cell::Agent(a) if a.id == id && a.mine) {
                    self.grid.set(agent.position, Cell::Floor);
                }
            }
        }

        // 5: keep every leaf's raw value equal to its cell's objective
        // value, propagating only the difference.
        self.refresh_values();
    }

    /// Objective value of one cell's contents, confidence-decayed by how
    /// long ago the entity was last directly observed.
    pub fn objective_value(&self, cell: Cell) -> f64 {
        let age = |last_seen: u32| (self.turn - last_seen + 1) as f64;
        match cell {
            Cell::Agent(a) if a.mine => MY_AGENT_VALUE / age(a.last_seen),
            Cell::Agent(a) => ENEMY_AGENT_VALUE / age(a.last_seen),
            Cell::Pellet(p) => p.value as f64 / age(p.last_seen),
            Cell::Wall | Cell::Floor => 0.0,
        }
    }

    fn refresh_values(&mut self) {
        let updates: Vec<(ClusterId, f64)> = self
            .clusters
            .leaf_entries()
            .filter_map(|(cell, leaf)| {
                let difference =
                    self.objective_value(self.grid.get(cell)) - self.clusters.node(leaf).raw;
                (difference != 0.0).then_some((leaf, difference))
            })
            .collect();
        for (leaf, difference) in updates {
            self.clusters.add_value(leaf, difference);
        }
    }
}
