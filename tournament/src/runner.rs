// ═══════════════════════════════════════════════════════════════════════
// Match runner — runs a complete headless match between two agents
//
// The referee keeps the true maze state and feeds each side a fogged
// view through the same TurnInput records the wire protocol produces, so
// agents cannot tell a local match from a live one. Decisions are
// collected for both sides before any movement is applied.
// ═══════════════════════════════════════════════════════════════════════

use crate::maze;
use pellet_agents::Agent;
use pellet_engine::types::{
    AgentKind, AgentUpdate, Cell, Command, FightResult, PelletUpdate, Point, TurnInput,
};
use pellet_engine::{Grid, World};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct MatchConfig {
    pub seed: u64,
    pub width: i32,
    pub height: i32,
    pub units_per_side: usize,
    pub max_turns: u32,
    pub turn_budget: Duration,
}

impl Default for MatchConfig {
    fn default() -> MatchConfig {
        MatchConfig {
            seed: 0,
            width: 17,
            height: 11,
            units_per_side: 2,
            max_turns: 200,
            turn_budget: Duration::from_millis(45),
        }
    }
}

/// Result of a completed match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    pub seed: u64,
    pub turns_played: u32,
    pub agent_a: String,
    pub agent_b: String,
    pub score_a: i32,
    pub score_b: i32,
}

impl MatchResult {
    /// Winning agent's name, or `None` on a draw.
    pub fn winner(&self) -> Option<&str> {
        match self.score_a.cmp(&self.score_b) {
            std::cmp::Ordering::Greater => Some(&self.agent_a),
            std::cmp::Ordering::Less => Some(&self.agent_b),
            std::cmp::Ordering::Equal => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Unit {
    id: i32,
    kind: AgentKind,
    position: Point,
    speed_turns_left: u32,
    ability_cooldown: u32,
    alive: bool,
}

/// Run one match to completion.
pub fn run_match(
    agent_a: &mut dyn Agent,
    agent_b: &mut dyn Agent,
    config: &MatchConfig,
) -> Result<MatchResult, String> {
    let setup = maze::generate(config.width, config.height, config.units_per_side, config.seed);
    let mut truth = setup.grid.clone();
    let mut sides = [spawn_units(&setup.spawns_a), spawn_units(&setup.spawns_b)];
    let mut scores = [0i32, 0i32];
    let mut worlds = [
        World::new(setup.grid.clone()).map_err(|e| e.to_string())?,
        World::new(setup.grid.clone()).map_err(|e| e.to_string())?,
    ];
    let mut turns_played = 0;

    for turn in 1..=config.max_turns {
        turns_played = turn;
        for side in sides.iter_mut() {
            for unit in side.iter_mut() {
                unit.speed_turns_left = unit.speed_turns_left.saturating_sub(1);
                unit.ability_cooldown = unit.ability_cooldown.saturating_sub(1);
            }
        }

        // Both sides decide on the same pre-move snapshot.
        let inputs = [
            side_input(&truth, &sides, &scores, 0),
            side_input(&truth, &sides, &scores, 1),
        ];
        let mut commands: [Vec<Command>; 2] = [Vec::new(), Vec::new()];
        for (side, input) in inputs.iter().enumerate() {
            worlds[side].apply_turn(input);
            let deadline = Instant::now() + config.turn_budget;
            let records: Vec<_> = {
                let mut own: Vec<_> = worlds[side].my_agents.values().copied().collect();
                own.sort_by_key(|a| a.id);
                own
            };
            let agent: &mut dyn Agent = if side == 0 { &mut *agent_a } else { &mut *agent_b };
            for record in records {
                let command = agent
                    .act(&mut worlds[side], record, deadline)
                    .map_err(|e| format!("agent {} failed: {}", agent.name(), e))?;
                commands[side].push(command);
            }
        }

        apply_commands(&mut sides, &commands);
        let targets = move_targets(&commands);
        for sub_step in 0..2 {
            for side in 0..2 {
                step_side(&mut sides, &mut scores, &mut truth, &targets, side, sub_step);
            }
        }

        if pellets_remaining(&truth) == 0 {
            break;
        }
    }

    Ok(MatchResult {
        seed: config.seed,
        turns_played,
        agent_a: agent_a.name().to_string(),
        agent_b: agent_b.name().to_string(),
        score_a: scores[0],
        score_b: scores[1],
    })
}

/// Run a series of matches in parallel, one seed per game. Factories
/// build fresh agents per match so parallel games never share state.
pub fn run_series<A, B>(
    make_a: A,
    make_b: B,
    games: u32,
    base_seed: u64,
    config: &MatchConfig,
) -> Vec<Result<MatchResult, String>>
where
    A: Fn() -> Box<dyn Agent> + Sync,
    B: Fn() -> Box<dyn Agent> + Sync,
{
    (0..games)
        .into_par_iter()
        .map(|i| {
            let mut a = make_a();
            let mut b = make_b();
            let game_config = MatchConfig {
                seed: base_seed.wrapping_add(i as u64),
                ..config.clone()
            };
            run_match(a.as_mut(), b.as_mut(), &game_config)
        })
        .collect()
}

// ── Referee internals ──────────────────────────────────────────────────

fn spawn_units(spawns: &[Point]) -> Vec<Unit> {
    let kinds = [AgentKind::Rock, AgentKind::Paper, AgentKind::Scissors];
    spawns
        .iter()
        .enumerate()
        .map(|(i, &position)| Unit {
            id: i as i32,
            kind: kinds[i % kinds.len()],
            position,
            speed_turns_left: 0,
            ability_cooldown: 0,
            alive: true,
        })
        .collect()
}

/// The fogged per-side observation: own units always, enemies and
/// standard pellets only on an unobstructed ray from an own unit,
/// supers always.
fn side_input(truth: &Grid, sides: &[Vec<Unit>; 2], scores: &[i32; 2], side: usize) -> TurnInput {
    let radius = truth.width().max(truth.height()) as u32;
    let mut visible: HashSet<Point> = HashSet::new();
    for unit in sides[side].iter().filter(|u| u.alive) {
        visible.insert(unit.position);
        visible.extend(truth.visible_points(unit.position, radius));
    }

    let mut agents: Vec<AgentUpdate> = Vec::new();
    for unit in sides[side].iter().filter(|u| u.alive) {
        agents.push(unit_update(unit, true));
    }
    for unit in sides[1 - side].iter().filter(|u| u.alive) {
        if visible.contains(&unit.position) {
            agents.push(unit_update(unit, false));
        }
    }

    let mut pellets: Vec<PelletUpdate> = Vec::new();
    for cell in truth.walkable_cells() {
        if let Cell::Pellet(p) = truth.get(cell) {
            if p.is_super() || visible.contains(&cell) {
                pellets.push(PelletUpdate {
                    position: cell,
                    value: p.value,
                });
            }
        }
    }

    TurnInput {
        my_score: scores[side],
        opponent_score: scores[1 - side],
        agents,
        pellets,
    }
}

fn unit_update(unit: &Unit, mine: bool) -> AgentUpdate {
    AgentUpdate {
        id: unit.id,
        mine,
        position: unit.position,
        kind: unit.kind,
        speed_turns_left: unit.speed_turns_left,
        ability_cooldown: unit.ability_cooldown,
    }
}

fn apply_commands(sides: &mut [Vec<Unit>; 2], commands: &[Vec<Command>; 2]) {
    for side in 0..2 {
        for command in &commands[side] {
            if let Command::Speed { agent_id } = command {
                if let Some(unit) = sides[side].iter_mut().find(|u| u.id == *agent_id) {
                    if unit.ability_cooldown == 0 {
                        unit.speed_turns_left = 5;
                        unit.ability_cooldown = 10;
                    }
                }
            }
        }
    }
}

fn move_targets(commands: &[Vec<Command>; 2]) -> [HashMap<i32, Point>; 2] {
    let mut targets: [HashMap<i32, Point>; 2] = [HashMap::new(), HashMap::new()];
    for side in 0..2 {
        for command in &commands[side] {
            if let Command::Move { agent_id, target } = command {
                targets[side].insert(*agent_id, *target);
            }
        }
    }
    targets
}

/// Advance every moving unit of one side a single cell along its
/// shortest path, resolving collisions and pellet pickups as it lands.
fn step_side(
    sides: &mut [Vec<Unit>; 2],
    scores: &mut [i32; 2],
    truth: &mut Grid,
    targets: &[HashMap<i32, Point>; 2],
    side: usize,
    sub_step: usize,
) {
    for i in 0..sides[side].len() {
        let unit = sides[side][i];
        if !unit.alive {
            continue;
        }
        if sub_step == 1 && unit.speed_turns_left == 0 {
            continue;
        }
        let Some(&target) = targets[side].get(&unit.id) else {
            continue;
        };
        let next = step_toward(truth, unit.position, target);
        if next == unit.position {
            continue;
        }

        // Teammate on the destination blocks the step outright.
        if sides[side].iter().any(|u| u.alive && u.position == next) {
            continue;
        }

        if let Some(j) = sides[1 - side]
            .iter()
            .position(|u| u.alive && u.position == next)
        {
            match unit.kind.fight(sides[1 - side][j].kind) {
                FightResult::Win => sides[1 - side][j].alive = false,
                FightResult::Loss => {
                    sides[side][i].alive = false;
                    continue;
                }
                FightResult::Draw => continue,
            }
        }

        sides[side][i].position = next;
        if let Cell::Pellet(p) = truth.get(next) {
            scores[side] += p.value;
            truth.set(next, Cell::Floor);
        }
    }
}

/// First cell of the shortest path from `from` to `to`; `from` itself
/// when already there or when the target is unreachable.
fn step_toward(truth: &Grid, from: Point, to: Point) -> Point {
    if from == to || !truth.is_walkable(to) {
        return from;
    }
    let mut parent: HashMap<Point, Point> = HashMap::new();
    let mut queue: VecDeque<Point> = VecDeque::new();
    parent.insert(from, from);
    queue.push_back(from);
    while let Some(current) = queue.pop_front() {
        if current == to {
            let mut step = current;
            while parent[&step] != from {
                step = parent[&step];
            }
            return step;
        }
        for next in truth.step_neighbours(current) {
            if !parent.contains_key(&next) {
                parent.insert(next, current);
                queue.push_back(next);
            }
        }
    }
    from
}

fn pellets_remaining(truth: &Grid) -> usize {
    truth
        .walkable_cells()
        .into_iter()
        .filter(|&c| matches!(truth.get(c), Cell::Pellet(_)))
        .count()
}
