// ═══════════════════════════════════════════════════════════════════════
// Tactical resolver
//
// Close-range overrides checked before any objective targeting. Ordered:
// ability use, yielding to a colliding teammate, then reacting to a
// freshly seen enemy in engagement range. Returning `None` hands the
// turn to the target selector.
// ═══════════════════════════════════════════════════════════════════════

use pellet_engine::search;
use pellet_engine::types::{AgentRecord, Command, FightResult, Point};
use pellet_engine::World;

/// Hop radius inside which another unit forces a tactical reaction.
pub const ENGAGEMENT_RANGE: u32 = 2;

/// An enemy sighting older than this is too stale to react to.
pub const FRESHNESS_TURNS: u32 = 2;

pub fn resolve(world: &World, me: &AgentRecord) -> Option<Command> {
    if me.ability_cooldown == 0 {
        return Some(Command::Speed { agent_id: me.id });
    }

    let nearby = search::neighbours(&world.grid, me.position, ENGAGEMENT_RANGE);

    // A teammate with a lower id keeps its course; we give way.
    let mut rivals: Vec<&AgentRecord> = world
        .my_agents
        .values()
        .filter(|a| a.id < me.id && nearby.contains_key(&a.position))
        .collect();
    rivals.sort_by_key(|a| a.id);
    if let Some(rival) = rivals.first() {
        let target = escape_route(world, me, rival.position)?;
        return Some(Command::Move {
            agent_id: me.id,
            target,
        });
    }

    let mut enemies: Vec<&AgentRecord> = world
        .enemy_agents
        .values()
        .filter(|a| world.turn - a.last_seen < FRESHNESS_TURNS && nearby.contains_key(&a.position))
        .collect();
    enemies.sort_by_key(|a| a.position.row_major());
    if let Some(enemy) = enemies.first() {
        // Chase only when the matchup wins AND we out-speed them; a
        // winning matchup against a faster enemy is an uncatchable one.
        let pursue = me.kind.fight(enemy.kind) == FightResult::Win
            && me.speed_turns_left > enemy.speed_turns_left;
        if pursue {
            return Some(Command::Move {
                agent_id: me.id,
                target: enemy.position,
            });
        }
        let target = escape_route(world, me, enemy.position)?;
        return Some(Command::Move {
            agent_id: me.id,
            target,
        });
    }

    None
}

/// Nearby cell maximizing the pursuer's path distance to it. Candidates
/// are scanned in row-major order and ties keep the first seen, so the
/// route is deterministic. `None` only when the agent has no reachable
/// neighbour at all.
fn escape_route(world: &World, me: &AgentRecord, pursuer: Point) -> Option<Point> {
    let mut candidates: Vec<Point> = search::neighbours(&world.grid, me.position, ENGAGEMENT_RANGE)
        .into_keys()
        .collect();
    candidates.sort_by_key(|p| p.row_major());

    let mut best: Option<(Point, u32)> = None;
    for cell in candidates {
        let Ok(distance) = search::path_distance(&world.grid, pursuer, cell) else {
            continue;
        };
        if best.map_or(true, |(_, best_distance)| distance > best_distance) {
            best = Some((cell, distance));
        }
    }
    best.map(|(cell, _)| cell)
}
