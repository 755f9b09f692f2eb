// ═══════════════════════════════════════════════════════════════════════
// Core types — cells, agents, pellets, commands
// ═══════════════════════════════════════════════════════════════════════

use serde::{Deserialize, Serialize};

// ── Objective value constants ──────────────────────────────────────────
// Agents of either side are treated as clutter to steer away from, so
// both carry a negative weight. Pellet values come off the wire.

pub const MY_AGENT_VALUE: f64 = -5.0;
pub const ENEMY_AGENT_VALUE: f64 = -5.0;
pub const PELLET_VALUE: i32 = 1;
pub const SUPER_PELLET_VALUE: i32 = 10;

// ── Point ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Point { x, y }
    }

    /// Row-major ordering key. Used wherever a deterministic iteration
    /// order over cells is required.
    pub fn row_major(&self) -> (i32, i32) {
        (self.y, self.x)
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// ── Direction ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::East => (1, 0),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
        }
    }
}

// ── Agent kind and matchups ────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentKind {
    Rock,
    Paper,
    Scissors,
}

impl AgentKind {
    pub fn parse(token: &str) -> Option<AgentKind> {
        match token {
            "ROCK" => Some(AgentKind::Rock),
            "PAPER" => Some(AgentKind::Paper),
            "SCISSORS" => Some(AgentKind::Scissors),
            _ => None,
        }
    }

    /// Cyclic dominance: Rock > Scissors > Paper > Rock.
    pub fn fight(self, other: AgentKind) -> FightResult {
        if self == other {
            return FightResult::Draw;
        }
        let wins = matches!(
            (self, other),
            (AgentKind::Rock, AgentKind::Scissors)
                | (AgentKind::Scissors, AgentKind::Paper)
                | (AgentKind::Paper, AgentKind::Rock)
        );
        if wins { FightResult::Win } else { FightResult::Loss }
    }
}

impl std::fmt::Display for AgentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentKind::Rock => write!(f, "ROCK"),
            AgentKind::Paper => write!(f, "PAPER"),
            AgentKind::Scissors => write!(f, "SCISSORS"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FightResult {
    Win,
    Draw,
    Loss,
}

// ── Entity records ─────────────────────────────────────────────────────

/// One controllable or opposing agent as last observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRecord {
    pub id: i32,
    pub mine: bool,
    pub kind: AgentKind,
    pub position: Point,
    pub speed_turns_left: u32,
    pub ability_cooldown: u32,
    pub last_seen: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PelletRecord {
    pub value: i32,
    pub last_seen: u32,
}

impl PelletRecord {
    pub fn is_super(&self) -> bool {
        self.value >= SUPER_PELLET_VALUE
    }
}

// ── Cell contents ──────────────────────────────────────────────────────
// Exactly one variant occupies a coordinate at a time; matched
// exhaustively everywhere contents are inspected.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cell {
    Wall,
    Floor,
    Pellet(PelletRecord),
    Agent(AgentRecord),
}

impl Cell {
    pub fn is_wall(&self) -> bool {
        matches!(self, Cell::Wall)
    }

    pub fn is_walkable(&self) -> bool {
        !self.is_wall()
    }
}

// ── Commands ───────────────────────────────────────────────────────────

/// A per-agent action in the wire format the referee accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    Move { agent_id: i32, target: Point },
    Speed { agent_id: i32 },
}

impl Command {
    pub fn agent_id(&self) -> i32 {
        match self {
            Command::Move { agent_id, .. } => *agent_id,
            Command::Speed { agent_id } => *agent_id,
        }
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::Move { agent_id, target } => {
                write!(f, "MOVE {} {} {}", agent_id, target.x, target.y)
            }
            Command::Speed { agent_id } => write!(f, "SPEED {}", agent_id),
        }
    }
}

// ── Per-turn input records ─────────────────────────────────────────────
// Parsed forms of the line protocol; the core never sees raw lines.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentUpdate {
    pub id: i32,
    pub mine: bool,
    pub position: Point,
    pub kind: AgentKind,
    pub speed_turns_left: u32,
    pub ability_cooldown: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PelletUpdate {
    pub position: Point,
    pub value: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnInput {
    pub my_score: i32,
    pub opponent_score: i32,
    pub agents: Vec<AgentUpdate>,
    pub pellets: Vec<PelletUpdate>,
}
