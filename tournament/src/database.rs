// ═══════════════════════════════════════════════════════════════════════
// Database — SQLite storage for match results and ELO ratings
// ═══════════════════════════════════════════════════════════════════════

use crate::runner::MatchResult;
use rusqlite::{params, Connection};

pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) a database at the given path.
    pub fn new(path: &str) -> Self {
        let conn = Connection::open(path).expect("Failed to open database");
        let db = Database { conn };
        db.create_schema();
        db
    }

    /// In-memory database (useful for tests).
    pub fn in_memory() -> Self {
        let conn = Connection::open_in_memory().expect("Failed to open in-memory database");
        let db = Database { conn };
        db.create_schema();
        db
    }

    fn create_schema(&self) {
        self.conn
            .execute_batch(
                "
            CREATE TABLE IF NOT EXISTS agents (
                id          INTEGER PRIMARY KEY,
                name        TEXT NOT NULL UNIQUE,
                elo         REAL NOT NULL DEFAULT 1500.0,
                matches     INTEGER NOT NULL DEFAULT 0,
                wins        INTEGER NOT NULL DEFAULT 0
            );

            CREATE TABLE IF NOT EXISTS matches (
                id          INTEGER PRIMARY KEY,
                seed        INTEGER NOT NULL,
                turns       INTEGER NOT NULL,
                winner      TEXT,
                played_at   TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE IF NOT EXISTS match_players (
                id          INTEGER PRIMARY KEY,
                match_id    INTEGER NOT NULL REFERENCES matches(id),
                agent_id    INTEGER NOT NULL REFERENCES agents(id),
                side        TEXT NOT NULL,
                score       INTEGER NOT NULL
            );
        ",
            )
            .expect("Failed to create schema");
    }

    /// Register an agent (or return existing ID).
    pub fn register_agent(&self, name: &str) -> i64 {
        self.conn
            .execute("INSERT OR IGNORE INTO agents (name) VALUES (?1)", params![name])
            .expect("Failed to register agent");
        self.conn
            .query_row("SELECT id FROM agents WHERE name = ?1", params![name], |row| {
                row.get(0)
            })
            .expect("Failed to get agent id")
    }

    /// Store a completed match, update win counts, and return its row id.
    pub fn store_match(&self, result: &MatchResult) -> i64 {
        let id_a = self.register_agent(&result.agent_a);
        let id_b = self.register_agent(&result.agent_b);

        self.conn
            .execute(
                "INSERT INTO matches (seed, turns, winner) VALUES (?1, ?2, ?3)",
                params![result.seed as i64, result.turns_played as i64, result.winner()],
            )
            .expect("Failed to store match");
        let match_id = self.conn.last_insert_rowid();

        for (agent_id, side, score) in [(id_a, "A", result.score_a), (id_b, "B", result.score_b)] {
            self.conn
                .execute(
                    "INSERT INTO match_players (match_id, agent_id, side, score)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![match_id, agent_id, side, score as i64],
                )
                .expect("Failed to store match player");
        }

        for (agent_id, name) in [(id_a, &result.agent_a), (id_b, &result.agent_b)] {
            let won = result.winner() == Some(name.as_str());
            self.conn
                .execute(
                    "UPDATE agents SET matches = matches + 1, wins = wins + ?1 WHERE id = ?2",
                    params![if won { 1 } else { 0 }, agent_id],
                )
                .expect("Failed to update agent stats");
        }

        match_id
    }

    /// Two-player ELO update. A draw is scored as half a win each.
    pub fn update_elo(&self, result: &MatchResult, k: f64) {
        let id_a = self.register_agent(&result.agent_a);
        let id_b = self.register_agent(&result.agent_b);
        let elo_a = self.elo_of(id_a);
        let elo_b = self.elo_of(id_b);

        let expected_a = 1.0 / (1.0 + 10f64.powf((elo_b - elo_a) / 400.0));
        let actual_a = match result.winner() {
            Some(name) if name == result.agent_a => 1.0,
            Some(_) => 0.0,
            None => 0.5,
        };
        let delta = k * (actual_a - expected_a);

        self.conn
            .execute(
                "UPDATE agents SET elo = elo + ?1 WHERE id = ?2",
                params![delta, id_a],
            )
            .expect("Failed to update ELO");
        self.conn
            .execute(
                "UPDATE agents SET elo = elo - ?1 WHERE id = ?2",
                params![delta, id_b],
            )
            .expect("Failed to update ELO");
    }

    fn elo_of(&self, agent_id: i64) -> f64 {
        self.conn
            .query_row("SELECT elo FROM agents WHERE id = ?1", params![agent_id], |row| {
                row.get(0)
            })
            .unwrap_or(1500.0)
    }

    /// ELO leaderboard: (name, elo, matches, wins), best first.
    pub fn leaderboard(&self) -> Vec<(String, f64, u32, u32)> {
        let mut stmt = self
            .conn
            .prepare("SELECT name, elo, matches, wins FROM agents ORDER BY elo DESC")
            .expect("Failed to prepare leaderboard query");

        stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, f64>(1)?,
                row.get::<_, u32>(2)?,
                row.get::<_, u32>(3)?,
            ))
        })
        .expect("Failed to query leaderboard")
        .filter_map(|r| r.ok())
        .collect()
    }

    /// Total number of matches stored.
    pub fn match_count(&self) -> u32 {
        self.conn
            .query_row("SELECT COUNT(*) FROM matches", [], |row| row.get(0))
            .unwrap_or(0)
    }
}
