// ═══════════════════════════════════════════════════════════════════════
// Runner — CLI entry point: live protocol play, local matches, tournaments
// ═══════════════════════════════════════════════════════════════════════

use clap::{Parser, Subcommand};
use pellet_agents::{Agent, ClusterAgent, RandomAgent};
use pellet_engine::protocol::{self, ProtocolError};
use pellet_engine::types::Command;
use pellet_engine::World;
use pellet_tournament::{run_series, Database, MatchConfig};
use std::io::Write;
use std::time::{Duration, Instant};

#[derive(Parser)]
#[command(name = "pellet-runner", about = "Pellet pursuit decision engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Speak the referee line protocol on stdin/stdout
    Play {
        /// Per-turn decision budget in milliseconds
        #[arg(short, long, default_value_t = 45)]
        budget: u64,
        /// Agent type: "cluster" or "random"
        #[arg(short, long, default_value = "cluster")]
        agent: String,
    },
    /// Run one local match between two agents
    Match {
        #[arg(short, long, default_value_t = 42)]
        seed: u64,
        #[arg(long, default_value_t = 17)]
        width: i32,
        #[arg(long, default_value_t = 11)]
        height: i32,
        #[arg(short, long, default_value_t = 2)]
        units: usize,
        #[arg(short, long, default_value_t = 200)]
        turns: u32,
        /// Agent type for side A
        #[arg(long, default_value = "cluster")]
        agent_a: String,
        /// Agent type for side B
        #[arg(long, default_value = "random")]
        agent_b: String,
        /// Emit the result as JSON instead of text
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Run a tournament of N matches and store results
    Tournament {
        #[arg(short, long, default_value_t = 100)]
        games: u32,
        #[arg(short, long, default_value_t = 42)]
        seed: u64,
        #[arg(short, long, default_value = "results.db")]
        db: String,
        #[arg(long, default_value = "cluster")]
        agent_a: String,
        #[arg(long, default_value = "random")]
        agent_b: String,
    },
    /// Show leaderboard from database
    Leaderboard {
        #[arg(short, long, default_value = "results.db")]
        db: String,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Play { budget, agent } => cmd_play(budget, &agent),
        Commands::Match {
            seed,
            width,
            height,
            units,
            turns,
            agent_a,
            agent_b,
            json,
        } => cmd_match(seed, width, height, units, turns, &agent_a, &agent_b, json),
        Commands::Tournament {
            games,
            seed,
            db,
            agent_a,
            agent_b,
        } => cmd_tournament(games, seed, &db, &agent_a, &agent_b),
        Commands::Leaderboard { db } => cmd_leaderboard(&db),
    }
}

fn make_agent(agent_type: &str, seed: u64) -> Box<dyn Agent> {
    match agent_type {
        "random" => Box::new(RandomAgent::new(seed)),
        _ => Box::new(ClusterAgent::new()),
    }
}

// ── Live protocol loop ─────────────────────────────────────────────────

fn cmd_play(budget_ms: u64, agent_type: &str) {
    let stdin = std::io::stdin();
    let mut input = stdin.lock();

    let grid = match protocol::read_init(&mut input) {
        Ok(grid) => grid,
        Err(e) => {
            eprintln!("init failed: {}", e);
            std::process::exit(1);
        }
    };
    let mut world = match World::new(grid) {
        Ok(world) => world,
        Err(e) => {
            eprintln!("world setup failed: {}", e);
            std::process::exit(1);
        }
    };
    let mut agent = make_agent(agent_type, 0);

    loop {
        let turn = match protocol::read_turn(&mut input) {
            Ok(turn) => turn,
            Err(ProtocolError::UnexpectedEof { .. }) => break,
            Err(e) => {
                eprintln!("turn read failed: {}", e);
                std::process::exit(1);
            }
        };
        let start = Instant::now();
        let deadline = start + Duration::from_millis(budget_ms);
        world.apply_turn(&turn);

        let mut records: Vec<_> = world.my_agents.values().copied().collect();
        records.sort_by_key(|a| a.id);
        let mut commands = Vec::with_capacity(records.len());
        for record in records {
            match agent.act(&mut world, record, deadline) {
                Ok(command) => commands.push(command),
                Err(e) => {
                    // Holding position is always a legal command.
                    eprintln!("turn {}: agent {} error: {}", world.turn, record.id, e);
                    commands.push(Command::Move {
                        agent_id: record.id,
                        target: record.position,
                    });
                }
            }
        }

        println!("{}", protocol::format_commands(&commands));
        let _ = std::io::stdout().flush();
        eprintln!("turn {}: {} ms", world.turn, start.elapsed().as_millis());
    }
}

// ── Local matches ──────────────────────────────────────────────────────

#[allow(clippy::too_many_arguments)]
fn cmd_match(
    seed: u64,
    width: i32,
    height: i32,
    units: usize,
    turns: u32,
    agent_a: &str,
    agent_b: &str,
    json: bool,
) {
    let config = MatchConfig {
        seed,
        width,
        height,
        units_per_side: units,
        max_turns: turns,
        ..MatchConfig::default()
    };
    let mut a = make_agent(agent_a, seed);
    let mut b = make_agent(agent_b, seed.wrapping_add(1));

    match pellet_tournament::run_match(a.as_mut(), b.as_mut(), &config) {
        Ok(result) if json => match serde_json::to_string(&result) {
            Ok(line) => println!("{}", line),
            Err(e) => eprintln!("serialize error: {}", e),
        },
        Ok(result) => {
            println!("Match finished after {} turns (seed {})", result.turns_played, result.seed);
            println!("  {:10} {:>5}", result.agent_a, result.score_a);
            println!("  {:10} {:>5}", result.agent_b, result.score_b);
            match result.winner() {
                Some(name) => println!("  Winner: {}", name),
                None => println!("  Draw"),
            }
        }
        Err(e) => eprintln!("Match error: {}", e),
    }
}

fn cmd_tournament(games: u32, seed: u64, db_path: &str, agent_a: &str, agent_b: &str) {
    println!("=== Tournament: {} matches, {} vs {} ===\n", games, agent_a, agent_b);

    let db = Database::new(db_path);
    let config = MatchConfig::default();
    let results = run_series(
        || make_agent(agent_a, seed),
        || make_agent(agent_b, seed.wrapping_add(1)),
        games,
        seed,
        &config,
    );

    let mut errors = 0u32;
    let mut wins_a = 0u32;
    let mut wins_b = 0u32;
    let mut draws = 0u32;
    for result in &results {
        match result {
            Ok(result) => {
                db.store_match(result);
                db.update_elo(result, 32.0);
                match result.winner() {
                    Some(name) if name == result.agent_a => wins_a += 1,
                    Some(_) => wins_b += 1,
                    None => draws += 1,
                }
            }
            Err(e) => {
                errors += 1;
                eprintln!("Match error: {}", e);
            }
        }
    }

    println!("--- Summary ({} matches, {} errors) ---", games, errors);
    println!("  {:10}: {:>4} wins", agent_a, wins_a);
    println!("  {:10}: {:>4} wins", agent_b, wins_b);
    println!("  draws     : {:>4}", draws);
    println!("\nResults saved to: {}", db_path);
    println!("Total matches in DB: {}", db.match_count());
}

fn cmd_leaderboard(db_path: &str) {
    let db = Database::new(db_path);
    let board = db.leaderboard();
    if board.is_empty() {
        println!("No agents found. Run some tournaments first.");
        return;
    }
    println!("=== Leaderboard ===\n");
    println!("{:<20} {:>8} {:>8} {:>8}", "Agent", "ELO", "Matches", "Wins");
    println!("{}", "-".repeat(48));
    for (name, elo, matches, wins) in &board {
        println!("{:<20} {:>8.1} {:>8} {:>8}", name, elo, matches, wins);
    }
}
