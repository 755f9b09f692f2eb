// ═══════════════════════════════════════════════════════════════════════
// Test suite for maze generation, the referee and result storage
// ═══════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use crate::database::Database;
    use crate::maze;
    use crate::runner::{run_match, run_series, MatchConfig, MatchResult};
    use pellet_agents::{Agent, RandomAgent};
    use pellet_engine::types::Cell;
    use pellet_engine::ClusterTree;
    use std::time::Duration;

    fn small_config(seed: u64) -> MatchConfig {
        MatchConfig {
            seed,
            width: 9,
            height: 9,
            units_per_side: 1,
            max_turns: 30,
            turn_budget: Duration::from_millis(50),
        }
    }

    // ═════════════════════════════════════════════════════════════════════
    // MAZE GENERATION TESTS
    // ═════════════════════════════════════════════════════════════════════

    #[test]
    fn test_maze_is_deterministic() {
        let a = maze::generate(17, 11, 2, 42);
        let b = maze::generate(17, 11, 2, 42);
        assert_eq!(a.grid.walkable_cells(), b.grid.walkable_cells());
        assert_eq!(a.spawns_a, b.spawns_a);
        assert_eq!(a.supers, b.supers);
    }

    #[test]
    fn test_maze_is_connected() {
        for seed in 0..10 {
            let setup = maze::generate(17, 11, 2, seed);
            assert!(
                ClusterTree::build(&setup.grid).is_ok(),
                "maze from seed {} is disconnected",
                seed
            );
        }
    }

    #[test]
    fn test_maze_places_two_supers_on_floor() {
        let setup = maze::generate(17, 11, 2, 7);
        assert_eq!(setup.supers.len(), 2);
        for &cell in &setup.supers {
            assert!(matches!(setup.grid.get(cell), Cell::Pellet(p) if p.is_super()));
            assert!(!setup.spawns_a.contains(&cell));
            assert!(!setup.spawns_b.contains(&cell));
        }
    }

    #[test]
    fn test_maze_spawns_are_walkable_and_distinct() {
        let setup = maze::generate(17, 11, 2, 3);
        assert_eq!(setup.spawns_a.len(), 2);
        assert_eq!(setup.spawns_b.len(), 2);
        for &cell in setup.spawns_a.iter().chain(&setup.spawns_b) {
            assert!(setup.grid.is_walkable(cell));
        }
        assert!(setup.spawns_a.iter().all(|c| !setup.spawns_b.contains(c)));
    }

    // ═════════════════════════════════════════════════════════════════════
    // REFEREE TESTS
    // ═════════════════════════════════════════════════════════════════════

    #[test]
    fn test_match_runs_to_completion() {
        let mut a = RandomAgent::new(1);
        let mut b = RandomAgent::new(2);
        let result = run_match(&mut a, &mut b, &small_config(5)).unwrap();
        assert!(result.turns_played > 0);
        assert!(result.turns_played <= 30);
        assert!(result.score_a >= 0);
        assert!(result.score_b >= 0);
    }

    #[test]
    fn test_match_is_reproducible() {
        let run = || {
            let mut a = RandomAgent::new(1);
            let mut b = RandomAgent::new(2);
            run_match(&mut a, &mut b, &small_config(11)).unwrap()
        };
        let first = run();
        let second = run();
        assert_eq!(first.score_a, second.score_a);
        assert_eq!(first.score_b, second.score_b);
        assert_eq!(first.turns_played, second.turns_played);
    }

    #[test]
    fn test_series_runs_every_seed() {
        let results = run_series(
            || Box::new(RandomAgent::new(1)) as Box<dyn Agent>,
            || Box::new(RandomAgent::new(2)) as Box<dyn Agent>,
            4,
            100,
            &small_config(0),
        );
        assert_eq!(results.len(), 4);
        let seeds: Vec<u64> = results.iter().map(|r| r.as_ref().unwrap().seed).collect();
        assert_eq!(seeds, vec![100, 101, 102, 103]);
    }

    // ═════════════════════════════════════════════════════════════════════
    // DATABASE TESTS
    // ═════════════════════════════════════════════════════════════════════

    fn sample_result(score_a: i32, score_b: i32) -> MatchResult {
        MatchResult {
            seed: 9,
            turns_played: 42,
            agent_a: "Cluster".to_string(),
            agent_b: "Random".to_string(),
            score_a,
            score_b,
        }
    }

    #[test]
    fn test_store_match_updates_stats() {
        let db = Database::in_memory();
        db.store_match(&sample_result(12, 3));
        db.store_match(&sample_result(4, 8));
        assert_eq!(db.match_count(), 2);

        let board = db.leaderboard();
        assert_eq!(board.len(), 2);
        for (_, _, matches, wins) in &board {
            assert_eq!(*matches, 2);
            assert_eq!(*wins, 1);
        }
    }

    #[test]
    fn test_elo_moves_toward_winner() {
        let db = Database::in_memory();
        db.store_match(&sample_result(12, 3));
        db.update_elo(&sample_result(12, 3), 32.0);

        let board = db.leaderboard();
        let (top_name, top_elo, _, _) = &board[0];
        assert_eq!(top_name, "Cluster");
        assert!(*top_elo > 1500.0);
        assert!(board[1].1 < 1500.0);
    }

    #[test]
    fn test_draw_splits_elo_by_expectation() {
        let db = Database::in_memory();
        // Equal ratings and a draw: nothing should move.
        db.update_elo(&sample_result(5, 5), 32.0);
        let board = db.leaderboard();
        assert!((board[0].1 - 1500.0).abs() < 1e-9);
        assert!((board[1].1 - 1500.0).abs() < 1e-9);
    }
}
