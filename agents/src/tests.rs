// ═══════════════════════════════════════════════════════════════════════
// Test suite for agent strategies — tactics, selector, full agents
// ═══════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {

    use crate::{selector, tactics, Agent, ClusterAgent, RandomAgent};
    use pellet_engine::types::{
        AgentKind, AgentRecord, AgentUpdate, Command, PelletUpdate, Point, TurnInput,
    };
    use pellet_engine::{Grid, World};
    use std::time::{Duration, Instant};

    // ── Helpers ────────────────────────────────────────────────────────────

    fn grid_from(rows: &[&str]) -> Grid {
        let strings: Vec<String> = rows.iter().map(|r| r.to_string()).collect();
        Grid::from_rows(rows[0].len() as i32, rows.len() as i32, &strings)
    }

    fn open_world(width: i32, height: i32) -> World {
        World::new(Grid::open(width, height)).unwrap()
    }

    fn far_deadline() -> Instant {
        Instant::now() + Duration::from_secs(5)
    }

    fn agent_update(
        id: i32,
        mine: bool,
        kind: AgentKind,
        x: i32,
        y: i32,
        speed: u32,
        cooldown: u32,
    ) -> AgentUpdate {
        AgentUpdate {
            id,
            mine,
            position: Point::new(x, y),
            kind,
            speed_turns_left: speed,
            ability_cooldown: cooldown,
        }
    }

    fn pellet_update(x: i32, y: i32, value: i32) -> PelletUpdate {
        PelletUpdate {
            position: Point::new(x, y),
            value,
        }
    }

    fn turn_input(agents: Vec<AgentUpdate>, pellets: Vec<PelletUpdate>) -> TurnInput {
        TurnInput {
            my_score: 0,
            opponent_score: 0,
            agents,
            pellets,
        }
    }

    fn my_record(world: &World, id: i32) -> AgentRecord {
        world.my_agents[&id]
    }

    // ═══ Tactical resolver ═════════════════════════════════════════════════

    #[test]
    fn test_speed_fires_when_ability_ready() {
        let mut world = open_world(5, 5);
        world.apply_turn(&turn_input(
            vec![agent_update(0, true, AgentKind::Rock, 2, 2, 0, 0)],
            vec![],
        ));
        let me = my_record(&world, 0);
        assert_eq!(
            tactics::resolve(&world, &me),
            Some(Command::Speed { agent_id: 0 })
        );
    }

    #[test]
    fn test_pursues_weaker_slower_enemy() {
        let mut world = open_world(5, 5);
        world.apply_turn(&turn_input(
            vec![
                agent_update(0, true, AgentKind::Rock, 0, 0, 3, 5),
                agent_update(7, false, AgentKind::Scissors, 2, 0, 0, 5),
            ],
            vec![],
        ));
        let me = my_record(&world, 0);
        assert_eq!(
            tactics::resolve(&world, &me),
            Some(Command::Move {
                agent_id: 0,
                target: Point::new(2, 0)
            })
        );
    }

    #[test]
    fn test_escapes_losing_matchup() {
        let mut world = open_world(5, 5);
        world.apply_turn(&turn_input(
            vec![
                agent_update(0, true, AgentKind::Rock, 0, 0, 0, 5),
                agent_update(7, false, AgentKind::Paper, 1, 0, 0, 5),
            ],
            vec![],
        ));
        let me = my_record(&world, 0);
        // Of the cells within two hops of (0,0), (0,2) is the unique cell
        // farthest (by path) from the pursuer at (1,0).
        assert_eq!(
            tactics::resolve(&world, &me),
            Some(Command::Move {
                agent_id: 0,
                target: Point::new(0, 2)
            })
        );
    }

    #[test]
    fn test_winning_matchup_without_speed_edge_still_escapes() {
        let mut world = open_world(5, 5);
        world.apply_turn(&turn_input(
            vec![
                agent_update(0, true, AgentKind::Rock, 0, 0, 0, 5),
                agent_update(7, false, AgentKind::Scissors, 1, 0, 0, 5),
            ],
            vec![],
        ));
        let me = my_record(&world, 0);
        // Rock beats Scissors but equal speed means no catch; evade instead.
        assert_eq!(
            tactics::resolve(&world, &me),
            Some(Command::Move {
                agent_id: 0,
                target: Point::new(0, 2)
            })
        );
    }

    #[test]
    fn test_yields_to_lower_id_teammate() {
        let mut world = open_world(5, 5);
        world.apply_turn(&turn_input(
            vec![
                agent_update(0, true, AgentKind::Rock, 0, 0, 0, 5),
                agent_update(1, true, AgentKind::Paper, 1, 0, 0, 5),
            ],
            vec![],
        ));
        let me = my_record(&world, 1);
        // (3,0) is the first cell in row-major order among those maximizing
        // the teammate's path distance.
        assert_eq!(
            tactics::resolve(&world, &me),
            Some(Command::Move {
                agent_id: 1,
                target: Point::new(3, 0)
            })
        );
    }

    #[test]
    fn test_stale_enemy_sighting_is_ignored() {
        let mut world = open_world(5, 5);
        world.apply_turn(&turn_input(
            vec![
                agent_update(0, true, AgentKind::Rock, 0, 0, 0, 5),
                agent_update(7, false, AgentKind::Paper, 1, 0, 0, 5),
            ],
            vec![],
        ));
        // Two turns pass without re-sighting the enemy.
        world.apply_turn(&turn_input(
            vec![agent_update(0, true, AgentKind::Rock, 0, 0, 0, 5)],
            vec![],
        ));
        world.apply_turn(&turn_input(
            vec![agent_update(0, true, AgentKind::Rock, 0, 0, 0, 5)],
            vec![],
        ));
        let me = my_record(&world, 0);
        assert_eq!(tactics::resolve(&world, &me), None);
    }

    // ═══ Target selector ═══════════════════════════════════════════════════

    #[test]
    fn test_selector_prefers_super_pellet_region() {
        let mut world = open_world(5, 5);
        world.apply_turn(&turn_input(
            vec![agent_update(0, true, AgentKind::Rock, 0, 0, 0, 5)],
            vec![
                pellet_update(1, 0, 1),
                pellet_update(0, 1, 1),
                pellet_update(3, 4, 1),
                pellet_update(4, 3, 1),
                pellet_update(4, 4, 10),
            ],
        ));
        let me = my_record(&world, 0);
        let target = selector::select_target(&mut world, &me, far_deadline(), None).unwrap();
        assert_eq!(target, Point::new(4, 4));
    }

    #[test]
    fn test_selector_restores_self_value_after_descent() {
        let mut world = open_world(5, 5);
        world.apply_turn(&turn_input(
            vec![agent_update(0, true, AgentKind::Rock, 0, 0, 0, 5)],
            vec![pellet_update(4, 4, 10)],
        ));
        let me = my_record(&world, 0);
        let leaf = world.clusters.leaf(Point::new(0, 0)).unwrap();
        let root = world.clusters.root();
        let leaf_raw = world.clusters.node(leaf).raw;
        let root_raw = world.clusters.node(root).raw;
        assert_eq!(leaf_raw, -5.0);

        selector::select_target(&mut world, &me, far_deadline(), None).unwrap();

        assert_eq!(world.clusters.node(leaf).raw, leaf_raw);
        assert_eq!(world.clusters.node(root).raw, root_raw);
    }

    #[test]
    fn test_selector_deadline_abort_returns_previous_target() {
        let mut world = open_world(5, 5);
        world.apply_turn(&turn_input(
            vec![agent_update(0, true, AgentKind::Rock, 0, 0, 0, 5)],
            vec![pellet_update(4, 4, 10)],
        ));
        let me = my_record(&world, 0);
        let leaf = world.clusters.leaf(Point::new(0, 0)).unwrap();

        let expired = Instant::now();
        let previous = Some(Point::new(3, 3));
        let target = selector::select_target(&mut world, &me, expired, previous).unwrap();

        assert_eq!(target, Point::new(3, 3));
        // The abort path must also restore the masked self value.
        assert_eq!(world.clusters.node(leaf).raw, -5.0);
    }

    #[test]
    fn test_selector_deadline_abort_without_history_holds_position() {
        let mut world = open_world(5, 5);
        world.apply_turn(&turn_input(
            vec![agent_update(0, true, AgentKind::Rock, 1, 2, 0, 5)],
            vec![pellet_update(4, 4, 10)],
        ));
        let me = my_record(&world, 0);
        let target = selector::select_target(&mut world, &me, Instant::now(), None).unwrap();
        assert_eq!(target, Point::new(1, 2));
    }

    #[test]
    fn test_selector_never_targets_wall() {
        let ring = grid_from(&["#####", "#   #", "# # #", "#   #", "#####"]);
        let mut world = World::new(ring).unwrap();
        world.apply_turn(&turn_input(
            vec![agent_update(0, true, AgentKind::Rock, 1, 1, 0, 5)],
            vec![],
        ));
        let me = my_record(&world, 0);
        let target = selector::select_target(&mut world, &me, far_deadline(), None).unwrap();
        assert!(world.grid.is_walkable(target));
    }

    // ═══ Full agents ═══════════════════════════════════════════════════════

    #[test]
    fn test_cluster_agent_repeats_target_on_timeout() {
        let mut world = open_world(5, 5);
        world.apply_turn(&turn_input(
            vec![agent_update(0, true, AgentKind::Rock, 0, 0, 0, 5)],
            vec![
                pellet_update(1, 0, 1),
                pellet_update(0, 1, 1),
                pellet_update(3, 4, 1),
                pellet_update(4, 3, 1),
                pellet_update(4, 4, 10),
            ],
        ));
        let me = my_record(&world, 0);
        let mut agent = ClusterAgent::new();

        let first = agent.act(&mut world, me, far_deadline()).unwrap();
        let second = agent.act(&mut world, me, Instant::now()).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            first,
            Command::Move {
                agent_id: 0,
                target: Point::new(4, 4)
            }
        );
    }

    #[test]
    fn test_cluster_agent_prefers_tactics_over_targeting() {
        let mut world = open_world(5, 5);
        world.apply_turn(&turn_input(
            vec![agent_update(0, true, AgentKind::Rock, 2, 2, 0, 0)],
            vec![pellet_update(4, 4, 10)],
        ));
        let me = my_record(&world, 0);
        let mut agent = ClusterAgent::new();
        let command = agent.act(&mut world, me, far_deadline()).unwrap();
        assert_eq!(command, Command::Speed { agent_id: 0 });
    }

    #[test]
    fn test_random_agent_steps_to_adjacent_cell() {
        let mut world = open_world(3, 3);
        world.apply_turn(&turn_input(
            vec![agent_update(0, true, AgentKind::Rock, 1, 1, 0, 5)],
            vec![],
        ));
        let me = my_record(&world, 0);
        let mut agent = RandomAgent::new(7);
        let Command::Move { agent_id, target } = agent.act(&mut world, me, far_deadline()).unwrap()
        else {
            panic!("random agent should move");
        };
        assert_eq!(agent_id, 0);
        let hop = (target.x - 1).abs() + (target.y - 1).abs();
        assert_eq!(hop, 1);
        assert!(world.grid.is_walkable(target));
    }
}
