// ═══════════════════════════════════════════════════════════════════════
// Maze generator — seeded random mazes for headless matches
//
// Randomized depth-first carving over the odd lattice, so every floor
// cell is connected by construction. A few extra walls are knocked out
// afterwards to create loops; corridors with no escape route make for
// degenerate chases.
// ═══════════════════════════════════════════════════════════════════════

use pellet_engine::types::{Cell, PelletRecord, Point, SUPER_PELLET_VALUE};
use pellet_engine::Grid;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// A generated maze plus everything the referee needs to seat a match:
/// spawn cells per side and the super-pellet locations.
#[derive(Debug, Clone)]
pub struct MazeSetup {
    pub grid: Grid,
    pub spawns_a: Vec<Point>,
    pub spawns_b: Vec<Point>,
    pub supers: Vec<Point>,
}

/// Generate a maze. Dimensions are rounded up to odd values of at least
/// 5 so the carving lattice lines up with the outer wall ring. The same
/// seed always produces the same maze.
pub fn generate(width: i32, height: i32, units_per_side: usize, seed: u64) -> MazeSetup {
    let width = width.max(5) | 1;
    let height = height.max(5) | 1;
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let mut open = vec![vec![false; width as usize]; height as usize];
    let mut stack = vec![Point::new(1, 1)];
    open[1][1] = true;
    while let Some(&current) = stack.last() {
        let mut exits: Vec<(Point, Point)> = Vec::new();
        for (dx, dy) in [(2, 0), (-2, 0), (0, 2), (0, -2)] {
            let cell = Point::new(current.x + dx, current.y + dy);
            let inside =
                cell.x >= 1 && cell.x < width - 1 && cell.y >= 1 && cell.y < height - 1;
            if inside && !open[cell.y as usize][cell.x as usize] {
                let wall = Point::new(current.x + dx / 2, current.y + dy / 2);
                exits.push((cell, wall));
            }
        }
        match exits.choose(&mut rng) {
            Some(&(cell, wall)) => {
                open[cell.y as usize][cell.x as usize] = true;
                open[wall.y as usize][wall.x as usize] = true;
                stack.push(cell);
            }
            None => {
                stack.pop();
            }
        }
    }

    // Knock out some interior walls that separate two carved cells,
    // turning the spanning tree into a braided maze.
    let mut knockable: Vec<Point> = Vec::new();
    for y in 1..height - 1 {
        for x in 1..width - 1 {
            if open[y as usize][x as usize] {
                continue;
            }
            let across_x =
                open[y as usize][(x - 1) as usize] && open[y as usize][(x + 1) as usize];
            let across_y =
                open[(y - 1) as usize][x as usize] && open[(y + 1) as usize][x as usize];
            if across_x || across_y {
                knockable.push(Point::new(x, y));
            }
        }
    }
    knockable.shuffle(&mut rng);
    let loops = (width * height / 20) as usize;
    for wall in knockable.into_iter().take(loops) {
        open[wall.y as usize][wall.x as usize] = true;
    }

    let rows: Vec<String> = (0..height)
        .map(|y| {
            (0..width)
                .map(|x| if open[y as usize][x as usize] { ' ' } else { '#' })
                .collect()
        })
        .collect();
    let mut grid = Grid::from_rows(width, height, &rows);

    let walkable = grid.walkable_cells();
    let spawns_a: Vec<Point> = walkable.iter().take(units_per_side).copied().collect();
    let spawns_b: Vec<Point> = walkable.iter().rev().take(units_per_side).copied().collect();

    // Super pellets in the two corners not claimed by spawns.
    let taken: Vec<Point> = spawns_a.iter().chain(&spawns_b).copied().collect();
    let mut supers: Vec<Point> = Vec::new();
    for corner in [Point::new(width - 1, 0), Point::new(0, height - 1)] {
        let closest = walkable
            .iter()
            .filter(|p| !taken.contains(p) && !supers.contains(p))
            .min_by_key(|p| {
                let reach = (p.x - corner.x).abs() + (p.y - corner.y).abs();
                (reach, p.row_major())
            })
            .copied();
        if let Some(cell) = closest {
            grid.set(
                cell,
                Cell::Pellet(PelletRecord {
                    value: SUPER_PELLET_VALUE,
                    last_seen: 0,
                }),
            );
            supers.push(cell);
        }
    }

    MazeSetup {
        grid,
        spawns_a,
        spawns_b,
        supers,
    }
}
