// ═══════════════════════════════════════════════════════════════════════
// Grid store + visibility engine
//
// A fixed bounded rectangle of cells with interior walls. The visibility
// rays defined here are the single adjacency primitive for everything
// above this layer: one-step neighbourhood, BFS, cluster construction.
// ═══════════════════════════════════════════════════════════════════════

use crate::types::{Cell, Direction, PelletRecord, Point, PELLET_VALUE};

#[derive(Debug, Clone)]
pub struct Grid {
    width: i32,
    height: i32,
    cells: Vec<Cell>,
}

impl Grid {
    /// Parse from the init rows: space is floor, `#` is wall. Every floor
    /// cell starts with an assumed standard pellet (`last_seen` 0); the
    /// turn synchronizer corrects the assumption as cells come into view.
    pub fn from_rows(width: i32, height: i32, rows: &[String]) -> Grid {
        let mut cells = vec![Cell::Wall; (width * height) as usize];
        for (y, row) in rows.iter().enumerate().take(height as usize) {
            for (x, ch) in row.chars().enumerate().take(width as usize) {
                if ch == ' ' {
                    cells[y * width as usize + x] = Cell::Pellet(PelletRecord {
                        value: PELLET_VALUE,
                        last_seen: 0,
                    });
                }
            }
        }
        Grid { width, height, cells }
    }

    /// An all-floor grid, used by tests and the local referee.
    pub fn open(width: i32, height: i32) -> Grid {
        let rows: Vec<String> = (0..height).map(|_| " ".repeat(width as usize)).collect();
        Grid::from_rows(width, height, &rows)
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn in_bounds(&self, p: Point) -> bool {
        p.x >= 0 && p.x < self.width && p.y >= 0 && p.y < self.height
    }

    pub fn get(&self, p: Point) -> Cell {
        if self.in_bounds(p) {
            self.cells[(p.y * self.width + p.x) as usize]
        } else {
            Cell::Wall
        }
    }

    pub fn set(&mut self, p: Point, cell: Cell) {
        if self.in_bounds(p) {
            self.cells[(p.y * self.width + p.x) as usize] = cell;
        }
    }

    pub fn is_walkable(&self, p: Point) -> bool {
        self.get(p).is_walkable()
    }

    /// All walkable cells in row-major order.
    pub fn walkable_cells(&self) -> Vec<Point> {
        let mut out = Vec::new();
        for y in 0..self.height {
            for x in 0..self.width {
                let p = Point::new(x, y);
                if self.is_walkable(p) {
                    out.push(p);
                }
            }
        }
        out
    }

    /// Every cell visible from `origin` along the four cardinal rays:
    /// starting one step out, stopping (exclusive) at the first wall or
    /// grid edge, never exceeding `max_distance` steps.
    pub fn visible_points(&self, origin: Point, max_distance: u32) -> Vec<Point> {
        let mut out = Vec::new();
        for dir in Direction::ALL {
            let (dx, dy) = dir.delta();
            let mut current = origin;
            for _ in 0..max_distance {
                current = Point::new(current.x + dx, current.y + dy);
                if !self.in_bounds(current) || self.get(current).is_wall() {
                    break;
                }
                out.push(current);
            }
        }
        out
    }

    /// One-step adjacency: the visibility rays truncated to length one.
    pub fn step_neighbours(&self, origin: Point) -> Vec<Point> {
        self.visible_points(origin, 1)
    }
}
