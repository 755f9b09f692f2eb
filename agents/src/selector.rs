// ═══════════════════════════════════════════════════════════════════════
// Cluster-descent target selector
//
// Walks the value-cluster tree from the root, at each level picking the
// highest-scoring child, until a single cell remains. Scores divide a
// node's aggregated value by the hop distance to its nearest edge, so a
// rich far region competes against a modest near one.
//
// The agent's own negative presence would drag down every region it
// stands in, so it is subtracted for the duration of the descent and
// restored on every exit path by a drop guard.
// ═══════════════════════════════════════════════════════════════════════

use pellet_engine::cluster::{ClusterId, ClusterTree};
use pellet_engine::search;
use pellet_engine::types::{AgentRecord, Cell, Point};
use pellet_engine::{Grid, SearchError, World};
use std::collections::HashSet;
use std::time::Instant;

/// Pick the destination cell for `me`. When the deadline expires
/// mid-descent the previously chosen target is returned unchanged (the
/// agent's own position when there is none); the evaluation in progress
/// is abandoned, not finished.
pub fn select_target(
    world: &mut World,
    me: &AgentRecord,
    deadline: Instant,
    previous: Option<Point>,
) -> Result<Point, SearchError> {
    let fallback = previous.unwrap_or(me.position);
    let Some(leaf) = world.clusters.leaf(me.position) else {
        return Ok(fallback);
    };

    // Only our own recorded presence is masked out; if the grid shows
    // something else at our cell the observation stream is ahead of us
    // and the mask would corrupt a stranger's value.
    let self_value = match world.grid.get(me.position) {
        Cell::Agent(a) if a.mine && a.id == me.id => world.objective_value(Cell::Agent(a)),
        _ => 0.0,
    };

    let grid = &world.grid;
    let guard = SelfValueGuard::apply(&mut world.clusters, leaf, self_value);

    let mut current = guard.clusters().root();
    while !guard.clusters().node(current).is_leaf() {
        let mut children = guard.clusters().node(current).children.clone();
        children.sort_by_key(|&c| guard.clusters().node(c).anchor.row_major());

        let mut best: Option<(ClusterId, f64)> = None;
        for child in children {
            // Budget check before each evaluation; an abort must not
            // emit a half-scored pick.
            if Instant::now() >= deadline {
                eprintln!(
                    "agent {}: turn budget hit mid-descent, reusing {}",
                    me.id, fallback
                );
                return Ok(fallback);
            }
            let score = score_child(grid, guard.clusters(), child, me)?;
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((child, score));
            }
        }
        match best {
            Some((child, _)) => current = child,
            None => return Ok(fallback),
        }
    }

    let node = guard.clusters().node(current);
    Ok(node.edges.first().copied().unwrap_or(node.anchor))
}

/// Desirability of descending into `child` for an agent at `me.position`.
///
/// Distance is 0 inside the child, otherwise hops to its nearest edge.
/// A zero-distance single cell is where we already stand and scores 0;
/// so does an adjacent single cell while boosted, since a double step
/// would overshoot it. Zero-distance regions score their raw sum
/// unscaled; everything else scores aggregated value over distance.
fn score_child(
    grid: &Grid,
    tree: &ClusterTree,
    child: ClusterId,
    me: &AgentRecord,
) -> Result<f64, SearchError> {
    let node = tree.node(child);

    let distance = if tree.contains(child, me.position) {
        0
    } else {
        let targets: HashSet<Point> = node.edges.iter().copied().collect();
        if targets.is_empty() {
            return Ok(f64::NEG_INFINITY);
        }
        let found = search::path_distances(grid, me.position, &targets)?;
        found.values().copied().min().unwrap_or(0)
    };

    let boosted = me.speed_turns_left > 0;
    let score = if node.size == 1 && (distance == 0 || (distance == 1 && boosted)) {
        0.0
    } else if distance == 0 {
        node.raw
    } else {
        node.aggregated / distance as f64
    };
    Ok(score)
}

// ── Scoped self-value mask ─────────────────────────────────────────────

/// Subtracts a value from a leaf (propagating up) on construction and
/// adds it back on drop, so early returns and `?` exits cannot leave the
/// tree skewed.
struct SelfValueGuard<'a> {
    clusters: &'a mut ClusterTree,
    leaf: ClusterId,
    masked: f64,
}

impl<'a> SelfValueGuard<'a> {
    fn apply(clusters: &'a mut ClusterTree, leaf: ClusterId, value: f64) -> SelfValueGuard<'a> {
        clusters.add_value(leaf, -value);
        SelfValueGuard {
            clusters,
            leaf,
            masked: value,
        }
    }

    fn clusters(&self) -> &ClusterTree {
        self.clusters
    }
}

impl Drop for SelfValueGuard<'_> {
    fn drop(&mut self) {
        self.clusters.add_value(self.leaf, self.masked);
    }
}
