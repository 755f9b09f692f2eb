// ═══════════════════════════════════════════════════════════════════════
// Value-cluster tree
//
// A hierarchy over all walkable cells, built once from static maze
// topology and re-weighted every turn. Construction is agglomerative:
// clusters merge with whatever currently touches their boundary, so
// regions separated by walls never merge before an adjacency path
// exists. A coordinate-only quadrant split cannot guarantee that.
//
// Nodes live in an arena addressed by stable indices; parent and child
// links are indices, and value propagation is an iterative walk up the
// parent chain.
// ═══════════════════════════════════════════════════════════════════════

use crate::grid::Grid;
use crate::search::SearchError;
use crate::types::Point;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClusterId(pub u32);

impl ClusterId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterNode {
    /// Boundary cells usable as nearest-approach points from outside.
    /// Sorted row-major. Empty only for a node covering a whole component.
    pub edges: Vec<Point>,
    /// Sum of the covered leaves' objective values.
    pub raw: f64,
    /// Size-normalized, magnitude-amplified desirability:
    /// `sign(raw) * raw^2 / size`.
    pub aggregated: f64,
    /// Count of leaf cells covered.
    pub size: u32,
    pub children: Vec<ClusterId>,
    pub parent: Option<ClusterId>,
    /// Row-major minimal covered cell; canonical representative for
    /// deterministic ordering.
    pub anchor: Point,
}

impl ClusterNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    fn recompute_aggregated(&mut self) {
        self.aggregated = self.raw * self.raw.abs() / self.size as f64;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterTree {
    nodes: Vec<ClusterNode>,
    root: ClusterId,
    leaves: HashMap<Point, ClusterId>,
}

impl ClusterTree {
    /// Build the hierarchy from static topology. Leaves (one per walkable
    /// cell) merge in rounds until a single root covers everything.
    pub fn build(grid: &Grid) -> Result<ClusterTree, SearchError> {
        let cells = grid.walkable_cells();
        let mut nodes: Vec<ClusterNode> = Vec::with_capacity(cells.len() * 2);
        let mut leaves: HashMap<Point, ClusterId> = HashMap::new();
        // Current-generation bookkeeping: which cluster owns each cell,
        // and the covered cell list per live cluster.
        let mut owner: HashMap<Point, ClusterId> = HashMap::new();
        let mut covered: HashMap<ClusterId, Vec<Point>> = HashMap::new();
        let mut generation: Vec<ClusterId> = Vec::with_capacity(cells.len());

        for &cell in &cells {
            let id = ClusterId(nodes.len() as u32);
            nodes.push(ClusterNode {
                edges: vec![cell],
                raw: 0.0,
                aggregated: 0.0,
                size: 1,
                children: Vec::new(),
                parent: None,
                anchor: cell,
            });
            leaves.insert(cell, id);
            owner.insert(cell, id);
            covered.insert(id, vec![cell]);
            generation.push(id);
        }

        if generation.is_empty() {
            return Err(SearchError::Disconnected {
                origin: Point::new(0, 0),
                missing: 0,
            });
        }

        while generation.len() > 1 {
            generation.sort_by_key(|id| nodes[id.index()].anchor.row_major());
            let mut grouped: HashSet<ClusterId> = HashSet::new();
            let mut next: Vec<ClusterId> = Vec::new();
            let mut merged_any = false;

            for gi in 0..generation.len() {
                let c = generation[gi];
                if grouped.contains(&c) {
                    continue;
                }

                // Everything within one hop of c's boundary.
                let mut reach: HashSet<Point> =
                    nodes[c.index()].edges.iter().copied().collect();
                for e in nodes[c.index()].edges.clone() {
                    reach.extend(grid.step_neighbours(e));
                }

                // Neighbourhood: c plus every ungrouped cluster whose
                // boundary touches that reach set.
                let mut members = vec![c];
                for &d in &generation {
                    if d == c || grouped.contains(&d) {
                        continue;
                    }
                    if nodes[d.index()].edges.iter().any(|e| reach.contains(e)) {
                        members.push(d);
                    }
                }
                if members.len() == 1 {
                    // Nothing touches c this round; carry it forward so a
                    // later cluster may still absorb it.
                    continue;
                }
                merged_any = true;
                let member_set: HashSet<ClusterId> = members.iter().copied().collect();

                // Combined edge set: keep a member edge cell only if some
                // one-hop neighbour is owned outside the neighbourhood.
                let mut edges: Vec<Point> = Vec::new();
                for &m in &members {
                    for &e in &nodes[m.index()].edges {
                        let external = grid.step_neighbours(e).into_iter().any(|n| {
                            owner.get(&n).is_some_and(|o| !member_set.contains(o))
                        });
                        if external {
                            edges.push(e);
                        }
                    }
                }
                edges.sort_by_key(|p| p.row_major());

                let size = members.iter().map(|m| nodes[m.index()].size).sum();
                let raw: f64 = members.iter().map(|m| nodes[m.index()].raw).sum();
                let anchor = members
                    .iter()
                    .map(|m| nodes[m.index()].anchor)
                    .min_by_key(|p| p.row_major())
                    .unwrap_or(nodes[c.index()].anchor);

                let parent_id = ClusterId(nodes.len() as u32);
                let mut parent = ClusterNode {
                    edges,
                    raw,
                    aggregated: 0.0,
                    size,
                    children: members.clone(),
                    parent: None,
                    anchor,
                };
                parent.recompute_aggregated();
                nodes.push(parent);

                let mut region: Vec<Point> = Vec::new();
                for &m in &members {
                    nodes[m.index()].parent = Some(parent_id);
                    grouped.insert(m);
                    region.extend(covered.remove(&m).unwrap_or_default());
                }
                for &p in &region {
                    owner.insert(p, parent_id);
                }
                covered.insert(parent_id, region);
                next.push(parent_id);
            }

            if !merged_any {
                // Two or more clusters with no adjacency path left between
                // them: the walkable graph is disconnected.
                return Err(SearchError::Disconnected {
                    origin: nodes[generation[0].index()].anchor,
                    missing: generation.len() - 1,
                });
            }

            next.extend(generation.iter().copied().filter(|c| !grouped.contains(c)));
            generation = next;
        }

        Ok(ClusterTree {
            root: generation[0],
            nodes,
            leaves,
        })
    }

    pub fn root(&self) -> ClusterId {
        self.root
    }

    pub fn node(&self, id: ClusterId) -> &ClusterNode {
        &self.nodes[id.index()]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The leaf cluster whose edge set is exactly `{cell}`.
    pub fn leaf(&self, cell: Point) -> Option<ClusterId> {
        self.leaves.get(&cell).copied()
    }

    /// Leaf clusters and their cells, in arbitrary order.
    pub fn leaf_entries(&self) -> impl Iterator<Item = (Point, ClusterId)> + '_ {
        self.leaves.iter().map(|(&p, &id)| (p, id))
    }

    /// Whether `cell` lies inside the region covered by `ancestor`.
    /// Walks the parent chain from the cell's leaf; depth-bounded.
    pub fn contains(&self, ancestor: ClusterId, cell: Point) -> bool {
        let mut current = match self.leaf(cell) {
            Some(id) => id,
            None => return false,
        };
        loop {
            if current == ancestor {
                return true;
            }
            match self.nodes[current.index()].parent {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    /// Add `delta` to a node's raw value and propagate the same delta up
    /// through every ancestor, recomputing aggregated values on the way.
    /// Past the root this is a no-op, never an error.
    pub fn add_value(&mut self, id: ClusterId, delta: f64) {
        if delta == 0.0 {
            return;
        }
        let mut current = Some(id);
        while let Some(cid) = current {
            let node = &mut self.nodes[cid.index()];
            node.raw += delta;
            node.recompute_aggregated();
            current = node.parent;
        }
    }
}
