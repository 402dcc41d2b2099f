//! # Navigation Graph
//!
//! A sparse undirected graph keyed by [`LatticeCoordinate`]. Each node has one
//! resolved position, fixed by whichever contribution reached it first.
//!
//! Storage is ordered so iteration, nearest-node tie-breaking and serialized
//! output never depend on insertion history or hashing.

use std::collections::{btree_map::Entry, BTreeMap, BTreeSet};

use cgmath::{MetricSpace, Point3};
use serde::{Deserialize, Serialize};

use crate::terrain::{LatticeCoordinate, Transform};

use super::serial::SerializableNavGraph;

/// Walkable graph over extracted dual vertices.
///
/// # Invariants
/// - Adjacency is symmetric: `b` neighbours `a` iff `a` neighbours `b`.
/// - A stored position is never overwritten.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "SerializableNavGraph", into = "SerializableNavGraph")]
pub struct NavGraph {
    pub(super) adjacency: BTreeMap<LatticeCoordinate, BTreeSet<LatticeCoordinate>>,
    pub(super) positions: BTreeMap<LatticeCoordinate, Point3<f32>>,
}

impl NavGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Links `a` and `b` and records their positions if not yet known.
    pub fn connect(
        &mut self,
        a: LatticeCoordinate,
        b: LatticeCoordinate,
        a_position: Point3<f32>,
        b_position: Point3<f32>,
    ) {
        self.add_adjacency(a, b);
        self.add_position(a, a_position);
        self.add_position(b, b_position);
    }

    /// Links `a` and `b` in both directions without touching positions.
    pub fn add_adjacency(&mut self, a: LatticeCoordinate, b: LatticeCoordinate) {
        self.adjacency.entry(a).or_default().insert(b);
        self.adjacency.entry(b).or_default().insert(a);
    }

    /// Records `position` for `c` unless `c` already has one.
    ///
    /// # Returns
    ///
    /// Whether the position was stored.
    pub fn add_position(&mut self, c: LatticeCoordinate, position: Point3<f32>) -> bool {
        match self.positions.entry(c) {
            Entry::Vacant(slot) => {
                slot.insert(position);
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    /// Resolved position of a node.
    pub fn position(&self, c: LatticeCoordinate) -> Option<Point3<f32>> {
        self.positions.get(&c).copied()
    }

    /// Neighbours of `c` in coordinate order. Empty for unknown nodes.
    pub fn neighbors(&self, c: LatticeCoordinate) -> impl Iterator<Item = LatticeCoordinate> + '_ {
        self.adjacency.get(&c).into_iter().flatten().copied()
    }

    /// Whether `a` and `b` are linked.
    pub fn has_edge(&self, a: LatticeCoordinate, b: LatticeCoordinate) -> bool {
        self.adjacency.get(&a).is_some_and(|adj| adj.contains(&b))
    }

    /// Nodes with a resolved position, in coordinate order.
    pub fn nodes(&self) -> impl Iterator<Item = LatticeCoordinate> + '_ {
        self.positions.keys().copied()
    }

    /// Undirected edges as `(a, b)` with `a < b`, in coordinate order.
    pub fn edges(&self) -> impl Iterator<Item = (LatticeCoordinate, LatticeCoordinate)> + '_ {
        self.adjacency
            .iter()
            .flat_map(|(&a, adj)| adj.iter().filter(move |&&b| a < b).map(move |&b| (a, b)))
    }

    /// Number of positioned nodes.
    pub fn node_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of undirected edges.
    pub fn edge_count(&self) -> usize {
        self.edges().count()
    }

    /// Whether the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() && self.adjacency.is_empty()
    }

    /// Node whose position is nearest to `p`. Ties go to the smallest
    /// coordinate.
    pub fn closest_node(&self, p: Point3<f32>) -> Option<LatticeCoordinate> {
        let mut best: Option<(LatticeCoordinate, f32)> = None;
        for (&c, &position) in &self.positions {
            let d = position.distance2(p);
            if best.map_or(true, |(_, best_d)| d < best_d) {
                best = Some((c, d));
            }
        }
        best.map(|(c, _)| c)
    }

    /// Folds a chunk-local graph into this one.
    ///
    /// Coordinates are rebased by `chunk * resolution` and positions are
    /// mapped through `transform`. Positions already present here win.
    ///
    /// # Arguments
    ///
    /// * `other` - Graph in chunk-local coordinates
    /// * `chunk` - The chunk's coordinate in the world grid
    /// * `resolution` - Lattice cells per chunk axis
    /// * `transform` - Chunk-local to target space
    pub fn merge(
        &mut self,
        other: &NavGraph,
        chunk: LatticeCoordinate,
        resolution: u32,
        transform: &Transform,
    ) {
        let offset = chunk * resolution as i32;

        for (&c, &position) in &other.positions {
            self.add_position(c + offset, transform.transform_point(position));
        }
        for (&a, adj) in &other.adjacency {
            for &b in adj {
                self.add_adjacency(a + offset, b + offset);
            }
        }
    }

    /// Positions along a path, skipping coordinates this graph does not know.
    pub fn path_positions(&self, path: &[LatticeCoordinate]) -> Vec<Point3<f32>> {
        path.iter().filter_map(|&c| self.position(c)).collect()
    }
}
