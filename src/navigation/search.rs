//! A* search over a [`NavGraph`].

use std::{
    cmp::Ordering,
    collections::{BinaryHeap, HashMap, HashSet},
};

use cgmath::{MetricSpace, Point3};
use log::debug;

use crate::terrain::LatticeCoordinate;

use super::graph::NavGraph;

/// Frontier entry ordered so the heap pops the lowest estimate first.
#[derive(Copy, Clone, Debug)]
struct Frontier {
    estimate: f32,
    node: LatticeCoordinate,
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier {}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .estimate
            .total_cmp(&self.estimate)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl NavGraph {
    /// Finds a path between the nodes nearest to two points.
    ///
    /// # Returns
    ///
    /// The node sequence from start to goal, or `None` when the graph is
    /// empty or the two nodes are not connected.
    pub fn find_path(&self, from: Point3<f32>, to: Point3<f32>) -> Option<Vec<LatticeCoordinate>> {
        let start = self.closest_node(from)?;
        let goal = self.closest_node(to)?;
        self.find_path_between(start, goal)
    }

    /// Shortest path between two nodes, by summed edge length.
    ///
    /// Edge lengths are the distances between node positions, so the straight
    /// line distance to the goal never overestimates and the first time the
    /// goal is popped its cost is final.
    pub fn find_path_between(
        &self,
        start: LatticeCoordinate,
        goal: LatticeCoordinate,
    ) -> Option<Vec<LatticeCoordinate>> {
        let start_position = self.position(start)?;
        let goal_position = self.position(goal)?;

        let mut cost: HashMap<LatticeCoordinate, f32> = HashMap::new();
        let mut parents: HashMap<LatticeCoordinate, LatticeCoordinate> = HashMap::new();
        let mut visited: HashSet<LatticeCoordinate> = HashSet::new();
        let mut frontier = BinaryHeap::new();

        cost.insert(start, 0.0);
        frontier.push(Frontier {
            estimate: start_position.distance(goal_position),
            node: start,
        });

        while let Some(Frontier { node, .. }) = frontier.pop() {
            if !visited.insert(node) {
                continue;
            }
            if node == goal {
                return Some(trace_parents(&parents, goal));
            }

            let (Some(&base), Some(position)) = (cost.get(&node), self.position(node)) else {
                continue;
            };
            for next in self.neighbors(node) {
                if visited.contains(&next) {
                    continue;
                }
                let Some(next_position) = self.position(next) else {
                    continue;
                };

                let candidate = base + position.distance(next_position);
                if cost.get(&next).map_or(true, |&known| candidate < known) {
                    cost.insert(next, candidate);
                    parents.insert(next, node);
                    frontier.push(Frontier {
                        estimate: candidate + next_position.distance(goal_position),
                        node: next,
                    });
                }
            }
        }

        debug!("No path from {start} to {goal}");
        None
    }

    /// Summed edge length along a path.
    pub fn path_length(&self, path: &[LatticeCoordinate]) -> f32 {
        self.path_positions(path)
            .windows(2)
            .map(|pair| pair[0].distance(pair[1]))
            .sum()
    }
}

fn trace_parents(
    parents: &HashMap<LatticeCoordinate, LatticeCoordinate>,
    goal: LatticeCoordinate,
) -> Vec<LatticeCoordinate> {
    let mut path = vec![goal];
    let mut current = goal;
    while let Some(&parent) = parents.get(&current) {
        path.push(parent);
        current = parent;
    }
    path.reverse();
    path
}
