//! Flat persisted form of a [`NavGraph`].
//!
//! Two lists: every directed connection and every resolved position. Replaying
//! them in order rebuilds the same graph, including which position won for
//! each coordinate.

use cgmath::Point3;
use serde::{Deserialize, Serialize};

use crate::terrain::LatticeCoordinate;

use super::graph::NavGraph;

/// One directed adjacency entry.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CellConnection {
    /// Source node
    pub from: LatticeCoordinate,
    /// Neighbour
    pub to: LatticeCoordinate,
}

/// One resolved node position.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CellPosition {
    /// Node
    pub coordinate: LatticeCoordinate,
    /// Position in the graph's space
    pub position: Point3<f32>,
}

/// Persisted navigation graph.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SerializableNavGraph {
    /// Directed connections. Both directions of an edge are listed.
    #[serde(default)]
    pub connections: Vec<CellConnection>,
    /// Node positions.
    #[serde(default)]
    pub positions: Vec<CellPosition>,
}

impl NavGraph {
    /// Flattens this graph for persistence.
    pub fn to_serializable(&self) -> SerializableNavGraph {
        SerializableNavGraph {
            connections: self
                .adjacency
                .iter()
                .flat_map(|(&from, adj)| adj.iter().map(move |&to| CellConnection { from, to }))
                .collect(),
            positions: self
                .positions
                .iter()
                .map(|(&coordinate, &position)| CellPosition {
                    coordinate,
                    position,
                })
                .collect(),
        }
    }

    /// Rebuilds a graph. Connections are made symmetric on load.
    pub fn from_serializable(s: &SerializableNavGraph) -> NavGraph {
        let mut graph = NavGraph::new();
        for c in &s.connections {
            graph.add_adjacency(c.from, c.to);
        }
        for p in &s.positions {
            graph.add_position(p.coordinate, p.position);
        }
        graph
    }
}

impl From<NavGraph> for SerializableNavGraph {
    fn from(graph: NavGraph) -> Self {
        graph.to_serializable()
    }
}

impl From<SerializableNavGraph> for NavGraph {
    fn from(s: SerializableNavGraph) -> Self {
        NavGraph::from_serializable(&s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_sided_connections_load_symmetric() {
        let a = LatticeCoordinate::new(0, 0, 0);
        let b = LatticeCoordinate::new(0, 0, 1);
        let s = SerializableNavGraph {
            connections: vec![CellConnection { from: a, to: b }],
            positions: vec![
                CellPosition {
                    coordinate: a,
                    position: Point3::new(0.0, 0.0, 0.0),
                },
                CellPosition {
                    coordinate: b,
                    position: Point3::new(0.0, 0.0, 1.0),
                },
            ],
        };
        let graph = NavGraph::from_serializable(&s);
        assert!(graph.has_edge(b, a));
        assert_eq!(graph.to_serializable().connections.len(), 2);
    }

    #[test]
    fn replay_keeps_first_position() {
        let c = LatticeCoordinate::new(1, 1, 1);
        let s = SerializableNavGraph {
            connections: vec![],
            positions: vec![
                CellPosition {
                    coordinate: c,
                    position: Point3::new(1.0, 1.0, 1.0),
                },
                CellPosition {
                    coordinate: c,
                    position: Point3::new(2.0, 2.0, 2.0),
                },
            ],
        };
        let graph = NavGraph::from_serializable(&s);
        assert_eq!(graph.position(c), Some(Point3::new(1.0, 1.0, 1.0)));
    }

    #[test]
    fn graph_json_uses_flat_lists() {
        let mut graph = NavGraph::new();
        graph.connect(
            LatticeCoordinate::new(0, 0, 0),
            LatticeCoordinate::X,
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
        );
        let value = serde_json::to_value(&graph).unwrap();
        assert_eq!(value["connections"].as_array().map(Vec::len), Some(2));
        assert_eq!(value["positions"].as_array().map(Vec::len), Some(2));

        let restored: NavGraph = serde_json::from_value(value).unwrap();
        assert_eq!(restored, graph);
    }
}
