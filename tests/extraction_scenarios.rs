use cgmath::{Point3, Vector3};
use voxel_nav_terrain::{
    meshing::{extract, ExtractionSettings},
    navigation::NavGraph,
    terrain::{DensityField, SolidStack},
    LatticeCoordinate, Transform,
};

const GROUND_HEIGHT: f32 = 0.55;

fn settings() -> ExtractionSettings {
    ExtractionSettings {
        resolution: 4,
        ..Default::default()
    }
}

fn flat_ground() -> SolidStack {
    let mut solids = SolidStack::new();
    solids.add_ground(GROUND_HEIGHT);
    solids
}

fn assert_symmetric(graph: &NavGraph) {
    for (a, b) in graph.edges() {
        assert!(graph.has_edge(a, b) && graph.has_edge(b, a));
    }
    for a in graph.nodes() {
        for b in graph.neighbors(a) {
            assert!(graph.has_edge(b, a), "{b} does not link back to {a}");
        }
    }
}

#[test]
fn flat_ground_produces_a_single_layer() {
    let extraction = extract(&flat_ground(), &settings());

    assert_eq!(extraction.mesh.quad_count(), 16);
    assert!(extraction.mesh.positions().all(|p| (p.y - 0.5).abs() < 1e-5));
    assert_eq!(extraction.nav_graph.node_count(), 25);
    assert!(extraction.nav_graph.nodes().all(|c| c.y == 2));
}

#[test]
fn filling_solid_material_changes_nothing() {
    let before = extract(&flat_ground(), &settings());

    let mut solids = flat_ground();
    solids.fill(Point3::new(0.5, 0.2, 0.5), 0.1);
    let after = extract(&solids, &settings());

    assert_eq!(after.mesh, before.mesh);
    assert_eq!(after.nav_graph, before.nav_graph);
}

#[test]
fn eroding_the_ground_carves_new_faces() {
    let before = extract(&flat_ground(), &settings());

    let center = Point3::new(0.5, GROUND_HEIGHT, 0.5);
    let mut solids = flat_ground();
    solids.erode(center, 0.3);
    let after = extract(&solids, &settings());

    assert_ne!(after.mesh.quad_count(), before.mesh.quad_count());

    let horizontal = |p: Point3<f32>| ((p.x - center.x).powi(2) + (p.z - center.z).powi(2)).sqrt();
    assert!(after
        .mesh
        .positions()
        .any(|p| horizontal(p) < 0.3 && p.y < 0.45));
    for p in after.mesh.positions().filter(|&p| horizontal(p) > 0.6) {
        assert!((p.y - 0.5).abs() < 1e-5, "untouched vertex moved: {p:?}");
    }
    assert_symmetric(&after.nav_graph);
}

#[test]
fn sign_is_zero_exactly_when_samples_agree() {
    let mut solids = flat_ground();
    solids.erode(Point3::new(0.4, 0.5, 0.6), 0.25);
    solids.fill(Point3::new(0.7, 0.7, 0.3), 0.15);

    let mut rng = fastrand::Rng::with_seed(7);
    let mut point = || Point3::new(rng.f32(), rng.f32(), rng.f32());
    for _ in 0..2000 {
        let (p, q) = (point(), point());
        let same_side = (solids.density(p) > 0.0) == (solids.density(q) > 0.0);
        assert_eq!(solids.midpoint_sign(p, q) == 0, same_side);
    }
}

#[test]
fn merged_chunks_are_symmetric_and_order_independent() {
    let mut left = SolidStack::new();
    left.add_ground(0.55);
    left.erode(Point3::new(1.0, 0.55, 0.5), 0.3);
    let mut right = SolidStack::new();
    right.add_ground(0.55);
    right.erode(Point3::new(0.0, 0.55, 0.5), 0.3);

    let chunks = [
        (
            extract(&left, &settings()).nav_graph,
            LatticeCoordinate::new(0, 0, 0),
            Transform::new(Vector3::new(0.0, 0.0, 0.0), 10.0),
        ),
        (
            extract(&right, &settings()).nav_graph,
            LatticeCoordinate::new(1, 0, 0),
            Transform::new(Vector3::new(10.0, 0.0, 0.0), 10.0),
        ),
    ];

    let mut forward = NavGraph::new();
    for (graph, chunk, transform) in &chunks {
        forward.merge(graph, *chunk, 4, transform);
    }
    let mut backward = NavGraph::new();
    for (graph, chunk, transform) in chunks.iter().rev() {
        backward.merge(graph, *chunk, 4, transform);
    }

    assert_symmetric(&forward);
    assert!(forward.nodes().eq(backward.nodes()));
    assert!(forward.edges().eq(backward.edges()));
    // the seam column x = 4 is shared, not duplicated
    let seam = LatticeCoordinate::new(4, 2, 0);
    assert!(forward.neighbors(seam).any(|n| n.x == 3));
    assert!(forward.neighbors(seam).any(|n| n.x == 5));
}

#[test]
fn repeated_positions_keep_the_first() {
    let mut graph = NavGraph::new();
    let c = LatticeCoordinate::new(3, 1, 4);
    graph.add_position(c, Point3::new(1.0, 1.0, 1.0));
    for i in 0..10 {
        graph.add_position(c, Point3::new(i as f32, 0.0, 0.0));
        assert_eq!(graph.position(c), Some(Point3::new(1.0, 1.0, 1.0)));
    }
}
