//! End-to-end tests for the plane-sweep triangulator.

use boardview::geometry::{polygon_area, triangulate_polygon, Triangle};
use glam::Vec2;

fn verts(points: &[(f32, f32)]) -> Vec<Vec2> {
    points.iter().map(|&(x, y)| Vec2::new(x, y)).collect()
}

/// Every triangle vertex must be one of the input vertices.
fn assert_vertices_preserved(input: &[Vec2], triangles: &[Triangle]) {
    for tri in triangles {
        for v in tri.v {
            assert!(
                input.contains(&v),
                "triangle vertex {v:?} is not an input vertex"
            );
        }
    }
}

fn assert_consistent_winding(triangles: &[Triangle]) {
    for tri in triangles {
        assert!(
            tri.signed_area() > 0.0,
            "triangle {:?} has non-positive area",
            tri.v
        );
    }
}

#[test]
fn axis_aligned_square() {
    let square = verts(&[(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)]);
    let result = triangulate_polygon(&square);
    assert!(result.diagnostics.is_empty());
    assert_eq!(result.triangles.len(), 2);
    assert!((result.area() - 1.0).abs() < 1e-6);
    assert_vertices_preserved(&square, &result.triangles);

    // the two triangles use all four corners exactly once plus the shared
    // diagonal
    let mut uses = std::collections::HashMap::new();
    for tri in &result.triangles {
        for v in tri.v {
            *uses.entry((v.x.to_bits(), v.y.to_bits())).or_insert(0) += 1;
        }
    }
    assert_eq!(uses.len(), 4);
    let total: i32 = uses.values().sum();
    assert_eq!(total, 6);
}

#[test]
fn convex_pentagon() {
    let pentagon = verts(&[(0.0, 0.0), (2.0, 0.0), (3.0, 1.0), (1.0, 3.0), (-1.0, 1.0)]);
    let result = triangulate_polygon(&pentagon);
    assert!(result.diagnostics.is_empty());
    assert_eq!(result.triangles.len(), 3);
    assert!((result.signed_area() - 7.0).abs() < 1e-5);
    assert_vertices_preserved(&pentagon, &result.triangles);
    assert_consistent_winding(&result.triangles);
}

#[test]
fn l_shape_with_reflex_vertex() {
    let l = verts(&[
        (0.0, 0.0),
        (2.0, 0.0),
        (2.0, 1.0),
        (1.0, 1.0),
        (1.0, 2.0),
        (0.0, 2.0),
    ]);
    let result = triangulate_polygon(&l);
    assert!(result.diagnostics.is_empty());
    assert_eq!(result.triangles.len(), 4);
    assert!((result.signed_area() - 3.0).abs() < 1e-5);
    assert_vertices_preserved(&l, &result.triangles);
    assert_consistent_winding(&result.triangles);
}

#[test]
fn merge_vertex_pentagon() {
    // the (2,2) vertex is reflex with both neighbours to its left: a merge
    let poly = verts(&[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0), (2.0, 2.0)]);
    let result = triangulate_polygon(&poly);
    assert!(result.diagnostics.is_empty());
    assert_eq!(result.triangles.len(), 3);
    assert!((result.signed_area() - 12.0).abs() < 1e-4);
    assert_vertices_preserved(&poly, &result.triangles);
    assert_consistent_winding(&result.triangles);
}

#[test]
fn area_is_conserved_on_jagged_outline() {
    let poly = verts(&[
        (0.0, 0.0),
        (5.0, 0.0),
        (5.0, 1.0),
        (4.0, 1.0),
        (4.0, 2.0),
        (5.0, 2.0),
        (5.0, 3.0),
        (0.0, 3.0),
        (0.5, 1.5),
    ]);
    let reference = polygon_area(&poly);
    let result = triangulate_polygon(&poly);
    assert!(result.diagnostics.is_empty());
    assert!((result.signed_area() - reference).abs() < 1e-4);
    assert!((result.area() - reference.abs()) < 1e-4);
    assert_vertices_preserved(&poly, &result.triangles);
    assert_consistent_winding(&result.triangles);
}

#[test]
fn collinear_chain_is_tolerated() {
    let poly = verts(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0)]);
    let result = triangulate_polygon(&poly);
    assert!(result.diagnostics.is_empty());
    assert!((result.signed_area() - 4.0).abs() < 1e-5);
    assert_vertices_preserved(&poly, &result.triangles);
}

#[test]
fn triangle_is_idempotent() {
    let tri = verts(&[(0.0, 0.0), (3.0, 1.0), (1.0, 2.0)]);
    let result = triangulate_polygon(&tri);
    assert_eq!(result.triangles.len(), 1);
    assert!((result.area() - polygon_area(&tri).abs()).abs() < 1e-6);
    assert_vertices_preserved(&tri, &result.triangles);
}

#[test]
fn consecutive_duplicates_are_collapsed() {
    let poly = verts(&[
        (0.0, 0.0),
        (0.0, 0.0),
        (1.0, 0.0),
        (1.0, 1.0),
        (1.0, 1.0),
        (0.0, 1.0),
        // explicit closing duplicate of the first vertex
        (0.0, 0.0),
    ]);
    let result = triangulate_polygon(&poly);
    assert!(result.diagnostics.is_empty());
    assert_eq!(result.triangles.len(), 2);
    assert!((result.area() - 1.0).abs() < 1e-6);
}

#[test]
fn twin_edge_squares_are_spliced() {
    // two unit squares sharing the segment x=0, the shared edge traversed
    // once in each direction; the twins are excised and the outline becomes
    // one hexagon
    let poly = verts(&[
        (0.0, 0.0),
        (1.0, 0.0),
        (1.0, 1.0),
        (0.0, 1.0),
        (0.0, 0.0),
        (0.0, 1.0),
        (-1.0, 1.0),
        (-1.0, 0.0),
    ]);
    let result = triangulate_polygon(&poly);
    assert!(result.diagnostics.is_empty());
    assert!((result.area() - 2.0).abs() < 1e-5);
    assert_eq!(
        result
            .triangles
            .iter()
            .filter(|t| t.signed_area() != 0.0)
            .count(),
        4
    );
    assert_consistent_winding(&result.triangles);
    assert_vertices_preserved(&poly, &result.triangles);
}

#[test]
fn figure_eight_covers_both_squares() {
    // two touching squares written as one loop with the shared edge
    // traversed twice in the same direction; coverage must still total both
    // interiors
    let poly = verts(&[
        (0.0, 0.0),
        (1.0, 0.0),
        (1.0, 1.0),
        (0.0, 1.0),
        (0.0, 0.0),
        (-1.0, 0.0),
        (-1.0, 1.0),
        (0.0, 1.0),
    ]);
    let result = triangulate_polygon(&poly);
    assert!((result.area() - 2.0).abs() < 1e-5);
    assert_vertices_preserved(&poly, &result.triangles);

    let half_area = |side: f32| -> f32 {
        result
            .triangles
            .iter()
            .filter(|t| (t.v[0].x + t.v[1].x + t.v[2].x) * side > 0.0)
            .map(Triangle::area)
            .sum()
    };
    assert!((half_area(1.0) - 1.0).abs() < 1e-5);
    assert!((half_area(-1.0) - 1.0).abs() < 1e-5);
}

#[test]
fn zero_area_spike_is_excised() {
    // a square with a zero-width spike poking out of its left edge
    let poly = verts(&[
        (0.0, 0.0),
        (2.0, 0.0),
        (2.0, 2.0),
        (0.0, 2.0),
        (0.0, 1.0),
        (-1.0, 1.0),
        (0.0, 1.0),
    ]);
    let result = triangulate_polygon(&poly);
    assert!((result.area() - 4.0).abs() < 1e-5);
    assert_consistent_winding(&result.triangles);
}

#[test]
fn degenerate_inputs_yield_no_triangles() {
    assert!(triangulate_polygon(&[]).triangles.is_empty());
    assert!(triangulate_polygon(&verts(&[(1.0, 1.0)]))
        .triangles
        .is_empty());
    assert!(triangulate_polygon(&verts(&[(0.0, 0.0), (1.0, 1.0)]))
        .triangles
        .is_empty());
    // all vertices coincident collapse to nothing
    assert!(triangulate_polygon(&verts(&[(2.0, 2.0), (2.0, 2.0), (2.0, 2.0)]))
        .triangles
        .is_empty());
}

#[test]
fn large_gear_outline_is_covered() {
    // a 40-tooth gear: alternating radii produce 40 reflex vertices and a
    // long cascade of splits and merges
    let mut poly = Vec::new();
    let teeth = 40;
    for i in 0..teeth * 2 {
        let r = if i % 2 == 0 { 10.0 } else { 7.0 };
        let theta = std::f32::consts::TAU * i as f32 / (teeth * 2) as f32;
        poly.push(Vec2::new(r * theta.cos(), r * theta.sin()));
    }
    let reference = polygon_area(&poly);
    let result = triangulate_polygon(&poly);
    assert!(result.diagnostics.is_empty());
    assert_eq!(result.triangles.len(), poly.len() - 2);
    assert!((result.signed_area() - reference).abs() / reference.abs() < 1e-4);
    assert_vertices_preserved(&poly, &result.triangles);
}
