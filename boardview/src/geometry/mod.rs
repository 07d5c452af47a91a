//! Plane geometry: the triangulator and primitive tessellation.

pub mod dcel;
pub mod polygon;
pub mod tessellate;

pub use dcel::{EdgeArena, EdgeId, NIL};
pub use polygon::{triangulate_polygon, SweepAnomaly, SweepDiagnostic, Triangulation};
pub use tessellate::{discretize_arc, discretize_circle, discretize_oval, TessellationConfig};

use glam::Vec2;

/// A filled triangle, in the winding produced by the sweep.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Triangle {
    pub v: [Vec2; 3],
}

impl Triangle {
    pub fn new(a: Vec2, b: Vec2, c: Vec2) -> Self {
        Self { v: [a, b, c] }
    }

    /// Half the cross product of two edges; sign encodes winding.
    pub fn signed_area(&self) -> f32 {
        let [a, b, c] = self.v;
        (b - a).perp_dot(c - a) * 0.5
    }

    pub fn area(&self) -> f32 {
        self.signed_area().abs()
    }
}

/// Signed area of a closed vertex loop (shoelace).
pub fn polygon_area(verts: &[Vec2]) -> f32 {
    if verts.is_empty() {
        return 0.0;
    }
    let mut sum = 0.0;
    for (i, &a) in verts.iter().enumerate() {
        let b = verts[(i + 1) % verts.len()];
        sum += a.perp_dot(b);
    }
    sum * 0.5
}
