//! Discretization of circles, arcs and ovals into vertex loops.
//!
//! Sampled radii are widened so the polygon straddles the true curve:
//! vertices land slightly outside, edge midpoints slightly inside, and the
//! two errors cancel instead of the polygon inscribing the circle.

use std::f32::consts::{PI, TAU};

use glam::{Mat2, Vec2};

/// Segment densities for curved primitives, in segments per full circle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TessellationConfig {
    /// Round endcaps on stroked lines.
    pub endcap_segments: u32,
    /// Pads, vias and drill holes.
    pub pad_segments: u32,
    /// Free-standing arcs and circles.
    pub arc_segments: u32,
    /// Zone perimeter strokes; zero disables them.
    pub zone_segments: u32,
}

impl Default for TessellationConfig {
    fn default() -> Self {
        Self {
            endcap_segments: 18,
            pad_segments: 18,
            arc_segments: 72,
            zone_segments: 18,
        }
    }
}

/// Emits `segments` vertices approximating a full circle.
pub fn discretize_circle(center: Vec2, radius: f32, segments: u32, mut out: impl FnMut(Vec2)) {
    let omega = TAU / segments as f32;
    let adj_radius = 2.0 * radius / (1.0 + (omega / 2.0).cos());

    out(center + Vec2::new(adj_radius, 0.0));
    for s in 1..segments {
        let theta = omega * s as f32;
        out(center + adj_radius * Vec2::new(theta.cos(), theta.sin()));
    }
}

/// Emits vertices along an arc spanning `radians` from `tangent` around
/// `center`. The first and last emitted points lie exactly on the arc's
/// endpoints; intermediate samples are offset by half a step.
pub fn discretize_arc(
    center: Vec2,
    tangent: Vec2,
    radians: f32,
    segments_per_circle: u32,
    mut out: impl FnMut(Vec2),
) {
    let sign = if radians < 0.0 { -1.0 } else { 1.0 };
    let radians = radians * sign;
    let target_omega = TAU / segments_per_circle as f32;
    let segments = (0.5 + radians / target_omega) as u32;

    let tangent_delta = tangent - center;
    let edge_cob = Mat2::from_cols(tangent_delta, tangent_delta.perp());
    let last_point = center + edge_cob * Vec2::new((sign * radians).cos(), (sign * radians).sin());

    out(tangent);
    if segments > 0 {
        let omega = radians / segments as f32;
        let adj_tangent_delta = 2.0 * tangent_delta / (1.0 + (omega / 2.0).cos());
        let cob = Mat2::from_cols(adj_tangent_delta, adj_tangent_delta.perp());
        for s in 0..segments {
            let theta = sign * omega * (s as f32 + 0.5);
            out(center + cob * Vec2::new(theta.cos(), theta.sin()));
        }
    }
    out(last_point);
}

/// Emits vertices around a stadium shape with half-extents `radius`; equal
/// extents degenerate to a circle.
pub fn discretize_oval(center: Vec2, radius: Vec2, segments: u32, mut out: impl FnMut(Vec2)) {
    if radius.x > radius.y {
        let offset = radius.x - radius.y;
        let mut offset_center = Vec2::new(center.x + offset, center.y);
        let mut tangent = Vec2::new(offset_center.x, offset_center.y - radius.y);
        discretize_arc(offset_center, tangent, PI, segments, &mut out);

        offset_center = Vec2::new(center.x - offset, center.y);
        tangent = Vec2::new(offset_center.x, offset_center.y + radius.y);
        discretize_arc(offset_center, tangent, PI, segments, &mut out);
    } else if radius.x < radius.y {
        let offset = radius.y - radius.x;
        let mut offset_center = Vec2::new(center.x, center.y + offset);
        let mut tangent = Vec2::new(offset_center.x + radius.x, offset_center.y);
        discretize_arc(offset_center, tangent, PI, segments, &mut out);

        offset_center = Vec2::new(center.x, center.y - offset);
        tangent = Vec2::new(offset_center.x - radius.x, offset_center.y);
        discretize_arc(offset_center, tangent, PI, segments, &mut out);
    } else {
        discretize_circle(center, radius.x, segments, out);
    }
}
