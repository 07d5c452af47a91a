//! Turns parsed board entities into triangle lists.
//!
//! This is the shell-facing boundary: the caller supplies the parsed tree
//! and a filter deciding which entities participate, and gets back flat
//! triangle geometry. Nothing here draws.

mod filters;

pub use filters::{CopperFilter, HoleFilter, LayerFilter, ModuleFilter, StandardFilter};

use glam::{Mat3, Vec2};

use crate::geometry::polygon::{triangulate_ring, SweepDiagnostic, Triangulation};
use crate::geometry::tessellate::{
    discretize_arc, discretize_circle, discretize_oval, TessellationConfig,
};
use crate::geometry::{EdgeArena, Triangle, NIL};
use crate::intern::Interner;
use crate::parser::node::Node;
use crate::parser::pcb::{Keywords, NodeType, PadShape};

/// Everything a filter or the extractor needs to interpret the tree.
pub struct RenderContext<'a> {
    pub interner: &'a Interner,
    pub keywords: &'a Keywords,
}

/// Flat triangle geometry for one filtered view of the board.
#[derive(Clone, Debug, Default)]
pub struct LayerMesh {
    pub triangles: Vec<Triangle>,
    pub diagnostics: Vec<SweepDiagnostic>,
}

impl LayerMesh {
    /// Total unsigned coverage in board units squared.
    pub fn area(&self) -> f32 {
        self.triangles.iter().map(Triangle::area).sum()
    }
}

/// Walks the tree from `root`, tessellating every entity the filter admits.
pub fn extract_layer<'a, F: LayerFilter>(
    ctx: &'a RenderContext<'a>,
    root: &'a Node,
    filter: &'a F,
    config: &TessellationConfig,
) -> LayerMesh {
    let mut extractor = Extractor {
        ctx,
        filter,
        config: *config,
        stack: Vec::new(),
        out: LayerMesh::default(),
    };
    extractor.stack.push(root);
    extractor.root(Mat3::IDENTITY);
    extractor.out
}

fn translation(v: Vec2) -> Mat3 {
    Mat3::from_translation(v)
}

fn rotation(radians: f32) -> Mat3 {
    Mat3::from_angle(radians)
}

fn intersection(s0: Vec2, e0: Vec2, s1: Vec2, e1: Vec2) -> Option<Vec2> {
    let d0 = e0 - s0;
    let d1 = e1 - s1;
    let cross = d0.x * d1.y - d1.x * d0.y;
    if cross == 0.0 {
        return None;
    }
    let ds = s0 - s1;
    let t = (d1.x * ds.y - d1.y * ds.x) / cross;
    Some(s0 + t * d0)
}

struct Extractor<'a, F> {
    ctx: &'a RenderContext<'a>,
    filter: &'a F,
    config: TessellationConfig,
    stack: Vec<&'a Node>,
    out: LayerMesh,
}

impl<'a, F: LayerFilter> Extractor<'a, F> {
    fn node_type(&self, node: &Node) -> NodeType {
        self.ctx.keywords.node_type(node)
    }

    fn test(&self) -> (bool, bool) {
        let node = self.stack.last().expect("stack holds current node");
        self.filter.test(self.ctx, node, &self.stack)
    }

    fn emit(&mut self, a: Vec2, b: Vec2, c: Vec2, m: &Mat3) {
        self.out.triangles.push(Triangle::new(
            m.transform_point2(a),
            m.transform_point2(b),
            m.transform_point2(c),
        ));
    }

    fn fill_fan(&mut self, pts: &[Vec2], m: &Mat3) {
        for i in 2..pts.len() {
            self.emit(pts[0], pts[i - 1], pts[i], m);
        }
    }

    fn endcap(&mut self, center: Vec2, tangent: Vec2, segments: u32, m: &Mat3) {
        let mut pts = Vec::new();
        discretize_arc(center, tangent, std::f32::consts::PI, segments, |v| {
            pts.push(v)
        });
        self.fill_fan(&pts, m);
    }

    /// A stroked segment: rectangle body plus round endcaps.
    fn line(&mut self, start: Vec2, end: Vec2, width: f32, cap_segments: u32, m: &Mat3) {
        if width <= 0.0 {
            return;
        }
        let half_width = width / 2.0;
        let delta = end - start;
        let normal = delta.perp().normalize_or_zero() * half_width;

        self.endcap(start, start + normal, cap_segments, m);
        self.endcap(end, end - normal, cap_segments, m);

        self.emit(start + normal, start - normal, end + normal, m);
        self.emit(start - normal, end + normal, end - normal, m);
    }

    /// A stroked arc: mitred quad strip with endcaps.
    fn arc_stroke(&mut self, center: Vec2, tangent: Vec2, degrees: f32, width: f32, m: &Mat3) {
        if width <= 0.0 || degrees == 0.0 {
            return;
        }
        let half_width = width / 2.0;

        let mut pts = Vec::new();
        discretize_arc(
            center,
            tangent,
            degrees.to_radians(),
            self.config.arc_segments,
            |v| pts.push(v),
        );

        let first = pts[0];
        let offset = (pts[1] - first).perp().normalize_or_zero() * half_width;
        let mut offset1 = first - offset;
        let mut offset2 = first + offset;
        self.endcap(first, offset2, self.config.endcap_segments, m);

        for i in 2..pts.len() {
            let semifinal = pts[i - 2];
            let last = pts[i - 1];
            let v = pts[i];
            let pn = (last - semifinal).perp().normalize_or_zero() * half_width;
            let nn = (v - last).perp().normalize_or_zero() * half_width;

            let inner = intersection(semifinal - pn, last - pn, v - nn, last - nn)
                .unwrap_or(last - pn);
            let outer = intersection(semifinal + pn, last + pn, v + nn, last + nn)
                .unwrap_or(last + pn);

            self.emit(offset2, offset1, outer, m);
            self.emit(offset1, outer, inner, m);

            offset1 = inner;
            offset2 = outer;
        }

        let last = pts[pts.len() - 1];
        let pn = (last - pts[pts.len() - 2]).perp().normalize_or_zero() * half_width;
        let final1 = last - pn;
        let final2 = last + pn;

        self.emit(offset2, offset1, final2, m);
        self.emit(offset1, final2, final1, m);
        self.endcap(last, final1, self.config.endcap_segments, m);
    }

    /// A stroked circle: annulus quad strip.
    fn circle_stroke(&mut self, center: Vec2, tangent: Vec2, width: f32, m: &Mat3) {
        if width <= 0.0 {
            return;
        }
        let radius = center.distance(tangent);
        let segments = self.config.arc_segments;
        let omega = std::f32::consts::TAU / segments as f32;
        let cho = (omega / 2.0).cos();
        let adj_radius = 2.0 * radius / (1.0 + cho);
        let offset = width / (2.0 * cho);
        let r1 = adj_radius - offset;
        let r2 = adj_radius + offset;

        let p0 = (tangent - center) * r1 / radius;
        let p1 = (tangent - center) * r2 / radius;
        let cob0 = glam::Mat2::from_cols(p0, p0.perp());
        let cob1 = glam::Mat2::from_cols(p1, p1.perp());

        let mut last0 = center + p0;
        let mut last1 = center + p1;
        for s in 1..=segments {
            let theta = omega * s as f32;
            let cs = Vec2::new(theta.cos(), theta.sin());
            let q0 = center + cob0 * cs;
            let q1 = center + cob1 * cs;

            self.emit(last1, last0, q1, m);
            self.emit(last0, q1, q0, m);

            last0 = q0;
            last1 = q1;
        }
    }

    /// Reads the common `(start ..) (end ..) (width ..)` children.
    fn line_params(&self, node: &Node) -> (Vec2, Vec2, f32) {
        let mut start = Vec2::ZERO;
        let mut end = Vec2::ZERO;
        let mut width = 0.0;
        for child in node.children() {
            match self.node_type(child) {
                NodeType::Start if child.len() >= 3 => {
                    start = Vec2::new(
                        child.number_at(1).unwrap_or(0.0) as f32,
                        child.number_at(2).unwrap_or(0.0) as f32,
                    );
                }
                NodeType::End if child.len() >= 3 => {
                    end = Vec2::new(
                        child.number_at(1).unwrap_or(0.0) as f32,
                        child.number_at(2).unwrap_or(0.0) as f32,
                    );
                }
                NodeType::Width if child.len() >= 2 => {
                    width = child.number_at(1).unwrap_or(0.0) as f32;
                }
                _ => {}
            }
        }
        (start, end, width)
    }

    fn gr_line(&mut self, m: &Mat3) {
        let node = *self.stack.last().expect("current node");
        let (emit_self, _) = self.test();
        if emit_self {
            let (start, end, width) = self.line_params(node);
            self.line(start, end, width, self.config.endcap_segments, m);
        }
    }

    fn gr_arc(&mut self, m: &Mat3) {
        let node = *self.stack.last().expect("current node");
        let (emit_self, _) = self.test();
        if !emit_self {
            return;
        }
        // (start ..) is the arc center, (end ..) a point on the arc
        let (center, tangent, width) = self.line_params(node);
        let mut angle = 0.0;
        for child in node.children() {
            if self.node_type(child) == NodeType::Angle && child.len() >= 2 {
                angle = child.number_at(1).unwrap_or(0.0) as f32;
            }
        }
        self.arc_stroke(center, tangent, angle, width, m);
    }

    fn gr_circle(&mut self, m: &Mat3) {
        let node = *self.stack.last().expect("current node");
        let (emit_self, _) = self.test();
        if !emit_self {
            return;
        }
        let mut center = Vec2::ZERO;
        let mut tangent = Vec2::ZERO;
        let mut width = 0.0;
        for child in node.children() {
            match self.node_type(child) {
                NodeType::Center if child.len() >= 3 => {
                    center = Vec2::new(
                        child.number_at(1).unwrap_or(0.0) as f32,
                        child.number_at(2).unwrap_or(0.0) as f32,
                    );
                }
                NodeType::End if child.len() >= 3 => {
                    tangent = Vec2::new(
                        child.number_at(1).unwrap_or(0.0) as f32,
                        child.number_at(2).unwrap_or(0.0) as f32,
                    );
                }
                NodeType::Width if child.len() >= 2 => {
                    width = child.number_at(1).unwrap_or(0.0) as f32;
                }
                _ => {}
            }
        }
        self.circle_stroke(center, tangent, width, m);
    }

    fn segment(&mut self, m: &Mat3) {
        let node = *self.stack.last().expect("current node");
        let (emit_self, _) = self.test();
        if emit_self {
            let (start, end, width) = self.line_params(node);
            self.line(start, end, width, self.config.endcap_segments, m);
        }
    }

    fn via(&mut self, m: &Mat3) {
        let node = *self.stack.last().expect("current node");
        let (emit_self, descend) = self.test();
        if !emit_self && !descend {
            return;
        }

        let mut at = Vec2::ZERO;
        let mut size = 0.0;
        let mut drill = None;
        for child in node.children() {
            match self.node_type(child) {
                NodeType::At if child.len() >= 3 => {
                    at = Vec2::new(
                        child.number_at(1).unwrap_or(0.0) as f32,
                        child.number_at(2).unwrap_or(0.0) as f32,
                    );
                }
                NodeType::Size if child.len() >= 2 => {
                    size = child.number_at(1).unwrap_or(0.0) as f32;
                }
                NodeType::Drill => drill = Some(child),
                _ => {}
            }
        }

        if emit_self && size > 0.0 {
            let mut pts = Vec::new();
            discretize_circle(at, size / 2.0, self.config.pad_segments, |v| pts.push(v));
            self.fill_fan(&pts, m);
        }

        if descend {
            if let Some(drill) = drill {
                let drill_transform = *m * translation(at);
                self.stack.push(drill);
                self.drill(&drill_transform);
                self.stack.pop();
            }
        }
    }

    fn drill(&mut self, m: &Mat3) {
        let node = *self.stack.last().expect("current node");
        let (emit_self, _) = self.test();
        if !emit_self {
            return;
        }

        // (drill 0.4) or (drill oval 0.6 0.9)
        let mut size = Vec2::ZERO;
        if let Some(first) = node.get(1) {
            if let Some(d) = first.as_number() {
                size = Vec2::splat(d as f32);
            } else if node.len() >= 4 && first.as_symbol() == Some(self.ctx.keywords.tags.oval) {
                size = Vec2::new(
                    node.number_at(2).unwrap_or(0.0) as f32,
                    node.number_at(3).unwrap_or(0.0) as f32,
                );
            }
        }

        if size.x > 0.0 && size.y > 0.0 {
            let mut pts = Vec::new();
            discretize_oval(Vec2::ZERO, size / 2.0, self.config.pad_segments, |v| {
                pts.push(v)
            });
            self.fill_fan(&pts, m);
        }
    }

    fn pad(&mut self, parent_rot: f32, m: &Mat3) {
        let node = *self.stack.last().expect("current node");
        let (emit_self, descend) = self.test();
        if !emit_self && !descend {
            return;
        }

        // (pad NAME type shape (at ..) (size ..) ...)
        let shape = node
            .get(3)
            .and_then(Node::as_symbol)
            .map(|sym| self.ctx.keywords.pad_shape(sym))
            .unwrap_or(PadShape::Unsupported);

        let mut at = Vec2::ZERO;
        let mut rot = 0.0;
        let mut size = Vec2::ZERO;
        let mut rect_delta = Vec2::ZERO;
        let mut drill = None;
        for child in node.children() {
            match self.node_type(child) {
                NodeType::At if child.len() >= 3 => {
                    at = Vec2::new(
                        child.number_at(1).unwrap_or(0.0) as f32,
                        child.number_at(2).unwrap_or(0.0) as f32,
                    );
                    if child.len() >= 4 {
                        rot = child.number_at(3).unwrap_or(0.0) as f32;
                    }
                }
                NodeType::Size if child.len() >= 2 => {
                    size.x = child.number_at(1).unwrap_or(0.0) as f32;
                    size.y = child.number_at(2).unwrap_or(size.x as f64) as f32;
                }
                NodeType::RectDelta if child.len() >= 2 => {
                    rect_delta.x = child.number_at(1).unwrap_or(0.0) as f32;
                    rect_delta.y = child.number_at(2).unwrap_or(rect_delta.x as f64) as f32;
                }
                NodeType::Drill => drill = Some(child),
                _ => {}
            }
        }

        let child_transform = *m * translation(at) * rotation(-(rot - parent_rot).to_radians());

        if emit_self && size.x > 0.0 && size.y > 0.0 {
            match shape {
                PadShape::Circle => {
                    let mut pts = Vec::new();
                    discretize_circle(Vec2::ZERO, size.x / 2.0, self.config.pad_segments, |v| {
                        pts.push(v)
                    });
                    self.fill_fan(&pts, &child_transform);
                }
                PadShape::Oval => {
                    let mut pts = Vec::new();
                    discretize_oval(Vec2::ZERO, size / 2.0, self.config.pad_segments, |v| {
                        pts.push(v)
                    });
                    self.fill_fan(&pts, &child_transform);
                }
                PadShape::Rect => {
                    self.quad_pad(size / 2.0, Vec2::ZERO, &child_transform);
                }
                PadShape::Trapezoid => {
                    self.quad_pad(size / 2.0, rect_delta / 2.0, &child_transform);
                }
                PadShape::Unsupported => {}
            }
        }

        if descend {
            if let Some(drill) = drill {
                self.stack.push(drill);
                self.drill(&child_transform);
                self.stack.pop();
            }
        }
    }

    /// Rect pads are trapezoids with zero delta.
    fn quad_pad(&mut self, radius: Vec2, delta: Vec2, m: &Mat3) {
        let pts = [
            Vec2::new(-radius.x - delta.y, radius.y + delta.x),
            Vec2::new(-radius.x + delta.y, -radius.y - delta.x),
            Vec2::new(radius.x - delta.y, -radius.y + delta.x),
            Vec2::new(radius.x + delta.y, radius.y - delta.x),
        ];
        self.emit(pts[0], pts[1], pts[3], m);
        self.emit(pts[3], pts[1], pts[2], m);
    }

    fn module(&mut self, m: &Mat3) {
        let node = *self.stack.last().expect("current node");
        let (_, descend) = self.test();
        if !descend {
            return;
        }

        let tags = &self.ctx.keywords.tags;
        let mut at = Vec2::ZERO;
        let mut rot = 0.0;
        if let Some(child) = node.find(tags.at) {
            if child.len() >= 3 {
                at = Vec2::new(
                    child.number_at(1).unwrap_or(0.0) as f32,
                    child.number_at(2).unwrap_or(0.0) as f32,
                );
                if child.len() >= 4 {
                    rot = child.number_at(3).unwrap_or(0.0) as f32;
                }
            }
        }

        let child_transform = *m * translation(at) * rotation(-rot.to_radians());

        for child in node.children() {
            match self.node_type(child) {
                NodeType::Pad => {
                    self.stack.push(child);
                    self.pad(rot, &child_transform);
                    self.stack.pop();
                }
                NodeType::FpLine => {
                    self.stack.push(child);
                    self.gr_line(&child_transform);
                    self.stack.pop();
                }
                NodeType::FpArc => {
                    self.stack.push(child);
                    self.gr_arc(&child_transform);
                    self.stack.pop();
                }
                NodeType::FpCircle => {
                    self.stack.push(child);
                    self.gr_circle(&child_transform);
                    self.stack.pop();
                }
                _ => {}
            }
        }
    }

    fn zone(&mut self, m: &Mat3) {
        let node = *self.stack.last().expect("current node");
        let (emit_self, _) = self.test();
        if !emit_self {
            return;
        }

        let tags = &self.ctx.keywords.tags;
        let width = node
            .find(tags.min_thickness)
            .and_then(|child| child.number_at(1))
            .unwrap_or(0.0) as f32;

        for child in node.children() {
            if self.node_type(child) != NodeType::FilledPolygon {
                continue;
            }
            let Some(pts_node) = child.find(tags.pts) else {
                continue;
            };
            let mut points = Vec::new();
            for p in pts_node.children() {
                if p.len() >= 3 && self.node_type(p) == NodeType::Xy {
                    points.push(Vec2::new(
                        p.number_at(1).unwrap_or(0.0) as f32,
                        p.number_at(2).unwrap_or(0.0) as f32,
                    ));
                }
            }

            let mut arena = EdgeArena::new();
            let ring = arena.push_ring(&points);
            let mut fill = Triangulation::default();
            triangulate_ring(&mut arena, ring.clone(), &mut fill);

            for tri in &fill.triangles {
                self.emit(tri.v[0], tri.v[1], tri.v[2], m);
            }
            self.out.diagnostics.extend(fill.diagnostics);

            if self.config.zone_segments > 0 && width > 0.0 {
                for e in ring {
                    let next = arena[e].next;
                    if next != NIL {
                        self.line(
                            arena.origin(e),
                            arena.origin(next),
                            width,
                            self.config.zone_segments,
                            m,
                        );
                    }
                }
            }
        }
    }

    fn root(&mut self, m: Mat3) {
        let node = *self.stack.last().expect("current node");
        for child in node.children() {
            if child.is_empty() {
                continue;
            }
            let ty = self.node_type(child);
            if ty == NodeType::Ignored {
                continue;
            }
            self.stack.push(child);
            match ty {
                NodeType::KicadPcb => self.root(m),
                NodeType::GrLine => self.gr_line(&m),
                NodeType::GrArc => self.gr_arc(&m),
                NodeType::GrCircle => self.gr_circle(&m),
                NodeType::Module => self.module(&m),
                NodeType::Segment => self.segment(&m),
                NodeType::Via => self.via(&m),
                NodeType::Zone => self.zone(&m),
                _ => {}
            }
            self.stack.pop();
        }
    }
}
