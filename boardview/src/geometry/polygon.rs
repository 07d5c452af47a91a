//! Plane-sweep polygon triangulation.
//!
//! One left-to-right sweep splits the polygon into x-monotone faces by
//! inserting diagonals at split/merge vertices, and each face is handed to
//! the stack-based monotone triangulation the moment it closes. Merge
//! vertices are resolved eagerly: the next event seen above the same status
//! edge draws the pending diagonal, so every monotone piece stays local to
//! the sweep front.
//!
//! Zone outlines are only approximately simple; pinched twin edges are
//! spliced out up front, and the few remaining inconsistencies a non-simple
//! input can produce are reported as diagnostics instead of aborting the
//! sweep.

use std::ops::Range;

use glam::Vec2;

use super::dcel::{EdgeArena, EdgeId, NIL};
use super::Triangle;

/// Where the sweep lost track of a vertex. The triangle list is still valid,
/// but may not cover the whole interior.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SweepDiagnostic {
    pub vertex: Vec2,
    pub kind: SweepAnomaly,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SweepAnomaly {
    /// A non-start vertex had no status edge below it.
    OrphanedVertex,
    /// A merge vertex surfaced with no edge left below it.
    DanglingMerge,
    /// A helper edge was excised while still referenced.
    StaleHelper,
}

#[derive(Clone, Debug, Default)]
pub struct Triangulation {
    pub triangles: Vec<Triangle>,
    pub diagnostics: Vec<SweepDiagnostic>,
}

impl Triangulation {
    pub fn signed_area(&self) -> f32 {
        self.triangles.iter().map(Triangle::signed_area).sum()
    }

    /// Total unsigned coverage.
    pub fn area(&self) -> f32 {
        self.triangles.iter().map(Triangle::area).sum()
    }
}

/// Triangulates one closed vertex loop.
pub fn triangulate_polygon(verts: &[Vec2]) -> Triangulation {
    let mut arena = EdgeArena::new();
    let ring = arena.push_ring(verts);
    let mut out = Triangulation::default();
    triangulate_ring(&mut arena, ring, &mut out);
    out
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum VertexType {
    Start,
    Merge,
    Low,
    High,
    Split,
    End,
}

/// Signed turn at `o`: positive for a left turn (convex corner of a
/// positively wound polygon), negative for a reflex corner.
fn turn(p: Vec2, o: Vec2, n: Vec2) -> f32 {
    (o - p).perp().dot(n - o)
}

fn is_reflex(p: Vec2, o: Vec2, n: Vec2) -> bool {
    turn(p, o, n) < 0.0
}

fn is_convex(p: Vec2, o: Vec2, n: Vec2) -> bool {
    turn(p, o, n) > 0.0
}

fn classify(arena: &EdgeArena, e: EdgeId) -> VertexType {
    let p = arena.origin(arena[e].prev);
    let o = arena.origin(e);
    let n = arena.origin(arena[e].next);

    if p.x < o.x {
        if n.x > o.x {
            VertexType::Low
        } else if is_reflex(p, o, n) {
            VertexType::Merge
        } else if n.x < o.x {
            VertexType::End
        } else {
            VertexType::Low
        }
    } else if p.x > o.x {
        if n.x < o.x {
            VertexType::High
        } else if is_reflex(p, o, n) {
            VertexType::Split
        } else if n.x > o.x {
            VertexType::Start
        } else {
            VertexType::High
        }
    } else if is_convex(p, o, n) {
        if n.x >= o.x {
            VertexType::Start
        } else {
            VertexType::End
        }
    } else if n.x == o.x {
        // zero-width spike; break the tie on y
        if p.y > o.y {
            VertexType::High
        } else {
            VertexType::Low
        }
    } else if n.x >= o.x {
        VertexType::Low
    } else {
        VertexType::High
    }
}

/// Evaluates an edge's y at sweep position `x`. Excised twins degenerate to
/// their origin point.
fn edge_y_at(arena: &EdgeArena, e: EdgeId, x: f32) -> f32 {
    let he = &arena[e];
    if he.next == NIL {
        return he.origin.y;
    }
    let o = he.origin;
    let n = arena[he.next].origin;
    let d = n - o;
    if d.x == 0.0 {
        n.y
    } else {
        o.y + d.y * (x - o.x) / d.x
    }
}

/// Sweep-line order: is `a` below `b` at the later of their origins?
fn edge_below(arena: &EdgeArena, a: EdgeId, b: EdgeId) -> bool {
    let ao = arena.origin(a);
    let bo = arena.origin(b);
    if ao.x > bo.x {
        ao.y < edge_y_at(arena, b, ao.x)
    } else {
        edge_y_at(arena, a, bo.x) < bo.y
    }
}

/// A status edge currently straddling the sweep line, with its helpers:
/// `split` is the vertex a future split diagonal should attach to, `merge`
/// a pending merge vertex whose diagonal is still owed.
#[derive(Clone, Copy, Debug)]
struct StatusEntry {
    key: EdgeId,
    split: EdgeId,
    merge: EdgeId,
}

impl StatusEntry {
    fn open(e: EdgeId) -> Self {
        Self {
            key: e,
            split: e,
            merge: NIL,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Chain {
    Low,
    High,
}

#[derive(Clone, Copy)]
struct ChainVertex {
    v: Vec2,
    chain: Chain,
}

/// Triangulates the x-monotone face containing `start`, whose origin must be
/// the face's rightmost vertex. Walks the two chains leftward, emitting fans
/// across the chains and convex ears along them.
fn triangulate_monotone(
    arena: &EdgeArena,
    start: EdgeId,
    stack: &mut Vec<ChainVertex>,
    out: &mut Vec<Triangle>,
) {
    stack.clear();
    // chain designation of the first vertex is arbitrary
    stack.push(ChainVertex {
        v: arena.origin(start),
        chain: Chain::Low,
    });

    let mut low = arena[start].prev;
    let mut high = arena[start].next;

    if high == low {
        // degenerate two-vertex face
        return;
    } else if arena.origin(high).x > arena.origin(low).x {
        stack.push(ChainVertex {
            v: arena.origin(high),
            chain: Chain::High,
        });
        high = arena[high].next;
    } else {
        stack.push(ChainVertex {
            v: arena.origin(low),
            chain: Chain::Low,
        });
        low = arena[low].prev;
    }

    while high != low {
        if arena.origin(high).x > arena.origin(low).x {
            let hv = arena.origin(high);
            if stack.last().expect("stack never empties").chain == Chain::Low {
                // opposite chain: fan out the whole stack
                for pair in stack.windows(2) {
                    out.push(Triangle::new(pair[1].v, pair[0].v, hv));
                }
                let last = *stack.last().expect("stack never empties");
                stack.clear();
                stack.push(last);
            } else {
                // same chain: pop convex ears
                while stack.len() > 1 {
                    let last = stack[stack.len() - 1];
                    let prev = stack[stack.len() - 2];
                    if is_convex(prev.v, last.v, hv) {
                        out.push(Triangle::new(prev.v, last.v, hv));
                        stack.pop();
                    } else {
                        break;
                    }
                }
            }
            stack.push(ChainVertex {
                v: hv,
                chain: Chain::High,
            });
            high = arena[high].next;
        } else {
            let lv = arena.origin(low);
            if stack.last().expect("stack never empties").chain == Chain::High {
                for pair in stack.windows(2) {
                    out.push(Triangle::new(pair[0].v, pair[1].v, lv));
                }
                let last = *stack.last().expect("stack never empties");
                stack.clear();
                stack.push(last);
            } else {
                while stack.len() > 1 {
                    let last = stack[stack.len() - 1];
                    let prev = stack[stack.len() - 2];
                    if is_convex(lv, last.v, prev.v) {
                        out.push(Triangle::new(lv, last.v, prev.v));
                        stack.pop();
                    } else {
                        break;
                    }
                }
            }
            stack.push(ChainVertex {
                v: lv,
                chain: Chain::Low,
            });
            low = arena[low].prev;
        }
    }

    // both fronts met at the leftmost vertex; close with a final fan whose
    // winding depends on which chain the stack ended on
    let tip = arena.origin(high);
    if stack.last().expect("stack never empties").chain == Chain::High {
        for pair in stack.windows(2) {
            out.push(Triangle::new(pair[0].v, pair[1].v, tip));
        }
    } else {
        for pair in stack.windows(2) {
            out.push(Triangle::new(pair[1].v, pair[0].v, tip));
        }
    }
}

/// Runs the sweep over the ring `ring` of `arena`, appending triangles and
/// diagnostics to `out`. Diagonals are appended to the arena; only the
/// initial ring edges are events, since every diagonal endpoint coincides
/// with an already-processed vertex.
pub fn triangulate_ring(arena: &mut EdgeArena, ring: Range<EdgeId>, out: &mut Triangulation) {
    let mut events: Vec<EdgeId> = ring.collect();
    events.sort_by(|&a, &b| {
        let ao = arena.origin(a);
        let bo = arena.origin(b);
        ao.x.total_cmp(&bo.x).then(ao.y.total_cmp(&bo.y))
    });

    let mut status: Vec<StatusEntry> = Vec::new();
    let mut stack: Vec<ChainVertex> = Vec::new();

    for i in 0..events.len() {
        let e = events[i];
        if arena.is_dead(e) {
            continue;
        }

        // coincident consecutive events mark a pinch; try to excise the twins
        if let Some(&en) = events.get(i + 1) {
            if !arena.is_dead(en) && arena.origin(e) == arena.origin(en) {
                arena.splice_pinch(e, en);
                if arena.is_dead(e) {
                    continue;
                }
            }
        }

        let ty = classify(arena, e);
        let ub = status.partition_point(|entry| !edge_below(arena, e, entry.key));

        if ub == 0 {
            // no edge below: a start vertex opening a new interval. Anything
            // else means the outline is not simple here; open an interval
            // anyway so the rest of the loop still triangulates.
            if ty != VertexType::Start {
                report(out, arena.origin(e), SweepAnomaly::OrphanedVertex);
            }
            status.insert(0, StatusEntry::open(e));
            continue;
        }
        let below = ub - 1;

        let mut pending = status[below].merge;
        if pending != NIL && arena.is_dead(pending) {
            report(out, arena.origin(e), SweepAnomaly::StaleHelper);
            status[below].merge = NIL;
            pending = NIL;
        }

        if pending != NIL {
            // a merge is owed on the edge below; resolve it with a diagonal
            // from this event before the event's own action
            match ty {
                VertexType::Start => {
                    status.insert(ub, StatusEntry::open(e));
                }
                VertexType::End => {
                    let (ep, _) = arena.insert_diagonal(e, pending);
                    status.remove(below);
                    triangulate_monotone(arena, e, &mut stack, &mut out.triangles);
                    triangulate_monotone(arena, ep, &mut stack, &mut out.triangles);
                }
                VertexType::Split => {
                    let (ep, _) = arena.insert_diagonal(e, pending);
                    status[below].split = ep;
                    status[below].merge = NIL;
                    status.insert(ub, StatusEntry::open(e));
                }
                VertexType::Merge => {
                    let (ep, _) = arena.insert_diagonal(e, pending);
                    triangulate_monotone(arena, ep, &mut stack, &mut out.triangles);
                    status.remove(below);
                    merge_into_below(arena, &mut status, below, e, &mut stack, out);
                }
                VertexType::Low => {
                    let (ep, _) = arena.insert_diagonal(e, pending);
                    status[below] = StatusEntry::open(e);
                    triangulate_monotone(arena, ep, &mut stack, &mut out.triangles);
                }
                VertexType::High => {
                    let (ep, _) = arena.insert_diagonal(e, pending);
                    status[below].split = ep;
                    status[below].merge = NIL;
                    triangulate_monotone(arena, e, &mut stack, &mut out.triangles);
                }
            }
        } else {
            match ty {
                VertexType::Start => {
                    status.insert(ub, StatusEntry::open(e));
                }
                VertexType::End => {
                    status.remove(below);
                    triangulate_monotone(arena, e, &mut stack, &mut out.triangles);
                }
                VertexType::Low => {
                    // the chain continues on a new edge; rekey in place
                    status[below] = StatusEntry::open(e);
                }
                VertexType::High => {
                    status[below].split = e;
                }
                VertexType::Merge => {
                    status.remove(below);
                    merge_into_below(arena, &mut status, below, e, &mut stack, out);
                }
                VertexType::Split => {
                    let target = status[below].split;
                    if target == NIL || arena.is_dead(target) {
                        report(out, arena.origin(e), SweepAnomaly::StaleHelper);
                    } else {
                        let (ep, _) = arena.insert_diagonal(e, target);
                        status[below].split = ep;
                    }
                    status.insert(ub, StatusEntry::open(e));
                }
            }
        }
    }
}

/// After removing a merge vertex's upper edge at `removed`, hand the merge
/// to the edge now exposed below it: either resolve that edge's own pending
/// merge immediately, or park this vertex as its new merge helper.
fn merge_into_below(
    arena: &mut EdgeArena,
    status: &mut Vec<StatusEntry>,
    removed: usize,
    e: EdgeId,
    stack: &mut Vec<ChainVertex>,
    out: &mut Triangulation,
) {
    if removed == 0 {
        report(out, arena.origin(e), SweepAnomaly::DanglingMerge);
        return;
    }
    let under = removed - 1;
    let prior = status[under].merge;
    if prior != NIL && !arena.is_dead(prior) {
        let (ep, _) = arena.insert_diagonal(e, prior);
        triangulate_monotone(arena, e, stack, &mut out.triangles);
        status[under].split = ep;
        status[under].merge = ep;
    } else {
        if prior != NIL {
            report(out, arena.origin(e), SweepAnomaly::StaleHelper);
        }
        status[under].split = e;
        status[under].merge = e;
    }
}

fn report(out: &mut Triangulation, vertex: Vec2, kind: SweepAnomaly) {
    tracing::warn!(?vertex, ?kind, "sweep anomaly; continuing");
    out.diagnostics.push(SweepDiagnostic { vertex, kind });
}
