//! Board-specific tree utilities: tag classification and layer matching.
//!
//! The tree itself is format-agnostic; everything KiCad-shaped lives here.
//! Tags are pre-interned once into a [`Keywords`] table so per-node
//! classification is a single hash lookup on the symbol handle.

use glam::Vec2;
use rustc_hash::FxHashMap;

use crate::intern::{Interner, Symbol};
use crate::parser::node::Node;

/// Recognized form tags. Anything else is `Ignored`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeType {
    Ignored,
    KicadPcb,
    Net,
    GrLine,
    GrArc,
    GrCircle,
    GrText,
    Module,
    Segment,
    Via,
    Zone,
    At,
    Start,
    End,
    Center,
    Xy,
    Xyz,
    Size,
    RectDelta,
    Width,
    Thickness,
    MinThickness,
    Angle,
    Layer,
    Layers,
    Drill,
    Polygon,
    FilledPolygon,
    Effects,
    Font,
    Pad,
    FpLine,
    FpArc,
    FpCircle,
    FpText,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PadType {
    Unsupported,
    Smd,
    ThruHole,
    NpThruHole,
    Connect,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PadShape {
    Unsupported,
    Circle,
    Oval,
    Rect,
    Trapezoid,
}

/// Which side of the board a layer name refers to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Face {
    #[default]
    Any,
    Both,
    Front,
    Back,
}

/// Coarse layer family used for filtering.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayerClass {
    Any,
    Other,
    Copper,
    Silk,
    Fab,
    Courtyard,
    EdgeCuts,
}

/// Commonly looked-up tag symbols, pre-interned.
pub struct Tags {
    pub at: Symbol,
    pub start: Symbol,
    pub end: Symbol,
    pub center: Symbol,
    pub angle: Symbol,
    pub width: Symbol,
    pub size: Symbol,
    pub rect_delta: Symbol,
    pub drill: Symbol,
    pub net: Symbol,
    pub pts: Symbol,
    pub xy: Symbol,
    pub min_thickness: Symbol,
    pub filled_polygon: Symbol,
    pub general: Symbol,
    pub area: Symbol,
    pub layer: Symbol,
    pub layers: Symbol,
    pub oval: Symbol,
}

/// Symbol-keyed keyword tables for a single document's interner.
pub struct Keywords {
    nodes: FxHashMap<Symbol, NodeType>,
    pad_types: FxHashMap<Symbol, PadType>,
    pad_shapes: FxHashMap<Symbol, PadShape>,
    layers: FxHashMap<Symbol, LayerClass>,
    pub tags: Tags,
}

impl Keywords {
    pub fn new(interner: &mut Interner) -> Self {
        let mut nodes = FxHashMap::default();
        for (word, ty) in [
            ("kicad_pcb", NodeType::KicadPcb),
            ("net", NodeType::Net),
            ("gr_line", NodeType::GrLine),
            ("gr_arc", NodeType::GrArc),
            ("gr_circle", NodeType::GrCircle),
            ("gr_text", NodeType::GrText),
            ("module", NodeType::Module),
            ("segment", NodeType::Segment),
            ("via", NodeType::Via),
            ("zone", NodeType::Zone),
            ("at", NodeType::At),
            ("start", NodeType::Start),
            ("end", NodeType::End),
            ("center", NodeType::Center),
            ("xy", NodeType::Xy),
            ("xyz", NodeType::Xyz),
            ("size", NodeType::Size),
            ("rect_delta", NodeType::RectDelta),
            ("width", NodeType::Width),
            ("thickness", NodeType::Thickness),
            ("min_thickness", NodeType::MinThickness),
            ("angle", NodeType::Angle),
            ("layer", NodeType::Layer),
            ("layers", NodeType::Layers),
            ("drill", NodeType::Drill),
            ("polygon", NodeType::Polygon),
            ("filled_polygon", NodeType::FilledPolygon),
            ("effects", NodeType::Effects),
            ("font", NodeType::Font),
            ("pad", NodeType::Pad),
            ("fp_line", NodeType::FpLine),
            ("fp_arc", NodeType::FpArc),
            ("fp_circle", NodeType::FpCircle),
            ("fp_text", NodeType::FpText),
        ] {
            nodes.insert(interner.intern(word), ty);
        }

        let mut pad_types = FxHashMap::default();
        for (word, ty) in [
            ("smd", PadType::Smd),
            ("thru_hole", PadType::ThruHole),
            ("np_thru_hole", PadType::NpThruHole),
            ("connect", PadType::Connect),
        ] {
            pad_types.insert(interner.intern(word), ty);
        }

        let mut pad_shapes = FxHashMap::default();
        for (word, shape) in [
            ("circle", PadShape::Circle),
            ("oval", PadShape::Oval),
            ("rect", PadShape::Rect),
            ("trapezoid", PadShape::Trapezoid),
        ] {
            pad_shapes.insert(interner.intern(word), shape);
        }

        let mut layers = FxHashMap::default();
        for (word, class) in [
            ("F.Cu", LayerClass::Copper),
            ("B.Cu", LayerClass::Copper),
            ("*.Cu", LayerClass::Copper),
            ("F.SilkS", LayerClass::Silk),
            ("B.SilkS", LayerClass::Silk),
            ("*.SilkS", LayerClass::Silk),
            ("F.Fab", LayerClass::Fab),
            ("B.Fab", LayerClass::Fab),
            ("*.Fab", LayerClass::Fab),
            ("F.CrtYd", LayerClass::Courtyard),
            ("B.CrtYd", LayerClass::Courtyard),
            ("*.CrtYd", LayerClass::Courtyard),
            ("Edge.Cuts", LayerClass::EdgeCuts),
        ] {
            layers.insert(interner.intern(word), class);
        }

        let tags = Tags {
            at: interner.intern("at"),
            start: interner.intern("start"),
            end: interner.intern("end"),
            center: interner.intern("center"),
            angle: interner.intern("angle"),
            width: interner.intern("width"),
            size: interner.intern("size"),
            rect_delta: interner.intern("rect_delta"),
            drill: interner.intern("drill"),
            net: interner.intern("net"),
            pts: interner.intern("pts"),
            xy: interner.intern("xy"),
            min_thickness: interner.intern("min_thickness"),
            filled_polygon: interner.intern("filled_polygon"),
            general: interner.intern("general"),
            area: interner.intern("area"),
            layer: interner.intern("layer"),
            layers: interner.intern("layers"),
            oval: interner.intern("oval"),
        };

        Self {
            nodes,
            pad_types,
            pad_shapes,
            layers,
            tags,
        }
    }

    /// Classifies a form by its head symbol.
    pub fn node_type(&self, node: &Node) -> NodeType {
        node.head()
            .and_then(|sym| self.nodes.get(&sym).copied())
            .unwrap_or(NodeType::Ignored)
    }

    pub fn pad_type(&self, sym: Symbol) -> PadType {
        self.pad_types.get(&sym).copied().unwrap_or(PadType::Unsupported)
    }

    pub fn pad_shape(&self, sym: Symbol) -> PadShape {
        self.pad_shapes
            .get(&sym)
            .copied()
            .unwrap_or(PadShape::Unsupported)
    }

    fn layer_class(&self, sym: Symbol) -> LayerClass {
        self.layers.get(&sym).copied().unwrap_or(LayerClass::Other)
    }
}

fn face_of(text: &str) -> Face {
    let bytes = text.as_bytes();
    if bytes.len() >= 3 && bytes[1] == b'.' {
        match bytes[0] {
            b'F' | b'f' => return Face::Front,
            b'B' | b'b' => return Face::Back,
            _ => {}
        }
    }
    Face::Both
}

fn check_face(text: &str, face: Face) -> bool {
    let f = face_of(text);
    face == f || face == Face::Any || f == Face::Both
}

fn check_layer_name(
    sym: Symbol,
    interner: &Interner,
    kw: &Keywords,
    face: Face,
    class: LayerClass,
) -> bool {
    if !check_face(interner.resolve(sym), face) {
        return false;
    }
    class == LayerClass::Any || class == kw.layer_class(sym)
}

/// True when the entity carries a `(layer ...)` or `(layers ...)` child that
/// matches the requested face and layer class. Children are scanned in
/// reverse; the last layer annotation wins.
pub fn check_layer(
    node: &Node,
    interner: &Interner,
    kw: &Keywords,
    face: Face,
    class: LayerClass,
) -> bool {
    if node.is_empty() {
        return false;
    }

    for child in node.children().iter().rev() {
        if child.len() < 2 {
            continue;
        }
        let Some(head) = child.head() else { continue };
        if head == kw.tags.layer {
            return child
                .get(1)
                .and_then(Node::as_symbol)
                .map(|sym| check_layer_name(sym, interner, kw, face, class))
                .unwrap_or(false);
        } else if head == kw.tags.layers {
            for entry in &child.children()[1..] {
                if let Some(sym) = entry.as_symbol() {
                    if check_layer_name(sym, interner, kw, face, class) {
                        return true;
                    }
                }
            }
        }
    }

    false
}

/// Reads a `(tag x y ...)` child as a point.
pub fn child_point(node: &Node, tag: Symbol) -> Option<Vec2> {
    let child = node.find(tag)?;
    Some(Vec2::new(
        child.number_at(1)? as f32,
        child.number_at(2)? as f32,
    ))
}

/// Reads a `(tag value ...)` child as a scalar.
pub fn child_scalar(node: &Node, tag: Symbol) -> Option<f32> {
    Some(node.find(tag)?.number_at(1)? as f32)
}

/// Bounding rectangle from the board's `(general (area x0 y0 x1 y1))` form.
pub fn board_area(pcb: &Node, kw: &Keywords) -> Option<(Vec2, Vec2)> {
    let general = pcb.find(kw.tags.general)?;
    let area = general.find(kw.tags.area)?;
    if area.len() < 5 {
        return None;
    }
    let a = Vec2::new(area.number_at(1)? as f32, area.number_at(2)? as f32);
    let b = Vec2::new(area.number_at(3)? as f32, area.number_at(4)? as f32);
    Some((a.min(b), a.max(b)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_document;

    #[test]
    fn classifies_forms_by_head() {
        let mut doc = parse_document("(segment (start 0 0)) (frob 1) ()");
        let kw = Keywords::new(&mut doc.interner);
        let top = doc.root.children();
        assert_eq!(kw.node_type(&top[0]), NodeType::Segment);
        assert_eq!(kw.node_type(&top[1]), NodeType::Ignored);
        assert_eq!(kw.node_type(&top[2]), NodeType::Ignored);
    }

    #[test]
    fn layer_matching_honors_face_prefixes() {
        let mut doc = parse_document(
            "(gr_line (layer F.SilkS)) (segment (layer B.Cu)) (via (layers *.Cu))",
        );
        let kw = Keywords::new(&mut doc.interner);
        let top = doc.root.children();

        let silk = &top[0];
        assert!(check_layer(silk, &doc.interner, &kw, Face::Front, LayerClass::Silk));
        assert!(check_layer(silk, &doc.interner, &kw, Face::Any, LayerClass::Any));
        assert!(!check_layer(silk, &doc.interner, &kw, Face::Back, LayerClass::Silk));
        assert!(!check_layer(silk, &doc.interner, &kw, Face::Front, LayerClass::Copper));

        let seg = &top[1];
        assert!(check_layer(seg, &doc.interner, &kw, Face::Back, LayerClass::Copper));
        assert!(!check_layer(seg, &doc.interner, &kw, Face::Front, LayerClass::Copper));

        // *.Cu spans both faces
        let via = &top[2];
        assert!(check_layer(via, &doc.interner, &kw, Face::Front, LayerClass::Copper));
        assert!(check_layer(via, &doc.interner, &kw, Face::Back, LayerClass::Copper));
    }

    #[test]
    fn unknown_layer_names_fall_back_to_other() {
        let mut doc = parse_document("(gr_text (layer Dwgs.User))");
        let kw = Keywords::new(&mut doc.interner);
        let node = &doc.root.children()[0];
        assert!(!check_layer(node, &doc.interner, &kw, Face::Any, LayerClass::Silk));
        assert!(check_layer(node, &doc.interner, &kw, Face::Any, LayerClass::Any));
    }

    #[test]
    fn point_and_scalar_extraction() {
        let mut doc = parse_document("(via (at 1.5 -2.5) (size 0.8))");
        let kw = Keywords::new(&mut doc.interner);
        let via = &doc.root.children()[0];
        assert_eq!(child_point(via, kw.tags.at), Some(Vec2::new(1.5, -2.5)));
        assert_eq!(child_scalar(via, kw.tags.size), Some(0.8));
        assert_eq!(child_point(via, kw.tags.start), None);
    }

    #[test]
    fn board_area_normalizes_corners() {
        let mut doc =
            parse_document("(kicad_pcb (general (area 120.5 40.0 80.0 90.0)))");
        let kw = Keywords::new(&mut doc.interner);
        let pcb = &doc.root.children()[0];
        let (min, max) = board_area(pcb, &kw).unwrap();
        assert_eq!(min, Vec2::new(80.0, 40.0));
        assert_eq!(max, Vec2::new(120.5, 90.0));
    }
}
