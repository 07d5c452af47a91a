pub mod node;
pub mod pcb;
pub mod sexp;

pub use node::{Document, Node};
pub use pcb::{check_layer, Face, Keywords, LayerClass, NodeType, PadShape, PadType};
pub use sexp::parse;

use crate::intern::Interner;

/// Parses `text` with a fresh interner.
pub fn parse_document(text: &str) -> Document {
    let mut interner = Interner::new();
    let root = parse(text, &mut interner);
    Document { interner, root }
}
