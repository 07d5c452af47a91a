//! boardview - KiCad PCB viewer core
//!
//! This library is the algorithmic half of a board viewer: it parses
//! `.kicad_pcb` S-expression files into a symbol-interned tree and turns
//! board entities into flat triangle meshes via a plane-sweep polygon
//! triangulator. Drawing those triangles is the shell's job; nothing here
//! touches a GPU, a window, or the network.
//!
//! # Quick Start
//!
//! ```no_run
//! use boardview::{load_board, StandardFilter, TessellationConfig};
//! use boardview::parser::pcb::{Face, LayerClass};
//! use std::path::Path;
//!
//! let board = load_board(Path::new("design.kicad_pcb")).unwrap();
//! let filter = StandardFilter { face: Face::Front, class: LayerClass::Silk };
//! let mesh = board.extract_layer(&filter, &TessellationConfig::default());
//! println!("{} triangles", mesh.triangles.len());
//! ```
//!
//! # Structure
//!
//! - **Parsing**: an infallible streaming S-expression reader; malformed
//!   input degrades to symbol tokens instead of erroring
//! - **Triangulation**: one left-to-right sweep that monotonizes and
//!   triangulates simultaneously, tolerating the pinched outlines that
//!   zone fills produce
//! - **Layer extraction**: filtered tessellation of segments, arcs,
//!   circles, pads, vias, drills and zones into triangle lists

pub mod core;
pub mod geometry;
pub mod intern;
pub mod parser;
pub mod render;

// Re-export main types
pub use crate::core::{load_board, Board, BoardError, BoardSummary, MeshStats};
pub use crate::geometry::{
    triangulate_polygon, TessellationConfig, Triangle, Triangulation,
};
pub use crate::intern::{Interner, Symbol};
pub use crate::parser::{parse_document, Document, Node};
pub use crate::render::{
    CopperFilter, HoleFilter, LayerFilter, LayerMesh, ModuleFilter, StandardFilter,
};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::core::{load_board, Board, BoardError, BoardSummary, MeshStats};
    pub use crate::geometry::{triangulate_polygon, TessellationConfig, Triangle};
    pub use crate::parser::pcb::{Face, LayerClass};
    pub use crate::render::{
        CopperFilter, HoleFilter, LayerFilter, LayerMesh, ModuleFilter, StandardFilter,
    };
}
