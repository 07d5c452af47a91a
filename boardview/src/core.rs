//! Top-level board API shared by library consumers and the CLI shell.

use std::path::Path;

use serde::Serialize;

use crate::geometry::TessellationConfig;
use crate::parser::node::{Document, Node};
use crate::parser::pcb::{board_area, Keywords, NodeType};
use crate::parser::parse_document;
use crate::render::{extract_layer, LayerFilter, LayerMesh, RenderContext};

#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("not a KiCad board: no kicad_pcb form found")]
    NotABoard,
}

/// A parsed board file. Parsing never fails; a file without a
/// `(kicad_pcb ...)` form simply yields an empty board.
pub struct Board {
    doc: Document,
    keywords: Keywords,
}

/// Reads and parses a board file. Only I/O can fail; malformed content
/// degrades per the reader's rules.
pub fn load_board(path: &Path) -> Result<Board, BoardError> {
    let bytes = std::fs::read(path)?;
    Ok(Board::from_text(&String::from_utf8_lossy(&bytes)))
}

impl Board {
    pub fn from_text(text: &str) -> Self {
        let mut doc = parse_document(text);
        let keywords = Keywords::new(&mut doc.interner);
        Self { doc, keywords }
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn keywords(&self) -> &Keywords {
        &self.keywords
    }

    /// The `(kicad_pcb ...)` form, if the file has one.
    pub fn pcb(&self) -> Option<&Node> {
        let sym = self.doc.interner.get("kicad_pcb")?;
        self.doc.root.find(sym)
    }

    /// Entity counts and board area, for the CLI's `info` output.
    pub fn summary(&self) -> Result<BoardSummary, BoardError> {
        let pcb = self.pcb().ok_or(BoardError::NotABoard)?;
        let mut summary = BoardSummary::default();
        for child in pcb.children() {
            match self.keywords.node_type(child) {
                NodeType::Net => summary.nets += 1,
                NodeType::Module => summary.modules += 1,
                NodeType::Segment => summary.segments += 1,
                NodeType::Via => summary.vias += 1,
                NodeType::Zone => summary.zones += 1,
                NodeType::GrLine | NodeType::GrArc | NodeType::GrCircle | NodeType::GrText => {
                    summary.graphics += 1
                }
                _ => {}
            }
        }
        summary.area = board_area(pcb, &self.keywords).map(|(min, max)| [min.x, min.y, max.x, max.y]);
        Ok(summary)
    }

    /// Tessellates every entity the filter admits into flat triangles.
    pub fn extract_layer<F: LayerFilter>(
        &self,
        filter: &F,
        config: &TessellationConfig,
    ) -> LayerMesh {
        let ctx = RenderContext {
            interner: &self.doc.interner,
            keywords: &self.keywords,
        };
        extract_layer(&ctx, &self.doc.root, filter, config)
    }
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct BoardSummary {
    pub nets: usize,
    pub modules: usize,
    pub segments: usize,
    pub vias: usize,
    pub zones: usize,
    pub graphics: usize,
    /// `[min_x, min_y, max_x, max_y]` from the board's general area.
    pub area: Option<[f32; 4]>,
}

/// Flat numbers about a produced mesh, for machine output.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct MeshStats {
    pub triangles: usize,
    pub area: f32,
    pub anomalies: usize,
}

impl From<&LayerMesh> for MeshStats {
    fn from(mesh: &LayerMesh) -> Self {
        Self {
            triangles: mesh.triangles.len(),
            area: mesh.area(),
            anomalies: mesh.diagnostics.len(),
        }
    }
}
