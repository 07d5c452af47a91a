//! Layer extraction against a small fixture board.

use std::path::PathBuf;

use boardview::parser::pcb::{Face, LayerClass};
use boardview::{
    load_board, Board, CopperFilter, HoleFilter, ModuleFilter, StandardFilter, TessellationConfig,
};
use rustc_hash::FxHashSet;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn fixture_board() -> Board {
    load_board(&fixture_path("simple.kicad_pcb")).expect("fixture should load")
}

#[test]
fn summary_matches_fixture() {
    let board = fixture_board();
    let summary = board.summary().unwrap();
    assert_eq!(summary.nets, 3);
    assert_eq!(summary.modules, 1);
    assert_eq!(summary.segments, 2);
    assert_eq!(summary.vias, 1);
    assert_eq!(summary.zones, 1);
    assert_eq!(summary.graphics, 2);
    assert_eq!(summary.area, Some([100.0, 100.0, 120.0, 115.0]));
}

#[test]
fn edge_cuts_layer_is_one_stroked_line() {
    let board = fixture_board();
    let filter = StandardFilter {
        face: Face::Any,
        class: LayerClass::EdgeCuts,
    };
    let mesh = board.extract_layer(&filter, &TessellationConfig::default());
    assert!(mesh.diagnostics.is_empty());
    assert!(!mesh.triangles.is_empty());
    // a 20mm x 0.1mm stroke plus round endcaps
    assert!((mesh.area() - 2.0).abs() < 0.05, "area {}", mesh.area());
}

#[test]
fn front_copper_includes_zone_fill() {
    let board = fixture_board();
    let with_zones = board.extract_layer(
        &CopperFilter {
            face: Face::Front,
            ..Default::default()
        },
        &TessellationConfig::default(),
    );
    let without_zones = board.extract_layer(
        &CopperFilter {
            face: Face::Front,
            skip_zones: true,
            ..Default::default()
        },
        &TessellationConfig::default(),
    );
    assert!(with_zones.diagnostics.is_empty());
    // the L-shaped filled_polygon alone covers 15 units
    assert!(with_zones.area() > without_zones.area() + 15.0);
    // front copper must not include the B.Cu segment: the remaining area is
    // one 4x0.5 segment, one via annulus and two 0.7x1.3 pads
    assert!(without_zones.area() < 6.0, "area {}", without_zones.area());
    assert!(without_zones.area() > 3.5, "area {}", without_zones.area());
}

#[test]
fn back_copper_sees_through_layer_lists() {
    let board = fixture_board();
    let mesh = board.extract_layer(
        &CopperFilter {
            face: Face::Back,
            ..Default::default()
        },
        &TessellationConfig::default(),
    );
    // the B.Cu segment plus the via, whose (layers F.Cu B.Cu) spans faces
    assert!(mesh.area() > 1.0, "area {}", mesh.area());
    assert!(mesh.area() < 2.5, "area {}", mesh.area());
}

#[test]
fn net_filtering_prunes_entities() {
    let board = fixture_board();
    let gnd: FxHashSet<u32> = [1].into_iter().collect();
    let vcc: FxHashSet<u32> = [2].into_iter().collect();

    let gnd_mesh = board.extract_layer(
        &CopperFilter {
            face: Face::Any,
            include_nets: Some(gnd.clone()),
            ..Default::default()
        },
        &TessellationConfig::default(),
    );
    let vcc_mesh = board.extract_layer(
        &CopperFilter {
            face: Face::Any,
            include_nets: Some(vcc),
            ..Default::default()
        },
        &TessellationConfig::default(),
    );
    // GND owns the zone; VCC only a thin segment, a via and one pad
    assert!(gnd_mesh.area() > 15.0);
    assert!(vcc_mesh.area() < 4.0);

    let skipped = board.extract_layer(
        &CopperFilter {
            face: Face::Any,
            skip_nets: Some(gnd),
            ..Default::default()
        },
        &TessellationConfig::default(),
    );
    assert!((skipped.area() - vcc_mesh.area()).abs() < 1e-3);
}

#[test]
fn module_pads_are_exact_rectangles() {
    let board = fixture_board();
    let mesh = board.extract_layer(
        &ModuleFilter {
            face: Face::Front,
            include_court: false,
        },
        &TessellationConfig::default(),
    );
    // two rect pads, two triangles each; rotation preserves area
    assert_eq!(mesh.triangles.len(), 4);
    assert!((mesh.area() - 2.0 * 0.7 * 1.3).abs() < 1e-4, "area {}", mesh.area());

    // pads are placed relative to the rotated module at (110, 105)
    for tri in &mesh.triangles {
        for v in tri.v {
            assert!((v.x - 110.0).abs() < 2.0 && (v.y - 105.0).abs() < 2.0);
        }
    }
}

#[test]
fn hole_layer_is_the_via_drill() {
    let board = fixture_board();
    let mesh = board.extract_layer(&HoleFilter, &TessellationConfig::default());
    assert!(!mesh.triangles.is_empty());
    // one 0.4mm drill
    let expected = std::f32::consts::PI * 0.2 * 0.2;
    assert!((mesh.area() - expected).abs() < 0.01, "area {}", mesh.area());
    // the drill is centred on the via
    for tri in &mesh.triangles {
        for v in tri.v {
            assert!((v.x - 104.0).abs() < 0.3 && (v.y - 106.0).abs() < 0.3);
        }
    }
}

#[test]
fn silk_layer_collects_module_and_free_graphics() {
    let board = fixture_board();
    let mesh = board.extract_layer(
        &StandardFilter {
            face: Face::Front,
            class: LayerClass::Silk,
        },
        &TessellationConfig::default(),
    );
    // the fp_line inside the module and the free gr_circle
    assert!(!mesh.triangles.is_empty());
    let has_near_module = mesh
        .triangles
        .iter()
        .any(|t| t.v.iter().all(|v| (v.x - 110.0).abs() < 3.0));
    let has_near_circle = mesh
        .triangles
        .iter()
        .any(|t| t.v.iter().all(|v| (v.x - 115.0).abs() < 2.0 && (v.y - 110.0).abs() < 2.0));
    assert!(has_near_module);
    assert!(has_near_circle);
}

#[test]
fn closure_filters_work_without_context() {
    let board = fixture_board();
    let nothing = board.extract_layer(
        &|_: &boardview::Node, _: &[&boardview::Node]| (false, true),
        &TessellationConfig::default(),
    );
    assert!(nothing.triangles.is_empty());

    let pruned = board.extract_layer(
        &|_: &boardview::Node, _: &[&boardview::Node]| (false, false),
        &TessellationConfig::default(),
    );
    assert!(pruned.triangles.is_empty());
}

#[test]
fn tessellation_config_scales_triangle_counts() {
    let board = fixture_board();
    let coarse = board.extract_layer(
        &HoleFilter,
        &TessellationConfig {
            pad_segments: 8,
            ..Default::default()
        },
    );
    let fine = board.extract_layer(
        &HoleFilter,
        &TessellationConfig {
            pad_segments: 64,
            ..Default::default()
        },
    );
    assert!(fine.triangles.len() > coarse.triangles.len());
}

#[test]
fn zone_perimeter_strokes_can_be_disabled() {
    let board = fixture_board();
    let with_stroke = board.extract_layer(
        &CopperFilter {
            face: Face::Front,
            ..Default::default()
        },
        &TessellationConfig::default(),
    );
    let without_stroke = board.extract_layer(
        &CopperFilter {
            face: Face::Front,
            ..Default::default()
        },
        &TessellationConfig {
            zone_segments: 0,
            ..Default::default()
        },
    );
    assert!(with_stroke.area() > without_stroke.area());
}

#[test]
fn missing_file_is_an_io_error() {
    let err = load_board(&fixture_path("does_not_exist.kicad_pcb")).err();
    assert!(matches!(err, Some(boardview::BoardError::Io(_))));
}
