//! boardview CLI - board inspection and mesh extraction from the command line.

use boardview::parser::pcb::{Face, LayerClass};
use boardview::{
    load_board, Board, CopperFilter, HoleFilter, LayerMesh, MeshStats, ModuleFilter,
    StandardFilter, TessellationConfig,
};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "boardview")]
#[command(about = "KiCad PCB board inspection and triangle mesh extraction", long_about = None)]
#[command(version)]
struct Cli {
    /// Verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print entity counts and the board area
    Info {
        /// Path to a .kicad_pcb file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,
    },

    /// Tessellate one layer into triangles and report the result
    Mesh {
        /// Path to a .kicad_pcb file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Which entities to tessellate
        #[arg(short, long, value_enum, default_value = "copper")]
        layer: LayerChoice,

        /// Board face to match
        #[arg(long, value_enum, default_value = "any")]
        face: FaceChoice,

        /// Leave copper zones out of the mesh
        #[arg(long)]
        skip_zones: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,

        /// Embed the full triangle list in JSON output
        #[arg(long)]
        triangles: bool,

        /// Segments per circle for arcs and circles
        #[arg(long)]
        arc_segments: Option<u32>,

        /// Segments per circle for pads, vias and drills
        #[arg(long)]
        pad_segments: Option<u32>,

        /// Segments per circle for line endcaps
        #[arg(long)]
        endcap_segments: Option<u32>,

        /// Segments per circle for zone perimeter strokes (0 disables)
        #[arg(long)]
        zone_segments: Option<u32>,
    },

    /// Re-emit the parsed tree in canonical form
    Dump {
        /// Path to any S-expression file
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output for tooling
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum LayerChoice {
    /// Copper: segments, vias, pads and zones
    Copper,
    /// Silkscreen graphics
    Silk,
    /// Fabrication layer graphics
    Fab,
    /// Courtyard outlines
    Courtyard,
    /// Board outline
    EdgeCuts,
    /// Drill holes
    Holes,
    /// Module pads only
    Pads,
    /// Everything with a matching layer annotation
    Any,
}

#[derive(Clone, Copy, ValueEnum)]
enum FaceChoice {
    Front,
    Back,
    Any,
}

impl From<FaceChoice> for Face {
    fn from(choice: FaceChoice) -> Self {
        match choice {
            FaceChoice::Front => Face::Front,
            FaceChoice::Back => Face::Back,
            FaceChoice::Any => Face::Any,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let exit_code = match cli.command {
        Commands::Info { file, format } => handle_info(&file, format),
        Commands::Mesh {
            file,
            layer,
            face,
            skip_zones,
            format,
            triangles,
            arc_segments,
            pad_segments,
            endcap_segments,
            zone_segments,
        } => {
            let mut config = TessellationConfig::default();
            if let Some(n) = arc_segments {
                config.arc_segments = n;
            }
            if let Some(n) = pad_segments {
                config.pad_segments = n;
            }
            if let Some(n) = endcap_segments {
                config.endcap_segments = n;
            }
            if let Some(n) = zone_segments {
                config.zone_segments = n;
            }
            handle_mesh(&file, layer, face.into(), skip_zones, format, triangles, &config)
        }
        Commands::Dump { file } => handle_dump(&file),
    };

    process::exit(exit_code);
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "boardview=debug" } else { "boardview=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn handle_info(file: &PathBuf, format: OutputFormat) -> i32 {
    let board = match load_board(file) {
        Ok(board) => board,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    let summary = match board.summary() {
        Ok(summary) => summary,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    match format {
        OutputFormat::Human => {
            println!("File: {}", file.display());
            println!("  Nets:     {}", summary.nets);
            println!("  Modules:  {}", summary.modules);
            println!("  Segments: {}", summary.segments);
            println!("  Vias:     {}", summary.vias);
            println!("  Zones:    {}", summary.zones);
            println!("  Graphics: {}", summary.graphics);
            if let Some([x0, y0, x1, y1]) = summary.area {
                println!("  Area:     {} x {} mm", x1 - x0, y1 - y0);
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "file": file.display().to_string(),
                "summary": summary,
            });
            println!("{}", serde_json::to_string_pretty(&output).unwrap());
        }
    }
    0
}

#[allow(clippy::too_many_arguments)]
fn handle_mesh(
    file: &PathBuf,
    layer: LayerChoice,
    face: Face,
    skip_zones: bool,
    format: OutputFormat,
    triangles: bool,
    config: &TessellationConfig,
) -> i32 {
    let board = match load_board(file) {
        Ok(board) => board,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    let mesh = extract(&board, layer, face, skip_zones, config);
    let stats = MeshStats::from(&mesh);

    match format {
        OutputFormat::Human => {
            println!("File: {}", file.display());
            println!("  Triangles: {}", stats.triangles);
            println!("  Area:      {:.4} mm^2", stats.area);
            if stats.anomalies > 0 {
                println!("  Anomalies: {} (mesh may be incomplete)", stats.anomalies);
            }
        }
        OutputFormat::Json => {
            let mut output = serde_json::json!({
                "file": file.display().to_string(),
                "stats": stats,
            });
            if triangles {
                let list: Vec<_> = mesh
                    .triangles
                    .iter()
                    .map(|t| {
                        t.v.iter()
                            .map(|v| serde_json::json!([v.x, v.y]))
                            .collect::<Vec<_>>()
                    })
                    .collect();
                output["triangles"] = serde_json::json!(list);
            }
            println!("{}", serde_json::to_string_pretty(&output).unwrap());
        }
    }
    0
}

fn extract(
    board: &Board,
    layer: LayerChoice,
    face: Face,
    skip_zones: bool,
    config: &TessellationConfig,
) -> LayerMesh {
    match layer {
        LayerChoice::Copper => board.extract_layer(
            &CopperFilter {
                face,
                skip_zones,
                ..Default::default()
            },
            config,
        ),
        LayerChoice::Silk => board.extract_layer(
            &StandardFilter {
                face,
                class: LayerClass::Silk,
            },
            config,
        ),
        LayerChoice::Fab => board.extract_layer(
            &StandardFilter {
                face,
                class: LayerClass::Fab,
            },
            config,
        ),
        LayerChoice::Courtyard => board.extract_layer(
            &StandardFilter {
                face,
                class: LayerClass::Courtyard,
            },
            config,
        ),
        LayerChoice::EdgeCuts => board.extract_layer(
            &StandardFilter {
                face,
                class: LayerClass::EdgeCuts,
            },
            config,
        ),
        LayerChoice::Holes => board.extract_layer(&HoleFilter, config),
        LayerChoice::Pads => board.extract_layer(
            &ModuleFilter {
                face,
                include_court: false,
            },
            config,
        ),
        LayerChoice::Any => board.extract_layer(
            &StandardFilter {
                face,
                class: LayerClass::Any,
            },
            config,
        ),
    }
}

fn handle_dump(file: &PathBuf) -> i32 {
    let board = match load_board(file) {
        Ok(board) => board,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    println!("{}", board.document().display());
    0
}
