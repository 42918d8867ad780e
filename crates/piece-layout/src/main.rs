use clap::{Parser, Subcommand};
use piece_layout::manifest::Manifest;
use piece_layout::{flip_manifest, load_manifest, EditorConfig};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "piece-layout", about = "Inspect and transform puzzle piece manifests")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List every piece with its position and transform
    Inspect {
        /// Manifest file (0_pieces.json)
        manifest: PathBuf,
    },
    /// Report duplicate filenames, half-set sentinels and non-finite values
    Check {
        manifest: PathBuf,
    },
    /// Mirror the placed pieces, as the editor's flip button does
    Flip {
        manifest: PathBuf,

        /// Width of the puzzle grid image in design pixels
        #[arg(long)]
        grid_width: f64,

        /// Gap added to the grid width to form the mirror line
        #[arg(long)]
        margin: Option<f64>,

        /// Pieces with y at or beyond this line are flipped
        #[arg(long)]
        threshold: Option<f64>,

        /// Output JSON file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },
}

fn inspect(manifest: &Manifest) {
    for p in &manifest.pieces {
        let state = if p.is_unplaced() { "unplaced" } else { "placed" };
        let transform = if p.has_identity_transform() {
            String::new()
        } else {
            format!(" scale ({}, {}) rot {}", p.scale_x(), p.scale_y(), p.rotation())
        };
        println!(
            "{:<24} {:<3} {:<16} {:<8} ({}, {}){}",
            p.filename, p.letter, p.username, state, p.x, p.y, transform
        );
    }
    println!(
        "{} pieces, {} placed",
        manifest.pieces.len(),
        manifest.placed_count()
    );
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    let config = EditorConfig::default();

    let path = match &cli.command {
        Command::Inspect { manifest } | Command::Check { manifest } | Command::Flip { manifest, .. } => {
            manifest
        }
    };
    let (raw, manifest) = match load_manifest(path) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    match cli.command {
        Command::Inspect { .. } => inspect(&manifest),
        Command::Check { .. } => {
            let issues = manifest.validate();
            for issue in &issues {
                println!("{issue}");
            }
            if !issues.is_empty() {
                eprintln!("{} problem(s) found", issues.len());
                std::process::exit(1);
            }
            eprintln!("{} pieces OK", manifest.pieces.len());
        }
        Command::Flip {
            grid_width,
            margin,
            threshold,
            output,
            pretty,
            ..
        } => {
            let margin = margin.unwrap_or(config.margin);
            let threshold = threshold.unwrap_or(config.export_below_y);
            let (doc, summary) = match flip_manifest(&raw, grid_width, margin, threshold) {
                Ok(r) => r,
                Err(e) => {
                    eprintln!("Error: {e}");
                    std::process::exit(1);
                }
            };
            for name in &summary.unmatched {
                log::warn!("{name} has no record to update");
            }
            let json = if pretty {
                serde_json::to_string_pretty(&doc)
            } else {
                serde_json::to_string(&doc)
            };
            let json = match json {
                Ok(j) => j,
                Err(e) => {
                    eprintln!("Error: {e}");
                    std::process::exit(1);
                }
            };
            if let Some(output_path) = output {
                if let Err(e) = std::fs::write(&output_path, &json) {
                    eprintln!("Error writing {}: {e}", output_path.display());
                    std::process::exit(1);
                }
                eprintln!("Written to {}", output_path.display());
            } else {
                println!("{json}");
            }
        }
    }
}
