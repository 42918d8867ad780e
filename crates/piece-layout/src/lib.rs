pub mod config;
pub mod error;
pub mod export;
pub mod flip;
pub mod geometry;
pub mod handle;
pub mod layout;
pub mod manifest;
pub mod overlay;
pub mod puzzle;
pub mod scale;
pub mod scene;
pub mod selection;
pub mod stage;

pub use config::EditorConfig;
pub use error::LayoutError;
pub use stage::Stage;

use export::ExportSummary;
use geometry::Point;
use manifest::Manifest;
use scale::StageScale;
use scene::Scene;
use serde_json::Value;
use std::path::Path;

/// Read a manifest from disk, keeping both the raw document and its typed form.
pub fn load_manifest(path: &Path) -> Result<(Value, Manifest), LayoutError> {
    let text = std::fs::read_to_string(path)?;
    let raw: Value = serde_json::from_str(&text)?;
    let manifest = Manifest::from_value(&raw)?;
    Ok((raw, manifest))
}

/// Flip every placed record of a manifest in design space, as the editor's
/// flip button would at scale 1, and return the exported document.
pub fn flip_manifest(
    raw: &Value,
    grid_width: f64,
    margin: f64,
    threshold: f64,
) -> Result<(Value, ExportSummary), LayoutError> {
    let manifest = Manifest::from_value(raw)?;
    let unit = StageScale {
        scale: 1.0,
        piece_scale: 1.0,
    };
    let mut scene = Scene::new();
    for record in manifest.pieces.iter().filter(|r| !r.is_unplaced()) {
        scene.insert(record, (0.0, 0.0), unit.piece_scale, Point::new(record.x, record.y));
    }
    let flipped = flip::flip_placed(&mut scene, threshold, flip::flip_pivot(grid_width, margin));
    log::info!("flipped {} of {} records", flipped.len(), manifest.pieces.len());
    export::export_manifest(raw, &scene, &unit, threshold)
}
