use serde_json::Value;

use crate::error::LayoutError;
use crate::manifest::{json_number, round_f64};
use crate::scale::StageScale;
use crate::scene::Scene;

/// Decimal places kept for scale and rotation.
const TRANSFORM_PLACES: u32 = 3;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub updated: usize,
    /// Placed pieces with no matching record in the original manifest.
    pub unmatched: Vec<String>,
}

/// Download name for the exported manifest of `puzzle`.
pub fn export_filename(puzzle: &str) -> String {
    format!("0_pieces_{puzzle}.json")
}

/// Write the current transform of every piece at or below `threshold` into
/// a copy of `original`, matched by filename. Records of pieces above the
/// line, and keys this editor doesn't manage, are left as they were.
pub fn export_manifest(
    original: &Value,
    scene: &Scene,
    scale: &StageScale,
    threshold: f64,
) -> Result<(Value, ExportSummary), LayoutError> {
    let mut doc = original.clone();
    let records = doc
        .as_object_mut()
        .ok_or(LayoutError::NotAnObject)?
        .get_mut("pieces")
        .and_then(Value::as_array_mut)
        .ok_or_else(|| LayoutError::InvalidManifest("missing \"pieces\" array".to_string()))?;

    let mut summary = ExportSummary::default();
    for piece in scene.iter() {
        let t = &piece.transform;
        if t.y < threshold {
            continue;
        }
        let record = records.iter_mut().find_map(|r| {
            let obj = r.as_object_mut()?;
            (obj.get("filename").and_then(Value::as_str) == Some(piece.filename.as_str()))
                .then_some(obj)
        });
        let Some(record) = record else {
            log::warn!("export: {} not found in original manifest", piece.filename);
            summary.unmatched.push(piece.filename.clone());
            continue;
        };
        record.insert("x".to_string(), Value::from(scale.to_design_int(t.x)));
        record.insert("y".to_string(), Value::from(scale.to_design_int(t.y)));
        record.insert(
            "scaleX".to_string(),
            json_number(round_f64(t.scale_x, TRANSFORM_PLACES)),
        );
        record.insert(
            "scaleY".to_string(),
            json_number(round_f64(t.scale_y, TRANSFORM_PLACES)),
        );
        record.insert(
            "rotation".to_string(),
            json_number(round_f64(t.rotation, TRANSFORM_PLACES)),
        );
        summary.updated += 1;
    }
    log::info!(
        "export: updated {} records, {} unmatched",
        summary.updated,
        summary.unmatched.len()
    );
    Ok((doc, summary))
}

/// Export and serialize with two-space indentation.
pub fn export_json(
    original: &Value,
    scene: &Scene,
    scale: &StageScale,
    threshold: f64,
) -> Result<String, LayoutError> {
    let (doc, _) = export_manifest(original, scene, scale, threshold)?;
    Ok(serde_json::to_string_pretty(&doc)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditorConfig;
    use crate::geometry::Point;
    use crate::layout::{initial_position, FlowLayout};
    use crate::manifest::Manifest;
    use crate::scene::PieceId;
    use serde_json::json;

    fn load(original: &Value, scale: &StageScale) -> Scene {
        let config = EditorConfig::default();
        let manifest = Manifest::from_value(original).unwrap();
        let mut flow = FlowLayout::new(1024.0 * scale.scale, scale, &config);
        let mut scene = Scene::new();
        for record in &manifest.pieces {
            let width = 90.0 * scale.piece_scale;
            let pos = initial_position(record, width, scale, &mut flow);
            scene.insert(record, (90.0, 90.0), scale.piece_scale, pos);
        }
        scene
    }

    #[test]
    fn test_unedited_export_is_unchanged() {
        let original = json!({"pieces": [{
            "filename": "a.png", "x": 10, "y": 20, "letter": "A", "username": "bob",
            "scaleX": 1, "scaleY": 1, "rotation": 0
        }]});
        let scale = StageScale::new(512.0, 384.0, &EditorConfig::default());
        let scene = load(&original, &scale);
        assert_eq!(scene.get(PieceId(0)).unwrap().transform.position(), Point::new(5.0, 10.0));
        let (doc, summary) = export_manifest(&original, &scene, &scale, 0.0).unwrap();
        assert_eq!(summary.updated, 1);
        assert_eq!(doc, original);
    }

    #[test]
    fn test_only_placed_records_change() {
        let original = json!({"pieces": [
            {"filename": "tray.png", "x": -1, "y": -1, "letter": "T", "username": "u"},
            {"filename": "a.png", "x": 400, "y": 500, "letter": "A", "username": "v", "note": "keep"}
        ], "title": "red"});
        let scale = StageScale::new(1024.0, 768.0, &EditorConfig::default());
        let mut scene = load(&original, &scale);
        let a = scene.get_mut(PieceId(1)).unwrap();
        a.transform.x += 7.4;
        a.transform.scale_x = 1.23456;
        a.transform.scale_y = 0.99999;
        a.transform.rotation = -0.0001;
        let (doc, summary) = export_manifest(&original, &scene, &scale, 150.0).unwrap();
        assert_eq!(summary.updated, 1);
        assert_eq!(doc["pieces"][0], original["pieces"][0]);
        assert_eq!(doc["title"], "red");
        let a = &doc["pieces"][1];
        assert_eq!(a["x"], 407);
        assert_eq!(a["y"], 500);
        assert_eq!(a["scaleX"], json!(1.235));
        assert_eq!(a["scaleY"], json!(1));
        assert_eq!(a["rotation"], json!(0));
        assert_eq!(a["note"], "keep");
        let text = export_json(&original, &scene, &scale, 150.0).unwrap();
        assert!(text.contains("\"rotation\": 0\n"), "{text}");
    }

    #[test]
    fn test_round_trip_recovers_coordinates() {
        let scale = StageScale::new(1366.0, 655.0, &EditorConfig::default());
        let pieces: Vec<Value> = (0..50)
            .map(|i| json!({"filename": format!("{i}.png"), "x": i * 19 + 3, "y": 200 + i * 7}))
            .collect();
        let original = json!({ "pieces": pieces });
        let scene = load(&original, &scale);
        let (doc, _) = export_manifest(&original, &scene, &scale, 0.0).unwrap();
        for (before, after) in original["pieces"]
            .as_array()
            .unwrap()
            .iter()
            .zip(doc["pieces"].as_array().unwrap())
        {
            assert_eq!(before["x"], after["x"]);
            assert_eq!(before["y"], after["y"]);
        }
    }

    #[test]
    fn test_unmatched_and_malformed() {
        let original = json!({"pieces": [{"filename": "a.png", "x": 0, "y": 300}]});
        let scale = StageScale::new(1024.0, 768.0, &EditorConfig::default());
        let other = json!({"pieces": [{"filename": "zzz.png", "x": 0, "y": 300}]});
        let scene = load(&other, &scale);
        let (doc, summary) = export_manifest(&original, &scene, &scale, 150.0).unwrap();
        assert_eq!(summary.unmatched, vec!["zzz.png".to_string()]);
        assert_eq!(doc, original);

        let err = export_manifest(&json!({"items": []}), &scene, &scale, 0.0).unwrap_err();
        assert!(matches!(err, LayoutError::InvalidManifest(_)));
        assert!(matches!(
            export_manifest(&json!([]), &scene, &scale, 0.0),
            Err(LayoutError::NotAnObject)
        ));
        assert_eq!(export_filename("red"), "0_pieces_red.json");
    }
}
