use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fmt;

use crate::error::LayoutError;

/// Coordinate value marking a piece that has not been placed yet.
pub const UNPLACED: f64 = -1.0;

/// Round a float to N decimal places.
pub fn round_f64(v: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (v * factor).round() / factor
}

/// JSON number for `v`, written as an integer when it has no fractional part
/// so that `1.0` serializes as `1` and `-0.0` as `0`.
pub fn json_number(v: f64) -> Value {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 9.0e15 {
        Value::from(v as i64)
    } else {
        Value::from(v)
    }
}

fn serialize_number<S: Serializer>(v: &f64, s: S) -> Result<S::Ok, S::Error> {
    json_number(*v).serialize(s)
}

fn serialize_opt_number<S: Serializer>(v: &Option<f64>, s: S) -> Result<S::Ok, S::Error> {
    match v {
        Some(val) => s.serialize_some(&json_number(*val)),
        None => s.serialize_none(),
    }
}

// ─── Records ─────────────────────────────────────────────────────────

/// One puzzle piece as stored in `0_pieces.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieceRecord {
    pub filename: String,
    #[serde(serialize_with = "serialize_number")]
    pub x: f64,
    #[serde(serialize_with = "serialize_number")]
    pub y: f64,
    #[serde(default)]
    pub letter: String,
    #[serde(default)]
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(
        rename = "scaleX",
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_opt_number"
    )]
    pub scale_x: Option<f64>,
    #[serde(
        rename = "scaleY",
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_opt_number"
    )]
    pub scale_y: Option<f64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_opt_number"
    )]
    pub rotation: Option<f64>,
    /// Keys this editor does not interpret, carried through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PieceRecord {
    /// Either coordinate at the sentinel means the piece goes to the tray.
    pub fn is_unplaced(&self) -> bool {
        self.x == UNPLACED || self.y == UNPLACED
    }

    pub fn scale_x(&self) -> f64 {
        self.scale_x.unwrap_or(1.0)
    }

    pub fn scale_y(&self) -> f64 {
        self.scale_y.unwrap_or(1.0)
    }

    pub fn rotation(&self) -> f64 {
        self.rotation.unwrap_or(0.0)
    }

    pub fn has_identity_transform(&self) -> bool {
        self.scale_x() == 1.0 && self.scale_y() == 1.0 && self.rotation() == 0.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub pieces: Vec<PieceRecord>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Manifest {
    pub fn from_json(text: &str) -> Result<Self, LayoutError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_value(value: &Value) -> Result<Self, LayoutError> {
        if !value.is_object() {
            return Err(LayoutError::NotAnObject);
        }
        Ok(Self::deserialize(value)?)
    }

    pub fn find(&self, filename: &str) -> Option<&PieceRecord> {
        self.pieces.iter().find(|p| p.filename == filename)
    }

    pub fn placed_count(&self) -> usize {
        self.pieces.iter().filter(|p| !p.is_unplaced()).count()
    }

    /// Problems that make the manifest ambiguous or unusable for export.
    pub fn validate(&self) -> Vec<ManifestIssue> {
        let mut issues = Vec::new();
        let mut seen = HashSet::new();
        for piece in &self.pieces {
            if !seen.insert(piece.filename.as_str()) {
                issues.push(ManifestIssue::DuplicateFilename(piece.filename.clone()));
            }
            if (piece.x == UNPLACED) != (piece.y == UNPLACED) {
                issues.push(ManifestIssue::HalfSentinel(piece.filename.clone()));
            }
            let values = [
                piece.x,
                piece.y,
                piece.scale_x(),
                piece.scale_y(),
                piece.rotation(),
            ];
            if values.iter().any(|v| !v.is_finite()) {
                issues.push(ManifestIssue::NonFinite(piece.filename.clone()));
            }
        }
        issues
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestIssue {
    DuplicateFilename(String),
    /// Only one of x/y carries the sentinel.
    HalfSentinel(String),
    NonFinite(String),
}

impl fmt::Display for ManifestIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ManifestIssue::DuplicateFilename(name) => write!(f, "{name}: duplicate filename"),
            ManifestIssue::HalfSentinel(name) => {
                write!(f, "{name}: only one coordinate is -1, piece will be treated as unplaced")
            }
            ManifestIssue::NonFinite(name) => write!(f, "{name}: non-finite position or transform"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "pieces": [
            {"filename": "a.png", "x": 10, "y": 20, "letter": "A", "username": "bob",
             "scaleX": 1, "scaleY": 1, "rotation": 0},
            {"filename": "b.png", "x": -1, "y": -1, "letter": "B", "username": "eve",
             "location": "Oslo", "submitted": "2021-04-01"}
        ]
    }"#;

    #[test]
    fn test_parse_optional_fields() {
        let m = Manifest::from_json(SAMPLE).unwrap();
        assert_eq!(m.pieces.len(), 2);
        let a = &m.pieces[0];
        assert!(!a.is_unplaced());
        assert_eq!(a.scale_x, Some(1.0));
        let b = &m.pieces[1];
        assert!(b.is_unplaced());
        assert_eq!(b.location.as_deref(), Some("Oslo"));
        assert_eq!(b.scale_x(), 1.0);
        assert_eq!(b.rotation(), 0.0);
        assert_eq!(b.extra.get("submitted"), Some(&Value::from("2021-04-01")));
        assert_eq!(m.placed_count(), 1);
    }

    #[test]
    fn test_serialize_keeps_integers() {
        let m = Manifest::from_json(SAMPLE).unwrap();
        let text = serde_json::to_string(&m.pieces[0]).unwrap();
        assert!(text.contains(r#""x":10"#), "{text}");
        assert!(text.contains(r#""scaleX":1"#), "{text}");
        assert!(!text.contains("1.0"), "{text}");
        let b = serde_json::to_value(&m.pieces[1]).unwrap();
        assert_eq!(b["submitted"], "2021-04-01");
        assert!(b.get("scaleX").is_none());
    }

    #[test]
    fn test_json_number() {
        assert_eq!(json_number(1.0), Value::from(1));
        assert_eq!(json_number(-0.0), Value::from(0));
        assert_eq!(json_number(0.125), Value::from(0.125));
        assert_eq!(round_f64(1.23456, 3), 1.235);
    }

    #[test]
    fn test_from_value_rejects_non_object() {
        let err = Manifest::from_value(&Value::from(3)).unwrap_err();
        assert!(matches!(err, LayoutError::NotAnObject));
    }

    #[test]
    fn test_validate() {
        let m = Manifest::from_json(
            r#"{"pieces": [
                {"filename": "a.png", "x": -1, "y": 40},
                {"filename": "a.png", "x": 1, "y": 2}
            ]}"#,
        )
        .unwrap();
        let issues = m.validate();
        assert_eq!(
            issues,
            vec![
                ManifestIssue::HalfSentinel("a.png".into()),
                ManifestIssue::DuplicateFilename("a.png".into()),
            ]
        );
        assert!(m.pieces[0].is_unplaced());
    }
}
