use std::collections::HashMap;

use crate::geometry::{Point, Rect, Transform};
use crate::manifest::PieceRecord;

/// Stable handle of a piece in the scene arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PieceId(pub usize);

/// Which layer of a piece group a hit landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PiecePart {
    Image,
    Label,
}

/// Padding around the letter glyph, in screen pixels.
const LABEL_PADDING: f64 = 5.0;

/// Runtime view of one manifest record.
#[derive(Debug, Clone, PartialEq)]
pub struct PieceView {
    pub id: PieceId,
    pub filename: String,
    pub letter: String,
    pub username: String,
    pub location: Option<String>,
    pub natural_width: f64,
    pub natural_height: f64,
    /// Unscaled display size on the stage.
    pub width: f64,
    pub height: f64,
    pub transform: Transform,
}

/// Where and how large to draw a piece's letter. The label sits on the
/// group's centre but never inherits its scale or rotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelPlacement {
    pub center: Point,
    pub font_size: f64,
}

impl LabelPlacement {
    pub fn bounds(&self) -> Rect {
        let half = self.font_size / 2.0 + LABEL_PADDING;
        Rect::new(
            self.center.x - half,
            self.center.y - half,
            half * 2.0,
            half * 2.0,
        )
    }
}

impl PieceView {
    pub fn client_rect(&self) -> Rect {
        self.transform.client_rect(self.width, self.height)
    }

    pub fn contains(&self, p: Point) -> bool {
        match self.transform.invert(p) {
            Some(local) => Rect::new(0.0, 0.0, self.width, self.height).contains(local),
            None => false,
        }
    }

    pub fn label(&self, font_size: f64) -> LabelPlacement {
        LabelPlacement {
            center: self
                .transform
                .apply(Point::new(self.width / 2.0, self.height / 2.0)),
            font_size,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Scene {
    pieces: Vec<PieceView>,
    by_filename: HashMap<String, PieceId>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a piece whose image has finished loading. Later pieces stack on
    /// top of earlier ones.
    pub fn insert(
        &mut self,
        record: &PieceRecord,
        natural_size: (f64, f64),
        piece_scale: f64,
        position: Point,
    ) -> PieceId {
        let id = PieceId(self.pieces.len());
        let transform = Transform {
            x: position.x,
            y: position.y,
            scale_x: record.scale_x(),
            scale_y: record.scale_y(),
            rotation: record.rotation(),
        };
        self.pieces.push(PieceView {
            id,
            filename: record.filename.clone(),
            letter: record.letter.clone(),
            username: record.username.clone(),
            location: record.location.clone(),
            natural_width: natural_size.0,
            natural_height: natural_size.1,
            width: natural_size.0 * piece_scale,
            height: natural_size.1 * piece_scale,
            transform,
        });
        if self
            .by_filename
            .insert(record.filename.clone(), id)
            .is_some()
        {
            log::warn!("duplicate piece filename {}, later piece wins lookups", record.filename);
        }
        id
    }

    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    pub fn get(&self, id: PieceId) -> Option<&PieceView> {
        self.pieces.get(id.0)
    }

    pub fn get_mut(&mut self, id: PieceId) -> Option<&mut PieceView> {
        self.pieces.get_mut(id.0)
    }

    pub fn id_of(&self, filename: &str) -> Option<PieceId> {
        self.by_filename.get(filename).copied()
    }

    /// Pieces in stacking order, bottom first.
    pub fn iter(&self) -> impl Iterator<Item = &PieceView> {
        self.pieces.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut PieceView> {
        self.pieces.iter_mut()
    }

    /// Topmost piece under `p`. Labels only count when they are drawn.
    pub fn hit_test(&self, p: Point, label_font: Option<f64>) -> Option<(PieceId, PiecePart)> {
        for piece in self.pieces.iter().rev() {
            // a letter overhanging its image is not a target
            if !piece.contains(p) {
                continue;
            }
            let on_label = label_font.is_some_and(|font| piece.label(font).bounds().contains(p));
            let part = if on_label {
                PiecePart::Label
            } else {
                PiecePart::Image
            };
            return Some((piece.id, part));
        }
        None
    }

    /// Pieces whose client rect touches `area`, in stacking order.
    pub fn intersecting(&self, area: &Rect) -> Vec<PieceId> {
        self.pieces
            .iter()
            .filter(|p| area.intersects(&p.client_rect()))
            .map(|p| p.id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::Manifest;

    fn scene() -> Scene {
        let m = Manifest::from_json(
            r#"{"pieces":[
                {"filename":"a.png","x":0,"y":0,"letter":"A","username":"ann"},
                {"filename":"b.png","x":150,"y":0,"letter":"B","username":"ben","rotation":90}
            ]}"#,
        )
        .unwrap();
        let mut s = Scene::new();
        s.insert(&m.pieces[0], (300.0, 150.0), 0.2, Point::new(0.0, 0.0));
        s.insert(&m.pieces[1], (300.0, 150.0), 0.2, Point::new(150.0, 0.0));
        s
    }

    #[test]
    fn test_insert_scales_display_size() {
        let s = scene();
        let a = s.get(PieceId(0)).unwrap();
        assert_eq!((a.width, a.height), (60.0, 30.0));
        assert_eq!(s.id_of("b.png"), Some(PieceId(1)));
        assert_eq!(s.get(PieceId(1)).unwrap().transform.rotation, 90.0);
    }

    #[test]
    fn test_hit_test_prefers_topmost() {
        let s = scene();
        // b is rotated 90 degrees about (150, 0) and covers x in [120, 150]
        assert_eq!(s.hit_test(Point::new(145.0, 10.0), None), Some((PieceId(1), PiecePart::Image)));
        assert_eq!(s.hit_test(Point::new(100.0, 10.0), None), None);
        assert_eq!(s.hit_test(Point::new(10.0, 10.0), None), Some((PieceId(0), PiecePart::Image)));
        assert_eq!(s.hit_test(Point::new(200.0, 200.0), None), None);
    }

    #[test]
    fn test_hit_test_label_only_when_visible() {
        let s = scene();
        let center = s.get(PieceId(0)).unwrap().label(10.0).center;
        assert_eq!(center, Point::new(30.0, 15.0));
        let hit = s.hit_test(Point::new(20.0, 15.0), Some(10.0));
        assert_eq!(hit, Some((PieceId(0), PiecePart::Label)));
        let hit = s.hit_test(Point::new(20.0, 15.0), None);
        assert_eq!(hit, Some((PieceId(0), PiecePart::Image)));
    }

    #[test]
    fn test_label_overhang_is_not_hit() {
        let s = scene();
        // a 40px letter on a 60x30 piece reaches 10px past its bottom edge
        let below = Point::new(30.0, 35.0);
        assert!(s.get(PieceId(0)).unwrap().label(40.0).bounds().contains(below));
        assert_eq!(s.hit_test(below, Some(40.0)), None);
        assert_eq!(s.hit_test(Point::new(30.0, 25.0), Some(40.0)), Some((PieceId(0), PiecePart::Label)));
    }

    #[test]
    fn test_label_ignores_group_scale() {
        let mut s = scene();
        let piece = s.get_mut(PieceId(0)).unwrap();
        piece.transform.scale_x = -2.0;
        piece.transform.x = 100.0;
        let label = piece.label(12.0);
        assert_eq!(label.center, Point::new(40.0, 15.0));
        assert_eq!(label.font_size, 12.0);
    }
}
