//! The transform handle drawn around the current selection: four corner
//! anchors that scale and one anchor above the box that rotates.

use crate::geometry::{rad2deg, rotate_vector, Point, Rect, Transform};
use crate::scene::{PieceId, Scene};

/// Side length of a square anchor, in screen pixels.
pub const ANCHOR_SIZE: f64 = 10.0;
/// Distance of the rotate anchor above the box.
pub const ROTATE_ANCHOR_OFFSET: f64 = 50.0;
const MIN_SCALE_FACTOR: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
    Rotate,
}

impl Anchor {
    pub const ALL: [Anchor; 5] = [
        Anchor::TopLeft,
        Anchor::TopRight,
        Anchor::BottomRight,
        Anchor::BottomLeft,
        Anchor::Rotate,
    ];

    pub fn position(&self, bounds: &Rect) -> Point {
        let [tl, tr, br, bl] = bounds.corners();
        match self {
            Anchor::TopLeft => tl,
            Anchor::TopRight => tr,
            Anchor::BottomRight => br,
            Anchor::BottomLeft => bl,
            Anchor::Rotate => Point::new(bounds.center().x, bounds.y - ROTATE_ANCHOR_OFFSET),
        }
    }

    fn opposite(&self, bounds: &Rect) -> Point {
        let [tl, tr, br, bl] = bounds.corners();
        match self {
            Anchor::TopLeft => br,
            Anchor::TopRight => bl,
            Anchor::BottomRight => tl,
            Anchor::BottomLeft => tr,
            Anchor::Rotate => bounds.center(),
        }
    }
}

/// Bounds of the selection, or `None` when nothing is selected.
pub fn selection_bounds(scene: &Scene, nodes: &[PieceId]) -> Option<Rect> {
    nodes
        .iter()
        .filter_map(|id| scene.get(*id))
        .map(|p| p.client_rect())
        .reduce(|a, b| a.union(&b))
}

pub fn anchor_at(bounds: &Rect, p: Point) -> Option<Anchor> {
    let half = ANCHOR_SIZE / 2.0;
    Anchor::ALL.into_iter().find(|a| {
        let c = a.position(bounds);
        (p.x - c.x).abs() <= half && (p.y - c.y).abs() <= half
    })
}

/// Snap `angle` onto the closest of `snaps` when within `tolerance` degrees.
pub fn snap_rotation(angle: f64, snaps: &[f64], tolerance: f64) -> f64 {
    for snap in snaps {
        let diff = (angle - snap).rem_euclid(360.0);
        let dist = diff.min(360.0 - diff);
        if dist < tolerance {
            // keep the caller's winding so rotations don't jump by 360
            return if diff <= 180.0 { angle - diff } else { angle + dist };
        }
    }
    angle
}

/// An in-progress scale or rotate gesture. Every update is computed from the
/// transforms captured when the gesture began so repeated moves don't drift.
#[derive(Debug, Clone)]
pub struct TransformSession {
    anchor: Anchor,
    pivot: Point,
    start: Point,
    initial: Vec<(PieceId, Transform)>,
}

impl TransformSession {
    pub fn begin(anchor: Anchor, bounds: &Rect, start: Point, scene: &Scene, nodes: &[PieceId]) -> Self {
        let initial = nodes
            .iter()
            .filter_map(|id| scene.get(*id).map(|p| (*id, p.transform)))
            .collect();
        Self {
            anchor,
            pivot: anchor.opposite(bounds),
            start,
            initial,
        }
    }

    pub fn anchor(&self) -> Anchor {
        self.anchor
    }

    pub fn update(&self, scene: &mut Scene, pointer: Point, snaps: &[f64], tolerance: f64) {
        match self.anchor {
            Anchor::Rotate => self.rotate(scene, pointer, snaps, tolerance),
            _ => self.scale(scene, pointer),
        }
    }

    fn scale(&self, scene: &mut Scene, pointer: Point) {
        let from = self.start.distance(self.pivot);
        if from == 0.0 {
            return;
        }
        // project the pointer onto the pivot→start diagonal
        let dir = [(self.start.x - self.pivot.x) / from, (self.start.y - self.pivot.y) / from];
        let along = (pointer.x - self.pivot.x) * dir[0] + (pointer.y - self.pivot.y) * dir[1];
        let factor = (along / from).max(MIN_SCALE_FACTOR);
        for (id, t) in &self.initial {
            if let Some(piece) = scene.get_mut(*id) {
                piece.transform = Transform {
                    x: self.pivot.x + (t.x - self.pivot.x) * factor,
                    y: self.pivot.y + (t.y - self.pivot.y) * factor,
                    scale_x: t.scale_x * factor,
                    scale_y: t.scale_y * factor,
                    rotation: t.rotation,
                };
            }
        }
    }

    fn rotate(&self, scene: &mut Scene, pointer: Point, snaps: &[f64], tolerance: f64) {
        let angle_of = |p: Point| rad2deg((p.y - self.pivot.y).atan2(p.x - self.pivot.x));
        let mut delta = angle_of(pointer) - angle_of(self.start);
        if let Some((_, first)) = self.initial.first() {
            let target = first.rotation + delta;
            delta = snap_rotation(target, snaps, tolerance) - first.rotation;
        }
        for (id, t) in &self.initial {
            if let Some(piece) = scene.get_mut(*id) {
                let v = rotate_vector([t.x - self.pivot.x, t.y - self.pivot.y], delta);
                piece.transform = Transform {
                    x: self.pivot.x + v[0],
                    y: self.pivot.y + v[1],
                    rotation: t.rotation + delta,
                    ..*t
                };
            }
        }
    }
}
