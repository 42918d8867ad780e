use crate::scene::{PieceId, Scene};

/// X coordinate mirrored pieces are reflected through: `new_x = pivot - x`.
pub fn flip_pivot(grid_width: f64, margin: f64) -> f64 {
    grid_width + margin
}

/// Mirror every piece at or below `threshold` horizontally. The group's
/// horizontal scale is negated, its origin reflected through `pivot`, and its
/// rotation inverted, so applying this twice restores the original layout.
/// Labels need no adjustment since they never inherit the group's scale.
pub fn flip_placed(scene: &mut Scene, threshold: f64, pivot: f64) -> Vec<PieceId> {
    let mut flipped = Vec::new();
    for piece in scene.iter_mut() {
        let t = &mut piece.transform;
        if t.y < threshold {
            continue;
        }
        t.scale_x = -t.scale_x;
        t.x = pivot - t.x;
        t.rotation = 360.0 - t.rotation;
        flipped.push(piece.id);
    }
    log::info!("flipped {} pieces about x = {}", flipped.len(), pivot);
    flipped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Point, Rect, Transform};
    use crate::manifest::Manifest;
    use approx::assert_abs_diff_eq;

    fn scene() -> Scene {
        let m = Manifest::from_json(
            r#"{"pieces":[
                {"filename":"tray.png","x":-1,"y":-1},
                {"filename":"a.png","x":300,"y":400,"rotation":30},
                {"filename":"b.png","x":520,"y":150,"scaleX":0.5,"scaleY":2}
            ]}"#,
        )
        .unwrap();
        let mut s = Scene::new();
        s.insert(&m.pieces[0], (90.0, 90.0), 1.0, Point::new(0.0, 0.0));
        s.insert(&m.pieces[1], (90.0, 60.0), 1.0, Point::new(300.0, 400.0));
        s.insert(&m.pieces[2], (40.0, 40.0), 1.0, Point::new(520.0, 150.0));
        s
    }

    #[test]
    fn test_flip_only_below_threshold() {
        let mut s = scene();
        let pivot = flip_pivot(1024.0, 100.0);
        let flipped = flip_placed(&mut s, 150.0, pivot);
        assert_eq!(flipped, vec![PieceId(1), PieceId(2)]);
        assert_eq!(s.get(PieceId(0)).unwrap().transform, Transform::default());

        let a = s.get(PieceId(1)).unwrap().transform;
        assert_eq!((a.x, a.scale_x, a.rotation), (824.0, -1.0, 330.0));
        let b = s.get(PieceId(2)).unwrap().transform;
        assert_eq!((b.x, b.scale_x, b.scale_y), (604.0, -0.5, 2.0));
    }

    #[test]
    fn test_flip_mirrors_footprint() {
        let mut s = scene();
        flip_placed(&mut s, 150.0, 1124.0);
        // b spanned [520, 540]; mirrored through 562 it spans [584, 604]
        let r = s.get(PieceId(2)).unwrap().client_rect();
        assert_eq!(r, Rect::new(584.0, 150.0, 20.0, 80.0));
    }

    #[test]
    fn test_flip_twice_is_identity() {
        let mut s = scene();
        let before: Vec<Transform> = s.iter().map(|p| p.transform).collect();
        flip_placed(&mut s, 150.0, 1137.25);
        flip_placed(&mut s, 150.0, 1137.25);
        for (p, t) in s.iter().zip(before) {
            assert_abs_diff_eq!(p.transform.x, t.x, epsilon = 1e-9);
            assert_eq!(p.transform.scale_x, t.scale_x);
            assert_abs_diff_eq!(p.transform.rotation, t.rotation, epsilon = 1e-9);
            assert_eq!(p.transform.y, t.y);
        }
    }
}
