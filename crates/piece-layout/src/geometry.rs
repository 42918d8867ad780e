use std::f64::consts::PI;

pub fn deg2rad(deg: f64) -> f64 {
    deg * PI / 180.0
}

pub fn rad2deg(rad: f64) -> f64 {
    rad * 180.0 / PI
}

pub fn rotate_vector(v: [f64; 2], angle: f64) -> [f64; 2] {
    let a = deg2rad(angle);
    [
        v[0] * a.cos() - v[1] * a.sin(),
        v[0] * a.sin() + v[1] * a.cos(),
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Axis-aligned rectangle in screen space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Rectangle spanning two arbitrary corners.
    pub fn spanning(a: Point, b: Point) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (b.x - a.x).abs(),
            height: (b.y - a.y).abs(),
        }
    }

    pub fn from_points(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let (mut minx, mut miny, mut maxx, mut maxy) = (first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            minx = minx.min(p.x);
            miny = miny.min(p.y);
            maxx = maxx.max(p.x);
            maxy = maxy.max(p.y);
        }
        Some(Self::new(minx, miny, maxx - minx, maxy - miny))
    }

    /// Overlap test where touching edges count as intersecting.
    pub fn intersects(&self, other: &Rect) -> bool {
        !(other.x > self.x + self.width
            || other.x + other.width < self.x
            || other.y > self.y + self.height
            || other.y + other.height < self.y)
    }

    pub fn contains(&self, p: Point) -> bool {
        self.x <= p.x && p.x <= self.x + self.width && self.y <= p.y && p.y <= self.y + self.height
    }

    pub fn union(&self, other: &Rect) -> Rect {
        let minx = self.x.min(other.x);
        let miny = self.y.min(other.y);
        let maxx = (self.x + self.width).max(other.x + other.width);
        let maxy = (self.y + self.height).max(other.y + other.height);
        Rect::new(minx, miny, maxx - minx, maxy - miny)
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.x, self.y),
            Point::new(self.x + self.width, self.y),
            Point::new(self.x + self.width, self.y + self.height),
            Point::new(self.x, self.y + self.height),
        ]
    }
}

/// Position, scale and rotation of a piece group. The group origin is the
/// top-left corner of the unrotated image; rotation is in degrees and is
/// applied after scaling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub x: f64,
    pub y: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub rotation: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            rotation: 0.0,
        }
    }
}

impl Transform {
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            ..Self::default()
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Map a group-local point to the stage.
    pub fn apply(&self, local: Point) -> Point {
        let v = rotate_vector([local.x * self.scale_x, local.y * self.scale_y], self.rotation);
        Point::new(self.x + v[0], self.y + v[1])
    }

    /// Map a stage point into group-local coordinates. `None` for a
    /// degenerate scale.
    pub fn invert(&self, stage: Point) -> Option<Point> {
        if self.scale_x == 0.0 || self.scale_y == 0.0 {
            return None;
        }
        let v = rotate_vector([stage.x - self.x, stage.y - self.y], -self.rotation);
        Some(Point::new(v[0] / self.scale_x, v[1] / self.scale_y))
    }

    /// Axis-aligned bounds of a `width` x `height` box under this transform.
    pub fn client_rect(&self, width: f64, height: f64) -> Rect {
        let corners = Rect::new(0.0, 0.0, width, height)
            .corners()
            .map(|c| self.apply(c));
        Rect::from_points(&corners).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_intersects_touching_edges() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.intersects(&Rect::new(10.0, 10.0, 5.0, 5.0)));
        assert!(!a.intersects(&Rect::new(10.5, 0.0, 5.0, 5.0)));
        assert!(a.intersects(&Rect::new(3.0, 3.0, 0.0, 0.0)));
    }

    #[test]
    fn test_spanning_normalizes() {
        let r = Rect::spanning(Point::new(10.0, 5.0), Point::new(2.0, 9.0));
        assert_eq!(r, Rect::new(2.0, 5.0, 8.0, 4.0));
    }

    #[test]
    fn test_apply_invert() {
        let t = Transform {
            x: 40.0,
            y: 25.0,
            scale_x: -2.0,
            scale_y: 0.5,
            rotation: 30.0,
        };
        let p = Point::new(7.0, -3.0);
        let back = t.invert(t.apply(p)).unwrap();
        assert_abs_diff_eq!(back.x, p.x, epsilon = 1e-9);
        assert_abs_diff_eq!(back.y, p.y, epsilon = 1e-9);
    }

    #[test]
    fn test_client_rect_rotated_quarter() {
        let t = Transform {
            rotation: 90.0,
            ..Transform::at(100.0, 0.0)
        };
        let r = t.client_rect(20.0, 10.0);
        assert_abs_diff_eq!(r.x, 90.0, epsilon = 1e-9);
        assert_abs_diff_eq!(r.y, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(r.width, 10.0, epsilon = 1e-9);
        assert_abs_diff_eq!(r.height, 20.0, epsilon = 1e-9);
    }

    #[test]
    fn test_client_rect_flipped() {
        let t = Transform {
            scale_x: -1.0,
            ..Transform::at(50.0, 10.0)
        };
        assert_eq!(t.client_rect(20.0, 10.0), Rect::new(30.0, 10.0, 20.0, 10.0));
    }
}
