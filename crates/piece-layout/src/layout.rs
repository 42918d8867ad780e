use crate::config::EditorConfig;
use crate::geometry::Point;
use crate::manifest::PieceRecord;
use crate::scale::StageScale;

/// Row-packing cursor for pieces without a recorded position. Pieces are
/// packed left to right in the order they finish loading; a row wraps as
/// soon as the next piece would reach the stage's right edge.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowLayout {
    stage_width: f64,
    row_height: f64,
    cursor: f64,
    row: u32,
}

impl FlowLayout {
    pub fn new(stage_width: f64, scale: &StageScale, config: &EditorConfig) -> Self {
        Self {
            stage_width,
            row_height: config.max_piece_width * scale.piece_scale,
            cursor: 0.0,
            row: 0,
        }
    }

    pub fn row(&self) -> u32 {
        self.row
    }

    /// Reserve a slot for a piece `width` pixels wide.
    pub fn next_slot(&mut self, width: f64) -> Point {
        if self.cursor + width >= self.stage_width {
            self.row += 1;
            self.cursor = 0.0;
        }
        let x = self.cursor;
        self.cursor += width;
        Point::new(x, self.row_height * self.row as f64)
    }
}

/// Screen position for a freshly loaded piece.
pub fn initial_position(
    record: &PieceRecord,
    width: f64,
    scale: &StageScale,
    flow: &mut FlowLayout,
) -> Point {
    if record.is_unplaced() {
        flow.next_slot(width)
    } else {
        Point::new(scale.to_screen(record.x), scale.to_screen(record.y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::Manifest;

    fn unit_scale() -> (StageScale, EditorConfig) {
        let config = EditorConfig::default();
        (StageScale::new(1024.0, 768.0, &config), config)
    }

    #[test]
    fn test_wraps_before_stage_edge() {
        let (scale, config) = unit_scale();
        let mut flow = FlowLayout::new(300.0, &scale, &config);
        let widths = [100.0, 120.0, 90.0, 250.0, 40.0, 299.0];
        let mut rows = Vec::new();
        for w in widths {
            let p = flow.next_slot(w);
            assert!(p.x + w < 300.0 || p.x == 0.0, "slot {p:?} width {w}");
            rows.push((p.x, flow.row()));
        }
        assert_eq!(
            rows,
            vec![(0.0, 0), (100.0, 0), (0.0, 1), (0.0, 2), (250.0, 2), (0.0, 3)]
        );
    }

    #[test]
    fn test_row_height_uses_piece_scale() {
        let (scale, config) = unit_scale();
        let mut flow = FlowLayout::new(100.0, &scale, &config);
        flow.next_slot(60.0);
        let p = flow.next_slot(60.0);
        approx::assert_relative_eq!(p.y, 325.0 / 3.0, epsilon = 1e-9);
    }

    #[test]
    fn test_placed_record_is_scaled() {
        let config = EditorConfig::default();
        let scale = StageScale::new(512.0, 384.0, &config);
        let m = Manifest::from_json(
            r#"{"pieces":[{"filename":"a.png","x":10,"y":20,"letter":"A","username":"bob"}]}"#,
        )
        .unwrap();
        let mut flow = FlowLayout::new(512.0, &scale, &config);
        let p = initial_position(&m.pieces[0], 50.0, &scale, &mut flow);
        assert_eq!(p, Point::new(5.0, 10.0));
        assert_eq!(flow.row(), 0);
    }
}
