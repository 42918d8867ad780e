use crate::config::EditorConfig;
use crate::geometry::Point;
use crate::manifest::round_f64;
use crate::scale::StageScale;
use crate::scene::PieceView;

/// Presentation toggles driven by the control bar checkboxes.
#[derive(Debug, Clone, PartialEq)]
pub struct Overlays {
    pub show_letters: bool,
    pub show_tooltips: bool,
    pub show_grid: bool,
    pub grid_opacity: f64,
    pub rotation_snaps: Vec<f64>,
    snap_angles: Vec<f64>,
}

impl Overlays {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            show_letters: false,
            show_tooltips: false,
            show_grid: false,
            grid_opacity: config.grid_opacity,
            rotation_snaps: config.rotation_snaps.clone(),
            snap_angles: config.rotation_snaps.clone(),
        }
    }

    pub fn set_show_letters(&mut self, on: bool) {
        self.show_letters = on;
    }

    pub fn set_show_tooltips(&mut self, on: bool) {
        self.show_tooltips = on;
    }

    pub fn set_show_grid(&mut self, on: bool) {
        self.show_grid = on;
    }

    pub fn set_grid_opacity(&mut self, opacity: f64) {
        self.grid_opacity = opacity.clamp(0.0, 1.0);
    }

    /// Snap to quarter turns, or rotate freely.
    pub fn set_rotation_snap(&mut self, on: bool) {
        self.rotation_snaps = if on { self.snap_angles.clone() } else { Vec::new() };
    }

    pub fn rotation_snap(&self) -> bool {
        !self.rotation_snaps.is_empty()
    }
}

/// Contents and anchor of the hover tooltip.
#[derive(Debug, Clone, PartialEq)]
pub struct TooltipInfo {
    pub username: String,
    pub letter: String,
    pub location: Option<String>,
    /// Design-space position of the piece.
    pub coords: (i64, i64),
    pub scale: (f64, f64),
    pub rotation: f64,
    /// Stage position the tooltip is pinned to.
    pub anchor: Point,
}

impl TooltipInfo {
    pub fn for_piece(piece: &PieceView, scale: &StageScale) -> Self {
        let t = &piece.transform;
        Self {
            username: piece.username.clone(),
            letter: piece.letter.clone(),
            location: piece.location.clone(),
            coords: (scale.to_design_int(t.x), scale.to_design_int(t.y)),
            scale: (round_f64(t.scale_x, 3), round_f64(t.scale_y, 3)),
            rotation: round_f64(t.rotation, 3),
            anchor: Point::new(t.x + piece.width / 2.0, t.y + piece.height / 2.0),
        }
    }

    pub fn coords_text(&self) -> String {
        format!("({}, {})", self.coords.0, self.coords.1)
    }

    pub fn scale_text(&self) -> String {
        format!("({}, {})", self.scale.0, self.scale.1)
    }

    pub fn rotation_text(&self) -> String {
        format!("{}°", self.rotation)
    }
}

/// The round "?" button in the top-right corner of the stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HelpButton {
    pub center: Point,
    pub radius: f64,
}

impl HelpButton {
    const SIZE: f64 = 50.0;
    const EDGE_GAP: f64 = 15.0;
    const PANEL_WIDTH: f64 = 400.0;

    pub fn new(stage_width: f64) -> Self {
        let radius = Self::SIZE / 2.0;
        Self {
            center: Point::new(stage_width - Self::SIZE - Self::EDGE_GAP, Self::SIZE),
            radius,
        }
    }

    pub fn contains(&self, p: Point) -> bool {
        self.center.distance(p) <= self.radius
    }

    /// Stage position of the help panel's top-left corner.
    pub fn panel_position(&self) -> Point {
        Point::new(
            self.center.x - self.radius - Self::PANEL_WIDTH,
            self.center.y - 5.0,
        )
    }
}
